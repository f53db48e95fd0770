pub mod codes;
pub mod error;
pub mod events;
pub mod guard;
pub mod models;
pub mod policy;
pub mod storage;
pub mod time;

pub use error::{HrError, HrResult, StoreError};
pub use events::{DomainEvent, EventPayload};
pub use guard::KeyedGuard;
pub use models::{Employee, EmployeeId, EmployeeStatus};
pub use policy::PolicyConfig;
pub use storage::{Entity, EventSink, RecordFilter, Repository, Stored, publish_or_warn};
pub use time::{Clock, DateRange, DayOfWeek, FixedClock, SystemClock, TimeRange};

#[doc(hidden)]
pub use serde as __serde;
