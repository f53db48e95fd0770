mod devices;
mod engine;
mod record;

pub use devices::{BiometricDevice, DeviceRegistry, IdentityAssertion, PunchAction};
pub use engine::{AttendanceEngine, AttendanceReport, AttendanceSummary};
pub use record::{AttendanceRecord, AttendanceStatus, WorkedTime, compute_worked_time};
