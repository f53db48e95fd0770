mod compensation;
mod engine;
mod record;

pub use compensation::{
    Compensation, CompensationType, CompensationUpdate, NewCompensation, PayPeriod,
};
pub use engine::{DEFAULT_HISTORY_LIMIT, MAX_COMPENSATION_AMOUNT, PayrollEngine};
pub use record::{DeductionLine, PayrollRecord, PayrollReport, Statement};
