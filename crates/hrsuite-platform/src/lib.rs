pub mod config;
pub mod contracts;
pub mod db;
pub mod redis_bus;

pub use config::{ServiceConfig, WorkerConfig, policy_from};
pub use contracts::{
    AnnualSalaryResponse, ApproveVacationRequest, BalanceQuery, EmployeeSearchQuery,
    GeneratePayrollRequest, HistoryQuery, MarkDayRequest, MobileProfile, MobilePunchRequest,
    PeriodQuery, PunchRequest, RegisterDeviceRequest, RejectVacationRequest,
    VacationRequestBody, WeeklyHoursResponse,
};
pub use db::{PgRepository, connect_database, ensure_schema};
pub use redis_bus::{EVENTS_CHANNEL, RedisBus};
