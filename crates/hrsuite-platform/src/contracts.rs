//! Request and response bodies shared by the HTTP front ends.

use chrono::{NaiveDate, NaiveTime};
use hrsuite_attendance::AttendanceStatus;
use hrsuite_core::time::option_time_of_day;
use hrsuite_core::{Employee, EmployeeId, EmployeeStatus};
use hrsuite_vacations::{VacationBalance, VacationRequest, VacationType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchRequest {
    pub employee_id: EmployeeId,
    pub date: Option<NaiveDate>,
    #[serde(default, with = "option_time_of_day")]
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobilePunchRequest {
    pub employee_id: EmployeeId,
    /// Punches through a registered device when present.
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkDayRequest {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_id: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BalanceQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeSearchQuery {
    pub q: Option<String>,
    pub department: Option<String>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationRequestBody {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub vacation_type: VacationType,
    pub reason: Option<String>,
}

impl From<VacationRequestBody> for VacationRequest {
    fn from(body: VacationRequestBody) -> Self {
        VacationRequest {
            employee_id: body.employee_id,
            start_date: body.start_date,
            end_date: body.end_date,
            vacation_type: body.vacation_type,
            reason: body.reason,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveVacationRequest {
    pub approved_by: EmployeeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectVacationRequest {
    pub rejected_by: EmployeeId,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePayrollRequest {
    pub pay_period_start: NaiveDate,
    pub pay_period_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualSalaryResponse {
    pub employee_id: EmployeeId,
    pub annual_salary: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHoursResponse {
    pub employee_id: EmployeeId,
    pub weekly_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobileProfile {
    pub employee: Employee,
    pub vacation_balance: VacationBalance,
}
