use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use hrsuite_core::time::{elapsed_hours, option_time_of_day, round_hours, timestamp};
use hrsuite_core::{EmployeeId, Entity, PolicyConfig};
use serde::{Deserialize, Serialize};

hrsuite_core::string_enum! {
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        HalfDay => "half-day",
        Overtime => "overtime",
    }
}

/// One employee's attendance for one calendar date.
///
/// Hours are kept at full precision; [`AttendanceRecord::rounded`] produces
/// the 2 dp copy handed to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    #[serde(with = "option_time_of_day")]
    pub check_in_time: Option<NaiveTime>,
    #[serde(with = "option_time_of_day")]
    pub check_out_time: Option<NaiveTime>,
    pub hours_worked: f64,
    pub overtime_hours: f64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl AttendanceRecord {
    pub fn key_for(employee_id: EmployeeId, date: NaiveDate) -> String {
        format!("{employee_id}:{date}")
    }

    pub fn is_complete(&self) -> bool {
        self.check_in_time.is_some() && self.check_out_time.is_some()
    }

    pub fn rounded(&self) -> Self {
        Self {
            hours_worked: round_hours(self.hours_worked),
            overtime_hours: round_hours(self.overtime_hours),
            ..self.clone()
        }
    }
}

impl Entity for AttendanceRecord {
    const KIND: &'static str = "attendance";

    fn key(&self) -> String {
        Self::key_for(self.employee_id, self.date)
    }

    fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkedTime {
    pub hours_worked: f64,
    pub overtime_hours: f64,
}

impl WorkedTime {
    pub fn has_overtime(&self) -> bool {
        self.overtime_hours > 0.0
    }
}

/// Hours between the two punches, less the unpaid break once the raw span
/// passes the break threshold, split into regular and overtime.
pub fn compute_worked_time(
    check_in: NaiveTime,
    check_out: NaiveTime,
    policy: &PolicyConfig,
) -> WorkedTime {
    let mut hours = elapsed_hours(check_in, check_out);
    if hours > policy.break_threshold_hours {
        hours -= policy.unpaid_break_hours;
    }
    let hours = hours.max(0.0);

    let overtime_hours = if hours > policy.standard_day_hours {
        hours - policy.standard_day_hours
    } else {
        0.0
    };

    WorkedTime {
        hours_worked: hours,
        overtime_hours,
    }
}
