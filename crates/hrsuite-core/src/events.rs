use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::EmployeeId;
use crate::time::{DayOfWeek, timestamp};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    VacationSubmitted {
        vacation_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        days_requested: i64,
    },
    VacationApproved {
        vacation_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        approved_by: EmployeeId,
    },
    VacationRejected {
        vacation_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        rejected_by: EmployeeId,
        reason: Option<String>,
    },
    VacationCancelled {
        vacation_id: Uuid,
    },
    PayrollGenerated {
        pay_period_start: NaiveDate,
        pay_period_end: NaiveDate,
        net_pay: Decimal,
        currency: String,
    },
    ScheduleUpdated {
        schedule_id: Uuid,
        day_of_week: DayOfWeek,
        effective_date: NaiveDate,
    },
    AttendanceAlert {
        date: NaiveDate,
        issue: String,
    },
}

impl EventPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            EventPayload::VacationSubmitted { .. } => "vacation_submitted",
            EventPayload::VacationApproved { .. } => "vacation_approved",
            EventPayload::VacationRejected { .. } => "vacation_rejected",
            EventPayload::VacationCancelled { .. } => "vacation_cancelled",
            EventPayload::PayrollGenerated { .. } => "payroll_generated",
            EventPayload::ScheduleUpdated { .. } => "schedule_updated",
            EventPayload::AttendanceAlert { .. } => "attendance_alert",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainEvent {
    pub id: Uuid,
    pub employee_id: EmployeeId,
    #[serde(with = "timestamp")]
    pub occurred_at: NaiveDateTime,
    pub payload: EventPayload,
}

impl DomainEvent {
    pub fn new(employee_id: EmployeeId, occurred_at: NaiveDateTime, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            occurred_at,
            payload,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }
}
