use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use hrsuite_core::time::option_timestamp;
use hrsuite_core::{
    Clock, DateRange, DomainEvent, EmployeeId, Entity, EventPayload, EventSink, HrError,
    HrResult, KeyedGuard, PolicyConfig, RecordFilter, Repository, Stored, publish_or_warn,
};
use hrsuite_employees::EmployeeDirectory;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

hrsuite_core::string_enum! {
    pub enum VacationType {
        Annual => "annual",
        Sick => "sick",
        Personal => "personal",
        Maternity => "maternity",
        Paternity => "paternity",
        Bereavement => "bereavement",
        Emergency => "emergency",
    }
}

hrsuite_core::string_enum! {
    pub enum VacationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

impl VacationStatus {
    /// Approved and pending requests both hold days.
    pub fn holds_days(self) -> bool {
        matches!(self, VacationStatus::Pending | VacationStatus::Approved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vacation {
    pub id: Uuid,
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_requested: i64,
    #[serde(rename = "type")]
    pub vacation_type: VacationType,
    pub status: VacationStatus,
    pub approved_by: Option<EmployeeId>,
    #[serde(default, with = "option_timestamp")]
    pub approved_at: Option<NaiveDateTime>,
    pub reason: Option<String>,
}

impl Vacation {
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    fn transition(
        &mut self,
        to: VacationStatus,
        decided_by: Option<EmployeeId>,
        at: NaiveDateTime,
    ) -> HrResult<()> {
        if self.status != VacationStatus::Pending {
            return Err(HrError::conflict(format!(
                "vacation {} is {} and can no longer become {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        if let Some(decided_by) = decided_by {
            self.approved_by = Some(decided_by);
            self.approved_at = Some(at);
        }
        Ok(())
    }
}

impl Entity for Vacation {
    const KIND: &'static str = "vacation";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationRequest {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub vacation_type: VacationType,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VacationBalance {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub annual_allowance: i64,
    pub used_days: i64,
    pub pending_days: i64,
    pub available_days: i64,
}

/// Vacation request lifecycle and day accounting.
///
/// `Pending` is the only state that accepts a transition; approved,
/// rejected and cancelled requests are final. Submissions for one employee
/// run one at a time so the overlap check sees every earlier request.
pub struct VacationLedger {
    vacations: Arc<dyn Repository<Vacation>>,
    submissions: KeyedGuard<EmployeeId>,
    directory: EmployeeDirectory,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    policy: Arc<PolicyConfig>,
}

impl VacationLedger {
    pub fn new(
        vacations: Arc<dyn Repository<Vacation>>,
        directory: EmployeeDirectory,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        policy: Arc<PolicyConfig>,
    ) -> Self {
        Self {
            vacations,
            submissions: KeyedGuard::new(),
            directory,
            events,
            clock,
            policy,
        }
    }

    pub async fn submit(&self, request: VacationRequest) -> HrResult<Vacation> {
        self.directory.require_active(request.employee_id).await?;

        if request.start_date >= request.end_date {
            return Err(HrError::validation(format!(
                "start date {} must be before end date {}",
                request.start_date, request.end_date
            )));
        }
        let today = self.clock.today();
        if request.start_date < today {
            return Err(HrError::validation(format!(
                "vacations cannot start in the past ({} < {today})",
                request.start_date
            )));
        }

        let range = DateRange::new(request.start_date, request.end_date)?;
        let _submitting = self.submissions.lock(request.employee_id).await;
        let clash = self
            .employee_vacations(request.employee_id)
            .await?
            .into_iter()
            .find(|other| other.status.holds_days() && other.range().intersects(&range));
        if let Some(other) = clash {
            return Err(HrError::validation(format!(
                "overlaps {} vacation {} ({} to {})",
                other.status, other.id, other.start_date, other.end_date
            )));
        }

        let vacation = Vacation {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            start_date: request.start_date,
            end_date: request.end_date,
            days_requested: range.days(),
            vacation_type: request.vacation_type,
            status: VacationStatus::Pending,
            approved_by: None,
            approved_at: None,
            reason: request
                .reason
                .map(|reason| reason.trim().to_string())
                .filter(|reason| !reason.is_empty()),
        };

        let stored = self.vacations.insert(vacation).await?;
        let vacation = stored.value;
        info!(
            "vacation requested by employee {}: {} to {} ({} days)",
            vacation.employee_id, vacation.start_date, vacation.end_date, vacation.days_requested
        );
        self.emit(
            vacation.employee_id,
            EventPayload::VacationSubmitted {
                vacation_id: vacation.id,
                start_date: vacation.start_date,
                end_date: vacation.end_date,
                days_requested: vacation.days_requested,
            },
        )
        .await;
        Ok(vacation)
    }

    pub async fn approve(&self, vacation_id: Uuid, approved_by: EmployeeId) -> HrResult<Vacation> {
        let vacation = self
            .decide(vacation_id, VacationStatus::Approved, Some(approved_by))
            .await?;
        self.emit(
            vacation.employee_id,
            EventPayload::VacationApproved {
                vacation_id,
                start_date: vacation.start_date,
                end_date: vacation.end_date,
                approved_by,
            },
        )
        .await;
        Ok(vacation)
    }

    pub async fn reject(
        &self,
        vacation_id: Uuid,
        rejected_by: EmployeeId,
        reason: Option<String>,
    ) -> HrResult<Vacation> {
        let vacation = self
            .decide(vacation_id, VacationStatus::Rejected, Some(rejected_by))
            .await?;
        self.emit(
            vacation.employee_id,
            EventPayload::VacationRejected {
                vacation_id,
                start_date: vacation.start_date,
                end_date: vacation.end_date,
                rejected_by,
                reason,
            },
        )
        .await;
        Ok(vacation)
    }

    pub async fn cancel(&self, vacation_id: Uuid) -> HrResult<Vacation> {
        let vacation = self
            .decide(vacation_id, VacationStatus::Cancelled, None)
            .await?;
        self.emit(
            vacation.employee_id,
            EventPayload::VacationCancelled { vacation_id },
        )
        .await;
        Ok(vacation)
    }

    pub async fn get(&self, vacation_id: Uuid) -> HrResult<Vacation> {
        Ok(self.load(vacation_id).await?.value)
    }

    /// Every request of one employee, ordered by start date.
    pub async fn employee_vacations(&self, employee_id: EmployeeId) -> HrResult<Vec<Vacation>> {
        let mut vacations: Vec<Vacation> = self
            .vacations
            .list(RecordFilter::employee(employee_id))
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .collect();
        vacations.sort_by_key(|vacation| vacation.start_date);
        Ok(vacations)
    }

    pub async fn pending_requests(&self) -> HrResult<Vec<Vacation>> {
        self.all_with(|vacation| vacation.status == VacationStatus::Pending)
            .await
    }

    /// Approved vacations touching `[start, end]`.
    pub async fn calendar(&self, start: NaiveDate, end: NaiveDate) -> HrResult<Vec<Vacation>> {
        let window = DateRange::new(start, end)?;
        self.all_with(|vacation| {
            vacation.status == VacationStatus::Approved && vacation.range().intersects(&window)
        })
        .await
    }

    /// Days are attributed to the year the vacation starts in.
    pub async fn balance(&self, employee_id: EmployeeId, year: i32) -> HrResult<VacationBalance> {
        self.directory.get(employee_id).await?;

        let mut used_days = 0;
        let mut pending_days = 0;
        for vacation in self.employee_vacations(employee_id).await? {
            if vacation.start_date.year() != year {
                continue;
            }
            match vacation.status {
                VacationStatus::Approved => used_days += vacation.days_requested,
                VacationStatus::Pending => pending_days += vacation.days_requested,
                VacationStatus::Rejected | VacationStatus::Cancelled => {}
            }
        }

        let annual_allowance = self.policy.annual_vacation_days;
        Ok(VacationBalance {
            employee_id,
            year,
            annual_allowance,
            used_days,
            pending_days,
            available_days: annual_allowance - used_days - pending_days,
        })
    }

    async fn decide(
        &self,
        vacation_id: Uuid,
        to: VacationStatus,
        decided_by: Option<EmployeeId>,
    ) -> HrResult<Vacation> {
        if let Some(decided_by) = decided_by {
            self.directory.get(decided_by).await?;
        }

        let stored = self.load(vacation_id).await?;
        let mut vacation = stored.value;
        vacation.transition(to, decided_by, self.clock.now())?;

        let updated = self.vacations.update(vacation, stored.version).await?;
        info!("vacation {vacation_id} is now {to}");
        Ok(updated.value)
    }

    async fn load(&self, vacation_id: Uuid) -> HrResult<Stored<Vacation>> {
        self.vacations
            .get(&vacation_id.to_string())
            .await?
            .ok_or_else(|| HrError::not_found("vacation", vacation_id))
    }

    async fn all_with(&self, keep: impl Fn(&Vacation) -> bool) -> HrResult<Vec<Vacation>> {
        let mut vacations: Vec<Vacation> = self
            .vacations
            .list(RecordFilter::all())
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .filter(|vacation| keep(vacation))
            .collect();
        vacations.sort_by_key(|vacation| (vacation.start_date, vacation.employee_id));
        Ok(vacations)
    }

    async fn emit(&self, employee_id: EmployeeId, payload: EventPayload) {
        let event = DomainEvent::new(employee_id, self.clock.now(), payload);
        publish_or_warn(self.events.as_ref(), event).await;
    }
}
