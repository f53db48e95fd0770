use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use hrsuite_core::time::{rounded_hours, time_of_day};
use hrsuite_core::{
    Clock, DayOfWeek, DomainEvent, EmployeeId, Entity, EventPayload, EventSink, HrError,
    HrResult, KeyedGuard, RecordFilter, Repository, TimeRange, publish_or_warn,
};
use hrsuite_employees::EmployeeDirectory;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// One recurring shift on one weekday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: Uuid,
    pub employee_id: EmployeeId,
    pub day_of_week: DayOfWeek,
    #[serde(with = "time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub end_time: NaiveTime,
    /// Minutes.
    pub break_duration: i64,
    pub is_active: bool,
}

impl Schedule {
    pub fn range(&self) -> HrResult<TimeRange> {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn work_hours(&self) -> f64 {
        work_hours(self.start_time, self.end_time, self.break_duration)
    }

    pub fn view(&self) -> ScheduleView {
        ScheduleView {
            schedule: self.clone(),
            day_name: self.day_of_week.name(),
            work_hours: self.work_hours(),
        }
    }
}

impl Entity for Schedule {
    const KIND: &'static str = "schedule";

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }
}

/// `(end - start)` in hours minus the break.
pub fn work_hours(start: NaiveTime, end: NaiveTime, break_minutes: i64) -> f64 {
    let span = end.signed_duration_since(start).num_seconds() as f64 / 3600.0;
    span - break_minutes as f64 / 60.0
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub day_name: &'static str,
    #[serde(serialize_with = "rounded_hours::serialize")]
    pub work_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSchedule {
    pub employee_id: EmployeeId,
    pub day_of_week: DayOfWeek,
    #[serde(with = "time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub end_time: NaiveTime,
    #[serde(default = "default_break_minutes")]
    pub break_duration: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    #[serde(default, with = "hrsuite_core::time::option_time_of_day")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hrsuite_core::time::option_time_of_day")]
    pub end_time: Option<NaiveTime>,
    pub break_duration: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayPlan {
    pub day_of_week: DayOfWeek,
    pub day_name: &'static str,
    pub shifts: Vec<ScheduleView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySchedule {
    pub employee_id: EmployeeId,
    pub days: Vec<DayPlan>,
    #[serde(serialize_with = "rounded_hours::serialize")]
    pub total_hours: f64,
}

fn default_break_minutes() -> i64 {
    60
}

/// Weekly shift definitions. Writes for one employee are serialized so the
/// same-day overlap check always sees the other active shifts.
pub struct ScheduleValidator {
    schedules: Arc<dyn Repository<Schedule>>,
    writes: KeyedGuard<EmployeeId>,
    directory: EmployeeDirectory,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl ScheduleValidator {
    pub fn new(
        schedules: Arc<dyn Repository<Schedule>>,
        directory: EmployeeDirectory,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            schedules,
            writes: KeyedGuard::new(),
            directory,
            events,
            clock,
        }
    }

    pub async fn define(&self, request: NewSchedule) -> HrResult<Schedule> {
        self.directory.require_active(request.employee_id).await?;

        let schedule = Schedule {
            id: Uuid::new_v4(),
            employee_id: request.employee_id,
            day_of_week: request.day_of_week,
            start_time: request.start_time,
            end_time: request.end_time,
            break_duration: request.break_duration,
            is_active: true,
        };
        let _writing = self.writes.lock(schedule.employee_id).await;
        self.validate(&schedule).await?;

        let stored = self.schedules.insert(schedule).await?;
        info!(
            "schedule defined for employee {}: {} {}-{}",
            stored.value.employee_id,
            stored.value.day_of_week.name(),
            stored.value.start_time,
            stored.value.end_time
        );
        self.announce(&stored.value).await;
        Ok(stored.value)
    }

    pub async fn update(&self, schedule_id: Uuid, changes: ScheduleUpdate) -> HrResult<Schedule> {
        let stored = self.load(schedule_id).await?;
        let mut schedule = stored.value;
        if !schedule.is_active {
            return Err(HrError::conflict(format!(
                "schedule {schedule_id} is inactive"
            )));
        }

        if let Some(start_time) = changes.start_time {
            schedule.start_time = start_time;
        }
        if let Some(end_time) = changes.end_time {
            schedule.end_time = end_time;
        }
        if let Some(break_duration) = changes.break_duration {
            schedule.break_duration = break_duration;
        }
        let _writing = self.writes.lock(schedule.employee_id).await;
        self.validate(&schedule).await?;

        let updated = self.schedules.update(schedule, stored.version).await?;
        info!("schedule updated: {schedule_id}");
        self.announce(&updated.value).await;
        Ok(updated.value)
    }

    pub async fn deactivate(&self, schedule_id: Uuid) -> HrResult<Schedule> {
        let stored = self.load(schedule_id).await?;
        if !stored.value.is_active {
            return Ok(stored.value);
        }

        let mut schedule = stored.value;
        schedule.is_active = false;
        let updated = self.schedules.update(schedule, stored.version).await?;
        info!("schedule deactivated: {schedule_id}");
        self.announce(&updated.value).await;
        Ok(updated.value)
    }

    /// All schedules of one employee, ordered by weekday then start time.
    pub async fn employee_schedules(&self, employee_id: EmployeeId) -> HrResult<Vec<Schedule>> {
        self.directory.get(employee_id).await?;
        let mut schedules: Vec<Schedule> = self
            .schedules
            .list(RecordFilter::employee(employee_id))
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .collect();
        schedules.sort_by_key(|schedule| (schedule.day_of_week, schedule.start_time));
        Ok(schedules)
    }

    async fn active_schedules(&self, employee_id: EmployeeId) -> HrResult<Vec<Schedule>> {
        Ok(self
            .employee_schedules(employee_id)
            .await?
            .into_iter()
            .filter(|schedule| schedule.is_active)
            .collect())
    }

    pub async fn weekly_hours(&self, employee_id: EmployeeId) -> HrResult<f64> {
        Ok(self
            .active_schedules(employee_id)
            .await?
            .iter()
            .map(Schedule::work_hours)
            .sum())
    }

    pub async fn weekly_schedule(&self, employee_id: EmployeeId) -> HrResult<WeeklySchedule> {
        let schedules = self.active_schedules(employee_id).await?;
        let total_hours = schedules.iter().map(Schedule::work_hours).sum();

        let days = DayOfWeek::ALL
            .iter()
            .filter_map(|day| {
                let shifts: Vec<ScheduleView> = schedules
                    .iter()
                    .filter(|schedule| schedule.day_of_week == *day)
                    .map(Schedule::view)
                    .collect();
                (!shifts.is_empty()).then(|| DayPlan {
                    day_of_week: *day,
                    day_name: day.name(),
                    shifts,
                })
            })
            .collect();

        Ok(WeeklySchedule {
            employee_id,
            days,
            total_hours,
        })
    }

    /// Earliest active shift start for the weekday of `date`, if any.
    pub async fn expected_start(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> HrResult<Option<NaiveTime>> {
        let day = DayOfWeek::of(date);
        Ok(self
            .active_schedules(employee_id)
            .await?
            .into_iter()
            .filter(|schedule| schedule.day_of_week == day)
            .map(|schedule| schedule.start_time)
            .min())
    }

    async fn validate(&self, candidate: &Schedule) -> HrResult<()> {
        let range = candidate.range()?;
        if candidate.break_duration < 0 {
            return Err(HrError::validation("break_duration must not be negative"));
        }
        if candidate.work_hours() < 0.0 {
            return Err(HrError::validation(format!(
                "break of {} minutes is longer than the shift",
                candidate.break_duration
            )));
        }

        let existing = self
            .schedules
            .list(RecordFilter::employee(candidate.employee_id))
            .await?;
        let clash = existing
            .iter()
            .map(|stored| &stored.value)
            .filter(|other| {
                other.id != candidate.id
                    && other.is_active
                    && other.day_of_week == candidate.day_of_week
            })
            .find(|other| {
                other
                    .range()
                    .map(|other_range| other_range.overlaps(&range))
                    .unwrap_or(false)
            });

        if let Some(other) = clash {
            return Err(HrError::validation(format!(
                "overlaps existing {} schedule {}-{}",
                other.day_of_week.name(),
                other.start_time,
                other.end_time
            )));
        }
        Ok(())
    }

    async fn load(&self, schedule_id: Uuid) -> HrResult<hrsuite_core::Stored<Schedule>> {
        self.schedules
            .get(&schedule_id.to_string())
            .await?
            .ok_or_else(|| HrError::not_found("schedule", schedule_id))
    }

    async fn announce(&self, schedule: &Schedule) {
        let now = self.clock.now();
        let event = DomainEvent::new(
            schedule.employee_id,
            now,
            EventPayload::ScheduleUpdated {
                schedule_id: schedule.id,
                day_of_week: schedule.day_of_week,
                effective_date: now.date(),
            },
        );
        publish_or_warn(self.events.as_ref(), event).await;
    }
}
