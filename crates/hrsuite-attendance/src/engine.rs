use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use hrsuite_core::time::{round_hours, truncate_to_seconds};
use hrsuite_core::{
    Clock, DateRange, DomainEvent, EmployeeId, EventPayload, EventSink, HrError, HrResult,
    PolicyConfig, RecordFilter, Repository, publish_or_warn,
};
use hrsuite_employees::EmployeeDirectory;
use hrsuite_schedules::ScheduleValidator;
use serde::Serialize;
use tracing::info;

use crate::record::{AttendanceRecord, AttendanceStatus, compute_worked_time};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceSummary {
    pub employee_id: EmployeeId,
    pub period: String,
    pub total_days: usize,
    pub present_days: usize,
    pub late_days: usize,
    pub absent_days: usize,
    pub half_days: usize,
    pub overtime_days: usize,
    pub total_hours_worked: f64,
    pub total_overtime_hours: f64,
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceReport {
    pub period: String,
    pub total_employees: usize,
    pub average_attendance_rate: f64,
    pub total_hours_worked: f64,
    pub total_overtime_hours: f64,
    pub employees: Vec<AttendanceSummary>,
}

/// Daily check-in/check-out lifecycle.
///
/// A record is created by the first check-in of the day, completed by the
/// check-out, and never reopened afterwards.
pub struct AttendanceEngine {
    records: Arc<dyn Repository<AttendanceRecord>>,
    directory: EmployeeDirectory,
    schedules: Arc<ScheduleValidator>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
    policy: Arc<PolicyConfig>,
}

impl AttendanceEngine {
    pub fn new(
        records: Arc<dyn Repository<AttendanceRecord>>,
        directory: EmployeeDirectory,
        schedules: Arc<ScheduleValidator>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        policy: Arc<PolicyConfig>,
    ) -> Self {
        Self {
            records,
            directory,
            schedules,
            events,
            clock,
            policy,
        }
    }

    /// Opens the day's record. `date` and `time` default to the clock.
    pub async fn check_in(
        &self,
        employee_id: EmployeeId,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> HrResult<AttendanceRecord> {
        self.directory.require_active(employee_id).await?;

        let now = self.clock.now();
        let date = date.unwrap_or(now.date());
        let time = truncate_to_seconds(time.unwrap_or(now.time()));
        let status = self.arrival_status(employee_id, date, time).await?;

        let key = AttendanceRecord::key_for(employee_id, date);
        let stored = match self.records.get(&key).await? {
            Some(existing) if existing.value.check_in_time.is_some() => {
                return Err(HrError::conflict(format!(
                    "employee {employee_id} already checked in on {date}"
                )));
            }
            Some(existing) => {
                let mut record = existing.value;
                record.check_in_time = Some(time);
                record.status = status;
                self.records.update(record, existing.version).await?
            }
            None => {
                let record = AttendanceRecord {
                    employee_id,
                    date,
                    check_in_time: Some(time),
                    check_out_time: None,
                    hours_worked: 0.0,
                    overtime_hours: 0.0,
                    status,
                    notes: None,
                    created_at: now,
                };
                self.records.insert(record).await?
            }
        };

        info!("check-in recorded: employee {employee_id} at {date} {time}");
        if status == AttendanceStatus::Late {
            self.alert(employee_id, date, format!("late check-in at {time}"))
                .await;
        }
        Ok(stored.value)
    }

    /// Closes the day's record and derives worked and overtime hours.
    pub async fn check_out(
        &self,
        employee_id: EmployeeId,
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    ) -> HrResult<AttendanceRecord> {
        self.directory.get(employee_id).await?;

        let now = self.clock.now();
        let date = date.unwrap_or(now.date());
        let time = truncate_to_seconds(time.unwrap_or(now.time()));

        let key = AttendanceRecord::key_for(employee_id, date);
        let Some(stored) = self.records.get(&key).await? else {
            return Err(HrError::conflict(format!(
                "employee {employee_id} has no check-in on {date}"
            )));
        };
        let mut record = stored.value;
        let Some(check_in) = record.check_in_time else {
            return Err(HrError::conflict(format!(
                "employee {employee_id} has no check-in on {date}"
            )));
        };
        if record.check_out_time.is_some() {
            return Err(HrError::conflict(format!(
                "employee {employee_id} already checked out on {date}"
            )));
        }

        let worked = compute_worked_time(check_in, time, &self.policy);
        record.check_out_time = Some(time);
        record.hours_worked = worked.hours_worked;
        record.overtime_hours = worked.overtime_hours;
        if worked.has_overtime() {
            record.status = AttendanceStatus::Overtime;
        }

        let updated = self.records.update(record, stored.version).await?;
        info!(
            "check-out recorded: employee {employee_id} at {date} {time}, {:.2}h worked",
            updated.value.hours_worked
        );
        Ok(updated.value)
    }

    /// HR marks a day without punches as absent or half-day.
    pub async fn mark_day(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
        status: AttendanceStatus,
        notes: Option<String>,
    ) -> HrResult<AttendanceRecord> {
        self.directory.get(employee_id).await?;

        let hours_worked = match status {
            AttendanceStatus::Absent => 0.0,
            AttendanceStatus::HalfDay => self.policy.standard_day_hours / 2.0,
            other => {
                return Err(HrError::validation(format!(
                    "only absent or half-day can be marked manually, got {other}"
                )));
            }
        };

        let key = AttendanceRecord::key_for(employee_id, date);
        let stored = match self.records.get(&key).await? {
            Some(existing) if existing.value.check_in_time.is_some() => {
                return Err(HrError::conflict(format!(
                    "employee {employee_id} already has punches on {date}"
                )));
            }
            Some(existing) => {
                let mut record = existing.value;
                record.status = status;
                record.hours_worked = hours_worked;
                record.notes = notes;
                self.records.update(record, existing.version).await?
            }
            None => {
                let record = AttendanceRecord {
                    employee_id,
                    date,
                    check_in_time: None,
                    check_out_time: None,
                    hours_worked,
                    overtime_hours: 0.0,
                    status,
                    notes,
                    created_at: self.clock.now(),
                };
                self.records.insert(record).await?
            }
        };

        info!("attendance marked {status} for employee {employee_id} on {date}");
        Ok(stored.value)
    }

    pub async fn record_for(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> HrResult<Option<AttendanceRecord>> {
        Ok(self
            .records
            .get(&AttendanceRecord::key_for(employee_id, date))
            .await?
            .map(|stored| stored.value))
    }

    /// Records inside `[start, end]`, oldest first.
    pub async fn records_between(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrResult<Vec<AttendanceRecord>> {
        let window = DateRange::new(start, end)?;
        let mut records: Vec<AttendanceRecord> = self
            .records
            .list(RecordFilter::employee(employee_id))
            .await?
            .into_iter()
            .map(|stored| stored.value)
            .filter(|record| window.contains(record.date))
            .collect();
        records.sort_by_key(|record| record.date);
        Ok(records)
    }

    /// The last `days` days up to today, newest first.
    pub async fn history(&self, employee_id: EmployeeId, days: u32) -> HrResult<Vec<AttendanceRecord>> {
        self.directory.get(employee_id).await?;
        let end = self.clock.today();
        let start = end - TimeDelta::days(i64::from(days.max(1)) - 1);
        let mut records = self.records_between(employee_id, start, end).await?;
        records.reverse();
        Ok(records)
    }

    pub async fn summary(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> HrResult<AttendanceSummary> {
        self.directory.get(employee_id).await?;
        let records = self.records_between(employee_id, start, end).await?;
        Ok(summarize(employee_id, start, end, &records))
    }

    /// Summaries for every active employee over the same window.
    pub async fn report(&self, start: NaiveDate, end: NaiveDate) -> HrResult<AttendanceReport> {
        DateRange::new(start, end)?;
        let mut employees = Vec::new();
        for employee in self.directory.active().await? {
            let records = self.records_between(employee.id, start, end).await?;
            employees.push(summarize(employee.id, start, end, &records));
        }

        let total_employees = employees.len();
        let average_attendance_rate = if total_employees > 0 {
            round_hours(
                employees.iter().map(|summary| summary.attendance_rate).sum::<f64>()
                    / total_employees as f64,
            )
        } else {
            0.0
        };

        Ok(AttendanceReport {
            period: period_label(start, end),
            total_employees,
            average_attendance_rate,
            total_hours_worked: round_hours(
                employees.iter().map(|summary| summary.total_hours_worked).sum(),
            ),
            total_overtime_hours: round_hours(
                employees.iter().map(|summary| summary.total_overtime_hours).sum(),
            ),
            employees,
        })
    }

    async fn arrival_status(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> HrResult<AttendanceStatus> {
        let Some(expected) = self.schedules.expected_start(employee_id, date).await? else {
            return Ok(AttendanceStatus::Present);
        };
        let grace = TimeDelta::minutes(self.policy.late_grace_minutes);
        if time.signed_duration_since(expected) > grace {
            Ok(AttendanceStatus::Late)
        } else {
            Ok(AttendanceStatus::Present)
        }
    }

    async fn alert(&self, employee_id: EmployeeId, date: NaiveDate, issue: String) {
        let event = DomainEvent::new(
            employee_id,
            self.clock.now(),
            EventPayload::AttendanceAlert { date, issue },
        );
        publish_or_warn(self.events.as_ref(), event).await;
    }
}

fn period_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{start} to {end}")
}

fn summarize(
    employee_id: EmployeeId,
    start: NaiveDate,
    end: NaiveDate,
    records: &[AttendanceRecord],
) -> AttendanceSummary {
    let count = |status: AttendanceStatus| {
        records
            .iter()
            .filter(|record| record.status == status)
            .count()
    };

    let total_days = records.len();
    let present_days = count(AttendanceStatus::Present);
    let attendance_rate = if total_days > 0 {
        round_hours(present_days as f64 / total_days as f64 * 100.0)
    } else {
        0.0
    };

    AttendanceSummary {
        employee_id,
        period: period_label(start, end),
        total_days,
        present_days,
        late_days: count(AttendanceStatus::Late),
        absent_days: count(AttendanceStatus::Absent),
        half_days: count(AttendanceStatus::HalfDay),
        overtime_days: count(AttendanceStatus::Overtime),
        total_hours_worked: round_hours(records.iter().map(|record| record.hours_worked).sum()),
        total_overtime_hours: round_hours(
            records.iter().map(|record| record.overtime_hours).sum(),
        ),
        attendance_rate,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use hrsuite_core::{DayOfWeek, Employee, FixedClock};
    use hrsuite_employees::NewEmployee;
    use hrsuite_schedules::{NewSchedule, Schedule};
    use hrsuite_store::{InMemoryOutbox, InMemoryRepository};

    use super::*;
    use crate::devices::{DeviceRegistry, IdentityAssertion, PunchAction};

    fn d(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn t(raw: &str) -> NaiveTime {
        NaiveTime::parse_from_str(raw, "%H:%M:%S").unwrap()
    }

    struct BrokenSink;

    #[async_trait]
    impl EventSink for BrokenSink {
        async fn publish(&self, _event: DomainEvent) -> anyhow::Result<()> {
            anyhow::bail!("bus unavailable")
        }
    }

    struct Fixture {
        engine: AttendanceEngine,
        schedules: Arc<ScheduleValidator>,
        directory: EmployeeDirectory,
        clock: Arc<FixedClock>,
        outbox: Arc<InMemoryOutbox>,
        employee_id: EmployeeId,
    }

    async fn fixture_with_sink(sink: Option<Arc<dyn EventSink>>) -> Fixture {
        let clock = Arc::new(FixedClock::at(d("2024-07-03"), t("08:30:00")));
        let outbox = Arc::new(InMemoryOutbox::new());
        let events: Arc<dyn EventSink> =
            sink.unwrap_or_else(|| outbox.clone() as Arc<dyn EventSink>);
        let directory = EmployeeDirectory::new(
            Arc::new(InMemoryRepository::<Employee>::new()),
            clock.clone(),
        );
        let employee = directory
            .create(NewEmployee {
                employee_number: "EMP001".to_string(),
                first_name: "Juan".to_string(),
                last_name: "Pérez".to_string(),
                email: "juan@company.com".to_string(),
                phone: None,
                hire_date: None,
                position: "Analyst".to_string(),
                department: "IT".to_string(),
            })
            .await
            .unwrap();
        let schedules = Arc::new(ScheduleValidator::new(
            Arc::new(InMemoryRepository::<Schedule>::new()),
            directory.clone(),
            events.clone(),
            clock.clone(),
        ));
        let engine = AttendanceEngine::new(
            Arc::new(InMemoryRepository::<AttendanceRecord>::new()),
            directory.clone(),
            schedules.clone(),
            events,
            clock.clone(),
            Arc::new(PolicyConfig::default()),
        );
        Fixture {
            engine,
            schedules,
            directory,
            clock,
            outbox,
            employee_id: employee.id,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_sink(None).await
    }

    #[tokio::test]
    async fn check_in_then_out_derives_hours() {
        let fx = fixture().await;
        let opened = fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        assert_eq!(opened.check_in_time, Some(t("08:30:00")));
        assert_eq!(opened.date, d("2024-07-03"));
        assert_eq!(opened.status, AttendanceStatus::Present);

        fx.clock.set(d("2024-07-03").and_time(t("17:15:00")));
        let closed = fx.engine.check_out(fx.employee_id, None, None).await.unwrap();
        assert_eq!(closed.hours_worked, 7.75);
        assert_eq!(closed.overtime_hours, 0.0);
        assert_eq!(closed.status, AttendanceStatus::Present);
        assert!(closed.is_complete());
    }

    #[tokio::test]
    async fn second_check_in_same_day_is_a_conflict() {
        let fx = fixture().await;
        fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        let again = fx.engine.check_in(fx.employee_id, None, Some(t("09:00:00"))).await;
        assert!(matches!(again, Err(HrError::Conflict(_))));
    }

    #[tokio::test]
    async fn check_out_requires_open_record() {
        let fx = fixture().await;
        let none = fx.engine.check_out(fx.employee_id, None, None).await;
        assert!(matches!(none, Err(HrError::Conflict(msg)) if msg.contains("no check-in")));

        fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        fx.engine
            .check_out(fx.employee_id, None, Some(t("12:00:00")))
            .await
            .unwrap();
        let twice = fx
            .engine
            .check_out(fx.employee_id, None, Some(t("13:00:00")))
            .await;
        assert!(matches!(twice, Err(HrError::Conflict(msg)) if msg.contains("already checked out")));

        let reopen = fx.engine.check_in(fx.employee_id, None, None).await;
        assert!(reopen.is_err());
    }

    #[tokio::test]
    async fn overnight_shift_rolls_over_and_earns_overtime() {
        let fx = fixture().await;
        let night = d("2024-07-02");
        fx.engine
            .check_in(fx.employee_id, Some(night), Some(t("21:00:00")))
            .await
            .unwrap();
        let closed = fx
            .engine
            .check_out(fx.employee_id, Some(night), Some(t("08:00:00")))
            .await
            .unwrap();
        assert_eq!(closed.hours_worked, 10.0);
        assert_eq!(closed.overtime_hours, 2.0);
        assert_eq!(closed.status, AttendanceStatus::Overtime);
    }

    #[tokio::test]
    async fn late_arrival_is_classified_and_alerted() {
        let fx = fixture().await;
        fx.schedules
            .define(NewSchedule {
                employee_id: fx.employee_id,
                day_of_week: DayOfWeek::Wednesday,
                start_time: t("08:00:00"),
                end_time: t("17:00:00"),
                break_duration: 60,
            })
            .await
            .unwrap();

        let record = fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Late);

        let kinds: Vec<&str> = fx
            .outbox
            .stream(fx.employee_id)
            .await
            .iter()
            .map(DomainEvent::kind)
            .collect();
        assert_eq!(kinds, vec!["schedule_updated", "attendance_alert"]);

        let closed = fx
            .engine
            .check_out(fx.employee_id, None, Some(t("17:00:00")))
            .await
            .unwrap();
        assert_eq!(closed.status, AttendanceStatus::Late);
    }

    #[tokio::test]
    async fn arrival_within_grace_is_present() {
        let fx = fixture().await;
        fx.schedules
            .define(NewSchedule {
                employee_id: fx.employee_id,
                day_of_week: DayOfWeek::Wednesday,
                start_time: t("08:25:00"),
                end_time: t("17:00:00"),
                break_duration: 60,
            })
            .await
            .unwrap();
        let record = fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn failed_alert_delivery_keeps_the_check_in() {
        let fx = fixture_with_sink(Some(Arc::new(BrokenSink))).await;
        fx.schedules
            .define(NewSchedule {
                employee_id: fx.employee_id,
                day_of_week: DayOfWeek::Wednesday,
                start_time: t("07:00:00"),
                end_time: t("15:00:00"),
                break_duration: 30,
            })
            .await
            .unwrap();

        let record = fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Late);
        assert!(
            fx.engine
                .record_for(fx.employee_id, d("2024-07-03"))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn summary_counts_statuses_and_rate() {
        let fx = fixture().await;
        let id = fx.employee_id;
        for (day, out) in [("2024-07-01", "17:00:00"), ("2024-07-02", "19:30:00")] {
            fx.engine.check_in(id, Some(d(day)), Some(t("08:00:00"))).await.unwrap();
            fx.engine.check_out(id, Some(d(day)), Some(t(out))).await.unwrap();
        }
        fx.engine
            .mark_day(id, d("2024-07-03"), AttendanceStatus::Absent, Some("sick".into()))
            .await
            .unwrap();
        fx.engine
            .mark_day(id, d("2024-07-04"), AttendanceStatus::HalfDay, None)
            .await
            .unwrap();

        let summary = fx.engine.summary(id, d("2024-07-01"), d("2024-07-31")).await.unwrap();
        assert_eq!(summary.total_days, 4);
        assert_eq!(summary.present_days, 1);
        assert_eq!(summary.overtime_days, 1);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.half_days, 1);
        assert_eq!(summary.total_hours_worked, 8.0 + 10.5 + 4.0);
        assert_eq!(summary.total_overtime_hours, 2.5);
        assert_eq!(summary.attendance_rate, 25.0);
        assert_eq!(summary.period, "2024-07-01 to 2024-07-31");
    }

    #[tokio::test]
    async fn empty_window_reports_zero_rate() {
        let fx = fixture().await;
        let summary = fx
            .engine
            .summary(fx.employee_id, d("2024-06-01"), d("2024-06-30"))
            .await
            .unwrap();
        assert_eq!(summary.total_days, 0);
        assert_eq!(summary.attendance_rate, 0.0);

        let reversed = fx
            .engine
            .summary(fx.employee_id, d("2024-06-30"), d("2024-06-01"))
            .await;
        assert!(matches!(reversed, Err(HrError::Validation(_))));
    }

    #[tokio::test]
    async fn manual_marking_rejects_punched_days_and_other_statuses() {
        let fx = fixture().await;
        fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        let punched = fx
            .engine
            .mark_day(fx.employee_id, d("2024-07-03"), AttendanceStatus::Absent, None)
            .await;
        assert!(matches!(punched, Err(HrError::Conflict(_))));

        let wrong = fx
            .engine
            .mark_day(fx.employee_id, d("2024-07-05"), AttendanceStatus::Overtime, None)
            .await;
        assert!(matches!(wrong, Err(HrError::Validation(_))));
    }

    #[tokio::test]
    async fn absent_day_can_still_be_checked_into() {
        let fx = fixture().await;
        fx.engine
            .mark_day(fx.employee_id, d("2024-07-03"), AttendanceStatus::Absent, None)
            .await
            .unwrap();
        let record = fx.engine.check_in(fx.employee_id, None, None).await.unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn unknown_employee_is_not_found() {
        let fx = fixture().await;
        let result = fx.engine.check_in(EmployeeId(404), None, None).await;
        assert!(matches!(result, Err(HrError::NotFound { .. })));
    }

    #[tokio::test]
    async fn report_averages_active_employees() {
        let fx = fixture().await;
        fx.engine
            .check_in(fx.employee_id, Some(d("2024-07-01")), Some(t("08:00:00")))
            .await
            .unwrap();
        fx.engine
            .check_out(fx.employee_id, Some(d("2024-07-01")), Some(t("16:00:00")))
            .await
            .unwrap();
        fx.directory
            .create(NewEmployee {
                employee_number: "EMP002".to_string(),
                first_name: "Eva".to_string(),
                last_name: "Gil".to_string(),
                email: "eva@company.com".to_string(),
                phone: None,
                hire_date: None,
                position: "Clerk".to_string(),
                department: "HR".to_string(),
            })
            .await
            .unwrap();

        let report = fx.engine.report(d("2024-07-01"), d("2024-07-07")).await.unwrap();
        assert_eq!(report.total_employees, 2);
        assert_eq!(report.average_attendance_rate, 50.0);
        assert_eq!(report.total_hours_worked, 7.0);
    }

    #[tokio::test]
    async fn history_lists_recent_days_newest_first() {
        let fx = fixture().await;
        for day in ["2024-06-20", "2024-07-01", "2024-07-02"] {
            fx.engine
                .check_in(fx.employee_id, Some(d(day)), Some(t("08:00:00")))
                .await
                .unwrap();
        }
        let history = fx.engine.history(fx.employee_id, 7).await.unwrap();
        let dates: Vec<NaiveDate> = history.iter().map(|record| record.date).collect();
        assert_eq!(dates, vec![d("2024-07-02"), d("2024-07-01")]);
    }

    #[tokio::test]
    async fn device_punches_route_through_registered_devices() {
        let fx = fixture().await;
        let registry = DeviceRegistry::new();
        registry.register("BIO001", "Main entrance").await.unwrap();

        let punch = |action, at: &str| IdentityAssertion {
            employee_id: fx.employee_id,
            device_id: "BIO001".to_string(),
            action,
            asserted_at: Some(
                chrono::NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
            ),
        };

        registry
            .record(&fx.engine, punch(PunchAction::CheckIn, "2024-07-03 08:00:00"))
            .await
            .unwrap();
        let closed = registry
            .record(&fx.engine, punch(PunchAction::CheckOut, "2024-07-03 16:30:00"))
            .await
            .unwrap();
        assert_eq!(closed.hours_worked, 7.5);

        let unknown = registry
            .record(
                &fx.engine,
                IdentityAssertion {
                    device_id: "BIO999".to_string(),
                    ..punch(PunchAction::CheckIn, "2024-07-04 08:00:00")
                },
            )
            .await;
        assert!(matches!(unknown, Err(HrError::NotFound { .. })));

        registry.deactivate("BIO001").await.unwrap();
        let inactive = registry
            .record(&fx.engine, punch(PunchAction::CheckIn, "2024-07-04 08:00:00"))
            .await;
        assert!(matches!(inactive, Err(HrError::Conflict(_))));
    }
}
