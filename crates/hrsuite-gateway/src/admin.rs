//! Administrative portal routes under `/api`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use chrono::Datelike;
use hrsuite_attendance::{
    AttendanceRecord, AttendanceReport, AttendanceSummary, BiometricDevice,
};
use hrsuite_core::{Employee, EmployeeId};
use hrsuite_employees::{EmployeeQuery, EmployeeUpdate, NewEmployee};
use hrsuite_payroll::{
    Compensation, CompensationUpdate, DEFAULT_HISTORY_LIMIT, NewCompensation, PayrollRecord,
    PayrollReport,
};
use hrsuite_platform::{
    AnnualSalaryResponse, ApproveVacationRequest, BalanceQuery, EmployeeSearchQuery,
    GeneratePayrollRequest, HistoryQuery, MarkDayRequest, PeriodQuery, PunchRequest,
    RegisterDeviceRequest, RejectVacationRequest, WeeklyHoursResponse,
};
use hrsuite_schedules::{NewSchedule, Schedule, ScheduleUpdate, WeeklySchedule};
use hrsuite_vacations::{Vacation, VacationBalance, VacationRequest};
use uuid::Uuid;

use crate::app::{ApiResult, AppState, reject};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/{id}", get(get_employee).patch(update_employee))
        .route("/employees/{id}/deactivate", post(deactivate_employee))
        .route("/schedules", post(create_schedule))
        .route("/schedules/{id}", get(weekly_schedule).patch(update_schedule))
        .route("/schedules/{id}/hours", get(weekly_hours))
        .route("/schedules/{id}/deactivate", post(deactivate_schedule))
        .route("/vacations", post(submit_vacation))
        .route("/vacations/pending", get(pending_vacations))
        .route("/vacations/calendar", get(vacation_calendar))
        .route("/vacations/employee/{id}", get(employee_vacations))
        .route("/vacations/balance/{id}", get(vacation_balance))
        .route("/vacations/{id}/approve", post(approve_vacation))
        .route("/vacations/{id}/reject", post(reject_vacation))
        .route("/vacations/{id}/cancel", post(cancel_vacation))
        .route("/compensations", post(create_compensation))
        .route("/compensations/employee/{id}", get(employee_compensations))
        .route("/compensations/{id}", patch(update_compensation))
        .route("/compensations/{id}/deactivate", post(deactivate_compensation))
        .route("/payroll/batch", post(payroll_batch))
        .route("/payroll/report", get(payroll_report))
        .route("/payroll/{id}/generate", post(generate_payroll))
        .route("/payroll/{id}/history", get(payroll_history))
        .route("/payroll/{id}/annual-salary", get(annual_salary))
        .route("/attendance/checkin", post(check_in))
        .route("/attendance/checkout", post(check_out))
        .route("/attendance/mark", post(mark_day))
        .route("/attendance/summary/{id}", get(attendance_summary))
        .route("/attendance/report", get(attendance_report))
        .route("/devices", get(list_devices).post(register_device))
        .route("/devices/{id}/deactivate", post(deactivate_device))
}

async fn health() -> &'static str {
    "ok"
}

async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeSearchQuery>,
) -> ApiResult<Vec<Employee>> {
    let employees = match query.q.as_deref() {
        Some(needle) => state.directory.search(needle).await,
        None => {
            state
                .directory
                .list(EmployeeQuery {
                    department: query.department,
                    status: query.status,
                })
                .await
        }
    };
    employees.map(Json).map_err(reject)
}

async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<NewEmployee>,
) -> ApiResult<Employee> {
    state.directory.create(payload).await.map(Json).map_err(reject)
}

async fn get_employee(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Employee> {
    state.directory.get(EmployeeId(id)).await.map(Json).map_err(reject)
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> ApiResult<Employee> {
    state
        .directory
        .update(EmployeeId(id), payload)
        .await
        .map(Json)
        .map_err(reject)
}

async fn deactivate_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Employee> {
    state
        .directory
        .deactivate(EmployeeId(id))
        .await
        .map(Json)
        .map_err(reject)
}

async fn create_schedule(
    State(state): State<AppState>,
    Json(payload): Json<NewSchedule>,
) -> ApiResult<Schedule> {
    state.schedules.define(payload).await.map(Json).map_err(reject)
}

async fn weekly_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<WeeklySchedule> {
    state
        .schedules
        .weekly_schedule(EmployeeId(id))
        .await
        .map(Json)
        .map_err(reject)
}

async fn weekly_hours(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<WeeklyHoursResponse> {
    let employee_id = EmployeeId(id);
    let weekly_hours = state
        .schedules
        .weekly_hours(employee_id)
        .await
        .map_err(reject)?;
    Ok(Json(WeeklyHoursResponse {
        employee_id,
        weekly_hours: hrsuite_core::time::round_hours(weekly_hours),
    }))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleUpdate>,
) -> ApiResult<Schedule> {
    state
        .schedules
        .update(id, payload)
        .await
        .map(Json)
        .map_err(reject)
}

async fn deactivate_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Schedule> {
    state.schedules.deactivate(id).await.map(Json).map_err(reject)
}

async fn submit_vacation(
    State(state): State<AppState>,
    Json(payload): Json<VacationRequest>,
) -> ApiResult<Vacation> {
    state.vacations.submit(payload).await.map(Json).map_err(reject)
}

async fn pending_vacations(State(state): State<AppState>) -> ApiResult<Vec<Vacation>> {
    state
        .vacations
        .pending_requests()
        .await
        .map(Json)
        .map_err(reject)
}

async fn vacation_calendar(
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> ApiResult<Vec<Vacation>> {
    state
        .vacations
        .calendar(period.start_date, period.end_date)
        .await
        .map(Json)
        .map_err(reject)
}

async fn employee_vacations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Vacation>> {
    let employee_id = EmployeeId(id);
    state.directory.get(employee_id).await.map_err(reject)?;
    state
        .vacations
        .employee_vacations(employee_id)
        .await
        .map(Json)
        .map_err(reject)
}

pub(crate) async fn vacation_balance(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<VacationBalance> {
    let year = query.year.unwrap_or_else(|| state.clock.today().year());
    state
        .vacations
        .balance(EmployeeId(id), year)
        .await
        .map(Json)
        .map_err(reject)
}

async fn approve_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveVacationRequest>,
) -> ApiResult<Vacation> {
    state
        .vacations
        .approve(id, payload.approved_by)
        .await
        .map(Json)
        .map_err(reject)
}

async fn reject_vacation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectVacationRequest>,
) -> ApiResult<Vacation> {
    state
        .vacations
        .reject(id, payload.rejected_by, payload.reason)
        .await
        .map(Json)
        .map_err(reject)
}

async fn cancel_vacation(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vacation> {
    state.vacations.cancel(id).await.map(Json).map_err(reject)
}

async fn create_compensation(
    State(state): State<AppState>,
    Json(payload): Json<NewCompensation>,
) -> ApiResult<Compensation> {
    state
        .payroll
        .create_compensation(payload)
        .await
        .map(Json)
        .map_err(reject)
}

async fn employee_compensations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Compensation>> {
    let employee_id = EmployeeId(id);
    state.directory.get(employee_id).await.map_err(reject)?;
    state
        .payroll
        .employee_compensations(employee_id)
        .await
        .map(Json)
        .map_err(reject)
}

async fn update_compensation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompensationUpdate>,
) -> ApiResult<Compensation> {
    state
        .payroll
        .update_compensation(id, payload)
        .await
        .map(Json)
        .map_err(reject)
}

async fn deactivate_compensation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Compensation> {
    state
        .payroll
        .deactivate_compensation(id)
        .await
        .map(Json)
        .map_err(reject)
}

async fn generate_payroll(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<GeneratePayrollRequest>,
) -> ApiResult<PayrollRecord> {
    state
        .payroll
        .generate(EmployeeId(id), payload.pay_period_start, payload.pay_period_end)
        .await
        .map(Json)
        .map_err(reject)
}

async fn payroll_batch(
    State(state): State<AppState>,
    Json(payload): Json<GeneratePayrollRequest>,
) -> ApiResult<Vec<PayrollRecord>> {
    state
        .payroll
        .batch(payload.pay_period_start, payload.pay_period_end)
        .await
        .map(Json)
        .map_err(reject)
}

async fn payroll_report(
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> ApiResult<PayrollReport> {
    state
        .payroll
        .report(period.start_date, period.end_date)
        .await
        .map(Json)
        .map_err(reject)
}

async fn payroll_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<PayrollRecord>> {
    state
        .payroll
        .history(EmployeeId(id), query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await
        .map(Json)
        .map_err(reject)
}

async fn annual_salary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<AnnualSalaryResponse> {
    let employee_id = EmployeeId(id);
    let annual_salary = state
        .payroll
        .annual_salary(employee_id)
        .await
        .map_err(reject)?;
    Ok(Json(AnnualSalaryResponse {
        employee_id,
        annual_salary,
        currency: state.policy.default_currency.clone(),
    }))
}

async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<PunchRequest>,
) -> ApiResult<AttendanceRecord> {
    state
        .attendance
        .check_in(payload.employee_id, payload.date, payload.time)
        .await
        .map(|record| Json(record.rounded()))
        .map_err(reject)
}

async fn check_out(
    State(state): State<AppState>,
    Json(payload): Json<PunchRequest>,
) -> ApiResult<AttendanceRecord> {
    state
        .attendance
        .check_out(payload.employee_id, payload.date, payload.time)
        .await
        .map(|record| Json(record.rounded()))
        .map_err(reject)
}

async fn mark_day(
    State(state): State<AppState>,
    Json(payload): Json<MarkDayRequest>,
) -> ApiResult<AttendanceRecord> {
    state
        .attendance
        .mark_day(payload.employee_id, payload.date, payload.status, payload.notes)
        .await
        .map(|record| Json(record.rounded()))
        .map_err(reject)
}

async fn attendance_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(period): Query<PeriodQuery>,
) -> ApiResult<AttendanceSummary> {
    state
        .attendance
        .summary(EmployeeId(id), period.start_date, period.end_date)
        .await
        .map(Json)
        .map_err(reject)
}

async fn attendance_report(
    State(state): State<AppState>,
    Query(period): Query<PeriodQuery>,
) -> ApiResult<AttendanceReport> {
    state
        .attendance
        .report(period.start_date, period.end_date)
        .await
        .map(Json)
        .map_err(reject)
}

async fn list_devices(State(state): State<AppState>) -> Json<Vec<BiometricDevice>> {
    Json(state.devices.list().await)
}

async fn register_device(
    State(state): State<AppState>,
    Json(payload): Json<RegisterDeviceRequest>,
) -> ApiResult<BiometricDevice> {
    state
        .devices
        .register(&payload.device_id, &payload.location)
        .await
        .map(Json)
        .map_err(reject)
}

async fn deactivate_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BiometricDevice> {
    state.devices.deactivate(&id).await.map(Json).map_err(reject)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::app::testing::Harness;

    #[tokio::test]
    async fn employee_lifecycle_over_http() {
        let harness = Harness::new().await;
        let (status, created) = harness
            .call(
                "POST",
                "/api/employees",
                Some(json!({
                    "employee_number": "EMP001",
                    "first_name": "Juan",
                    "last_name": "Pérez",
                    "email": "juan.perez@company.com",
                    "phone": null,
                    "hire_date": "2024-01-15",
                    "position": "Developer",
                    "department": "IT"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["id"], 1);
        assert_eq!(created["status"], "active");

        let (status, _) = harness
            .call(
                "POST",
                "/api/employees",
                Some(json!({
                    "employee_number": "emp001",
                    "first_name": "Otro",
                    "last_name": "Empleado",
                    "email": "otro@company.com",
                    "phone": null,
                    "hire_date": null,
                    "position": "Developer",
                    "department": "IT"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, found) = harness.call("GET", "/api/employees?q=juan", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (status, _) = harness.call("GET", "/api/employees/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn schedule_rejects_reversed_hours() {
        let harness = Harness::new().await;
        let employee = harness.hire("EMP001", "Juan").await;
        let (status, message) = harness
            .call(
                "POST",
                "/api/schedules",
                Some(json!({
                    "employee_id": employee.id,
                    "day_of_week": 1,
                    "start_time": "17:00:00",
                    "end_time": "09:00:00",
                    "break_duration": 60
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.as_str().unwrap().contains("invalid request"));

        let (status, _) = harness
            .call(
                "POST",
                "/api/schedules",
                Some(json!({
                    "employee_id": employee.id,
                    "day_of_week": 1,
                    "start_time": "09:00:00",
                    "end_time": "17:00:00"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, hours) = harness
            .call("GET", &format!("/api/schedules/{}/hours", employee.id), None)
            .await;
        assert_eq!(hours["weekly_hours"], 7.0);
    }

    #[tokio::test]
    async fn attendance_day_over_http() {
        let harness = Harness::new().await;
        let employee = harness.hire("EMP001", "Juan").await;

        let punch = |time: &str| {
            json!({ "employee_id": employee.id, "date": "2024-07-15", "time": time })
        };
        let (status, record) = harness
            .call("POST", "/api/attendance/checkin", Some(punch("08:00:00")))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["check_in_time"], "08:00:00");

        let (status, _) = harness
            .call("POST", "/api/attendance/checkin", Some(punch("08:05:00")))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, record) = harness
            .call("POST", "/api/attendance/checkout", Some(punch("18:30:00")))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["hours_worked"], 9.5);
        assert_eq!(record["overtime_hours"], 1.5);
        assert_eq!(record["status"], "overtime");

        let (status, summary) = harness
            .call(
                "GET",
                &format!(
                    "/api/attendance/summary/{}?start_date=2024-07-01&end_date=2024-07-31",
                    employee.id
                ),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_days"], 1);
        assert_eq!(summary["overtime_days"], 1);
    }

    #[tokio::test]
    async fn vacation_and_payroll_flow() {
        let harness = Harness::new().await;
        let employee = harness.hire("EMP001", "Juan").await;
        let manager = harness.hire("EMP002", "Marta").await;

        let (status, vacation) = harness
            .call(
                "POST",
                "/api/vacations",
                Some(json!({
                    "employee_id": employee.id,
                    "start_date": "2024-08-01",
                    "end_date": "2024-08-05",
                    "type": "annual",
                    "reason": "Vacaciones familiares"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(vacation["days_requested"], 5);
        let vacation_id = vacation["id"].as_str().unwrap().to_string();

        let approve = json!({ "approved_by": manager.id });
        let (status, approved) = harness
            .call(
                "POST",
                &format!("/api/vacations/{vacation_id}/approve"),
                Some(approve.clone()),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], "approved");

        let (status, _) = harness
            .call(
                "POST",
                &format!("/api/vacations/{vacation_id}/reject"),
                Some(json!({ "rejected_by": manager.id, "reason": null })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = harness
            .call(
                "POST",
                "/api/compensations",
                Some(json!({
                    "employee_id": employee.id,
                    "compensation_type": "salary",
                    "amount": "1000",
                    "currency": null,
                    "pay_period": "monthly",
                    "effective_date": "2024-01-01",
                    "end_date": null,
                    "description": "Base salary"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let period = json!({ "pay_period_start": "2024-07-01", "pay_period_end": "2024-07-31" });
        let (status, payroll) = harness
            .call(
                "POST",
                &format!("/api/payroll/{}/generate", employee.id),
                Some(period.clone()),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payroll["net_pay"], "640.00");

        let (status, _) = harness
            .call(
                "POST",
                &format!("/api/payroll/{}/generate", employee.id),
                Some(period),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, salary) = harness
            .call(
                "GET",
                &format!("/api/payroll/{}/annual-salary", employee.id),
                None,
            )
            .await;
        assert_eq!(salary["annual_salary"], "12000.00");

        let kinds: Vec<&str> = harness
            .outbox
            .stream(employee.id)
            .await
            .iter()
            .map(|event| event.kind())
            .collect();
        assert_eq!(
            kinds,
            vec!["vacation_submitted", "vacation_approved", "payroll_generated"]
        );
    }
}
