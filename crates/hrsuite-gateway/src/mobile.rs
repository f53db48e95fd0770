//! Mobile API under `/mobile`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::Datelike;
use hrsuite_attendance::{AttendanceRecord, IdentityAssertion, PunchAction};
use hrsuite_core::{EmployeeId, HrResult};
use hrsuite_platform::{HistoryQuery, MobileProfile, MobilePunchRequest, VacationRequestBody};
use hrsuite_vacations::Vacation;
use serde_json::{Value, json};

use crate::admin::vacation_balance;
use crate::app::{ApiResult, AppState, reject};

const DEFAULT_HISTORY_DAYS: u32 = 7;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/attendance/checkin", post(check_in))
        .route("/attendance/checkout", post(check_out))
        .route("/attendance/history/{id}", get(attendance_history))
        .route("/vacations/request", post(request_vacation))
        .route("/vacations/balance/{id}", get(vacation_balance))
        .route("/profile/{id}", get(profile))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "hrsuite mobile api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": state.clock.now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }))
}

async fn punch(
    state: &AppState,
    request: MobilePunchRequest,
    action: PunchAction,
) -> HrResult<AttendanceRecord> {
    match request.device_id {
        Some(device_id) => {
            let assertion = IdentityAssertion {
                employee_id: request.employee_id,
                device_id,
                action,
                asserted_at: None,
            };
            state.devices.record(&state.attendance, assertion).await
        }
        None => match action {
            PunchAction::CheckIn => state.attendance.check_in(request.employee_id, None, None).await,
            PunchAction::CheckOut => {
                state.attendance.check_out(request.employee_id, None, None).await
            }
        },
    }
}

async fn check_in(
    State(state): State<AppState>,
    Json(payload): Json<MobilePunchRequest>,
) -> ApiResult<AttendanceRecord> {
    punch(&state, payload, PunchAction::CheckIn)
        .await
        .map(|record| Json(record.rounded()))
        .map_err(reject)
}

async fn check_out(
    State(state): State<AppState>,
    Json(payload): Json<MobilePunchRequest>,
) -> ApiResult<AttendanceRecord> {
    punch(&state, payload, PunchAction::CheckOut)
        .await
        .map(|record| Json(record.rounded()))
        .map_err(reject)
}

async fn attendance_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<AttendanceRecord>> {
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    state
        .attendance
        .history(EmployeeId(id), days)
        .await
        .map(|records| Json(records.iter().map(AttendanceRecord::rounded).collect()))
        .map_err(reject)
}

async fn request_vacation(
    State(state): State<AppState>,
    Json(payload): Json<VacationRequestBody>,
) -> ApiResult<Vacation> {
    state
        .vacations
        .submit(payload.into())
        .await
        .map(Json)
        .map_err(reject)
}

async fn profile(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<MobileProfile> {
    let employee = state.directory.get(EmployeeId(id)).await.map_err(reject)?;
    let year = state.clock.today().year();
    let vacation_balance = state
        .vacations
        .balance(employee.id, year)
        .await
        .map_err(reject)?;
    Ok(Json(MobileProfile {
        employee,
        vacation_balance,
    }))
}
