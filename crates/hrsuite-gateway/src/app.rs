use std::sync::Arc;

use axum::{Json, Router, http::StatusCode, routing::get};
use hrsuite_attendance::{AttendanceEngine, AttendanceRecord, DeviceRegistry};
use hrsuite_core::{Clock, Employee, EventSink, HrError, PolicyConfig, Repository};
use hrsuite_employees::EmployeeDirectory;
use hrsuite_payroll::{Compensation, PayrollEngine, PayrollRecord};
use hrsuite_schedules::{Schedule, ScheduleValidator};
use hrsuite_vacations::{Vacation, VacationLedger};
use tracing::error;

use crate::{admin, mobile};

pub type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// One repository per record kind.
pub struct Stores {
    pub employees: Arc<dyn Repository<Employee>>,
    pub schedules: Arc<dyn Repository<Schedule>>,
    pub attendance: Arc<dyn Repository<AttendanceRecord>>,
    pub vacations: Arc<dyn Repository<Vacation>>,
    pub compensations: Arc<dyn Repository<Compensation>>,
    pub payrolls: Arc<dyn Repository<PayrollRecord>>,
}

#[derive(Clone)]
pub struct AppState {
    pub directory: EmployeeDirectory,
    pub schedules: Arc<ScheduleValidator>,
    pub attendance: Arc<AttendanceEngine>,
    pub devices: Arc<DeviceRegistry>,
    pub vacations: Arc<VacationLedger>,
    pub payroll: Arc<PayrollEngine>,
    pub clock: Arc<dyn Clock>,
    pub policy: Arc<PolicyConfig>,
}

impl AppState {
    pub fn build(
        stores: Stores,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
        policy: Arc<PolicyConfig>,
    ) -> Self {
        let directory = EmployeeDirectory::new(stores.employees, clock.clone());
        let schedules = Arc::new(ScheduleValidator::new(
            stores.schedules,
            directory.clone(),
            events.clone(),
            clock.clone(),
        ));
        let attendance = Arc::new(AttendanceEngine::new(
            stores.attendance,
            directory.clone(),
            schedules.clone(),
            events.clone(),
            clock.clone(),
            policy.clone(),
        ));
        let vacations = Arc::new(VacationLedger::new(
            stores.vacations,
            directory.clone(),
            events.clone(),
            clock.clone(),
            policy.clone(),
        ));
        let payroll = Arc::new(PayrollEngine::new(
            stores.compensations,
            stores.payrolls,
            directory.clone(),
            events,
            clock.clone(),
            policy.clone(),
        ));

        Self {
            directory,
            schedules,
            attendance,
            devices: Arc::new(DeviceRegistry::new()),
            vacations,
            payroll,
            clock,
            policy,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", admin::routes())
        .nest("/mobile", mobile::routes())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn reject(err: HrError) -> (StatusCode, String) {
    let status = match &err {
        HrError::Validation(_) => StatusCode::BAD_REQUEST,
        HrError::Conflict(_) => StatusCode::CONFLICT,
        HrError::NotFound { .. } => StatusCode::NOT_FOUND,
        HrError::Store(_) => {
            error!("storage failure: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}


#[cfg(test)]
mod tests {
    use hrsuite_core::StoreError;

    use super::testing::Harness;
    use super::*;

    #[test]
    fn error_families_map_to_statuses() {
        assert_eq!(
            reject(HrError::validation("bad")).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(reject(HrError::conflict("twice")).0, StatusCode::CONFLICT);
        assert_eq!(
            reject(HrError::not_found("employee", 7)).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            reject(HrError::Store(StoreError::backend("down"))).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn health_endpoints_answer() {
        let harness = Harness::new().await;
        let (status, body) = harness.call("GET", "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let (status, body) = harness.call("GET", "/mobile/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
