mod admin;
mod app;
mod mobile;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result as AnyResult;
use hrsuite_attendance::AttendanceRecord;
use hrsuite_core::{Clock, Employee, EventSink, SystemClock};
use hrsuite_payroll::{Compensation, PayrollRecord};
use hrsuite_platform::{PgRepository, RedisBus, ServiceConfig, connect_database, ensure_schema};
use hrsuite_schedules::Schedule;
use hrsuite_vacations::Vacation;
use tracing::info;

use crate::app::{AppState, Stores, router};

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "hrsuite_gateway=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let pool = connect_database(&config.database_url).await?;
    ensure_schema(&pool).await?;
    let redis = RedisBus::connect(&config.redis_url)?;

    let stores = Stores {
        employees: Arc::new(PgRepository::<Employee>::new(pool.clone())),
        schedules: Arc::new(PgRepository::<Schedule>::new(pool.clone())),
        attendance: Arc::new(PgRepository::<AttendanceRecord>::new(pool.clone())),
        vacations: Arc::new(PgRepository::<Vacation>::new(pool.clone())),
        compensations: Arc::new(PgRepository::<Compensation>::new(pool.clone())),
        payrolls: Arc::new(PgRepository::<PayrollRecord>::new(pool)),
    };
    let events: Arc<dyn EventSink> = Arc::new(redis);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = AppState::build(stores, events, clock, Arc::new(config.policy));

    let addr: SocketAddr = config.http_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("hr gateway listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
