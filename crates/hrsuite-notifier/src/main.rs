use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use hrsuite_core::{Clock, DomainEvent, Employee, SystemClock};
use hrsuite_employees::EmployeeDirectory;
use hrsuite_notify::{Dispatcher, LogEmailSender, LogSmsSender};
use hrsuite_platform::{EVENTS_CHANNEL, PgRepository, RedisBus, WorkerConfig, connect_database};
use redis::Msg;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "hrsuite_notifier=info".to_string()),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    let pool = connect_database(&config.database_url).await?;
    let redis = RedisBus::connect(&config.redis_url)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let employees = Arc::new(PgRepository::<Employee>::new(pool));
    let directory = EmployeeDirectory::new(employees, clock.clone());
    let dispatcher = Dispatcher::new(
        directory,
        Arc::new(LogEmailSender::default()),
        Arc::new(LogSmsSender),
        clock,
    );

    let mut pubsub = redis.client().get_async_pubsub().await?;
    pubsub.subscribe(EVENTS_CHANNEL).await?;
    let mut messages = pubsub.on_message();

    info!("notifier subscribed to {EVENTS_CHANNEL}");

    loop {
        let msg = messages
            .next()
            .await
            .with_context(|| format!("{EVENTS_CHANNEL} stream ended unexpectedly"))?;
        if let Err(err) = handle_message(&dispatcher, msg).await {
            error!("failed to process message: {err:#}");
        }
    }
}

async fn handle_message(dispatcher: &Dispatcher, msg: Msg) -> Result<()> {
    let payload: String = msg.get_payload()?;
    handle_payload(dispatcher, &payload).await
}

async fn handle_payload(dispatcher: &Dispatcher, payload: &str) -> Result<()> {
    let event: DomainEvent =
        serde_json::from_str(payload).context("event payload is not a domain event")?;
    let deliveries = dispatcher
        .dispatch(&event)
        .await
        .with_context(|| format!("dispatching {} {}", event.kind(), event.id))?;

    let failed = deliveries.iter().filter(|delivery| !delivery.success).count();
    info!(
        "event {} ({}) handled: {} sent, {failed} failed",
        event.id,
        event.kind(),
        deliveries.len() - failed
    );
    Ok(())
}
