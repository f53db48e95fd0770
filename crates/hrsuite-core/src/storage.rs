use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::StoreError;
use crate::events::DomainEvent;
use crate::models::EmployeeId;

/// A record type the repositories know how to key and partition.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: &'static str;

    /// Natural key, unique within `KIND`.
    fn key(&self) -> String;

    fn employee_id(&self) -> EmployeeId;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stored<E> {
    pub version: i64,
    pub value: E,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFilter {
    pub employee_id: Option<EmployeeId>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn employee(employee_id: EmployeeId) -> Self {
        Self {
            employee_id: Some(employee_id),
        }
    }

    pub fn matches<E: Entity>(&self, value: &E) -> bool {
        self.employee_id
            .is_none_or(|employee_id| value.employee_id() == employee_id)
    }
}

/// Storage port every engine depends on.
///
/// `insert` is create-only and `update` is guarded by the version the
/// caller read, which is how "one record per key" and "no lost update"
/// hold under concurrent callers. Versions start at 1. Rules spanning
/// several records are serialized by the engines with a
/// [`KeyedGuard`](crate::KeyedGuard).
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Stored<E>>, StoreError>;
    async fn list(&self, filter: RecordFilter) -> Result<Vec<Stored<E>>, StoreError>;
    async fn insert(&self, value: E) -> Result<Stored<E>, StoreError>;
    async fn update(&self, value: E, expected_version: i64) -> Result<Stored<E>, StoreError>;
    async fn upsert(&self, value: E) -> Result<Stored<E>, StoreError>;
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

/// One-way outbound channel for domain events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> anyhow::Result<()>;
}

/// Publishes without letting a delivery problem reach the caller. Business
/// state is already committed by the time an event is emitted.
pub async fn publish_or_warn(sink: &dyn EventSink, event: DomainEvent) {
    let kind = event.kind();
    let employee_id = event.employee_id;
    if let Err(err) = sink.publish(event).await {
        warn!("failed to publish {kind} event for employee {employee_id}: {err:#}");
    }
}
