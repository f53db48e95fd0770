use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use hrsuite_core::{
    DomainEvent, EmployeeId, Entity, EventSink, RecordFilter, Repository, StoreError, Stored,
};
use tokio::sync::RwLock;
use tokio::task::yield_now;

/// Repository held entirely in memory. Check-and-write happens under a
/// single write guard, so `insert` and `update` keep their guarantees even
/// when callers race.
pub struct InMemoryRepository<E: Entity> {
    records: RwLock<BTreeMap<String, Stored<E>>>,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn get(&self, key: &str) -> Result<Option<Stored<E>>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned())
    }

    async fn list(&self, filter: RecordFilter) -> Result<Vec<Stored<E>>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|stored| filter.matches(&stored.value))
            .cloned()
            .collect())
    }

    async fn insert(&self, value: E) -> Result<Stored<E>, StoreError> {
        let key = value.key();
        let mut records = self.records.write().await;
        if records.contains_key(&key) {
            return Err(StoreError::Duplicate { kind: E::KIND, key });
        }

        let stored = Stored { version: 1, value };
        records.insert(key, stored.clone());
        Ok(stored)
    }

    async fn update(&self, value: E, expected_version: i64) -> Result<Stored<E>, StoreError> {
        let key = value.key();
        let mut records = self.records.write().await;
        let Some(current) = records.get_mut(&key) else {
            return Err(StoreError::Missing { kind: E::KIND, key });
        };
        if current.version != expected_version {
            return Err(StoreError::StaleVersion {
                kind: E::KIND,
                key,
                expected: expected_version,
            });
        }

        current.version += 1;
        current.value = value;
        Ok(current.clone())
    }

    async fn upsert(&self, value: E) -> Result<Stored<E>, StoreError> {
        let key = value.key();
        let mut records = self.records.write().await;
        let stored = match records.get(&key) {
            Some(current) => Stored {
                version: current.version + 1,
                value,
            },
            None => Stored { version: 1, value },
        };
        records.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        Ok(records.remove(key).is_some())
    }
}

/// [`InMemoryRepository`] that gives up its turn before every call, the
/// way a network round trip would. Interleaves concurrent engine calls in
/// tests.
pub struct RoundTripRepository<E: Entity> {
    inner: InMemoryRepository<E>,
}

impl<E: Entity> Default for RoundTripRepository<E> {
    fn default() -> Self {
        Self {
            inner: InMemoryRepository::new(),
        }
    }
}

impl<E: Entity> RoundTripRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.is_empty().await
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for RoundTripRepository<E> {
    async fn get(&self, key: &str) -> Result<Option<Stored<E>>, StoreError> {
        yield_now().await;
        self.inner.get(key).await
    }

    async fn list(&self, filter: RecordFilter) -> Result<Vec<Stored<E>>, StoreError> {
        yield_now().await;
        self.inner.list(filter).await
    }

    async fn insert(&self, value: E) -> Result<Stored<E>, StoreError> {
        yield_now().await;
        self.inner.insert(value).await
    }

    async fn update(&self, value: E, expected_version: i64) -> Result<Stored<E>, StoreError> {
        yield_now().await;
        self.inner.update(value, expected_version).await
    }

    async fn upsert(&self, value: E) -> Result<Stored<E>, StoreError> {
        yield_now().await;
        self.inner.upsert(value).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        yield_now().await;
        self.inner.delete(key).await
    }
}

/// Event sink that keeps every published event, grouped per employee.
#[derive(Default)]
pub struct InMemoryOutbox {
    streams: RwLock<HashMap<EmployeeId, Vec<DomainEvent>>>,
    sequence: RwLock<i64>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stream(&self, employee_id: EmployeeId) -> Vec<DomainEvent> {
        let streams = self.streams.read().await;
        streams.get(&employee_id).cloned().unwrap_or_default()
    }

    pub async fn published(&self) -> i64 {
        *self.sequence.read().await
    }
}

#[async_trait]
impl EventSink for InMemoryOutbox {
    async fn publish(&self, event: DomainEvent) -> anyhow::Result<()> {
        let mut sequence_guard = self.sequence.write().await;
        *sequence_guard += 1;

        let mut streams = self.streams.write().await;
        streams.entry(event.employee_id).or_default().push(event);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use hrsuite_core::{Employee, EmployeeStatus, EventPayload};

    use super::*;

    fn employee(id: i64, department: &str) -> Employee {
        Employee {
            id: EmployeeId(id),
            employee_number: format!("EMP{id:03}"),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            email: format!("ana{id}@example.com"),
            phone: None,
            hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            position: "Analyst".to_string(),
            department: department.to_string(),
            status: EmployeeStatus::Active,
        }
    }

    #[tokio::test]
    async fn insert_is_create_only() {
        let repo = InMemoryRepository::new();
        let first = repo.insert(employee(1, "IT")).await.unwrap();
        assert_eq!(first.version, 1);

        let err = repo.insert(employee(1, "HR")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { kind: "employee", .. }));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn round_trip_repository_keeps_the_guarantees() {
        let repo = RoundTripRepository::new();
        let (a, b) = tokio::join!(
            repo.insert(employee(1, "IT")),
            repo.insert(employee(1, "HR"))
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(repo.len().await, 1);

        let current = repo.get("1").await.unwrap().unwrap();
        let stale = repo.update(employee(1, "Ops"), current.version + 1).await;
        assert!(matches!(stale, Err(StoreError::StaleVersion { .. })));
    }

    #[tokio::test]
    async fn update_requires_current_version() {
        let repo = InMemoryRepository::new();
        repo.insert(employee(1, "IT")).await.unwrap();

        let updated = repo.update(employee(1, "HR"), 1).await.unwrap();
        assert_eq!(updated.version, 2);

        let err = repo.update(employee(1, "Sales"), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::StaleVersion { expected: 1, .. }));

        let current = repo.get("1").await.unwrap().unwrap();
        assert_eq!(current.value.department, "HR");
    }

    #[tokio::test]
    async fn update_of_unknown_key_is_missing() {
        let repo: InMemoryRepository<Employee> = InMemoryRepository::new();
        let err = repo.update(employee(9, "IT"), 1).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing { .. }));
    }

    #[tokio::test]
    async fn list_filters_by_employee_and_upsert_bumps_version() {
        let repo = InMemoryRepository::new();
        repo.upsert(employee(1, "IT")).await.unwrap();
        repo.upsert(employee(2, "IT")).await.unwrap();
        let again = repo.upsert(employee(2, "Ops")).await.unwrap();
        assert_eq!(again.version, 2);

        assert_eq!(repo.list(RecordFilter::all()).await.unwrap().len(), 2);
        let only_two = repo.list(RecordFilter::employee(EmployeeId(2))).await.unwrap();
        assert_eq!(only_two.len(), 1);
        assert_eq!(only_two[0].value.department, "Ops");

        assert!(repo.delete("1").await.unwrap());
        assert!(!repo.delete("1").await.unwrap());
    }

    #[tokio::test]
    async fn outbox_groups_events_per_employee() {
        let outbox = InMemoryOutbox::new();
        let at = NaiveDate::from_ymd_opt(2024, 7, 3)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        for id in [1, 1, 2] {
            outbox
                .publish(DomainEvent::new(
                    EmployeeId(id),
                    at,
                    EventPayload::AttendanceAlert {
                        date: at.date(),
                        issue: "late".to_string(),
                    },
                ))
                .await
                .unwrap();
        }

        assert_eq!(outbox.published().await, 3);
        assert_eq!(outbox.stream(EmployeeId(1)).await.len(), 2);
        assert!(outbox.stream(EmployeeId(3)).await.is_empty());
    }
}
