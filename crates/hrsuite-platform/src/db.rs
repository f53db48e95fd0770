use std::marker::PhantomData;

use anyhow::Result;
use async_trait::async_trait;
use hrsuite_core::{Entity, RecordFilter, Repository, StoreError, Stored};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS hr_records (
    kind TEXT NOT NULL,
    key TEXT NOT NULL,
    employee_id BIGINT NOT NULL,
    version BIGINT NOT NULL,
    body JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (kind, key)
)
"#;

const EMPLOYEE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS hr_records_employee_idx ON hr_records (kind, employee_id)";

pub async fn connect_database(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(SCHEMA).execute(pool).await?;
    sqlx::query(EMPLOYEE_INDEX).execute(pool).await?;
    Ok(())
}

/// Every entity kind shares the `hr_records` document table; rows are
/// partitioned by `E::KIND`.
pub struct PgRepository<E> {
    pool: PgPool,
    entity: PhantomData<fn() -> E>,
}

impl<E> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            entity: PhantomData,
        }
    }
}

impl<E> Clone for PgRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

fn decode<E: Entity>(row: PgRow) -> Result<Stored<E>, StoreError> {
    let version: i64 = row.try_get("version").map_err(StoreError::backend)?;
    let Json(body): Json<serde_json::Value> = row.try_get("body").map_err(StoreError::backend)?;
    Ok(Stored {
        version,
        value: serde_json::from_value(body)?,
    })
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    async fn get(&self, key: &str) -> Result<Option<Stored<E>>, StoreError> {
        let row = sqlx::query("SELECT version, body FROM hr_records WHERE kind = $1 AND key = $2")
            .bind(E::KIND)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        row.map(decode::<E>).transpose()
    }

    async fn list(&self, filter: RecordFilter) -> Result<Vec<Stored<E>>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT version, body
            FROM hr_records
            WHERE kind = $1 AND ($2::BIGINT IS NULL OR employee_id = $2)
            ORDER BY key
            "#,
        )
        .bind(E::KIND)
        .bind(filter.employee_id.map(|id| id.0))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.into_iter().map(decode::<E>).collect()
    }

    async fn insert(&self, value: E) -> Result<Stored<E>, StoreError> {
        let key = value.key();
        let body = serde_json::to_value(&value)?;
        let inserted = sqlx::query(
            r#"
            INSERT INTO hr_records (kind, key, employee_id, version, body)
            VALUES ($1, $2, $3, 1, $4)
            ON CONFLICT (kind, key) DO NOTHING
            "#,
        )
        .bind(E::KIND)
        .bind(&key)
        .bind(value.employee_id().0)
        .bind(Json(body))
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?
        .rows_affected();

        if inserted == 0 {
            return Err(StoreError::Duplicate { kind: E::KIND, key });
        }
        Ok(Stored { version: 1, value })
    }

    async fn update(&self, value: E, expected_version: i64) -> Result<Stored<E>, StoreError> {
        let key = value.key();
        let body = serde_json::to_value(&value)?;
        let row = sqlx::query(
            r#"
            UPDATE hr_records
            SET body = $4, employee_id = $5, version = version + 1, updated_at = now()
            WHERE kind = $1 AND key = $2 AND version = $3
            RETURNING version
            "#,
        )
        .bind(E::KIND)
        .bind(&key)
        .bind(expected_version)
        .bind(Json(body))
        .bind(value.employee_id().0)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        match row {
            Some(row) => Ok(Stored {
                version: row.try_get("version").map_err(StoreError::backend)?,
                value,
            }),
            None if self.get(&key).await?.is_some() => Err(StoreError::StaleVersion {
                kind: E::KIND,
                key,
                expected: expected_version,
            }),
            None => Err(StoreError::Missing { kind: E::KIND, key }),
        }
    }

    async fn upsert(&self, value: E) -> Result<Stored<E>, StoreError> {
        let body = serde_json::to_value(&value)?;
        let row = sqlx::query(
            r#"
            INSERT INTO hr_records (kind, key, employee_id, version, body)
            VALUES ($1, $2, $3, 1, $4)
            ON CONFLICT (kind, key)
            DO UPDATE SET
                body = EXCLUDED.body,
                employee_id = EXCLUDED.employee_id,
                version = hr_records.version + 1,
                updated_at = now()
            RETURNING version
            "#,
        )
        .bind(E::KIND)
        .bind(value.key())
        .bind(value.employee_id().0)
        .bind(Json(body))
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        Ok(Stored {
            version: row.try_get("version").map_err(StoreError::backend)?,
            value,
        })
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM hr_records WHERE kind = $1 AND key = $2")
            .bind(E::KIND)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?
            .rows_affected();
        Ok(deleted > 0)
    }
}
