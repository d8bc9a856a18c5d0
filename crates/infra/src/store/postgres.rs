//! Postgres-backed document store.
//!
//! Every collection shares one `documents` table keyed by
//! `(collection, id)` with the body in a JSONB column. Unique indexes are
//! partial expression indexes over `body->>'field'`, one per collection and
//! field.
//!
//! ## Error mapping
//!
//! | SQLx error | Code | StoreError |
//! |------------|------|------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (other) | any | `Backend` |
//! | PoolTimedOut / PoolClosed / Io / Tls | n/a | `Unavailable` |
//! | Other | n/a | `Backend` |

use std::time::Duration;

use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use super::{DocumentStore, Filter, StorageId, StoreError, unique_index_name};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT        NOT NULL,
    id          UUID        NOT NULL,
    body        JSONB       NOT NULL,
    inserted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
)
"#;

const CREATE_ORDER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_collection_order_idx ON documents (collection, inserted_at, id)";

#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Connect, then create the backing table if it does not exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in [CREATE_TABLE, CREATE_ORDER_INDEX] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

/// Index DDL cannot take bind parameters, so names are spliced in; only plain
/// identifiers are accepted.
fn checked_identifier(value: &str) -> Result<&str, StoreError> {
    let valid = !value.is_empty()
        && value.len() <= 48
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !value.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(value)
    } else {
        Err(StoreError::Backend(format!("refusing to index on identifier {value:?}")))
    }
}

fn decode_row(row: &sqlx::postgres::PgRow) -> Result<(StorageId, Value), StoreError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| StoreError::Corrupt(format!("bad id column: {e}")))?;
    let Json(body): Json<Value> = row
        .try_get("body")
        .map_err(|e| StoreError::Corrupt(format!("bad body column: {e}")))?;
    Ok((StorageId::from_uuid(id), body))
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self), err)]
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        let collection = checked_identifier(collection)?;
        let field = checked_identifier(field)?;
        let index = unique_index_name(collection, field);

        let ddl = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"{index}\" ON documents ((body->>'{field}')) \
             WHERE collection = '{collection}'"
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_unique_index", e))?;
        Ok(())
    }

    #[instrument(skip(self, body), err)]
    async fn insert(&self, collection: &str, body: Value) -> Result<StorageId, StoreError> {
        let id = StorageId::generate();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id.as_uuid())
            .bind(Json(&body))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(id)
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, collection: &str, id: StorageId) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT id, body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.as_ref().map(decode_row).transpose().map(|found| found.map(|(_, body)| body))
    }

    /// Equality on top-level scalar fields, expressed as JSONB containment.
    #[instrument(skip(self, filter), err)]
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<(StorageId, Value)>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1 AND body @> $2
            ORDER BY inserted_at ASC, id ASC
            "#,
        )
        .bind(collection)
        .bind(Json(filter))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find", e))?;

        rows.iter().map(decode_row).collect()
    }

    #[instrument(skip(self, body), err)]
    async fn replace(&self, collection: &str, id: StorageId, body: Value) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .bind(Json(&body))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("replace", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, collection: &str, id: StorageId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                StoreError::UniqueViolation {
                    index: db_err.constraint().unwrap_or("unknown").to_string(),
                }
            } else {
                StoreError::Backend(format!("database error in {operation}: {}", db_err.message()))
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => StoreError::Unavailable(format!("tls error in {operation}: {e}")),
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}
