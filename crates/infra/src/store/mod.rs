//! Document storage collaborator.
//!
//! The rest of the system talks to storage only through [`DocumentStore`]:
//! find/insert/replace/delete over named collections of JSON documents, plus
//! unique indexes. One store is opened at startup and shared by every request.
//!
//! ## Uniqueness
//!
//! Repositories check uniqueness before writing, but two concurrent writers
//! can both pass that check. Only the index registered through
//! [`DocumentStore::ensure_unique_index`] makes the second write fail, so every
//! field a repository checks must have one.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use eslhub_core::DomainError;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;

/// Native identifier the store assigns to a document.
///
/// Deliberately has no `Display`: turning it into something a caller can see
/// is the repository's job.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId(Uuid);

impl StorageId {
    /// Time-ordered (UUIDv7) so insertion order and id order agree.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Top-level field equality filter. An empty filter matches everything.
pub type Filter = Map<String, Value>;

/// Build a single-field filter.
pub fn filter_eq(field: &str, value: impl Into<Value>) -> Filter {
    let mut filter = Filter::new();
    filter.insert(field.to_string(), value.into());
    filter
}

/// Name of the unique index backing `collection.field`.
pub fn unique_index_name(collection: &str, field: &str) -> String {
    format!("{collection}_{field}_key")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique index rejected the write.
    #[error("unique index {index} rejected the write")]
    UniqueViolation { index: String },

    /// The backend could not be reached (pool closed, timeouts, IO).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with an error.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored document could not be read back.
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { index } => {
                DomainError::conflict(format!("duplicate value for {index}"))
            }
            StoreError::Unavailable(msg) => DomainError::storage_unavailable(msg),
            StoreError::Backend(msg) | StoreError::Corrupt(msg) => DomainError::internal(msg),
        }
    }
}

/// A document database with optional unique-index enforcement.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Idempotently register a unique index on a top-level field.
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    async fn insert(&self, collection: &str, body: Value) -> Result<StorageId, StoreError>;

    async fn find_by_id(&self, collection: &str, id: StorageId) -> Result<Option<Value>, StoreError>;

    /// Documents matching `filter`, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<(StorageId, Value)>, StoreError>;

    /// Overwrite a whole document. Returns `false` when nothing matched.
    async fn replace(&self, collection: &str, id: StorageId, body: Value) -> Result<bool, StoreError>;

    /// Remove a document. Returns `false` when nothing matched.
    async fn delete(&self, collection: &str, id: StorageId) -> Result<bool, StoreError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Drain and close connections. Later calls fail with `Unavailable`.
    async fn close(&self);
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        (**self).ensure_unique_index(collection, field).await
    }

    async fn insert(&self, collection: &str, body: Value) -> Result<StorageId, StoreError> {
        (**self).insert(collection, body).await
    }

    async fn find_by_id(&self, collection: &str, id: StorageId) -> Result<Option<Value>, StoreError> {
        (**self).find_by_id(collection, id).await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<(StorageId, Value)>, StoreError> {
        (**self).find(collection, filter).await
    }

    async fn replace(&self, collection: &str, id: StorageId, body: Value) -> Result<bool, StoreError> {
        (**self).replace(collection, id, body).await
    }

    async fn delete(&self, collection: &str, id: StorageId) -> Result<bool, StoreError> {
        (**self).delete(collection, id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
