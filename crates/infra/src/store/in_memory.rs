use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use super::{DocumentStore, Filter, StorageId, StoreError, unique_index_name};

#[derive(Debug, Default)]
struct Collection {
    docs: Vec<(StorageId, Value)>,
    unique: BTreeSet<String>,
}

impl Collection {
    /// First unique field on which `body` collides with a document other than `except`.
    fn collision(&self, body: &Value, except: Option<StorageId>) -> Option<&str> {
        self.unique.iter().map(String::as_str).find(|field| {
            let Some(value) = body.get(*field).filter(|v| !v.is_null()) else {
                return false;
            };
            self.docs
                .iter()
                .any(|(id, doc)| Some(*id) != except && doc.get(*field) == Some(value))
        })
    }
}

fn matches(body: &Value, filter: &Filter) -> bool {
    filter.iter().all(|(field, expected)| body.get(field) == Some(expected))
}

/// Process-local document store for tests and for running without a database.
///
/// Unique indexes are enforced under the write lock, so concurrent inserts of
/// the same value cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    closed: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("store is closed".into()));
        }
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".into())
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        let coll = map.entry(collection.to_string()).or_default();
        if coll.unique.contains(field) {
            return Ok(());
        }

        // Refuse to create an index the existing data already violates.
        let mut seen = Vec::new();
        for (_, doc) in &coll.docs {
            if let Some(value) = doc.get(field).filter(|v| !v.is_null()) {
                if seen.contains(&value) {
                    return Err(StoreError::UniqueViolation {
                        index: unique_index_name(collection, field),
                    });
                }
                seen.push(value);
            }
        }

        coll.unique.insert(field.to_string());
        Ok(())
    }

    async fn insert(&self, collection: &str, body: Value) -> Result<StorageId, StoreError> {
        self.ensure_open()?;
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        let coll = map.entry(collection.to_string()).or_default();
        if let Some(field) = coll.collision(&body, None) {
            return Err(StoreError::UniqueViolation {
                index: unique_index_name(collection, field),
            });
        }

        let id = StorageId::generate();
        coll.docs.push((id, body));
        Ok(id)
    }

    async fn find_by_id(&self, collection: &str, id: StorageId) -> Result<Option<Value>, StoreError> {
        self.ensure_open()?;
        let map = self.collections.read().map_err(|_| poisoned())?;
        Ok(map
            .get(collection)
            .and_then(|c| c.docs.iter().find(|(doc_id, _)| *doc_id == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<(StorageId, Value)>, StoreError> {
        self.ensure_open()?;
        let map = self.collections.read().map_err(|_| poisoned())?;
        Ok(map
            .get(collection)
            .map(|c| {
                c.docs
                    .iter()
                    .filter(|(_, doc)| matches(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn replace(&self, collection: &str, id: StorageId, body: Value) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        let Some(coll) = map.get_mut(collection) else {
            return Ok(false);
        };
        if let Some(field) = coll.collision(&body, Some(id)) {
            return Err(StoreError::UniqueViolation {
                index: unique_index_name(collection, field),
            });
        }

        match coll.docs.iter_mut().find(|(doc_id, _)| *doc_id == id) {
            Some((_, doc)) => {
                *doc = body;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: StorageId) -> Result<bool, StoreError> {
        self.ensure_open()?;
        let mut map = self.collections.write().map_err(|_| poisoned())?;
        let Some(coll) = map.get_mut(collection) else {
            return Ok(false);
        };
        let before = coll.docs.len();
        coll.docs.retain(|(doc_id, _)| *doc_id != id);
        Ok(coll.docs.len() != before)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.ensure_open()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}
