//! Generic CRUD over one collection of typed documents.
//!
//! The repository is the only place that knows how an [`ExternalId`] maps to
//! a [`StorageId`]: externally an id is the 32 lower-case hex digits of the
//! storage UUID. Anything else is treated as "no such record".

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use eslhub_core::{Document, DomainError, DomainResult, ExternalId, HardDelete, Record, SoftDelete};

use crate::store::{DocumentStore, Filter, StorageId, StoreError, filter_eq};

/// Body written to the store: the document's own fields plus timestamps.
#[derive(Serialize)]
struct StoredRef<'a, T> {
    #[serde(flatten)]
    data: &'a T,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct Stored<T> {
    #[serde(flatten)]
    data: T,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub fn to_external(id: StorageId) -> ExternalId {
    ExternalId::new(id.as_uuid().simple().to_string())
}

/// `None` for anything that is not an id this repository handed out.
pub fn to_storage(id: &ExternalId) -> Option<StorageId> {
    let raw = id.as_str();
    let well_formed = raw.len() == 32 && raw.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if !well_formed {
        return None;
    }
    Uuid::try_parse(raw).ok().map(StorageId::from_uuid)
}

pub struct EntityRepository<T> {
    store: Arc<dyn DocumentStore>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityRepository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _doc: PhantomData,
        }
    }
}

impl<T: Document> EntityRepository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _doc: PhantomData,
        }
    }

    /// Register a unique index for every field in `T::UNIQUE_FIELDS`.
    pub async fn ensure_indexes(&self) -> DomainResult<()> {
        for field in T::UNIQUE_FIELDS {
            self.store.ensure_unique_index(T::COLLECTION, field).await?;
        }
        Ok(())
    }

    pub async fn create(&self, mut doc: T) -> DomainResult<Record<T>> {
        doc.refresh_derived();
        let body = encode(&doc)?;
        self.check_unique(&body, None, T::UNIQUE_FIELDS).await?;

        let now = Utc::now();
        let stored = stamp(&doc, now, now)?;
        let id = self
            .store
            .insert(T::COLLECTION, stored)
            .await
            .map_err(|e| conflict_or(T::LABEL, e))?;
        tracing::debug!(collection = T::COLLECTION, "document created");

        Ok(Record {
            id: to_external(id),
            created_at: now,
            updated_at: now,
            data: doc,
        })
    }

    pub async fn get(&self, id: &ExternalId) -> DomainResult<Record<T>> {
        self.load(id).await.map(|(_, record)| record)
    }

    pub async fn list(&self) -> DomainResult<Vec<Record<T>>> {
        self.find(&Filter::new()).await
    }

    /// Records whose top-level fields equal every entry of `filter`.
    pub async fn find(&self, filter: &Filter) -> DomainResult<Vec<Record<T>>> {
        self.store
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(|(id, body)| decode(id, body))
            .collect()
    }

    pub async fn find_one_by(&self, field: &str, value: impl Into<Value>) -> DomainResult<Option<Record<T>>> {
        Ok(self.find(&filter_eq(field, value)).await?.into_iter().next())
    }

    /// Apply `patch`, recompute derived fields, and write the whole document back.
    ///
    /// Uniqueness is re-checked only for unique fields whose value changed.
    pub async fn update(&self, id: &ExternalId, patch: T::Patch) -> DomainResult<Record<T>> {
        let (storage_id, current) = self.load(id).await?;
        let mut doc = current.data.clone();
        doc.apply(patch);
        self.write_back(storage_id, current, doc).await
    }

    async fn load(&self, id: &ExternalId) -> DomainResult<(StorageId, Record<T>)> {
        let storage_id = to_storage(id).ok_or(DomainError::NotFound)?;
        let body = self
            .store
            .find_by_id(T::COLLECTION, storage_id)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok((storage_id, decode(storage_id, body)?))
    }

    async fn write_back(&self, storage_id: StorageId, current: Record<T>, mut doc: T) -> DomainResult<Record<T>> {
        doc.refresh_derived();
        let before = encode(&current.data)?;
        let after = encode(&doc)?;

        let changed: Vec<&'static str> = T::UNIQUE_FIELDS
            .iter()
            .copied()
            .filter(|field| before.get(*field) != after.get(*field))
            .collect();
        self.check_unique(&after, Some(storage_id), &changed).await?;

        let now = Utc::now();
        let stored = stamp(&doc, current.created_at, now)?;
        let matched = self
            .store
            .replace(T::COLLECTION, storage_id, stored)
            .await
            .map_err(|e| conflict_or(T::LABEL, e))?;
        if !matched {
            return Err(DomainError::NotFound);
        }

        Ok(Record {
            id: current.id,
            created_at: current.created_at,
            updated_at: now,
            data: doc,
        })
    }

    async fn check_unique(
        &self,
        body: &Value,
        except: Option<StorageId>,
        fields: &[&'static str],
    ) -> DomainResult<()> {
        for &field in fields {
            let Some(value) = body.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let hits = self.store.find(T::COLLECTION, &filter_eq(field, value.clone())).await?;
            if hits.iter().any(|(hit, _)| Some(*hit) != except) {
                tracing::info!(collection = T::COLLECTION, field, "uniqueness conflict");
                return Err(DomainError::conflict(format!(
                    "{} with this {field} already exists",
                    T::LABEL
                )));
            }
        }
        Ok(())
    }
}

impl<T: SoftDelete> EntityRepository<T> {
    /// Mark the document inactive. It stays readable by id and in unfiltered lists.
    pub async fn soft_delete(&self, id: &ExternalId) -> DomainResult<()> {
        let (storage_id, current) = self.load(id).await?;
        let mut doc = current.data.clone();
        doc.deactivate();
        self.write_back(storage_id, current, doc).await.map(|_| ())
    }
}

impl<T: HardDelete> EntityRepository<T> {
    /// Remove the document.
    pub async fn hard_delete(&self, id: &ExternalId) -> DomainResult<()> {
        let storage_id = to_storage(id).ok_or(DomainError::NotFound)?;
        if self.store.delete(T::COLLECTION, storage_id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }
}

fn encode<T: Serialize>(doc: &T) -> DomainResult<Value> {
    serde_json::to_value(doc).map_err(|e| DomainError::internal(format!("failed to encode document: {e}")))
}

fn stamp<T: Serialize>(doc: &T, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> DomainResult<Value> {
    encode(&StoredRef {
        data: doc,
        created_at,
        updated_at,
    })
}

fn decode<T: Document>(id: StorageId, body: Value) -> DomainResult<Record<T>> {
    let stored: Stored<T> = serde_json::from_value(body).map_err(|e| {
        tracing::error!(collection = T::COLLECTION, error = %e, "stored document does not decode");
        DomainError::from(StoreError::Corrupt(format!("{} document: {e}", T::COLLECTION)))
    })?;
    Ok(Record {
        id: to_external(id),
        created_at: stored.created_at,
        updated_at: stored.updated_at,
        data: stored.data,
    })
}

/// A unique index firing after the pre-check passed means another writer won the race.
fn conflict_or(label: &str, err: StoreError) -> DomainError {
    match err {
        StoreError::UniqueViolation { index } => {
            tracing::info!(%index, "unique index rejected concurrent write");
            DomainError::conflict(format!("{label} already exists"))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;
    use eslhub_retail::{Category, CategoryPatch, Product, ProductPatch, Store, StorePatch};

    fn store() -> Arc<dyn DocumentStore> {
        Arc::new(InMemoryDocumentStore::new())
    }

    fn category(name: &str) -> Category {
        Category::new(name, "")
    }

    #[test]
    fn external_ids_are_simple_hex() {
        let id = StorageId::generate();
        let external = to_external(id);
        assert_eq!(external.as_str().len(), 32);
        assert_eq!(to_storage(&external), Some(id));

        assert_eq!(to_storage(&ExternalId::new("nope")), None);
        assert_eq!(to_storage(&ExternalId::new(id.as_uuid().hyphenated().to_string())), None);
        assert_eq!(to_storage(&ExternalId::new(external.as_str().to_uppercase())), None);
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields_and_timestamps() {
        let repo = EntityRepository::<Category>::new(store());
        let created = repo.create(Category::new("Dairy", "Milk and cheese")).await.unwrap();
        let fetched = repo.get(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn malformed_or_unknown_ids_are_not_found() {
        let repo = EntityRepository::<Category>::new(store());
        assert_eq!(repo.get(&ExternalId::new("123")).await.unwrap_err(), DomainError::NotFound);
        let unknown = to_external(StorageId::generate());
        assert_eq!(repo.get(&unknown).await.unwrap_err(), DomainError::NotFound);
        assert_eq!(repo.soft_delete(&unknown).await.unwrap_err(), DomainError::NotFound);
        assert_eq!(
            repo.update(&unknown, CategoryPatch::default()).await.unwrap_err(),
            DomainError::NotFound
        );
    }

    #[tokio::test]
    async fn duplicate_unique_field_is_a_conflict() {
        let repo = EntityRepository::<Category>::new(store());
        repo.ensure_indexes().await.unwrap();
        repo.create(category("Dairy")).await.unwrap();

        let err = repo.create(category("Dairy")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[test]
    fn conflict_message_names_the_entity() {
        let err = conflict_or(
            Category::LABEL,
            StoreError::UniqueViolation {
                index: "categories_name_key".into(),
            },
        );
        assert_eq!(err, DomainError::conflict("Category already exists"));
    }

    #[tokio::test]
    async fn duplicate_message_uses_the_singular_label() {
        let repo = EntityRepository::<Category>::new(store());
        repo.create(category("Dairy")).await.unwrap();
        let err = repo.create(category("Dairy")).await.unwrap_err();
        assert_eq!(err, DomainError::conflict("Category with this name already exists"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_leave_exactly_one_record() {
        const WRITERS: usize = 8;

        for _ in 0..50 {
            let repo = EntityRepository::<Category>::new(store());
            repo.ensure_indexes().await.unwrap();

            let handles: Vec<_> = (0..WRITERS)
                .map(|_| {
                    let repo = repo.clone();
                    tokio::spawn(async move { repo.create(category("Tea")).await })
                })
                .collect();

            let mut created = 0;
            let mut conflicts = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(_) => created += 1,
                    Err(DomainError::Conflict(_)) => conflicts += 1,
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }

            assert_eq!(created, 1);
            assert_eq!(conflicts, WRITERS - 1);
            assert_eq!(repo.list().await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn update_keeping_own_unique_value_is_allowed() {
        let repo = EntityRepository::<Category>::new(store());
        repo.ensure_indexes().await.unwrap();
        let dairy = repo.create(category("Dairy")).await.unwrap();
        repo.create(category("Bakery")).await.unwrap();

        let updated = repo
            .update(
                &dairy.id,
                CategoryPatch {
                    name: Some("Dairy".into()),
                    description: Some("Milk".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.data.description, "Milk");
        assert!(updated.updated_at >= dairy.updated_at);
        assert_eq!(updated.created_at, dairy.created_at);

        let err = repo
            .update(
                &dairy.id,
                CategoryPatch {
                    name: Some("Bakery".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn manager_id_is_derived_on_create_and_update() {
        let repo = EntityRepository::<Store>::new(store());
        let created = repo
            .create(Store::new("Downtown", "Main St", "John Smith"))
            .await
            .unwrap();
        assert_eq!(created.data.manager_id, "mgr-johnsmit-ef61");

        let renamed = repo
            .update(
                &created.id,
                StorePatch {
                    location: Some("Elm St".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.data.manager_id, "mgr-johnsmit-ef61");

        let reassigned = repo
            .update(
                &created.id,
                StorePatch {
                    manager: Some("Jane Smith".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(reassigned.data.manager_id, "mgr-janesmit-a2dd");
        assert_eq!(repo.get(&created.id).await.unwrap().data.manager_id, "mgr-janesmit-a2dd");
    }

    #[tokio::test]
    async fn soft_delete_keeps_the_record_readable() {
        let repo = EntityRepository::<Store>::new(store());
        let created = repo.create(Store::new("Downtown", "Main St", "Ann")).await.unwrap();

        repo.soft_delete(&created.id).await.unwrap();
        let after = repo.get(&created.id).await.unwrap();
        assert!(!after.data.is_active);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn hard_delete_removes_the_record() {
        let repo = EntityRepository::<Product>::new(store());
        let created = repo
            .create(serde_json::from_value(serde_json::json!({
                "name": "Milk",
                "barcode": "890100",
                "mrp": 2.5,
                "sellingPrice": 2.25,
                "category": "Dairy",
            })).unwrap())
            .await
            .unwrap();

        repo.hard_delete(&created.id).await.unwrap();
        assert_eq!(repo.get(&created.id).await.unwrap_err(), DomainError::NotFound);
        assert_eq!(
            repo.update(&created.id, ProductPatch::default()).await.unwrap_err(),
            DomainError::NotFound
        );
    }

    #[tokio::test]
    async fn find_one_by_matches_top_level_field() {
        let repo = EntityRepository::<Category>::new(store());
        repo.create(category("Dairy")).await.unwrap();
        assert!(repo.find_one_by("name", "Dairy").await.unwrap().is_some());
        assert!(repo.find_one_by("name", "dairy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn undecodable_document_is_internal() {
        let raw = store();
        let id = raw.insert("categories", serde_json::json!({"name": 5})).await.unwrap();
        let repo = EntityRepository::<Category>::new(raw);
        assert!(matches!(
            repo.get(&to_external(id)).await.unwrap_err(),
            DomainError::Internal(_)
        ));
    }
}
