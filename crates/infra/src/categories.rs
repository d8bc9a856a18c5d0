use std::sync::Arc;

use eslhub_core::{DomainError, DomainResult, ExternalId, Record};
use eslhub_retail::{Category, CategoryPatch, DEFAULT_CATALOG};

use crate::repository::EntityRepository;
use crate::store::{DocumentStore, filter_eq};

/// Category rules on top of the generic repository: seeding the default
/// catalog, name-sorted listing, and delete-as-deactivate.
#[derive(Clone)]
pub struct CategoryLifecycle {
    repo: EntityRepository<Category>,
}

impl CategoryLifecycle {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            repo: EntityRepository::new(store),
        }
    }

    pub fn repository(&self) -> &EntityRepository<Category> {
        &self.repo
    }

    /// Ensure the name index exists and insert every default category that is
    /// missing. Returns how many were inserted; running it again inserts none.
    pub async fn initialize(&self) -> DomainResult<usize> {
        self.repo.ensure_indexes().await?;

        let mut inserted = 0;
        for (name, description) in DEFAULT_CATALOG {
            if self.repo.find_one_by("name", *name).await?.is_some() {
                continue;
            }
            match self.repo.create(Category::new(*name, *description)).await {
                Ok(_) => inserted += 1,
                // Another instance seeded it first.
                Err(DomainError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }

        tracing::info!(inserted, "default categories initialized");
        Ok(inserted)
    }

    pub async fn list(&self, active_only: bool) -> DomainResult<Vec<Record<Category>>> {
        let mut categories = if active_only {
            self.repo.find(&filter_eq("is_active", true)).await?
        } else {
            self.repo.list().await?
        };
        categories.sort_by(|a, b| a.data.name.cmp(&b.data.name));
        Ok(categories)
    }

    pub async fn create(&self, category: Category) -> DomainResult<Record<Category>> {
        self.repo.create(category).await
    }

    pub async fn get(&self, id: &ExternalId) -> DomainResult<Record<Category>> {
        self.repo.get(id).await
    }

    pub async fn update(&self, id: &ExternalId, patch: CategoryPatch) -> DomainResult<Record<Category>> {
        self.repo.update(id, patch).await
    }

    /// Deleting a category only deactivates it; the name stays taken.
    pub async fn delete(&self, id: &ExternalId) -> DomainResult<()> {
        self.repo.soft_delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryDocumentStore;

    fn lifecycle() -> CategoryLifecycle {
        CategoryLifecycle::new(Arc::new(InMemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn initialize_seeds_once() {
        let categories = lifecycle();
        assert_eq!(categories.initialize().await.unwrap(), DEFAULT_CATALOG.len());
        assert_eq!(categories.initialize().await.unwrap(), 0);
        assert_eq!(categories.list(false).await.unwrap().len(), DEFAULT_CATALOG.len());
    }

    #[tokio::test]
    async fn initialize_fills_only_missing_names() {
        let categories = lifecycle();
        categories.create(Category::new("Dairy", "ours")).await.unwrap();

        assert_eq!(categories.initialize().await.unwrap(), DEFAULT_CATALOG.len() - 1);
        let dairy = categories.repository().find_one_by("name", "Dairy").await.unwrap().unwrap();
        assert_eq!(dairy.data.description, "ours");
    }

    #[tokio::test]
    async fn list_is_sorted_and_filters_inactive_on_request() {
        let categories = lifecycle();
        categories.initialize().await.unwrap();
        let snacks = categories.repository().find_one_by("name", "Snacks").await.unwrap().unwrap();
        categories.delete(&snacks.id).await.unwrap();

        let all = categories.list(false).await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.data.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"Snacks"));

        let active = categories.list(true).await.unwrap();
        assert_eq!(active.len(), DEFAULT_CATALOG.len() - 1);
        assert!(active.iter().all(|c| c.data.is_active));
    }

    #[tokio::test]
    async fn deleted_name_stays_reserved() {
        let categories = lifecycle();
        categories.initialize().await.unwrap();
        let tea = categories.create(Category::new("Tea", "")).await.unwrap();
        categories.delete(&tea.id).await.unwrap();

        assert!(!categories.get(&tea.id).await.unwrap().data.is_active);
        assert!(matches!(
            categories.create(Category::new("Tea", "")).await,
            Err(DomainError::Conflict(_))
        ));
    }
}
