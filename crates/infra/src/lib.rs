//! Infrastructure layer: document storage, repositories, and entity lifecycles.

pub mod categories;
pub mod repository;
pub mod store;

pub use categories::CategoryLifecycle;
pub use repository::EntityRepository;
pub use store::{DocumentStore, Filter, InMemoryDocumentStore, PostgresDocumentStore, StorageId, StoreError};
