//! `eslhub-retail` holds the document schemas for the retail side:
//! categories, stores, products, shelf labels, gateways and sync logs.

pub mod category;
pub mod esl;
pub mod gateway;
pub mod manager;
pub mod product;
pub mod store;
pub mod sync_log;

pub use category::{Category, CategoryPatch, DEFAULT_CATALOG};
pub use esl::{Esl, EslPatch};
pub use gateway::{Gateway, GatewayPatch};
pub use manager::derive_manager_id;
pub use product::{Product, ProductPatch};
pub use store::{Store, StorePatch};
pub use sync_log::{SyncLog, SyncLogPatch};
