//! Generic CRUD routes for resources whose only rule is "copy the fields".
//!
//! Each resource picks its delete policy by which router it is mounted with:
//! [`router`] removes documents, [`lifecycle_router`] deactivates them.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::de::DeserializeOwned;

use eslhub_core::{Document, ExternalId, HardDelete, SoftDelete};
use eslhub_infra::EntityRepository;
use eslhub_retail::{Esl, Gateway, Product, Store, SyncLog};

use crate::app::dto::MessageResponse;
use crate::app::errors;
use crate::app::services::AppServices;

/// A collection exposed under its own path.
pub trait Resource: Document {
    fn repository(services: &AppServices) -> &EntityRepository<Self>;
}

impl Resource for Store {
    fn repository(services: &AppServices) -> &EntityRepository<Self> {
        &services.stores
    }
}

impl Resource for Product {
    fn repository(services: &AppServices) -> &EntityRepository<Self> {
        &services.products
    }
}

impl Resource for Esl {
    fn repository(services: &AppServices) -> &EntityRepository<Self> {
        &services.esls
    }
}

impl Resource for Gateway {
    fn repository(services: &AppServices) -> &EntityRepository<Self> {
        &services.gateways
    }
}

impl Resource for SyncLog {
    fn repository(services: &AppServices) -> &EntityRepository<Self> {
        &services.sync_logs
    }
}

/// List/get/create/update, and a delete that removes the document.
pub fn router<T>() -> Router
where
    T: Resource + HardDelete,
    T::Patch: DeserializeOwned,
{
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/:id", get(get_one::<T>).put(update::<T>).delete(hard_delete::<T>))
}

/// Same routes, but delete only deactivates.
pub fn lifecycle_router<T>() -> Router
where
    T: Resource + SoftDelete,
    T::Patch: DeserializeOwned,
{
    Router::new()
        .route("/", get(list::<T>).post(create::<T>))
        .route("/:id", get(get_one::<T>).put(update::<T>).delete(soft_delete::<T>))
}

pub async fn list<T: Resource>(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match T::repository(&services).list().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_one<T: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match T::repository(&services).get(&ExternalId::new(id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::resource_error(T::LABEL, e),
    }
}

pub async fn create<T: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<T>, JsonRejection>,
) -> axum::response::Response {
    let Json(doc) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };

    match T::repository(&services).create(doc).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::resource_error(T::LABEL, e),
    }
}

pub async fn update<T>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<T::Patch>, JsonRejection>,
) -> axum::response::Response
where
    T: Resource,
    T::Patch: DeserializeOwned,
{
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };

    match T::repository(&services).update(&ExternalId::new(id), patch).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::resource_error(T::LABEL, e),
    }
}

pub async fn hard_delete<T: Resource + HardDelete>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match T::repository(&services).hard_delete(&ExternalId::new(id)).await {
        Ok(()) => deleted(T::LABEL),
        Err(e) => errors::resource_error(T::LABEL, e),
    }
}

pub async fn soft_delete<T: Resource + SoftDelete>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match T::repository(&services).soft_delete(&ExternalId::new(id)).await {
        Ok(()) => deleted(T::LABEL),
        Err(e) => errors::resource_error(T::LABEL, e),
    }
}

pub fn deleted(label: &str) -> axum::response::Response {
    (StatusCode::OK, Json(MessageResponse::new(format!("{label} deleted")))).into_response()
}
