use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use eslhub_core::{Document, ExternalId};
use eslhub_retail::{Category, CategoryPatch};

use crate::app::dto::ListCategoriesQuery;
use crate::app::errors;
use crate::app::routes::crud::deleted;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/initialize", post(initialize_categories))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListCategoriesQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };

    match services.categories.list(query.active_only).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Category>, JsonRejection>,
) -> axum::response::Response {
    let Json(category) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };
    if category.name.trim().is_empty() {
        return errors::bad_request("category name must not be empty");
    }

    match services.categories.create(category).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::resource_error(Category::LABEL, e),
    }
}

pub async fn initialize_categories(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.categories.initialize().await {
        Ok(inserted) => (
            StatusCode::OK,
            Json(json!({
                "message": "Default categories initialized",
                "inserted": inserted,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.categories.get(&ExternalId::new(id)).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::resource_error(Category::LABEL, e),
    }
}

pub async fn update_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<CategoryPatch>, JsonRejection>,
) -> axum::response::Response {
    let Json(patch) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return errors::bad_request("category name must not be empty");
    }

    match services.categories.update(&ExternalId::new(id), patch).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::resource_error(Category::LABEL, e),
    }
}

pub async fn delete_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.categories.delete(&ExternalId::new(id)).await {
        Ok(()) => deleted(Category::LABEL),
        Err(e) => errors::resource_error(Category::LABEL, e),
    }
}
