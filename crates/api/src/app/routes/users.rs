use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use eslhub_auth::User;
use eslhub_core::{Document, DomainError, ExternalId};

use crate::app::dto::{self, CreateUserRequest, UpdateUserRequest, UserView};
use crate::app::errors;
use crate::app::routes::crud::deleted;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.users.list().await {
        Ok(users) => {
            let items: Vec<UserView> = users.into_iter().map(UserView::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.users.get(&ExternalId::new(id)).await {
        Ok(user) => (StatusCode::OK, Json(UserView::from(user))).into_response(),
        Err(e) => errors::resource_error(User::LABEL, e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    let hash = match services.hash_password(body.password.clone()).await {
        Ok(hash) => hash,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.users.create(body.into_user(hash)).await {
        Ok(user) => (StatusCode::CREATED, Json(UserView::from(user))).into_response(),
        Err(DomainError::Conflict(_)) => errors::domain_error_to_response(DomainError::conflict("Email already registered")),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(UpdateUserRequest { password, mut patch }) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };
    if let Some(email) = patch.email.as_deref() {
        if let Err(e) = dto::validate_email(email) {
            return errors::domain_error_to_response(e);
        }
    }

    if let Some(password) = password {
        if let Err(e) = dto::validate_password(&password) {
            return errors::domain_error_to_response(e);
        }
        patch.password_hash = match services.hash_password(password).await {
            Ok(hash) => Some(hash),
            Err(e) => return errors::domain_error_to_response(e),
        };
    }

    match services.users.update(&ExternalId::new(id), patch).await {
        Ok(user) => (StatusCode::OK, Json(UserView::from(user))).into_response(),
        Err(DomainError::Conflict(_)) => errors::domain_error_to_response(DomainError::conflict("Email already registered")),
        Err(e) => errors::resource_error(User::LABEL, e),
    }
}

/// Users are never removed; deleting one deactivates the account.
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match services.users.soft_delete(&ExternalId::new(id)).await {
        Ok(()) => deleted(User::LABEL),
        Err(e) => errors::resource_error(User::LABEL, e),
    }
}
