use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use eslhub_auth::{AuthError, Principal};
use eslhub_core::DomainError;

use crate::app::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::app::errors;
use crate::app::services::AppServices;

const EMAIL_TAKEN: &str = "Email already registered";

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    // Fail before paying for a hash; the unique index still decides races.
    match services.users.find_one_by("email", body.email.clone()).await {
        Ok(Some(_)) => {
            tracing::info!("registration with an existing email");
            return errors::domain_error_to_response(DomainError::conflict(EMAIL_TAKEN));
        }
        Ok(None) => {}
        Err(e) => return errors::domain_error_to_response(e),
    }

    let hash = match services.hash_password(body.password.clone()).await {
        Ok(hash) => hash,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match services.users.create(body.into_user(hash)).await {
        Ok(user) => user,
        Err(DomainError::Conflict(_)) => {
            return errors::domain_error_to_response(DomainError::conflict(EMAIL_TAKEN));
        }
        Err(e) => return errors::domain_error_to_response(e),
    };
    tracing::info!(user_id = %user.id, "user registered");

    match services.issue_token(&user) {
        Ok(token) => (StatusCode::CREATED, Json(TokenResponse::bearer(token))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::bad_request(rejection.body_text()),
    };

    let user = match services.users.find_one_by("email", body.email.clone()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            if let Err(e) = services.verify_decoy(body.password).await {
                return errors::domain_error_to_response(e);
            }
            return errors::domain_error_to_response(AuthError::InvalidCredentials.into());
        }
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services
        .verify_password(body.password, user.data.password_hash.clone())
        .await
    {
        Ok(true) => {}
        Ok(false) => return errors::domain_error_to_response(AuthError::InvalidCredentials.into()),
        Err(e) => return errors::domain_error_to_response(e),
    }
    if !user.data.is_active {
        return errors::domain_error_to_response(AuthError::AccountInactive.into());
    }

    match services.issue_token(&user) {
        Ok(token) => (StatusCode::OK, Json(TokenResponse::bearer(token))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn me(Extension(principal): Extension<Principal>) -> axum::response::Response {
    (StatusCode::OK, Json(principal)).into_response()
}
