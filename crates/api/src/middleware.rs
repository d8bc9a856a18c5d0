//! Authorization gate for protected routes.
//!
//! `NoToken -> TokenPresent -> {Verified, Rejected}`, then
//! `Verified -> {UserFound, UserMissing}`. Every failure short of a storage
//! outage answers 401 with the same message, so callers cannot tell a forged
//! token from a deleted account.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use eslhub_auth::Principal;
use eslhub_core::{DomainError, DomainResult, ExternalId};

use crate::app::errors;
use crate::app::services::AppServices;

const REJECTED: &str = "could not validate credentials";

#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

pub async fn auth_middleware(State(state): State<AuthState>, mut req: Request, next: Next) -> Response {
    let token = match extract_bearer(req.headers()) {
        Some(token) => token.to_string(),
        None => return errors::unauthorized("not authenticated"),
    };

    match authorize(&state.services, &token).await {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// Resolve a bearer token to the live user it names.
pub async fn authorize(services: &AppServices, token: &str) -> DomainResult<Principal> {
    let claims = services.tokens.verify(token).map_err(|e| {
        tracing::debug!(kind = e.kind(), "access token rejected");
        DomainError::unauthenticated(REJECTED)
    })?;

    let user = match services.users.get(&ExternalId::new(claims.sub)).await {
        Ok(user) => user,
        Err(DomainError::NotFound) => {
            tracing::debug!("token subject does not resolve to a user");
            return Err(DomainError::unauthenticated(REJECTED));
        }
        Err(e) => return Err(e),
    };

    if !user.data.is_active {
        tracing::debug!(user_id = %user.id, "token subject is deactivated");
        return Err(DomainError::unauthenticated(REJECTED));
    }

    Ok(Principal::from(&user))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn bearer_scheme_is_required() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("bearer abc")), Some("abc"));
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(extract_bearer(&headers("Bearer ")), None);
        assert_eq!(extract_bearer(&headers("abc")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
