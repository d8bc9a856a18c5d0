use axum::{
    Router,
    routing::{get, post},
};

use eslhub_retail::{Esl, Gateway, Product, Store, SyncLog};

pub mod auth;
pub mod categories;
pub mod crud;
pub mod system;
pub mod users;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/ready", get(system::ready))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// Routes behind the authorization gate.
pub fn router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .nest("/categories", categories::router())
        .nest("/stores", crud::lifecycle_router::<Store>())
        .nest("/products", crud::router::<Product>())
        .nest("/esls", crud::router::<Esl>())
        .nest("/gateways", crud::router::<Gateway>())
        .nest("/sync-logs", crud::router::<SyncLog>())
        .nest("/users", users::router())
}
