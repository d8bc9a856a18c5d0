//! Shared service wiring: one storage handle, the token and password
//! services, and a repository per collection. Built once at startup and
//! handed to handlers as `Extension<Arc<AppServices>>`.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use eslhub_auth::{PasswordHasher, TokenService, User};
use eslhub_core::{DomainError, DomainResult, Record};
use eslhub_infra::{CategoryLifecycle, DocumentStore, EntityRepository};
use eslhub_retail::{Esl, Gateway, Product, Store, SyncLog};

use crate::config::AppConfig;

/// Hashed once, under the configured cost, to stand in for a missing account.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

pub struct AppServices {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: TokenService,
    pub passwords: PasswordHasher,
    pub users: EntityRepository<User>,
    pub categories: CategoryLifecycle,
    pub stores: EntityRepository<Store>,
    pub products: EntityRepository<Product>,
    pub esls: EntityRepository<Esl>,
    pub gateways: EntityRepository<Gateway>,
    pub sync_logs: EntityRepository<SyncLog>,
    login_decoy: OnceCell<String>,
}

impl AppServices {
    pub fn new(config: &AppConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tokens: TokenService::new(config.jwt_secret_bytes(), config.jwt_algorithm, config.jwt_expire_minutes),
            passwords: PasswordHasher::new(config.password_cost),
            users: EntityRepository::new(store.clone()),
            categories: CategoryLifecycle::new(store.clone()),
            stores: EntityRepository::new(store.clone()),
            products: EntityRepository::new(store.clone()),
            esls: EntityRepository::new(store.clone()),
            gateways: EntityRepository::new(store.clone()),
            sync_logs: EntityRepository::new(store.clone()),
            login_decoy: OnceCell::new(),
            store,
        }
    }

    /// Unique indexes every checked field depends on.
    pub async fn ensure_indexes(&self) -> DomainResult<()> {
        self.users.ensure_indexes().await?;
        self.categories.repository().ensure_indexes().await
    }

    /// Hash on the blocking pool; Argon2 is deliberately slow.
    pub async fn hash_password(&self, plain: String) -> DomainResult<String> {
        let hasher = self.passwords.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| DomainError::internal(format!("password hashing task failed: {e}")))?
            .map_err(DomainError::from)
    }

    pub async fn verify_password(&self, plain: String, hash: String) -> DomainResult<bool> {
        let hasher = self.passwords.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("password verification task failed: {e}")))
    }

    /// Run a full verification against a throwaway hash, so a login for an
    /// unknown email costs the same as a wrong password.
    pub async fn verify_decoy(&self, plain: String) -> DomainResult<()> {
        let decoy = self
            .login_decoy
            .get_or_try_init(|| self.hash_password(DECOY_PASSWORD.to_string()))
            .await?
            .clone();
        self.verify_password(plain, decoy).await.map(|_| ())
    }

    /// Access token for `user`, subject = its external id.
    pub fn issue_token(&self, user: &Record<User>) -> DomainResult<String> {
        let mut extra = Map::new();
        extra.insert("email".into(), Value::from(user.data.email.clone()));
        self.tokens.issue(user.id.as_str(), extra).map_err(DomainError::from)
    }
}
