//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JWT_SECRET_KEY` - HMAC secret used to sign and verify access tokens
//!
//! ## Optional
//! - `DATABASE_URL` - `PostgreSQL` connection string (default: in-memory store)
//! - `JWT_ALGORITHM` - `HS256`, `HS384` or `HS512` (default: HS256)
//! - `JWT_EXPIRE_MINUTES` - access token lifetime (default: 60)
//! - `BIND_ADDR` - listen address (default: 0.0.0.0:8080)
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 10)
//! - `SEED_DEFAULT_CATEGORIES` - seed the default catalog on start (default: true)
//! - `LOG_FORMAT` - `json` or `pretty` (default: json)

use std::net::SocketAddr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use eslhub_auth::{HashCost, SigningAlgorithm};
use eslhub_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_EXPIRE_MINUTES: u32 = 60;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct AppConfig {
    /// `None` runs against the in-memory store.
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    pub jwt_secret: SecretString,
    pub jwt_algorithm: SigningAlgorithm,
    pub jwt_expire_minutes: u32,
    pub bind_addr: SocketAddr,
    pub seed_default_categories: bool,
    pub log_format: LogFormat,
    /// Not read from the environment; tests lower it.
    pub password_cost: HashCost,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expire_minutes", &self.jwt_expire_minutes)
            .field("bind_addr", &self.bind_addr)
            .field("seed_default_categories", &self.seed_default_categories)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET_KEY")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET_KEY".to_string()))?;

        let jwt_algorithm = match get("JWT_ALGORITHM") {
            Some(raw) => raw
                .parse::<SigningAlgorithm>()
                .map_err(|e| ConfigError::InvalidEnvVar("JWT_ALGORITHM".to_string(), e))?,
            None => SigningAlgorithm::default(),
        };

        let jwt_expire_minutes = parse_or("JWT_EXPIRE_MINUTES", get("JWT_EXPIRE_MINUTES"), DEFAULT_EXPIRE_MINUTES)?;
        if jwt_expire_minutes == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "JWT_EXPIRE_MINUTES".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BIND_ADDR".to_string(), e.to_string()))?;

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidEnvVar("LOG_FORMAT".to_string(), e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            database_url: get("DATABASE_URL").map(SecretString::from),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            jwt_secret,
            jwt_algorithm,
            jwt_expire_minutes,
            bind_addr,
            seed_default_categories: parse_bool("SEED_DEFAULT_CATEGORIES", get("SEED_DEFAULT_CATEGORIES"), true)?,
            log_format,
            password_cost: HashCost::default(),
        })
    }

    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::InvalidEnvVar(key.to_string(), format!("not a boolean: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = load(&[("JWT_SECRET_KEY", "s3cr3t")]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.jwt_algorithm, SigningAlgorithm::Hs256);
        assert_eq!(config.jwt_expire_minutes, 60);
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert!(config.seed_default_categories);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.jwt_secret_bytes(), b"s3cr3t");
    }

    #[test]
    fn secret_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingEnvVar(k)) if k == "JWT_SECRET_KEY"));
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "  ")]),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn rejects_unknown_algorithm_and_zero_ttl() {
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "s"), ("JWT_ALGORITHM", "none")]),
            Err(ConfigError::InvalidEnvVar(k, _)) if k == "JWT_ALGORITHM"
        ));
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "s"), ("JWT_EXPIRE_MINUTES", "0")]),
            Err(ConfigError::InvalidEnvVar(k, _)) if k == "JWT_EXPIRE_MINUTES"
        ));
        assert!(load(&[("JWT_SECRET_KEY", "s"), ("JWT_EXPIRE_MINUTES", "ten")]).is_err());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("JWT_SECRET_KEY", "s"),
            ("JWT_ALGORITHM", "HS512"),
            ("JWT_EXPIRE_MINUTES", "15"),
            ("DATABASE_URL", "postgres://u:p@localhost/esl"),
            ("SEED_DEFAULT_CATEGORIES", "false"),
            ("LOG_FORMAT", "pretty"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(config.jwt_algorithm, SigningAlgorithm::Hs512);
        assert_eq!(config.jwt_expire_minutes, 15);
        assert!(config.database_url.is_some());
        assert!(!config.seed_default_categories);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = load(&[("JWT_SECRET_KEY", "hunter2"), ("DATABASE_URL", "postgres://u:pw@h/db")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("pw@h"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
