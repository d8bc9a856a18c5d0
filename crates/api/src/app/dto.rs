use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eslhub_auth::{Role, User, UserPatch};
use eslhub_core::{DomainError, DomainResult, ExternalId, Record};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> DomainResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }

    pub fn into_user(self, password_hash: String) -> User {
        User::new(
            self.email,
            password_hash,
            self.full_name.unwrap_or_default(),
            self.role.map(Role::new).unwrap_or_default(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /users`: an operator-created account.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(rename = "assignedStores", default)]
    pub assigned_stores: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> DomainResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }

    pub fn into_user(self, password_hash: String) -> User {
        let mut user = User::new(
            self.email,
            password_hash,
            self.full_name.unwrap_or_default(),
            self.role.map(Role::new).unwrap_or_default(),
        );
        user.assigned_stores = self.assigned_stores;
        user.avatar = self.avatar;
        if let Some(status) = self.status {
            user.status = status;
        }
        user
    }
}

/// `PUT /users/{id}`: profile fields plus an optional new password.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub password: Option<String>,
    #[serde(flatten)]
    pub patch: UserPatch,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListCategoriesQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub fn validate_email(email: &str) -> DomainResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid && !email.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(DomainError::validation("email must be a valid address"))
    }
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.is_empty() {
        return Err(DomainError::validation("password must not be empty"));
    }
    Ok(())
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A user as returned over HTTP. Built field by field so the password hash
/// cannot leak through a new field on [`User`].
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: ExternalId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(rename = "assignedStores")]
    pub assigned_stores: Vec<String>,
    pub status: String,
    pub avatar: Option<String>,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Record<User>> for UserView {
    fn from(record: Record<User>) -> Self {
        let user = record.data;
        Self {
            id: record.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            assigned_stores: user.assigned_stores,
            status: user.status,
            avatar: user.avatar,
            last_login: user.last_login,
            is_active: user.is_active,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("a@x").is_ok());
        assert!(validate_email("ax.com").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email("a b@x.com").is_err());
    }

    #[test]
    fn user_view_omits_password_hash() {
        let now = Utc::now();
        let record = Record {
            id: ExternalId::new("0123"),
            created_at: now,
            updated_at: now,
            data: User::new("a@x.com", "$argon2id$secret".into(), "Ann", Role::default()),
        };
        let json = serde_json::to_value(UserView::from(record)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2id"));
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn update_request_splits_password_from_profile() {
        let req: UpdateUserRequest =
            serde_json::from_value(serde_json::json!({ "password": "new", "name": "Bo", "role": "admin" })).unwrap();
        assert_eq!(req.password.as_deref(), Some("new"));
        assert_eq!(req.patch.full_name.as_deref(), Some("Bo"));
        assert!(req.patch.password_hash.is_none());
    }
}
