//! User account document.
//!
//! Users are created by registration (or by an operator through `/users`),
//! edited in place, and deactivated rather than removed. The stored password
//! hash never leaves the service: HTTP views are built field by field.

use serde::{Deserialize, Serialize};

use eslhub_core::{Document, SoftDelete};

use crate::Role;

fn default_status() -> String {
    "active".to_string()
}

fn default_true() -> bool {
    true
}

/// User account.
///
/// # Invariants
/// - `email` is unique across the `users` collection (backed by a unique index).
/// - `password_hash` is an Argon2id PHC string, never plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password_hash: String,
    #[serde(default, alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(rename = "assignedStores", default)]
    pub assigned_stores: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "lastLogin", default)]
    pub last_login: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: String, full_name: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            password_hash,
            full_name: full_name.into(),
            role,
            assigned_stores: Vec::new(),
            status: default_status(),
            avatar: None,
            last_login: None,
            is_active: true,
        }
    }
}

/// Partial update for a user; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    #[serde(alias = "name")]
    pub full_name: Option<String>,
    pub role: Option<Role>,
    #[serde(rename = "assignedStores")]
    pub assigned_stores: Option<Vec<String>>,
    pub status: Option<String>,
    pub avatar: Option<String>,
    #[serde(rename = "lastLogin")]
    pub last_login: Option<String>,
    /// Set by the caller after hashing; never read from a request body.
    #[serde(skip)]
    pub password_hash: Option<String>,
}

impl Document for User {
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn apply(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(stores) = patch.assigned_stores {
            self.assigned_stores = stores;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(last_login) = patch.last_login {
            self.last_login = Some(last_login);
        }
        if let Some(hash) = patch.password_hash {
            self.password_hash = hash;
        }
    }
}

impl SoftDelete for User {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn deactivate(&mut self) {
        self.is_active = false;
        self.status = "inactive".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_touches_only_provided_fields() {
        let mut user = User::new("a@x.com", "$argon2id$h".into(), "Ann", Role::new("manager"));
        user.apply(UserPatch {
            full_name: Some("Ann B".into()),
            ..Default::default()
        });

        assert_eq!(user.full_name, "Ann B");
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role.as_str(), "manager");
        assert_eq!(user.password_hash, "$argon2id$h");
    }

    #[test]
    fn patch_body_cannot_set_password_hash() {
        let patch: UserPatch =
            serde_json::from_value(serde_json::json!({ "password_hash": "x", "name": "Bob" })).unwrap();
        assert!(patch.password_hash.is_none());
        assert_eq!(patch.full_name.as_deref(), Some("Bob"));
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let user: User = serde_json::from_value(serde_json::json!({
            "email": "a@x.com",
            "password_hash": "h",
        }))
        .unwrap();
        assert_eq!(user.role.as_str(), "user");
        assert_eq!(user.status, "active");
        assert!(user.is_active);
        assert!(user.assigned_stores.is_empty());
    }

    #[test]
    fn deactivate_flips_the_flag() {
        let mut user = User::new("a@x.com", "h".into(), "", Role::default());
        user.deactivate();
        assert!(!user.is_active());
        assert_eq!(user.status, "inactive");
    }
}
