//! Retail stores.

use serde::{Deserialize, Serialize};

use eslhub_core::{Document, SoftDelete};

use crate::manager::derive_manager_id;

fn default_status() -> String {
    "active".to_string()
}

fn default_true() -> bool {
    true
}

/// A physical store.
///
/// # Invariants
/// - `manager_id == derive_manager_id(&manager)` after every write. Callers
///   never supply it; anything they send is overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub name: String,
    pub location: String,
    pub manager: String,
    #[serde(default)]
    pub manager_id: String,
    #[serde(default)]
    pub esl_count: u32,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub last_sync: Option<String>,
    #[serde(rename = "is_active", default = "default_true")]
    pub is_active: bool,
}

impl Store {
    pub fn new(name: impl Into<String>, location: impl Into<String>, manager: impl Into<String>) -> Self {
        let mut store = Self {
            name: name.into(),
            location: location.into(),
            manager: manager.into(),
            manager_id: String::new(),
            esl_count: 0,
            status: default_status(),
            last_sync: None,
            is_active: true,
        };
        store.refresh_derived();
        store
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub manager: Option<String>,
    pub esl_count: Option<u32>,
    pub status: Option<String>,
    pub last_sync: Option<String>,
}

impl Document for Store {
    type Patch = StorePatch;

    const COLLECTION: &'static str = "stores";
    const LABEL: &'static str = "Store";

    fn apply(&mut self, patch: StorePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(manager) = patch.manager {
            self.manager = manager;
        }
        if let Some(esl_count) = patch.esl_count {
            self.esl_count = esl_count;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(last_sync) = patch.last_sync {
            self.last_sync = Some(last_sync);
        }
    }

    fn refresh_derived(&mut self) {
        self.manager_id = derive_manager_id(&self.manager);
    }
}

impl SoftDelete for Store {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn deactivate(&mut self) {
        self.is_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_supplied_manager_id_is_overwritten() {
        let mut store: Store = serde_json::from_value(serde_json::json!({
            "name": "Store #001",
            "location": "Downtown Mall",
            "manager": "John Smith",
            "managerId": "mgr-001",
        }))
        .unwrap();
        store.refresh_derived();
        assert_eq!(store.manager_id, derive_manager_id("John Smith"));
    }

    #[test]
    fn manager_change_rederives_id() {
        let mut store = Store::new("S", "L", "John Smith");
        store.apply(StorePatch {
            manager: Some("Jane Smith".into()),
            ..Default::default()
        });
        store.refresh_derived();
        assert_eq!(store.manager_id, derive_manager_id("Jane Smith"));
    }

    #[test]
    fn patch_without_manager_keeps_id() {
        let mut store = Store::new("S", "L", "John Smith");
        let before = store.manager_id.clone();
        store.apply(StorePatch {
            location: Some("Uptown".into()),
            ..Default::default()
        });
        store.refresh_derived();
        assert_eq!(store.manager_id, before);
        assert_eq!(store.location, "Uptown");
    }

    #[test]
    fn wire_names_are_camel_case() {
        let json = serde_json::to_value(Store::new("S", "L", "M")).unwrap();
        assert!(json.get("managerId").is_some());
        assert!(json.get("eslCount").is_some());
        assert_eq!(json["is_active"], true);
    }
}
