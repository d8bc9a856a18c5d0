use serde::{Deserialize, Serialize};

use eslhub_core::{Document, HardDelete};

/// An electronic shelf label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Esl {
    pub label_size: String,
    pub battery_level: i32,
    pub signal_strength: i32,
    pub status: String,
    pub product_name: String,
    pub store_name: String,
    #[serde(default)]
    pub last_sync: Option<String>,
    #[serde(default)]
    pub is_recently_sync: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslPatch {
    pub label_size: Option<String>,
    pub battery_level: Option<i32>,
    pub signal_strength: Option<i32>,
    pub status: Option<String>,
    pub product_name: Option<String>,
    pub store_name: Option<String>,
    pub last_sync: Option<String>,
    pub is_recently_sync: Option<bool>,
}

impl Document for Esl {
    type Patch = EslPatch;

    const COLLECTION: &'static str = "esls";
    const LABEL: &'static str = "ESL";

    fn apply(&mut self, patch: EslPatch) {
        if let Some(v) = patch.label_size {
            self.label_size = v;
        }
        if let Some(v) = patch.battery_level {
            self.battery_level = v;
        }
        if let Some(v) = patch.signal_strength {
            self.signal_strength = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.product_name {
            self.product_name = v;
        }
        if let Some(v) = patch.store_name {
            self.store_name = v;
        }
        if let Some(v) = patch.last_sync {
            self.last_sync = Some(v);
        }
        if let Some(v) = patch.is_recently_sync {
            self.is_recently_sync = v;
        }
    }
}

impl HardDelete for Esl {}
