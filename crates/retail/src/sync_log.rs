use serde::{Deserialize, Serialize};

use eslhub_core::{Document, HardDelete};

/// One label synchronisation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLog {
    pub esl_id: String,
    pub product_name: String,
    pub gateway_id: String,
    pub store_name: String,
    pub status: String,
    pub synced_at: String,
    #[serde(default)]
    pub error_message: Option<String>,
    pub duration: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogPatch {
    pub esl_id: Option<String>,
    pub product_name: Option<String>,
    pub gateway_id: Option<String>,
    pub store_name: Option<String>,
    pub status: Option<String>,
    pub synced_at: Option<String>,
    pub error_message: Option<String>,
    pub duration: Option<String>,
}

impl Document for SyncLog {
    type Patch = SyncLogPatch;

    const COLLECTION: &'static str = "sync_logs";
    const LABEL: &'static str = "Sync log";

    fn apply(&mut self, patch: SyncLogPatch) {
        if let Some(v) = patch.esl_id {
            self.esl_id = v;
        }
        if let Some(v) = patch.product_name {
            self.product_name = v;
        }
        if let Some(v) = patch.gateway_id {
            self.gateway_id = v;
        }
        if let Some(v) = patch.store_name {
            self.store_name = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.synced_at {
            self.synced_at = v;
        }
        if let Some(v) = patch.error_message {
            self.error_message = Some(v);
        }
        if let Some(v) = patch.duration {
            self.duration = v;
        }
    }
}

impl HardDelete for SyncLog {}
