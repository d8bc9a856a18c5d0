use serde::{Deserialize, Serialize};

use eslhub_core::{Document, HardDelete};

/// In-store gateway relaying updates to labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    pub store_name: String,
    pub store_id: String,
    pub ip_address: String,
    pub firmware_version: String,
    pub last_heartbeat: String,
    pub status: String,
    #[serde(default)]
    pub sync_count: u64,
    #[serde(default)]
    pub error_count: u64,
    pub uptime: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPatch {
    pub store_name: Option<String>,
    pub store_id: Option<String>,
    pub ip_address: Option<String>,
    pub firmware_version: Option<String>,
    pub last_heartbeat: Option<String>,
    pub status: Option<String>,
    pub sync_count: Option<u64>,
    pub error_count: Option<u64>,
    pub uptime: Option<String>,
}

impl Document for Gateway {
    type Patch = GatewayPatch;

    const COLLECTION: &'static str = "gateways";
    const LABEL: &'static str = "Gateway";

    fn apply(&mut self, patch: GatewayPatch) {
        if let Some(v) = patch.store_name {
            self.store_name = v;
        }
        if let Some(v) = patch.store_id {
            self.store_id = v;
        }
        if let Some(v) = patch.ip_address {
            self.ip_address = v;
        }
        if let Some(v) = patch.firmware_version {
            self.firmware_version = v;
        }
        if let Some(v) = patch.last_heartbeat {
            self.last_heartbeat = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.sync_count {
            self.sync_count = v;
        }
        if let Some(v) = patch.error_count {
            self.error_count = v;
        }
        if let Some(v) = patch.uptime {
            self.uptime = v;
        }
    }
}

impl HardDelete for Gateway {}
