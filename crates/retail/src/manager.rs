//! Manager identifier derivation.
//!
//! A store's `managerId` is a pure function of its manager's name, so it can
//! be recomputed on every write and compared across processes and runs.

use sha2::{Digest, Sha256};

const PREFIX_LEN: usize = 8;
const FINGERPRINT_LEN: usize = 4;

/// Lower-case the name and keep only ASCII letters and digits.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Derive the stable manager identifier for `manager_name`.
///
/// Format: `mgr-{prefix}-{fingerprint}` where `prefix` is the first eight
/// characters of the normalized name (`unknown` when nothing survives
/// normalization) and `fingerprint` is the first four hex digits of the
/// SHA-256 of the full untrimmed name. The fingerprint separates managers
/// whose normalized prefixes coincide ("John Smith" vs "john-smith").
pub fn derive_manager_id(manager_name: &str) -> String {
    let normalized = normalize_name(manager_name);
    let prefix: String = if normalized.is_empty() {
        "unknown".to_string()
    } else {
        normalized.chars().take(PREFIX_LEN).collect()
    };

    let digest = Sha256::digest(manager_name.as_bytes());
    let fingerprint = hex::encode(digest);

    format!("mgr-{prefix}-{}", &fingerprint[..FINGERPRINT_LEN])
}
