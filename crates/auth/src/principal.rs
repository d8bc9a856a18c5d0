use serde::Serialize;

use eslhub_core::{ExternalId, Record};

use crate::{Role, User};

/// The authenticated caller of one request.
///
/// Built fresh by the authorization gate for every request and dropped with
/// it; nothing caches it across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: ExternalId,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&Record<User>> for Principal {
    fn from(record: &Record<User>) -> Self {
        Self {
            id: record.id.clone(),
            email: record.data.email.clone(),
            full_name: record.data.full_name.clone(),
            role: record.data.role.clone(),
        }
    }
}
