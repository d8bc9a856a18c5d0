//! Document schema traits and the record envelope returned to callers.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::id::ExternalId;

/// A typed document stored in one collection.
///
/// Every field of the implementing struct is always present; optional data is
/// modelled with `Option` rather than by leaving keys out of the stored body.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partial update: only the fields set on the patch are applied.
    type Patch: Send + 'static;

    /// Collection the documents live in.
    const COLLECTION: &'static str;

    /// Singular, human-readable name used in messages ("Category").
    const LABEL: &'static str;

    /// Top-level fields whose values must be unique across the collection.
    ///
    /// The storage collaborator is expected to back each of these with a
    /// unique index; the repository's own check only fails fast.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Apply a partial update in place.
    fn apply(&mut self, patch: Self::Patch);

    /// Recompute every derived field from its inputs.
    ///
    /// Called on every write, never on read.
    fn refresh_derived(&mut self) {}
}

/// Documents that carry an active flag and are deactivated instead of removed.
///
/// Implementing this trait is the per-entity delete policy: collections
/// without it are hard-deleted.
pub trait SoftDelete: Document {
    fn is_active(&self) -> bool;

    fn deactivate(&mut self);
}

/// Documents that are removed outright on delete.
///
/// A collection implements either this or [`SoftDelete`], never both; the
/// repository only offers `hard_delete` for implementors.
pub trait HardDelete: Document {}

/// A document as handed to callers: its fields plus the external id and the
/// write timestamps stamped by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: ExternalId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Record<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Record<U> {
        Record {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            data: f(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
    }

    #[test]
    fn record_flattens_document_fields_next_to_id() {
        let now = Utc::now();
        let record = Record {
            id: ExternalId::new("abc"),
            created_at: now,
            updated_at: now,
            data: Note {
                title: "hello".into(),
            },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["title"], "hello");
        assert!(json.get("data").is_none());
        assert!(json.get("_id").is_none());
    }
}
