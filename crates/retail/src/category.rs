//! Product categories.
//!
//! A category is `Active` until deleted, then `Inactive` for good: there is
//! no reactivation. Its name stays reserved while inactive.

use serde::{Deserialize, Serialize};

use eslhub_core::{Document, SoftDelete};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Category {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            is_active: true,
        }
    }
}

/// Partial update. The active flag is not patchable; deletion is the only
/// transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Document for Category {
    type Patch = CategoryPatch;

    const COLLECTION: &'static str = "categories";
    const LABEL: &'static str = "Category";
    const UNIQUE_FIELDS: &'static [&'static str] = &["name"];

    fn apply(&mut self, patch: CategoryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

impl SoftDelete for Category {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn deactivate(&mut self) {
        self.is_active = false;
    }
}

/// Well-known categories seeded on first start.
pub const DEFAULT_CATALOG: &[(&str, &str)] = &[
    ("Beverages", "Drinks and beverages"),
    ("Dairy", "Dairy products"),
    ("Bakery", "Baked goods"),
    ("Fruits", "Fresh fruits"),
    ("Snacks", "Snack foods"),
    ("Vegetables", "Fresh vegetables"),
    ("Meat", "Meat and poultry"),
    ("Frozen Foods", "Frozen food items"),
    ("Pantry", "Pantry staples"),
    ("Personal Care", "Personal care products"),
];
