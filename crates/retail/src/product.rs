use serde::{Deserialize, Serialize};

use eslhub_core::{Document, HardDelete};

/// A sellable product shown on shelf labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub barcode: String,
    pub mrp: f64,
    #[serde(default)]
    pub discount: f64,
    pub selling_price: f64,
    pub category: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub barcode: Option<String>,
    pub mrp: Option<f64>,
    pub discount: Option<f64>,
    pub selling_price: Option<f64>,
    pub category: Option<String>,
}

impl Document for Product {
    type Patch = ProductPatch;

    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "Product";

    fn apply(&mut self, patch: ProductPatch) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.barcode {
            self.barcode = v;
        }
        if let Some(v) = patch.mrp {
            self.mrp = v;
        }
        if let Some(v) = patch.discount {
            self.discount = v;
        }
        if let Some(v) = patch.selling_price {
            self.selling_price = v;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
    }
}

impl HardDelete for Product {}
