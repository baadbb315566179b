//! Product Record Types
//!
//! `RawProduct` is the transient output of a single lookup provider;
//! `EnrichedProduct` is the terminal structured record. Field declaration
//! order on `EnrichedProduct` is the output contract - serde serializes in
//! that order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Raw Provider Record
// =============================================================================

/// Raw product facts from exactly one lookup provider.
///
/// Never merged across providers: the first provider returning a named
/// record wins and its output is consumed within the same barcode's
/// processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProduct {
    pub name: String,
    pub brand: String,
    pub description: String,
    pub ingredients: String,
    pub image_url: String,
    /// Free-text quantity as reported by the provider, e.g. "150 g"
    pub quantity: String,
    pub quantity_value: Option<f64>,
    pub quantity_unit: Option<String>,
    pub snippet: String,
    pub source_url: String,
    /// Display name of the originating provider
    pub source: String,
}

impl RawProduct {
    /// A record only counts as a lookup hit when it carries a product name
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

// =============================================================================
// Enriched Product Record
// =============================================================================

/// Final structured product record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichedProduct {
    #[serde(rename = "Barcode")]
    pub barcode: String,
    #[serde(rename = "Product Name")]
    pub product_name: String,
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "ProductLine")]
    pub product_line: String,
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Features")]
    pub features: Vec<String>,
    #[serde(rename = "Specification")]
    pub specification: Map<String, Value>,
    #[serde(rename = "Product Image")]
    pub product_image: String,
    #[serde(rename = "Product Ingredient Image")]
    pub ingredient_image: String,
    #[serde(rename = "Nutrition Image")]
    pub nutrition_image: String,
    #[serde(rename = "Data Source")]
    pub data_source: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl EnrichedProduct {
    /// Build a record from an AI response object.
    ///
    /// Accepts the object only when it carries a non-empty `Product Name`.
    /// Provenance fields (barcode, images, data source, timestamp) are left
    /// for the caller to stamp.
    pub fn from_ai_object(object: &Map<String, Value>) -> Option<Self> {
        let product_name = string_field(object, "Product Name");
        if product_name.trim().is_empty() {
            return None;
        }

        Some(Self {
            product_name,
            brand: string_field(object, "Brand"),
            description: string_field(object, "Description"),
            category: string_field(object, "Category"),
            subcategory: string_field(object, "Subcategory"),
            product_line: string_field(object, "ProductLine"),
            quantity: number_field(object, "Quantity"),
            unit: string_field(object, "Unit"),
            features: string_list_field(object, "Features"),
            specification: object_field(object, "Specification"),
            ..Default::default()
        })
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Quantity may come back as a number or a numeric string
fn number_field(object: &Map<String, Value>, key: &str) -> f64 {
    match object.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn string_list_field(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn object_field(object: &Map<String, Value>, key: &str) -> Map<String, Value> {
    match object.get(key) {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}
