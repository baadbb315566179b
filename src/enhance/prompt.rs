//! Enhancement Prompt Construction
//!
//! One templated prompt shared by every AI service: the barcode plus a JSON
//! dump of the raw provider record, requesting a strict JSON object with a
//! fixed key schema.

use crate::types::{Barcode, RawProduct};

/// System message for the chat-protocol services
pub const SYSTEM_PROMPT: &str =
    "You are a product data specialist who extracts and formats product information.";

pub fn build_enhancement_prompt(raw: &RawProduct, barcode: &Barcode) -> String {
    let context = serde_json::to_string_pretty(raw).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"Analyze this product data for barcode {barcode} and enhance it with accurate information:

Context Data:
{context}

Please return ONLY a valid JSON object with this exact structure:
{{
    "Product Name": "accurate product name",
    "Brand": "brand name",
    "Description": "detailed product description",
    "Category": "main category (Food & Beverages, Personal Care, Household, Health & Medicine, Baby Care, Beauty, Other)",
    "Subcategory": "specific subcategory",
    "ProductLine": "brand + subcategory combination",
    "Quantity": numeric_value,
    "Unit": "g/ml/kg/l/pc",
    "Features": ["feature1", "feature2", "feature3", "feature4"],
    "Specification": {{
        "Brand": "brand name",
        "Weight/Volume": "quantity with unit",
        "Country of Origin": "country",
        "Barcode Type": "EAN-13/UPC-A/etc",
        "Ingredients": "ingredient list if available",
        "Nutrition Facts": "nutrition information if available"
    }}
}}

Guidelines:
1. Extract accurate product name, brand, and description
2. Categorize appropriately based on product type
3. Determine realistic quantity and unit
4. Generate relevant features based on product category
5. Include comprehensive specifications
6. Ensure all JSON is properly formatted

Return only the JSON object, no other text."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_barcode_and_context() {
        let raw = RawProduct {
            name: "Lux Soap".to_string(),
            source: "OpenFoodFacts".to_string(),
            ..Default::default()
        };
        let barcode = Barcode::parse("8901030123456").unwrap();

        let prompt = build_enhancement_prompt(&raw, &barcode);
        assert!(prompt.contains("barcode 8901030123456"));
        assert!(prompt.contains("Lux Soap"));
        assert!(prompt.contains("\"Product Name\""));
        assert!(prompt.contains("Return only the JSON object"));
    }
}
