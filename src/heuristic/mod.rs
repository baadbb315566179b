//! Heuristic Local Formatter
//!
//! Deterministic enrichment used when no AI service is available or
//! successful. All classification runs over a lowercase corpus built from
//! the record's name, description, and search text. Matching is plain
//! substring containment, so fragments embedded in longer words can match
//! ("oil" inside "boiler"); the tables are ordered with that in mind and
//! the first match always wins.

mod tables;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::types::{Barcode, EnrichedProduct, RawProduct};
use tables::{
    ADJACENT_UNITS, CATEGORY_KEYWORDS, FOOD_FEATURES, GENERIC_FEATURES, GENERIC_WEIGHT_RE,
    GM_SUFFIX_RE, HOUSEHOLD_FEATURES, PERSONAL_CARE_FEATURES, QUANTITY_PATTERNS, SUBCATEGORY_MAP,
};

/// Format a raw provider record into the final structured shape without any
/// network call.
pub fn format_product(raw: &RawProduct, barcode: &Barcode) -> EnrichedProduct {
    let name = raw.name.trim();
    let mut brand = raw.brand.trim().to_string();
    let description = raw.description.trim();

    let mut search_text = String::new();
    if !raw.source_url.is_empty() {
        search_text.push_str(&raw.source_url);
        search_text.push(' ');
    }
    if !raw.snippet.is_empty() {
        search_text.push_str(&raw.snippet);
        search_text.push(' ');
    }

    let corpus = format!("{} {} {}", name, description, search_text).to_lowercase();

    let category = classify_category(&corpus);
    let subcategory = classify_subcategory(&corpus);

    // brand defaults to the first word of a multi-word name
    if brand.is_empty() && !name.is_empty() {
        let words: Vec<&str> = name.split_whitespace().collect();
        if words.len() > 1 {
            brand = words[0].to_string();
        }
    }

    // a provider-parsed quantity wins over re-extraction from the corpus
    let (quantity, unit) = match (raw.quantity_value, raw.quantity_unit.as_deref()) {
        (Some(value), Some(unit)) if value > 0.0 && !unit.is_empty() => {
            (value, unit.to_string())
        }
        _ => extract_quantity(&corpus),
    };

    let features = build_features(category, &corpus);
    let specification = build_specification(&brand, barcode, quantity, &unit, category, &corpus);

    let product_name = enhance_name(name, &corpus);
    let description = enhance_description(description, &product_name, &brand, category, &corpus);

    let product_line = if subcategory.is_empty() {
        format!("{} Products", brand)
    } else {
        format!("{} {} Products", brand, subcategory)
    };

    let source = if raw.source.is_empty() {
        "Multiple Sources"
    } else {
        &raw.source
    };

    EnrichedProduct {
        barcode: barcode.to_string(),
        product_name,
        brand,
        description,
        category: category.to_string(),
        subcategory: subcategory.to_string(),
        product_line,
        quantity,
        unit,
        features,
        specification,
        product_image: raw.image_url.clone(),
        ingredient_image: String::new(),
        nutrition_image: String::new(),
        data_source: format!("Intelligent Processing - {}", source),
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// First category whose keyword list matches the corpus; "Other" when none do
fn classify_category(corpus: &str) -> &'static str {
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| corpus.contains(keyword)) {
            return category;
        }
    }
    "Other"
}

/// First subcategory whose key occurs in the corpus; empty when none do
fn classify_subcategory(corpus: &str) -> &'static str {
    for (keyword, subcategory) in SUBCATEGORY_MAP {
        if corpus.contains(keyword) {
            return subcategory;
        }
    }
    ""
}

/// Quantity and unit from the corpus through the ordered pattern table,
/// then a generic digits-then-unit scan, then the "Gm" suffix form.
///
/// Either both sides come out populated or both come out empty.
fn extract_quantity(corpus: &str) -> (f64, String) {
    let mut quantity = 0.0;
    let mut unit = String::new();

    for (pattern, canonical_unit) in QUANTITY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(corpus) {
            match canonical_unit {
                Some(u) => {
                    quantity = caps[1].parse().unwrap_or(0.0);
                    unit = (*u).to_string();
                }
                None => {
                    let count: f64 = caps[1].parse().unwrap_or(0.0);
                    let each: f64 = caps[2].parse().unwrap_or(0.0);
                    quantity = count * each;
                    unit = caps[3].to_string();
                }
            }
            break;
        }
    }

    // generic scan: take the first bare number-with-unit, then confirm the
    // unit by literal adjacency so an unrelated unit elsewhere in the
    // corpus is not attributed to this number
    if quantity == 0.0
        && let Some(caps) = GENERIC_WEIGHT_RE.captures(corpus)
    {
        let digits = caps[1].to_string();
        quantity = digits.parse().unwrap_or(0.0);
        for candidate in ADJACENT_UNITS {
            if corpus.contains(&format!("{} {}", digits, candidate))
                || corpus.contains(&format!("{}{}", digits, candidate))
            {
                unit = candidate.to_string();
                break;
            }
        }
    }

    // listing-style "500 Gm" suffix
    if quantity == 0.0
        && unit.is_empty()
        && let Some(caps) = GM_SUFFIX_RE.captures(corpus)
    {
        quantity = caps[1].parse().unwrap_or(0.0);
        unit = "g".to_string();
    }

    if quantity <= 0.0 || unit.is_empty() {
        (0.0, String::new())
    } else {
        (quantity, unit)
    }
}

/// Category-conditioned canned feature phrases plus corpus-triggered extras
fn build_features(category: &str, corpus: &str) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();

    match category {
        "Personal Care" => {
            features.extend(PERSONAL_CARE_FEATURES.iter().map(|s| s.to_string()));
            if corpus.contains("soap") {
                features.push("Moisturizing".to_string());
                features.push("Long-lasting fragrance".to_string());
            }
        }
        "Household" => {
            features.extend(HOUSEHOLD_FEATURES.iter().map(|s| s.to_string()));
            if corpus.contains("dishwash")
                || corpus.contains("dish wash")
                || corpus.contains("dish bar")
            {
                features.push("Cuts through grease effectively".to_string());
                features.push("Gentle on hands".to_string());
                if corpus.contains("anti-bacterial") || corpus.contains("antibacterial") {
                    features.push("Anti-bacterial formula".to_string());
                }
                if corpus.contains("ginger") {
                    features.push("Ginger twist fragrance".to_string());
                }
            }
        }
        "Food & Beverages" => {
            features.extend(FOOD_FEATURES.iter().map(|s| s.to_string()));
            if corpus.contains("oil") {
                features.push("Pure and natural".to_string());
                features.push("Rich in nutrients".to_string());
            }
        }
        _ => {
            features.extend(GENERIC_FEATURES.iter().map(|s| s.to_string()));
        }
    }

    features
}

fn build_specification(
    brand: &str,
    barcode: &Barcode,
    quantity: f64,
    unit: &str,
    category: &str,
    corpus: &str,
) -> Map<String, Value> {
    let mut spec = Map::new();
    spec.insert("Brand".to_string(), Value::String(brand.to_string()));
    spec.insert(
        "Country of Origin".to_string(),
        Value::String(if barcode.has_india_prefix() {
            "India".to_string()
        } else {
            "Unknown".to_string()
        }),
    );
    spec.insert(
        "Barcode Type".to_string(),
        Value::String(barcode.type_label()),
    );

    if quantity > 0.0 && !unit.is_empty() {
        let amount = format!("{} {}", format_amount(quantity), unit);
        spec.insert("Weight/Volume".to_string(), Value::String(amount.clone()));
        spec.insert("Net Quantity".to_string(), Value::String(amount));
    }

    match category {
        "Personal Care" => {
            spec.insert(
                "Suitable For".to_string(),
                Value::String("All skin types".to_string()),
            );
        }
        "Food & Beverages" => {
            spec.insert(
                "Storage".to_string(),
                Value::String("Store in cool, dry place".to_string()),
            );
        }
        "Household" if corpus.contains("dishwash") || corpus.contains("dish wash") => {
            if corpus.contains("round") {
                spec.insert(
                    "Form Factor".to_string(),
                    Value::String("Round bar".to_string()),
                );
            }
            if corpus.contains("ginger") {
                spec.insert(
                    "Fragrance".to_string(),
                    Value::String("Ginger twist".to_string()),
                );
            }
        }
        _ => {}
    }

    spec
}

/// Whole quantities print without a trailing ".0"
fn format_amount(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        quantity.to_string()
    }
}

/// Very short names get a derived qualifier when the corpus identifies the
/// product type
fn enhance_name(name: &str, corpus: &str) -> String {
    if name.split_whitespace().count() > 2 {
        return name.to_string();
    }

    let mut enhanced = name.to_string();
    let is_dishwash = corpus.contains("dishwash") || corpus.contains("dish wash");

    if (corpus.contains("anti-bacterial") || corpus.contains("antibacterial"))
        && !enhanced.to_lowercase().contains("dish")
        && is_dishwash
    {
        enhanced.push_str(" Anti-Bacterial Dishwash Bar");
    }

    if enhanced.split_whitespace().count() <= 2 && corpus.contains("dishwash") {
        enhanced.push_str(" Dishwash Bar");
    }

    enhanced
}

/// Empty or templated-placeholder descriptions get a synthesized sentence
/// for product types the corpus identifies
fn enhance_description(
    description: &str,
    name: &str,
    brand: &str,
    category: &str,
    corpus: &str,
) -> String {
    let placeholder = format!("{}. Quality product from {}.", name, brand);
    if !description.is_empty() && description != placeholder {
        return description.to_string();
    }

    if category == "Household" && (corpus.contains("dishwash") || corpus.contains("dish wash")) {
        let mut synthesized = format!(
            "{} {} is an effective dishwashing bar that helps remove grease and food residue from dishes.",
            brand, name
        );
        if corpus.contains("anti-bacterial") || corpus.contains("antibacterial") {
            synthesized.push_str(" With anti-bacterial properties to ensure hygienic cleaning.");
        }
        if corpus.contains("ginger") {
            synthesized.push_str(" Features a refreshing ginger fragrance.");
        }
        return synthesized;
    }

    description.to_string()
}
