//! OpenFoodFacts Provider
//!
//! Primary lookup source. GET by barcode against the public product API;
//! a record exists when the response carries `status == 1` and a nested
//! product object.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::{ProductSource, fetch_with_retry};
use crate::constants::limits;
use crate::types::{Barcode, RawProduct, Result};

/// Quantity strings look like "150 g" or "1.5l"
static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(g|ml|l|kg)").unwrap());

pub struct OpenFoodFactsSource {
    base_url: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl OpenFoodFactsSource {
    pub fn new(base_url: impl Into<String>, max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(limits::LOOKUP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            max_retries,
            client,
        })
    }
}

#[async_trait]
impl ProductSource for OpenFoodFactsSource {
    async fn lookup(&self, barcode: &Barcode) -> Result<Option<RawProduct>> {
        let url = format!("{}{}.json", self.base_url, barcode);
        debug!(%url, "querying nutrition database");

        let response =
            fetch_with_retry(self.client.get(&url), self.max_retries, false, self.name()).await?;
        let body: OffResponse = response.json().await?;

        if body.status != 1 {
            return Ok(None);
        }
        let Some(product) = body.product else {
            return Ok(None);
        };

        Ok(Some(record_from_product(product)))
    }

    fn name(&self) -> &'static str {
        "openfoodfacts"
    }
}

fn record_from_product(product: OffProduct) -> RawProduct {
    let mut record = RawProduct {
        name: product.product_name.unwrap_or_default(),
        brand: product.brands.unwrap_or_default(),
        description: product.generic_name.unwrap_or_default(),
        ingredients: product.ingredients_text.unwrap_or_default(),
        image_url: product.image_url.unwrap_or_default(),
        quantity: product.quantity.unwrap_or_default(),
        source: "OpenFoodFacts".to_string(),
        ..Default::default()
    };

    if !record.quantity.is_empty()
        && let Some(caps) = QUANTITY_RE.captures(&record.quantity.to_lowercase())
    {
        record.quantity_value = caps[1].parse().ok();
        record.quantity_unit = Some(caps[2].to_string());
    }

    record
}

// Response types

#[derive(Debug, Deserialize)]
struct OffResponse {
    #[serde(default)]
    status: i64,
    product: Option<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OffProduct {
    product_name: Option<String>,
    brands: Option<String>,
    generic_name: Option<String>,
    ingredients_text: Option<String>,
    image_url: Option<String>,
    quantity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_product() {
        let product = OffProduct {
            product_name: Some("Lux Soap".into()),
            brands: Some("Lux".into()),
            generic_name: Some("Beauty soap bar".into()),
            quantity: Some("150 g".into()),
            ..Default::default()
        };

        let record = record_from_product(product);
        assert_eq!(record.name, "Lux Soap");
        assert_eq!(record.brand, "Lux");
        assert_eq!(record.source, "OpenFoodFacts");
        assert_eq!(record.quantity_value, Some(150.0));
        assert_eq!(record.quantity_unit.as_deref(), Some("g"));
    }

    #[test]
    fn test_quantity_parse_handles_case_and_decimals() {
        let product = OffProduct {
            product_name: Some("Milk".into()),
            quantity: Some("1.5 L".into()),
            ..Default::default()
        };

        let record = record_from_product(product);
        assert_eq!(record.quantity_value, Some(1.5));
        assert_eq!(record.quantity_unit.as_deref(), Some("l"));
    }

    #[test]
    fn test_unparseable_quantity_left_raw() {
        let product = OffProduct {
            product_name: Some("Tea".into()),
            quantity: Some("family size".into()),
            ..Default::default()
        };

        let record = record_from_product(product);
        assert_eq!(record.quantity, "family size");
        assert!(record.quantity_value.is_none());
        assert!(record.quantity_unit.is_none());
    }

    #[test]
    fn test_status_zero_means_no_record() {
        let body: OffResponse =
            serde_json::from_str(r#"{"status": 0, "status_verbose": "product not found"}"#)
                .unwrap();
        assert_eq!(body.status, 0);
        assert!(body.product.is_none());
    }
}
