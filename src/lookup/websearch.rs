//! Web Search Provider (Google Custom Search)
//!
//! Keyword-search fallback for barcodes the structured databases don't
//! know. Search result titles from retail sites usually embed the product
//! name, pack size, and brand; this provider filters out barcode-database
//! listings and mines the first plausible product listing.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info};

use super::{ProductSource, UNIT_QUANTITY_RE, fetch_with_retry};
use crate::constants::{endpoints, limits};
use crate::types::{Barcode, RawProduct, Result};

/// Titles that indicate a barcode-database listing rather than a product page
const LISTING_BLOCKLIST: [&str; 4] = ["upc code", "barcode database", "list of", "codes beginning"];

/// Link fragments of retail sites likely to carry usable product names
const ECOMMERCE_SITES: [&str; 10] = [
    "amazon", "flipkart", "bigbasket", "grofers", "nykaa", "tatacliq", "jiomart", "walmart",
    "target", "shop",
];

/// Title tokens hinting at a unit-of-sale product listing
const PRODUCT_INDICATORS: [&str; 8] = ["g", "kg", "ml", "l", "pack", "combo", "bar", "bottle"];

pub struct WebSearchSource {
    api_key: SecretString,
    cx: String,
    max_retries: u32,
    request_delay: Duration,
    client: reqwest::Client,
}

impl WebSearchSource {
    pub fn new(
        api_key: String,
        cx: String,
        max_retries: u32,
        request_delay: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(limits::SEARCH_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            cx,
            max_retries,
            request_delay,
            client,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchItem>> {
        info!(query, "searching the web");

        let num = limits::SEARCH_RESULT_COUNT.to_string();
        let request = self.client.get(endpoints::GOOGLE_SEARCH_API_URL).query(&[
            ("key", self.api_key.expose_secret()),
            ("cx", self.cx.as_str()),
            ("q", query),
            ("num", num.as_str()),
        ]);

        let response = fetch_with_retry(request, self.max_retries, true, self.name()).await?;
        let body: SearchResponse = response.json().await?;

        // pacing between consecutive search calls
        sleep(self.request_delay).await;

        Ok(body
            .items
            .into_iter()
            .take(limits::SEARCH_TOP_RESULTS)
            .collect())
    }
}

#[async_trait]
impl ProductSource for WebSearchSource {
    async fn lookup(&self, barcode: &Barcode) -> Result<Option<RawProduct>> {
        let mut results = self.search(&format!("{} product", barcode)).await?;

        if results.is_empty() {
            let alternate = alternate_query(barcode);
            debug!(query = %alternate, "no results, trying alternate search");
            results = self.search(&alternate).await?;
        }

        Ok(pick_product(&results))
    }

    fn name(&self) -> &'static str {
        "websearch"
    }
}

/// Second-chance query wording; country-code 890 barcodes are overwhelmingly
/// Indian retail products and search better with that context
fn alternate_query(barcode: &Barcode) -> String {
    if barcode.as_str().starts_with("890") {
        format!("{} indian product description", barcode)
    } else {
        format!("{} product details", barcode)
    }
}

/// Mine the first plausible product listing out of the search results
fn pick_product(results: &[SearchItem]) -> Option<RawProduct> {
    for result in results {
        let title_lower = result.title.to_lowercase();

        if LISTING_BLOCKLIST
            .iter()
            .any(|term| title_lower.contains(term))
        {
            continue;
        }

        let link_lower = result.link.to_lowercase();
        let looks_like_listing = ECOMMERCE_SITES.iter().any(|site| link_lower.contains(site))
            || PRODUCT_INDICATORS
                .iter()
                .any(|token| title_lower.contains(token));
        if !looks_like_listing {
            continue;
        }

        let Some(name) = candidate_name(&result.title) else {
            continue;
        };

        let mut record = RawProduct {
            brand: name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            description: result.snippet.clone(),
            source_url: result.link.clone(),
            source: "Google Search".to_string(),
            name,
            ..Default::default()
        };

        if let Some(caps) = UNIT_QUANTITY_RE.captures(&result.title) {
            record.quantity_value = caps[1].parse().ok();
            record.quantity_unit = Some(caps[2].to_lowercase());
        }

        return Some(record);
    }

    None
}

/// Product name usually precedes "-" or "|" in listing titles.
/// Single-word names and the bare word "product" are noise.
fn candidate_name(title: &str) -> Option<String> {
    let name = if let Some((head, _)) = title.split_once('-') {
        head.trim()
    } else if let Some((head, _)) = title.split_once('|') {
        head.trim()
    } else {
        title.trim()
    };

    if name.split_whitespace().count() >= 2 && !name.eq_ignore_ascii_case("product") {
        Some(name.to_string())
    } else {
        None
    }
}

// Response types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SearchItem {
    title: String,
    snippet: String,
    link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, link: &str) -> SearchItem {
        SearchItem {
            title: title.to_string(),
            snippet: "A fine product.".to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn test_alternate_query_for_india_prefix() {
        let india = Barcode::parse("8901030123456").unwrap();
        assert_eq!(
            alternate_query(&india),
            "8901030123456 indian product description"
        );

        let other = Barcode::parse("5012345678900").unwrap();
        assert_eq!(alternate_query(&other), "5012345678900 product details");
    }

    #[test]
    fn test_pick_product_from_ecommerce_listing() {
        let results = [item(
            "Exo Round Dishwash Bar 90g - Buy Online",
            "https://www.bigbasket.com/pd/12345/",
        )];

        let record = pick_product(&results).unwrap();
        assert_eq!(record.name, "Exo Round Dishwash Bar 90g");
        assert_eq!(record.brand, "Exo");
        assert_eq!(record.description, "A fine product.");
        assert_eq!(record.source, "Google Search");
        assert_eq!(record.quantity_value, Some(90.0));
        assert_eq!(record.quantity_unit.as_deref(), Some("g"));
    }

    #[test]
    fn test_hyphenated_title_truncates_at_first_dash() {
        // the name split is first "-" wins, hyphenated qualifiers included
        let results = [item(
            "Exo Anti-Bacterial Bar - BigBasket",
            "https://www.bigbasket.com/pd/9/",
        )];
        let record = pick_product(&results).unwrap();
        assert_eq!(record.name, "Exo Anti");
    }

    #[test]
    fn test_database_listings_skipped() {
        let results = [
            item(
                "UPC Code 8901030123456 lookup results",
                "https://barcodedb.example.com/890",
            ),
            item(
                "Lux Soap Bar 150g | Grocery",
                "https://www.amazon.in/dp/B000",
            ),
        ];

        let record = pick_product(&results).unwrap();
        assert_eq!(record.name, "Lux Soap Bar 150g");
    }

    #[test]
    fn test_short_names_rejected() {
        let results = [item("Soap - Online Shopping", "https://www.amazon.in/x")];
        assert!(pick_product(&results).is_none());
    }

    #[test]
    fn test_candidate_name_splitting() {
        assert_eq!(
            candidate_name("Amul Butter 500g - BigBasket").as_deref(),
            Some("Amul Butter 500g")
        );
        assert_eq!(
            candidate_name("Amul Butter 500g | JioMart").as_deref(),
            Some("Amul Butter 500g")
        );
        assert_eq!(candidate_name("Product - something"), None);
        assert_eq!(candidate_name("Product"), None);
    }

    #[test]
    fn test_quantity_extracted_case_insensitively() {
        let results = [item("Harpic Liquid 500ML | Shop", "https://www.jiomart.com/p")];
        let record = pick_product(&results).unwrap();
        assert_eq!(record.quantity_value, Some(500.0));
        assert_eq!(record.quantity_unit.as_deref(), Some("ml"));
    }
}
