//! DigitEyes Provider
//!
//! Last-resort keyed barcode lookup. A response only counts when it carries
//! a `description`; pack size is mined from the `packaging` field.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{ProductSource, UNIT_QUANTITY_RE, fetch_with_retry};
use crate::constants::{endpoints, limits};
use crate::types::{Barcode, RawProduct, Result};

pub struct DigitEyesSource {
    app_key: SecretString,
    signature: SecretString,
    max_retries: u32,
    client: reqwest::Client,
}

impl DigitEyesSource {
    pub fn new(app_key: String, signature: String, max_retries: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(limits::LOOKUP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            app_key: SecretString::from(app_key),
            signature: SecretString::from(signature),
            max_retries,
            client,
        })
    }
}

#[async_trait]
impl ProductSource for DigitEyesSource {
    async fn lookup(&self, barcode: &Barcode) -> Result<Option<RawProduct>> {
        debug!(barcode = %barcode, "querying barcode lookup service");

        let request = self.client.get(endpoints::DIGITEYES_API_URL).query(&[
            ("upcCode", barcode.as_str()),
            ("app_key", self.app_key.expose_secret()),
            ("signature", self.signature.expose_secret()),
            ("language", "en"),
        ]);

        let response = fetch_with_retry(request, self.max_retries, false, self.name()).await?;
        let body: DigitEyesResponse = response.json().await?;

        Ok(record_from_response(body))
    }

    fn name(&self) -> &'static str {
        "digiteyes"
    }
}

fn record_from_response(body: DigitEyesResponse) -> Option<RawProduct> {
    let description = body.description.filter(|d| !d.is_empty())?;

    let mut record = RawProduct {
        name: description.clone(),
        brand: body.brand.unwrap_or_default(),
        description,
        image_url: body.image.unwrap_or_default(),
        source: "DigitEyes".to_string(),
        ..Default::default()
    };

    if let Some(packaging) = body.packaging
        && let Some(caps) = UNIT_QUANTITY_RE.captures(&packaging)
    {
        record.quantity_value = caps[1].parse().ok();
        record.quantity_unit = Some(caps[2].to_lowercase());
    }

    Some(record)
}

// Response types

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DigitEyesResponse {
    description: Option<String>,
    brand: Option<String>,
    image: Option<String>,
    packaging: Option<String>,
}
