//! Batch Processing Driver
//!
//! Strictly sequential per-barcode enrichment: validate, look up through
//! the provider chain, enhance (AI or heuristic), collect. Invalid and
//! unresolvable barcodes are logged and skipped; nothing aborts the batch.
//! A pacing delay runs after every barcode regardless of outcome.

use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Config;
use crate::enhance::{DeepSeekService, Enhancer, GeminiService, HealthSnapshot, OpenAiService};
use crate::lookup::{DigitEyesSource, OpenFoodFactsSource, SourceChain, WebSearchSource};
use crate::types::{Barcode, EnrichedProduct, Result};

/// Point-in-time processing statistics
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingStats {
    pub processed_items: usize,
    pub last_processed_barcode: Option<String>,
    pub ai_service_status: Vec<HealthSnapshot>,
}

/// Owns the lookup chain, the AI dispatcher, and the per-run session state.
///
/// Lifetime is one batch run; the health records and the processed-barcode
/// history never leak across separate `Processor` instances.
pub struct Processor {
    chain: SourceChain,
    enhancer: Enhancer,
    request_delay: Duration,
    last_processed: Option<EnrichedProduct>,
    processed_barcodes: Vec<String>,
}

impl Processor {
    pub fn new(chain: SourceChain, enhancer: Enhancer, request_delay: Duration) -> Self {
        Self {
            chain,
            enhancer,
            request_delay,
            last_processed: None,
            processed_barcodes: Vec::new(),
        }
    }

    /// Assemble the processor from configuration.
    ///
    /// Sources and services with missing credentials are left out with a
    /// warning; the nutrition database needs no credentials and is always
    /// first in the chain.
    pub fn from_config(config: &Config) -> Result<Self> {
        for name in config.missing_credentials() {
            warn!(
                credential = name,
                "credential not set, the dependent service is disabled"
            );
        }

        let mut chain = SourceChain::new().add_source(OpenFoodFactsSource::new(
            &config.openfoodfacts_url,
            config.max_retries,
        )?);

        if let (Some(key), Some(cx)) = (&config.google_api_key, &config.google_search_cx) {
            chain = chain.add_source(WebSearchSource::new(
                key.clone(),
                cx.clone(),
                config.max_retries,
                config.request_delay(),
            )?);
        }

        if let (Some(app_key), Some(signature)) =
            (&config.digiteyes_app_key, &config.digiteyes_signature)
        {
            chain = chain.add_source(DigitEyesSource::new(
                app_key.clone(),
                signature.clone(),
                config.max_retries,
            )?);
        }

        let mut enhancer = Enhancer::new();
        if let Some(key) = &config.gemini_api_key {
            enhancer = enhancer.add_service(GeminiService::new(key.clone())?);
        }
        if let Some(key) = &config.openai_api_key {
            enhancer = enhancer.add_service(OpenAiService::new(key.clone())?);
        }
        if let Some(key) = &config.deepseek_api_key {
            enhancer = enhancer.add_service(DeepSeekService::new(key.clone())?);
        }

        Ok(Self::new(chain, enhancer, config.request_delay()))
    }

    /// Process a batch of barcode strings sequentially.
    ///
    /// Each barcode runs to completion, retries and backoff included,
    /// before the next begins.
    pub async fn process_batch(&mut self, barcodes: &[String]) -> Vec<EnrichedProduct> {
        let mut results = Vec::new();
        info!(count = barcodes.len(), "starting batch");

        for (index, raw) in barcodes.iter().enumerate() {
            info!(
                item = index + 1,
                total = barcodes.len(),
                barcode = %raw,
                "processing barcode"
            );

            match Barcode::parse(raw) {
                Some(barcode) => {
                    if let Some(record) = self.process_single(&barcode).await {
                        self.processed_barcodes.push(barcode.to_string());
                        self.last_processed = Some(record.clone());
                        results.push(record);
                        info!(barcode = %barcode, "barcode processed");
                    } else {
                        warn!(barcode = %barcode, "no data found for barcode");
                    }
                }
                None => {
                    warn!(barcode = %raw, "invalid barcode format, skipping");
                }
            }

            sleep(self.request_delay).await;
        }

        info!(
            found = results.len(),
            total = barcodes.len(),
            "batch complete"
        );
        results
    }

    async fn process_single(&mut self, barcode: &Barcode) -> Option<EnrichedProduct> {
        let record = self.chain.lookup(barcode).await?;
        info!(name = %record.name, source = %record.source, "found product data");
        Some(self.enhancer.enhance(&record, barcode).await)
    }

    pub fn last_processed(&self) -> Option<&EnrichedProduct> {
        self.last_processed.as_ref()
    }

    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats {
            processed_items: self.processed_barcodes.len(),
            last_processed_barcode: self.processed_barcodes.last().cloned(),
            ai_service_status: self.enhancer.health_snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::ProductSource;
    use crate::types::RawProduct;
    use async_trait::async_trait;

    struct FixtureSource {
        barcode: &'static str,
        record: RawProduct,
    }

    #[async_trait]
    impl ProductSource for FixtureSource {
        async fn lookup(&self, barcode: &Barcode) -> Result<Option<RawProduct>> {
            if barcode.as_str() == self.barcode {
                Ok(Some(self.record.clone()))
            } else {
                Ok(None)
            }
        }

        fn name(&self) -> &'static str {
            "fixture"
        }
    }

    fn lux_source() -> FixtureSource {
        FixtureSource {
            barcode: "8901030123456",
            record: RawProduct {
                name: "Lux Soap".to_string(),
                quantity: "150 g".to_string(),
                quantity_value: Some(150.0),
                quantity_unit: Some("g".to_string()),
                source: "OpenFoodFacts".to_string(),
                ..Default::default()
            },
        }
    }

    fn processor_with(source: FixtureSource) -> Processor {
        Processor::new(
            SourceChain::new().add_source(source),
            Enhancer::new(),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_batch_enriches_known_barcode() {
        let mut processor = processor_with(lux_source());
        let results = processor
            .process_batch(&["8901030123456".to_string()])
            .await;

        assert_eq!(results.len(), 1);
        let record = &results[0];
        assert_eq!(record.category, "Personal Care");
        assert_eq!(record.quantity, 150.0);
        assert_eq!(record.unit, "g");
        assert!(record.data_source.starts_with("Intelligent Processing"));
    }

    #[tokio::test]
    async fn test_invalid_and_unresolvable_barcodes_skipped() {
        let mut processor = processor_with(lux_source());
        let results = processor
            .process_batch(&["123".to_string(), "89012345".to_string()])
            .await;

        assert!(results.is_empty());
        let stats = processor.stats();
        assert_eq!(stats.processed_items, 0);
        assert!(stats.last_processed_barcode.is_none());
    }

    #[tokio::test]
    async fn test_stats_track_processed_history() {
        let mut processor = processor_with(lux_source());
        processor
            .process_batch(&["123".to_string(), "8901030123456".to_string()])
            .await;

        let stats = processor.stats();
        assert_eq!(stats.processed_items, 1);
        assert_eq!(
            stats.last_processed_barcode.as_deref(),
            Some("8901030123456")
        );
        assert_eq!(
            processor.last_processed().unwrap().barcode,
            "8901030123456"
        );
    }

    #[tokio::test]
    async fn test_from_config_without_credentials() {
        let processor = Processor::from_config(&Config::default()).unwrap();
        // only the credential-free nutrition database makes the chain
        assert_eq!(processor.chain.len(), 1);
        assert!(processor.enhancer.health_snapshot().is_empty());
    }
}
