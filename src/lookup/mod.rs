//! Product Lookup Chain
//!
//! Ordered fallback over external product data providers. Providers are
//! tried in fixed priority order until one returns a record with a
//! non-empty product name; a failing provider is logged and skipped, never
//! fatal.
//!
//! ## Retry policy
//!
//! - HTTP 429 retries up to the configured maximum with linearly increasing
//!   backoff (`(attempt + 1) * 5` seconds)
//! - any other non-success status aborts the call
//! - transport errors retry only for the web-search provider; the other
//!   providers treat them as terminal

mod digiteyes;
mod openfoodfacts;
mod websearch;

pub use digiteyes::DigitEyesSource;
pub use openfoodfacts::OpenFoodFactsSource;
pub use websearch::WebSearchSource;

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::constants::limits;
use crate::types::{Barcode, ErrorCategory, ErrorClassifier, RawProduct, Result, ServiceError};

/// Quantity-with-unit pattern shared by the title/packaging extractors
pub(crate) static UNIT_QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(g|gm|gram|ml|l|liter|kg|pc|pack)").unwrap()
});

// =============================================================================
// Product Source Trait
// =============================================================================

/// A single external product data provider
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Look up a barcode. `Ok(None)` means the provider has no data;
    /// `Err` means the call itself failed.
    async fn lookup(&self, barcode: &Barcode) -> Result<Option<RawProduct>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

// =============================================================================
// Source Chain
// =============================================================================

/// First-success combinator over an ordered list of product sources.
///
/// The declaration order is the tie-break: earlier sources win.
#[derive(Default)]
pub struct SourceChain {
    sources: Vec<Box<dyn ProductSource>>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Append a source at the end of the priority order
    pub fn add_source(mut self, source: impl ProductSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Try every source in order; return the first record with a name.
    ///
    /// Source failures and empty results both advance the chain.
    pub async fn lookup(&self, barcode: &Barcode) -> Option<RawProduct> {
        for source in &self.sources {
            debug!(source = source.name(), barcode = %barcode, "trying lookup source");
            match source.lookup(barcode).await {
                Ok(Some(record)) if record.has_name() => {
                    info!(
                        source = source.name(),
                        name = %record.name,
                        "lookup hit"
                    );
                    return Some(record);
                }
                Ok(Some(_)) => {
                    debug!(source = source.name(), "record without a name, continuing");
                }
                Ok(None) => {
                    info!(source = source.name(), barcode = %barcode, "no data, trying next source");
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "source failed, trying next");
                }
            }
        }
        None
    }
}

// =============================================================================
// Shared Retry Helper
// =============================================================================

/// Send a request, retrying rate-limited responses.
///
/// `retry_network` additionally retries transport failures after a short
/// fixed delay (web-search semantics); when unset a transport failure is
/// terminal for the call.
pub(crate) async fn fetch_with_retry(
    request: reqwest::RequestBuilder,
    max_retries: u32,
    retry_network: bool,
    source: &str,
) -> Result<reqwest::Response> {
    let mut last_error: Option<ServiceError> = None;

    for attempt in 0..max_retries {
        let Some(attempt_request) = request.try_clone() else {
            return Err(ServiceError::with_service(
                ErrorCategory::BadRequest,
                "request cannot be retried",
                source,
            )
            .into());
        };

        match attempt_request.send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) if response.status().as_u16() == 429 => {
                let wait = Duration::from_secs(
                    u64::from(attempt + 1) * limits::RATE_LIMIT_BACKOFF_STEP_SECS,
                );
                warn!(
                    source,
                    wait_secs = wait.as_secs(),
                    attempt = attempt + 1,
                    "rate limit hit, backing off"
                );
                last_error = Some(ServiceError::with_service(
                    ErrorCategory::RateLimit,
                    "rate limit retries exhausted",
                    source,
                ));
                sleep(wait).await;
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(ErrorClassifier::classify_http_status(status, &body, source).into());
            }
            Err(err) if retry_network => {
                warn!(source, error = %err, "request failed, retrying");
                last_error = Some(ErrorClassifier::classify_request_error(&err, source));
                sleep(Duration::from_secs(limits::NETWORK_RETRY_DELAY_SECS)).await;
            }
            Err(err) => {
                return Err(ErrorClassifier::classify_request_error(&err, source).into());
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| {
            ServiceError::with_service(ErrorCategory::Unknown, "retries exhausted", source)
        })
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubSource {
        name: &'static str,
        record: Option<RawProduct>,
        fail: bool,
        calls: Arc<AtomicU32>,
    }

    impl StubSource {
        fn hit(name: &'static str, product_name: &str) -> Self {
            Self {
                name,
                record: Some(RawProduct {
                    name: product_name.to_string(),
                    source: name.to_string(),
                    ..Default::default()
                }),
                fail: false,
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn miss(name: &'static str) -> Self {
            Self {
                name,
                record: None,
                fail: false,
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                record: None,
                fail: true,
                calls: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    #[async_trait]
    impl ProductSource for StubSource {
        async fn lookup(&self, _barcode: &Barcode) -> Result<Option<RawProduct>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ServiceError::with_service(
                    ErrorCategory::Network,
                    "boom",
                    self.name,
                )
                .into());
            }
            Ok(self.record.clone())
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    fn barcode() -> Barcode {
        Barcode::parse("8901030123456").unwrap()
    }

    #[tokio::test]
    async fn test_first_hit_wins() {
        let chain = SourceChain::new()
            .add_source(StubSource::hit("primary", "Lux Soap"))
            .add_source(StubSource::hit("secondary", "Wrong Product"));

        let record = chain.lookup(&barcode()).await.unwrap();
        assert_eq!(record.name, "Lux Soap");
        assert_eq!(record.source, "primary");
    }

    #[tokio::test]
    async fn test_later_sources_not_queried_after_hit() {
        let secondary = StubSource::hit("secondary", "Unseen");
        let counter = Arc::clone(&secondary.calls);
        let chain = SourceChain::new()
            .add_source(StubSource::hit("primary", "Lux Soap"))
            .add_source(secondary);

        chain.lookup(&barcode()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chain_advances_past_misses_and_failures() {
        let chain = SourceChain::new()
            .add_source(StubSource::miss("first"))
            .add_source(StubSource::failing("second"))
            .add_source(StubSource::hit("third", "Exo Round"));

        let record = chain.lookup(&barcode()).await.unwrap();
        assert_eq!(record.source, "third");
    }

    #[tokio::test]
    async fn test_nameless_record_does_not_count() {
        let nameless = StubSource {
            name: "first",
            record: Some(RawProduct::default()),
            fail: false,
            calls: Arc::new(AtomicU32::new(0)),
        };
        let chain = SourceChain::new()
            .add_source(nameless)
            .add_source(StubSource::hit("second", "Exo Round"));

        let record = chain.lookup(&barcode()).await.unwrap();
        assert_eq!(record.source, "second");
    }

    #[tokio::test]
    async fn test_all_miss_returns_none() {
        let chain = SourceChain::new()
            .add_source(StubSource::miss("first"))
            .add_source(StubSource::failing("second"));

        assert!(chain.lookup(&barcode()).await.is_none());
    }
}
