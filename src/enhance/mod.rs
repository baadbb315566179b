//! AI Enhancement Dispatcher
//!
//! Converts a raw provider record into the final structured record by
//! asking a fixed-priority list of text-generation services for strict
//! JSON, tracking per-service health along the way. When no service
//! produces an acceptable result the heuristic formatter takes over, so
//! `enhance` always yields a record.
//!
//! ## Health semantics
//!
//! - health is monotonic: a disabled service stays disabled for the run
//! - three consecutive failures disable a service
//! - auth and quota errors disable a service immediately
//! - rate limiting counts as a failure but never disables on its own
//! - a successful call resets the failure counter

mod chat;
mod deepseek;
mod gemini;
mod json_repair;
mod openai;
mod prompt;

pub use deepseek::DeepSeekService;
pub use gemini::GeminiService;
pub use json_repair::extract_object;
pub use openai::OpenAiService;
pub use prompt::build_enhancement_prompt;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::limits;
use crate::heuristic::format_product;
use crate::types::{Barcode, EnrichedProduct, RawProduct, ServiceError};

// =============================================================================
// Service Identity and Health
// =============================================================================

/// Identifier for each text-generation service, in dispatch priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    Gemini,
    OpenAi,
    DeepSeek,
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAi => write!(f, "openai"),
            Self::DeepSeek => write!(f, "deepseek"),
        }
    }
}

/// Mutable health state for one AI service.
///
/// `working` only ever transitions from true to false; there is no
/// recovery within a run.
#[derive(Debug, Clone)]
pub struct ServiceHealth {
    pub working: bool,
    pub failures: u32,
}

impl Default for ServiceHealth {
    fn default() -> Self {
        Self {
            working: true,
            failures: 0,
        }
    }
}

impl ServiceHealth {
    pub fn record_success(&mut self) {
        self.failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
        if self.failures >= limits::AI_FAILURE_THRESHOLD {
            self.working = false;
        }
    }

    pub fn disable(&mut self) {
        self.working = false;
    }
}

/// Point-in-time health view for statistics reporting
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub service: String,
    pub working: bool,
    pub failures: u32,
}

// =============================================================================
// AI Service Trait
// =============================================================================

/// A text-generation endpoint capable of answering the enhancement prompt
#[async_trait]
pub trait AiService: Send + Sync {
    /// Request a completion; returns the raw response text
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;

    fn id(&self) -> ServiceId;
}

// =============================================================================
// Enhancer
// =============================================================================

struct ServiceSlot {
    service: Box<dyn AiService>,
    health: ServiceHealth,
}

/// Fixed-priority AI dispatcher with heuristic fallback
#[derive(Default)]
pub struct Enhancer {
    services: Vec<ServiceSlot>,
}

impl Enhancer {
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
        }
    }

    /// Append a service at the end of the priority order
    pub fn add_service(mut self, service: impl AiService + 'static) -> Self {
        self.services.push(ServiceSlot {
            service: Box::new(service),
            health: ServiceHealth::default(),
        });
        self
    }

    /// True while at least one service may still be attempted
    pub fn any_available(&self) -> bool {
        self.services.iter().any(|slot| slot.health.working)
    }

    pub fn health_snapshot(&self) -> Vec<HealthSnapshot> {
        self.services
            .iter()
            .map(|slot| HealthSnapshot {
                service: slot.service.id().to_string(),
                working: slot.health.working,
                failures: slot.health.failures,
            })
            .collect()
    }

    /// Enhance a raw record into the final structured shape.
    ///
    /// When every service is already disabled no network call is made and
    /// the heuristic formatter runs directly.
    pub async fn enhance(&mut self, raw: &RawProduct, barcode: &Barcode) -> EnrichedProduct {
        if !self.any_available() {
            info!("no AI service available, using local formatting");
            return format_product(raw, barcode);
        }

        let prompt = build_enhancement_prompt(raw, barcode);

        if let Some(text) = self.dispatch(&prompt).await
            && let Some(record) = accept_response(&text, raw, barcode)
        {
            info!("product data enhanced via AI");
            return record;
        }

        info!("AI enhancement failed, using local formatting");
        format_product(raw, barcode)
    }

    /// Try each working service in priority order; the first response text
    /// short-circuits the chain.
    async fn dispatch(&mut self, prompt: &str) -> Option<String> {
        for slot in &mut self.services {
            let id = slot.service.id();
            if !slot.health.working {
                debug!(service = %id, "skipping disabled service");
                continue;
            }

            info!(service = %id, "requesting AI enhancement");
            match slot.service.complete(prompt).await {
                Ok(text) => {
                    slot.health.record_success();
                    return Some(text);
                }
                Err(err) => {
                    warn!(service = %id, error = %err, "AI service call failed");
                    if err.disables_service() {
                        slot.health.disable();
                        warn!(
                            service = %id,
                            category = %err.category,
                            "service disabled for the rest of the run"
                        );
                    } else {
                        slot.health.record_failure();
                        if !slot.health.working {
                            warn!(service = %id, "service disabled after repeated failures");
                        }
                    }
                }
            }
        }
        None
    }
}

/// Parse a service response and accept it only when it carries a non-empty
/// product name; acceptance stamps provenance onto the record.
fn accept_response(text: &str, raw: &RawProduct, barcode: &Barcode) -> Option<EnrichedProduct> {
    let object = extract_object(text)?;
    let mut record = EnrichedProduct::from_ai_object(&object)?;

    record.barcode = barcode.to_string();
    record.product_image = raw.image_url.clone();
    record.ingredient_image = String::new();
    record.data_source = "AI Enhanced".to_string();
    record.timestamp = Utc::now().to_rfc3339();

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCategory;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct MockService {
        id: ServiceId,
        outcome: MockOutcome,
        calls: Arc<AtomicU32>,
    }

    enum MockOutcome {
        Text(&'static str),
        Fail(ErrorCategory),
    }

    impl MockService {
        fn replying(id: ServiceId, text: &'static str) -> Self {
            Self {
                id,
                outcome: MockOutcome::Text(text),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn failing(id: ServiceId, category: ErrorCategory) -> Self {
            Self {
                id,
                outcome: MockOutcome::Fail(category),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    #[async_trait]
    impl AiService for MockService {
        async fn complete(&self, _prompt: &str) -> Result<String, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                MockOutcome::Text(text) => Ok((*text).to_string()),
                MockOutcome::Fail(category) => Err(ServiceError::with_service(
                    *category,
                    "mock failure",
                    self.id.to_string(),
                )),
            }
        }

        fn id(&self) -> ServiceId {
            self.id
        }
    }

    fn barcode() -> Barcode {
        Barcode::parse("8901030123456").unwrap()
    }

    fn raw() -> RawProduct {
        RawProduct {
            name: "Lux Soap".to_string(),
            image_url: "https://img.example.com/lux.jpg".to_string(),
            source: "OpenFoodFacts".to_string(),
            ..Default::default()
        }
    }

    const GOOD_JSON: &str = r#"{"Product Name": "Lux Velvet Touch Soap", "Brand": "Lux",
        "Category": "Personal Care", "Quantity": 150, "Unit": "g"}"#;

    #[tokio::test]
    async fn test_first_service_wins() {
        let mut enhancer = Enhancer::new()
            .add_service(MockService::replying(ServiceId::Gemini, GOOD_JSON))
            .add_service(MockService::replying(ServiceId::OpenAi, "{}"));

        let record = enhancer.enhance(&raw(), &barcode()).await;
        assert_eq!(record.product_name, "Lux Velvet Touch Soap");
        assert_eq!(record.data_source, "AI Enhanced");
        assert_eq!(record.barcode, "8901030123456");
        assert_eq!(record.product_image, "https://img.example.com/lux.jpg");
    }

    #[tokio::test]
    async fn test_fallback_to_next_service_on_failure() {
        let mut enhancer = Enhancer::new()
            .add_service(MockService::failing(ServiceId::Gemini, ErrorCategory::Transient))
            .add_service(MockService::replying(ServiceId::OpenAi, GOOD_JSON));

        let record = enhancer.enhance(&raw(), &barcode()).await;
        assert_eq!(record.data_source, "AI Enhanced");
        assert_eq!(enhancer.health_snapshot()[0].failures, 1);
    }

    #[tokio::test]
    async fn test_three_failures_disable_service() {
        let flaky = MockService::failing(ServiceId::Gemini, ErrorCategory::Transient);
        let calls = Arc::clone(&flaky.calls);
        let mut enhancer = Enhancer::new().add_service(flaky);

        for _ in 0..5 {
            enhancer.enhance(&raw(), &barcode()).await;
        }

        // called on the first three rounds, then skipped
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let health = &enhancer.health_snapshot()[0];
        assert!(!health.working);
        assert_eq!(health.failures, 3);
    }

    #[tokio::test]
    async fn test_auth_error_disables_immediately() {
        let denied = MockService::failing(ServiceId::OpenAi, ErrorCategory::Auth);
        let calls = Arc::clone(&denied.calls);
        let mut enhancer = Enhancer::new().add_service(denied);

        enhancer.enhance(&raw(), &barcode()).await;
        enhancer.enhance(&raw(), &barcode()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!enhancer.health_snapshot()[0].working);
    }

    #[tokio::test]
    async fn test_quota_error_disables_immediately() {
        let broke = MockService::failing(ServiceId::DeepSeek, ErrorCategory::Quota);
        let mut enhancer = Enhancer::new().add_service(broke);

        enhancer.enhance(&raw(), &barcode()).await;
        assert!(!enhancer.health_snapshot()[0].working);
    }

    #[tokio::test]
    async fn test_rate_limit_counts_but_does_not_disable() {
        let limited = MockService::failing(ServiceId::Gemini, ErrorCategory::RateLimit);
        let mut enhancer = Enhancer::new().add_service(limited);

        enhancer.enhance(&raw(), &barcode()).await;
        let health = &enhancer.health_snapshot()[0];
        assert!(health.working);
        assert_eq!(health.failures, 1);
    }

    #[tokio::test]
    async fn test_all_disabled_skips_network_entirely() {
        let denied = MockService::failing(ServiceId::Gemini, ErrorCategory::Auth);
        let calls = Arc::clone(&denied.calls);
        let mut enhancer = Enhancer::new().add_service(denied);

        enhancer.enhance(&raw(), &barcode()).await; // disables the service
        enhancer.enhance(&raw(), &barcode()).await; // straight to heuristic

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparseable_response_falls_back_to_heuristic() {
        let mut enhancer = Enhancer::new()
            .add_service(MockService::replying(ServiceId::Gemini, "not json at all"))
            .add_service(MockService::replying(ServiceId::OpenAi, GOOD_JSON));

        let record = enhancer.enhance(&raw(), &barcode()).await;
        // the first response short-circuits the chain even when it cannot
        // be parsed; the heuristic formatter takes over
        assert!(record.data_source.starts_with("Intelligent Processing"));
    }

    #[tokio::test]
    async fn test_missing_product_name_rejected() {
        let mut enhancer = Enhancer::new().add_service(MockService::replying(
            ServiceId::Gemini,
            r#"{"Brand": "Lux"}"#,
        ));

        let record = enhancer.enhance(&raw(), &barcode()).await;
        assert!(record.data_source.starts_with("Intelligent Processing"));
        // heuristic output still carries the provider name
        assert_eq!(record.product_name, "Lux Soap");
    }

    #[tokio::test]
    async fn test_empty_enhancer_uses_heuristic() {
        let mut enhancer = Enhancer::new();
        let record = enhancer.enhance(&raw(), &barcode()).await;
        assert!(record.data_source.starts_with("Intelligent Processing"));
    }

    #[tokio::test]
    async fn test_success_resets_failure_counter() {
        // fail twice, then flip the slot to success by rebuilding
        let mut enhancer = Enhancer::new().add_service(MockService::failing(
            ServiceId::Gemini,
            ErrorCategory::Transient,
        ));
        enhancer.enhance(&raw(), &barcode()).await;
        enhancer.enhance(&raw(), &barcode()).await;
        assert_eq!(enhancer.health_snapshot()[0].failures, 2);

        enhancer.services[0].service = Box::new(MockService::replying(ServiceId::Gemini, GOOD_JSON));
        enhancer.enhance(&raw(), &barcode()).await;
        assert_eq!(enhancer.health_snapshot()[0].failures, 0);
    }
}
