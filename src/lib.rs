//! Shelfwise - Barcode Product Enrichment Pipeline
//!
//! Enriches product barcodes into structured product records by querying
//! external data providers in a fixed fallback order, then structuring the
//! result through a text-generation service (with tolerant JSON repair) or
//! deterministic local heuristics.
//!
//! ## Pipeline
//!
//! 1. **Validate**: digits-only, EAN/UPC family lengths
//! 2. **Look up**: nutrition database → web search → barcode lookup API,
//!    first named record wins
//! 3. **Enhance**: priority-ordered AI services with per-service health
//!    tracking, falling back to heuristic formatting
//! 4. **Collect**: sequential batch driver with request pacing
//!
//! ## Quick Start
//!
//! ```ignore
//! use shelfwise::{ConfigLoader, Processor};
//!
//! let config = ConfigLoader::load()?;
//! let mut processor = Processor::from_config(&config)?;
//! let records = processor.process_batch(&barcodes).await;
//! ```
//!
//! ## Modules
//!
//! - [`lookup`]: provider fallback chain and the individual data sources
//! - [`enhance`]: AI dispatcher, service clients, and JSON repair
//! - [`heuristic`]: keyword/regex-driven local formatter
//! - [`pipeline`]: sequential batch driver and session statistics
//! - [`config`]: environment-sourced configuration
//! - [`types`]: barcode validation, records, unified errors

pub mod config;
pub mod constants;
pub mod enhance;
pub mod heuristic;
pub mod lookup;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, ErrorClassifier, Result, ServiceError, ShelfError};

// Domain Types
pub use types::{Barcode, EnrichedProduct, RawProduct};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{ProcessingStats, Processor};

// =============================================================================
// Stage Re-exports
// =============================================================================

pub use enhance::{
    AiService, DeepSeekService, Enhancer, GeminiService, HealthSnapshot, OpenAiService,
    ServiceHealth, ServiceId, extract_object,
};
pub use heuristic::format_product;
pub use lookup::{
    DigitEyesSource, OpenFoodFactsSource, ProductSource, SourceChain, WebSearchSource,
};
