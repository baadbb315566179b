//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for retry, fallback, and service-disable
//! decisions.
//!
//! ## Error Categories
//!
//! - **RateLimit**: API rate limiting (wait and retry; counts as a failure)
//! - **Auth**: Authentication failures (disable the service for the run)
//! - **Quota**: Balance/quota exhaustion (disable the service for the run)
//! - **Network**: Connectivity issues (retryable for web search only)
//! - **Transient**: Temporary server issues
//!
//! ## Design Principles
//!
//! - Single unified error type (ShelfError) for the entire application
//! - Category-based routing for retry and disable decisions
//! - No panic/unwrap - all errors are recoverable at the per-barcode boundary

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Unified error categories for retry and service-disable routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited - wait then retry; increments the failure counter
    RateLimit,
    /// Authentication failed - disable the service for the rest of the run
    Auth,
    /// Quota or balance exhausted - disable the service for the rest of the run
    Quota,
    /// Network/connectivity issues
    Network,
    /// Endpoint unavailable
    Unavailable,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Parsing a service response failed
    ParseError,
    /// Temporary server issues - may resolve on retry
    Transient,
    /// Unknown error - conservative handling
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Quota => write!(f, "QUOTA"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl ErrorCategory {
    /// Check if this category permanently disables an AI service for the run
    pub fn disables_service(&self) -> bool {
        matches!(self, Self::Auth | Self::Quota)
    }

    /// Check if this category is retryable on the same endpoint
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Transient)
    }
}

// =============================================================================
// Service Error
// =============================================================================

/// Error from an external service call with category and context
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Service that produced the error
    pub service: Option<String>,
    /// Suggested wait time before retry (if applicable)
    pub retry_after: Option<Duration>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(service) = &self.service {
            write!(f, "[{}:{}] {}", service, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    /// Create a new service error
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            service: None,
            retry_after: None,
        }
    }

    /// Create error with service context
    pub fn with_service(
        category: ErrorCategory,
        message: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            service: Some(service.into()),
            retry_after: None,
        }
    }

    /// Add suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    /// Check if this error permanently disables the service
    pub fn disables_service(&self) -> bool {
        self.category.disables_service()
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        self.category.is_retryable()
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Classifies external service failures into routable categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code with its response body
    ///
    /// Quota exhaustion hides behind 429 on some services; the body is
    /// checked for the quota marker before treating 429 as a plain rate
    /// limit.
    pub fn classify_http_status(status: u16, body: &str, service: &str) -> ServiceError {
        let message = format!("HTTP {}: {}", status, truncate(body, 200));
        match status {
            429 if body.contains("insufficient_quota") => {
                ServiceError::with_service(ErrorCategory::Quota, message, service)
            }
            429 => ServiceError::with_service(ErrorCategory::RateLimit, message, service),
            401 | 403 => ServiceError::with_service(ErrorCategory::Auth, message, service),
            402 => ServiceError::with_service(ErrorCategory::Quota, message, service),
            400 => ServiceError::with_service(ErrorCategory::BadRequest, message, service),
            404 => ServiceError::with_service(ErrorCategory::Unavailable, message, service),
            500 | 502 | 503 | 504 => {
                ServiceError::with_service(ErrorCategory::Transient, message, service)
                    .retry_after(Duration::from_secs(5))
            }
            _ => ServiceError::with_service(ErrorCategory::Unknown, message, service),
        }
    }

    /// Classify a transport-level request failure
    pub fn classify_request_error(err: &reqwest::Error, service: &str) -> ServiceError {
        if err.is_timeout() || err.is_connect() {
            ServiceError::with_service(ErrorCategory::Network, err.to_string(), service)
        } else if err.is_decode() {
            ServiceError::with_service(ErrorCategory::ParseError, err.to_string(), service)
        } else {
            ServiceError::with_service(ErrorCategory::Unknown, err.to_string(), service)
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ShelfError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// Structured external-service error with category and retry hints
    #[error("Service error: {0}")]
    Service(ServiceError),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<ServiceError> for ShelfError {
    fn from(err: ServiceError) -> Self {
        ShelfError::Service(err)
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;

// =============================================================================
// Tests
// =============================================================================
