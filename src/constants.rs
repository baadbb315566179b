//! Global Constants
//!
//! Centralized constants for endpoints, model selection, and tuning.
//! All magic numbers should be defined here with documentation.

/// External service endpoints
pub mod endpoints {
    /// Nutrition database product lookup; the barcode plus ".json" is appended
    pub const OPENFOODFACTS_BASE_URL: &str = "https://world.openfoodfacts.org/api/v0/product/";

    /// Google Custom Search API
    pub const GOOGLE_SEARCH_API_URL: &str = "https://www.googleapis.com/customsearch/v1";

    /// DigitEyes barcode lookup API
    pub const DIGITEYES_API_URL: &str = "https://www.digiteyes.net/barcode/search.php";

    /// Gemini generateContent endpoint
    pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent";

    /// OpenAI chat completions endpoint
    pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

    /// DeepSeek chat completions endpoint
    pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
}

/// Retry, pacing, and service-health tuning
pub mod limits {
    /// Default pacing delay between external requests (seconds)
    pub const DEFAULT_REQUEST_DELAY_SECS: f64 = 1.0;

    /// Default maximum retries for rate-limited lookup calls
    pub const DEFAULT_MAX_RETRIES: u32 = 5;

    /// Linear backoff step for HTTP 429: wait `(attempt + 1) * step` seconds
    pub const RATE_LIMIT_BACKOFF_STEP_SECS: u64 = 5;

    /// Delay before retrying a failed web-search network call (seconds)
    pub const NETWORK_RETRY_DELAY_SECS: u64 = 1;

    /// Consecutive failures before an AI service is disabled for the run
    pub const AI_FAILURE_THRESHOLD: u32 = 3;

    /// Request timeout for barcode lookup providers (seconds)
    pub const LOOKUP_TIMEOUT_SECS: u64 = 10;

    /// Request timeout for web search (seconds)
    pub const SEARCH_TIMEOUT_SECS: u64 = 15;

    /// Request timeout for AI services (seconds)
    pub const AI_TIMEOUT_SECS: u64 = 30;

    /// Results requested per web search call
    pub const SEARCH_RESULT_COUNT: u32 = 10;

    /// Search results actually inspected per call
    pub const SEARCH_TOP_RESULTS: usize = 5;
}

/// AI model selection and generation parameters
pub mod models {
    pub const GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
    pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
    pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

    /// Low temperature keeps the JSON output deterministic
    pub const AI_TEMPERATURE: f32 = 0.3;
    pub const AI_MAX_TOKENS: u32 = 1000;
}
