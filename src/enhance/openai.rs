//! OpenAI Service
//!
//! Second-priority AI enhancement service, speaking the chat completions
//! protocol. Quota exhaustion arrives as a 429 whose body carries
//! `insufficient_quota`; the classifier turns that into a run-permanent
//! disable.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::chat::{ChatCompletionRequest, ChatCompletionResponse};
use super::{AiService, ServiceId};
use crate::constants::{endpoints, limits, models};
use crate::types::{ErrorCategory, ErrorClassifier, ServiceError};

pub struct OpenAiService {
    api_key: SecretString,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiService")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiService {
    pub fn new(api_key: String) -> crate::types::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(limits::AI_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            client,
        })
    }
}

#[async_trait]
impl AiService for OpenAiService {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let service = self.id().to_string();
        debug!("sending enhancement request to OpenAI");

        let request = ChatCompletionRequest::for_prompt(models::OPENAI_MODEL, prompt);

        let response = self
            .client
            .post(endpoints::OPENAI_API_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_request_error(&e, &service))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &body,
                &service,
            ));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            ServiceError::with_service(ErrorCategory::ParseError, e.to_string(), &service)
        })?;

        body.first_content().ok_or_else(|| {
            ServiceError::with_service(ErrorCategory::ParseError, "no content in response", &service)
        })
    }

    fn id(&self) -> ServiceId {
        ServiceId::OpenAi
    }
}
