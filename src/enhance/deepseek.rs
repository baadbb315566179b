//! DeepSeek Service
//!
//! Last-priority AI enhancement service, speaking the chat completions
//! protocol. Balance exhaustion arrives as HTTP 402 and disables the
//! service for the rest of the run.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::chat::{ChatCompletionRequest, ChatCompletionResponse};
use super::{AiService, ServiceId};
use crate::constants::{endpoints, limits, models};
use crate::types::{ErrorCategory, ErrorClassifier, ServiceError};

pub struct DeepSeekService {
    api_key: SecretString,
    client: reqwest::Client,
}

impl std::fmt::Debug for DeepSeekService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekService")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl DeepSeekService {
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
impl AiService for DeepSeekService {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let service = self.id().to_string();
        debug!("sending enhancement request to DeepSeek");

        let request = ChatCompletionRequest::for_prompt(models::DEEPSEEK_MODEL, prompt);

        let response = self
            .client
            .post(endpoints::DEEPSEEK_API_URL)
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
        ServiceId::DeepSeek
    }
}
