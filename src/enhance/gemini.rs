//! Gemini Service
//!
//! Primary AI enhancement service. The API key travels as a query
//! parameter; the response nests generated text under
//! `candidates[0].content.parts[0].text`.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AiService, ServiceId};
use crate::constants::{endpoints, limits, models};
use crate::types::{ErrorCategory, ErrorClassifier, ServiceError};

pub struct GeminiService {
    api_key: SecretString,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiService")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiService {
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
impl AiService for GeminiService {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let service = self.id().to_string();
        debug!("sending enhancement request to Gemini");

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: models::AI_TEMPERATURE,
                max_output_tokens: models::AI_MAX_TOKENS,
            },
        };

        let response = self
            .client
            .post(endpoints::GEMINI_API_URL)
            .query(&[("key", self.api_key.expose_secret())])
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

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            ServiceError::with_service(ErrorCategory::ParseError, e.to_string(), &service)
        })?;

        body.first_text().ok_or_else(|| {
            ServiceError::with_service(
                ErrorCategory::ParseError,
                "unexpected response format",
                &service,
            )
        })
    }

    fn id(&self) -> ServiceId {
        ServiceId::Gemini
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 1000,
            },
        };

        let rendered = serde_json::to_value(&request).unwrap();
        assert_eq!(rendered["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(rendered["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_first_text_extraction() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\": 1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_text().as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_empty_candidates() {
        let body: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(body.first_text().is_none());
    }
}
