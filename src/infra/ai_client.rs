//! Client for an OpenAI-compatible chat completions endpoint.
//!
//! Requests run in JSON response mode and the returned message content
//! is parsed and handed back untouched.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::{AiSettings, AI_TEMPERATURE};
use crate::errors::{AppError, AppResult};

#[cfg(test)]
use mockall::automock;

/// LLM completion seam used by the services.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Send a system + user prompt and return the JSON object the model produced
    async fn complete(&self, system: &str, prompt: &str) -> AppResult<Value>;
}

/// reqwest-backed client with a fixed request timeout
pub struct OpenAiClient {
    http: Client,
    settings: AiSettings,
}

impl OpenAiClient {
    pub fn new(settings: AiSettings) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build AI HTTP client: {}", e)))?;

        if settings.api_key().is_none() {
            tracing::warn!("AI_API_KEY not set, AI features will be unavailable");
        }

        Ok(Self { http, settings })
    }
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> AppResult<Value> {
        let api_key = self
            .settings
            .api_key()
            .ok_or_else(|| AppError::upstream("AI service is not configured"))?;

        let body = json!({
            "model": self.settings.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt}
            ],
            "temperature": AI_TEMPERATURE,
            "response_format": {"type": "json_object"}
        });

        let started = std::time::Instant::now();
        let response = self
            .http
            .post(&self.settings.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!("AI service returned {}: {}", status, detail)));
        }

        let payload: Value = response.json().await?;
        tracing::debug!(
            model = %self.settings.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "AI completion received"
        );

        extract_content(&payload)
    }
}

/// Pull `choices[0].message.content` out of a completion and parse it as JSON.
fn extract_content(payload: &Value) -> AppResult<Value> {
    let content = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::upstream("Invalid AI response format"))?;

    serde_json::from_str(content)
        .map_err(|e| AppError::upstream(format!("AI response is not valid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content_parses_message_json() {
        let payload = json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"summary\":\"ok\"}"}}]
        });
        assert_eq!(extract_content(&payload).unwrap(), json!({"summary": "ok"}));
    }

    #[test]
    fn test_extract_content_rejects_bad_shapes() {
        assert!(matches!(extract_content(&json!({})), Err(AppError::Upstream(_))));

        let not_json = json!({"choices": [{"message": {"content": "plain text"}}]});
        assert!(matches!(extract_content(&not_json), Err(AppError::Upstream(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_upstream() {
        let client = OpenAiClient::new(AiSettings::new("http://127.0.0.1:9", None, "m")).unwrap();
        let err = client.complete("s", "p").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
