//! Gemini `generateContent` client used for classification and extraction.

use crate::error::{map_send_error, LlmError, LlmResult};
use crate::types::{ErrorResponse, GeminiRequest, GeminiResponse};
use docflow_config::GeminiConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the hosted Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a client from configuration and an already-resolved API key.
    pub fn from_config(config: &GeminiConfig, api_key: impl Into<String>) -> LlmResult<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one prompt and return the reply text.
    pub async fn generate_content(&self, prompt: &str) -> LlmResult<String> {
        debug!("Gemini request to {} ({} chars)", self.model, prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GeminiRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.message())
                .unwrap_or(text);

            if status.as_u16() == 404 {
                return Err(LlmError::ModelNotFound {
                    model: self.model.clone(),
                });
            }
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: GeminiResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;

        parsed.text().ok_or(LlmError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn client_for(server: &MockServer) -> GeminiClient {
        let config = GeminiConfig {
            base_url: server.base_url(),
            ..GeminiConfig::default()
        };
        GeminiClient::from_config(&config, "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_generate_content_sends_key_and_prompt() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-2.5-flash:generateContent")
                    .header("x-goog-api-key", "test-key")
                    .body_contains("Dokumento tekstas");
                then.status(200).json_body(json!({
                    "candidates": [{ "content": { "parts": [{ "text": " invoice\n" }] } }]
                }));
            })
            .await;

        let reply = client_for(&server)
            .generate_content("Dokumento tekstas: ...")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(reply, " invoice\n");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(403).json_body(json!({
                    "error": { "code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED" }
                }));
            })
            .await;

        let error = client_for(&server).generate_content("x").await.unwrap_err();
        assert!(
            matches!(error, LlmError::ApiError { status: 403, ref message } if message == "API key not valid")
        );
    }

    #[tokio::test]
    async fn test_reply_without_text_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .json_body(json!({ "candidates": [{ "finishReason": "SAFETY" }] }));
            })
            .await;

        let error = client_for(&server).generate_content("x").await.unwrap_err();
        assert!(matches!(error, LlmError::EmptyResponse));
    }
}
