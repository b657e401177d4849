//! Anthropic Messages API client.

use async_trait::async_trait;
use serde::Deserialize;

use super::{CompletionRequest, LlmClient, LlmError};
use crate::utils::HttpClient;

/// Public Anthropic API endpoint
pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";

/// API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "Anthropic";

/// Anthropic Claude API client
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicClient {
    /// Create a client for the given model
    pub fn new(http: HttpClient, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: ANTHROPIC_API_BASE.to_string(),
        }
    }

    /// Create a client, failing if no API key is configured
    pub fn from_key(
        http: HttpClient,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.ok_or(LlmError::MissingApiKey(PROVIDER))?;
        Ok(Self::new(http, api_key, model))
    }

    /// Point the client at a different API host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": &self.model,
            "max_tokens": request.max_tokens,
            "messages": [{"role": "user", "content": &request.prompt}],
        });
        if let Some(ref system) = request.system {
            body["system"] = serde_json::Value::from(system.as_str());
        }
        body
    }
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        tracing::debug!("Anthropic request to {} (model {})", url, self.model);

        let response = self
            .http
            .client()
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.request_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let body: MessagesResponse = response.json().await?;
        body.content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(LlmError::EmptyResponse(PROVIDER))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
