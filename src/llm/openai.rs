//! OpenAI Chat Completions client.

use async_trait::async_trait;
use serde::Deserialize;

use super::{CompletionRequest, LlmClient, LlmError};
use crate::utils::HttpClient;

/// Public OpenAI API endpoint
pub const OPENAI_API_BASE: &str = "https://api.openai.com";

const PROVIDER: &str = "OpenAI";

/// OpenAI API client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for the given model
    pub fn new(http: HttpClient, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_API_BASE.to_string(),
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
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        messages.push(serde_json::json!({"role": "user", "content": &request.prompt}));

        serde_json::json!({
            "model": &self.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
        })
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        tracing::debug!("OpenAI request to {} (model {})", url, self.model);

        let response = self
            .http
            .client()
            .post(&url)
            .bearer_auth(&self.api_key)
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

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse(PROVIDER))
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
