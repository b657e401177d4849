//! Clients for hosted LLM APIs used to summarize the goal log.
//!
//! Both clients implement [`LlmClient`], so tool handlers can forward a
//! question to either provider without caring which one answers.

mod anthropic;
mod openai;

pub use anthropic::{AnthropicClient, ANTHROPIC_API_BASE, ANTHROPIC_VERSION};
pub use openai::{OpenAiClient, OPENAI_API_BASE};

use async_trait::async_trait;

use crate::dataset::{AnalysisStats, DatasetError};

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Optional system instruction
    pub system: Option<String>,
    /// User message
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with no system message
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens,
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Interface shared by the hosted model providers
#[async_trait]
pub trait LlmClient: Send + Sync + std::fmt::Debug {
    /// Send a request and return the first text reply
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Model identifier sent to the provider
    fn model_name(&self) -> &str;

    /// Human-readable provider name
    fn provider_name(&self) -> &str;
}

/// Errors returned by LLM clients
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured for the provider
    #[error("{0} API key not configured")]
    MissingApiKey(&'static str),

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the provider
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    /// The provider answered without any text
    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Parse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Parse(format!("JSON: {}", err))
    }
}

/// Errors from the analyze-with-LLM flow
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Build the analysis prompt sent to either provider.
///
/// `sample` is the leading slice of the (optionally filtered) dataset.
pub fn build_analysis_prompt(
    player: &str,
    stats: &AnalysisStats,
    sample: &[serde_json::Map<String, serde_json::Value>],
    query: &str,
) -> Result<String, serde_json::Error> {
    let stats_json = serde_json::to_string_pretty(stats)?;
    let sample_json = serde_json::to_string_pretty(sample)?;

    Ok(format!(
        "You are a football analyst specializing in {player}'s career statistics.\n\
         \n\
         Here is some summary information about the dataset:\n\
         {stats_json}\n\
         \n\
         And here is a sample of the data (first {count} rows):\n\
         {sample_json}\n\
         \n\
         User query: {query}\n\
         \n\
         Provide a concise, insightful analysis that answers the query specifically.\n\
         Include relevant statistics and patterns you observe in the data.\n\
         Format your response in markdown.\n",
        count = sample.len(),
    ))
}
