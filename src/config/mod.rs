//! Configuration management.
//!
//! Settings come from an optional TOML file layered with environment
//! variables prefixed `GOAL_ANALYTICS__` (nested keys separated by `__`,
//! e.g. `GOAL_ANALYTICS__DATASET__PATH=./goals.csv`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [dataset]
//! path = "liomessidata.csv"
//! player_name = "Lionel Messi"
//! head_rows = 5
//! sample_rows = 50
//!
//! [api_keys]
//! openai = "sk-..."
//! anthropic = "sk-ant-..."
//!
//! [models]
//! openai = "gpt-4-turbo"
//! anthropic = "claude-3-opus-20240229"
//! hello = "gpt-4o-mini"
//! max_tokens = 1000
//! # openai_base_url = "https://gateway.example.com"
//!
//! [server]
//! name = "Data Analysis Workspace"
//! request_timeout_secs = 60
//!
//! [logging]
//! interactions_enabled = true
//! interactions_file = "mcp_interactions.log.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::{DEFAULT_LOG_FILE, DEFAULT_TIMEOUT_SECS};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "GOAL_ANALYTICS";

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "goal-analytics.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Goal log location and presentation
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// API keys for LLM providers
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Model selection for LLM tools
    #[serde(default)]
    pub models: ModelConfig,

    /// MCP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Interaction logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// CSV file with one goal per row
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Player the goal log belongs to, used in prompts and tool descriptions
    #[serde(default = "default_player_name")]
    pub player_name: String,

    /// Rows shown by the dataset summary
    #[serde(default = "default_head_rows")]
    pub head_rows: usize,

    /// Rows included as context in LLM analysis prompts
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            player_name: default_player_name(),
            head_rows: default_head_rows(),
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("liomessidata.csv")
}

fn default_player_name() -> String {
    "Lionel Messi".to_string()
}

fn default_head_rows() -> usize {
    5
}

fn default_sample_rows() -> usize {
    50
}

/// API keys for LLM providers.
///
/// Unset keys fall back to `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub openai: Option<String>,

    #[serde(default)]
    pub anthropic: Option<String>,
}

impl ApiKeys {
    /// OpenAI key from config or environment
    pub fn openai(&self) -> Option<String> {
        self.openai
            .clone()
            .or_else(|| non_empty_env("OPENAI_API_KEY"))
    }

    /// Anthropic key from config or environment
    pub fn anthropic(&self) -> Option<String> {
        self.anthropic
            .clone()
            .or_else(|| non_empty_env("ANTHROPIC_API_KEY"))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Model selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model used by `analyze_data_with_gpt`
    #[serde(default = "default_openai_model")]
    pub openai: String,

    /// Model used by `analyze_data_with_claude`
    #[serde(default = "default_anthropic_model")]
    pub anthropic: String,

    /// Model used by the `say_hello` connectivity check
    #[serde(default = "default_hello_model")]
    pub hello: String,

    /// Token limit for analysis replies
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Alternate OpenAI API host (proxies, gateways)
    #[serde(default)]
    pub openai_base_url: Option<String>,

    /// Alternate Anthropic API host
    #[serde(default)]
    pub anthropic_base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            openai: default_openai_model(),
            anthropic: default_anthropic_model(),
            hello: default_hello_model(),
            max_tokens: default_max_tokens(),
            openai_base_url: None,
            anthropic_base_url: None,
        }
    }
}

fn default_openai_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-opus-20240229".to_string()
}

fn default_hello_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported during MCP initialization
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Timeout for outbound HTTP requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// Request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_server_name() -> String {
    "Data Analysis Workspace".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Interaction log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Append every tool call to the interaction log
    #[serde(default = "default_true")]
    pub interactions_enabled: bool,

    /// JSON-lines file receiving tool calls
    #[serde(default = "default_interactions_file")]
    pub interactions_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            interactions_enabled: true,
            interactions_file: default_interactions_file(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interactions_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

impl Config {
    /// Write configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(environment_source())
        .build()?;

    settings.try_deserialize()
}

/// Get the configuration from environment variables and defaults only
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(environment_source())
        .build()?
        .try_deserialize()
}

fn environment_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

/// Default location of the per-user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("goal-analytics").join("config.toml"))
}

/// Find a configuration file in the working directory or the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    user_config_path().filter(|path| path.is_file())
}
