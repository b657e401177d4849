//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::dataset::{Dataset, DatasetError};
use crate::llm::{AnthropicClient, LlmClient, LlmError, OpenAiClient};
use crate::utils::{HttpClient, InteractionLog};

use super::handlers::{
    AnalyzeDataHandler, GoalsByMinuteRangeHandler, SayHelloHandler, SummarizeDatasetHandler,
};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "goals_by_minute_range")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Hosted model provider behind an LLM tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
}

/// Shared state handed to every tool handler
#[derive(Debug)]
pub struct ToolContext {
    config: Config,
    http: HttpClient,
}

impl ToolContext {
    /// Build the context, creating the shared HTTP client
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = HttpClient::with_timeout(config.server.request_timeout())?;
        Ok(Self { config, http })
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load a fresh copy of the goal log
    pub fn load_dataset(&self) -> Result<Dataset, DatasetError> {
        Dataset::from_path(&self.config.dataset.path)
    }

    /// Create a client for the given provider and model
    pub fn llm_client(
        &self,
        provider: LlmProvider,
        model: &str,
    ) -> Result<Arc<dyn LlmClient>, LlmError> {
        let models = &self.config.models;
        let keys = &self.config.api_keys;

        let client: Arc<dyn LlmClient> = match provider {
            LlmProvider::OpenAi => {
                let mut client = OpenAiClient::from_key(self.http.clone(), keys.openai(), model)?;
                if let Some(ref base_url) = models.openai_base_url {
                    client = client.with_base_url(base_url.as_str());
                }
                Arc::new(client)
            }
            LlmProvider::Anthropic => {
                let mut client =
                    AnthropicClient::from_key(self.http.clone(), keys.anthropic(), model)?;
                if let Some(ref base_url) = models.anthropic_base_url {
                    client = client.with_base_url(base_url.as_str());
                }
                Arc::new(client)
            }
        };
        Ok(client)
    }

    /// Interaction log, if enabled
    pub fn interaction_log(&self) -> Option<InteractionLog> {
        let logging = &self.config.logging;
        logging
            .interactions_enabled
            .then(|| InteractionLog::new(logging.interactions_file.clone()))
    }
}

/// Wraps a handler so every call lands in the interaction log
#[derive(Debug)]
struct LoggedHandler {
    name: String,
    inner: Arc<dyn ToolHandler>,
    log: InteractionLog,
}

#[async_trait::async_trait]
impl ToolHandler for LoggedHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let result = self.inner.execute(args.clone()).await;
        match &result {
            Ok(output) => self.log.record(&self.name, &args, output.clone(), None),
            Err(e) => self.log.record(&self.name, &args, Value::Null, Some(e.clone())),
        }
        result
    }
}

/// Registry for all MCP tools
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
    log: Option<InteractionLog>,
}

impl ToolRegistry {
    /// Create a registry holding every goal-log tool
    pub fn from_context(ctx: Arc<ToolContext>) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            log: ctx.interaction_log(),
        };
        registry.register_goal_tools(&ctx);
        registry
    }

    fn register_goal_tools(&mut self, ctx: &Arc<ToolContext>) {
        let player = ctx.config().dataset.player_name.clone();

        let analysis_schema = serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Natural-language question about the goal log"
                },
                "category": {
                    "type": "string",
                    "description": "Only use goals whose competition contains this text (e.g., 'LaLiga', 'Champions League')"
                }
            },
            "required": ["query"]
        });
        let no_args = serde_json::json!({
            "type": "object",
            "properties": {}
        });

        self.register(Tool {
            name: "summarize_dataset".to_string(),
            description: "Summarize the goal log: number of rows, columns, column names, and first rows.".to_string(),
            input_schema: no_args.clone(),
            handler: Arc::new(SummarizeDatasetHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "goals_by_minute_range".to_string(),
            description: format!(
                "Count {}'s goals in different minute ranges (0-15, 16-30, ..., 76+).",
                player
            ),
            input_schema: no_args.clone(),
            handler: Arc::new(GoalsByMinuteRangeHandler { ctx: ctx.clone() }),
        });

        self.register(Tool {
            name: "analyze_data_with_claude".to_string(),
            description: format!(
                "Use Claude to analyze {}'s goal data based on a natural language query. Optional category filters by competition.",
                player
            ),
            input_schema: analysis_schema.clone(),
            handler: Arc::new(AnalyzeDataHandler {
                ctx: ctx.clone(),
                provider: LlmProvider::Anthropic,
            }),
        });

        self.register(Tool {
            name: "analyze_data_with_gpt".to_string(),
            description: format!(
                "Use GPT to analyze {}'s goal data based on a natural language query. Optional category filters by competition.",
                player
            ),
            input_schema: analysis_schema,
            handler: Arc::new(AnalyzeDataHandler {
                ctx: ctx.clone(),
                provider: LlmProvider::OpenAi,
            }),
        });

        self.register(Tool {
            name: "say_hello".to_string(),
            description: "Test the OpenAI connection with a simple hello.".to_string(),
            input_schema: no_args,
            handler: Arc::new(SayHelloHandler { ctx: ctx.clone() }),
        });
    }

    /// Register a tool, routing its calls through the interaction log if enabled
    pub fn register(&mut self, mut tool: Tool) {
        if let Some(ref log) = self.log {
            tool.handler = Arc::new(LoggedHandler {
                name: tool.name.clone(),
                inner: tool.handler,
                log: log.clone(),
            });
        }
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools, sorted by name
    pub fn all(&self) -> Vec<&Tool> {
        let mut tools: Vec<&Tool> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}
