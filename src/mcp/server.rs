//! MCP server implementation using pmcp (Pragmatic AI's rust-mcp-sdk).
//!
//! This module provides the MCP server implementation using the pmcp crate
//! for proper JSON-RPC handling over stdio and HTTP/SSE.

use crate::config::Config;
use crate::mcp::prompts::{Prompt, PromptRegistry, PromptRole};
use crate::mcp::tools::{ToolContext, ToolRegistry};
use async_trait::async_trait;
use pmcp::types::PromptInfo;
use pmcp::{
    server::streamable_http_server::StreamableHttpServer, Error, GetPromptResult, PromptHandler,
    RequestHandlerExtra, Server, ServerCapabilities, ToolHandler, ToolInfo,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// The MCP server for the goal log
///
/// This server provides dataset and LLM analysis tools plus prompt
/// templates over various transports.
#[derive(Debug, Clone)]
pub struct McpServer {
    server: Arc<Mutex<Server>>,
}

impl McpServer {
    /// Create a new MCP server from configuration
    pub fn new(config: Config) -> Result<Self, pmcp::Error> {
        let name = config.server.name.clone();
        let prompts = PromptRegistry::new(config.dataset.player_name.clone());
        let ctx = ToolContext::new(config)
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {}", e)))?;
        let tools = ToolRegistry::from_context(Arc::new(ctx));

        let server = Self::build_server_impl(&name, tools, prompts)?;
        Ok(Self {
            server: Arc::new(Mutex::new(server)),
        })
    }

    /// Build the MCP server with tool and prompt handlers (internal implementation)
    fn build_server_impl(
        name: &str,
        tools: ToolRegistry,
        prompts: PromptRegistry,
    ) -> Result<Server, pmcp::Error> {
        let mut builder = Server::builder()
            .name(name)
            .version(env!("CARGO_PKG_VERSION"))
            .capabilities(ServerCapabilities::default());

        for tool in tools.all() {
            let tool_handler = ToolWrapper {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                input_schema: tool.input_schema.clone(),
                handler: tool.handler.clone(),
            };
            builder = builder.tool(tool_handler.name.clone(), tool_handler);
        }

        let prompts = Arc::new(prompts);
        for prompt in prompts.all() {
            let prompt_handler = PromptWrapper {
                name: prompt.name,
                registry: prompts.clone(),
            };
            builder = builder.prompt(prompt.name, prompt_handler);
        }

        builder.build()
    }

    /// Run the server in stdio mode (for Claude Desktop and other MCP clients)
    pub async fn run(self) -> Result<(), pmcp::Error> {
        tracing::info!("Starting MCP server in stdio mode");

        // run_stdio() takes ownership of the Server
        let server = Arc::try_unwrap(self.server)
            .map_err(|_| Error::internal("Cannot unwrap Arc - multiple references exist"))?
            .into_inner();

        tracing::info!("MCP server initialized");

        server.run_stdio().await
    }

    /// Run the server in HTTP/SSE mode
    ///
    /// This starts an HTTP server that uses Server-Sent Events (SSE) for real-time
    /// communication with MCP clients.
    pub async fn run_http(&self, addr: &str) -> Result<(SocketAddr, JoinHandle<()>), pmcp::Error> {
        tracing::info!("Starting MCP server in HTTP/SSE mode on {}", addr);

        let socket_addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::invalid_params(format!("Invalid address: {}", e)))?;

        let http_server = StreamableHttpServer::new(socket_addr, self.server.clone());
        http_server.start().await
    }
}

/// Wrapper for adapting our Tool to pmcp's ToolHandler
#[derive(Clone)]
struct ToolWrapper {
    name: String,
    description: Option<String>,
    input_schema: Value,
    handler: Arc<dyn crate::mcp::tools::ToolHandler>,
}

#[async_trait]
impl ToolHandler for ToolWrapper {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> Result<Value, Error> {
        self.handler
            .execute(args)
            .await
            .map_err(|e| Error::internal(&e))
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        ))
    }
}

/// Wrapper for adapting a prompt template to pmcp's PromptHandler
#[derive(Clone)]
struct PromptWrapper {
    name: &'static str,
    registry: Arc<PromptRegistry>,
}

#[async_trait]
impl PromptHandler for PromptWrapper {
    async fn handle(
        &self,
        args: HashMap<String, String>,
        _extra: RequestHandlerExtra,
    ) -> Result<GetPromptResult, Error> {
        let messages = self
            .registry
            .render(self.name, &args)
            .map_err(|e| Error::invalid_params(e.to_string()))?;
        let description = self.registry.get(self.name).map(|p| p.description);

        serde_json::from_value(prompt_result_json(description, &messages))
            .map_err(|e| Error::internal(format!("Invalid prompt result: {}", e)))
    }

    fn metadata(&self) -> Option<PromptInfo> {
        let prompt = self.registry.get(self.name)?;
        serde_json::from_value(prompt_info_json(prompt)).ok()
    }
}

/// MCP wire form of a rendered prompt.
///
/// MCP prompt messages only carry `user` and `assistant` roles, so system
/// briefs are sent as the leading user message.
fn prompt_result_json(
    description: Option<&str>,
    messages: &[crate::mcp::prompts::PromptMessage],
) -> Value {
    let messages: Vec<Value> = messages
        .iter()
        .map(|m| {
            let role = match m.role {
                PromptRole::Assistant => "assistant",
                PromptRole::System | PromptRole::User => "user",
            };
            json!({
                "role": role,
                "content": {"type": "text", "text": &m.text}
            })
        })
        .collect();

    json!({
        "description": description,
        "messages": messages,
    })
}

/// MCP wire form of a prompt's metadata
fn prompt_info_json(prompt: &Prompt) -> Value {
    let arguments: Vec<Value> = prompt
        .arguments
        .iter()
        .map(|a| {
            json!({
                "name": a.name,
                "description": a.description,
                "required": a.required,
            })
        })
        .collect();

    json!({
        "name": prompt.name,
        "description": prompt.description,
        "arguments": arguments,
    })
}
