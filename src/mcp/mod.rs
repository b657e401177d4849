//! MCP (Model Context Protocol) implementation.

mod handlers;
pub mod prompts;
pub mod server;
mod tools;

pub use prompts::{Prompt, PromptError, PromptMessage, PromptRegistry, PromptRole};
pub use server::McpServer;
pub use tools::{LlmProvider, Tool, ToolContext, ToolHandler, ToolRegistry};
