//! Utility modules supporting the server and CLI.
//!
//! - [`HttpClient`]: shared HTTP client used by the LLM clients
//! - [`InteractionLog`]: append-only JSON-lines record of tool calls
//!
//! # Interaction Log
//!
//! ```rust,no_run
//! use goal_analytics::utils::InteractionLog;
//! use serde_json::json;
//!
//! let log = InteractionLog::new("mcp_interactions.log.json");
//! log.record("goals_by_minute_range", &json!({}), json!({"0-15": 12}), None);
//! ```

mod http;
mod interaction_log;

pub use http::{HttpClient, DEFAULT_TIMEOUT_SECS};
pub use interaction_log::{InteractionEntry, InteractionLog, DEFAULT_LOG_FILE};
