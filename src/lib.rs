//! # Goal Analytics MCP
//!
//! A Model Context Protocol (MCP) server exposing analytics tools over a
//! football player's goal log, with optional summaries from hosted LLMs.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Minute parsing and the minute-range histogram
//! - [`dataset`]: CSV loading, summaries and analysis statistics
//! - [`llm`]: OpenAI and Anthropic clients
//! - [`mcp`]: MCP tools, prompts and server
//! - [`utils`]: HTTP client and interaction log
//! - [`config`]: Configuration management

pub mod config;
pub mod dataset;
pub mod llm;
pub mod mcp;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use dataset::Dataset;
pub use models::{
    compute_minute_histogram, parse_minute, HistogramResult, RangeLabel, RawMinuteField,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
