use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use goal_analytics::config::{
    find_config_file, get_config, load_config, user_config_path, Config, CONFIG_FILE_NAME,
};
use goal_analytics::dataset::{Dataset, DatasetSummary, MINUTE_COLUMN};
use goal_analytics::mcp::server::McpServer;
use goal_analytics::mcp::{PromptRegistry, ToolContext, ToolRegistry};
use goal_analytics::models::{compute_minute_histogram, HistogramResult};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Goal Analytics - MCP tools over a football player's goal log
#[derive(Parser, Debug)]
#[command(name = "goal-analytics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP tools and LLM summaries over a football player's goal log", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Log line format (logs always go to stderr)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Goal log CSV (overrides the configured path)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

/// LLM provider used by `ask`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Provider {
    #[value(name = "openai", alias = "gpt")]
    OpenAi,
    #[value(name = "anthropic", alias = "claude")]
    Anthropic,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server (default when no command is given)
    Serve {
        /// Run in stdio mode (for MCP clients like Claude Desktop)
        #[arg(long, default_value_t = true)]
        stdio: bool,

        /// Run in HTTP/SSE mode (overrides --stdio)
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Host to bind to for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Count goals per minute range
    #[command(alias = "hist")]
    Histogram {
        /// Column holding the minute notation
        #[arg(long, default_value = MINUTE_COLUMN)]
        column: String,
    },

    /// Show dataset shape and first rows
    Summary {
        /// Number of rows to show (default from config)
        #[arg(long, short)]
        rows: Option<usize>,
    },

    /// Ask an LLM a question about the goal log
    Ask {
        /// Natural-language question
        query: String,

        /// Provider to ask
        #[arg(long, short, value_enum, default_value_t = Provider::OpenAi)]
        provider: Provider,

        /// Only use goals whose competition contains this text
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Check the OpenAI connection
    Hello,

    /// List the MCP tools
    Tools,

    /// List the MCP prompts
    Prompts,

    /// Write a configuration file with default values
    InitConfig {
        /// Destination (default: user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    dotenvy::dotenv().ok();

    init_tracing(&cli);

    let mut config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()?
    };

    if let Some(dataset) = &cli.dataset {
        config.dataset.path = dataset.clone();
    }

    let format = resolve_format(cli.output);

    match cli.command {
        None => serve(config, false, "127.0.0.1", 3000).await?,

        Some(Commands::Serve {
            stdio,
            http,
            port,
            host,
        }) => {
            // Use HTTP mode if --http flag is provided, otherwise use --stdio flag
            let use_http = http || !stdio;
            serve(config, use_http, &host, port).await?;
        }

        Some(Commands::Histogram { column }) => {
            let dataset = Dataset::from_path(&config.dataset.path)?;
            let fields = dataset.minute_fields(&column)?;
            let histogram = compute_minute_histogram(&fields);
            tracing::debug!(
                "{} of {} rows fell into a minute range",
                histogram.total(),
                fields.len()
            );
            output_histogram(&histogram, format)?;
        }

        Some(Commands::Summary { rows }) => {
            let dataset = Dataset::from_path(&config.dataset.path)?;
            let summary = dataset.summary(rows.unwrap_or(config.dataset.head_rows));
            output_summary(&summary, format)?;
        }

        Some(Commands::Ask {
            query,
            provider,
            category,
        }) => {
            let tool = match provider {
                Provider::OpenAi => "analyze_data_with_gpt",
                Provider::Anthropic => "analyze_data_with_claude",
            };
            let mut args = serde_json::json!({ "query": query });
            if let Some(category) = category {
                args["category"] = serde_json::Value::String(category);
            }

            let reply = tool_registry(config)?
                .execute(tool, args)
                .await
                .map_err(anyhow::Error::msg)?;
            print_text_reply(&reply);
        }

        Some(Commands::Hello) => {
            let reply = tool_registry(config)?
                .execute("say_hello", serde_json::json!({}))
                .await
                .map_err(anyhow::Error::msg)?;
            print_text_reply(&reply);
        }

        Some(Commands::Tools) => {
            let registry = tool_registry(config)?;
            for tool in registry.all() {
                println!("{} - {}", tool.name, tool.description);
            }
        }

        Some(Commands::Prompts) => {
            let registry = PromptRegistry::new(config.dataset.player_name.clone());
            for prompt in registry.all() {
                let args: Vec<&str> = prompt.arguments.iter().map(|a| a.name).collect();
                println!(
                    "{}({}) - {}",
                    prompt.name,
                    args.join(", "),
                    prompt.description
                );
            }
        }

        Some(Commands::InitConfig { path, force }) => {
            let path = path
                .or_else(user_config_path)
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save(&path)?;
            if !cli.quiet {
                println!("Wrote default configuration to {}", path.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("goal_analytics={}", env_filter)),
    );

    // stdout is reserved for the stdio MCP transport and command output
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

async fn serve(config: Config, use_http: bool, host: &str, port: u16) -> Result<()> {
    let server = McpServer::new(config)?;

    if use_http {
        let addr = format!("{}:{}", host, port);
        tracing::info!("Running MCP server in HTTP/SSE mode on {}", addr);
        let (bound_addr, handle) = server.run_http(&addr).await?;
        tracing::info!("MCP server listening on {}", bound_addr);

        handle
            .await
            .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
    } else {
        tracing::info!("Running MCP server in stdio mode");
        server.run().await?;
    }
    Ok(())
}

fn tool_registry(config: Config) -> Result<ToolRegistry> {
    let ctx = ToolContext::new(config).context("Failed to create HTTP client")?;
    Ok(ToolRegistry::from_context(Arc::new(ctx)))
}

fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn print_text_reply(reply: &serde_json::Value) {
    match reply.as_str() {
        Some(text) => println!("{}", text),
        None => println!("{}", reply),
    }
}

fn output_histogram(histogram: &HistogramResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            println!("{}", serde_json::to_string_pretty(histogram)?);
        }
        OutputFormat::Plain => {
            for (label, count) in histogram.iter() {
                println!("{}: {}", label, count);
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Minutes", "Goals"]);

            for (label, count) in histogram.iter() {
                table.add_row(vec![
                    Cell::new(label).add_attribute(Attribute::Bold),
                    Cell::new(count),
                ]);
            }
            table.add_row(vec![Cell::new("Total"), Cell::new(histogram.total())]);
            println!("{table}");
        }
    }
    Ok(())
}

fn output_summary(summary: &DatasetSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Auto => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Plain => {
            println!("Rows: {}", summary.num_rows);
            println!("Columns ({}): {}", summary.num_columns, summary.columns.join(", "));
            for row in &summary.head {
                println!("{}", serde_json::Value::Object(row.clone()));
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Cell, Table};
            println!(
                "{} rows x {} columns",
                summary.num_rows, summary.num_columns
            );

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(summary.columns.clone());
            for row in &summary.head {
                table.add_row(
                    summary
                        .columns
                        .iter()
                        .map(|column| match row.get(column) {
                            Some(serde_json::Value::String(s)) => Cell::new(s),
                            Some(serde_json::Value::Null) | None => Cell::new(""),
                            Some(other) => Cell::new(other),
                        })
                        .collect::<Vec<_>>(),
                );
            }
            println!("{table}");
        }
    }
    Ok(())
}
