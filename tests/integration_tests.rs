//! Integration tests for Goal Analytics
//!
//! These tests drive the tool registry end to end against the fixture goal
//! log, with mock LLM endpoints standing in for the hosted providers.

use goal_analytics::config::Config;
use goal_analytics::dataset::Dataset;
use goal_analytics::mcp::server::McpServer;
use goal_analytics::mcp::{PromptRegistry, ToolContext, ToolRegistry};
use goal_analytics::utils::InteractionLog;
use mockito::Matcher;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/goals.csv")
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.dataset.path = fixture_path();
    config.logging.interactions_enabled = false;
    config
}

fn registry(config: Config) -> ToolRegistry {
    ToolRegistry::from_context(Arc::new(ToolContext::new(config).unwrap()))
}

#[test]
fn test_server_creation() {
    let server = McpServer::new(test_config());
    assert!(server.is_ok());
}

#[test]
fn test_fixture_loads() {
    let dataset = Dataset::from_path(fixture_path()).unwrap();
    assert_eq!(dataset.len(), 14);
    assert_eq!(dataset.headers().len(), 13);
}

#[test]
fn test_missing_dataset_is_reported() {
    let mut config = test_config();
    config.dataset.path = PathBuf::from("does/not/exist.csv");

    let err = tokio_test::block_on(registry(config).execute("summarize_dataset", json!({})))
        .unwrap_err();
    assert!(err.starts_with("Failed to open dataset"));
}

#[tokio::test]
async fn test_goals_by_minute_range_on_fixture() {
    let result = registry(test_config())
        .execute("goals_by_minute_range", json!({}))
        .await
        .unwrap();

    // The blank minute and the 120+2 goal fall outside every range
    assert_eq!(
        result,
        json!({"0-15": 2, "16-30": 3, "31-45": 1, "46-60": 2, "61-75": 2, "76+": 2})
    );

    let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["0-15", "16-30", "31-45", "46-60", "61-75", "76+"]);
}

#[tokio::test]
async fn test_summarize_dataset_on_fixture() {
    let result = registry(test_config())
        .execute("summarize_dataset", json!({}))
        .await
        .unwrap();

    assert_eq!(result["num_rows"], 14);
    assert_eq!(result["num_columns"], 13);
    assert_eq!(result["columns"][9], "Minute");
    assert_eq!(result["head"][0]["Minute"], "90+1");
    assert_eq!(result["head"][1]["Minute"], 34);
    assert_eq!(result["head"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_analyze_with_gpt_against_mock() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-openai-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"model": "gpt-4-turbo", "max_tokens": 1000})),
            Matcher::Regex("You are a football analytics expert.".to_string()),
            Matcher::Regex("When does he score".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices":[{"message":{"role":"assistant","content":"Most goals came late."}}]}"#,
        )
        .create_async()
        .await;

    let mut config = test_config();
    config.api_keys.openai = Some("test-openai-key".to_string());
    config.models.openai_base_url = Some(server.url());

    let reply = registry(config)
        .execute(
            "analyze_data_with_gpt",
            json!({"query": "When does he score?", "category": "Champions"}),
        )
        .await
        .unwrap();

    assert_eq!(reply, json!("Most goals came late."));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_analyze_with_claude_against_mock() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "test-anthropic-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-3-opus-20240229",
            "max_tokens": 1000
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"content":[{"type":"text","text":"He loves the Clasico."}],"role":"assistant"}"#,
        )
        .create_async()
        .await;

    let mut config = test_config();
    config.api_keys.anthropic = Some("test-anthropic-key".to_string());
    config.models.anthropic_base_url = Some(server.url());

    let reply = registry(config)
        .execute("analyze_data_with_claude", json!({"query": "Best opponent?"}))
        .await
        .unwrap();

    assert_eq!(reply, json!("He loves the Clasico."));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_analyze_surfaces_provider_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/messages")
        .with_status(529)
        .with_body("overloaded")
        .create_async()
        .await;

    let mut config = test_config();
    config.api_keys.anthropic = Some("test-anthropic-key".to_string());
    config.models.anthropic_base_url = Some(server.url());

    let err = registry(config)
        .execute("analyze_data_with_claude", json!({"query": "Best season?"}))
        .await
        .unwrap_err();

    assert!(err.contains("529"));
    assert!(err.contains("overloaded"));
}

#[tokio::test]
async fn test_say_hello_reports_errors_as_text() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({"model": "gpt-4o-mini", "max_tokens": 10})),
            Matcher::Regex("Say hello".to_string()),
        ]))
        .with_status(401)
        .with_body("invalid api key")
        .create_async()
        .await;

    let mut config = test_config();
    config.api_keys.openai = Some("bad-key".to_string());
    config.models.openai_base_url = Some(server.url());

    let reply = registry(config)
        .execute("say_hello", json!({}))
        .await
        .unwrap();

    let text = reply.as_str().unwrap();
    assert!(text.starts_with("Error: "));
    assert!(text.contains("invalid api key"));
}

#[tokio::test]
async fn test_tool_calls_are_logged() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("interactions.json");

    let mut config = test_config();
    config.logging.interactions_enabled = true;
    config.logging.interactions_file = log_path.clone();
    let registry = registry(config);

    registry
        .execute("goals_by_minute_range", json!({}))
        .await
        .unwrap();
    registry
        .execute("analyze_data_with_gpt", json!({"category": "LaLiga"}))
        .await
        .unwrap_err();

    let entries = InteractionLog::new(&log_path).read_entries().unwrap();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].tool_name, "goals_by_minute_range");
    assert_eq!(entries[0].output["76+"], 2);
    assert!(entries[0].error.is_none());

    assert_eq!(entries[1].tool_name, "analyze_data_with_gpt");
    assert_eq!(entries[1].inputs["category"], "LaLiga");
    assert_eq!(entries[1].error.as_deref(), Some("Missing 'query' parameter"));
}

#[test]
fn test_prompt_registry() {
    let registry = PromptRegistry::new("Lionel Messi");
    let names: Vec<&str> = registry.all().iter().map(|p| p.name).collect();
    assert_eq!(
        names,
        [
            "review_code",
            "debug_error",
            "analyze_performance",
            "compare_player_analysis"
        ]
    );
}
