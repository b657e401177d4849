//! Tool handlers backed by the goal log and hosted LLMs.

use std::sync::Arc;

use serde_json::Value;

use super::tools::{LlmProvider, ToolContext, ToolHandler};
use crate::dataset::{Dataset, MINUTE_COLUMN};
use crate::llm::{build_analysis_prompt, AnalysisError, CompletionRequest};
use crate::models::compute_minute_histogram;

/// System message sent with GPT analysis requests
const GPT_SYSTEM_PROMPT: &str = "You are a football analytics expert.";

/// Handler summarizing the dataset's shape and first rows
#[derive(Debug)]
pub struct SummarizeDatasetHandler {
    pub ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl ToolHandler for SummarizeDatasetHandler {
    async fn execute(&self, _args: Value) -> Result<Value, String> {
        let dataset = self.ctx.load_dataset().map_err(|e| e.to_string())?;
        let summary = dataset.summary(self.ctx.config().dataset.head_rows);
        serde_json::to_value(summary).map_err(|e| e.to_string())
    }
}

/// Handler counting goals per minute range
#[derive(Debug)]
pub struct GoalsByMinuteRangeHandler {
    pub ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl ToolHandler for GoalsByMinuteRangeHandler {
    async fn execute(&self, _args: Value) -> Result<Value, String> {
        let dataset = self.ctx.load_dataset().map_err(|e| e.to_string())?;
        let fields = dataset
            .minute_fields(MINUTE_COLUMN)
            .map_err(|e| e.to_string())?;

        let histogram = compute_minute_histogram(&fields);
        tracing::debug!(
            "Bucketed {} of {} goals by minute range ({} without a minute)",
            histogram.total(),
            fields.len(),
            fields.iter().filter(|f| f.is_missing()).count()
        );

        serde_json::to_value(histogram).map_err(|e| e.to_string())
    }
}

/// Handler forwarding a question about the goal log to an LLM
#[derive(Debug)]
pub struct AnalyzeDataHandler {
    pub ctx: Arc<ToolContext>,
    pub provider: LlmProvider,
}

impl AnalyzeDataHandler {
    async fn analyze(&self, query: &str, category: Option<&str>) -> Result<String, AnalysisError> {
        let config = self.ctx.config();

        let mut dataset: Dataset = self.ctx.load_dataset()?;
        if let Some(category) = category {
            dataset = dataset.filter_competition(category)?;
        }

        let stats = dataset.analysis_stats()?;
        let sample = dataset.sample(config.dataset.sample_rows);
        let prompt = build_analysis_prompt(&config.dataset.player_name, &stats, &sample, query)
            .map_err(crate::llm::LlmError::from)?;

        let (model, system) = match self.provider {
            LlmProvider::OpenAi => (&config.models.openai, Some(GPT_SYSTEM_PROMPT)),
            LlmProvider::Anthropic => (&config.models.anthropic, None),
        };
        let client = self.ctx.llm_client(self.provider, model)?;

        let mut request = CompletionRequest::new(prompt, config.models.max_tokens);
        if let Some(system) = system {
            request = request.system(system);
        }

        tracing::info!(
            "Asking {} ({}) about {} goals",
            client.provider_name(),
            client.model_name(),
            stats.total_goals
        );
        Ok(client.complete(&request).await?)
    }
}

#[async_trait::async_trait]
impl ToolHandler for AnalyzeDataHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or("Missing 'query' parameter")?;

        let category = args
            .get("category")
            .and_then(|v| v.as_str())
            .filter(|c| !c.is_empty());

        let reply = self
            .analyze(query, category)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Value::String(reply))
    }
}

/// Handler checking the OpenAI connection
#[derive(Debug)]
pub struct SayHelloHandler {
    pub ctx: Arc<ToolContext>,
}

#[async_trait::async_trait]
impl ToolHandler for SayHelloHandler {
    async fn execute(&self, _args: Value) -> Result<Value, String> {
        let model = &self.ctx.config().models.hello;
        let reply = match self.ctx.llm_client(LlmProvider::OpenAi, model) {
            Ok(client) => client.complete(&CompletionRequest::new("Say hello", 10)).await,
            Err(e) => Err(e),
        };

        // Failures are part of the answer here, not a tool error
        Ok(Value::String(match reply {
            Ok(text) => text,
            Err(e) => format!("Error: {}", e),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::io::Write;

    fn context_for(csv: &str) -> (tempfile::NamedTempFile, Arc<ToolContext>) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let mut config = Config::default();
        config.dataset.path = file.path().to_path_buf();
        config.logging.interactions_enabled = false;
        (file, Arc::new(ToolContext::new(config).unwrap()))
    }

    #[tokio::test]
    async fn test_goals_by_minute_range() {
        let (_file, ctx) = context_for("Minute,Type\n10,Header\n90+4,Penalty\n,Header\n45+1,Header\n");
        let handler = GoalsByMinuteRangeHandler { ctx };

        let result = handler.execute(json!({})).await.unwrap();
        assert_eq!(
            result,
            json!({"0-15": 1, "16-30": 0, "31-45": 0, "46-60": 1, "61-75": 0, "76+": 1})
        );
    }

    #[tokio::test]
    async fn test_goals_by_minute_range_without_minute_column() {
        let (_file, ctx) = context_for("Season,Type\n04/05,Header\n");
        let handler = GoalsByMinuteRangeHandler { ctx };

        let err = handler.execute(json!({})).await.unwrap_err();
        assert_eq!(err, "Column not found: Minute");
    }

    #[tokio::test]
    async fn test_summarize_dataset() {
        let (_file, ctx) = context_for("Minute,Type\n1,A\n2,B\n3,C\n4,D\n5,E\n6,F\n");
        let handler = SummarizeDatasetHandler { ctx };

        let result = handler.execute(json!({})).await.unwrap();
        assert_eq!(result["num_rows"], 6);
        assert_eq!(result["num_columns"], 2);
        assert_eq!(result["columns"], json!(["Minute", "Type"]));
        assert_eq!(result["head"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_analyze_requires_query() {
        let (_file, ctx) = context_for("Minute\n1\n");
        let handler = AnalyzeDataHandler {
            ctx,
            provider: LlmProvider::OpenAi,
        };

        let err = handler.execute(json!({"category": "LaLiga"})).await.unwrap_err();
        assert_eq!(err, "Missing 'query' parameter");
    }
}
