//! Prompt templates offered to MCP clients.

use std::collections::HashMap;

/// Speaker of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// One rendered prompt message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub text: String,
}

impl PromptMessage {
    fn system(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            text: text.into(),
        }
    }

    fn user(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            text: text.into(),
        }
    }

    fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            text: text.into(),
        }
    }
}

/// Declared prompt argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Errors raised while rendering a prompt
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("Prompt '{0}' not found")]
    NotFound(String),

    #[error("Missing required argument '{0}'")]
    MissingArgument(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    ReviewCode,
    DebugError,
    AnalyzePerformance,
    ComparePlayers,
}

/// A named prompt template
#[derive(Debug, Clone)]
pub struct Prompt {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
    kind: PromptKind,
}

impl Prompt {
    fn required(name: &'static str, description: &'static str) -> PromptArgument {
        PromptArgument {
            name,
            description,
            required: true,
        }
    }

    /// Render the template for `player` with the supplied arguments
    pub fn render(
        &self,
        player: &str,
        args: &HashMap<String, String>,
    ) -> Result<Vec<PromptMessage>, PromptError> {
        let arg = |name: &'static str| {
            args.get(name)
                .map(String::as_str)
                .ok_or(PromptError::MissingArgument(name))
        };

        Ok(match self.kind {
            PromptKind::ReviewCode => {
                vec![PromptMessage::user(format!(
                    "Please review this code:\n\n{}",
                    arg("code")?
                ))]
            }
            PromptKind::DebugError => vec![
                PromptMessage::user("I'm seeing this error:"),
                PromptMessage::user(arg("error")?),
                PromptMessage::assistant("I'll help debug that. What have you tried so far?"),
            ],
            PromptKind::AnalyzePerformance => vec![
                PromptMessage::system(analyst_brief(player)),
                PromptMessage::user(format!(
                    "Analyze this aspect of {}'s career: {}",
                    player,
                    arg("question")?
                )),
            ],
            PromptKind::ComparePlayers => vec![
                PromptMessage::system(comparison_brief(player)),
                PromptMessage::user(format!(
                    "Compare {} with {} regarding: {}",
                    player,
                    arg("player_name")?,
                    arg("question")?
                )),
            ],
        })
    }
}

fn analyst_brief(player: &str) -> String {
    format!(
        "You are a football analytics expert specialized in analyzing {player}'s career.\n\
         You have access to tools that can help you analyze {player}'s data.\n\
         \n\
         You should use tools appropriately based on user questions:\n\
         - For basic statistics or quick summaries, use `summarize_dataset()`\n\
         - For time-based analysis, use `goals_by_minute_range()`\n\
         - For complex analysis that requires combining different insights, use multiple tools\n\
         \n\
         Always show your reasoning, step-by-step:\n\
         1. Think about what data/analysis is needed to answer the question\n\
         2. Choose appropriate tools and explain why you're using them\n\
         3. Call the tools to get the data\n\
         4. Synthesize the information into an insightful answer\n\
         5. Add visualizations or tables where helpful\n\
         \n\
         Your analysis should be data-driven, insightful and accessible to football fans."
    )
}

fn comparison_brief(player: &str) -> String {
    format!(
        "You are a football analytics expert with access to detailed data about {player}'s career.\n\
         However, you only have tools for analyzing {player}'s data, not other players.\n\
         \n\
         When asked to compare {player} with other players:\n\
         1. Acknowledge the limitations of available data\n\
         2. Analyze {player}'s performance using available tools\n\
         3. Discuss the other player based on general knowledge\n\
         4. Compare based on what is known about both players\n\
         5. Be clear about what is data-driven ({player}) vs. general knowledge (other player)\n\
         \n\
         Use tools to get precise data about {player}'s performance whenever possible."
    )
}

/// Registry of prompt templates for one player's dataset
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    player: String,
    prompts: Vec<Prompt>,
}

impl PromptRegistry {
    /// Create the registry with every built-in template
    pub fn new(player: impl Into<String>) -> Self {
        let prompts = vec![
            Prompt {
                name: "review_code",
                description: "Create a code review prompt",
                arguments: vec![Prompt::required("code", "Code to review")],
                kind: PromptKind::ReviewCode,
            },
            Prompt {
                name: "debug_error",
                description: "Create a debugging prompt with structured messages",
                arguments: vec![Prompt::required("error", "Error message being investigated")],
                kind: PromptKind::DebugError,
            },
            Prompt {
                name: "analyze_performance",
                description: "Analyze the player's performance data; the model picks which tools to use",
                arguments: vec![Prompt::required("question", "Aspect of the career to analyze")],
                kind: PromptKind::AnalyzePerformance,
            },
            Prompt {
                name: "compare_player_analysis",
                description: "Compare the player with another player, separating data-driven facts from general knowledge",
                arguments: vec![
                    Prompt::required("player_name", "Player to compare against"),
                    Prompt::required("question", "What to compare"),
                ],
                kind: PromptKind::ComparePlayers,
            },
        ];

        Self {
            player: player.into(),
            prompts,
        }
    }

    /// All prompts in registration order
    pub fn all(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Get a prompt by name
    pub fn get(&self, name: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.name == name)
    }

    /// Render a prompt by name
    pub fn render(
        &self,
        name: &str,
        args: &HashMap<String, String>,
    ) -> Result<Vec<PromptMessage>, PromptError> {
        self.get(name)
            .ok_or_else(|| PromptError::NotFound(name.to_string()))?
            .render(&self.player, args)
    }
}
