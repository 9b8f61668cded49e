//! Prompt templates for Caramel.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub chat: ChatPrompts,
    pub summarize: SummarizePrompts,
    pub agent: AgentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the one-shot completion and the interactive chatbot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    /// Prompt sent by `ask` when none is given.
    pub default_question: String,
    /// Banner printed when a chat session starts.
    pub banner: String,
    /// Hint printed under the banner.
    pub hint: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            default_question:
                "Tell me about HERE AND NOW AI - Artificial Intelligence Research Institute"
                    .to_string(),
            banner: "Caramel AI - Chatbot of HERE AND NOW AI".to_string(),
            hint: "Ask anything you like or type quit to exit".to_string(),
        }
    }
}

/// Prompt for the text summarizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizePrompts {
    pub user: String,
}

impl Default for SummarizePrompts {
    fn default() -> Self {
        Self {
            user: "Summarize the following text:\n\n{{text}}\n\nSummary:".to_string(),
        }
    }
}

/// Prompts for the stock price agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    pub task: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that can fetch stock prices.

You have access to the 'get_stock_prices' tool. Call it with a comma-separated list of ticker symbols, for example 'GOOG,INFY.NS'.

When you have retrieved the stock prices, always provide a final answer.
If a ticker comes back with price 0.0 and currency 'N/A', say that no price could be found for it."#
                .to_string(),

            task: "What are the current stock prices for {{tickers}}? \
The tool will return a JSON string with price and currency (e.g., 'USD' or 'INR') for each stock. \
Once you have this information from the tool, you MUST immediately provide the final answer. \
Do not use the tool more than once per ticker. \
Format the final answer using '₹' for 'INR' and '$' for 'USD'. \
List each stock on a new line. \
For example: 'The current stock price for INFY.NS is ₹1550.75.'"
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let chat_path = custom_path.join("chat.toml");
            if chat_path.exists() {
                let content = std::fs::read_to_string(&chat_path)?;
                prompts.chat = toml::from_str(&content)?;
            }

            let summarize_path = custom_path.join("summarize.toml");
            if summarize_path.exists() {
                let content = std::fs::read_to_string(&summarize_path)?;
                prompts.summarize = toml::from_str(&content)?;
            }

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are resolved in one left-to-right pass, so text inserted
    /// for one variable is never scanned for further placeholders. Unknown
    /// placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = &after[..end];
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Render the summarizer prompt for a document.
    pub fn summarize_prompt(&self, text: &str) -> String {
        let vars = HashMap::from([("text".to_string(), text.to_string())]);
        self.render_with_custom(&self.summarize.user, &vars)
    }

    /// Render the agent task for a user-supplied ticker list.
    pub fn agent_task(&self, tickers: &str) -> String {
        let vars = HashMap::from([("tickers".to_string(), tickers.trim().to_string())]);
        self.render_with_custom(&self.agent.task, &vars)
    }
}
