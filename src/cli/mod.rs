//! CLI module for Caramel.

pub mod commands;
pub mod input;
mod output;
pub mod preflight;

pub use output::{truncate, Output};

use crate::config::{LlmProvider, Settings};
use clap::{Parser, Subcommand};

/// Caramel - LLM chat, summarization and a stock price agent
///
/// Talks to Gemini, OpenAI or a local Ollama server through one
/// OpenAI-compatible client.
#[derive(Parser, Debug)]
#[command(name = "caramel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Model provider (gemini, openai, ollama)
    #[arg(short, long, global = true, env = "CARAMEL_PROVIDER")]
    pub provider: Option<LlmProvider>,

    /// Model identifier to use instead of the provider default
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply global overrides from the command line on top of loaded settings.
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(provider) = self.provider {
            settings.llm = settings.llm.with_provider(provider);
        }
        if let Commands::Agent { local: true, .. } = self.command {
            settings.llm = settings.llm.with_provider(LlmProvider::Ollama);
        }
        if let Some(model) = &self.model {
            settings.llm.model = Some(model.clone());
        }
        settings
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a single prompt to the model and print the answer
    Ask {
        /// The prompt to send (defaults to the configured question)
        prompt: Option<String>,
    },

    /// Start an interactive chat session (type 'quit' to exit)
    Chat,

    /// Summarize a text file
    Summarize {
        /// Text file to summarize (defaults to the configured input file)
        file: Option<String>,
    },

    /// Look up stock prices directly, without a model
    Stocks {
        /// Comma-separated ticker symbols (e.g., GOOG,INFY.NS)
        tickers: String,

        /// Print the raw JSON the agent tool returns
        #[arg(long)]
        json: bool,
    },

    /// Ask the finance agent for current stock prices
    Agent {
        /// Comma-separated ticker symbols (prompted for when omitted)
        tickers: Option<String>,

        /// Use the local Ollama model instead of the hosted one
        #[arg(long)]
        local: bool,

        /// Maximum number of model round trips
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Check configuration and connectivity requirements
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_agent_local_switches_provider() {
        let cli = Cli::parse_from(["caramel", "agent", "GOOG,INFY.NS", "--local"]);
        let settings = cli.apply_overrides(Settings::default());
        assert_eq!(settings.llm.provider, LlmProvider::Ollama);
        assert_eq!(settings.llm.model(), "llama3.1:8b");
    }

    #[test]
    fn test_model_override_applies_after_provider() {
        let cli = Cli::parse_from(["caramel", "-p", "openai", "-m", "gpt-4o", "ask", "hello"]);
        let settings = cli.apply_overrides(Settings::default());
        assert_eq!(settings.llm.provider, LlmProvider::OpenAI);
        assert_eq!(settings.llm.model(), "gpt-4o");
    }

    #[test]
    fn test_stocks_parses_ticker_string() {
        let cli = Cli::parse_from(["caramel", "stocks", "GOOG,,INFY.NS", "--json"]);
        match cli.command {
            Commands::Stocks { tickers, json } => {
                assert_eq!(tickers, "GOOG,,INFY.NS");
                assert!(json);
            }
            _ => panic!("Expected Stocks command"),
        }
    }
}
