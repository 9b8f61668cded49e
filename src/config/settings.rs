//! Configuration settings for Caramel.

use super::Prompts;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub market: MarketSettings,
    pub agent: AgentSettings,
    pub summarize: SummarizeSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Chat model backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini through its OpenAI-compatible endpoint.
    #[default]
    Gemini,
    /// OpenAI hosted models.
    OpenAI,
    /// Locally served model through Ollama.
    Ollama,
}

impl LlmProvider {
    /// Default API base URL for the provider.
    pub fn default_api_base(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Default model identifier for the provider.
    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini-2.5-flash",
            LlmProvider::OpenAI => "gpt-4o-mini",
            LlmProvider::Ollama => "llama3.1:8b",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Gemini => Some("GEMINI_API_KEY"),
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Ollama => None,
        }
    }

    /// Whether the provider runs on the local machine.
    pub fn is_local(&self) -> bool {
        matches!(self, LlmProvider::Ollama)
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openai" => Ok(LlmProvider::OpenAI),
            "ollama" | "local" => Ok(LlmProvider::Ollama),
            _ => Err(format!("Unknown LLM provider: {}", s)),
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Gemini => write!(f, "gemini"),
            LlmProvider::OpenAI => write!(f, "openai"),
            LlmProvider::Ollama => write!(f, "ollama"),
        }
    }
}

/// Chat model settings. Empty strings fall back to the provider defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    /// Model identifier.
    pub model: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: Option<String>,
    /// Environment variable to read the API key from.
    pub api_key_env: Option<String>,
    /// Inline API key. Takes precedence over `api_key_env`.
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            api_base: None,
            api_key_env: None,
            api_key: None,
            temperature: None,
            timeout_secs: 300,
        }
    }
}

impl LlmSettings {
    /// Switch provider, dropping endpoint overrides that belonged to the old one.
    pub fn with_provider(mut self, provider: LlmProvider) -> Self {
        if provider != self.provider {
            self.provider = provider;
            self.model = None;
            self.api_base = None;
            self.api_key_env = None;
            self.api_key = None;
        }
        self
    }

    /// Resolved model identifier.
    pub fn model(&self) -> String {
        non_empty(&self.model).unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// Resolved API base URL.
    pub fn api_base(&self) -> String {
        non_empty(&self.api_base).unwrap_or_else(|| self.provider.default_api_base().to_string())
    }

    /// Resolved name of the API key environment variable.
    pub fn api_key_env(&self) -> Option<String> {
        non_empty(&self.api_key_env)
            .or_else(|| self.provider.default_api_key_env().map(str::to_string))
    }

    /// Resolved API key from the inline setting or the environment.
    pub fn api_key(&self) -> Option<String> {
        non_empty(&self.api_key).or_else(|| {
            self.api_key_env()
                .and_then(|var| std::env::var(var).ok())
                .filter(|key| !key.is_empty())
        })
    }

    /// Resolved sampling temperature. Local models default to deterministic output.
    pub fn temperature(&self) -> Option<f32> {
        self.temperature
            .or_else(|| self.provider.is_local().then_some(0.0))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// Market data provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    /// Base URL of the chart API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Try the most recent daily close when the quick quote is incomplete.
    pub history_fallback: bool,
    /// Uppercase ticker symbols before lookup.
    pub uppercase_tickers: bool,
    /// User-Agent header sent to the provider.
    pub user_agent: String,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            timeout_secs: 15,
            history_fallback: true,
            uppercase_tickers: true,
            user_agent: concat!("caramel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum LLM round trips per run.
    pub max_iterations: usize,
    /// Report malformed tool calls back to the model instead of failing.
    pub handle_parsing_errors: bool,
    /// Print the tool calls made after the final answer.
    pub show_tool_calls: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            handle_parsing_errors: true,
            show_tool_calls: true,
        }
    }
}

/// Summarizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeSettings {
    /// Default text file to summarize.
    pub input_file: String,
}

impl Default for SummarizeSettings {
    fn default() -> Self {
        Self {
            input_file: "profile-of-hereandnowai.txt".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load prompt templates, applying the custom directory and variables.
    pub fn load_prompts(&self) -> crate::error::Result<Prompts> {
        Prompts::load(self.prompts.custom_dir.as_deref(), Some(&self.prompts.variables))
    }

    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::CaramelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("caramel")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded summarizer input path.
    pub fn summarize_input(&self) -> PathBuf {
        Self::expand_path(&self.summarize.input_file)
    }
}
