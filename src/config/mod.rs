//! Configuration module for Caramel.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, ChatPrompts, Prompts, SummarizePrompts};
pub use settings::{
    AgentSettings, GeneralSettings, LlmProvider, LlmSettings, MarketSettings, PromptSettings,
    Settings, SummarizeSettings,
};
