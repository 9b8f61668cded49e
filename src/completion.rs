//! Single-turn chat completions.
//!
//! Used by the one-shot `ask`, the stateless chatbot and the summarizer. Each
//! call sends exactly one user message and returns the text of the first choice.

use crate::config::{LlmSettings, Prompts};
use crate::error::{CaramelError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Client for one-message-in, one-message-out completions.
pub struct Completer {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    system_prompt: Option<String>,
}

impl Completer {
    /// Create a completer for the configured provider and model.
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model(),
            temperature: settings.temperature(),
            system_prompt: None,
        })
    }

    /// Prepend a system message to every request.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = Some(prompt.to_string());
        self
    }

    /// Model identifier used for requests.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt verbatim and return the model's text reply.
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if let Some(system) = &self.system_prompt {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.clone())
                    .build()
                    .map_err(|e| CaramelError::Llm(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| CaramelError::Llm(e.to_string()))?
                .into(),
        );

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(&self.model).messages(messages);
        if let Some(temperature) = self.temperature {
            request.temperature(temperature);
        }
        let request = request
            .build()
            .map_err(|e| CaramelError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| CaramelError::Llm(format!("Chat completion failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| CaramelError::Llm("Empty response from model".to_string()))?
            .clone();

        debug!("Received {} characters", content.len());
        Ok(content)
    }

    /// Summarize a text file with the summarizer template.
    pub async fn summarize_file(&self, path: &Path, prompts: &Prompts) -> Result<String> {
        let text = std::fs::read_to_string(path)?;
        info!("Summarizing {} ({} bytes)", path.display(), text.len());
        self.complete(&prompts.summarize_prompt(&text)).await
    }
}

/// Whether a chat input line is the exit sentinel.
///
/// Only the line terminator is stripped; surrounding spaces keep the line from matching.
pub fn is_quit(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']).eq_ignore_ascii_case("quit")
}
