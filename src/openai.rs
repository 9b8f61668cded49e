//! OpenAI-compatible client configuration.
//!
//! Gemini, OpenAI and Ollama all expose the chat-completions API, so every
//! backend goes through the same `async-openai` client with a different base URL.

use crate::config::LlmSettings;
use crate::error::{CaramelError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Placeholder key for local servers that ignore authentication.
const LOCAL_API_KEY: &str = "ollama";

/// Create a chat client for the configured provider.
///
/// Hosted providers require an API key; local ones accept a placeholder.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = match settings.api_key() {
        Some(key) => key,
        None if settings.provider.is_local() => LOCAL_API_KEY.to_string(),
        None => {
            let var = settings
                .api_key_env()
                .unwrap_or_else(|| "api_key".to_string());
            return Err(CaramelError::Config(format!(
                "No API key for provider '{}'. Set {} in your environment or .env file.",
                settings.provider, var
            )));
        }
    };

    create_client_with_timeout(
        &settings.api_base(),
        &api_key,
        Duration::from_secs(settings.timeout_secs),
    )
}

/// Create a client against an explicit endpoint with a custom timeout.
pub fn create_client_with_timeout(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use async_openai::config::Config;

    #[test]
    fn test_local_provider_needs_no_key() {
        let settings = LlmSettings::default().with_provider(LlmProvider::Ollama);
        let client = create_client(&settings).unwrap();
        assert_eq!(client.config().api_base(), "http://localhost:11434/v1");
    }

    #[test]
    fn test_hosted_provider_without_key_fails() {
        let settings = LlmSettings {
            api_key_env: Some("CARAMEL_TEST_MISSING_KEY".to_string()),
            ..LlmSettings::default()
        };
        let err = create_client(&settings).unwrap_err();
        assert!(err.to_string().contains("CARAMEL_TEST_MISSING_KEY"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client =
            create_client_with_timeout("http://example.test/v1/", "k", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.config().api_base(), "http://example.test/v1");
    }
}
