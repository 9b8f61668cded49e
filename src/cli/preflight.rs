//! Pre-flight checks before network operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::LlmSettings;
use crate::error::{CaramelError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Anything that talks to the chat model.
    Model,
    /// Direct market data lookups.
    Market,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, llm: &LlmSettings) -> Result<()> {
    match operation {
        Operation::Model => check_api_key(llm)?,
        Operation::Market => {
            // No credentials needed for market data
        }
    }
    Ok(())
}

/// Check that the configured provider has an API key.
pub fn check_api_key(llm: &LlmSettings) -> Result<()> {
    if llm.provider.is_local() || llm.api_key().is_some() {
        return Ok(());
    }

    let var = llm.api_key_env().unwrap_or_else(|| "an API key".to_string());
    match std::env::var(&var) {
        Ok(_) => Err(CaramelError::Config(format!(
            "{} is empty. Set it in your environment or in a .env file.",
            var
        ))),
        Err(_) => Err(CaramelError::Config(format!(
            "{} not set. Add {}=... to a .env file or export it.",
            var, var
        ))),
    }
}
