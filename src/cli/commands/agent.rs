//! Agent command implementation.

use crate::agent::{Agent, ToolContext};
use crate::cli::input::read_line;
use crate::cli::preflight::{self, Operation};
use crate::cli::{truncate, Output};
use crate::config::Settings;
use crate::error::CaramelError;
use crate::market::{parse_tickers, LookupOptions, YahooQuoteProvider};
use anyhow::Result;
use std::sync::Arc;

const TICKER_PROMPT: &str =
    "Please enter the stock tickers you want to look up, separated by commas (e.g., GOOG,INFY.NS): ";

/// Run the finance agent command.
pub async fn run_agent(
    tickers: Option<String>,
    max_iterations: Option<usize>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Model, &settings.llm) {
        Output::error(&format!("{}", e));
        Output::info("Run 'caramel doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let tickers = match tickers {
        Some(t) => t,
        None => read_line(TICKER_PROMPT)?.unwrap_or_default(),
    };

    let options = LookupOptions::from(&settings.market);
    if parse_tickers(&tickers, options.uppercase).is_empty() {
        return Err(CaramelError::InvalidInput("No ticker symbols given".to_string()).into());
    }

    let prompts = settings.load_prompts()?;
    let provider = Arc::new(YahooQuoteProvider::new(&settings.market)?);
    let tool_context = ToolContext::new(provider, options);

    let agent = Agent::new(tool_context, &settings.llm)?
        .with_system_prompt(&prompts.agent.system)
        .with_max_iterations(max_iterations.unwrap_or(settings.agent.max_iterations))
        .with_parsing_error_recovery(settings.agent.handle_parsing_errors);

    let task = prompts.agent_task(&tickers);

    let spinner = Output::spinner(&format!("Agent working ({})...", agent.model()));
    let result = agent.run(&task).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            if settings.agent.show_tool_calls && !response.tool_calls.is_empty() {
                Output::header(&format!("Tool calls ({})", response.tool_calls.len()));
                for call in &response.tool_calls {
                    Output::info(&format!("  {} {}", call.name, truncate(&call.arguments, 60)));
                    Output::kv("result", &truncate(&call.result, 200));
                }
            }

            println!("\nFinal Answer from Agent:");
            println!("{}", response.content);

            Output::info(&format!("Completed in {} iteration(s)", response.iterations));
        }
        Err(e) => {
            Output::error(&format!("Agent failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
