//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::completion::Completer;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(prompt: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Model, &settings.llm) {
        Output::error(&format!("{}", e));
        Output::info("Run 'caramel doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = settings.load_prompts()?;
    let prompt = prompt.unwrap_or_else(|| prompts.chat.default_question.clone());

    let completer = Completer::new(&settings.llm)?;

    let spinner = Output::spinner(&format!("Asking {}...", completer.model()));
    let result = completer.complete(&prompt).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to get an answer: {}", e));
            Err(e.into())
        }
    }
}
