//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::completion::Completer;
use crate::config::Settings;
use anyhow::{Context, Result};

/// Run the summarize command.
pub async fn run_summarize(file: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Model, &settings.llm) {
        Output::error(&format!("{}", e));
        Output::info("Run 'caramel doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let path = match file {
        Some(f) => Settings::expand_path(&f),
        None => settings.summarize_input(),
    };
    let prompts = settings.load_prompts()?;
    let completer = Completer::new(&settings.llm)?;

    let spinner = Output::spinner(&format!("Summarizing {}...", path.display()));
    let result = completer.summarize_file(&path, &prompts).await;
    spinner.finish_and_clear();

    let summary = result.with_context(|| format!("Failed to summarize {}", path.display()))?;
    println!("{}", summary);

    Ok(())
}
