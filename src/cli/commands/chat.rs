//! Interactive chatbot command.

use crate::cli::input::read_line_from;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::completion::{is_quit, Completer};
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Run the interactive chat command.
///
/// Each line is sent on its own; no history is kept between turns.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Model, &settings.llm) {
        Output::error(&format!("{}", e));
        Output::info("Run 'caramel doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = settings.load_prompts()?;
    let completer = Completer::new(&settings.llm)?;

    println!("{}", style(&prompts.chat.banner).bold().cyan());
    println!("{}", style(&prompts.chat.hint).dim());

    let stdin = io::stdin();
    let mut chat = ChatLoop::new(stdin.lock(), "You: ");

    while let Some(message) = chat.next_message()? {
        let reply = completer.complete(&message).await?;
        println!("{} {}", style("Bot:").cyan().bold(), reply);
    }

    Ok(())
}

/// Reads chat turns from a line source until the `quit` sentinel or end of input.
pub struct ChatLoop<R> {
    reader: R,
    prompt: String,
    finished: bool,
}

impl<R: BufRead> ChatLoop<R> {
    pub fn new(reader: R, prompt: &str) -> Self {
        Self {
            reader,
            prompt: prompt.to_string(),
            finished: false,
        }
    }

    /// Next message to forward to the model, or `None` once the session is over.
    ///
    /// Blank lines are skipped. Any other line is returned verbatim.
    pub fn next_message(&mut self) -> io::Result<Option<String>> {
        while !self.finished {
            print!("{}", style(&self.prompt).green().bold());
            io::stdout().flush()?;

            let line = match read_line_from(&mut self.reader)? {
                Some(line) => line,
                None => {
                    println!();
                    self.finished = true;
                    break;
                }
            };

            if is_quit(&line) {
                debug!("Quit sentinel received");
                self.finished = true;
                break;
            }

            if line.trim().is_empty() {
                continue;
            }

            return Ok(Some(line));
        }

        Ok(None)
    }
}
