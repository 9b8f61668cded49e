//! Doctor command - verify configuration before talking to any API.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::{Path, PathBuf};
use url::Url;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(
    config_path: Option<PathBuf>,
    dotenv_path: Option<&Path>,
    settings: &Settings,
) -> anyhow::Result<()> {
    Output::header("Caramel Doctor");
    println!();

    let sections: Vec<(&str, Vec<CheckResult>)> = vec![
        (
            "Model Provider",
            vec![
                CheckResult::ok(
                    "provider",
                    &format!("{} ({})", settings.llm.provider, settings.llm.model()),
                ),
                check_url("api_base", &settings.llm.api_base()),
                check_api_key(settings),
            ],
        ),
        (
            "Market Data",
            vec![
                check_url("base_url", &settings.market.base_url),
                check_market_timeout(settings.market.timeout_secs),
            ],
        ),
        (
            "Files",
            vec![
                check_config_file(
                    &config_path.unwrap_or_else(Settings::default_config_path),
                ),
                check_dotenv(dotenv_path),
                check_summarize_input(&settings.summarize_input()),
            ],
        ),
    ];

    let mut errors = 0;
    let mut warnings = 0;

    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Caramel.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Caramel is ready to use.");
    }

    Ok(())
}

fn check_api_key(settings: &Settings) -> CheckResult {
    if settings.llm.provider.is_local() {
        return CheckResult::ok("api_key", "not required for local models");
    }

    match preflight::check_api_key(&settings.llm) {
        Ok(()) => {
            let source = if settings.llm.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
                "set in config file".to_string()
            } else {
                format!("found in {}", settings.llm.api_key_env().unwrap_or_default())
            };
            CheckResult::ok("api_key", &source)
        }
        Err(e) => CheckResult::error(
            "api_key",
            &e.to_string(),
            "Create a .env file in the working directory with the key, or set llm.api_key",
        ),
    }
}

fn check_url(name: &str, value: &str) -> CheckResult {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => CheckResult::ok(name, value),
        Ok(url) => CheckResult::error(
            name,
            &format!("unsupported scheme '{}'", url.scheme()),
            "Use an http:// or https:// URL",
        ),
        Err(e) => CheckResult::error(name, &format!("invalid URL: {}", e), "Fix the URL in the config file"),
    }
}

fn check_market_timeout(timeout_secs: u64) -> CheckResult {
    if timeout_secs == 0 {
        CheckResult::error(
            "timeout",
            "market.timeout_secs is 0",
            "Set market.timeout_secs to a positive number of seconds",
        )
    } else {
        CheckResult::ok("timeout", &format!("{}s", timeout_secs))
    }
}

fn check_config_file(path: &Path) -> CheckResult {
    if !path.exists() {
        return CheckResult::warning(
            "config",
            &format!("{} not found, using defaults", path.display()),
            "Run 'caramel config edit' to create one",
        );
    }

    match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str::<Settings>(&content).map_err(|e| e.to_string()))
    {
        Ok(_) => CheckResult::ok("config", &path.display().to_string()),
        Err(e) => CheckResult::error("config", &format!("cannot load: {}", e), "Fix the TOML syntax"),
    }
}

/// Report the `.env` file picked up at startup, if any.
fn check_dotenv(loaded: Option<&Path>) -> CheckResult {
    match loaded {
        Some(path) => CheckResult::ok(".env", &format!("loaded from {}", path.display())),
        None => CheckResult::warning(
            ".env",
            "not found in working directory or its parents",
            "API keys can also come from the environment",
        ),
    }
}

fn check_summarize_input(path: &Path) -> CheckResult {
    if path.is_file() {
        CheckResult::ok("summarize input", &path.display().to_string())
    } else {
        CheckResult::warning(
            "summarize input",
            &format!("{} not found", path.display()),
            "Pass a file to 'caramel summarize' or set summarize.input_file",
        )
    }
}
