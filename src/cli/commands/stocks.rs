//! Stocks command: run the price tool without a model.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::market::{get_stock_prices, narrate, parse_tickers, LookupOptions, YahooQuoteProvider};
use anyhow::{bail, Result};

/// Run the stocks command.
pub async fn run_stocks(tickers: &str, json: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Market, &settings.llm)?;

    let options = LookupOptions::from(&settings.market);
    if parse_tickers(tickers, options.uppercase).is_empty() {
        bail!("No ticker symbols given. Example: caramel stocks GOOG,INFY.NS");
    }

    let provider = YahooQuoteProvider::new(&settings.market)?;

    let spinner = Output::spinner("Fetching quotes...");
    let prices = get_stock_prices(&provider, tickers, options).await;
    spinner.finish_and_clear();

    let missing = prices.values().filter(|q| !q.is_available()).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&prices)?);
    } else {
        Output::header("Quotes");
        for (ticker, quote) in &prices {
            Output::quote(ticker, quote);
        }
        println!();
        for line in narrate(&prices) {
            println!("{}", line);
        }
    }

    if missing > 0 {
        Output::warning(&format!(
            "{} of {} ticker(s) could not be resolved",
            missing,
            prices.len()
        ));
    }

    Ok(())
}
