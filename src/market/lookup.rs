//! Best-effort batch price lookup.

use super::QuoteProvider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Currency placeholder for tickers without a price.
pub const NOT_AVAILABLE: &str = "N/A";

/// Price and currency for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: f64,
    pub currency: String,
}

impl PriceQuote {
    /// Placeholder used when a ticker cannot be resolved.
    pub fn unavailable() -> Self {
        Self {
            price: 0.0,
            currency: NOT_AVAILABLE.to_string(),
        }
    }

    /// A quote is resolved once it carries a price; the currency may still be unknown.
    pub fn is_available(&self) -> bool {
        self.price > 0.0
    }
}

/// Ticker to quote mapping returned by the price tool.
pub type StockPrices = BTreeMap<String, PriceQuote>;

/// Knobs for [`get_stock_prices`].
#[derive(Debug, Clone, Copy)]
pub struct LookupOptions {
    /// Consult the last daily close when the quick quote is incomplete.
    pub history_fallback: bool,
    /// Uppercase symbols before lookup.
    pub uppercase: bool,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            history_fallback: true,
            uppercase: true,
        }
    }
}

impl From<&crate::config::MarketSettings> for LookupOptions {
    fn from(settings: &crate::config::MarketSettings) -> Self {
        Self {
            history_fallback: settings.history_fallback,
            uppercase: settings.uppercase_tickers,
        }
    }
}

/// Split a comma-separated ticker string into distinct, non-empty symbols.
pub fn parse_tickers(input: &str, uppercase: bool) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for raw in input.split(',') {
        let ticker = raw.trim();
        if ticker.is_empty() {
            continue;
        }
        let ticker = if uppercase {
            ticker.to_uppercase()
        } else {
            ticker.to_string()
        };
        if !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}

/// Round a price to two decimal places.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Look up every ticker in a comma-separated list.
///
/// Every parsed ticker gets an entry. Provider failures and incomplete data are
/// logged and mapped to [`PriceQuote::unavailable`] so one bad symbol never
/// aborts the rest of the batch.
pub async fn get_stock_prices(
    provider: &dyn QuoteProvider,
    tickers: &str,
    options: LookupOptions,
) -> StockPrices {
    let mut prices = StockPrices::new();

    for ticker in parse_tickers(tickers, options.uppercase) {
        let quote = match lookup_one(provider, &ticker, options).await {
            Ok(Some(quote)) => quote,
            Ok(None) => {
                warn!("Could not find price for {}. It may be an invalid ticker.", ticker);
                PriceQuote::unavailable()
            }
            Err(e) => {
                warn!("Could not find data for {}. Error: {}", ticker, e);
                PriceQuote::unavailable()
            }
        };
        prices.insert(ticker, quote);
    }

    prices
}

async fn lookup_one(
    provider: &dyn QuoteProvider,
    ticker: &str,
    options: LookupOptions,
) -> crate::error::Result<Option<PriceQuote>> {
    let info = provider.fast_info(ticker).await?;

    // A zero price counts as missing.
    let price = info.last_price.filter(|p| p.is_finite() && *p != 0.0);
    let currency = info.currency.filter(|c| !c.trim().is_empty());

    if let (Some(price), Some(currency)) = (price, currency.clone()) {
        return Ok(Some(PriceQuote {
            price: round_price(price),
            currency,
        }));
    }

    if !options.history_fallback {
        return Ok(None);
    }

    debug!("Quick quote incomplete for {}, trying daily history", ticker);
    let close = provider
        .last_close(ticker)
        .await?
        .filter(|p| p.is_finite() && *p != 0.0);

    Ok(close.map(|close| PriceQuote {
        price: round_price(close),
        currency: currency.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }))
}

/// Display symbol for a currency code.
pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "INR" => Some("₹"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// One sentence per ticker, in the style the agent is asked to answer in.
pub fn narrate(prices: &StockPrices) -> Vec<String> {
    prices
        .iter()
        .map(|(ticker, quote)| {
            if !quote.is_available() {
                return format!("No current price could be found for {}.", ticker);
            }
            let amount = match currency_symbol(&quote.currency) {
                Some(symbol) => format!("{}{:.2}", symbol, quote.price),
                None if quote.currency == NOT_AVAILABLE => {
                    format!("{:.2} (currency {})", quote.price, NOT_AVAILABLE)
                }
                None => format!("{:.2} {}", quote.price, quote.currency),
            };
            format!("The current stock price for {} is {}.", ticker, amount)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::fake::FakeProvider;

    #[test]
    fn test_parse_tickers_skips_empty_segments() {
        assert_eq!(parse_tickers("GOOG,,INFY.NS", false), vec!["GOOG", "INFY.NS"]);
        assert_eq!(parse_tickers(" goog , infy.ns ,", true), vec!["GOOG", "INFY.NS"]);
        assert!(parse_tickers(" , ,", true).is_empty());
        assert!(parse_tickers("", true).is_empty());
    }

    #[test]
    fn test_parse_tickers_deduplicates() {
        assert_eq!(parse_tickers("goog,GOOG, Goog", true), vec!["GOOG"]);
        assert_eq!(parse_tickers("goog,GOOG", false), vec!["goog", "GOOG"]);
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(1550.7549), 1550.75);
        assert_eq!(round_price(170.126), 170.13);
        assert_eq!(round_price(0.0), 0.0);
    }

    #[tokio::test]
    async fn test_bad_ticker_does_not_abort_batch() {
        let provider = FakeProvider::default().with_quote("GOOG", Some(170.126), Some("USD"));

        let prices =
            get_stock_prices(&provider, "GOOG,BADTICKERXYZ", LookupOptions::default()).await;

        assert_eq!(prices.len(), 2);
        assert_eq!(
            prices["GOOG"],
            PriceQuote {
                price: 170.13,
                currency: "USD".to_string()
            }
        );
        assert_eq!(prices["BADTICKERXYZ"], PriceQuote::unavailable());
    }

    #[tokio::test]
    async fn test_one_entry_per_ticker() {
        let provider = FakeProvider::default()
            .with_quote("GOOG", Some(170.0), Some("USD"))
            .with_quote("INFY.NS", Some(1550.75), Some("INR"));

        let prices =
            get_stock_prices(&provider, "GOOG,,INFY.NS, goog", LookupOptions::default()).await;

        let keys: Vec<_> = prices.keys().cloned().collect();
        assert_eq!(keys, vec!["GOOG", "INFY.NS"]);
        assert_eq!(provider.calls(), vec!["GOOG", "INFY.NS"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_daily_close() {
        let provider = FakeProvider::default()
            .with_quote("TCS.NS", None, Some("INR"))
            .with_close("TCS.NS", 3999.999)
            .with_quote("ODD", Some(0.0), None)
            .with_close("ODD", 12.346);

        let prices = get_stock_prices(&provider, "TCS.NS,ODD", LookupOptions::default()).await;

        assert_eq!(prices["TCS.NS"].price, 4000.0);
        assert_eq!(prices["TCS.NS"].currency, "INR");
        assert_eq!(prices["ODD"].price, 12.35);
        assert_eq!(prices["ODD"].currency, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_fallback_price_without_currency_is_resolved() {
        let provider = FakeProvider::default()
            .with_quote("ODD", None, None)
            .with_close("ODD", 12.346);

        let prices = get_stock_prices(&provider, "ODD", LookupOptions::default()).await;

        let quote = &prices["ODD"];
        assert_eq!(quote.price, 12.35);
        assert_eq!(quote.currency, NOT_AVAILABLE);
        assert!(quote.is_available());
        assert_eq!(
            narrate(&prices),
            vec!["The current stock price for ODD is 12.35 (currency N/A)."]
        );
        assert!(!PriceQuote::unavailable().is_available());
    }

    #[tokio::test]
    async fn test_fallback_disabled() {
        let provider = FakeProvider::default()
            .with_quote("TCS.NS", None, Some("INR"))
            .with_close("TCS.NS", 3999.0);

        let options = LookupOptions {
            history_fallback: false,
            ..LookupOptions::default()
        };
        let prices = get_stock_prices(&provider, "TCS.NS", options).await;

        assert_eq!(prices["TCS.NS"], PriceQuote::unavailable());
    }

    #[tokio::test]
    async fn test_no_history_gives_placeholder() {
        let provider = FakeProvider::default().with_quote("DELISTED", None, None);
        let prices = get_stock_prices(&provider, "DELISTED", LookupOptions::default()).await;
        assert_eq!(prices["DELISTED"], PriceQuote::unavailable());
    }

    #[test]
    fn test_json_shape() {
        let mut prices = StockPrices::new();
        prices.insert(
            "INFY.NS".to_string(),
            PriceQuote {
                price: 1550.75,
                currency: "INR".to_string(),
            },
        );
        prices.insert("BAD".to_string(), PriceQuote::unavailable());

        let json = serde_json::to_string(&prices).unwrap();
        assert_eq!(
            json,
            r#"{"BAD":{"price":0.0,"currency":"N/A"},"INFY.NS":{"price":1550.75,"currency":"INR"}}"#
        );
    }

    #[test]
    fn test_narrate() {
        let mut prices = StockPrices::new();
        prices.insert(
            "GOOG".to_string(),
            PriceQuote {
                price: 170.1,
                currency: "USD".to_string(),
            },
        );
        prices.insert(
            "INFY.NS".to_string(),
            PriceQuote {
                price: 1550.75,
                currency: "INR".to_string(),
            },
        );
        prices.insert(
            "SAP.DE".to_string(),
            PriceQuote {
                price: 180.0,
                currency: "CHF".to_string(),
            },
        );
        prices.insert("BAD".to_string(), PriceQuote::unavailable());

        assert_eq!(
            narrate(&prices),
            vec![
                "No current price could be found for BAD.",
                "The current stock price for GOOG is $170.10.",
                "The current stock price for INFY.NS is ₹1550.75.",
                "The current stock price for SAP.DE is 180.00 CHF.",
            ]
        );
    }
}
