//! Market data lookup for the stock price tool.
//!
//! A [`QuoteProvider`] answers two questions per ticker: the quick last-traded
//! quote and, as a fallback, the most recent daily close. [`get_stock_prices`]
//! runs a comma-separated batch through a provider without ever failing the batch.

#[cfg(test)]
pub(crate) mod fake;
mod lookup;
mod yahoo;

pub use lookup::{
    currency_symbol, get_stock_prices, narrate, parse_tickers, round_price, LookupOptions,
    PriceQuote, StockPrices, NOT_AVAILABLE,
};
pub use yahoo::{parse_chart, ChartData, ChartMeta, Indicators, QuoteSeries, YahooQuoteProvider};

use crate::error::Result;
use async_trait::async_trait;

/// Latest quote from the provider's quick lookup path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FastInfo {
    pub last_price: Option<f64>,
    pub currency: Option<String>,
}

/// Trait for market data providers.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Latest traded price and currency for a ticker.
    async fn fast_info(&self, ticker: &str) -> Result<FastInfo>;

    /// Most recent daily closing price, if any history exists.
    async fn last_close(&self, ticker: &str) -> Result<Option<f64>>;
}
