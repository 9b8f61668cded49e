//! In-memory quote provider for tests.

use super::{FastInfo, QuoteProvider};
use crate::error::{CaramelError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Provider answering from fixed tables. Unknown tickers fail like a 404.
#[derive(Default)]
pub struct FakeProvider {
    fast: HashMap<String, FastInfo>,
    closes: HashMap<String, f64>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with_quote(mut self, ticker: &str, price: Option<f64>, currency: Option<&str>) -> Self {
        self.fast.insert(
            ticker.to_string(),
            FastInfo {
                last_price: price,
                currency: currency.map(str::to_string),
            },
        );
        self
    }

    pub fn with_close(mut self, ticker: &str, close: f64) -> Self {
        self.closes.insert(ticker.to_string(), close);
        self
    }

    /// Tickers passed to `fast_info`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteProvider for FakeProvider {
    async fn fast_info(&self, ticker: &str) -> Result<FastInfo> {
        self.calls.lock().unwrap().push(ticker.to_string());
        self.fast
            .get(ticker)
            .cloned()
            .ok_or_else(|| CaramelError::TickerNotFound(ticker.to_string()))
    }

    async fn last_close(&self, ticker: &str) -> Result<Option<f64>> {
        Ok(self.closes.get(ticker).copied())
    }
}
