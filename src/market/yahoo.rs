//! Yahoo Finance chart API client.

use super::{FastInfo, QuoteProvider};
use crate::config::MarketSettings;
use crate::error::{CaramelError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Quote provider backed by the `/v8/finance/chart` endpoint.
pub struct YahooQuoteProvider {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooQuoteProvider {
    /// Create a provider from market settings.
    pub fn new(settings: &MarketSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&settings.base_url)?,
        })
    }

    /// Build the chart URL for a ticker and history range.
    pub fn chart_url(&self, ticker: &str, range: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CaramelError::Config(format!("Invalid market base URL: {}", self.base_url)))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", "1d");
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn fetch_chart(&self, ticker: &str, range: &str) -> Result<ChartData> {
        let url = self.chart_url(ticker, range)?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Unknown symbols come back as 404 with a chart.error payload.
        match parse_chart(&body) {
            Ok(chart) => Ok(chart),
            Err(e) if status.is_success() => Err(e),
            Err(CaramelError::TickerNotFound(msg)) => Err(CaramelError::TickerNotFound(msg)),
            Err(_) => Err(CaramelError::MarketData(format!(
                "{} returned HTTP {}",
                ticker, status
            ))),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn fast_info(&self, ticker: &str) -> Result<FastInfo> {
        let chart = self.fetch_chart(ticker, "1d").await?;
        Ok(chart.fast_info())
    }

    async fn last_close(&self, ticker: &str) -> Result<Option<f64>> {
        let chart = self.fetch_chart(ticker, "5d").await?;
        Ok(chart.last_close())
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// One symbol's chart payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartData {
    pub meta: ChartMeta,
    #[serde(default)]
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteSeries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteSeries {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartData {
    /// Quick quote from the chart metadata.
    pub fn fast_info(&self) -> FastInfo {
        FastInfo {
            last_price: self.meta.regular_market_price,
            currency: self.meta.currency.clone(),
        }
    }

    /// Last non-null daily close.
    pub fn last_close(&self) -> Option<f64> {
        self.indicators
            .quote
            .first()
            .and_then(|q| q.close.iter().rev().find_map(|c| *c))
    }
}

/// Parse a chart response body.
pub fn parse_chart(body: &str) -> Result<ChartData> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(err) = envelope.chart.error {
        return Err(CaramelError::TickerNotFound(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| CaramelError::MarketData("Chart response has no result".to_string()))
}
