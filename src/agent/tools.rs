//! Tool definitions and implementations for the agent system.

use crate::error::{CaramelError, Result};
use crate::market::{get_stock_prices, parse_tickers, LookupOptions, QuoteProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name the stock price tool is exposed under.
pub const GET_STOCK_PRICES: &str = "get_stock_prices";

/// Available tools for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Look up current prices for a comma-separated list of tickers.
    GetStockPrices { tickers: String },
}

/// Tool execution context with access to the market data provider.
pub struct ToolContext {
    pub provider: Arc<dyn QuoteProvider>,
    pub options: LookupOptions,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(provider: Arc<dyn QuoteProvider>, options: LookupOptions) -> Self {
        Self { provider, options }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::GetStockPrices { tickers } => self.execute_get_stock_prices(tickers).await,
        }
    }

    async fn execute_get_stock_prices(&self, tickers: &str) -> Result<String> {
        if parse_tickers(tickers, self.options.uppercase).is_empty() {
            return Err(CaramelError::InvalidInput(
                "No ticker symbols given. Pass a comma-separated list such as 'GOOG,INFY.NS'."
                    .to_string(),
            ));
        }

        let prices = get_stock_prices(self.provider.as_ref(), tickers, self.options).await;
        Ok(serde_json::to_string(&prices)?)
    }
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    vec![ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: GET_STOCK_PRICES.to_string(),
            description: Some(
                "Fetches the current stock price and currency for a comma-separated string of \
                ticker symbols. For example, to get the price for Google and Infosys, the input \
                should be 'GOOG,INFY.NS'. Returns a JSON string where each ticker maps to an \
                object containing 'price' and 'currency'. Unknown tickers map to \
                {\"price\": 0.0, \"currency\": \"N/A\"}."
                    .to_string(),
            ),
            parameters: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "tickers": {
                        "type": "string",
                        "description": "Comma-separated ticker symbols, e.g. 'GOOG,INFY.NS'"
                    }
                },
                "required": ["tickers"]
            })),
            strict: None,
        },
    }]
}

/// Parse a tool call from the OpenAI response format.
///
/// Models sometimes send the ticker list as a JSON array or as a bare string
/// instead of an object; both are accepted.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    match name {
        GET_STOCK_PRICES => {
            let tickers = parse_tickers_argument(arguments)?;
            Ok(ToolCall::GetStockPrices { tickers })
        }
        _ => Err(CaramelError::Agent(format!("Unknown tool: {}", name))),
    }
}

fn parse_tickers_argument(arguments: &str) -> Result<String> {
    let args: serde_json::Value = match serde_json::from_str(arguments) {
        Ok(value) => value,
        Err(e) => {
            let bare = arguments.trim();
            if !bare.is_empty() && !bare.starts_with(['{', '[']) {
                return Ok(bare.to_string());
            }
            return Err(CaramelError::Agent(format!("Invalid tool arguments: {}", e)));
        }
    };

    let value = match &args {
        serde_json::Value::Object(map) => map
            .get("tickers")
            .ok_or_else(|| CaramelError::Agent("Missing 'tickers' argument".to_string()))?,
        other => other,
    };

    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Array(items) => {
            let symbols: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            if symbols.len() != items.len() {
                return Err(CaramelError::Agent(
                    "'tickers' array must contain only strings".to_string(),
                ));
            }
            Ok(symbols.join(","))
        }
        _ => Err(CaramelError::Agent(
            "'tickers' must be a comma-separated string".to_string(),
        )),
    }
}
