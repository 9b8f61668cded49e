//! Caramel - LLM chat, summarization and a stock price agent
//!
//! A small CLI that talks to a hosted model (Gemini or OpenAI) or a local
//! Ollama server through one OpenAI-compatible client.
//!
//! # Overview
//!
//! Caramel allows you to:
//! - Send a single prompt and print the answer
//! - Chat line by line until you type `quit`
//! - Summarize a text file
//! - Ask an agent for live stock prices, which it fetches with a tool call
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `openai` - Chat client factory for every provider
//! - `completion` - Single-turn completions (ask, chat, summarize)
//! - `market` - Market data provider and best-effort batch price lookup
//! - `agent` - Tool definitions and the tool-calling loop
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use caramel::market::{get_stock_prices, LookupOptions, YahooQuoteProvider};
//! use caramel::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let provider = YahooQuoteProvider::new(&settings.market)?;
//!
//!     let prices = get_stock_prices(&provider, "GOOG,INFY.NS", LookupOptions::default()).await;
//!     println!("{}", serde_json::to_string(&prices)?);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod market;
pub mod openai;

pub use error::{CaramelError, Result};
