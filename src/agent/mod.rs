//! Agent system for stock price questions with tool calling.
//!
//! Provides an LLM agent that decides when to call the `get_stock_prices`
//! tool and narrates the returned quotes as its final answer.

mod runner;
mod tools;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext, GET_STOCK_PRICES};
