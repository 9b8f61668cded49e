//! CLI command implementations.

mod agent;
mod ask;
mod chat;
mod config;
mod doctor;
mod stocks;
mod summarize;

pub use agent::run_agent;
pub use ask::run_ask;
pub use chat::{run_chat, ChatLoop};
pub use config::run_config;
pub use doctor::run_doctor;
pub use stocks::run_stocks;
pub use summarize::run_summarize;
