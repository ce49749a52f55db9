//! AI module
//!
//! Outbound chat-completion calls and parsing of the JSON the model returns.

mod client;
mod extract;
pub mod prompts;

pub use client::{ChatCompletionClient, LlmClient};
#[cfg(test)]
pub use client::MockLlmClient;
pub use extract::extract_json_block;
