//! Chat model integration: messages and the provider boundary

pub mod client;
pub mod messages;

pub use client::{ChatModel, OpenAiCompatClient};
pub use messages::{ChatMessage, ChatResponse, MessageRole};
