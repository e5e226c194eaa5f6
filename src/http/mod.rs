pub mod client;
pub mod error;
pub mod request;

pub use client::{ChatClient, send_chat_request};
pub use request::{ChatMessage, ChatRequest, Role};
