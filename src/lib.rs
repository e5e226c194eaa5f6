//! Streaming chat completions client.
//!
//! [`ChatClient`] posts a chat request and exposes the server-sent event
//! response as a lazy stream of [`StreamChunk`]s. [`parse_thinking_content`]
//! splits reasoning blocks out of the accumulated answer text.

pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod logging;
pub mod render;
pub mod streaming;
pub mod thinking;

pub use error::ApiError;
pub use http::{ChatClient, ChatMessage, ChatRequest, Role};
pub use render::{Disclosure, Transcript};
pub use streaming::{ChunkStream, StreamChunk, TraceEvent, chat_stream_from_bytes};
pub use thinking::{ParsedContent, parse_thinking_content};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
