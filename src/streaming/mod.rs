pub mod chunks;
pub mod decoder;
pub mod framer;
pub mod sse;

pub use chunks::{StreamChunk, TraceEvent};
pub use decoder::{DecodedEvent, decode_record};
pub use framer::SseFramer;
pub use sse::{ChunkStream, chat_stream_from_bytes};
