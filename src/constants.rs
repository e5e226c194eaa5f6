/// Chat completions endpoint, relative to the configured base URL
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Request headers
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const ACCEPT_SSE: &str = "text/event-stream";

/// Error messages
pub const ERROR_STREAM_FALLBACK: &str = "stream error";
pub const ERROR_SERVER_UNAVAILABLE: &str = "chat server not available";
pub const ERROR_TIMEOUT: &str = "request timed out";

/// SSE parsing constants
pub const SSE_DATA_FIELD: &str = "data:";
pub const SSE_DONE_MESSAGE: &str = "[DONE]";
pub const SSE_MESSAGE_BOUNDARY: &[u8] = b"\n\n";

/// Payload discriminators for non-completion events
pub const PAYLOAD_TYPE_METADATA: &str = "metadata";
pub const PAYLOAD_TYPE_TRACE: &str = "trace";

/// Upper bound for the framer's initial buffer allocation (bytes)
pub const MAX_INITIAL_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Logging prefixes
pub const LOG_PREFIX_SUCCESS: &str = "✅";
pub const LOG_PREFIX_ERROR: &str = "❌";
pub const LOG_PREFIX_WARNING: &str = "⚠️";
pub const LOG_PREFIX_CONN: &str = "↔️";
