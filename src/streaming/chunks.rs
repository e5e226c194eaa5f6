use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One typed item of a chat stream, in network arrival order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StreamChunk {
    Text(String),
    Metadata {
        trace_id: Option<String>,
        conversation_id: Option<String>,
    },
    Trace(TraceEvent),
}

impl StreamChunk {
    pub fn text(content: impl Into<String>) -> Self {
        StreamChunk::Text(content.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text(content) => Some(content),
            _ => None,
        }
    }
}

/// Agent activity reported by the server alongside the answer.
///
/// Every optional field is present on the struct whether or not the server
/// sent it, so consumers see one shape for all trace events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub ts: f64,
    #[serde(default)]
    pub agents: Option<Vec<String>>,
}

impl TraceEvent {
    /// Interprets `ts` as a unix epoch. Values too large to be seconds are
    /// taken as milliseconds.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if !self.ts.is_finite() || self.ts <= 0.0 {
            return None;
        }
        let millis = if self.ts >= 1e12 {
            self.ts
        } else {
            self.ts * 1000.0
        };
        DateTime::from_timestamp_millis(millis.round() as i64)
    }
}
