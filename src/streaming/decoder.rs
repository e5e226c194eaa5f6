use serde_json::Value;

use crate::constants::{
    PAYLOAD_TYPE_METADATA, PAYLOAD_TYPE_TRACE, SSE_DATA_FIELD, SSE_DONE_MESSAGE,
};
use crate::error::ApiError;
use crate::logging::sanitize_log_message;
use crate::streaming::chunks::{StreamChunk, TraceEvent};

/// Outcome of decoding one SSE record.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEvent {
    Chunks(Vec<StreamChunk>),
    /// `[DONE]` was seen; carries any chunks decoded before it in the same record.
    Done(Vec<StreamChunk>),
}

/// Decodes every `data:` line of a record in order.
///
/// Decoding stops at the first `[DONE]` or error payload; lines after it are
/// never looked at.
pub fn decode_record(record: &str) -> Result<DecodedEvent, ApiError> {
    let mut chunks = Vec::new();

    for line in record.split('\n') {
        let Some(payload) = extract_data_payload(line) else {
            continue;
        };
        match decode_payload(payload)? {
            PayloadOutcome::Done => return Ok(DecodedEvent::Done(chunks)),
            PayloadOutcome::Chunk(chunk) => chunks.push(chunk),
            PayloadOutcome::Skip => {}
        }
    }

    Ok(DecodedEvent::Chunks(chunks))
}

#[derive(Debug, PartialEq)]
pub(crate) enum PayloadOutcome {
    Chunk(StreamChunk),
    Done,
    Skip,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.strip_prefix(SSE_DATA_FIELD)
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}

pub(crate) fn decode_payload(payload: &str) -> Result<PayloadOutcome, ApiError> {
    if payload.trim() == SSE_DONE_MESSAGE {
        return Ok(PayloadOutcome::Done);
    }

    let json = match serde_json::from_str::<Value>(payload) {
        Ok(json) => json,
        Err(e) => {
            log::warn!(
                "SSE parsing error (record skipped): {}: {}",
                e,
                sanitize_log_message(payload)
            );
            return Ok(PayloadOutcome::Skip);
        }
    };

    if let Some(error) = json.get("error").filter(|value| !value.is_null()) {
        return Err(error_from_payload(error));
    }

    let payload_type = json.get("type").and_then(Value::as_str).map(str::to_string);
    match payload_type.as_deref() {
        Some(PAYLOAD_TYPE_METADATA) => Ok(PayloadOutcome::Chunk(metadata_from_payload(&json))),
        Some(PAYLOAD_TYPE_TRACE) => Ok(decode_typed::<TraceEvent>(json)
            .map(|trace| PayloadOutcome::Chunk(StreamChunk::Trace(trace)))
            .unwrap_or(PayloadOutcome::Skip)),
        _ => Ok(extract_delta_content(&json)
            .map(|content| PayloadOutcome::Chunk(StreamChunk::text(content)))
            .unwrap_or(PayloadOutcome::Skip)),
    }
}

fn decode_typed<T: serde::de::DeserializeOwned>(json: Value) -> Option<T> {
    match serde_json::from_value(json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("SSE payload has unexpected shape (record skipped): {}", e);
            None
        }
    }
}

/// Each field is read on its own; one of the wrong type becomes `None`
/// without losing the other.
fn metadata_from_payload(json: &Value) -> StreamChunk {
    let field = |name: &str| json.get(name).and_then(Value::as_str).map(str::to_string);
    StreamChunk::Metadata {
        trace_id: field("trace_id"),
        conversation_id: field("conversation_id"),
    }
}

fn extract_delta_content(json: &Value) -> Option<&str> {
    json.get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
}

fn error_from_payload(error: &Value) -> ApiError {
    match error {
        Value::String(message) => ApiError::protocol(Some(message.as_str()), None),
        Value::Object(obj) => ApiError::protocol(
            obj.get("message").and_then(Value::as_str),
            obj.get("type").and_then(Value::as_str),
        ),
        _ => ApiError::protocol(None, None),
    }
}
