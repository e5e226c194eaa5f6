use std::error::Error;
use std::fmt;

use crate::constants::ERROR_STREAM_FALLBACK;

/// Failure of a chat request: a non-2xx HTTP response, an error payload
/// inside the stream, or a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub message: String,
    /// The `type` field of an in-stream error payload, when present.
    pub error_type: Option<String>,
    kind: ApiErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ApiErrorKind {
    Http,
    Protocol,
    Network,
}

impl ApiError {
    pub fn http(status: u16, status_text: Option<&str>, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| match status_text {
            Some(text) => format!("HTTP {} {}", status, text),
            None => format!("HTTP {}", status),
        });
        Self {
            status: Some(status),
            status_text: status_text.map(str::to_string),
            message,
            error_type: None,
            kind: ApiErrorKind::Http,
        }
    }

    pub fn protocol(message: Option<&str>, error_type: Option<&str>) -> Self {
        let message = match message {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => ERROR_STREAM_FALLBACK.to_string(),
        };
        Self {
            status: None,
            status_text: None,
            message,
            error_type: error_type.map(str::to_string),
            kind: ApiErrorKind::Protocol,
        }
    }

    pub fn network(message: &str) -> Self {
        Self {
            status: None,
            status_text: None,
            message: message.to_string(),
            error_type: None,
            kind: ApiErrorKind::Network,
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Http)
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Protocol)
    }

    pub fn is_network(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Network)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "ApiError {}: {}", status, self.message),
            None => write!(f, "ApiError: {}", self.message),
        }
    }
}

impl Error for ApiError {}
