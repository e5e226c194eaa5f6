use futures_util::StreamExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::constants::{ACCEPT_SSE, CHAT_COMPLETIONS_PATH, CONTENT_TYPE_JSON};
use crate::error::ApiError;
use crate::http::error::map_reqwest_error;
use crate::http::request::ChatRequest;
use crate::logging::{log_request, log_request_body};
use crate::streaming::{ChunkStream, chat_stream_from_bytes};

/// Entry point for streamed chat completions against one server.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CHAT_COMPLETIONS_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Starts a chat request and returns its chunk sequence.
    ///
    /// The request is only sent once the stream is first polled. A non-2xx
    /// response surfaces as the first and only item.
    pub fn stream_chat(&self, request: ChatRequest) -> ChunkStream {
        self.stream_chat_inner(request, None)
    }

    /// Like [`ChatClient::stream_chat`], ending the sequence cleanly once
    /// `token` is cancelled.
    pub fn stream_chat_with_cancel(
        &self,
        request: ChatRequest,
        token: CancellationToken,
    ) -> ChunkStream {
        self.stream_chat_inner(request, Some(token))
    }

    fn stream_chat_inner(
        &self,
        request: ChatRequest,
        token: Option<CancellationToken>,
    ) -> ChunkStream {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        Box::pin(async_stream::stream! {
            let send_token = token.clone().unwrap_or_default();
            let response = tokio::select! {
                biased;
                _ = send_token.cancelled() => return,
                result = send_chat_request(&client, &endpoint, &request) => result,
            };

            let response = match response {
                Ok(response) => response,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };

            let mut chunks = chat_stream_from_bytes(response.bytes_stream(), token);
            while let Some(item) = chunks.next().await {
                yield item;
            }
        })
    }
}

/// Sends the request and checks the status before any body byte is read.
pub async fn send_chat_request(
    client: &reqwest::Client,
    endpoint: &str,
    request: &ChatRequest,
) -> Result<reqwest::Response, ApiError> {
    log_request("POST", endpoint, &request.model);
    if let Ok(body) = serde_json::to_value(request) {
        log_request_body(endpoint, &body);
    }

    let response = client
        .post(endpoint)
        .header("Content-Type", CONTENT_TYPE_JSON)
        .header("Accept", ACCEPT_SSE)
        .json(request)
        .send()
        .await
        .map_err(map_reqwest_error)?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = ApiError::http(
        status.as_u16(),
        status.canonical_reason(),
        error_message_from_body(&body),
    );
    log::error!("chat request rejected: {}", err);
    Err(err)
}

fn error_message_from_body(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    let message = match json.get("error") {
        Some(Value::Object(obj)) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
        Some(Value::String(message)) => Some(message.clone()),
        _ => None,
    };
    message.filter(|message| !message.trim().is_empty())
}
