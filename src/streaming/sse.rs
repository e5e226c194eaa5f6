use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::constants::{LOG_PREFIX_CONN, LOG_PREFIX_ERROR, LOG_PREFIX_SUCCESS, LOG_PREFIX_WARNING};
use crate::error::ApiError;
use crate::logging::log_timed;
use crate::streaming::chunks::StreamChunk;
use crate::streaming::decoder::{DecodedEvent, decode_record};
use crate::streaming::framer::SseFramer;

/// Lazy, single-pass sequence of chunks for one chat request.
///
/// Nothing is read from the byte source until the stream is polled. Dropping
/// the stream drops the byte source with it.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ApiError>> + Send>>;

static STREAM_COUNTER: AtomicU64 = AtomicU64::new(0);

pub(crate) fn next_stream_id() -> u64 {
    STREAM_COUNTER.fetch_add(1, Ordering::Relaxed) % 1_000_000
}

enum StreamEnd {
    Done,
    SourceExhausted,
    Cancelled,
}

/// Frames and decodes an SSE byte stream into [`StreamChunk`]s.
///
/// The sequence ends after `[DONE]` (bytes after it are never decoded), when
/// the source is exhausted, or when `cancellation_token` fires. An error
/// payload or a failed read ends it with `Err`.
pub fn chat_stream_from_bytes<S, E>(
    byte_stream: S,
    cancellation_token: Option<CancellationToken>,
) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ApiError> + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let stream_id = next_stream_id();
        let start_time = Instant::now();
        let token = cancellation_token.unwrap_or_default();
        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut framer = SseFramer::new();
        let mut chunk_count = 0u64;

        let end = 'stream_loop: loop {
            let next_read = tokio::select! {
                biased;
                _ = token.cancelled() => break 'stream_loop StreamEnd::Cancelled,
                read = byte_stream.next() => read,
            };

            let bytes = match next_read {
                Some(Ok(bytes)) => bytes,
                Some(Err(e)) => {
                    let err: ApiError = e.into();
                    log_timed(
                        LOG_PREFIX_ERROR,
                        &format!("stream [{}] read failed: {} | {} chunks", stream_id, err, chunk_count),
                        start_time,
                    );
                    yield Err(err);
                    return;
                }
                None => break 'stream_loop StreamEnd::SourceExhausted,
            };

            for record in framer.push(&bytes) {
                match decode_record(&record) {
                    Ok(DecodedEvent::Chunks(chunks)) => {
                        for chunk in chunks {
                            chunk_count += 1;
                            yield Ok(chunk);
                        }
                    }
                    Ok(DecodedEvent::Done(chunks)) => {
                        for chunk in chunks {
                            chunk_count += 1;
                            yield Ok(chunk);
                        }
                        break 'stream_loop StreamEnd::Done;
                    }
                    Err(err) => {
                        log_timed(
                            LOG_PREFIX_ERROR,
                            &format!("stream [{}] error payload: {} | {} chunks", stream_id, err, chunk_count),
                            start_time,
                        );
                        yield Err(err);
                        return;
                    }
                }
            }
        };

        match end {
            StreamEnd::Done => log_timed(
                LOG_PREFIX_SUCCESS,
                &format!("stream [{}] completed | {} chunks", stream_id, chunk_count),
                start_time,
            ),
            StreamEnd::SourceExhausted => {
                if framer.pending_len() > 0 {
                    log::debug!(
                        "stream [{}] discarding {} unterminated bytes",
                        stream_id,
                        framer.pending_len()
                    );
                }
                log_timed(
                    LOG_PREFIX_WARNING,
                    &format!("stream [{}] ended without [DONE] | {} chunks", stream_id, chunk_count),
                    start_time,
                );
            }
            StreamEnd::Cancelled => log_timed(
                LOG_PREFIX_CONN,
                &format!("stream [{}] cancelled | {} chunks", stream_id, chunk_count),
                start_time,
            ),
        }
    })
}
