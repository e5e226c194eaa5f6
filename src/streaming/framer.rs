use crate::config::get_runtime_config;
use crate::constants::{MAX_INITIAL_BUFFER_CAPACITY, SSE_MESSAGE_BOUNDARY};
use crate::logging::sanitize_log_message;

/// Reassembles SSE event records from arbitrarily split reads.
///
/// Bytes are buffered until a `"\n\n"` boundary is seen; each record is the
/// text before the boundary. The boundary itself may straddle two reads.
pub struct SseFramer {
    buffer: Vec<u8>,
    scan_from: usize,
}

impl SseFramer {
    pub fn new() -> Self {
        let capacity = get_runtime_config()
            .max_buffer_size
            .min(MAX_INITIAL_BUFFER_CAPACITY);
        Self::with_capacity(capacity)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            scan_from: 0,
        }
    }

    /// Appends one read and returns every record it completed, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut records = Vec::new();
        while let Some(boundary_pos) = self.find_boundary() {
            let record = record_to_string(&self.buffer[..boundary_pos]);
            self.buffer.drain(..boundary_pos + SSE_MESSAGE_BOUNDARY.len());
            self.scan_from = 0;
            records.push(record);
        }

        // resume one byte early so a boundary split across reads is found
        self.scan_from = self
            .buffer
            .len()
            .saturating_sub(SSE_MESSAGE_BOUNDARY.len() - 1);
        records
    }

    /// Bytes held that are not yet terminated by a boundary.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    fn find_boundary(&self) -> Option<usize> {
        self.buffer[self.scan_from..]
            .windows(SSE_MESSAGE_BOUNDARY.len())
            .position(|window| window == SSE_MESSAGE_BOUNDARY)
            .map(|offset| self.scan_from + offset)
    }
}

impl Default for SseFramer {
    fn default() -> Self {
        Self::new()
    }
}

fn record_to_string(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            let lossy = String::from_utf8_lossy(bytes).into_owned();
            log::warn!(
                "invalid UTF-8 in SSE record ({}): {}",
                e,
                sanitize_log_message(&lossy)
            );
            lossy
        }
    }
}

#[cfg(test)]
mod framer_tests {
    use super::SseFramer;

    #[test]
    fn emits_multiple_records_from_one_read() {
        let mut framer = SseFramer::with_capacity(64);
        let records = framer.push(b"data: one\n\ndata: two\n\ndata: three\n\n");
        assert_eq!(records, vec!["data: one", "data: two", "data: three"]);
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn holds_partial_record_until_boundary() {
        let mut framer = SseFramer::with_capacity(64);
        assert!(framer.push(b"data: hel").is_empty());
        assert!(framer.push(b"lo").is_empty());
        assert_eq!(framer.pending_len(), 11);
        assert_eq!(framer.push(b"\n\n"), vec!["data: hello"]);
    }

    #[test]
    fn reassembles_boundary_split_across_reads() {
        let mut framer = SseFramer::with_capacity(64);
        assert!(framer.push(b"data: a\n").is_empty());
        assert_eq!(framer.push(b"\ndata: b\n"), vec!["data: a"]);
        assert_eq!(framer.push(b"\n"), vec!["data: b"]);
    }

    #[test]
    fn every_split_point_yields_the_same_record() {
        let payload = b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\n";
        for split in 0..=payload.len() {
            let mut framer = SseFramer::with_capacity(8);
            let mut records = framer.push(&payload[..split]);
            records.extend(framer.push(&payload[split..]));
            assert_eq!(records.len(), 1, "split at {}", split);
            assert_eq!(records[0].as_bytes(), &payload[..payload.len() - 2]);
        }
    }

    #[test]
    fn reassembles_multibyte_character_split_across_reads() {
        let text = "data: héllo\n\n".as_bytes();
        let split = text.iter().position(|b| *b > 0x7f).unwrap() + 1;
        let mut framer = SseFramer::with_capacity(8);
        assert!(framer.push(&text[..split]).is_empty());
        assert_eq!(framer.push(&text[split..]), vec!["data: héllo"]);
    }

    #[test]
    fn keeps_unterminated_tail_pending() {
        let mut framer = SseFramer::with_capacity(8);
        assert_eq!(framer.push(b"data: done\n\ndata: tail"), vec!["data: done"]);
        assert_eq!(framer.pending_len(), "data: tail".len());
    }

    #[test]
    fn invalid_utf8_record_is_decoded_lossily() {
        let mut framer = SseFramer::with_capacity(8);
        let records = framer.push(b"data: \xff\xfe\n\n");
        assert_eq!(records.len(), 1);
        assert!(records[0].starts_with("data: "));
        assert!(records[0].contains('\u{FFFD}'));
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn blank_records_are_still_emitted() {
        let mut framer = SseFramer::with_capacity(8);
        assert_eq!(framer.push(b"\n\n\n\n"), vec!["", ""]);
    }
}
