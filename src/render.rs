use crate::streaming::{StreamChunk, TraceEvent};
use crate::thinking::{ParsedContent, parse_thinking_content};

/// Everything received so far on one chat stream.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    text: String,
    trace_id: Option<String>,
    conversation_id: Option<String>,
    traces: Vec<TraceEvent>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one chunk in. Returns true when the answer text grew.
    pub fn push(&mut self, chunk: StreamChunk) -> bool {
        match chunk {
            StreamChunk::Text(content) => {
                self.text.push_str(&content);
                true
            }
            StreamChunk::Metadata {
                trace_id,
                conversation_id,
            } => {
                if trace_id.is_some() {
                    self.trace_id = trace_id;
                }
                if conversation_id.is_some() {
                    self.conversation_id = conversation_id;
                }
                false
            }
            StreamChunk::Trace(trace) => {
                self.traces.push(trace);
                false
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn traces(&self) -> &[TraceEvent] {
        &self.traces
    }

    pub fn parsed(&self) -> ParsedContent {
        parse_thinking_content(&self.text)
    }
}

/// Tracks how much visible text has already been shown to the user.
#[derive(Debug, Default)]
pub struct Disclosure {
    shown: String,
}

impl Disclosure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the part of `parsed.visible` not yet shown.
    ///
    /// When the visible text no longer extends what was shown (a tag opened
    /// after text was already printed) nothing is returned until it does again.
    pub fn advance(&mut self, parsed: &ParsedContent) -> Option<String> {
        let suffix = parsed.visible.strip_prefix(self.shown.as_str())?;
        if suffix.is_empty() {
            return None;
        }
        let suffix = suffix.to_string();
        self.shown.push_str(&suffix);
        Some(suffix)
    }

    pub fn shown(&self) -> &str {
        &self.shown
    }
}

#[cfg(test)]
mod render_tests {
    use super::{Disclosure, Transcript};
    use crate::streaming::{StreamChunk, TraceEvent};

    fn trace(event: &str) -> TraceEvent {
        TraceEvent {
            agent: Some("router".to_string()),
            event: event.to_string(),
            tool: None,
            ts: 1.0,
            agents: None,
        }
    }

    #[test]
    fn transcript_accumulates_text_and_metadata() {
        let mut transcript = Transcript::new();
        assert!(!transcript.push(StreamChunk::Metadata {
            trace_id: Some("t1".to_string()),
            conversation_id: None,
        }));
        assert!(!transcript.push(StreamChunk::Metadata {
            trace_id: None,
            conversation_id: Some("c1".to_string()),
        }));
        assert!(!transcript.push(StreamChunk::Trace(trace("start"))));
        assert!(transcript.push(StreamChunk::text("<think>plan</think>")));
        assert!(transcript.push(StreamChunk::text("Answer")));

        assert_eq!(transcript.trace_id(), Some("t1"));
        assert_eq!(transcript.conversation_id(), Some("c1"));
        assert_eq!(transcript.traces().len(), 1);
        let parsed = transcript.parsed();
        assert_eq!(parsed.visible, "Answer");
        assert_eq!(parsed.thinking, vec!["plan"]);
    }

    #[test]
    fn disclosure_reveals_only_new_visible_text() {
        let mut transcript = Transcript::new();
        let mut disclosure = Disclosure::new();
        let mut printed = Vec::new();

        for delta in ["<think>hm", "m</think>", "Hel", "lo ", "world"] {
            transcript.push(StreamChunk::text(delta));
            if let Some(fresh) = disclosure.advance(&transcript.parsed()) {
                printed.push(fresh);
            }
        }

        assert_eq!(printed, vec!["Hel", "lo", " world"]);
        assert_eq!(disclosure.shown(), "Hello world");
    }

    #[test]
    fn disclosure_waits_while_visible_text_diverges() {
        let mut transcript = Transcript::new();
        let mut disclosure = Disclosure::new();

        transcript.push(StreamChunk::text("Intro <thi"));
        assert_eq!(
            disclosure.advance(&transcript.parsed()).as_deref(),
            Some("Intro <thi")
        );

        transcript.push(StreamChunk::text("nk>pondering"));
        assert_eq!(disclosure.advance(&transcript.parsed()), None);
        assert!(transcript.parsed().is_thinking);
    }
}
