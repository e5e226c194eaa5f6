//! Separates reasoning blocks from the visible answer in accumulated model
//! output.
//!
//! Recognized tags are `think`, `thinking`, `reasoning`, `thought` and
//! `reflection`, matched ASCII case-insensitively. The parser keeps no state: call
//! it again each time the accumulated text grows.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedContent {
    pub visible: String,
    /// Trimmed, non-empty block contents in order of appearance.
    pub thinking: Vec<String>,
    /// The text ends inside an unclosed thinking block.
    pub is_thinking: bool,
}

fn open_tag_regex() -> &'static Regex {
    static OPEN_TAG: OnceLock<Regex> = OnceLock::new();
    OPEN_TAG.get_or_init(|| {
        Regex::new(r"(?i-u)<(think|thinking|reasoning|thought|reflection)>")
            .unwrap_or_else(|e| panic!("invalid thinking tag pattern: {}", e))
    })
}

/// Splits `text` into visible text and thinking blocks.
///
/// Each block runs from an opening tag to the nearest closing tag of the same
/// name. An opening tag with no closing tag and no closed block after it runs
/// to the end of the text and sets `is_thinking`. Removed spans leave the
/// surrounding text untouched apart from trimming both ends of the result.
///
/// An unclosed opening tag followed by a closed block is left in `visible`
/// as literal text, so `visible` may still start with something tag-shaped
/// (`"<think>a <reasoning>b</reasoning>"` gives a visible `"<think>a"`).
pub fn parse_thinking_content(text: &str) -> ParsedContent {
    if text.is_empty() {
        return ParsedContent::default();
    }

    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let mut removed: Vec<(usize, usize)> = Vec::new();
    let mut thinking = Vec::new();
    let mut unclosed: Option<(usize, usize)> = None;
    // names with no closing tag left past the current position
    let mut exhausted: Vec<String> = Vec::new();
    let mut pos = 0;

    while let Some(captures) = open_tag_regex().captures_at(text, pos) {
        let (Some(open), Some(name)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        let name = name.as_str().to_ascii_lowercase();
        let close_tag = format!("</{}>", name);

        let close = if exhausted.contains(&name) {
            None
        } else {
            lowered[open.end()..].find(&close_tag)
        };

        match close {
            Some(offset) => {
                let content_end = open.end() + offset;
                push_block(&mut thinking, &text[open.end()..content_end]);
                removed.push((open.start(), content_end + close_tag.len()));
                unclosed = None;
                pos = content_end + close_tag.len();
            }
            None => {
                if !exhausted.contains(&name) {
                    exhausted.push(name);
                }
                if unclosed.is_none() {
                    unclosed = Some((open.start(), open.end()));
                }
                pos = open.end();
            }
        }
    }

    if let Some((open_start, content_start)) = unclosed {
        push_block(&mut thinking, &text[content_start..]);
        removed.push((open_start, text.len()));
    }

    let mut visible = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in removed {
        visible.push_str(&text[cursor..start]);
        cursor = end;
    }
    visible.push_str(&text[cursor..]);

    ParsedContent {
        visible: visible.trim().to_string(),
        thinking,
        is_thinking: unclosed.is_some(),
    }
}

fn push_block(thinking: &mut Vec<String>, content: &str) {
    let trimmed = content.trim();
    if !trimmed.is_empty() {
        thinking.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod thinking_tests {
    use std::time::{Duration, Instant};

    use super::{ParsedContent, parse_thinking_content};

    fn parsed(visible: &str, thinking: &[&str], is_thinking: bool) -> ParsedContent {
        ParsedContent {
            visible: visible.to_string(),
            thinking: thinking.iter().map(|s| s.to_string()).collect(),
            is_thinking,
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_thinking_content(""), parsed("", &[], false));
    }

    #[test]
    fn unclosed_block_is_in_progress() {
        assert_eq!(
            parse_thinking_content("<think>reasoning in progress"),
            parsed("", &["reasoning in progress"], true)
        );
    }

    #[test]
    fn closed_block_is_separated() {
        assert_eq!(
            parse_thinking_content("<think>done</think>Result."),
            parsed("Result.", &["done"], false)
        );
    }

    #[test]
    fn empty_block_is_dropped_but_stripped() {
        assert_eq!(
            parse_thinking_content("<think></think>Result."),
            parsed("Result.", &[], false)
        );
        assert_eq!(
            parse_thinking_content("<think>  \n </think>Result."),
            parsed("Result.", &[], false)
        );
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(
            parse_thinking_content("  just an answer  "),
            parsed("just an answer", &[], false)
        );
    }

    #[test]
    fn reparsing_visible_text_is_idempotent() {
        let first = parse_thinking_content(
            "<thinking>plan</thinking>Intro.\n\n<reasoning>more</reasoning>  Body <b>bold</b>",
        );
        assert_eq!(first.visible, "Intro.\n\n  Body <b>bold</b>");
        let second = parse_thinking_content(&first.visible);
        assert_eq!(second, parsed(&first.visible, &[], false));
    }

    #[test]
    fn all_tag_names_case_insensitive() {
        let text = "<THINK>a</think><Thinking>b</THINKING><reasoning>c</Reasoning><thought>d</thought><REFLECTION>e</reflection>ok";
        assert_eq!(
            parse_thinking_content(text),
            parsed("ok", &["a", "b", "c", "d", "e"], false)
        );
    }

    #[test]
    fn blocks_are_matched_lazily() {
        assert_eq!(
            parse_thinking_content("<think>one</think>mid<think>two</think>end"),
            parsed("midend", &["one", "two"], false)
        );
    }

    #[test]
    fn internal_whitespace_is_preserved() {
        assert_eq!(
            parse_thinking_content("Before <think>x</think> after"),
            parsed("Before  after", &["x"], false)
        );
    }

    #[test]
    fn closed_then_open_block_is_thinking() {
        assert_eq!(
            parse_thinking_content("<think>first</think>Answer so far <reflection>checking"),
            parsed("Answer so far", &["first", "checking"], true)
        );
    }

    #[test]
    fn final_closed_block_clears_thinking_flag() {
        let result = parse_thinking_content("<think>a</think>x<thought>b</thought>");
        assert!(!result.is_thinking);
        assert_eq!(result.visible, "x");
    }

    #[test]
    fn mismatched_close_does_not_end_block() {
        assert_eq!(
            parse_thinking_content("<think>still going</reasoning>"),
            parsed("", &["still going</reasoning>"], true)
        );
    }

    #[test]
    fn unrelated_markup_is_untouched() {
        assert_eq!(
            parse_thinking_content("Use <div> and <thinker> tags </think> freely"),
            parsed("Use <div> and <thinker> tags </think> freely", &[], false)
        );
    }

    #[test]
    fn partial_opening_tag_stays_visible() {
        assert_eq!(
            parse_thinking_content("Hello <thi"),
            parsed("Hello <thi", &[], false)
        );
    }

    #[test]
    fn many_unclosed_openers_parse_in_linear_time() {
        let text = "<think>".repeat(20_000);
        let start = Instant::now();
        let result = parse_thinking_content(&text);
        assert!(
            start.elapsed() < Duration::from_secs(2),
            "took {:?}",
            start.elapsed()
        );
        assert_eq!(result.visible, "");
        assert_eq!(result.thinking.len(), 1);
        assert!(result.is_thinking);
    }

    #[test]
    fn exhausted_name_does_not_block_other_names() {
        assert_eq!(
            parse_thinking_content("<think>a<think>b<reasoning>c</reasoning>d"),
            parsed("<think>a<think>bd", &["c"], false)
        );
    }

    #[test]
    fn unicode_case_folds_are_not_tags() {
        let text = "a <thin\u{212A}>x</thin\u{212A}> b <rea\u{17F}oning>y";
        assert_eq!(parse_thinking_content(text), parsed(text, &[], false));
    }

    #[test]
    fn non_ascii_content_keeps_boundaries() {
        assert_eq!(
            parse_thinking_content("<think>ÄÖÜ überlegt</think>Grüße"),
            parsed("Grüße", &["ÄÖÜ überlegt"], false)
        );
    }
}
