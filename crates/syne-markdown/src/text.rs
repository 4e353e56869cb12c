//! Plain-text views of Markdown: extraction, summaries and reading time.

use comrak::arena_tree::NodeEdge;
use comrak::nodes::NodeValue;
use comrak::{parse_document, Arena};
use unicode_segmentation::UnicodeSegmentation;

use crate::markdown::comrak_options;

pub const DEFAULT_SUMMARY_LENGTH: usize = 200;
pub const DEFAULT_WORDS_PER_MINUTE: usize = 300;
pub const ELLIPSIS: &str = "...";

/// Text content of the rendered document with all markup removed.
/// Block elements end with a newline; the result is trimmed.
pub fn extract_plain_text(src: &str) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, src, &comrak_options());
    let mut out = String::new();

    for edge in root.traverse() {
        match edge {
            NodeEdge::Start(node) => match node.data.borrow().value {
                NodeValue::Text(ref text) => out.push_str(text),
                NodeValue::Code(ref code) => out.push_str(&code.literal),
                NodeValue::CodeBlock(ref block) => out.push_str(&block.literal),
                NodeValue::SoftBreak | NodeValue::LineBreak => out.push('\n'),
                _ => {}
            },
            NodeEdge::End(node) => {
                if node.data.borrow().value.block() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
        }
    }

    out.trim().to_string()
}

/// Cuts `text` after `max_chars` grapheme clusters and appends `suffix`.
/// Text that already fits is returned unchanged.
pub fn truncate(text: &str, max_chars: usize, suffix: &str) -> String {
    match text.grapheme_indices(true).nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], suffix),
        None => text.to_string(),
    }
}

pub fn summary(src: &str, max_chars: usize) -> String {
    truncate(&extract_plain_text(src), max_chars, ELLIPSIS)
}

/// Word count by Unicode word boundaries; ideographs count one each.
pub fn word_count(text: &str) -> usize {
    text.unicode_words().count()
}

/// Whole minutes needed to read the document, rounded up.
pub fn reading_time(src: &str, words_per_minute: usize) -> usize {
    let wpm = if words_per_minute == 0 {
        DEFAULT_WORDS_PER_MINUTE
    } else {
        words_per_minute
    };
    word_count(&extract_plain_text(src)).div_ceil(wpm)
}
