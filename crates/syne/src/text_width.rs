//! Display-width helpers for terminal columns.
//!
//! Widths are measured per grapheme cluster so CJK text, combining marks and
//! emoji sequences line up in the listing tables.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

/// Terminal columns occupied by `text`.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Columns occupied by one grapheme cluster.
pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.chars().all(|c| c.is_control()) {
        return 0;
    }

    let mut chars = grapheme.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return 0,
    };

    // ZWJ sequences and emoji with a presentation selector render as one
    // wide glyph.
    if grapheme.chars().any(|c| c == '\u{200D}' || c == '\u{FE0F}') {
        return 2;
    }

    first.width().unwrap_or(1)
}

/// Pads `text` with spaces on the right to `width` columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let current = display_width(text);
    if current >= width {
        return text.to_string();
    }
    let mut padded = String::with_capacity(text.len() + width - current);
    padded.push_str(text);
    padded.extend(std::iter::repeat(' ').take(width - current));
    padded
}

/// Cuts `text` to at most `max_width` columns, ending with `…` when cut.
/// A wide glyph that would straddle the limit is dropped whole.
pub fn fit_to_width(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in text.graphemes(true) {
        let w = grapheme_width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push('…');
    out
}

/// Breaks `text` into lines no wider than `max_width`, preferring spaces and
/// falling back to grapheme boundaries for unbroken runs such as CJK text.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split_word_bounds() {
            let word_width = display_width(word);

            if line_width + word_width <= max_width {
                line.push_str(word);
                line_width += word_width;
                continue;
            }

            if !line.trim().is_empty() {
                lines.push(line.trim_end().to_string());
            }
            line = String::new();
            line_width = 0;

            if word.trim().is_empty() {
                continue;
            }

            for g in word.graphemes(true) {
                let w = grapheme_width(g);
                if line_width + w > max_width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push_str(g);
                line_width += w;
            }
        }

        lines.push(line.trim_end().to_string());
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
