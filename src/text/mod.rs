//! # Line Wrapping
//!
//! Greedy word wrapping driven by real font metrics.
//!
//! Findings text is plain prose: tokens split on whitespace, packed
//! left-to-right into lines that stay inside the writable column width. A
//! single token wider than the column is emitted alone on its own line — no
//! hyphenation, no infinite loop on pathological input.

use crate::font::StandardFont;

/// Wrap `text` into lines no wider than `max_width` points.
///
/// Candidate lines are measured with a single space separator between tokens.
/// Empty (or all-whitespace) input produces zero lines, not one empty line.
/// This is a total function: any input yields some line sequence, and the
/// concatenation of the output tokens equals the input token sequence.
pub fn wrap(text: &str, font: StandardFont, size: f64, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for token in text.split_whitespace() {
        if current.is_empty() {
            // An oversized first token still gets its own line; closing it
            // here keeps the loop advancing.
            current.push_str(token);
            continue;
        }

        let candidate_width =
            font.measure(&current, size) + font.measure(" ", size) + font.measure(token, size);
        if candidate_width <= max_width {
            current.push(' ');
            current.push_str(token);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(token);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
