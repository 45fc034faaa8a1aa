//! Inline markdown annotation.
//!
//! The annotator scans one logical line at a time, tags the characters each
//! formatting construct encloses with style flags, and strips the marker
//! characters, leaving a positionally consistent styled-text sequence for
//! display. Lines must already be sanitized (see [`crate::sanitize`]); the
//! rules assume at most one heading or list prefix and no internal line
//! breaks.

pub mod buffer;
pub mod rules;

pub use buffer::{StyleFlags, StyledChar, StyledLine};
pub use rules::Rule;

use crate::sanitize;

/// Appended before rule matching so closing delimiters at the true end of the
/// line still satisfy their trailing-character lookahead.
const SENTINEL: char = ' ';

/// Annotates one logical line.
///
/// This is the supported entry point: it appends a sentinel character,
/// applies every rule in [`Rule::ORDER`], and drops the sentinel's element
/// from the result. Feeding a line to the rules without the sentinel misses
/// any span that touches the end of the line.
pub fn annotate(line: &str) -> StyledLine {
    let mut text = String::with_capacity(line.len() + 1);
    text.push_str(line);
    text.push(SENTINEL);

    let mut buf = StyledLine::from_text(&text);
    for rule in Rule::ORDER {
        buf = rule.apply(buf);
    }
    buf.drop_last();
    buf
}

/// Sanitizes a whole article and annotates each logical line.
pub fn annotate_document(content: &str) -> Vec<StyledLine> {
    sanitize::sanitize(content)
        .iter()
        .map(|line| annotate(line))
        .collect()
}
