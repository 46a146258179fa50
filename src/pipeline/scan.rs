//! Anchor discovery.
//!
//! Both document extractors segment their input the same way: find every
//! occurrence of a fixed-width numeric identifier (6 digits for centre
//! codes, 10 for candidate numbers) and treat the text between consecutive
//! identifiers as one record's payload.
//!
//! An anchor is a *maximal* digit run of exactly the requested width. The
//! maximality requirement matters: a 7-digit run contains a 6-digit
//! substring, but that substring is part of a longer number and must not
//! anchor a record. Word boundaries are not enough either — OCR routinely
//! glues a code to the following name (`123456John`), which a `\b`-based
//! pattern would miss.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// One fixed-width identifier found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor<'a> {
    /// The identifier itself.
    pub text: &'a str,
    /// Byte offset of the first digit.
    pub start: usize,
    /// Byte offset one past the last digit.
    pub end: usize,
}

/// Find every maximal digit run of exactly `width` digits, in document order.
pub fn find_anchors(text: &str, width: usize) -> Vec<Anchor<'_>> {
    RE_DIGIT_RUN
        .find_iter(text)
        .filter(|m| m.as_str().len() == width)
        .map(|m| Anchor {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Segment `text` into per-anchor blocks.
///
/// Each block runs from the start of its anchor to the start of the next
/// anchor (or end of text for the last one). Returns the anchor together
/// with the block slice.
pub fn anchored_blocks<'a>(text: &'a str, width: usize) -> Vec<(Anchor<'a>, &'a str)> {
    let anchors = find_anchors(text, width);
    let mut blocks = Vec::with_capacity(anchors.len());
    for (i, anchor) in anchors.iter().enumerate() {
        let block_end = anchors
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(text.len());
        blocks.push((anchor.clone(), &text[anchor.start..block_end]));
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_width_runs() {
        let anchors = find_anchors("code 123456 and 654321 end", 6);
        let texts: Vec<_> = anchors.iter().map(|a| a.text).collect();
        assert_eq!(texts, ["123456", "654321"]);
    }

    #[test]
    fn longer_runs_are_not_anchors() {
        assert!(find_anchors("1234567", 6).is_empty());
        assert!(find_anchors("12345", 6).is_empty());
    }

    #[test]
    fn adjacent_letters_do_not_block_an_anchor() {
        let anchors = find_anchors("123456John District789012Jane", 6);
        let texts: Vec<_> = anchors.iter().map(|a| a.text).collect();
        assert_eq!(texts, ["123456", "789012"]);
    }

    #[test]
    fn blocks_run_to_the_next_anchor() {
        let text = "123456 Alpha School 654321 Beta College";
        let blocks = anchored_blocks(text, 6);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].1, "123456 Alpha School ");
        assert_eq!(blocks[1].1, "654321 Beta College");
    }

    #[test]
    fn no_anchors_no_blocks() {
        assert!(anchored_blocks("nothing numeric here", 10).is_empty());
    }
}
