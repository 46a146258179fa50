//! OCR text normalization.
//!
//! Scanned exam documents come back from OCR with a predictable set of
//! defects: unicode dashes where the source had ASCII hyphens, table rules
//! read as `|` or `]`, and letter/digit confusions (`O`/`0`, `G`/`6`,
//! `B`/`8`, `l`/`1`) wherever a digit sits alone between spaces. The rules
//! here fix those without touching legitimate content, so the downstream
//! anchor scan sees clean digit runs.
//!
//! Rules run in a fixed order: glyph substitutions first, whitespace
//! collapse last, so single-character fixes see the original spacing.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Clean one page of raw OCR text.
///
/// Applied per page before pages are joined; the whitespace collapse means
/// a page's text always comes out as a single line.
pub fn clean_page_text(input: &str) -> String {
    let s = replace_unicode_dashes(input);
    let s = strip_table_rules(&s);
    let s = fix_confusable_digits(&s);
    collapse_whitespace(&s)
}

// ── Rule 1: Unicode dashes to ASCII hyphen ───────────────────────────────────

fn replace_unicode_dashes(input: &str) -> String {
    input.replace(['\u{2010}', '\u{2011}', '\u{2013}'], "-")
}

// ── Rule 2: Strip characters OCR invents from table rules ────────────────────

fn strip_table_rules(input: &str) -> String {
    input.replace(['|', ']'], "")
}

// ── Rule 3: Letter/digit confusions in isolated positions ────────────────────
//
// Only a letter standing alone between spaces is rewritten; letters inside
// words are left alone. The space-delimited patterns overlap, so each
// substitution runs on the output of the previous one.

fn fix_confusable_digits(input: &str) -> String {
    let s = input.replace(" O ", " 0 ");
    let s = s.replace(" G ", " 6 ");
    let s = s.replace(" B ", " 8 ");
    s.replace(" l ", " 1 ")
}

// ── Rule 4: Collapse all whitespace runs to single spaces ────────────────────

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").trim().to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
