//! Candidate-name handling.
//!
//! The two sources spell names differently: the eligibility form collects
//! last/first/middle in separate fields, while the roster prints one
//! comma-separated string per candidate. Both are reduced to a single
//! canonical display form, `"Surname, Given Names"` in title case, and the
//! reconciliation match key is derived from that form — never from the raw
//! input — so the two sources agree whenever the underlying name does.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_KEY_STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s,]+").unwrap());

/// Title-case `input`: a letter is uppercased when the previous character is
/// non-alphabetic and lowercased otherwise. This keeps multi-word surnames
/// and hyphenated names (`ST. JOHN-BROWN` → `St. John-Brown`) readable.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_alphabetic = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(c);
            prev_alphabetic = false;
        }
    }
    out
}

/// Build the canonical display name from separate name fields.
///
/// Empty fields drop out; an empty surname drops the comma entirely.
pub fn compose_name(last: &str, first: &str, middle: &str) -> String {
    let last = last.trim().to_uppercase();
    let given = [first, middle]
        .iter()
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let full = if last.is_empty() {
        given
    } else {
        format!("{last}, {given}")
    };
    title_case(&full)
}

/// Build the canonical display name from a single free-form full name.
///
/// The final whitespace token is taken as the surname, the first as the
/// given name, anything in between as middle names. A single-token name
/// becomes a bare surname.
pub fn compose_from_full(full: &str) -> String {
    let tokens: Vec<&str> = full.split_whitespace().collect();
    match tokens.as_slice() {
        [] => String::new(),
        [only] => compose_name(only, "", ""),
        [first, middle @ .., last] => compose_name(last, first, &middle.join(" ")),
    }
}

/// Build the canonical display name from the roster's comma-separated form.
///
/// The first comma-delimited part is the surname, everything after it the
/// given names. Input without commas is title-cased as-is.
pub fn compose_from_comma_separated(raw: &str) -> String {
    let parts: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [] => title_case(raw.trim()),
        [surname, given @ ..] => title_case(&format!("{surname}, {}", given.join(" "))),
    }
}

/// The reconciliation match key for a canonical display name: whitespace
/// and commas removed, lowercased.
pub fn match_key(display_name: &str) -> String {
    RE_KEY_STRIP.replace_all(display_name, "").to_lowercase()
}
