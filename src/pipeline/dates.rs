//! Date-of-birth normalization.
//!
//! Eligibility submissions and OCR'd rosters write dates every way
//! imaginable: ISO, day-first, month-first, spelled-out months with and
//! without commas. Everything downstream keys on the date as text, so all
//! of it is funnelled into a single canonical `dd/mm/yyyy` form here.
//!
//! Ambiguous all-numeric dates are resolved day-first; the source domain is
//! day-first and the month-first format is only tried after the day-first
//! ones fail. A string no format matches is `None`, and the caller decides
//! whether that skips the record or rejects the block.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Unambiguous numeric formats, tried first. Order matters: day-first wins
/// for strings like `05/04/2009`.
const NUMERIC_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y"];

/// Textual-month formats, tried after the numeric ones.
const TEXTUAL_FORMATS: &[&str] = &[
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%b-%d-%Y",
    "%B-%d-%Y",
    "%d %b, %Y",
    "%d %B, %Y",
];

static RE_NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{2}/\d{2}/\d{4}\b").unwrap());

/// Parse a free-form date of birth into canonical `dd/mm/yyyy`.
///
/// Returns `None` when no known format matches. As a last resort, a
/// `dd/mm/yyyy`-shaped substring embedded in surrounding text is accepted
/// verbatim; OCR sometimes fuses a date with a neighbouring token.
pub fn normalize_dob(input: &str) -> Option<String> {
    let cleaned = input.trim().replace('.', "");
    if cleaned.is_empty() {
        return None;
    }

    for format in NUMERIC_FORMATS.iter().chain(TEXTUAL_FORMATS) {
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(date.format("%d/%m/%Y").to_string());
        }
    }

    RE_NUMERIC_DATE
        .find(&cleaned)
        .map(|m| m.as_str().to_string())
}
