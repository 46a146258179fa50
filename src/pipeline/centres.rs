//! Centre-list extraction.
//!
//! The centre list document interleaves 6-digit centre codes with centre
//! names and surrounding area text, and OCR merges its lines freely. The
//! extractor anchors on the codes and treats the text up to the next code
//! as the raw name, then cleans it: stray digits go, a couple of known OCR
//! misreads are fixed, and the name is cut off at the first institutional
//! suffix so trailing area names do not leak in.
//!
//! A document with no anchors yields an empty directory with a warning
//! rather than an error; whether an empty directory is fatal depends on
//! whether the run uses one at all, and that is the orchestrator's call.

use crate::model::{CentreDirectory, DocumentText, CENTRE_CODE_LEN};
use crate::pipeline::scan;
use crate::report::ReportSink;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Institutional suffixes that end a centre name, tried in order; the
/// first one present wins. Longer variants come before their prefixes.
const NAME_ENDINGS: &[&str] = &[
    "Secondary School",
    "Secondary",
    "College",
    "Campus",
    "High School",
    "School",
];

/// Extract the centre code → name directory from a centre list document.
pub fn parse_centre_list(text: &DocumentText, sink: &dyn ReportSink) -> CentreDirectory {
    let mut centres = CentreDirectory::new();
    let anchors = scan::find_anchors(text.as_str(), CENTRE_CODE_LEN);
    if anchors.is_empty() {
        warn!("no centre-code anchors in centre list");
        sink.report("Warning: No 6-digit centre codes found in the centre list document.");
        return centres;
    }

    for (i, anchor) in anchors.iter().enumerate() {
        let name_end = anchors
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(text.as_str().len());
        let name_raw = &text.as_str()[anchor.end..name_end];

        let name = clean_centre_name(name_raw);
        if !name.is_empty() {
            debug!(code = anchor.text, name = %name, "parsed centre");
            centres.insert(anchor.text, name);
        }
    }

    if centres.is_empty() {
        sink.report("Warning: No centres parsed from the centre list document.");
    } else {
        sink.report(&format!("Centres parsed: {}", centres.len()));
    }
    centres
}

fn clean_centre_name(raw: &str) -> String {
    let cleaned = RE_DIGITS.replace_all(raw, "");
    let cleaned = cleaned.replace("E-Testing", "");
    let cleaned = cleaned.replace("Schoo!", "School");
    let cleaned = cleaned.trim();

    let best = NAME_ENDINGS
        .iter()
        .find_map(|ending| {
            cleaned
                .find(ending)
                .map(|at| cleaned[..at + ending.len()].trim())
        })
        .unwrap_or(cleaned);

    RE_WHITESPACE.replace_all(best, " ").trim().to_string()
}
