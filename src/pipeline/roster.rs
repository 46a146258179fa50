//! Candidate-list (roster) extraction.
//!
//! The roster prints one run of fields per candidate: 10-digit candidate
//! number, name in `SURNAME, GIVEN` form, date of birth, a lone `M`/`F`
//! gender token, then the subject codes, often followed by a single-digit
//! subject count. OCR flattens the layout, so the extractor anchors on the
//! candidate numbers and parses each inter-anchor block independently.
//!
//! A block that fails any structural check is not silently dropped: its
//! text goes into [`RosterExtraction::rejected_blocks`] so the correction
//! gate can show it to the operator for manual recovery, and a skip
//! message goes through the report sink.

use crate::error::EslipError;
use crate::model::{
    Candidate, CandidateId, CandidateType, DocumentText, Gender, SubjectEnrollment,
    CANDIDATE_ID_LEN,
};
use crate::pipeline::scan;
use crate::report::ReportSink;
use crate::subjects::SubjectDirectory;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

static RE_DOB: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{2}/\d{2}/\d{4})\b").unwrap());
static RE_GENDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b([MF])\b").unwrap());
static RE_SUBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]{3,8})(?:-([A-Z]))?").unwrap());
static RE_COUNT_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s(\d)$").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_ALPHABETIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]").unwrap());

/// Result of a roster scan: what parsed, and what did not.
#[derive(Debug, Clone)]
pub struct RosterExtraction {
    pub candidates: Vec<Candidate>,
    /// Cleaned text of blocks that failed a structural check, in document
    /// order. Offered to the correction gate for manual entry.
    pub rejected_blocks: Vec<String>,
}

/// Parse candidates out of a roster document.
///
/// Fatal only when the document yields nothing at all: no anchors means
/// the wrong document (or unusable OCR), and anchors without a single
/// parsed candidate means the same thing one step later.
pub fn parse_roster(
    text: &DocumentText,
    subjects: &SubjectDirectory,
    sink: &dyn ReportSink,
) -> Result<RosterExtraction, EslipError> {
    let blocks = scan::anchored_blocks(text.as_str(), CANDIDATE_ID_LEN);
    if blocks.is_empty() {
        return Err(EslipError::RosterNoAnchors);
    }

    let mut candidates = Vec::new();
    let mut rejected_blocks = Vec::new();
    for (anchor, block) in blocks {
        let cleaned = RE_WHITESPACE.replace_all(block, " ").trim().to_string();
        match parse_block(anchor.text, &cleaned, subjects) {
            Ok(candidate) => candidates.push(candidate),
            Err(reason) => {
                sink.report(&format!("SKIPPING block for Cand# {}: {reason}", anchor.text));
                debug!(id = anchor.text, reason, "rejected roster block");
                rejected_blocks.push(cleaned);
            }
        }
    }

    info!(
        parsed = candidates.len(),
        rejected = rejected_blocks.len(),
        "roster extraction finished"
    );
    sink.report(&format!(
        "Found {} candidates successfully parsed.",
        candidates.len()
    ));

    if candidates.is_empty() {
        return Err(EslipError::RosterEmpty);
    }
    Ok(RosterExtraction {
        candidates,
        rejected_blocks,
    })
}

/// Parse one cleaned inter-anchor block. The error is a human-readable
/// skip reason for the report sink.
fn parse_block(
    id_text: &str,
    cleaned: &str,
    subjects: &SubjectDirectory,
) -> Result<Candidate, &'static str> {
    // The anchor guarantees exactly ten digits.
    let id = CandidateId::parse(id_text).map_err(|_| "invalid candidate number")?;

    let dob_match = RE_DOB.find(cleaned).ok_or("no date of birth found")?;
    let dob = dob_match.as_str().to_string();

    let name_raw = cleaned[id_text.len()..dob_match.start()].trim();
    let name = super::names::compose_from_comma_separated(name_raw);
    if !RE_ALPHABETIC.is_match(&name) {
        return Err("invalid name parsed");
    }

    let remaining = cleaned[dob_match.end()..].trim();
    let gender_match = RE_GENDER
        .captures(remaining)
        .ok_or("could not find gender after DOB")?;
    let gender = match &gender_match[1] {
        "M" => Gender::Male,
        _ => Gender::Female,
    };

    let after_gender = remaining[gender_match.get(0).map(|m| m.end()).unwrap_or(0)..].trim();
    let enrollments = parse_subjects(after_gender, subjects);

    Ok(Candidate {
        id,
        name,
        dob,
        gender,
        subjects: enrollments,
    })
}

/// Pull subject enrollments out of the tail of a block.
///
/// A trailing isolated digit is the printed subject count, not a subject,
/// and is stripped first. Codes not present in the directory are OCR noise
/// and are dropped without comment.
fn parse_subjects(raw: &str, subjects: &SubjectDirectory) -> Vec<SubjectEnrollment> {
    let mut tail = raw;
    if let Some(m) = RE_COUNT_SUFFIX.find(tail) {
        tail = tail[..m.start()].trim_end();
    }

    let upper = tail.to_uppercase();
    RE_SUBJECT
        .captures_iter(&upper)
        .filter(|caps| subjects.contains(&caps[1]))
        .map(|caps| {
            let kind = CandidateType::from_suffix(
                caps.get(2).and_then(|m| m.as_str().chars().next()),
            );
            SubjectEnrollment::new(&caps[1], kind)
        })
        .collect()
}

/// Look a candidate up in the full document text by id.
///
/// Backs the correction gate's assisted entry: given an id typed by the
/// operator, re-scan the document for that candidate's block and recover
/// gender and subjects from it. `None` when the block is missing, has no
/// gender token, or yields no valid subject codes.
pub fn find_candidate_details(
    text: &DocumentText,
    id: &CandidateId,
    subjects: &SubjectDirectory,
) -> Option<(Gender, Vec<SubjectEnrollment>)> {
    let blocks = scan::anchored_blocks(text.as_str(), CANDIDATE_ID_LEN);
    let (_, block) = blocks.into_iter().find(|(a, _)| a.text == id.as_str())?;

    let cleaned = RE_WHITESPACE.replace_all(block, " ").into_owned();
    let gender_match = RE_GENDER.captures(&cleaned)?;
    let gender = match &gender_match[1] {
        "M" => Gender::Male,
        _ => Gender::Female,
    };

    let after_gender = cleaned[gender_match.get(0)?.end()..].trim();
    let enrollments = parse_subjects(after_gender, subjects);
    if enrollments.is_empty() {
        return None;
    }
    Some((gender, enrollments))
}
