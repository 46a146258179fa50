//! Core record types shared across the pipeline.
//!
//! Everything here is plain owned data: the extractors append to it, the
//! reconciliation engine reads and extends it, and slip assembly consumes
//! it. All of it lives for exactly one run — there is no persistence layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Width of a candidate identifier in the source domain.
pub const CANDIDATE_ID_LEN: usize = 10;
/// Width of the centre-code prefix of a candidate identifier.
pub const CENTRE_CODE_LEN: usize = 6;

/// A candidate identifier string was not exactly ten digits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Candidate id must be exactly {CANDIDATE_ID_LEN} digits, got '{0}'")]
pub struct InvalidCandidateId(pub String);

/// A validated candidate identifier.
///
/// The first six digits are the centre code, the remainder the candidate's
/// sequence number within that centre.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CandidateId(String);

impl CandidateId {
    /// Validate and wrap a candidate number.
    pub fn parse(s: &str) -> Result<Self, InvalidCandidateId> {
        let s = s.trim();
        if s.len() == CANDIDATE_ID_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidCandidateId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fixed-width centre-code prefix.
    pub fn centre_code(&self) -> &str {
        &self.0[..CENTRE_CODE_LEN]
    }

    /// The per-centre sequence suffix.
    pub fn sequence(&self) -> &str {
        &self.0[CENTRE_CODE_LEN..]
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CandidateId {
    type Error = InvalidCandidateId;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CandidateId> for String {
    fn from(id: CandidateId) -> String {
        id.0
    }
}

/// Candidate gender as recorded on the roster.
///
/// `Unknown` only arises from manual entry; the roster extractor rejects
/// blocks without an `M`/`F` token outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    /// Interpret the isolated roster token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Male"),
            Gender::Female => f.write_str("Female"),
            Gender::Unknown => f.write_str("Unknown"),
        }
    }
}

/// The candidate-type qualifier attached to a subject enrollment
/// (`MATHG-R` → repeater), or `NotApplicable` when the roster carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CandidateType {
    Letter(char),
    NotApplicable,
}

impl CandidateType {
    /// The repeater code; repeater enrollments are shown only papers 1 and 2.
    pub const REPEATER: CandidateType = CandidateType::Letter('R');

    pub fn from_suffix(suffix: Option<char>) -> Self {
        match suffix {
            Some(c) => CandidateType::Letter(c),
            None => CandidateType::NotApplicable,
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateType::Letter(c) => write!(f, "{c}"),
            CandidateType::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl TryFrom<String> for CandidateType {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        let t = s.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("N/A") {
            return Ok(CandidateType::NotApplicable);
        }
        let mut chars = t.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => Ok(CandidateType::Letter(c)),
            _ => Err(format!("invalid candidate type '{t}'")),
        }
    }
}

impl From<CandidateType> for String {
    fn from(t: CandidateType) -> String {
        t.to_string()
    }
}

/// One (subject code, candidate type) pair from the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEnrollment {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: CandidateType,
}

impl SubjectEnrollment {
    pub fn new(code: impl Into<String>, kind: CandidateType) -> Self {
        Self {
            code: code.into(),
            kind,
        }
    }
}

/// A fully parsed roster candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    /// Canonical display name, `"Surname, Given Names"` in title case.
    pub name: String,
    /// Date of birth as `dd/mm/yyyy`.
    pub dob: String,
    pub gender: Gender,
    pub subjects: Vec<SubjectEnrollment>,
}

/// One eligible row from the eligibility source.
///
/// Carries no candidate id — identity is the (name-key, dob) composite until
/// the reconciliation engine finds the matching roster record. `raw` passes
/// the source row through untouched for audit display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRecord {
    pub name: String,
    pub dob: String,
    pub raw: BTreeMap<String, String>,
}

/// Centre code → display name mapping, built by the centre extractor and
/// patched from the correction channel for codes it missed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CentreDirectory {
    entries: BTreeMap<String, String>,
}

impl CentreDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(c, n)| (c.to_string(), n.to_string()))
                .collect(),
        }
    }

    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.entries.insert(code.into(), name.into());
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Merge correction results in; corrections win on conflict.
    pub fn merge(&mut self, other: CentreDirectory) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

/// One sitting of one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSlot {
    /// Paper identifier as displayed — `"1"`, `"2"`, `"3/2"`.
    pub paper: String,
    pub date: String,
    /// Session label — `"AM"`, `"PM"`, or `"Oral Examination"` by convention.
    pub session: String,
}

/// Per-subject exam schedule, keyed by subject code.
///
/// Supplied entirely through the correction channel; no source document
/// carries it reliably.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timetable {
    entries: BTreeMap<String, Vec<TimetableSlot>>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, slots: Vec<TimetableSlot>) {
        self.entries.insert(code.into(), slots);
    }

    /// Slots for a subject; unknown codes yield an empty slice, not an error.
    pub fn slots_for(&self, code: &str) -> &[TimetableSlot] {
        self.entries.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn merge(&mut self, other: Timetable) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Full normalized text of one source document.
///
/// Built from per-page OCR output: each page is run through the text
/// normalizer, then pages are joined with a single newline. The roster
/// extractor hands this back out so the correction channel can offer
/// lookup assistance against the exact text that was parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentText(String);

impl DocumentText {
    /// Normalize and join raw per-page OCR text.
    pub fn from_pages<S: AsRef<str>>(pages: impl IntoIterator<Item = S>) -> Self {
        let cleaned: Vec<String> = pages
            .into_iter()
            .map(|p| crate::pipeline::normalize::clean_page_text(p.as_ref()))
            .collect();
        Self(cleaned.join("\n"))
    }

    /// Wrap already-normalized text. Used by tests and the find-details
    /// helper, which re-scans text produced by `from_pages`.
    pub fn from_normalized(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_id_splits_centre_and_sequence() {
        let id = CandidateId::parse("1234567890").unwrap();
        assert_eq!(id.centre_code(), "123456");
        assert_eq!(id.sequence(), "7890");
    }

    #[test]
    fn candidate_id_rejects_wrong_width_and_letters() {
        assert!(CandidateId::parse("123456789").is_err());
        assert!(CandidateId::parse("12345678901").is_err());
        assert!(CandidateId::parse("123456789O").is_err());
    }

    #[test]
    fn candidate_id_deserializes_with_validation() {
        let ok: CandidateId = serde_json::from_str("\"1234567890\"").unwrap();
        assert_eq!(ok.as_str(), "1234567890");
        assert!(serde_json::from_str::<CandidateId>("\"nope\"").is_err());
    }

    #[test]
    fn candidate_type_round_trips_through_strings() {
        assert_eq!(
            CandidateType::try_from("R".to_string()).unwrap(),
            CandidateType::REPEATER
        );
        assert_eq!(
            CandidateType::try_from("N/A".to_string()).unwrap(),
            CandidateType::NotApplicable
        );
        assert_eq!(CandidateType::NotApplicable.to_string(), "N/A");
        assert!(CandidateType::try_from("RR".to_string()).is_err());
    }

    #[test]
    fn gender_token_parsing() {
        assert_eq!(Gender::from_token("M"), Some(Gender::Male));
        assert_eq!(Gender::from_token("F"), Some(Gender::Female));
        assert_eq!(Gender::from_token("X"), None);
    }

    #[test]
    fn timetable_unknown_code_is_empty() {
        let tt = Timetable::new();
        assert!(tt.slots_for("MATHG").is_empty());
    }

    #[test]
    fn centre_directory_merge_prefers_corrections() {
        let mut dir = CentreDirectory::from_entries([("123456", "Old Name")]);
        dir.merge(CentreDirectory::from_entries([("123456", "New Name")]));
        assert_eq!(dir.name_for("123456"), Some("New Name"));
    }
}
