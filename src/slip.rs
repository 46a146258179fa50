//! Slip assembly.
//!
//! Assembly is the one stage with no rejection path: every candidate that
//! survived reconciliation gets a slip, and anything still missing at this
//! point is displayed as `N/A` rather than blocking the batch.

use crate::config::RunConfig;
use crate::model::{Candidate, CandidateType, CentreDirectory, Timetable};
use crate::subjects::SubjectDirectory;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Papers shown for a repeater enrollment.
const REPEATER_PAPERS: &[&str] = &["1", "2"];

static RE_FILENAME_UNSAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\\/*?:"<>|]"#).unwrap());

/// One row of a slip's timetable table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipRow {
    pub subject: String,
    pub candidate_type: String,
    pub paper: String,
    pub date: String,
    pub session: String,
}

/// Everything a renderer needs to lay out one e-slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slip {
    pub surname: String,
    pub other_names: String,
    pub dob: String,
    pub gender: String,
    pub candidate_number: String,
    pub centre_number: String,
    /// Centre display name, `N/A` when unknown.
    pub centre_location: String,
    /// The examination line, e.g. `"CSEC May - June 2026"`.
    pub examination: String,
    pub timetable_rows: Vec<SlipRow>,
}

/// Assemble the slip for one candidate. Never fails: unknown centres show
/// as `N/A` and subjects without timetable entries contribute no rows.
pub fn assemble(
    candidate: &Candidate,
    centres: &CentreDirectory,
    timetable: &Timetable,
    subjects: &SubjectDirectory,
    config: &RunConfig,
) -> Slip {
    let (surname, other_names) = split_display_name(&candidate.name);
    let centre_location = centres
        .name_for(candidate.id.centre_code())
        .filter(|name| !name.is_empty())
        .unwrap_or("N/A")
        .to_string();

    let mut rows = Vec::new();
    for enrollment in &candidate.subjects {
        let slots = timetable.slots_for(&enrollment.code);
        let slots: Vec<_> = if enrollment.kind == CandidateType::REPEATER {
            slots
                .iter()
                .filter(|slot| REPEATER_PAPERS.contains(&slot.paper.as_str()))
                .collect()
        } else {
            slots.iter().collect()
        };
        for slot in slots {
            rows.push(SlipRow {
                subject: subjects.display_name(&enrollment.code).to_string(),
                candidate_type: enrollment.kind.to_string(),
                paper: slot.paper.clone(),
                date: slot.date.clone(),
                session: slot.session.clone(),
            });
        }
    }

    Slip {
        surname: surname.to_string(),
        other_names: other_names.to_string(),
        dob: candidate.dob.clone(),
        gender: candidate.gender.to_string(),
        candidate_number: candidate.id.to_string(),
        centre_number: candidate.id.centre_code().to_string(),
        centre_location,
        examination: config.examination_line(),
        timetable_rows: rows,
    }
}

fn split_display_name(name: &str) -> (&str, &str) {
    match name.split_once(',') {
        Some((surname, rest)) => (surname.trim(), rest.trim()),
        None => (name.trim(), ""),
    }
}

/// The file stem for a slip, filesystem-unsafe characters removed:
/// `"CSEC E-Slip Brown John Michael"`.
pub fn file_stem(slip: &Slip, config: &RunConfig) -> String {
    let surname = RE_FILENAME_UNSAFE.replace_all(&slip.surname, "");
    let other = RE_FILENAME_UNSAFE.replace_all(&slip.other_names, "");
    format!("{} E-Slip {} {}", config.exam_type, surname, other)
}

/// Hands out collision-free output paths within one run.
///
/// A name is taken when a file with it already exists on disk or when a
/// slip earlier in this batch claimed it; either way the next free
/// `" (n)"` suffix is used. Without the in-run claim set, two candidates
/// with the same name would race for the same path.
pub struct FilenameAllocator {
    dir: PathBuf,
    claimed: HashSet<PathBuf>,
}

impl FilenameAllocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            claimed: HashSet::new(),
        }
    }

    /// Claim a free path for `stem` with the given extension.
    pub fn allocate(&mut self, stem: &str, extension: &str) -> PathBuf {
        let mut path = self.dir.join(format!("{stem}.{extension}"));
        let mut counter = 1;
        while self.taken(&path) {
            path = self.dir.join(format!("{stem} ({counter}).{extension}"));
            counter += 1;
        }
        self.claimed.insert(path.clone());
        path
    }

    fn taken(&self, path: &Path) -> bool {
        self.claimed.contains(path) || path.exists()
    }
}
