//! Reconciliation: closing the gaps between the three sources.
//!
//! Extraction never produces a complete picture on its own. Four kinds of
//! gap remain, each with its own blocking gate, resolved in a fixed order:
//!
//! 1. **Roster gaps** — blocks the roster extractor rejected.
//! 2. **Unmatched eligibility** — eligible rows with no roster candidate
//!    under the (name key, date of birth) composite.
//! 3. **Missing centres** — centre codes the matched candidates sit at
//!    that the centre directory has no name for.
//! 4. **Timetable** — the per-subject schedule, which no source document
//!    carries at all.
//!
//! Each gate sends one [`CorrectionRequest`] through the
//! [`CorrectionChannel`] and blocks on the reply. The channel is the seam
//! between the library and whatever supervises a run — a dialog in a
//! desktop host, prepared answer files in a batch wrapper, a script in
//! tests. A [`CorrectionReply::Cancelled`] reply aborts the run with no
//! output written; a reply of the wrong variant is a channel bug and is
//! reported as [`EslipError::ChannelProtocol`].

use crate::config::{ExamMonth, RunConfig};
use crate::error::EslipError;
use crate::model::{
    Candidate, CentreDirectory, DocumentText, EligibilityRecord, Timetable,
};
use crate::pipeline::names;
use crate::report::ReportSink;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

// Gate names as they appear in cancellation and protocol errors.
pub const GATE_ROSTER_GAPS: &str = "roster-gaps";
pub const GATE_UNMATCHED_ELIGIBILITY: &str = "unmatched-eligibility";
pub const GATE_MISSING_CENTRES: &str = "missing-centres";
pub const GATE_TIMETABLE: &str = "timetable";

/// One gap for the supervising side to fill in.
#[derive(Debug, Clone)]
pub enum CorrectionRequest {
    /// Roster blocks that failed to parse. The full document text rides
    /// along so the supervisor can offer assisted lookup by candidate id.
    RosterGaps {
        rejected_blocks: Vec<String>,
        document: DocumentText,
    },
    /// Eligible rows with no roster match.
    UnmatchedEligibility {
        rows: Vec<EligibilityRecord>,
        document: DocumentText,
    },
    /// Centre codes in use with no known name, sorted.
    MissingCentres { codes: Vec<String> },
    /// The subject universe needing schedule data, sorted.
    Timetable {
        subject_codes: Vec<String>,
        month: ExamMonth,
        year: String,
    },
}

/// Answer to a [`CorrectionRequest`]. Each request variant accepts exactly
/// one data-carrying variant, plus `Empty` and `Cancelled` everywhere.
#[derive(Debug, Clone)]
pub enum CorrectionReply {
    Candidates(Vec<Candidate>),
    Centres(CentreDirectory),
    Timetable(Timetable),
    /// Nothing to add; the run proceeds with what it has.
    Empty,
    /// Abort the run.
    Cancelled,
}

/// The blocking seam to whatever supervises a run.
///
/// `resolve` is called at most once per gate per run and must not return
/// until the supervisor has answered; the pipeline thread waits on it.
pub trait CorrectionChannel: Send + Sync {
    fn resolve(&self, request: CorrectionRequest) -> CorrectionReply;
}

/// Answers every request with [`CorrectionReply::Empty`]; for fully
/// unattended runs that accept extraction output as-is.
pub struct NoCorrections;

impl CorrectionChannel for NoCorrections {
    fn resolve(&self, _request: CorrectionRequest) -> CorrectionReply {
        CorrectionReply::Empty
    }
}

impl<F> CorrectionChannel for F
where
    F: Fn(CorrectionRequest) -> CorrectionReply + Send + Sync,
{
    fn resolve(&self, request: CorrectionRequest) -> CorrectionReply {
        self(request)
    }
}

// ── Gate 1: roster gaps ──────────────────────────────────────────────────────

/// Offer rejected roster blocks for manual recovery; recovered candidates
/// are appended to `candidates`.
pub fn resolve_roster_gaps(
    candidates: &mut Vec<Candidate>,
    rejected_blocks: Vec<String>,
    document: &DocumentText,
    channel: &dyn CorrectionChannel,
    sink: &dyn ReportSink,
) -> Result<(), EslipError> {
    if rejected_blocks.is_empty() {
        return Ok(());
    }
    sink.report(&format!(
        "Requesting manual entry for {} unparsable block(s)...",
        rejected_blocks.len()
    ));
    let reply = channel.resolve(CorrectionRequest::RosterGaps {
        rejected_blocks,
        document: document.clone(),
    });
    match reply {
        CorrectionReply::Candidates(extra) => {
            if !extra.is_empty() {
                sink.report(&format!("Added {} candidates from manual entry", extra.len()));
            }
            candidates.extend(extra);
            Ok(())
        }
        CorrectionReply::Empty => Ok(()),
        CorrectionReply::Cancelled => Err(EslipError::Cancelled {
            stage: GATE_ROSTER_GAPS,
        }),
        _ => Err(EslipError::ChannelProtocol {
            stage: GATE_ROSTER_GAPS,
        }),
    }
}

// ── Gate 2: eligibility matching ─────────────────────────────────────────────

/// Cross-match eligible rows against the roster.
///
/// The roster is indexed by the (name key, date of birth) composite; rows
/// look themselves up in that index. Matched candidates come back in row
/// order, so two rows for the same person produce two slips, matching the
/// customer-facing view that each paid row gets its document. Unmatched
/// rows go through the channel; candidates entered there are taken as
/// already matched.
pub fn match_eligibility(
    candidates: &[Candidate],
    eligibility: &[EligibilityRecord],
    document: &DocumentText,
    channel: &dyn CorrectionChannel,
    sink: &dyn ReportSink,
) -> Result<Vec<Candidate>, EslipError> {
    let mut index: HashMap<(String, String), &Candidate> = HashMap::new();
    for candidate in candidates {
        let key = (names::match_key(&candidate.name), candidate.dob.clone());
        if key.0.is_empty() {
            continue;
        }
        if let Some(previous) = index.insert(key, candidate) {
            warn!(
                id = previous.id.as_str(),
                name = %previous.name,
                "duplicate roster match key, keeping the later record"
            );
        }
    }

    let mut matched = Vec::new();
    let mut unmatched = Vec::new();
    for row in eligibility {
        let key = (names::match_key(&row.name), row.dob.clone());
        match index.get(&key) {
            Some(&candidate) => matched.push(candidate.clone()),
            None => unmatched.push(row.clone()),
        }
    }
    info!(
        matched = matched.len(),
        unmatched = unmatched.len(),
        "eligibility cross-match finished"
    );
    sink.report(&format!("Matched {} candidates", matched.len()));

    if !unmatched.is_empty() {
        sink.report(&format!(
            "CSV candidates not found in candidate list: {}. Requesting manual entry...",
            unmatched.len()
        ));
        let reply = channel.resolve(CorrectionRequest::UnmatchedEligibility {
            rows: unmatched,
            document: document.clone(),
        });
        match reply {
            CorrectionReply::Candidates(extra) => {
                if !extra.is_empty() {
                    sink.report(&format!(
                        "Added {} candidates from eligibility manual entry",
                        extra.len()
                    ));
                }
                matched.extend(extra);
            }
            CorrectionReply::Empty => {}
            CorrectionReply::Cancelled => {
                return Err(EslipError::Cancelled {
                    stage: GATE_UNMATCHED_ELIGIBILITY,
                })
            }
            _ => {
                return Err(EslipError::ChannelProtocol {
                    stage: GATE_UNMATCHED_ELIGIBILITY,
                })
            }
        }
    }
    Ok(matched)
}

// ── Gate 3: missing centres ──────────────────────────────────────────────────

/// Ask for names of centre codes the matched candidates use that the
/// directory does not know. Only meaningful when a centre list is in use;
/// the orchestrator skips this gate entirely otherwise.
pub fn resolve_missing_centres(
    matched: &[Candidate],
    centres: &mut CentreDirectory,
    channel: &dyn CorrectionChannel,
    sink: &dyn ReportSink,
) -> Result<(), EslipError> {
    let needed: BTreeSet<&str> = matched.iter().map(|c| c.id.centre_code()).collect();
    let missing: Vec<String> = needed
        .into_iter()
        .filter(|code| !centres.contains(code))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    sink.report(&format!(
        "Missing {} centre code(s). Requesting manual centre entry...",
        missing.len()
    ));
    match channel.resolve(CorrectionRequest::MissingCentres { codes: missing }) {
        CorrectionReply::Centres(added) => {
            if !added.is_empty() {
                sink.report(&format!("Added {} centre mappings", added.len()));
            }
            centres.merge(added);
            Ok(())
        }
        CorrectionReply::Empty => Ok(()),
        CorrectionReply::Cancelled => Err(EslipError::Cancelled {
            stage: GATE_MISSING_CENTRES,
        }),
        _ => Err(EslipError::ChannelProtocol {
            stage: GATE_MISSING_CENTRES,
        }),
    }
}

// ── Gate 4: timetable ────────────────────────────────────────────────────────

/// Collect the schedule for every subject the matched candidates sit.
///
/// No request is made when the subject universe is empty; slips then
/// render with empty timetable sections.
pub fn collect_timetable(
    matched: &[Candidate],
    config: &RunConfig,
    channel: &dyn CorrectionChannel,
    sink: &dyn ReportSink,
) -> Result<Timetable, EslipError> {
    let universe: BTreeSet<&str> = matched
        .iter()
        .flat_map(|c| c.subjects.iter())
        .map(|s| s.code.as_str())
        .filter(|code| !code.is_empty())
        .collect();
    if universe.is_empty() {
        return Ok(Timetable::new());
    }

    sink.report(&format!(
        "Collecting timetable for {} unique subject(s)...",
        universe.len()
    ));
    let reply = channel.resolve(CorrectionRequest::Timetable {
        subject_codes: universe.into_iter().map(str::to_string).collect(),
        month: config.exam_month,
        year: config.exam_year.clone(),
    });
    match reply {
        CorrectionReply::Timetable(tt) => Ok(tt),
        CorrectionReply::Empty => Ok(Timetable::new()),
        CorrectionReply::Cancelled => Err(EslipError::Cancelled {
            stage: GATE_TIMETABLE,
        }),
        _ => Err(EslipError::ChannelProtocol {
            stage: GATE_TIMETABLE,
        }),
    }
}
