//! Error types for the eslipgen library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`EslipError`] — **Fatal-for-stage**: a source document is unreadable or
//!   structurally incompatible, the operator cancelled a correction gate, or
//!   output cannot be written. Returned as `Err(EslipError)` from the
//!   top-level [`crate::run::run`] and from individual extractors.
//!
//! * [`RenderError`] — **Non-fatal**: one candidate's slip failed to render.
//!   Counted in [`crate::run::RunSummary`] so a bad record never aborts the
//!   batch.
//!
//! Records that merely fail a local check (unparseable date of birth, no
//! gender token, no alphabetic name) are not errors at all: they are skipped
//! with a message through the [`crate::report::ReportSink`], and — where a
//! correction is possible — routed to the
//! [`crate::reconcile::CorrectionChannel`] as a gap.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the eslipgen library.
#[derive(Debug, Error)]
pub enum EslipError {
    // ── Eligibility source errors ─────────────────────────────────────────
    /// The eligibility source could not be read at all.
    #[error("Eligibility source is unreadable: {detail}")]
    EligibilityUnreadable { detail: String },

    /// The alternate eligibility schema is missing required columns.
    #[error("Eligibility source is missing required column(s): {}", missing.join(", "))]
    EligibilitySchemaMismatch { missing: Vec<String> },

    /// Every row was filtered out; there is nobody to generate slips for.
    #[error("No eligible candidates found in the eligibility source")]
    NoEligibleRows,

    // ── Document extraction errors ────────────────────────────────────────
    /// A centre list was supplied but yielded no usable entries.
    #[error("No centres could be parsed from the centre list document")]
    CentreListEmpty,

    /// The roster document contains no candidate-id anchors.
    #[error("No 10-digit candidate numbers found in the candidate list document")]
    RosterNoAnchors,

    /// Anchors were found but not a single block parsed into a candidate.
    #[error("Candidate list parsing produced no valid candidates")]
    RosterEmpty,

    // ── Correction channel errors ─────────────────────────────────────────
    /// The operator cancelled a correction request; the run is aborted and
    /// no output is written.
    #[error("Run cancelled at the {stage} correction gate")]
    Cancelled { stage: &'static str },

    /// The correction channel answered a request with a reply of the wrong
    /// variant. This is a bug in the channel implementation, not bad data.
    #[error("Correction channel returned a mismatched reply at the {stage} gate")]
    ChannelProtocol { stage: &'static str },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a file under the output directory.
    #[error("Failed to write output file {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single candidate's slip.
///
/// Stored per candidate during slip generation; the run continues and the
/// final summary reports `rendered/total`.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RenderError {
    /// The external renderer failed for this candidate.
    #[error("Rendering failed for candidate {id}: {detail}")]
    RenderFailed { id: String, detail: String },

    /// The slip file could not be written.
    #[error("Could not write slip for candidate {id}: {detail}")]
    WriteFailed { id: String, detail: String },
}
