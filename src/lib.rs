//! # eslipgen
//!
//! Generate per-candidate examination e-slips from messy source documents.
//!
//! ## Why this crate?
//!
//! The inputs to an e-slip batch are hostile: an eligibility CSV whose
//! schema changes by sitting, plus OCR text of scanned candidate and centre
//! lists full of confusable glyphs and merged lines. No single source is
//! complete, so the pipeline extracts what it can, cross-matches the
//! sources, and routes every remaining gap through a blocking correction
//! channel instead of guessing — the supervising side (a UI, answer files,
//! a test script) decides what fills each gap.
//!
//! ## Pipeline Overview
//!
//! ```text
//! eligibility CSV ──▶ parse (schema-routed) ──┐
//! centre list text ──▶ extract directory ─────┼──▶ reconcile ──▶ assemble ──▶ render
//! candidate list text ──▶ extract roster ─────┘    (4 gates)     (slips)     (files)
//! ```
//!
//! 1. **Extract** — [`pipeline`] turns each source into validated records,
//!    rejecting what it cannot read rather than guessing
//! 2. **Reconcile** — [`reconcile`] cross-matches the sources and resolves
//!    roster gaps, unmatched rows, missing centres, and the timetable
//!    through the [`reconcile::CorrectionChannel`]
//! 3. **Assemble** — [`slip`] builds one renderable field set per matched
//!    candidate; nothing is rejected at this stage
//! 4. **Render** — [`render::SlipRenderer`] writes each slip to disk;
//!    failures are counted, never fatal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eslipgen::{
//!     run, DocumentText, JsonSlipRenderer, NoCorrections, NoopReportSink, RunConfig,
//!     RunSources, SubjectDirectory,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RunConfig::builder()
//!         .exam_year("2026")
//!         .output_dir("slips")
//!         .build()?;
//!     let roster = DocumentText::from_pages([std::fs::read_to_string("candidates.txt")?]);
//!     let summary = run(
//!         &config,
//!         RunSources {
//!             eligibility: std::fs::File::open("eligibility.csv")?,
//!             roster: &roster,
//!             centre_list: None,
//!         },
//!         &SubjectDirectory::standard(),
//!         &NoCorrections,
//!         &JsonSlipRenderer,
//!         &NoopReportSink,
//!     )?;
//!     println!("{}/{} slips generated", summary.generated, summary.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `eslipgen` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! eslipgen = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod render;
pub mod report;
pub mod run;
pub mod slip;
pub mod subjects;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExamMonth, ExamType, RunConfig, RunConfigBuilder};
pub use error::{EslipError, RenderError};
pub use model::{
    Candidate, CandidateId, CandidateType, CentreDirectory, DocumentText, EligibilityRecord,
    Gender, SubjectEnrollment, Timetable, TimetableSlot,
};
pub use reconcile::{CorrectionChannel, CorrectionReply, CorrectionRequest, NoCorrections};
pub use render::{JsonSlipRenderer, SlipRenderer};
pub use report::{BufferedReportSink, NoopReportSink, ReportSink};
pub use run::{run, RunSources, RunSummary};
pub use slip::{Slip, SlipRow};
pub use subjects::SubjectDirectory;
