//! Run orchestration.
//!
//! One call, one batch: parse every source, walk the correction gates in
//! order, then render a slip per matched candidate. The stages run
//! strictly sequentially — every gate can block on the correction channel,
//! and each stage's output feeds the next — so there is nothing to gain
//! from overlapping them.

use crate::config::RunConfig;
use crate::error::{EslipError, RenderError};
use crate::model::{CentreDirectory, DocumentText};
use crate::pipeline::{centres, eligibility, roster};
use crate::reconcile::{self, CorrectionChannel};
use crate::render::SlipRenderer;
use crate::report::ReportSink;
use crate::slip::{self, FilenameAllocator};
use crate::subjects::SubjectDirectory;
use std::io::Read;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// The source material for one run.
pub struct RunSources<'a, R> {
    /// The eligibility CSV.
    pub eligibility: R,
    /// Normalized candidate list text.
    pub roster: &'a DocumentText,
    /// Normalized centre list text; `None` when no centre list exists for
    /// this sitting, in which case every slip shows `N/A` for the centre
    /// location and the missing-centre gate is skipped.
    pub centre_list: Option<&'a DocumentText>,
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Slips successfully written.
    pub generated: usize,
    /// Candidates a slip was attempted for.
    pub total: usize,
    /// Per-candidate render failures, in batch order.
    pub failures: Vec<RenderError>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.generated == self.total
    }
}

/// Execute one full generation run.
///
/// Fatal errors abort with nothing written (except slips already rendered
/// before an output failure); per-candidate render failures are collected
/// in the summary instead.
pub fn run<R: Read>(
    config: &RunConfig,
    sources: RunSources<'_, R>,
    subjects: &SubjectDirectory,
    channel: &dyn CorrectionChannel,
    renderer: &dyn SlipRenderer,
    sink: &dyn ReportSink,
) -> Result<RunSummary, EslipError> {
    let started = Instant::now();

    sink.report("Status: Parsing CSV for eligible candidates...");
    let eligible = eligibility::parse_eligibility(sources.eligibility, config, sink)?;
    if eligible.is_empty() {
        return Err(EslipError::NoEligibleRows);
    }

    let centre_list_in_use = sources.centre_list.is_some();
    let mut centre_directory = match sources.centre_list {
        Some(document) => {
            sink.report("Status: Parsing Centre List...");
            let directory = centres::parse_centre_list(document, sink);
            if directory.is_empty() {
                return Err(EslipError::CentreListEmpty);
            }
            directory
        }
        None => {
            sink.report("Status: Skipping Centre List (not available).");
            CentreDirectory::new()
        }
    };

    sink.report("Status: Parsing Candidate List...");
    let extraction = roster::parse_roster(sources.roster, subjects, sink)?;
    let mut candidates = extraction.candidates;
    reconcile::resolve_roster_gaps(
        &mut candidates,
        extraction.rejected_blocks,
        sources.roster,
        channel,
        sink,
    )?;

    sink.report("Status: Cross-matching candidates with CSV...");
    let matched =
        reconcile::match_eligibility(&candidates, &eligible, sources.roster, channel, sink)?;

    if centre_list_in_use {
        reconcile::resolve_missing_centres(&matched, &mut centre_directory, channel, sink)?;
    }

    let timetable = reconcile::collect_timetable(&matched, config, channel, sink)?;

    // The output directory must already exist; refusing to create it keeps
    // a typo from silently spraying files somewhere new.
    std::fs::metadata(&config.output_dir).map_err(|e| EslipError::OutputWrite {
        path: config.output_dir.clone(),
        source: e,
    })?;

    sink.report("Status: Generating slips...");
    let mut allocator = FilenameAllocator::new(&config.output_dir);
    let mut generated = 0;
    let mut failures = Vec::new();
    for candidate in &matched {
        let assembled = slip::assemble(candidate, &centre_directory, &timetable, subjects, config);
        let stem = slip::file_stem(&assembled, config);
        let path = allocator.allocate(&stem, renderer.extension());
        match renderer.render(&assembled, &path) {
            Ok(()) => {
                generated += 1;
                if let Some(filename) = path.file_name() {
                    sink.report(&format!("Generated: {}", filename.to_string_lossy()));
                }
            }
            Err(failure) => {
                warn!(%failure, "slip render failed");
                sink.report(&format!("Failed to generate slip for {}", candidate.name));
                failures.push(failure);
            }
        }
    }

    let summary = RunSummary {
        generated,
        total: matched.len(),
        failures,
        elapsed: started.elapsed(),
    };
    info!(
        generated = summary.generated,
        total = summary.total,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run finished"
    );
    sink.report(&format!(
        "Complete! {}/{} slips generated in {:.2}s.",
        summary.generated,
        summary.total,
        summary.elapsed.as_secs_f64()
    ));
    Ok(summary)
}
