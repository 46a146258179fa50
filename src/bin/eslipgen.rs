//! CLI binary for eslipgen.
//!
//! A thin shim over the library crate: maps CLI flags to `RunConfig`,
//! wires file-backed sources and corrections into the run, and streams
//! report lines to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use eslipgen::pipeline::names::match_key;
use eslipgen::{
    run, CorrectionChannel, CorrectionReply, CorrectionRequest, DocumentText, ExamMonth,
    ExamType, JsonSlipRenderer, ReportSink, RunConfig, RunSources, SubjectDirectory,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # May-June CSEC run with a centre list
  eslipgen --csv eligibility.csv --candidates candidates.txt \
           --centres centres.txt --year 2026 -o slips/

  # January CSEC run, no centre list, prepared corrections
  eslipgen --csv january.csv --candidates candidates.txt \
           --month january --year 2026 --corrections answers.json -o slips/

SOURCE FILES:
  --candidates and --centres take OCR text dumps of the scanned documents,
  one file per document. Pages separated by form-feed (\f) are normalized
  page by page, matching per-page OCR output.

CORRECTIONS FILE:
  --corrections points at a JSON file with any of the keys "candidates",
  "centres", and "timetable". Each correction gate that fires is answered
  from the matching key; gates without a key proceed with nothing added.
  "candidates" answers both candidate gates: the full list at the
  unparsable-blocks gate, and at the unmatched-rows gate only entries
  whose name and date of birth match a row the gate asked about.

  {
    "candidates": [
      { "id": "1000010001", "name": "Brown, John", "dob": "05/04/2009",
        "gender": "Male", "subjects": [{ "code": "MATHG", "type": "N/A" }] }
    ],
    "centres": { "100001": "Alpha Secondary School" },
    "timetable": {
      "MATHG": [{ "paper": "1", "date": "12/05/2026", "session": "AM" }]
    }
  }

  Without --corrections, every gate proceeds with what extraction found.
"#;

/// Generate examination e-slips from eligibility and OCR source files.
#[derive(Parser, Debug)]
#[command(
    name = "eslipgen",
    version,
    about = "Generate examination e-slips from eligibility and OCR source files",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Eligibility CSV export.
    #[arg(long, env = "ESLIPGEN_CSV")]
    csv: PathBuf,

    /// Candidate list OCR text.
    #[arg(long, env = "ESLIPGEN_CANDIDATES")]
    candidates: PathBuf,

    /// Centre list OCR text; omit when no centre list exists.
    #[arg(long, env = "ESLIPGEN_CENTRES")]
    centres: Option<PathBuf>,

    /// Exam type.
    #[arg(long, value_enum, default_value = "csec")]
    exam_type: ExamTypeArg,

    /// Exam sitting.
    #[arg(long, value_enum, default_value = "may-june")]
    month: ExamMonthArg,

    /// Four-digit exam year.
    #[arg(long)]
    year: String,

    /// Directory slips are written into; must exist.
    #[arg(short, long, env = "ESLIPGEN_OUTPUT")]
    output: PathBuf,

    /// JSON file answering correction gates.
    #[arg(long)]
    corrections: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress report lines; errors only.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ExamTypeArg {
    Csec,
    Cape,
}

impl From<ExamTypeArg> for ExamType {
    fn from(v: ExamTypeArg) -> Self {
        match v {
            ExamTypeArg::Csec => ExamType::Csec,
            ExamTypeArg::Cape => ExamType::Cape,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ExamMonthArg {
    January,
    MayJune,
}

impl From<ExamMonthArg> for ExamMonth {
    fn from(v: ExamMonthArg) -> Self {
        match v {
            ExamMonthArg::January => ExamMonth::January,
            ExamMonthArg::MayJune => ExamMonth::MayJune,
        }
    }
}

// ── Report sink ──────────────────────────────────────────────────────────────

struct StderrReportSink;

impl ReportSink for StderrReportSink {
    fn report(&self, message: &str) {
        eprintln!("{message}");
    }
}

struct QuietReportSink;

impl ReportSink for QuietReportSink {
    fn report(&self, _message: &str) {}
}

// ── File-backed correction channel ───────────────────────────────────────────

/// Prepared answers loaded from the `--corrections` JSON file. Any gate
/// without an answer proceeds empty; there is no way to cancel a batch run
/// other than killing it before output starts.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PreparedCorrections {
    #[serde(default)]
    candidates: Vec<eslipgen::Candidate>,
    #[serde(default)]
    centres: eslipgen::CentreDirectory,
    #[serde(default)]
    timetable: eslipgen::Timetable,
}

impl CorrectionChannel for PreparedCorrections {
    fn resolve(&self, request: CorrectionRequest) -> CorrectionReply {
        match request {
            CorrectionRequest::RosterGaps { .. } => {
                if self.candidates.is_empty() {
                    CorrectionReply::Empty
                } else {
                    CorrectionReply::Candidates(self.candidates.clone())
                }
            }
            CorrectionRequest::UnmatchedEligibility { rows, .. } => {
                // An entry already injected at the roster gate has matched
                // its row by this point; only entries naming a row in this
                // request apply here.
                let requested: HashSet<(String, String)> = rows
                    .iter()
                    .map(|r| (match_key(&r.name), r.dob.clone()))
                    .collect();
                let extra: Vec<_> = self
                    .candidates
                    .iter()
                    .filter(|c| requested.contains(&(match_key(&c.name), c.dob.clone())))
                    .cloned()
                    .collect();
                if extra.is_empty() {
                    CorrectionReply::Empty
                } else {
                    CorrectionReply::Candidates(extra)
                }
            }
            CorrectionRequest::MissingCentres { .. } => {
                CorrectionReply::Centres(self.centres.clone())
            }
            CorrectionRequest::Timetable { .. } => {
                CorrectionReply::Timetable(self.timetable.clone())
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = RunConfig::builder()
        .exam_type(cli.exam_type.clone().into())
        .exam_month(cli.month.clone().into())
        .exam_year(cli.year.as_str())
        .output_dir(&cli.output)
        .build()
        .context("Invalid configuration")?;

    let roster = read_document(&cli.candidates)
        .with_context(|| format!("Failed to read candidate list {:?}", cli.candidates))?;
    let centre_list = match &cli.centres {
        Some(path) => Some(
            read_document(path)
                .with_context(|| format!("Failed to read centre list {path:?}"))?,
        ),
        None => None,
    };
    let eligibility = File::open(&cli.csv)
        .with_context(|| format!("Failed to open eligibility CSV {:?}", cli.csv))?;

    let corrections = match &cli.corrections {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open corrections file {path:?}"))?;
            serde_json::from_reader(file)
                .with_context(|| format!("Failed to parse corrections file {path:?}"))?
        }
        None => PreparedCorrections::default(),
    };

    let sink: &dyn ReportSink = if cli.quiet {
        &QuietReportSink
    } else {
        &StderrReportSink
    };

    let summary = run(
        &config,
        RunSources {
            eligibility,
            roster: &roster,
            centre_list: centre_list.as_ref(),
        },
        &SubjectDirectory::standard(),
        &corrections,
        &JsonSlipRenderer,
        sink,
    )
    .context("Run failed")?;

    if !summary.failures.is_empty() {
        for failure in &summary.failures {
            eprintln!("{failure}");
        }
        anyhow::bail!(
            "{} of {} slips failed to generate",
            summary.failures.len(),
            summary.total
        );
    }
    Ok(())
}

/// Read an OCR text dump, treating form-feed as a page break.
fn read_document(path: &std::path::Path) -> Result<DocumentText> {
    let raw = std::fs::read_to_string(path)?;
    Ok(DocumentText::from_pages(raw.split('\u{c}')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eslipgen::{
        Candidate, CandidateId, CandidateType, EligibilityRecord, Gender, NoopReportSink,
        SubjectEnrollment,
    };

    fn doe() -> Candidate {
        Candidate {
            id: CandidateId::parse("1000020001").unwrap(),
            name: "Doe, Jane".into(),
            dob: "02/01/2008".into(),
            gender: Gender::Female,
            subjects: vec![SubjectEnrollment::new("ENGAG", CandidateType::NotApplicable)],
        }
    }

    #[test]
    fn unmatched_gate_reply_is_limited_to_requested_rows() {
        let corrections = PreparedCorrections {
            candidates: vec![doe()],
            ..Default::default()
        };
        // Doe's row is not among the unmatched rows, so the reply must not
        // re-inject her.
        let reply = corrections.resolve(CorrectionRequest::UnmatchedEligibility {
            rows: vec![EligibilityRecord {
                name: "Ghost, Gary".into(),
                dob: "01/01/2000".into(),
                raw: Default::default(),
            }],
            document: DocumentText::from_normalized(""),
        });
        assert!(matches!(reply, CorrectionReply::Empty));

        let reply = corrections.resolve(CorrectionRequest::UnmatchedEligibility {
            rows: vec![EligibilityRecord {
                name: "DOE,JANE".into(),
                dob: "02/01/2008".into(),
                raw: Default::default(),
            }],
            document: DocumentText::from_normalized(""),
        });
        match reply {
            CorrectionReply::Candidates(extra) => {
                assert_eq!(extra.len(), 1);
                assert_eq!(extra[0].name, "Doe, Jane");
            }
            other => panic!("expected candidates, got {other:?}"),
        }
    }

    #[test]
    fn candidate_recovered_at_the_roster_gate_gets_exactly_one_slip() {
        let out = tempfile::tempdir().unwrap();
        let config = RunConfig::builder()
            .exam_type(ExamType::Csec)
            .exam_year("2026")
            .output_dir(out.path())
            .build()
            .unwrap();

        // Doe's roster block is unreadable; Ghost has no roster block at
        // all and no corrections entry, so the unmatched-rows gate fires
        // after Doe has already been recovered and matched.
        let csv = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email
Brown,John,,2009-04-05,E-candidate slip/Timetable only- $30
Doe,Jane,,2008-01-02,E-candidate slip/Timetable only- $30
Ghost,Gary,,2000-01-01,E-candidate slip/Timetable only- $30
";
        let roster = DocumentText::from_pages([
            "1000010001 BROWN, JOHN 05/04/2009 M MATHG 1 1000020001 SOMETHING UNREADABLE",
        ]);
        let corrections = PreparedCorrections {
            candidates: vec![doe()],
            ..Default::default()
        };

        let summary = run(
            &config,
            RunSources {
                eligibility: csv.as_bytes(),
                roster: &roster,
                centre_list: None,
            },
            &SubjectDirectory::standard(),
            &corrections,
            &JsonSlipRenderer,
            &NoopReportSink,
        )
        .unwrap();

        assert_eq!(summary.generated, 2);
        assert!(out.path().join("CSEC E-Slip Brown John.json").exists());
        assert!(out.path().join("CSEC E-Slip Doe Jane.json").exists());
        assert!(!out.path().join("CSEC E-Slip Doe Jane (1).json").exists());
    }
}
