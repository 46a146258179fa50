//! Run configuration.
//!
//! All behaviour of a generation run is controlled through [`RunConfig`],
//! built via its [`RunConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to pass the run's identity (exam type, sitting, output folder)
//! through the pipeline and to serialise it for logging.

use crate::error::EslipError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The examination programme a run targets.
///
/// The value participates in eligibility filtering (the standard schema
/// carries a `Choose Examination` column compared case-insensitively against
/// this) and in output file naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamType {
    Csec,
    Cape,
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::Csec => f.write_str("CSEC"),
            ExamType::Cape => f.write_str("CAPE"),
        }
    }
}

/// The sitting within the year.
///
/// The (type, month) pair drives eligibility schema routing: CSEC January
/// sources use a different column layout than the May–June ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamMonth {
    January,
    MayJune,
}

impl fmt::Display for ExamMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamMonth::January => f.write_str("January"),
            ExamMonth::MayJune => f.write_str("May - June"),
        }
    }
}

/// Configuration for one e-slip generation run.
///
/// Built via [`RunConfig::builder()`].
///
/// # Example
/// ```rust
/// use eslipgen::{ExamMonth, ExamType, RunConfig};
///
/// let config = RunConfig::builder()
///     .exam_type(ExamType::Csec)
///     .exam_month(ExamMonth::MayJune)
///     .exam_year("2026")
///     .output_dir("/tmp/slips")
///     .build()
///     .unwrap();
/// assert_eq!(config.exam_type.to_string(), "CSEC");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Examination programme. Default: CSEC.
    pub exam_type: ExamType,

    /// Sitting. Default: May – June. CAPE has no January sitting; the
    /// builder rejects that combination.
    pub exam_month: ExamMonth,

    /// Four-digit examination year, kept as text because it is only ever
    /// interpolated into display strings.
    pub exam_year: String,

    /// Directory slips are written into. Must already exist at run time;
    /// the run never creates it implicitly.
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Create a new builder for `RunConfig`.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            config: RunConfig {
                exam_type: ExamType::Csec,
                exam_month: ExamMonth::MayJune,
                exam_year: String::new(),
                output_dir: PathBuf::new(),
            },
        }
    }

    /// The examination display line, e.g. `"CSEC May - June 2026"`.
    pub fn examination_line(&self) -> String {
        format!("{} {} {}", self.exam_type, self.exam_month, self.exam_year)
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn exam_type(mut self, t: ExamType) -> Self {
        self.config.exam_type = t;
        self
    }

    pub fn exam_month(mut self, m: ExamMonth) -> Self {
        self.config.exam_month = m;
        self
    }

    pub fn exam_year(mut self, year: impl Into<String>) -> Self {
        self.config.exam_year = year.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RunConfig, EslipError> {
        let c = &self.config;
        if c.exam_type == ExamType::Cape && c.exam_month == ExamMonth::January {
            return Err(EslipError::InvalidConfig(
                "CAPE has no January sitting".into(),
            ));
        }
        if c.exam_year.len() != 4 || !c.exam_year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(EslipError::InvalidConfig(format!(
                "Exam year must be four digits, got '{}'",
                c.exam_year
            )));
        }
        if c.output_dir.as_os_str().is_empty() {
            return Err(EslipError::InvalidConfig(
                "Output directory must be set".into(),
            ));
        }
        Ok(self.config)
    }
}
