//! Slip rendering.
//!
//! Laying a slip out on a page is the job of an external collaborator; the
//! library hands it a fully assembled [`Slip`] and a target path and gets
//! back success or a per-candidate error. Render failures never abort the
//! batch — the orchestrator counts them and moves on.

use crate::error::RenderError;
use crate::slip::Slip;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Writes one assembled slip to its output path.
pub trait SlipRenderer: Send + Sync {
    /// File extension for the documents this renderer produces, without
    /// the dot.
    fn extension(&self) -> &str;

    /// Render `slip` to `path`. The path is collision-free and inside the
    /// run's output directory.
    fn render(&self, slip: &Slip, path: &Path) -> Result<(), RenderError>;
}

/// Serialises the slip's field set as pretty-printed JSON.
///
/// The default renderer: gives batch wrappers and tests a complete,
/// machine-readable record of what a page renderer would draw.
pub struct JsonSlipRenderer;

impl SlipRenderer for JsonSlipRenderer {
    fn extension(&self) -> &str {
        "json"
    }

    fn render(&self, slip: &Slip, path: &Path) -> Result<(), RenderError> {
        debug!(path = %path.display(), "writing slip");
        let file = File::create(path).map_err(|e| RenderError::WriteFailed {
            id: slip.candidate_number.clone(),
            detail: e.to_string(),
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), slip).map_err(|e| {
            RenderError::WriteFailed {
                id: slip.candidate_number.clone(),
                detail: e.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slip::SlipRow;

    fn slip() -> Slip {
        Slip {
            surname: "Brown".into(),
            other_names: "John".into(),
            dob: "05/04/2009".into(),
            gender: "Male".into(),
            candidate_number: "1000010001".into(),
            centre_number: "100001".into(),
            centre_location: "Alpha School".into(),
            examination: "CSEC May - June 2026".into(),
            timetable_rows: vec![SlipRow {
                subject: "Mathematics".into(),
                candidate_type: "N/A".into(),
                paper: "1".into(),
                date: "12/05/2026".into(),
                session: "AM".into(),
            }],
        }
    }

    #[test]
    fn json_renderer_round_trips_the_slip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slip.json");
        JsonSlipRenderer.render(&slip(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let read_back: Slip = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(read_back, slip());
    }

    #[test]
    fn unwritable_path_is_a_write_failure() {
        let err = JsonSlipRenderer
            .render(&slip(), Path::new("/nonexistent-dir/slip.json"))
            .unwrap_err();
        assert!(matches!(err, RenderError::WriteFailed { .. }));
    }
}
