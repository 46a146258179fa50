//! End-to-end tests: full runs through every gate against in-memory
//! sources, with a scripted correction channel standing in for the
//! supervising side.

use eslipgen::{
    run, Candidate, CandidateId, CandidateType, CentreDirectory, CorrectionReply,
    CorrectionRequest, DocumentText, EslipError, ExamMonth, ExamType, Gender, JsonSlipRenderer,
    NoCorrections, NoopReportSink, RunConfig, RunSources, Slip, SubjectDirectory,
    SubjectEnrollment, Timetable, TimetableSlot,
};
use std::path::Path;
use std::sync::Mutex;

const ELIGIBILITY_CSV: &str = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email,Choose Examination
Brown,John,Michael,2009-04-05,E-candidate slip/Timetable only- $30,CSEC
Smith,Anne,,2008-05-06,Error recognition & E-candidate slip/Timetable- $50,CSEC
";

const ROSTER_TEXT: &str = "\
    1000010001 BROWN, JOHN MICHAEL 05/04/2009 M MATHG ENGAG 2 \
    1000020001 SMITH, ANNE 06/05/2008 F ENGAG 1";

const CENTRE_TEXT: &str =
    "100001 Alpha Secondary School Kingston 100002 Beta College Portmore";

fn config(output_dir: &Path) -> RunConfig {
    RunConfig::builder()
        .exam_type(ExamType::Csec)
        .exam_month(ExamMonth::MayJune)
        .exam_year("2026")
        .output_dir(output_dir)
        .build()
        .unwrap()
}

fn document(text: &str) -> DocumentText {
    DocumentText::from_pages([text])
}

fn timetable_reply() -> CorrectionReply {
    let mut tt = Timetable::new();
    tt.insert(
        "MATHG",
        vec![
            TimetableSlot {
                paper: "1".into(),
                date: "12/05/2026".into(),
                session: "AM".into(),
            },
            TimetableSlot {
                paper: "2".into(),
                date: "13/05/2026".into(),
                session: "PM".into(),
            },
        ],
    );
    tt.insert(
        "ENGAG",
        vec![TimetableSlot {
            paper: "1".into(),
            date: "14/05/2026".into(),
            session: "AM".into(),
        }],
    );
    CorrectionReply::Timetable(tt)
}

fn read_slip(path: &Path) -> Slip {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn full_run_generates_a_slip_per_matched_candidate() {
    let out = tempfile::tempdir().unwrap();
    let roster = document(ROSTER_TEXT);
    let centres = document(CENTRE_TEXT);

    let channel = |request: CorrectionRequest| match request {
        CorrectionRequest::Timetable { .. } => timetable_reply(),
        other => panic!("unexpected correction request: {other:?}"),
    };

    let summary = run(
        &config(out.path()),
        RunSources {
            eligibility: ELIGIBILITY_CSV.as_bytes(),
            roster: &roster,
            centre_list: Some(&centres),
        },
        &SubjectDirectory::standard(),
        &channel,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap();

    assert_eq!(summary.generated, 2);
    assert_eq!(summary.total, 2);
    assert!(summary.is_complete());
    assert!(summary.failures.is_empty());

    let brown = out.path().join("CSEC E-Slip Brown John Michael.json");
    assert!(brown.exists(), "expected {brown:?}");
    let slip = read_slip(&brown);
    assert_eq!(slip.candidate_number, "1000010001");
    assert_eq!(slip.centre_number, "100001");
    assert_eq!(slip.centre_location, "Alpha Secondary School");
    assert_eq!(slip.examination, "CSEC May - June 2026");
    assert_eq!(slip.gender, "Male");
    // MATHG has two scheduled papers, ENGAG one.
    assert_eq!(slip.timetable_rows.len(), 3);

    let smith = out.path().join("CSEC E-Slip Smith Anne.json");
    let slip = read_slip(&smith);
    assert_eq!(slip.centre_location, "Beta College");
}

#[test]
fn duplicate_names_get_numbered_filenames() {
    let out = tempfile::tempdir().unwrap();
    let csv = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email
Brown,John,,2009-04-05,E-candidate slip/Timetable only- $30
Brown,John,,2009-04-05,E-candidate slip/Timetable only- $30
";
    let roster = document("1000010001 BROWN, JOHN 05/04/2009 M MATHG 1");

    let summary = run(
        &config(out.path()),
        RunSources {
            eligibility: csv.as_bytes(),
            roster: &roster,
            centre_list: None,
        },
        &SubjectDirectory::standard(),
        &NoCorrections,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap();

    assert_eq!(summary.generated, 2);
    assert!(out.path().join("CSEC E-Slip Brown John.json").exists());
    assert!(out.path().join("CSEC E-Slip Brown John (1).json").exists());
}

#[test]
fn without_a_centre_list_slips_show_na_and_no_centre_gate_fires() {
    let out = tempfile::tempdir().unwrap();
    let roster = document("1000010001 BROWN, JOHN MICHAEL 05/04/2009 M MATHG 1");

    let channel = |request: CorrectionRequest| match request {
        // The Smith row has no roster match here; leave it unresolved.
        CorrectionRequest::UnmatchedEligibility { .. } => CorrectionReply::Empty,
        CorrectionRequest::Timetable { .. } => CorrectionReply::Empty,
        CorrectionRequest::MissingCentres { .. } => {
            panic!("centre gate must not fire without a centre list")
        }
        other => panic!("unexpected correction request: {other:?}"),
    };

    run(
        &config(out.path()),
        RunSources {
            eligibility: ELIGIBILITY_CSV.as_bytes(),
            roster: &roster,
            centre_list: None,
        },
        &SubjectDirectory::standard(),
        &channel,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap();

    let slip = read_slip(&out.path().join("CSEC E-Slip Brown John Michael.json"));
    assert_eq!(slip.centre_location, "N/A");
    // Unmatched Smith row went through the channel and stayed unresolved,
    // so only Brown got a slip.
    assert!(!out.path().join("CSEC E-Slip Smith Anne.json").exists());
}

#[test]
fn gates_fire_in_pipeline_order() {
    let out = tempfile::tempdir().unwrap();
    // Brown parses; the second block has no date of birth and is rejected;
    // Smith therefore needs manual matching; Smith's centre 100002 is not
    // in the centre list.
    let roster = document(
        "1000010001 BROWN, JOHN MICHAEL 05/04/2009 M MATHG 1 \
         1000020001 SMITH, ANNE missing things",
    );
    let centres = document("100001 Alpha Secondary School Kingston");

    let order: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());
    let channel = |request: CorrectionRequest| match request {
        CorrectionRequest::RosterGaps {
            rejected_blocks, ..
        } => {
            order.lock().unwrap().push("roster-gaps");
            assert_eq!(rejected_blocks.len(), 1);
            assert!(rejected_blocks[0].starts_with("1000020001"));
            CorrectionReply::Empty
        }
        CorrectionRequest::UnmatchedEligibility { rows, .. } => {
            order.lock().unwrap().push("unmatched-eligibility");
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].name, "Smith, Anne");
            CorrectionReply::Candidates(vec![Candidate {
                id: CandidateId::parse("1000020001").unwrap(),
                name: "Smith, Anne".into(),
                dob: "06/05/2008".into(),
                gender: Gender::Female,
                subjects: vec![SubjectEnrollment::new("ENGAG", CandidateType::NotApplicable)],
            }])
        }
        CorrectionRequest::MissingCentres { codes } => {
            order.lock().unwrap().push("missing-centres");
            assert_eq!(codes, ["100002"]);
            CorrectionReply::Centres(CentreDirectory::from_entries([(
                "100002",
                "Beta College",
            )]))
        }
        CorrectionRequest::Timetable { subject_codes, .. } => {
            order.lock().unwrap().push("timetable");
            assert_eq!(subject_codes, ["ENGAG", "MATHG"]);
            timetable_reply()
        }
    };

    let summary = run(
        &config(out.path()),
        RunSources {
            eligibility: ELIGIBILITY_CSV.as_bytes(),
            roster: &roster,
            centre_list: Some(&centres),
        },
        &SubjectDirectory::standard(),
        &channel,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap();

    assert_eq!(summary.generated, 2);
    assert_eq!(
        *order.lock().unwrap(),
        [
            "roster-gaps",
            "unmatched-eligibility",
            "missing-centres",
            "timetable"
        ]
    );
    let slip = read_slip(&out.path().join("CSEC E-Slip Smith Anne.json"));
    assert_eq!(slip.centre_location, "Beta College");
}

#[test]
fn cancellation_writes_nothing() {
    let out = tempfile::tempdir().unwrap();
    let roster = document(ROSTER_TEXT);
    let centres = document(CENTRE_TEXT);

    let channel = |request: CorrectionRequest| match request {
        CorrectionRequest::Timetable { .. } => CorrectionReply::Cancelled,
        other => panic!("unexpected correction request: {other:?}"),
    };

    let err = run(
        &config(out.path()),
        RunSources {
            eligibility: ELIGIBILITY_CSV.as_bytes(),
            roster: &roster,
            centre_list: Some(&centres),
        },
        &SubjectDirectory::standard(),
        &channel,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap_err();

    assert!(matches!(err, EslipError::Cancelled { stage: "timetable" }));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn empty_eligibility_is_fatal() {
    let out = tempfile::tempdir().unwrap();
    let csv = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email
Brown,John,,2009-04-05,Photocopy of certificate- $20
";
    let roster = document(ROSTER_TEXT);

    let err = run(
        &config(out.path()),
        RunSources {
            eligibility: csv.as_bytes(),
            roster: &roster,
            centre_list: None,
        },
        &SubjectDirectory::standard(),
        &NoCorrections,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap_err();
    assert!(matches!(err, EslipError::NoEligibleRows));
}

#[test]
fn unusable_centre_list_is_fatal() {
    let out = tempfile::tempdir().unwrap();
    let roster = document(ROSTER_TEXT);
    let centres = document("no centre codes in this text");

    let err = run(
        &config(out.path()),
        RunSources {
            eligibility: ELIGIBILITY_CSV.as_bytes(),
            roster: &roster,
            centre_list: Some(&centres),
        },
        &SubjectDirectory::standard(),
        &NoCorrections,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap_err();
    assert!(matches!(err, EslipError::CentreListEmpty));
}

#[test]
fn roster_without_anchors_is_fatal() {
    let out = tempfile::tempdir().unwrap();
    let roster = document("not a roster at all");

    let err = run(
        &config(out.path()),
        RunSources {
            eligibility: ELIGIBILITY_CSV.as_bytes(),
            roster: &roster,
            centre_list: None,
        },
        &SubjectDirectory::standard(),
        &NoCorrections,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap_err();
    assert!(matches!(err, EslipError::RosterNoAnchors));
}

#[test]
fn repeater_slips_show_only_papers_one_and_two() {
    let out = tempfile::tempdir().unwrap();
    let csv = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email
Brown,John,,2009-04-05,E-candidate slip/Timetable only- $30
";
    let roster = document("1000010001 BROWN, JOHN 05/04/2009 M MATHG-R 1");

    let channel = |request: CorrectionRequest| match request {
        CorrectionRequest::Timetable { .. } => {
            let mut tt = Timetable::new();
            tt.insert(
                "MATHG",
                vec![
                    TimetableSlot {
                        paper: "1".into(),
                        date: "12/05/2026".into(),
                        session: "AM".into(),
                    },
                    TimetableSlot {
                        paper: "3/2".into(),
                        date: "14/05/2026".into(),
                        session: "AM".into(),
                    },
                ],
            );
            CorrectionReply::Timetable(tt)
        }
        other => panic!("unexpected correction request: {other:?}"),
    };

    run(
        &config(out.path()),
        RunSources {
            eligibility: csv.as_bytes(),
            roster: &roster,
            centre_list: None,
        },
        &SubjectDirectory::standard(),
        &channel,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap();

    let slip = read_slip(&out.path().join("CSEC E-Slip Brown John.json"));
    let papers: Vec<_> = slip.timetable_rows.iter().map(|r| r.paper.as_str()).collect();
    assert_eq!(papers, ["1"]);
    assert_eq!(slip.timetable_rows[0].candidate_type, "R");
}

#[test]
fn ocr_noise_is_normalized_before_anchoring() {
    let out = tempfile::tempdir().unwrap();
    let csv = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email
Brown,John,,2009-04-05,E-candidate slip/Timetable only- $30
";
    // Pipe characters from table rules and a unicode dash in the repeater
    // suffix, split across two OCR pages.
    let roster = DocumentText::from_pages([
        "|1000010001| BROWN,",
        "JOHN   05/04/2009  M  MATHG\u{2013}R 1",
    ]);

    let summary = run(
        &config(out.path()),
        RunSources {
            eligibility: csv.as_bytes(),
            roster: &roster,
            centre_list: None,
        },
        &SubjectDirectory::standard(),
        &NoCorrections,
        &JsonSlipRenderer,
        &NoopReportSink,
    )
    .unwrap();
    assert_eq!(summary.generated, 1);
}
