//! Eligibility-source parsing.
//!
//! The eligibility source is a CSV export of a signup form. Two schemas
//! exist in the wild: the standard May–June layout with separate name
//! fields, and the CSEC January layout whose headers embed free-running
//! prose (including the examination year) and carry the full name in one
//! column. A small router picks the schema from the run configuration; the
//! January parser matches its headers by substring so the year baked into
//! the header text never has to be configured.
//!
//! Row-level filtering is silent-but-reported: a row whose service is not
//! one of the e-slip services is simply not a customer, and a row whose
//! date of birth cannot be read is skipped with a message through the
//! report sink. Only structural problems are errors.

use crate::config::{ExamMonth, ExamType, RunConfig};
use crate::error::EslipError;
use crate::model::EligibilityRecord;
use crate::pipeline::{dates, names};
use crate::report::ReportSink;
use std::collections::BTreeMap;
use std::io::Read;
use tracing::debug;

// ── Schema routing ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Schema {
    January,
    Standard,
}

/// Ordered routing rules; the first matching predicate wins and the
/// standard schema is the fallback.
const ROUTES: &[(fn(&RunConfig) -> bool, Schema)] = &[(is_csec_january, Schema::January)];

fn is_csec_january(config: &RunConfig) -> bool {
    config.exam_type == ExamType::Csec && config.exam_month == ExamMonth::January
}

fn route(config: &RunConfig) -> Schema {
    ROUTES
        .iter()
        .find(|(applies, _)| applies(config))
        .map(|&(_, schema)| schema)
        .unwrap_or(Schema::Standard)
}

// ── Standard (May–June) schema ───────────────────────────────────────────────

const STANDARD_SERVICE_COL: &str = "Additional Application Service - sent via email";
const STANDARD_EXAM_COL: &str = "Choose Examination";
const STANDARD_ELIGIBLE_SERVICES: &[&str] = &[
    "E-candidate slip/Timetable only- $30",
    "Error recognition & E-candidate slip/Timetable- $50",
];

// ── CSEC January schema ──────────────────────────────────────────────────────
//
// Matched as substrings of the actual headers; the form appends the exam
// year and other prose to them.

const JANUARY_NAME_FRAGMENT: &str = "Full Name - name of candidate participating in CSEC January";
const JANUARY_SERVICE_FRAGMENT: &str = "Application Processing Type - sent via email";
const JANUARY_DOB_FRAGMENT: &str = "Date of Birth";
const JANUARY_ELIGIBLE_SERVICES: &[&str] = &[
    "Generate E-candidate slip/Timetable only- $30",
    "Error recognition & E-candidate slip/Timetable- $50",
    "E-candidate slip/Timetable only- $30",
    "Error correction & E-candidate slip/Timetable- $50",
];

/// Parse the eligibility CSV, routing to the schema the run calls for.
///
/// Returns the eligible records in source order. An empty result is not an
/// error here; the run orchestrator decides that nobody-eligible is fatal.
pub fn parse_eligibility<R: Read>(
    reader: R,
    config: &RunConfig,
    sink: &dyn ReportSink,
) -> Result<Vec<EligibilityRecord>, EslipError> {
    let schema = route(config);
    debug!(?schema, "routing eligibility source");
    match schema {
        Schema::January => parse_january(reader, sink),
        Schema::Standard => parse_standard(reader, config, sink),
    }
}

fn parse_standard<R: Read>(
    reader: R,
    config: &RunConfig,
    sink: &dyn ReportSink,
) -> Result<Vec<EligibilityRecord>, EslipError> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = read_headers(&mut csv)?;
    let exam_filter_present = headers.iter().any(|h| h == STANDARD_EXAM_COL);

    let mut eligible = Vec::new();
    for result in csv.records() {
        let record = result.map_err(|e| EslipError::EligibilityUnreadable {
            detail: e.to_string(),
        })?;
        let row = zip_row(&headers, &record);

        let service = field(&row, STANDARD_SERVICE_COL);
        if !STANDARD_ELIGIBLE_SERVICES.contains(&service) {
            continue;
        }

        // The exam column is optional; when present and filled it must
        // match the run's exam type.
        if exam_filter_present {
            let exam_in_csv = field(&row, STANDARD_EXAM_COL).to_uppercase();
            if !exam_in_csv.is_empty() && exam_in_csv != config.exam_type.to_string() {
                continue;
            }
        }

        let name = names::compose_name(
            field(&row, "Last Name"),
            field(&row, "First Name"),
            field(&row, "Middle Name"),
        );
        match dates::normalize_dob(field(&row, "Date Of Birth")) {
            Some(dob) => eligible.push(EligibilityRecord { name, dob, raw: row }),
            None => sink.report(&format!("CSV row missing/invalid DOB for {name}; skipping")),
        }
    }

    sink.report(&format!(
        "CSV: {} candidate(s) eligible for e-slips after filtering.",
        eligible.len()
    ));
    Ok(eligible)
}

fn parse_january<R: Read>(
    reader: R,
    sink: &dyn ReportSink,
) -> Result<Vec<EligibilityRecord>, EslipError> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = read_headers(&mut csv)?;

    let name_col = find_header(&headers, JANUARY_NAME_FRAGMENT);
    let service_col = find_header(&headers, JANUARY_SERVICE_FRAGMENT);
    let dob_col = find_header(&headers, JANUARY_DOB_FRAGMENT);

    let missing: Vec<String> = [
        (&name_col, JANUARY_NAME_FRAGMENT),
        (&service_col, JANUARY_SERVICE_FRAGMENT),
        (&dob_col, JANUARY_DOB_FRAGMENT),
    ]
    .iter()
    .filter(|(found, _)| found.is_none())
    .map(|&(_, fragment)| fragment.to_string())
    .collect();
    if !missing.is_empty() {
        return Err(EslipError::EligibilitySchemaMismatch { missing });
    }
    // Checked non-empty above.
    let (name_col, service_col, dob_col) = match (name_col, service_col, dob_col) {
        (Some(n), Some(s), Some(d)) => (n, s, d),
        _ => unreachable!("missing columns rejected above"),
    };

    let mut eligible = Vec::new();
    for result in csv.records() {
        let record = result.map_err(|e| EslipError::EligibilityUnreadable {
            detail: e.to_string(),
        })?;
        let row = zip_row(&headers, &record);

        let service = field(&row, &service_col);
        if !JANUARY_ELIGIBLE_SERVICES.contains(&service) {
            continue;
        }

        let name = names::compose_from_full(field(&row, &name_col));
        match dates::normalize_dob(field(&row, &dob_col)) {
            Some(dob) => eligible.push(EligibilityRecord { name, dob, raw: row }),
            None => sink.report(&format!("CSV row missing/invalid DOB for {name}; skipping")),
        }
    }

    sink.report(&format!(
        "CSV: {} candidate(s) eligible for e-slips after filtering.",
        eligible.len()
    ));
    Ok(eligible)
}

// ── CSV helpers ──────────────────────────────────────────────────────────────

fn read_headers<R: Read>(csv: &mut csv::Reader<R>) -> Result<Vec<String>, EslipError> {
    let headers = csv
        .headers()
        .map_err(|e| EslipError::EligibilityUnreadable {
            detail: e.to_string(),
        })?;
    if headers.is_empty() {
        return Err(EslipError::EligibilityUnreadable {
            detail: "no header row".into(),
        });
    }
    Ok(headers.iter().map(str::to_string).collect())
}

/// Pair each field with its header; short rows leave trailing columns out,
/// which reads back as empty through [`field`].
fn zip_row(headers: &[String], record: &csv::StringRecord) -> BTreeMap<String, String> {
    headers
        .iter()
        .zip(record.iter())
        .map(|(h, v)| (h.clone(), v.to_string()))
        .collect()
}

fn field<'a>(row: &'a BTreeMap<String, String>, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("").trim()
}

fn find_header(headers: &[String], fragment: &str) -> Option<String> {
    headers.iter().find(|h| h.contains(fragment)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::BufferedReportSink;

    fn config(exam_type: ExamType, exam_month: ExamMonth) -> RunConfig {
        RunConfig::builder()
            .exam_type(exam_type)
            .exam_month(exam_month)
            .exam_year("2026")
            .output_dir("/tmp/out")
            .build()
            .unwrap()
    }

    const STANDARD_CSV: &str = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email,Choose Examination
Brown,John,Michael,2009-04-05,E-candidate slip/Timetable only- $30,CSEC
Smith,Anne,,05/06/2008,Photocopy of certificate- $20,CSEC
Jones,Mary,,07/08/2009,Error recognition & E-candidate slip/Timetable- $50,CAPE
Baker,Tom,,not-a-date,E-candidate slip/Timetable only- $30,CSEC
";

    #[test]
    fn standard_schema_filters_service_and_exam() {
        let sink = BufferedReportSink::new();
        let cfg = config(ExamType::Csec, ExamMonth::MayJune);
        let rows = parse_eligibility(STANDARD_CSV.as_bytes(), &cfg, &sink).unwrap();
        // Smith: wrong service. Jones: CAPE row in a CSEC run. Baker: bad DOB.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Brown, John Michael");
        assert_eq!(rows[0].dob, "05/04/2009");
        assert!(sink.take().iter().any(|l| l.contains("Baker")));
    }

    #[test]
    fn standard_schema_keeps_raw_row() {
        let sink = BufferedReportSink::new();
        let cfg = config(ExamType::Csec, ExamMonth::MayJune);
        let rows = parse_eligibility(STANDARD_CSV.as_bytes(), &cfg, &sink).unwrap();
        assert_eq!(rows[0].raw.get("Last Name").map(String::as_str), Some("Brown"));
    }

    #[test]
    fn missing_exam_column_means_no_exam_filter() {
        let csv = "\
Last Name,First Name,Middle Name,Date Of Birth,Additional Application Service - sent via email
Jones,Mary,,07/08/2009,Error recognition & E-candidate slip/Timetable- $50
";
        let cfg = config(ExamType::Cape, ExamMonth::MayJune);
        let rows = parse_eligibility(csv.as_bytes(), &cfg, &crate::report::NoopReportSink).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn january_schema_matches_headers_by_substring() {
        let csv = "\
Full Name - name of candidate participating in CSEC January 2026 examination.,Application Processing Type - sent via email,Date of Birth
John Michael Brown,Generate E-candidate slip/Timetable only- $30,2009-04-05
Jane Doe,Photocopy- $20,2008-01-01
";
        let cfg = config(ExamType::Csec, ExamMonth::January);
        let rows = parse_eligibility(csv.as_bytes(), &cfg, &crate::report::NoopReportSink).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Brown, John Michael");
    }

    #[test]
    fn january_schema_mismatch_is_fatal_and_names_columns() {
        let csv = "A,B,C\n1,2,3\n";
        let cfg = config(ExamType::Csec, ExamMonth::January);
        let err = parse_eligibility(csv.as_bytes(), &cfg, &crate::report::NoopReportSink)
            .unwrap_err();
        match err {
            EslipError::EligibilitySchemaMismatch { missing } => {
                assert_eq!(missing.len(), 3);
            }
            other => panic!("expected schema mismatch, got {other}"),
        }
    }

    #[test]
    fn cape_run_never_routes_to_january() {
        // CAPE + May-June with a January-shaped file parses zero rows under
        // the standard schema instead of erroring.
        let csv = "\
Full Name - name of candidate participating in CSEC January 2026 examination.,Application Processing Type - sent via email,Date of Birth
John Brown,Generate E-candidate slip/Timetable only- $30,2009-04-05
";
        let cfg = config(ExamType::Cape, ExamMonth::MayJune);
        let rows = parse_eligibility(csv.as_bytes(), &cfg, &crate::report::NoopReportSink).unwrap();
        assert!(rows.is_empty());
    }
}
