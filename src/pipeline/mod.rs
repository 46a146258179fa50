//! Extraction stages: OCR text in, validated records out.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets a host swap
//! an input source (different OCR backend, a spreadsheet export) without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! pages ──▶ normalize ──▶ scan ──▶ centres / roster
//! (OCR)     (cleanup)    (anchors) (record extraction)
//!
//! CSV rows ──▶ eligibility ──▶ records
//! ```
//!
//! 1. [`normalize`] — per-page OCR text cleanup (confusable glyphs,
//!    stray pipe characters, whitespace)
//! 2. [`scan`]      — anchor discovery: maximal digit runs of a fixed width
//! 3. [`dates`]     — permissive date-of-birth parsing to `dd/mm/yyyy`
//! 4. [`names`]     — name composition, decomposition, and match keys
//! 5. [`eligibility`] — CSV parsing with schema routing and service filters
//! 6. [`centres`]   — centre code → name directory from a centre list scan
//! 7. [`roster`]    — candidate records from a candidate list scan

pub mod centres;
pub mod dates;
pub mod eligibility;
pub mod names;
pub mod normalize;
pub mod roster;
pub mod scan;
