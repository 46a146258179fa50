//! Subject-code directory.
//!
//! Every subject a candidate can sit is identified by a short alphabetic
//! code (`MATHG`, `PHYSICSG`, …). The directory maps codes to display names
//! and doubles as the validity filter: a code not present here is treated as
//! OCR noise and dropped wherever it is encountered — during roster
//! extraction and in the find-details helper alike. That policy is
//! deliberate; scanned rosters routinely produce plausible-looking but
//! invalid codes.
//!
//! The directory is passed explicitly into every component that needs it
//! rather than read from a global, so tests can run against a reduced table
//! and a future deployment can load it from configuration.

use std::collections::BTreeMap;

/// The standard code table from the source domain.
const STANDARD_TABLE: &[(&str, &str)] = &[
    ("ENGAG", "English A"),
    ("ENGBG", "English B"),
    ("MATHG", "Mathematics"),
    ("HISTG", "History"),
    ("GEOGG", "Geography"),
    ("BIOLG", "Biology"),
    ("CHEMG", "Chemistry"),
    ("PHYSICSG", "Physics"),
    ("ECONG", "Economics"),
    ("PRINBG", "Principles of Business"),
    ("PRINAG", "Principles of Accounts"),
    ("SPANSG", "Spanish"),
    ("FRNCHG", "French"),
    ("ITG", "Information Technology"),
    ("ADDMTG", "Additional Mathematics"),
    ("OFFADG", "Office Administration"),
    ("AGSBG", "Agricultural Science (Double Award)"),
    ("AGSCG", "Agricultural Science (Single Award)"),
    ("SOCSG", "Social Studies"),
    ("INTSG", "Integrated Science"),
    ("HUMANG", "Human & Social Biology"),
    ("TDSCG", "Technical Drawing"),
    ("MECHTG", "Mechanical Engineering Technology"),
    ("FOODNG", "Food & Nutrition"),
    ("HTMG", "Hospitality Management"),
    ("ARTSG", "Visual Arts"),
    ("MUSCG", "Music"),
    ("DANCIG", "Dance"),
    ("THEATG", "Theatre Arts"),
    ("PHEDUG", "Physical Education"),
    ("CARITEG", "Caribbean History"),
    ("SOCSTUDG", "Social Studies"),
    ("OA", "Office Administration"),
    ("POAG", "Principles of Accounts"),
    ("HSBIOG", "Human and Social Biology"),
    ("POBG", "Principles of Business"),
    ("INTSCIG", "Integrated Science S/A"),
    ("BIOG", "Biology"),
    ("ADDMATH", "Additional Mathematics"),
    ("CARHISTG", "Caribbean History"),
    ("GEOG", "Geography"),
    ("SPANG", "Spanish"),
    ("FRENG", "French"),
    ("PORTG", "Portuguese"),
    ("EDPMG", "Electronic Document Preparation & Management"),
    ("RELIGEDG", "Religious Education"),
    ("TECHDRG", "Technical Drawing"),
    ("AGSCIDAG", "Agricultural Science D/A"),
    ("AGSCISAG", "Agricultural Science S/A"),
    ("INDTECHG", "Industrial Technology"),
    ("FASHION", "Textiles, Clothing & Fashion"),
    ("FOODNUTH", "Food, Nutrition & Health"),
    ("FAMRESMG", "Family & Resource Management"),
    ("MUSICG", "Music"),
    ("PEASPORT", "Physical Education & Sport"),
    ("THEARTSG", "Theatre Arts"),
    ("VISARTSG", "Visual Arts"),
    ("ACCU1", "Accounting Unit 1"),
    ("ACCU2", "Accounting Unit 2"),
    ("AMTU1", "Applied Mathematics Unit 1"),
    ("AMTU2", "Applied Mathematics Unit 2"),
    ("BIOU1", "Biology Unit 1"),
    ("BIOU2", "Biology Unit 2"),
    ("CARSTDU1", "Caribbean Studies"),
    ("CHEMU1", "Chemistry Unit 1"),
    ("CHEMU2", "Chemistry Unit 2"),
    ("COMMSTU1", "Communication Studies"),
    ("ECONU1", "Economics Unit 1"),
    ("ECONU2", "Economics Unit 2"),
    ("ENTRU1", "Entrepreneurship Unit 1"),
    ("ENTRU2", "Entrepreneurship Unit 2"),
    ("ENSCU1", "Environmental Science Unit 1"),
    ("ENSCU2", "Environmental Science Unit 2"),
    ("FRENU1", "French Unit 1"),
    ("FRENU2", "French Unit 2"),
    ("GEOU1", "Geography Unit 1"),
    ("GEOU2", "Geography Unit 2"),
    ("HISTU2", "History Unit 2"),
    ("INMATU1", "Integrated Mathematics"),
    ("INTHU1", "Information Technology Unit 1"),
    ("INTHU2", "Information Technology Unit 2"),
    ("LAWU1", "Law Unit 1"),
    ("LAWU2", "Law Unit 2"),
    ("LIEU1", "Literatures in English Unit 1"),
    ("LIEU2", "Literatures in English Unit 2"),
    ("MOBU1", "Management of Business Unit 1"),
    ("MOBU2", "Management of Business Unit 2"),
    ("PHYU1", "Physics Unit 1"),
    ("PHYU2", "Physics Unit 2"),
    ("PMATHU1", "Pure Mathematics Unit 1"),
    ("PMATHU2", "Pure Mathematics Unit 2"),
    ("SOCU1", "Sociology Unit 1"),
    ("SOCU2", "Sociology Unit 2"),
    ("SPU1", "Spanish Unit 1"),
    ("SPU2", "Spanish Unit 2"),
    ("TOURU1", "Tourism Unit 1"),
    ("TOURU2", "Tourism Unit 2"),
];

/// Read-only code → display-name lookup.
#[derive(Debug, Clone)]
pub struct SubjectDirectory {
    map: BTreeMap<String, String>,
}

impl SubjectDirectory {
    /// The full standard table.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_TABLE.iter().map(|&(c, n)| (c, n)))
    }

    /// Build a directory from arbitrary entries. Tests use this to run the
    /// extractors against a reduced table.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            map: entries
                .into_iter()
                .map(|(c, n)| (c.to_string(), n.to_string()))
                .collect(),
        }
    }

    /// Whether `code` is a valid subject code.
    pub fn contains(&self, code: &str) -> bool {
        self.map.contains_key(code)
    }

    /// Display name for `code`, falling back to the code itself for unknown
    /// codes (only reachable from manually entered data).
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.map.get(code).map(String::as_str).unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_populated() {
        let dir = SubjectDirectory::standard();
        assert!(dir.len() > 80, "expected the full table, got {}", dir.len());
        assert!(dir.contains("MATHG"));
        assert_eq!(dir.display_name("MATHG"), "Mathematics");
    }

    #[test]
    fn unknown_code_is_invalid_but_displayable() {
        let dir = SubjectDirectory::standard();
        assert!(!dir.contains("ZZZZZ"));
        assert_eq!(dir.display_name("ZZZZZ"), "ZZZZZ");
    }

    #[test]
    fn reduced_table_for_tests() {
        let dir = SubjectDirectory::from_entries([("MATHG", "Mathematics")]);
        assert_eq!(dir.len(), 1);
        assert!(!dir.contains("ENGAG"));
    }
}
