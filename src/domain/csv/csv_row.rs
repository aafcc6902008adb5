// ============================================================
// CSV ROW TYPES
// ============================================================
// Data structures representing parsed CSV content

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::header::{canonical_header, normalize_header};

/// A single field in a CSV row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvField {
    /// Original field name (header)
    pub name: String,

    /// Canonical field name (see `canonical_header`)
    pub canonical_name: String,

    /// Field value
    pub value: String,

    /// Whether the value is empty after trimming
    pub is_empty: bool,

    /// Whether the canonical name came from a legacy alias (`answers`,
    /// `type`, `subject_id`) rather than the column's own name
    pub is_alias: bool,
}

impl CsvField {
    pub fn new(name: String, value: String) -> Self {
        let is_empty = value.trim().is_empty();
        let canonical_name = canonical_header(&name);
        let is_alias = canonical_name != normalize_header(&name);

        Self {
            name,
            canonical_name,
            value,
            is_empty,
            is_alias,
        }
    }
}

/// A single row in a CSV file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRow {
    /// Row index (0-based, header excluded)
    pub index: usize,

    /// All fields in this row
    pub fields: Vec<CsvField>,

    /// Canonical-name lookup over the non-empty fields
    pub field_map: HashMap<String, String>,
}

impl CsvRow {
    pub fn new(index: usize, fields: Vec<CsvField>) -> Self {
        // Direct columns first, then legacy alias columns fill the gaps.
        // A file carrying both `answer` and `answers` keeps the `answer`
        // value no matter which column comes first.
        let mut field_map: HashMap<String, String> = fields
            .iter()
            .filter(|f| !f.is_empty && !f.is_alias)
            .map(|f| (f.canonical_name.clone(), f.value.clone()))
            .collect();
        for f in fields.iter().filter(|f| !f.is_empty && f.is_alias) {
            field_map
                .entry(f.canonical_name.clone())
                .or_insert_with(|| f.value.clone());
        }

        Self {
            index,
            fields,
            field_map,
        }
    }

    /// Look up a canonical field, None when absent or blank.
    pub fn get(&self, canonical_name: &str) -> Option<&str> {
        self.field_map.get(canonical_name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        let fields = pairs
            .iter()
            .map(|(name, value)| CsvField::new(name.to_string(), value.to_string()))
            .collect();
        CsvRow::new(0, fields)
    }

    #[test]
    fn test_field_map_uses_canonical_names() {
        let row = row(&[("Subject ", "phys"), ("Type", "FIB")]);
        assert_eq!(row.get("subject"), Some("phys"));
        assert_eq!(row.get("questiontype"), Some("FIB"));
        assert_eq!(row.get("type"), None);
    }

    #[test]
    fn test_blank_values_are_absent() {
        let row = row(&[("chapter", "  "), ("question", "What is 2 + 2?")]);
        assert_eq!(row.get("chapter"), None);
        assert_eq!(row.get("question"), Some("What is 2 + 2?"));
    }

    #[test]
    fn test_alias_columns_fill_gaps_only() {
        let row = row(&[("answers", "2")]);
        assert_eq!(row.get("answer"), Some("2"));
    }

    #[test]
    fn test_direct_column_beats_alias_in_either_order() {
        let direct_first = row(&[("answer", "1"), ("answers", "2")]);
        assert_eq!(direct_first.get("answer"), Some("1"));

        let alias_first = row(&[("answers", "2"), ("answer", "1")]);
        assert_eq!(alias_first.get("answer"), Some("1"));
    }

    #[test]
    fn test_blank_direct_column_lets_alias_through() {
        let row = row(&[("answer", "  "), ("answers", "2")]);
        assert_eq!(row.get("answer"), Some("2"));
    }
}
