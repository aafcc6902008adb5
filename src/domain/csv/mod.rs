// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Value types for parsed CSV content and header canonicalization.
// No I/O, no async, no external dependencies

mod csv_row;
mod header;

pub use csv_row::{CsvField, CsvRow};
pub use header::{
    canonical_header, FIELD_ANSWER, FIELD_CHAPTER, FIELD_EXPLANATION, FIELD_QUESTION,
    FIELD_QUESTION_TYPE, FIELD_SUBJECT, OPTION_FIELDS,
};
