use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::domain::csv::CsvRow;
use crate::domain::error::Result;
use crate::domain::quiz::Question;

/// Where a file currently sits in the import pipeline. Logged at each
/// transition so a failed import names the stage it died in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Parsing,
    Validating,
    Accumulated,
    Committing,
    Done,
    Failed,
}

impl ImportStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStage::Parsing => "parsing",
            ImportStage::Validating => "validating",
            ImportStage::Accumulated => "accumulated",
            ImportStage::Committing => "committing",
            ImportStage::Done => "done",
            ImportStage::Failed => "failed",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the parse stage: decoded rows plus the label the subject
/// fallback derives from (the original filename stem for file imports).
#[derive(Debug)]
pub struct ParsedFile {
    pub label: String,
    pub rows: Vec<CsvRow>,
}

/// Why a row was skipped. Formats as a compact `kind:detail` code so
/// rejection lists stay grep-friendly in logs and JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Required fields absent or blank, in subject/chapter/question order.
    MissingFields(Vec<String>),
    /// A choice token that does not parse as a base-10 integer.
    UnparsableAnswer(String),
    /// A questiontype value outside MCQ/FIB/SA.
    UnknownQuestionType(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingFields(fields) => write!(f, "missing:{}", fields.join(",")),
            RejectReason::UnparsableAnswer(token) => write!(f, "invalid:answer:{}", token),
            RejectReason::UnknownQuestionType(raw) => write!(f, "invalid:questiontype:{}", raw),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A skipped row: 1-based data row number (header excluded) and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRejection {
    pub row: usize,
    pub reason: RejectReason,
}

/// Output of the validate stage. Accepted questions carry their final ids;
/// `subjects` is every subject id touched by an accepted row.
#[derive(Debug, Default)]
pub struct ValidatedBatch {
    pub accepted: Vec<Question>,
    pub rejected: Vec<RowRejection>,
    pub subjects: BTreeSet<String>,
}

/// What the caller gets back after a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub questions_processed: usize,
    pub subjects_processed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RowRejection>,
}

/// Per-file result of a directory import. One bad file does not stop the
/// rest, so each entry carries its own outcome.
#[derive(Debug)]
pub struct FileImportOutcome {
    pub file: PathBuf,
    pub result: Result<ImportSummary>,
}
