use serde::{Deserialize, Serialize};

/// Bookmark recording that a learner answered a question wrong, used to
/// drive review queues. Unique per (subject, question); refreshed on every
/// wrong-answer report and swept away when the subject is re-imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incorrect {
    pub subject_id: String,
    pub question_id: i64,
    pub chapter: String,
}
