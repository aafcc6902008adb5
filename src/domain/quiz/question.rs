use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuestionType {
    /// Multiple choice, possibly with several correct indices
    Mcq,
    /// Fill in the blank, free-text answer
    Fib,
    /// Single answer selected among the options
    Sa,
}

impl QuestionType {
    /// Parse the exact stored spelling. Matching is strict; files carry the
    /// uppercase tokens verbatim and anything else is not a known type.
    pub fn parse(raw: &str) -> Option<QuestionType> {
        match raw {
            "MCQ" => Some(QuestionType::Mcq),
            "FIB" => Some(QuestionType::Fib),
            "SA" => Some(QuestionType::Sa),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "MCQ",
            QuestionType::Fib => "FIB",
            QuestionType::Sa => "SA",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored answer representation, shape keyed to the question type:
/// MCQ/SA hold zero-based indices into the options map, FIB holds the
/// free-text answer as a one-element sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Choices(Vec<i64>),
    Text(Vec<String>),
}

impl Answer {
    pub fn text(raw: impl Into<String>) -> Answer {
        Answer::Text(vec![raw.into()])
    }

    pub fn choices(indices: Vec<i64>) -> Answer {
        Answer::Choices(indices)
    }
}

/// A normalized question record. `question_id` is unique only within its
/// subject and is reassigned from 1 on every import of that subject's file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub subject_id: String,
    pub question_id: i64,
    pub chapter: String,
    pub question_type: QuestionType,
    pub question_text: String,
    /// Sparse, source-position-keyed option texts (0..=5). Positions left
    /// empty in the file stay absent here; keys are never compacted.
    pub options: BTreeMap<u8, String>,
    pub answer: Answer,
    pub explanation: String,
}

/// Filter for the read-side question lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionFilter {
    pub subject_id: String,
    pub chapter: Option<String>,
}

impl QuestionFilter {
    pub fn subject(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            chapter: None,
        }
    }

    pub fn with_chapter(mut self, chapter: impl Into<String>) -> Self {
        self.chapter = Some(chapter.into());
        self
    }
}
