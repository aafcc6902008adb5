use crate::domain::quiz::{Answer, Incorrect, Question, QuestionType, Subject};

/// Row shapes as stored in SQLite. Conversions into domain types are lenient:
/// a damaged JSON column yields an empty value rather than failing the fetch.

#[derive(Debug, sqlx::FromRow)]
pub(super) struct SubjectEntity {
    pub id: String,
    pub name: String,
}

impl From<SubjectEntity> for Subject {
    fn from(entity: SubjectEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct QuestionEntity {
    pub subject_id: String,
    pub question_id: i64,
    pub chapter: String,
    pub question_type: String,
    pub question_text: String,
    pub options_json: String,
    pub answer_json: String,
    pub explanation: String,
}

impl From<QuestionEntity> for Question {
    fn from(entity: QuestionEntity) -> Self {
        let question_type =
            QuestionType::parse(&entity.question_type).unwrap_or(QuestionType::Mcq);
        let options = serde_json::from_str(&entity.options_json).unwrap_or_default();
        let answer = serde_json::from_str(&entity.answer_json)
            .unwrap_or_else(|_| Answer::Choices(Vec::new()));

        Self {
            subject_id: entity.subject_id,
            question_id: entity.question_id,
            chapter: entity.chapter,
            question_type,
            question_text: entity.question_text,
            options,
            answer,
            explanation: entity.explanation,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct IncorrectEntity {
    pub subject_id: String,
    pub question_id: i64,
    pub chapter: String,
}

impl From<IncorrectEntity> for Incorrect {
    fn from(entity: IncorrectEntity) -> Self {
        Self {
            subject_id: entity.subject_id,
            question_id: entity.question_id,
            chapter: entity.chapter,
        }
    }
}
