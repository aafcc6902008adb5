use std::sync::Arc;

use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::quiz::{Incorrect, QuestionFilter};
use crate::infrastructure::db::store::QuestionStore;

/// Tracks which questions a learner got wrong. Marks live next to the bank
/// and are swept whenever the subject is re-imported.
pub struct ReviewTrackingUseCase {
    store: Arc<dyn QuestionStore>,
}

impl ReviewTrackingUseCase {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    /// Mark a question as answered wrong. The chapter is taken from the
    /// stored question, so the question has to exist. Marking twice keeps a
    /// single mark.
    pub async fn mark_incorrect(&self, subject_id: &str, question_id: i64) -> Result<Incorrect> {
        let question = self
            .store
            .find_questions(&QuestionFilter::subject(subject_id))
            .await?
            .into_iter()
            .find(|question| question.question_id == question_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Question not found: {}/{}",
                    subject_id, question_id
                ))
            })?;

        let mark = Incorrect {
            subject_id: question.subject_id,
            question_id: question.question_id,
            chapter: question.chapter,
        };
        self.store.upsert_incorrect(&mark).await?;
        debug!(subject = %mark.subject_id, question = mark.question_id, "marked incorrect");
        Ok(mark)
    }

    /// Clear a mark after the question is answered correctly. Resolving a
    /// question that was never marked is not an error.
    pub async fn resolve_incorrect(&self, subject_id: &str, question_id: i64) -> Result<bool> {
        let removed = self.store.delete_incorrect(subject_id, question_id).await?;
        debug!(
            subject = subject_id,
            question = question_id,
            removed, "resolved incorrect"
        );
        Ok(removed)
    }

    pub async fn incorrects(&self, subject_id: &str) -> Result<Vec<Incorrect>> {
        self.store.find_incorrects(subject_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quiz::{Answer, Question, QuestionType};
    use crate::infrastructure::db::store::InMemoryStore;
    use std::collections::BTreeMap;

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .upsert_question(&Question {
                subject_id: "PHYSICS".to_string(),
                question_id: 2,
                chapter: "Waves".to_string(),
                question_type: QuestionType::Mcq,
                question_text: "Q?".to_string(),
                options: BTreeMap::new(),
                answer: Answer::Choices(vec![0]),
                explanation: String::new(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_mark_takes_chapter_from_the_question() {
        let store = seeded_store().await;
        let review = ReviewTrackingUseCase::new(store.clone());

        let mark = review.mark_incorrect("PHYSICS", 2).await.unwrap();
        assert_eq!(mark.chapter, "Waves");

        let marks = review.incorrects("PHYSICS").await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].question_id, 2);
    }

    #[tokio::test]
    async fn test_marking_an_unknown_question_fails() {
        let store = seeded_store().await;
        let review = ReviewTrackingUseCase::new(store);

        let err = review.mark_incorrect("PHYSICS", 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let store = seeded_store().await;
        let review = ReviewTrackingUseCase::new(store);

        review.mark_incorrect("PHYSICS", 2).await.unwrap();
        assert!(review.resolve_incorrect("PHYSICS", 2).await.unwrap());
        assert!(!review.resolve_incorrect("PHYSICS", 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_double_mark_keeps_one_row() {
        let store = seeded_store().await;
        let review = ReviewTrackingUseCase::new(store);

        review.mark_incorrect("PHYSICS", 2).await.unwrap();
        review.mark_incorrect("PHYSICS", 2).await.unwrap();
        assert_eq!(review.incorrects("PHYSICS").await.unwrap().len(), 1);
    }
}
