use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::quiz::{Incorrect, Question, QuestionFilter, Subject};

/// Storage collaborator for the quiz store. Handed to use cases as an
/// `Arc<dyn QuestionStore>`; the import pipeline owns all writes while a
/// commit is running, reads are served freely otherwise.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    // Import-side writes
    async fn upsert_subject(&self, id: &str, name: &str) -> Result<()>;
    async fn delete_questions_by_subject(&self, subject_id: &str) -> Result<u64>;
    async fn delete_incorrects_by_subject(&self, subject_id: &str) -> Result<u64>;
    async fn upsert_question(&self, question: &Question) -> Result<()>;

    // Catalog
    /// Delete a subject and cascade to its questions and bookmarks.
    async fn delete_subject(&self, id: &str) -> Result<()>;
    async fn find_subjects(&self) -> Result<Vec<Subject>>;
    async fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>>;
    /// Distinct chapter labels for a subject, first-seen order.
    async fn list_chapters(&self, subject_id: &str) -> Result<Vec<String>>;

    // Review bookmarks
    async fn upsert_incorrect(&self, incorrect: &Incorrect) -> Result<()>;
    /// Returns whether a bookmark was actually removed.
    async fn delete_incorrect(&self, subject_id: &str, question_id: i64) -> Result<bool>;
    async fn find_incorrects(&self, subject_id: &str) -> Result<Vec<Incorrect>>;
}

/// In-memory store used by pipeline tests and available for dry wiring.
#[derive(Default)]
pub struct InMemoryStore {
    subjects: Mutex<HashMap<String, Subject>>,
    questions: Mutex<HashMap<(String, i64), Question>>,
    incorrects: Mutex<HashMap<(String, i64), Incorrect>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AppError::Internal("in-memory store lock poisoned".to_string()))
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn upsert_subject(&self, id: &str, name: &str) -> Result<()> {
        let mut subjects = lock(&self.subjects)?;
        subjects.insert(
            id.to_string(),
            Subject {
                id: id.to_string(),
                name: name.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_questions_by_subject(&self, subject_id: &str) -> Result<u64> {
        let mut questions = lock(&self.questions)?;
        let before = questions.len();
        questions.retain(|(subject, _), _| subject != subject_id);
        let removed = (before - questions.len()) as u64;
        debug!(subject = subject_id, removed, "Deleted questions for subject");
        Ok(removed)
    }

    async fn delete_incorrects_by_subject(&self, subject_id: &str) -> Result<u64> {
        let mut incorrects = lock(&self.incorrects)?;
        let before = incorrects.len();
        incorrects.retain(|(subject, _), _| subject != subject_id);
        Ok((before - incorrects.len()) as u64)
    }

    async fn upsert_question(&self, question: &Question) -> Result<()> {
        let mut questions = lock(&self.questions)?;
        questions.insert(
            (question.subject_id.clone(), question.question_id),
            question.clone(),
        );
        Ok(())
    }

    async fn delete_subject(&self, id: &str) -> Result<()> {
        lock(&self.subjects)?.remove(id);
        self.delete_questions_by_subject(id).await?;
        self.delete_incorrects_by_subject(id).await?;
        Ok(())
    }

    async fn find_subjects(&self) -> Result<Vec<Subject>> {
        let mut all: Vec<Subject> = lock(&self.subjects)?.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let questions = lock(&self.questions)?;
        let mut found: Vec<Question> = questions
            .values()
            .filter(|q| q.subject_id == filter.subject_id)
            .filter(|q| {
                filter
                    .chapter
                    .as_ref()
                    .map(|chapter| &q.chapter == chapter)
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        found.sort_by_key(|q| q.question_id);
        Ok(found)
    }

    async fn list_chapters(&self, subject_id: &str) -> Result<Vec<String>> {
        let questions = self
            .find_questions(&QuestionFilter::subject(subject_id))
            .await?;
        let mut chapters = Vec::new();
        for question in questions {
            if !chapters.contains(&question.chapter) {
                chapters.push(question.chapter);
            }
        }
        Ok(chapters)
    }

    async fn upsert_incorrect(&self, incorrect: &Incorrect) -> Result<()> {
        let mut incorrects = lock(&self.incorrects)?;
        incorrects.insert(
            (incorrect.subject_id.clone(), incorrect.question_id),
            incorrect.clone(),
        );
        Ok(())
    }

    async fn delete_incorrect(&self, subject_id: &str, question_id: i64) -> Result<bool> {
        let mut incorrects = lock(&self.incorrects)?;
        Ok(incorrects
            .remove(&(subject_id.to_string(), question_id))
            .is_some())
    }

    async fn find_incorrects(&self, subject_id: &str) -> Result<Vec<Incorrect>> {
        let incorrects = lock(&self.incorrects)?;
        let mut found: Vec<Incorrect> = incorrects
            .values()
            .filter(|i| i.subject_id == subject_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| i.question_id);
        Ok(found)
    }
}
