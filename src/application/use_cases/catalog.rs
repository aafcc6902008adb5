use std::sync::Arc;

use tracing::info;

use crate::domain::error::{AppError, Result};
use crate::domain::quiz::{Question, QuestionFilter, Subject};
use crate::infrastructure::db::store::QuestionStore;

/// Read and admin operations over the imported banks.
pub struct CatalogUseCase {
    store: Arc<dyn QuestionStore>,
}

impl CatalogUseCase {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    pub async fn subjects(&self) -> Result<Vec<Subject>> {
        self.store.find_subjects().await
    }

    pub async fn questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        self.store.find_questions(filter).await
    }

    pub async fn chapters(&self, subject_id: &str) -> Result<Vec<String>> {
        self.store.list_chapters(subject_id).await
    }

    /// Drop a subject and everything hanging off it.
    pub async fn remove_subject(&self, id: &str) -> Result<()> {
        let known = self
            .store
            .find_subjects()
            .await?
            .into_iter()
            .any(|subject| subject.id == id);
        if !known {
            return Err(AppError::NotFound(format!("Subject not found: {}", id)));
        }

        self.store.delete_subject(id).await?;
        info!(subject = id, "subject removed");
        Ok(())
    }
}
