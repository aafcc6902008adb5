use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::path::Path;

use crate::domain::error::Result;
use crate::domain::quiz::{Incorrect, Question, QuestionFilter, Subject};
use crate::infrastructure::db::store::QuestionStore;

mod entities;
mod incorrects;
mod questions;
mod subjects;

/// SQLite-backed quiz store. Query methods live in the per-concern modules;
/// this file owns the pool and the `QuestionStore` wiring.
pub struct QuizRepository {
    pool: SqlitePool,
}

impl QuizRepository {
    /// Open a pool against an already initialized database. Run
    /// `init_quiz_db` first so the schema exists.
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let pool = super::connection::connect_pool(db_path).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl QuestionStore for QuizRepository {
    async fn upsert_subject(&self, id: &str, name: &str) -> Result<()> {
        QuizRepository::upsert_subject(self, id, name).await
    }

    async fn delete_questions_by_subject(&self, subject_id: &str) -> Result<u64> {
        QuizRepository::delete_questions_by_subject(self, subject_id).await
    }

    async fn delete_incorrects_by_subject(&self, subject_id: &str) -> Result<u64> {
        QuizRepository::delete_incorrects_by_subject(self, subject_id).await
    }

    async fn upsert_question(&self, question: &Question) -> Result<()> {
        QuizRepository::upsert_question(self, question).await
    }

    async fn delete_subject(&self, id: &str) -> Result<()> {
        QuizRepository::delete_subject(self, id).await
    }

    async fn find_subjects(&self) -> Result<Vec<Subject>> {
        QuizRepository::find_subjects(self).await
    }

    async fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        QuizRepository::find_questions(self, filter).await
    }

    async fn list_chapters(&self, subject_id: &str) -> Result<Vec<String>> {
        QuizRepository::list_chapters(self, subject_id).await
    }

    async fn upsert_incorrect(&self, incorrect: &Incorrect) -> Result<()> {
        QuizRepository::upsert_incorrect(self, incorrect).await
    }

    async fn delete_incorrect(&self, subject_id: &str, question_id: i64) -> Result<bool> {
        QuizRepository::delete_incorrect(self, subject_id, question_id).await
    }

    async fn find_incorrects(&self, subject_id: &str) -> Result<Vec<Incorrect>> {
        QuizRepository::find_incorrects(self, subject_id).await
    }
}
