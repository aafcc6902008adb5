use super::entities::IncorrectEntity;
use super::QuizRepository;
use crate::domain::error::{AppError, Result};
use crate::domain::quiz::Incorrect;

impl QuizRepository {
    /// Record a miss. Marking the same question again refreshes its chapter
    /// rather than adding a second row.
    pub async fn upsert_incorrect(&self, incorrect: &Incorrect) -> Result<()> {
        sqlx::query(
            "INSERT INTO incorrects (subject_id, question_id, chapter) VALUES (?, ?, ?)
             ON CONFLICT(subject_id, question_id) DO UPDATE SET chapter = excluded.chapter",
        )
        .bind(&incorrect.subject_id)
        .bind(incorrect.question_id)
        .bind(&incorrect.chapter)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to upsert incorrect {}/{}: {}",
                incorrect.subject_id, incorrect.question_id, e
            ))
        })?;

        Ok(())
    }

    /// Returns whether a mark was actually removed.
    pub async fn delete_incorrect(&self, subject_id: &str, question_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM incorrects WHERE subject_id = ? AND question_id = ?",
        )
        .bind(subject_id)
        .bind(question_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to delete incorrect {}/{}: {}",
                subject_id, question_id, e
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_incorrects_by_subject(&self, subject_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM incorrects WHERE subject_id = ?")
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to delete incorrects for {}: {}",
                    subject_id, e
                ))
            })?;

        Ok(result.rows_affected())
    }

    pub async fn find_incorrects(&self, subject_id: &str) -> Result<Vec<Incorrect>> {
        let entities = sqlx::query_as::<_, IncorrectEntity>(
            "SELECT subject_id, question_id, chapter FROM incorrects
             WHERE subject_id = ? ORDER BY question_id",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch incorrects: {}", e)))?;

        Ok(entities.into_iter().map(Incorrect::from).collect())
    }
}
