use super::entities::SubjectEntity;
use super::QuizRepository;
use crate::domain::error::{AppError, Result};
use crate::domain::quiz::Subject;

impl QuizRepository {
    /// Insert a subject, or refresh its display name if the id already exists.
    pub async fn upsert_subject(&self, id: &str, name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO subjects (id, name) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )
        .bind(id)
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to upsert subject {}: {}", id, e)))?;

        Ok(())
    }

    pub async fn find_subjects(&self) -> Result<Vec<Subject>> {
        let entities = sqlx::query_as::<_, SubjectEntity>(
            "SELECT id, name FROM subjects ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch subjects: {}", e)))?;

        Ok(entities.into_iter().map(Subject::from).collect())
    }

    /// Remove a subject together with its questions and incorrect marks.
    pub async fn delete_subject(&self, id: &str) -> Result<()> {
        self.delete_questions_by_subject(id).await?;
        self.delete_incorrects_by_subject(id).await?;

        sqlx::query("DELETE FROM subjects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete subject {}: {}", id, e))
            })?;

        Ok(())
    }
}
