use super::entities::QuestionEntity;
use super::QuizRepository;
use crate::domain::error::{AppError, Result};
use crate::domain::quiz::{Question, QuestionFilter};

const QUESTION_COLUMNS: &str = "subject_id, question_id, chapter, question_type, \
     question_text, options_json, answer_json, explanation";

impl QuizRepository {
    /// Write a question, replacing any earlier row with the same
    /// (subject_id, question_id) pair. Options and answer are stored as JSON
    /// text so the sparse option keys survive round trips.
    pub async fn upsert_question(&self, question: &Question) -> Result<()> {
        let options_json = serde_json::to_string(&question.options)
            .map_err(|e| AppError::Internal(format!("Failed to encode options: {}", e)))?;
        let answer_json = serde_json::to_string(&question.answer)
            .map_err(|e| AppError::Internal(format!("Failed to encode answer: {}", e)))?;

        sqlx::query(
            "INSERT INTO questions (subject_id, question_id, chapter, question_type,
                                    question_text, options_json, answer_json, explanation,
                                    imported_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(subject_id, question_id) DO UPDATE SET
                 chapter = excluded.chapter,
                 question_type = excluded.question_type,
                 question_text = excluded.question_text,
                 options_json = excluded.options_json,
                 answer_json = excluded.answer_json,
                 explanation = excluded.explanation,
                 imported_at = excluded.imported_at",
        )
        .bind(&question.subject_id)
        .bind(question.question_id)
        .bind(&question.chapter)
        .bind(question.question_type.as_str())
        .bind(&question.question_text)
        .bind(&options_json)
        .bind(&answer_json)
        .bind(&question.explanation)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to upsert question {}/{}: {}",
                question.subject_id, question.question_id, e
            ))
        })?;

        Ok(())
    }

    pub async fn delete_questions_by_subject(&self, subject_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM questions WHERE subject_id = ?")
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Failed to delete questions for {}: {}",
                    subject_id, e
                ))
            })?;

        Ok(result.rows_affected())
    }

    pub async fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
        let entities = match &filter.chapter {
            Some(chapter) => {
                sqlx::query_as::<_, QuestionEntity>(&format!(
                    "SELECT {} FROM questions WHERE subject_id = ? AND chapter = ? \
                     ORDER BY question_id",
                    QUESTION_COLUMNS
                ))
                .bind(&filter.subject_id)
                .bind(chapter)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, QuestionEntity>(&format!(
                    "SELECT {} FROM questions WHERE subject_id = ? ORDER BY question_id",
                    QUESTION_COLUMNS
                ))
                .bind(&filter.subject_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch questions: {}", e)))?;

        Ok(entities.into_iter().map(Question::from).collect())
    }

    /// Chapters for a subject in the order they first appear in the bank.
    pub async fn list_chapters(&self, subject_id: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT chapter FROM questions WHERE subject_id = ?
             GROUP BY chapter ORDER BY MIN(question_id)",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list chapters: {}", e)))
    }
}
