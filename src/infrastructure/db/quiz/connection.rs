use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;

use crate::domain::error::{AppError, Result};

/// Bundled DDL for the quiz store. Applied statement by statement on startup.
const QUIZ_SCHEMA: &str = include_str!("../../../resources/quiz/schema.sql");

/// Bump when the schema gains tables or columns. Version 2 added the
/// `chapter` column to `incorrects`.
const QUIZ_SCHEMA_VERSION: i32 = 2;

/// Open (creating if needed) the quiz database and bring its schema up to
/// date. Safe to call on every startup; all statements are idempotent.
pub async fn init_quiz_db(db_path: &Path) -> Result<()> {
    let pool = connect_pool(db_path).await?;

    let found_version = read_user_version(&pool).await?;
    if found_version > QUIZ_SCHEMA_VERSION {
        return Err(AppError::DatabaseError(format!(
            "Quiz database was written by a newer build: user_version {} exceeds supported {}",
            found_version, QUIZ_SCHEMA_VERSION
        )));
    }

    apply_schema(&pool).await?;
    set_user_version(&pool, QUIZ_SCHEMA_VERSION).await?;

    // Cheap health check so startup fails here rather than on first query.
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Quiz database health check failed: {}", e)))?;

    Ok(())
}

/// Shared connect options for the quiz database. WAL keeps readers unblocked
/// while an import is writing.
pub(crate) async fn connect_pool(db_path: &Path) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(4)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!(
                "Failed to open quiz database {}: {}",
                db_path.display(),
                e
            ))
        })
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in split_sql_statements(QUIZ_SCHEMA) {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql).execute(pool).await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to apply schema statement: {}", e))
        })?;
    }

    // The incorrects table predates its chapter column; older databases pick
    // it up here without a destructive migration.
    ensure_column(pool, "incorrects", "chapter", "TEXT NOT NULL DEFAULT ''").await?;

    Ok(())
}

/// Add a column if the table does not have it yet. SQLite has no
/// ADD COLUMN IF NOT EXISTS, so existence is checked via PRAGMA table_info.
async fn ensure_column(
    pool: &SqlitePool,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<()> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to inspect table {}: {}", table, e))
        })?;

    let present = rows.iter().any(|row| {
        row.try_get::<String, _>("name")
            .map(|name| name == column)
            .unwrap_or(false)
    });
    if present {
        return Ok(());
    }

    sqlx::query(&format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        table, column, definition
    ))
    .execute(pool)
    .await
    .map_err(|e| {
        AppError::DatabaseError(format!(
            "Failed to add column {} to {}: {}",
            column, table, e
        ))
    })?;

    Ok(())
}

async fn read_user_version(pool: &SqlitePool) -> Result<i32> {
    let row = sqlx::query("PRAGMA user_version")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to read user_version: {}", e)))?;
    row.try_get::<i32, _>(0)
        .map_err(|e| AppError::DatabaseError(format!("Failed to decode user_version: {}", e)))
}

async fn set_user_version(pool: &SqlitePool, version: i32) -> Result<()> {
    // PRAGMA does not support bind parameters.
    sqlx::query(&format!("PRAGMA user_version = {}", version))
        .execute(pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to set user_version: {}", e)))?;
    Ok(())
}

/// Split bundled DDL into executable statements. Semicolons inside quoted
/// strings and line comments do not terminate a statement. The schema has no
/// triggers, so BEGIN..END bodies need no special handling.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut in_line_comment = false;

    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        if in_line_comment {
            current.push(c);
            if c == '\n' {
                in_line_comment = false;
            }
            continue;
        }

        match c {
            '-' if !in_single_quote && !in_double_quote && chars.peek() == Some(&'-') => {
                in_line_comment = true;
            }
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            ';' if !in_single_quote && !in_double_quote => {
                current.push(';');
                statements.push(current.clone());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    if !current.trim().is_empty() {
        statements.push(current);
    }

    statements
}
