use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::error::{AppError, Result};
use crate::domain::quiz::Subject;
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::db::store::QuestionStore;
use crate::infrastructure::storage::TempUpload;

mod row_builder;
mod types;

pub use types::{
    FileImportOutcome, ImportStage, ImportSummary, ParsedFile, RejectReason, RowRejection,
    ValidatedBatch,
};

use self::row_builder::build_question;

/// Imports CSV question banks into the quiz store.
///
/// An import runs in stages: parse the file into rows, validate each row into
/// a question (skipping bad rows), then replace every touched subject's bank
/// in the store. Each stage consumes its input and hands a fresh value to the
/// next, so a half-validated batch can never leak into a commit.
pub struct QuestionImportUseCase {
    store: Arc<dyn QuestionStore>,
}

impl QuestionImportUseCase {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    /// Import a CSV file in place. The file is read, never moved or deleted;
    /// its name stem becomes the label for subject fallback.
    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary> {
        info!(stage = %ImportStage::Parsing, file = %path.display(), "parsing csv file");
        let label = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();
        let rows = CsvParser::parse_file_auto_detect(path)?;
        self.run(ParsedFile { label, rows }).await
    }

    /// Import CSV text that never touched disk.
    pub async fn import_content(&self, content: &str, label: &str) -> Result<ImportSummary> {
        info!(stage = %ImportStage::Parsing, label, "parsing csv content");
        let delimiter = CsvParser::detect_delimiter(content);
        let rows = CsvParser::new()
            .with_delimiter(delimiter)
            .parse_content(content)?;
        self.run(ParsedFile {
            label: label.to_string(),
            rows,
        })
        .await
    }

    /// Import a staged upload. Taking the guard by value means the staged
    /// file is removed when this returns, on success and failure alike.
    pub async fn import_upload(&self, upload: TempUpload) -> Result<ImportSummary> {
        info!(stage = %ImportStage::Parsing, file = %upload.path().display(), "parsing staged upload");
        let label = upload.label();
        let rows = CsvParser::parse_file_auto_detect(upload.path())?;
        self.run(ParsedFile { label, rows }).await
    }

    /// Import every `.csv` file in a directory, in filename order. A failing
    /// file is reported in its outcome slot and the rest still run.
    pub async fn import_dir(&self, dir: &Path) -> Result<Vec<FileImportOutcome>> {
        let entries = fs::read_dir(dir).map_err(|e| {
            AppError::IoError(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AppError::IoError(format!("Failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            let is_csv = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false);
            if is_csv {
                files.push(path);
            }
        }
        files.sort();

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let result = self.import_file(&file).await;
            if let Err(e) = &result {
                warn!(file = %file.display(), error = %e, "file import failed, continuing");
            }
            outcomes.push(FileImportOutcome { file, result });
        }
        Ok(outcomes)
    }

    async fn run(&self, parsed: ParsedFile) -> Result<ImportSummary> {
        info!(
            stage = %ImportStage::Validating,
            label = %parsed.label,
            rows = parsed.rows.len(),
            "validating rows"
        );
        let batch = match self.validate(parsed) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(stage = %ImportStage::Failed, error = %e, "import failed");
                return Err(e);
            }
        };
        info!(
            stage = %ImportStage::Accumulated,
            questions = batch.accepted.len(),
            subjects = batch.subjects.len(),
            skipped = batch.rejected.len(),
            "batch ready"
        );

        info!(stage = %ImportStage::Committing, "writing batch to store");
        match self.commit(batch).await {
            Ok(summary) => {
                info!(
                    stage = %ImportStage::Done,
                    questions = summary.questions_processed,
                    subjects = summary.subjects_processed,
                    "import complete"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(stage = %ImportStage::Failed, error = %e, "commit failed, partial writes may remain");
                Err(e)
            }
        }
    }

    /// Turn parsed rows into an accumulated batch. Question ids count up from
    /// 1 across the whole import and only advance when a row is accepted, so
    /// a skipped row never leaves a hole in the sequence.
    fn validate(&self, parsed: ParsedFile) -> Result<ValidatedBatch> {
        let mut batch = ValidatedBatch::default();
        let mut next_id: i64 = 1;

        for row in &parsed.rows {
            match build_question(row, &parsed.label, next_id) {
                Ok(question) => {
                    batch.subjects.insert(question.subject_id.clone());
                    batch.accepted.push(question);
                    next_id += 1;
                }
                Err(reason) => {
                    let rejection = RowRejection {
                        row: row.index + 1,
                        reason,
                    };
                    warn!(row = rejection.row, reason = %rejection.reason, "skipping row");
                    batch.rejected.push(rejection);
                }
            }
        }

        if batch.accepted.is_empty() {
            return Err(AppError::EmptyImport(format!(
                "No importable questions found in {}: {} rows scanned, {} skipped",
                parsed.label,
                parsed.rows.len(),
                batch.rejected.len()
            )));
        }
        Ok(batch)
    }

    /// Replace each touched subject's bank, then write the questions. There
    /// is no rollback: a write failure aborts with the progress made so far
    /// in its message, and re-running the import repairs the store because
    /// every touched subject is swept before its questions land.
    async fn commit(&self, batch: ValidatedBatch) -> Result<ImportSummary> {
        let subject_total = batch.subjects.len();
        let question_total = batch.accepted.len();
        let mut subjects_replaced = 0usize;
        let mut questions_written = 0usize;

        for subject_id in &batch.subjects {
            let step = async {
                self.store.delete_questions_by_subject(subject_id).await?;
                self.store.delete_incorrects_by_subject(subject_id).await?;
                let subject = Subject::from_id(subject_id);
                self.store.upsert_subject(&subject.id, &subject.name).await
            };
            step.await.map_err(|e| {
                commit_error(
                    e,
                    subjects_replaced,
                    subject_total,
                    questions_written,
                    question_total,
                )
            })?;
            subjects_replaced += 1;
        }

        for question in &batch.accepted {
            self.store.upsert_question(question).await.map_err(|e| {
                commit_error(
                    e,
                    subjects_replaced,
                    subject_total,
                    questions_written,
                    question_total,
                )
            })?;
            questions_written += 1;
        }

        Ok(ImportSummary {
            questions_processed: question_total,
            subjects_processed: subject_total,
            rejected: batch.rejected,
        })
    }
}

fn commit_error(
    source: AppError,
    subjects_replaced: usize,
    subject_total: usize,
    questions_written: usize,
    question_total: usize,
) -> AppError {
    AppError::DatabaseError(format!(
        "Import halted after {}/{} subjects replaced and {}/{} questions written: {}",
        subjects_replaced, subject_total, questions_written, question_total, source
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quiz::{Answer, Incorrect, Question, QuestionFilter};
    use crate::infrastructure::db::store::InMemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PHYSICS_BANK: &str = "\
subject,chapter,question,questiontype,option_1,option_2,option_3,option_4,answer,explanation
PHYSICS,Waves,Speed of sound in dry air?,MCQ,330,340,343,350,3,About 343 m/s at 20C
PHYSICS,Waves,Sound is which kind of wave?,MCQ,transverse,longitudinal,standing,surface,2,
PHYSICS,Waves,Unit of frequency?,MCQ,hertz,newton,joule,watt,1,
PHYSICS,Optics,Light bends toward the normal when entering glass.,MCQ,true,false,,,1,Refraction into a denser medium
PHYSICS,,This row has no chapter and is skipped,MCQ,a,b,,,1,
PHYSICS,Optics,Focal length sign for a diverging lens?,MCQ,positive,negative,zero,,2,
PHYSICS,Mechanics,Gravitational acceleration near the surface in m/s2?,FIB,,,,,9.8,
PHYSICS,Mechanics,Which are vector quantities?,SA,speed,velocity,mass,force,\"2, 4\",
PHYSICS,Mechanics,F = ma is Newton's which law?,MCQ,first,second,third,,2,
PHYSICS,Heat,Heat flows from hot to cold.,MCQ,true,false,,,1,
";

    fn store_and_use_case() -> (Arc<InMemoryStore>, QuestionImportUseCase) {
        let store = Arc::new(InMemoryStore::new());
        let use_case = QuestionImportUseCase::new(store.clone());
        (store, use_case)
    }

    async fn questions(store: &InMemoryStore, subject_id: &str) -> Vec<Question> {
        store
            .find_questions(&QuestionFilter::subject(subject_id))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_import_commits_valid_rows_and_skips_bad_ones() {
        let (store, use_case) = store_and_use_case();

        let summary = use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();
        assert_eq!(summary.questions_processed, 9);
        assert_eq!(summary.subjects_processed, 1);
        assert_eq!(summary.rejected.len(), 1);
        assert_eq!(summary.rejected[0].row, 5);
        assert_eq!(summary.rejected[0].reason.to_string(), "missing:chapter");

        let stored = questions(&store, "PHYSICS").await;
        assert_eq!(stored.len(), 9);
        let ids: Vec<i64> = stored.iter().map(|q| q.question_id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_skipped_rows_do_not_consume_ids() {
        let (store, use_case) = store_and_use_case();
        use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();

        let stored = questions(&store, "PHYSICS").await;
        // Row 6 is the first accepted row after the skip and gets id 5.
        let after_skip = stored.iter().find(|q| q.question_id == 5).unwrap();
        assert!(after_skip.question_text.starts_with("Focal length"));
    }

    #[tokio::test]
    async fn test_headers_are_matched_case_insensitively() {
        let (store, use_case) = store_and_use_case();

        let content = "\
Subject, CHAPTER ,Question,Type,Option_1,Option_2,Answers
PHYSICS,Waves,Unit of frequency?,MCQ,hertz,newton,1
";
        let summary = use_case.import_content(content, "bank").await.unwrap();
        assert_eq!(summary.questions_processed, 1);

        let stored = questions(&store, "PHYSICS").await;
        assert_eq!(stored[0].chapter, "Waves");
        assert_eq!(stored[0].answer, Answer::Choices(vec![0]));
        assert_eq!(stored[0].options.len(), 2);
    }

    #[tokio::test]
    async fn test_fib_answers_keep_raw_text() {
        let (store, use_case) = store_and_use_case();
        use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();

        let stored = questions(&store, "PHYSICS").await;
        let fib = stored
            .iter()
            .find(|q| q.question_text.starts_with("Gravitational"))
            .unwrap();
        assert_eq!(fib.answer, Answer::Text(vec!["9.8".to_string()]));
        assert!(fib.options.is_empty());
    }

    #[tokio::test]
    async fn test_reimport_is_idempotent() {
        let (store, use_case) = store_and_use_case();

        use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();
        let first = questions(&store, "PHYSICS").await;

        use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();
        let second = questions(&store, "PHYSICS").await;

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.question_id, b.question_id);
            assert_eq!(a.question_text, b.question_text);
        }
    }

    #[tokio::test]
    async fn test_reimport_replaces_a_shrunk_bank() {
        let (store, use_case) = store_and_use_case();

        use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();
        assert_eq!(questions(&store, "PHYSICS").await.len(), 9);

        let smaller = "\
subject,chapter,question,option_1,option_2,answer
PHYSICS,Waves,Unit of frequency?,hertz,newton,1
PHYSICS,Waves,Unit of power?,watt,joule,1
";
        use_case.import_content(smaller, "physics_v2").await.unwrap();

        let stored = questions(&store, "PHYSICS").await;
        assert_eq!(stored.len(), 2);
        assert_eq!(
            stored.iter().map(|q| q.question_id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[tokio::test]
    async fn test_reimport_sweeps_incorrect_marks() {
        let (store, use_case) = store_and_use_case();

        use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();
        store
            .upsert_incorrect(&Incorrect {
                subject_id: "PHYSICS".to_string(),
                question_id: 3,
                chapter: "Waves".to_string(),
            })
            .await
            .unwrap();

        use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap();
        assert!(store.find_incorrects("PHYSICS").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multi_subject_file_shares_one_id_sequence() {
        let (store, use_case) = store_and_use_case();

        let content = "\
subject,chapter,question,option_1,option_2,answer
PHYSICS,Waves,P1?,a,b,1
CHEMISTRY,Acids,C1?,a,b,1
PHYSICS,Waves,P2?,a,b,2
CHEMISTRY,Acids,C2?,a,b,2
";
        let summary = use_case.import_content(content, "mixed").await.unwrap();
        assert_eq!(summary.questions_processed, 4);
        assert_eq!(summary.subjects_processed, 2);

        let physics: Vec<i64> = questions(&store, "PHYSICS")
            .await
            .iter()
            .map(|q| q.question_id)
            .collect();
        let chemistry: Vec<i64> = questions(&store, "CHEMISTRY")
            .await
            .iter()
            .map(|q| q.question_id)
            .collect();
        assert_eq!(physics, vec![1, 3]);
        assert_eq!(chemistry, vec![2, 4]);
    }

    #[tokio::test]
    async fn test_subject_rows_get_uppercased_names() {
        let (store, use_case) = store_and_use_case();

        let content = "\
subject,chapter,question,option_1,option_2,answer
physics,Waves,Q?,a,b,1
";
        use_case.import_content(content, "bank").await.unwrap();

        let subjects = store.find_subjects().await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].id, "physics");
        assert_eq!(subjects[0].name, "PHYSICS");
    }

    #[tokio::test]
    async fn test_header_only_content_is_an_empty_import() {
        let (_, use_case) = store_and_use_case();

        let err = use_case
            .import_content("subject,chapter,question,answer\n", "bank")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyImport(_)));
    }

    #[tokio::test]
    async fn test_all_rows_invalid_is_an_empty_import() {
        let (store, use_case) = store_and_use_case();

        let content = "\
subject,chapter,question,answer
PHYSICS,,Q1?,1
PHYSICS,,Q2?,1
";
        let err = use_case.import_content(content, "bank").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyImport(_)));
        let message = err.to_string();
        assert!(message.contains("2 rows scanned, 2 skipped"), "{}", message);
        assert!(questions(&store, "PHYSICS").await.is_empty());
    }

    #[tokio::test]
    async fn test_upload_artifact_removed_on_success_and_failure() {
        let (_, use_case) = store_and_use_case();
        let dir = tempfile::tempdir().unwrap();

        let upload =
            TempUpload::stage(dir.path(), "physics_bank.csv", PHYSICS_BANK.as_bytes()).unwrap();
        let staged = upload.path().to_path_buf();
        use_case.import_upload(upload).await.unwrap();
        assert!(!staged.exists());

        let upload =
            TempUpload::stage(dir.path(), "empty.csv", b"subject,chapter,question\n").unwrap();
        let staged = upload.path().to_path_buf();
        assert!(use_case.import_upload(upload).await.is_err());
        assert!(!staged.exists());
    }

    #[tokio::test]
    async fn test_directory_import_continues_past_bad_files() {
        let (store, use_case) = store_and_use_case();
        let dir = tempfile::tempdir().unwrap();

        std::fs::write(dir.path().join("chem_basics.csv"), "subject,chapter\n").unwrap();
        std::fs::write(dir.path().join("physics_bank.csv"), PHYSICS_BANK).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a bank").unwrap();

        let outcomes = use_case.import_dir(dir.path()).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].file.ends_with("chem_basics.csv"));
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].file.ends_with("physics_bank.csv"));
        assert!(outcomes[1].result.is_ok());

        assert_eq!(questions(&store, "PHYSICS").await.len(), 9);
    }

    /// Store that starts failing question writes after a set number succeed.
    struct FlakyStore {
        inner: InMemoryStore,
        fail_after: usize,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl QuestionStore for FlakyStore {
        async fn upsert_subject(&self, id: &str, name: &str) -> Result<()> {
            self.inner.upsert_subject(id, name).await
        }
        async fn delete_questions_by_subject(&self, subject_id: &str) -> Result<u64> {
            self.inner.delete_questions_by_subject(subject_id).await
        }
        async fn delete_incorrects_by_subject(&self, subject_id: &str) -> Result<u64> {
            self.inner.delete_incorrects_by_subject(subject_id).await
        }
        async fn upsert_question(&self, question: &Question) -> Result<()> {
            if self.writes.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
                return Err(AppError::DatabaseError("disk full".to_string()));
            }
            self.inner.upsert_question(question).await
        }
        async fn delete_subject(&self, id: &str) -> Result<()> {
            self.inner.delete_subject(id).await
        }
        async fn find_subjects(&self) -> Result<Vec<crate::domain::quiz::Subject>> {
            self.inner.find_subjects().await
        }
        async fn find_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>> {
            self.inner.find_questions(filter).await
        }
        async fn list_chapters(&self, subject_id: &str) -> Result<Vec<String>> {
            self.inner.list_chapters(subject_id).await
        }
        async fn upsert_incorrect(&self, incorrect: &Incorrect) -> Result<()> {
            self.inner.upsert_incorrect(incorrect).await
        }
        async fn delete_incorrect(&self, subject_id: &str, question_id: i64) -> Result<bool> {
            self.inner.delete_incorrect(subject_id, question_id).await
        }
        async fn find_incorrects(&self, subject_id: &str) -> Result<Vec<Incorrect>> {
            self.inner.find_incorrects(subject_id).await
        }
    }

    #[tokio::test]
    async fn test_commit_failure_reports_progress_and_keeps_partial_writes() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryStore::new(),
            fail_after: 4,
            writes: AtomicUsize::new(0),
        });
        let use_case = QuestionImportUseCase::new(store.clone());

        let err = use_case
            .import_content(PHYSICS_BANK, "physics_bank")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("1/1 subjects replaced"), "{}", message);
        assert!(message.contains("4/9 questions written"), "{}", message);

        // No rollback: the four writes that succeeded are still there.
        let kept = store
            .inner
            .find_questions(&QuestionFilter::subject("PHYSICS"))
            .await
            .unwrap();
        assert_eq!(kept.len(), 4);
    }
}
