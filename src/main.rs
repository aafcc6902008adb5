use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use quizbank::application::{CatalogUseCase, QuestionImportUseCase, ReviewTrackingUseCase};
use quizbank::domain::quiz::QuestionFilter;
use quizbank::infrastructure::config::AppConfig;
use quizbank::infrastructure::db::quiz::{init_quiz_db, QuizRepository};
use quizbank::infrastructure::db::store::QuestionStore;
use quizbank::infrastructure::storage::TempUpload;

#[derive(Parser)]
#[command(name = "quizbank")]
#[command(about = "CSV question-bank importer with replace-upsert quiz storage")]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides quizbank.toml and QUIZBANK_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import CSV files, replacing every subject they touch
    Import {
        /// CSV files to import, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Import every .csv file in a directory, continuing past failures
    Seed {
        /// Directory of CSV files
        dir: PathBuf,
    },
    /// List imported subjects
    Subjects,
    /// List a subject's chapters in first-seen order
    Chapters {
        /// Subject id
        subject: String,
    },
    /// List a subject's questions
    Questions {
        /// Subject id
        subject: String,
        /// Restrict to one chapter
        #[arg(long)]
        chapter: Option<String>,
    },
    /// Remove a subject with its questions and incorrect marks
    DeleteSubject {
        /// Subject id
        id: String,
    },
    /// Record a question as answered wrong
    MarkIncorrect {
        /// Subject id
        subject: String,
        /// Question id within the subject
        question_id: i64,
    },
    /// Clear an incorrect mark after a correct answer
    ResolveIncorrect {
        /// Subject id
        subject: String,
        /// Question id within the subject
        question_id: i64,
    },
    /// List a subject's incorrect marks
    Incorrects {
        /// Subject id
        subject: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    init_quiz_db(&config.database_path).await?;
    let repository = QuizRepository::connect(&config.database_path).await?;
    let store: Arc<dyn QuestionStore> = Arc::new(repository);

    match cli.command {
        Commands::Import { files } => {
            let import = QuestionImportUseCase::new(store);
            let total = files.len();
            let mut failed = 0usize;
            for file in files {
                let result = match TempUpload::stage_copy(&config.upload_dir, &file) {
                    Ok(upload) => import.import_upload(upload).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                    Err(e) => {
                        failed += 1;
                        println!("{}: failed: {}", file.display(), e);
                    }
                }
            }
            if failed > 0 {
                return Err(format!("{} of {} imports failed", failed, total).into());
            }
        }
        Commands::Seed { dir } => {
            let import = QuestionImportUseCase::new(store);
            let outcomes = import.import_dir(&dir).await?;

            let mut failed = 0usize;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(summary) => println!(
                        "{}: {} questions across {} subjects",
                        outcome.file.display(),
                        summary.questions_processed,
                        summary.subjects_processed
                    ),
                    Err(e) => {
                        failed += 1;
                        println!("{}: failed: {}", outcome.file.display(), e);
                    }
                }
            }
            println!("{} imported, {} failed", outcomes.len() - failed, failed);
        }
        Commands::Subjects => {
            let catalog = CatalogUseCase::new(store);
            let subjects = catalog.subjects().await?;
            println!("{}", serde_json::to_string_pretty(&subjects)?);
        }
        Commands::Chapters { subject } => {
            let catalog = CatalogUseCase::new(store);
            for chapter in catalog.chapters(&subject).await? {
                println!("{}", chapter);
            }
        }
        Commands::Questions { subject, chapter } => {
            let catalog = CatalogUseCase::new(store);
            let mut filter = QuestionFilter::subject(&subject);
            if let Some(chapter) = chapter {
                filter = filter.with_chapter(&chapter);
            }
            let questions = catalog.questions(&filter).await?;
            println!("{}", serde_json::to_string_pretty(&questions)?);
        }
        Commands::DeleteSubject { id } => {
            let catalog = CatalogUseCase::new(store);
            catalog.remove_subject(&id).await?;
            println!("Subject {} removed", id);
        }
        Commands::MarkIncorrect {
            subject,
            question_id,
        } => {
            let review = ReviewTrackingUseCase::new(store);
            let mark = review.mark_incorrect(&subject, question_id).await?;
            println!("{}", serde_json::to_string_pretty(&mark)?);
        }
        Commands::ResolveIncorrect {
            subject,
            question_id,
        } => {
            let review = ReviewTrackingUseCase::new(store);
            if review.resolve_incorrect(&subject, question_id).await? {
                println!("Resolved {}/{}", subject, question_id);
            } else {
                println!("No mark on {}/{}", subject, question_id);
            }
        }
        Commands::Incorrects { subject } => {
            let review = ReviewTrackingUseCase::new(store);
            let marks = review.incorrects(&subject).await?;
            println!("{}", serde_json::to_string_pretty(&marks)?);
        }
    }

    Ok(())
}
