use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::error::{AppError, Result};

/// Runtime configuration. Values are layered: built-in defaults, then
/// `quizbank.toml` in the working directory, then `QUIZBANK_*` environment
/// variables. Later sources win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite file holding subjects, questions and incorrect marks.
    pub database_path: PathBuf,
    /// Staging area for uploaded CSV files awaiting import.
    pub upload_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("quizbank.db"),
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::figment()
            .extract()
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {}", e)))
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("quizbank.toml"))
            .merge(Env::prefixed("QUIZBANK_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_sources() {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .extract()
            .unwrap();
        assert_eq!(config.database_path, PathBuf::from("quizbank.db"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn toml_source_overrides_defaults() {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string("database_path = \"exams/bank.db\""))
            .extract()
            .unwrap();
        assert_eq!(config.database_path, PathBuf::from("exams/bank.db"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    }
}
