use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

use crate::domain::error::{AppError, Result};

/// Per-process staging counter so two uploads in the same millisecond never
/// collide on disk.
static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A CSV file parked in the staging area while an import runs. The file is
/// removed when the guard drops, on success and failure alike.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    original_name: Option<String>,
}

impl TempUpload {
    /// Stage raw bytes under `upload_dir` using a fresh unique filename.
    pub fn stage(upload_dir: &Path, original_name: &str, content: &[u8]) -> Result<Self> {
        let (path, original_name) = staging_target(upload_dir, original_name)?;
        fs::write(&path, content).map_err(|e| {
            AppError::IoError(format!("Failed to stage upload {}: {}", path.display(), e))
        })?;

        Ok(Self {
            path,
            original_name: Some(original_name),
        })
    }

    /// Stage a copy of an existing file. The source is left untouched; only
    /// the staged copy is subject to cleanup.
    pub fn stage_copy(upload_dir: &Path, source: &Path) -> Result<Self> {
        let name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "Upload source has no usable file name: {}",
                    source.display()
                ))
            })?;

        let (path, original_name) = staging_target(upload_dir, name)?;
        fs::copy(source, &path).map_err(|e| {
            AppError::IoError(format!(
                "Failed to stage copy of {}: {}",
                source.display(),
                e
            ))
        })?;

        Ok(Self {
            path,
            original_name: Some(original_name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the import should treat the file as having. Uploads keep their
    /// original filename stem even though the staged copy is renamed.
    pub fn label(&self) -> String {
        if let Some(name) = &self.original_name {
            return Path::new(name)
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or(name)
                .to_string();
        }
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string()
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove staged upload");
            }
        }
    }
}

fn staging_target(upload_dir: &Path, original_name: &str) -> Result<(PathBuf, String)> {
    ensure_dir(upload_dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create upload dir {}: {}",
            upload_dir.display(),
            e
        ))
    })?;

    // Keep only the basename so a hostile name cannot escape the staging dir.
    let original_name = Path::new(original_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.csv")
        .to_string();

    let sequence = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let staged_name = format!(
        "{}-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sequence,
        original_name
    );

    Ok((upload_dir.join(staged_name), original_name))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
