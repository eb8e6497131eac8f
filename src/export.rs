use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::error::AppError;

/// "Persist this text as a user-chosen file."
#[async_trait]
pub trait CalendarSink: Send + Sync {
    async fn save(&self, suggested_name: &str, contents: &str) -> Result<PathBuf, AppError>;
}

/// Saves exports into a fixed directory under the suggested file name.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl CalendarSink for DirectorySink {
    async fn save(&self, suggested_name: &str, contents: &str) -> Result<PathBuf, AppError> {
        let file_name = std::path::Path::new(suggested_name)
            .file_name()
            .ok_or_else(|| AppError::BadRequest(format!("invalid file name '{}'", suggested_name)))?;
        let path = self.dir.join(file_name);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, contents).await?;
        info!("Calendar exported to {}", path.display());
        Ok(path)
    }
}
