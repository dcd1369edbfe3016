use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::logging::TIMESTAMP_FORMAT;

/// Append-only record of every expression the server receives and what came
/// of it. Independent of diagnostic logging.
#[derive(Clone, Debug)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. The file is opened per call, so lines
    /// from concurrent requests interleave but never tear.
    pub async fn append(&self, message: &str) -> io::Result<()> {
        let line = format!(
            "{} {}\n",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            message
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
