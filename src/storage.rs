//! ==============================================================================
//! storage.rs - append-only daily log files
//! ==============================================================================
//!
//! purpose:
//!     one json-lines file per local calendar day, e.g.
//!     `<data_dir>/sensors_20261019.jsonl`. every accepted reading becomes one
//!     line. files are created on the first write of the day and never
//!     rewritten or deleted here.
//!
//! relationships:
//!     - used by: service.rs (appends while holding the service write lock)
//!     - configured by: config.rs (StorageConfig)
//!
//! the file handle is opened per append and dropped before returning, after
//! an explicit flush. callers serialize appends; this type does no locking.
//!
//! ==============================================================================

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::config::StorageConfig;
use crate::error::IngestError;

#[derive(Debug, Clone)]
pub struct DailyLog {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl DailyLog {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            dir: config.data_dir.clone(),
            prefix: config.file_prefix.clone(),
            extension: config.file_extension.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// create the data directory if it does not exist yet
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// resolve the file for a given day
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            self.prefix,
            date.format("%Y%m%d"),
            self.extension
        ))
    }

    /// append one line (newline added here) to the file for `date`
    /// returns the path written
    pub async fn append(&self, date: NaiveDate, line: &str) -> Result<PathBuf, IngestError> {
        let path = self.path_for(date);

        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');

        let result: std::io::Result<()> = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            // single write so a line is never split across two appends
            file.write_all(record.as_bytes()).await?;
            file.flush().await
        }
        .await;

        match result {
            Ok(()) => Ok(path),
            Err(source) => Err(IngestError::Storage { path, source }),
        }
    }
}
