//! Batch files
//!
//! A batch is the ordered list of review records produced by one extraction
//! run. It is written wholesale as a single JSON document and read back
//! wholesale by the loader, so extraction and loading can be retried
//! independently.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{ReviewRecord, Result, RevgraphError};

/// A batch document on durable storage
#[derive(Debug, Clone)]
pub struct BatchFile {
    path: PathBuf,
}

impl BatchFile {
    /// Refer to a batch file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the batch file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full batch.
    ///
    /// The document is written to a sibling temporary file and renamed into
    /// place, so the target either holds the complete new batch or is left
    /// as it was.
    pub fn write(&self, records: &[ReviewRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RevgraphError::BatchWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let body = serde_json::to_vec_pretty(records)
            .map_err(|e| RevgraphError::BatchWrite {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            })?;

        let staging = self.staging_path();
        fs::write(&staging, body).map_err(|source| RevgraphError::BatchWrite {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| {
            let _ = fs::remove_file(&staging);
            RevgraphError::BatchWrite {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "Batch written"
        );
        Ok(())
    }

    /// Read the full batch
    pub fn read(&self) -> Result<Vec<ReviewRecord>> {
        if !self.path.is_file() {
            return Err(RevgraphError::BatchMissing(self.path.clone()));
        }

        let body = fs::read(&self.path).map_err(|source| RevgraphError::BatchRead {
            path: self.path.clone(),
            source,
        })?;
        let records: Vec<ReviewRecord> =
            serde_json::from_slice(&body).map_err(|source| RevgraphError::BatchFormat {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "Batch loaded"
        );
        Ok(records)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        self.path.with_file_name(name)
    }
}
