//! CSV dataset writer.
//!
//! A dataset is a header row `id,title,author,text` followed by one row per
//! harvested book. The file is created once per run and then only ever
//! appended to; every append opens and closes the file, so no handle is held
//! between rows and each row is durable on its own.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::models::BookRecord;

/// Column names, in row order
pub const HEADER: [&str; 4] = ["id", "title", "author", "text"];

/// Errors raised while writing a dataset
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Append was attempted before the file was created
    #[error("CSV file '{}' does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Handle to an on-disk dataset. Holds only the path.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
}

impl Dataset {
    /// Create (or truncate) the file at `path` and write the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref().to_path_buf();

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;
        writer.write_record(HEADER)?;
        writer.flush()?;

        tracing::debug!("Created dataset {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row. Fails with [`DatasetError::NotFound`] if the file
    /// has disappeared since creation; nothing is written in that case.
    pub fn append(&self, record: &BookRecord) -> Result<(), DatasetError> {
        append_record(&self.path, record)
    }
}

/// Append `record` to the existing dataset at `path`.
pub fn append_record(path: impl AsRef<Path>, record: &BookRecord) -> Result<(), DatasetError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }

    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
