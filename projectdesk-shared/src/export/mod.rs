/// Spreadsheet export and object storage upload.

pub mod csv;
pub mod store;

pub use store::{DisabledStore, HttpObjectStore, ObjectStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write spreadsheet: {0}")]
    Csv(String),

    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Upload failed: {0}")]
    Upload(String),
}

impl From<csv_async::Error> for ExportError {
    fn from(err: csv_async::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        ExportError::Upload(err.to_string())
    }
}
