//! Error taxonomy for the indexing pipeline.
//!
//! Every per-file failure (`IngestParse`, `Ocr`, `Codec`, `Delete`) is local to the file that
//! caused it: stages log it, count it and move on. Only `WorkingDirectory` at startup is fatal.

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::types::PageState;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("malformed capture record {page_id}: {reason}")]
    IngestParse { page_id: String, reason: String },

    #[error("OCR failed for {}: {message}", path.display())]
    Ocr { path: PathBuf, message: String },

    #[error("image codec failed for {}: {message}", path.display())]
    Codec { path: PathBuf, message: String },

    #[error("failed to delete {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {} could not be written or read: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot {} is not valid JSON: {source}", path.display())]
    SnapshotFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("page {page_id} cannot move from {from:?} to {to:?}")]
    IllegalTransition {
        page_id: String,
        from: PageState,
        to: PageState,
    },

    #[error("working directory {} is not accessible: {source}", path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
