//! Ingestion Data Types
//!
//! Structures produced by reading the capture agent's raw files: the parsed text record, and
//! the identity encoded in every capture file name (`<YYYYMMDD><sequence>.<ext>`).

use chrono::NaiveDate;
use std::path::Path;

/// A parsed `.txt` capture record.
///
/// Line layout of the raw file:
/// 0. source URL
/// 1. screenshot id
/// 2. capture timestamp
/// 3. page title (may be missing or blank)
/// 4. page text, one or more lines
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRecord {
    pub page_id: String,
    pub url: String,
    pub screenshot_id: String,
    pub captured_at: String,
    pub title: Option<String>,
    /// Free text after the metadata lines, joined with newlines.
    pub body: String,
}

/// Kinds of files the capture directory contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Raw capture record (`.txt`).
    Text,
    /// Raw screenshot (`.png`).
    Screenshot,
    /// Compressed screenshot (`.webp`).
    Compressed,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Text => "txt",
            ArtifactKind::Screenshot => "png",
            ArtifactKind::Compressed => "webp",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" => Some(ArtifactKind::Text),
            "png" => Some(ArtifactKind::Screenshot),
            "webp" => Some(ArtifactKind::Compressed),
            _ => None,
        }
    }
}

/// Identity of one file in the capture directory.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFile {
    pub page_id: String,
    pub kind: ArtifactKind,
}

impl CaptureFile {
    /// Recognizes `<page_id>.<txt|png|webp>`; anything else (snapshots, temp files) is `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let page_id = path.file_stem()?.to_str()?;
        let kind = ArtifactKind::from_extension(path.extension()?.to_str()?)?;
        if page_id.is_empty() || page_id.contains('.') {
            return None;
        }
        Some(Self {
            page_id: page_id.to_string(),
            kind,
        })
    }

    /// Calendar day the capture agent encoded in the first eight characters of the id.
    pub fn capture_date(&self) -> Option<NaiveDate> {
        capture_date(&self.page_id)
    }
}

/// Parses the `YYYYMMDD` prefix of a page id.
pub fn capture_date(page_id: &str) -> Option<NaiveDate> {
    let prefix = page_id.get(..8)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(prefix, "%Y%m%d").ok()
}

/// Path of a page's artifact of the given kind inside `dir`.
pub fn artifact_path(dir: &Path, page_id: &str, kind: ArtifactKind) -> std::path::PathBuf {
    dir.join(format!("{}.{}", page_id, kind.extension()))
}
