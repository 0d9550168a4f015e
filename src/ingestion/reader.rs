use super::types::{ArtifactKind, CaptureFile, CaptureRecord};
use crate::error::{ArchiveError, ArchiveResult};

use std::path::{Path, PathBuf};

const URL_LINE: usize = 0;
const SCREENSHOT_LINE: usize = 1;
const TIMESTAMP_LINE: usize = 2;
const TITLE_LINE: usize = 3;
const BODY_START: usize = 4;

/// Reads and parses one `.txt` capture record from disk.
///
/// Bytes that are not valid UTF-8 are dropped rather than failing the whole record.
pub fn read_capture_record(path: &Path) -> ArchiveResult<CaptureRecord> {
    let file = CaptureFile::from_path(path)
        .filter(|file| file.kind == ArtifactKind::Text)
        .ok_or_else(|| ArchiveError::IngestParse {
            page_id: path.display().to_string(),
            reason: "not a capture record file name".to_string(),
        })?;

    let bytes = std::fs::read(path).map_err(|source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text: String = String::from_utf8_lossy(&bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect();

    parse_capture_record(&file.page_id, &text)
}

/// Parses the content of a capture record.
///
/// Records that stop before the timestamp line, or carry a blank timestamp, are malformed:
/// the agent may still be writing them, so the caller leaves the file for the next pass.
pub fn parse_capture_record(page_id: &str, content: &str) -> ArchiveResult<CaptureRecord> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();

    if lines.len() <= TIMESTAMP_LINE {
        return Err(ArchiveError::IngestParse {
            page_id: page_id.to_string(),
            reason: format!("expected at least 3 metadata lines, found {}", lines.len()),
        });
    }

    let captured_at = lines[TIMESTAMP_LINE];
    if captured_at.is_empty() {
        return Err(ArchiveError::IngestParse {
            page_id: page_id.to_string(),
            reason: "blank capture timestamp".to_string(),
        });
    }

    let title = lines
        .get(TITLE_LINE)
        .filter(|title| !title.is_empty())
        .map(|title| title.to_string());

    let body = lines
        .get(BODY_START..)
        .map(|rest| rest.join("\n"))
        .unwrap_or_default();

    Ok(CaptureRecord {
        page_id: page_id.to_string(),
        url: lines[URL_LINE].to_string(),
        screenshot_id: lines[SCREENSHOT_LINE].to_string(),
        captured_at: captured_at.to_string(),
        title,
        body,
    })
}

/// Capture files of `kind` in `dir`, sorted by name so passes are deterministic.
pub fn list_artifacts(dir: &Path, kind: ArtifactKind) -> ArchiveResult<Vec<(CaptureFile, PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|source| ArchiveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(CaptureFile, PathBuf)> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            CaptureFile::from_path(&path)
                .filter(|file| file.kind == kind)
                .map(|file| (file, path))
        })
        .collect();

    files.sort_by(|a, b| a.0.page_id.cmp(&b.0.page_id));
    Ok(files)
}
