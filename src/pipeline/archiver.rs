//! Artifact Archiver
//!
//! Compresses raw `.png` screenshots into `.webp` artifacts and marks pages whose artifacts
//! are all archived.

use super::capabilities::ImageCodec;
use super::ocr_indexer::throttle;
use super::types::{CompressionMode, StageReport};
use crate::error::{ArchiveError, ArchiveResult};
use crate::ingestion::reader::list_artifacts;
use crate::ingestion::types::{ArtifactKind, artifact_path};
use crate::storage::memory::ArchiveState;
use crate::storage::types::PageState;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Compresses every raw screenshot that has no `.webp` counterpart yet, then moves `OcrDone`
/// pages to `Archived` where possible.
///
/// Existing artifacts are never regenerated. The codec writes to a `.partial` file that is
/// renamed into place only on success.
pub fn archive_screenshots(
    dir: &Path,
    state: &mut ArchiveState,
    codec: &dyn ImageCodec,
    big_file_threshold: u64,
    file_delay: Duration,
    cancel: &CancellationToken,
) -> ArchiveResult<StageReport> {
    let mut report = StageReport::default();

    for (file, source) in list_artifacts(dir, ArtifactKind::Screenshot)? {
        if cancel.is_cancelled() {
            tracing::info!("Archiving interrupted by shutdown");
            break;
        }

        let target = artifact_path(dir, &file.page_id, ArtifactKind::Compressed);
        if target.exists() {
            continue;
        }

        match compress_one(codec, &source, &target, big_file_threshold) {
            Ok(mode) => {
                let encoding = if mode.is_lossless() { "lossless" } else { "lossy" };
                tracing::debug!("Compressed {} ({})", source.display(), encoding);
                report.processed += 1;
            }
            Err(e) => {
                tracing::warn!("Leaving {} uncompressed for now: {}", source.display(), e);
                report.failed += 1;
            }
        }

        throttle(file_delay);
    }

    report.transitions = mark_archived(dir, state);
    Ok(report)
}

fn compress_one(
    codec: &dyn ImageCodec,
    source: &Path,
    target: &Path,
    big_file_threshold: u64,
) -> ArchiveResult<CompressionMode> {
    let size = std::fs::metadata(source)
        .map_err(|e| ArchiveError::Io {
            path: source.to_path_buf(),
            source: e,
        })?
        .len();
    let mode = CompressionMode::for_size(size, big_file_threshold);

    let partial = partial_path(target);
    if let Err(e) = codec.compress(source, &partial, mode) {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }

    std::fs::rename(&partial, target).map_err(|e| ArchiveError::Codec {
        path: source.to_path_buf(),
        message: format!("could not move {} into place: {}", partial.display(), e),
    })?;

    Ok(mode)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

/// `OcrDone` pages move to `Archived` once their own screenshot is compressed, or right away
/// when they own no screenshot.
fn mark_archived(dir: &Path, state: &mut ArchiveState) -> usize {
    let mut transitions = 0;

    for page in state.pages.values_mut() {
        if page.state != PageState::OcrDone {
            continue;
        }
        let archived = !page.screenshot_expected
            || artifact_path(dir, &page.page_id, ArtifactKind::Compressed).exists();
        if !archived {
            continue;
        }
        match page.advance(PageState::Archived) {
            Ok(()) => transitions += 1,
            Err(e) => tracing::warn!("{}", e),
        }
    }

    transitions
}
