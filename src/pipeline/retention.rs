//! Retention Manager
//!
//! Deletes raw capture files once they are durably represented elsewhere.

use super::types::StageReport;
use crate::error::{ArchiveError, ArchiveResult};
use crate::ingestion::reader::list_artifacts;
use crate::ingestion::types::{ArtifactKind, CaptureFile, artifact_path};
use crate::storage::memory::ArchiveState;
use crate::storage::types::PageState;

use chrono::NaiveDate;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Removes retired `.txt` and `.png` files captured before `today`.
///
/// Today's files always stay: the capture agent derives new ids from the names already on
/// disk. A `.txt` goes once its page is fully indexed; a `.png` additionally needs its
/// `.webp`. Failed deletions are logged and retried next pass. `Archived` pages left with no
/// raw files become `Purged`; their records are kept.
pub fn purge_retired(
    dir: &Path,
    state: &mut ArchiveState,
    today: NaiveDate,
    cancel: &CancellationToken,
) -> ArchiveResult<StageReport> {
    let mut report = StageReport::default();

    let mut candidates = list_artifacts(dir, ArtifactKind::Text)?;
    candidates.extend(list_artifacts(dir, ArtifactKind::Screenshot)?);

    for (file, path) in candidates {
        if cancel.is_cancelled() {
            tracing::info!("Retention interrupted by shutdown");
            break;
        }

        if !is_retired(dir, state, &file, today) {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {}", path.display());
                report.processed += 1;
            }
            Err(source) => {
                let e = ArchiveError::Delete {
                    path: path.clone(),
                    source,
                };
                tracing::warn!("{}", e);
                report.failed += 1;
            }
        }
    }

    report.transitions = mark_purged(dir, state);
    Ok(report)
}

fn is_retired(dir: &Path, state: &ArchiveState, file: &CaptureFile, today: NaiveDate) -> bool {
    let Some(captured_on) = file.capture_date() else {
        tracing::warn!("Capture file {} has no date prefix, keeping it", file.page_id);
        return false;
    };
    if captured_on >= today {
        return false;
    }

    let Some(page) = state.page(&file.page_id) else {
        return false;
    };
    if !page.is_fully_indexed() {
        return false;
    }

    match file.kind {
        ArtifactKind::Text => true,
        ArtifactKind::Screenshot => {
            artifact_path(dir, &file.page_id, ArtifactKind::Compressed).exists()
        }
        ArtifactKind::Compressed => false,
    }
}

fn mark_purged(dir: &Path, state: &mut ArchiveState) -> usize {
    let mut transitions = 0;

    for page in state.pages.values_mut() {
        if page.state != PageState::Archived {
            continue;
        }
        let raw_left = artifact_path(dir, &page.page_id, ArtifactKind::Text).exists()
            || artifact_path(dir, &page.page_id, ArtifactKind::Screenshot).exists();
        if raw_left {
            continue;
        }
        match page.advance(PageState::Purged) {
            Ok(()) => transitions += 1,
            Err(e) => tracing::warn!("{}", e),
        }
    }

    transitions
}
