//! OCR Inverted-Index Builder
//!
//! Runs OCR on the screenshot of every `OcrPending` page and feeds the recovered text into
//! the on-screen-text index.

use super::capabilities::OcrEngine;
use super::types::StageReport;
use crate::error::ArchiveResult;
use crate::ingestion::types::{ArtifactKind, artifact_path};
use crate::search::tokenizer::tokenize;
use crate::storage::memory::ArchiveState;
use crate::storage::types::PageState;

use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// OCRs each pending page whose `<screenshot_id>.png` is on disk.
///
/// The OCR call happens before any index mutation, so a failure leaves the page exactly as it
/// was (still pending) and the next pass retries it. `file_delay` is slept after every OCR call.
pub fn index_screenshots(
    dir: &Path,
    state: &mut ArchiveState,
    ocr: &dyn OcrEngine,
    file_delay: Duration,
    cancel: &CancellationToken,
) -> ArchiveResult<StageReport> {
    let mut report = StageReport::default();

    let mut pending: Vec<(String, String)> = state
        .pages
        .values()
        .filter(|page| page.state == PageState::OcrPending)
        .map(|page| (page.page_id.clone(), page.screenshot_id.clone()))
        .collect();
    pending.sort();

    for (page_id, screenshot_id) in pending {
        if cancel.is_cancelled() {
            tracing::info!("OCR indexing interrupted by shutdown");
            break;
        }

        let image = artifact_path(dir, &screenshot_id, ArtifactKind::Screenshot);
        if !image.is_file() {
            tracing::trace!("No screenshot yet for pending page {}", page_id);
            continue;
        }

        let text = match ocr.recognize(&image) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("OCR failed for page {}, will retry: {}", page_id, e);
                report.failed += 1;
                throttle(file_delay);
                continue;
            }
        };

        if let Some(page) = state.pages.get_mut(&page_id) {
            page.advance(PageState::OcrDone)?;
            // The on-screen snapshot can be newer than the page snapshot.
            state.onscreen_index.remove_page(&page_id);
            state.onscreen_index.add_tokens(&page_id, tokenize(&text));
            tracing::debug!("OCR'd screenshot for page {}", page_id);
            report.processed += 1;
        }

        throttle(file_delay);
    }

    Ok(report)
}

pub(crate) fn throttle(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
