//! Text Inverted-Index Builder
//!
//! Turns new `.txt` capture records into page records and source-text postings.

use super::types::StageReport;
use crate::error::ArchiveResult;
use crate::ingestion::reader::{list_artifacts, read_capture_record};
use crate::ingestion::types::{ArtifactKind, CaptureRecord};
use crate::search::tokenizer::tokenize;
use crate::storage::memory::ArchiveState;
use crate::storage::types::{PageRecord, PageState};

use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Indexes every capture record whose page is unknown or still `Ingested`.
///
/// Pages past `Ingested` already have their source text in the index and are skipped, so a
/// second run over the same files leaves every count unchanged. A malformed record is logged
/// and left on disk; the remaining files are still processed.
pub fn index_capture_records(
    dir: &Path,
    state: &mut ArchiveState,
    cancel: &CancellationToken,
) -> ArchiveResult<StageReport> {
    let mut report = StageReport::default();

    for (file, path) in list_artifacts(dir, ArtifactKind::Text)? {
        if cancel.is_cancelled() {
            tracing::info!("Text indexing interrupted by shutdown");
            break;
        }

        if let Some(page) = state.page(&file.page_id)
            && page.state != PageState::Ingested
        {
            continue;
        }

        let result = read_capture_record(&path).and_then(|record| apply_record(state, record));
        match result {
            Ok(()) => {
                tracing::debug!("Indexed capture record {}", file.page_id);
                report.processed += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping capture record {}: {}", path.display(), e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

/// Records one parsed capture in the page store and the source-text index.
pub fn apply_record(state: &mut ArchiveState, record: CaptureRecord) -> ArchiveResult<()> {
    // Postings may exist without a page record (a restart between snapshot writes), or
    // from an `Ingested` page. Either way the record starts over.
    state.source_index.remove_page(&record.page_id);

    let mut page = PageRecord::new(
        record.page_id.clone(),
        record.url,
        record.screenshot_id,
        record.captured_at,
        record.title,
    );

    let next = if page.screenshot_expected {
        PageState::OcrPending
    } else {
        PageState::OcrDone
    };
    page.advance(next)?;

    state.pages.insert(record.page_id.clone(), page);
    state
        .source_index
        .add_tokens(&record.page_id, tokenize(&record.body));
    Ok(())
}
