//! Page Metadata Types
//!
//! The canonical record kept for every captured page, and the lifecycle it moves through.

use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};

/// Lifecycle of a captured page.
///
/// States only move forward, one step at a time:
///
/// ```text
/// Ingested -> OcrPending -> OcrDone -> Archived -> Purged
///         \______________/
///   (no screenshot to OCR)
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageState {
    /// Metadata parsed; source text not yet fully indexed.
    Ingested,
    /// Source text indexed, waiting for the screenshot to be OCR'd.
    OcrPending,
    /// Both corpora hold everything this page will ever contribute.
    OcrDone,
    /// The owned screenshot has a compressed counterpart (or there is none to compress).
    Archived,
    /// No raw capture files remain on disk.
    Purged,
}

impl PageState {
    pub fn can_transition_to(self, next: PageState) -> bool {
        matches!(
            (self, next),
            (PageState::Ingested, PageState::OcrPending)
                | (PageState::Ingested, PageState::OcrDone)
                | (PageState::OcrPending, PageState::OcrDone)
                | (PageState::OcrDone, PageState::Archived)
                | (PageState::Archived, PageState::Purged)
        )
    }

    /// True once both indices are final for the page. Raw files become retention candidates.
    pub fn is_fully_indexed(self) -> bool {
        self >= PageState::OcrDone
    }
}

/// Canonical metadata for one captured page. Never removed once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageRecord {
    pub page_id: String,
    pub url: String,
    /// Id of the screenshot shown for this page. Equals `page_id` when the capture owns its
    /// image; otherwise it points at an earlier capture's screenshot.
    pub screenshot_id: String,
    /// Fixed-width timestamp; lexicographic order is chronological order.
    pub captured_at: String,
    pub title: Option<String>,
    /// Whether a `<page_id>.png` belongs to this page and must be OCR'd.
    pub screenshot_expected: bool,
    pub state: PageState,
}

impl PageRecord {
    pub fn new(
        page_id: String,
        url: String,
        screenshot_id: String,
        captured_at: String,
        title: Option<String>,
    ) -> Self {
        let screenshot_expected = screenshot_id == page_id;
        Self {
            page_id,
            url,
            screenshot_id,
            captured_at,
            title,
            screenshot_expected,
            state: PageState::Ingested,
        }
    }

    pub fn is_fully_indexed(&self) -> bool {
        self.state.is_fully_indexed()
    }

    /// Moves the page to `next`, rejecting skipped or backward steps.
    pub fn advance(&mut self, next: PageState) -> ArchiveResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ArchiveError::IllegalTransition {
                page_id: self.page_id.clone(),
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("page {} {:?} -> {:?}", self.page_id, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Relative URL under which the presentation layer serves the compressed screenshot.
    pub fn screenshot_ref(&self) -> String {
        format!("screenshots/{}.webp", self.screenshot_id)
    }
}
