use super::index::InvertedIndex;
use super::types::PageRecord;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Everything the query path reads: page metadata plus both inverted indices.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveState {
    pub pages: HashMap<String, PageRecord>,
    pub source_index: InvertedIndex,
    pub onscreen_index: InvertedIndex,
}

impl ArchiveState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, page_id: &str) -> Option<&PageRecord> {
        self.pages.get(page_id)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Newest capture timestamp across all pages.
    pub fn most_recent(&self) -> Option<&str> {
        self.pages
            .values()
            .map(|page| page.captured_at.as_str())
            .max()
    }
}

/// Single-writer, many-reader holder of the published [`ArchiveState`].
///
/// The pipeline worker mutates its own copy and publishes it whole after each stage; request
/// handlers grab the current `Arc` and evaluate against it without holding the lock.
pub struct ArchiveStore {
    published: RwLock<Arc<ArchiveState>>,
}

impl ArchiveStore {
    pub fn new(initial: ArchiveState) -> Arc<Self> {
        Arc::new(Self {
            published: RwLock::new(Arc::new(initial)),
        })
    }

    /// Current published state. Never observes a stage half-applied.
    pub fn snapshot(&self) -> Arc<ArchiveState> {
        match self.published.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replaces the published state atomically.
    pub fn publish(&self, state: Arc<ArchiveState>) {
        let mut guard = match self.published.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = state;
        tracing::debug!("Published archive state ({} pages)", guard.page_count());
    }
}
