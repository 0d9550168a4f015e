//! Pipeline Scheduler
//!
//! Drives the indexing lifecycle. One background worker repeats a pass forever:
//! text indexing -> OCR indexing -> archiving -> retention, then idles.
//!
//! ## Responsibilities
//! - **Sequencing**: each stage completes before the next starts.
//! - **Publication**: after a stage changes state, the new state is published to readers
//!   and the affected snapshots are marked dirty. Dirty snapshots are rewritten after every
//!   stage until a write succeeds.
//! - **Isolation**: per-file failures stay inside their stage; a failing stage is logged and
//!   the pass continues.
//! - **Shutdown**: the cancellation token is checked between files and between passes.

use super::archiver::archive_screenshots;
use super::capabilities::{ImageCodec, OcrEngine};
use super::ocr_indexer::index_screenshots;
use super::retention::purge_retired;
use super::text_indexer::index_capture_records;
use super::types::{PassReport, StageReport};
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, ArchiveResult};
use crate::storage::memory::{ArchiveState, ArchiveStore};
use crate::storage::snapshot::{SnapshotKind, SnapshotStore};

/// Indexes go to disk before the page map that refers to them.
const SAVE_ORDER: [SnapshotKind; 3] = [
    SnapshotKind::SourceIndex,
    SnapshotKind::OnscreenIndex,
    SnapshotKind::Pages,
];

use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The long-running indexing worker.
pub struct Pipeline {
    /// Directory shared with the capture agent.
    data_dir: PathBuf,
    /// Where passes publish their results for the query path.
    store: Arc<ArchiveStore>,
    snapshots: SnapshotStore,
    /// Snapshots whose on-disk copy is behind the published state.
    dirty_snapshots: Mutex<HashSet<SnapshotKind>>,
    ocr: Arc<dyn OcrEngine>,
    codec: Arc<dyn ImageCodec>,
    /// Pause after each OCR/codec call.
    file_delay: Duration,
    /// Idle time between passes.
    pass_interval: Duration,
    big_file_threshold: u64,
}

impl Pipeline {
    pub fn new(
        config: &ArchiveConfig,
        store: Arc<ArchiveStore>,
        ocr: Arc<dyn OcrEngine>,
        codec: Arc<dyn ImageCodec>,
    ) -> Arc<Self> {
        Arc::new(Self {
            data_dir: config.data_dir.clone(),
            store,
            snapshots: SnapshotStore::new(&config.data_dir),
            dirty_snapshots: Mutex::new(HashSet::new()),
            ocr,
            codec,
            file_delay: config.file_delay,
            pass_interval: config.pass_interval,
            big_file_threshold: config.big_file_threshold,
        })
    }

    /// Fails when the capture directory cannot be listed. The only fatal startup condition.
    pub fn verify_data_dir(dir: &Path) -> ArchiveResult<()> {
        std::fs::read_dir(dir)
            .map(|_| ())
            .map_err(|source| ArchiveError::WorkingDirectory {
                path: dir.to_path_buf(),
                source,
            })
    }

    /// Spawns the worker and returns its handle.
    pub fn start(self: Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run(cancel).await;
        })
    }

    /// Runs passes until `cancel` fires. The current file operation always finishes first.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        tracing::info!(
            "Pipeline worker started on {} (pass interval {:?})",
            self.data_dir.display(),
            self.pass_interval
        );

        let mut working = self.store.snapshot();

        loop {
            let pipeline = self.clone();
            let token = cancel.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                let mut working = working;
                let today = chrono::Local::now().date_naive();
                let report = pipeline.run_pass(&mut working, today, &token);
                (working, report)
            })
            .await;

            working = match outcome {
                Ok((state, report)) => {
                    tracing::debug!("Pass finished: {:?}", report);
                    state
                }
                Err(e) => {
                    // Whatever the panicking stage did was never published.
                    tracing::error!("Pipeline pass aborted: {}", e);
                    self.store.snapshot()
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(self.pass_interval) => {}
                _ = cancel.cancelled() => {
                    tracing::info!("Pipeline worker shutting down");
                    break;
                }
            }
        }
    }

    /// Executes the four stages once against `working`, publishing after each stage that
    /// changed something.
    pub fn run_pass(
        &self,
        working: &mut Arc<ArchiveState>,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> PassReport {
        let mut report = PassReport::default();

        let result = index_capture_records(&self.data_dir, Arc::make_mut(working), cancel);
        report.text = self.finish_stage(
            "text indexing",
            working,
            result,
            &[SnapshotKind::SourceIndex, SnapshotKind::Pages],
        );
        if report.text.processed > 0 {
            tracing::info!("Indexed {} new capture records", report.text.processed);
        }
        if cancel.is_cancelled() {
            return report;
        }

        let result = index_screenshots(
            &self.data_dir,
            Arc::make_mut(working),
            self.ocr.as_ref(),
            self.file_delay,
            cancel,
        );
        report.ocr = self.finish_stage(
            "OCR indexing",
            working,
            result,
            &[SnapshotKind::OnscreenIndex, SnapshotKind::Pages],
        );
        if report.ocr.processed > 0 {
            tracing::info!("OCR'd {} new screenshots", report.ocr.processed);
        }
        if cancel.is_cancelled() {
            return report;
        }

        let result = archive_screenshots(
            &self.data_dir,
            Arc::make_mut(working),
            self.codec.as_ref(),
            self.big_file_threshold,
            self.file_delay,
            cancel,
        );
        report.archive = self.finish_stage("archiving", working, result, &[SnapshotKind::Pages]);
        if report.archive.processed > 0 {
            tracing::info!("Compressed {} new screenshots", report.archive.processed);
        }
        if cancel.is_cancelled() {
            return report;
        }

        let result = purge_retired(&self.data_dir, Arc::make_mut(working), today, cancel);
        report.retention = self.finish_stage("retention", working, result, &[SnapshotKind::Pages]);
        if report.retention.processed > 0 {
            tracing::info!("Removed {} retired raw files", report.retention.processed);
        }

        report
    }

    fn finish_stage(
        &self,
        stage: &str,
        working: &Arc<ArchiveState>,
        result: ArchiveResult<StageReport>,
        snapshots: &[SnapshotKind],
    ) -> StageReport {
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Stage {} failed: {}", stage, e);
                self.flush_snapshots(stage, working);
                return StageReport::default();
            }
        };

        if report.failed > 0 {
            tracing::warn!("Stage {}: {} files will be retried", stage, report.failed);
        }

        if report.changed_state() {
            self.store.publish(working.clone());
            self.dirty_snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(snapshots.iter().copied());
        }

        self.flush_snapshots(stage, working);
        report
    }

    /// Writes every dirty snapshot from `working`. Failed writes stay dirty for the next stage.
    fn flush_snapshots(&self, stage: &str, working: &ArchiveState) {
        let mut dirty = self
            .dirty_snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        for kind in SAVE_ORDER {
            if !dirty.contains(&kind) {
                continue;
            }
            match self.snapshots.save(kind, working) {
                Ok(()) => {
                    dirty.remove(&kind);
                }
                Err(e) => tracing::error!("Snapshot after {} not written, will retry: {}", stage, e),
            }
        }
    }
}
