//! Flat JSON snapshots of the archive state.
//!
//! Three files live next to the captures: page metadata, the source-text index and the
//! on-screen-text index. Each is rewritten whole (temp file + rename) after the stage that
//! changed it. They are only read at startup.

use super::index::InvertedIndex;
use super::memory::ArchiveState;
use super::types::PageRecord;
use crate::error::{ArchiveError, ArchiveResult};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const PAGE_METADATA_FILE: &str = "page_metadata.json";
pub const SOURCE_INDEX_FILE: &str = "source_index.json";
pub const ONSCREEN_INDEX_FILE: &str = "onscreen_index.json";

/// One of the three persisted structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Pages,
    SourceIndex,
    OnscreenIndex,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn pages_path(&self) -> PathBuf {
        self.dir.join(PAGE_METADATA_FILE)
    }

    pub fn source_index_path(&self) -> PathBuf {
        self.dir.join(SOURCE_INDEX_FILE)
    }

    pub fn onscreen_index_path(&self) -> PathBuf {
        self.dir.join(ONSCREEN_INDEX_FILE)
    }

    /// Loads all three snapshots. A missing file yields an empty structure; a corrupt one is
    /// logged and also treated as empty, since raw files still on disk are re-indexed.
    pub fn load(&self) -> ArchiveState {
        let pages: HashMap<String, PageRecord> = load_or_default(&self.pages_path());
        let source_index: InvertedIndex = load_or_default(&self.source_index_path());
        let onscreen_index: InvertedIndex = load_or_default(&self.onscreen_index_path());

        tracing::info!(
            "Loaded snapshots: {} pages, {} source tokens, {} on-screen tokens",
            pages.len(),
            source_index.token_count(),
            onscreen_index.token_count()
        );

        ArchiveState {
            pages,
            source_index,
            onscreen_index,
        }
    }

    pub fn save(&self, kind: SnapshotKind, state: &ArchiveState) -> ArchiveResult<()> {
        match kind {
            SnapshotKind::Pages => self.save_pages(state),
            SnapshotKind::SourceIndex => self.save_source_index(state),
            SnapshotKind::OnscreenIndex => self.save_onscreen_index(state),
        }
    }

    pub fn save_pages(&self, state: &ArchiveState) -> ArchiveResult<()> {
        write_json(&self.pages_path(), &state.pages)
    }

    pub fn save_source_index(&self, state: &ArchiveState) -> ArchiveResult<()> {
        write_json(&self.source_index_path(), &state.source_index)
    }

    pub fn save_onscreen_index(&self, state: &ArchiveState) -> ArchiveResult<()> {
        write_json(&self.onscreen_index_path(), &state.onscreen_index)
    }
}

fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::error!("Ignoring unreadable snapshot: {}", e);
            T::default()
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ArchiveResult<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ArchiveError::Snapshot {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| ArchiveError::SnapshotFormat {
            path: path.to_path_buf(),
            source,
        })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ArchiveResult<()> {
    let tmp_path = path.with_extension("json.tmp");
    let io_err = |source| ArchiveError::Snapshot {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(&tmp_path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| ArchiveError::SnapshotFormat {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    drop(writer);

    std::fs::rename(&tmp_path, path).map_err(io_err)?;
    tracing::debug!("Wrote snapshot {}", path.display());
    Ok(())
}
