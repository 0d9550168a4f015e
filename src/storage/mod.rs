//! Archive Storage Module
//!
//! Holds the authoritative in-memory state: one [`types::PageRecord`] per captured page and
//! two inverted indices (page-source text and on-screen OCR text).
//!
//! ## Core Concepts
//! - **Records**: `PageRecord` carries page metadata and an explicit `PageState` lifecycle.
//! - **Indices**: `InvertedIndex` maps a normalized token to per-page occurrence counts.
//! - **Publication**: `ArchiveStore` lets one writer publish whole states to many readers.
//! - **Persistence**: `SnapshotStore` writes flat JSON snapshots and reloads them at startup.

pub mod index;
pub mod memory;
pub mod snapshot;
pub mod types;
