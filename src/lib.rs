//! Capture Indexer Library
//!
//! This library crate defines the core modules of the capture indexer. It serves as the
//! foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! A capture agent drops `<page_id>.txt` records and `<page_id>.png` screenshots into a shared
//! directory. The indexer turns them into two searchable corpora and archives the raw files:
//!
//! - **`config`**: Defaults, environment variables and command-line overrides.
//! - **`error`**: The error type shared by every stage.
//! - **`ingestion`**: Capture file naming and the `.txt` record format.
//! - **`pipeline`**: The background worker: text indexing, OCR indexing, compression and
//!   retention, run as repeated passes.
//! - **`search`**: Tokenizer, AND query evaluation and the HTTP surface.
//! - **`storage`**: Page records, inverted indexes, the published state and its JSON snapshots.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod search;
pub mod storage;
