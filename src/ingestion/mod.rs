//! Capture Ingestion Module
//!
//! Reads the raw files the capture agent drops into the shared directory.
//!
//! ## Workflow
//! 1. **Discover**: Lists `<YYYYMMDD><sequence>.<ext>` files of one kind, in name order.
//! 2. **Parse**: Splits a `.txt` record into its metadata lines and free-text body.
//! 3. **Hand off**: The pipeline's text indexer turns the parsed record into a `PageRecord`
//!    and source-text postings.

pub mod reader;
pub mod types;
