//! Indexing Pipeline Module
//!
//! The background lifecycle that turns raw captures into searchable, archived pages.
//!
//! ## Stage Overview
//! Every pass runs four stages in order over the shared capture directory:
//! 1. **Text indexing** (`text_indexer`): parses new `.txt` records, creates page records and
//!    fills the source-text index.
//! 2. **OCR indexing** (`ocr_indexer`): runs OCR on screenshots of pending pages and fills the
//!    on-screen-text index.
//! 3. **Archiving** (`archiver`): compresses `.png` screenshots to `.webp`.
//! 4. **Retention** (`retention`): deletes raw files from previous days once they are indexed
//!    and, for images, compressed.
//!
//! Every stage is idempotent, so a crash mid-pass heals on the next pass.
//!
//! ## Submodules
//! - **`scheduler`**: The worker loop, stage sequencing, publication and snapshotting.
//! - **`capabilities`**: `OcrEngine` / `ImageCodec` seams and their command-line adapters.
//! - **`types`**: Stage reports and the compression policy.

pub mod archiver;
pub mod capabilities;
pub mod ocr_indexer;
pub mod retention;
pub mod scheduler;
pub mod text_indexer;
pub mod types;
