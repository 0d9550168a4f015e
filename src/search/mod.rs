//! Search Service Module
//!
//! Answers queries against the published archive state. Read-only: it never mutates the store.
//!
//! ## Overview
//! A query is tokenized exactly like indexed text and evaluated as a pure AND over the selected
//! corpora (page-source text, on-screen OCR text). There is no relevance ranking; results are
//! ordered newest capture first.
//!
//! ## Submodules
//! - **`engine`**: AND evaluation, match-kind tagging, ordering and truncation.
//! - **`handlers`**: HTTP handlers for the Axum web server.
//! - **`tokenizer`**: The normalization shared by indexing and querying.
//! - **`types`**: Query and response types.

pub mod engine;
pub mod handlers;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
mod tests;
