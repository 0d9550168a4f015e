use super::engine::search;
use super::types::{SearchQuery, SearchResponse, StatsResponse};
use crate::config::ArchiveConfig;
use crate::ingestion::types::{ArtifactKind, CaptureFile};
use crate::storage::memory::ArchiveStore;

use axum::extract::{Path, Query};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    /// Search page-source text. Defaults to true.
    pub page_source: Option<bool>,
    /// Search OCR'd on-screen text. Defaults to true.
    pub screenshot_ocr: Option<bool>,
    pub limit: Option<usize>,
}

/// HTTP surface for the presentation layer.
pub fn router(store: Arc<ArchiveStore>, config: Arc<ArchiveConfig>) -> Router {
    Router::new()
        .route("/search", get(handle_search))
        .route("/stats", get(handle_stats))
        .route("/screenshots/:name", get(handle_screenshot))
        .layer(Extension(store))
        .layer(Extension(config))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
}

pub async fn handle_search(
    Query(params): Query<SearchParams>,
    Extension(store): Extension<Arc<ArchiveStore>>,
    Extension(config): Extension<Arc<ArchiveConfig>>,
) -> Json<SearchResponse> {
    tracing::debug!("Search request: {:?}", params.q);

    let mut query = SearchQuery::new(params.q, params.limit.unwrap_or(config.results_shown));
    query.include_source = params.page_source.unwrap_or(true);
    query.include_onscreen = params.screenshot_ocr.unwrap_or(true);

    let state = store.snapshot();
    Json(search(&state, &query))
}

pub async fn handle_stats(Extension(store): Extension<Arc<ArchiveStore>>) -> Json<StatsResponse> {
    let state = store.snapshot();
    Json(StatsResponse {
        indexed_pages: state.page_count(),
        most_recent: state.most_recent().map(str::to_string),
    })
}

/// Streams a compressed screenshot from the capture directory.
pub async fn handle_screenshot(
    Path(name): Path<String>,
    Extension(config): Extension<Arc<ArchiveConfig>>,
) -> Result<impl IntoResponse, StatusCode> {
    if !is_servable(&name) {
        return Err(StatusCode::NOT_FOUND);
    }

    let path = config.data_dir.join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/webp")], bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::warn!("Failed to read screenshot {}: {}", path.display(), e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Only bare `<page_id>.webp` names are served.
fn is_servable(name: &str) -> bool {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return false;
    }
    CaptureFile::from_path(std::path::Path::new(name))
        .is_some_and(|file| file.kind == ArtifactKind::Compressed)
}
