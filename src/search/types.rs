use serde::{Deserialize, Serialize};

/// Which corpus (or corpora) a result matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    SourceOnly,
    OnscreenOnly,
    Both,
}

/// A boolean AND query over one or both corpora.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub include_source: bool,
    pub include_onscreen: bool,
    /// Maximum results returned; `total_count` still reports every match.
    pub limit: usize,
}

impl SearchQuery {
    /// Both corpora enabled.
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            include_source: true,
            include_onscreen: true,
            limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub page_id: String,
    pub url: String,
    pub captured_at: String,
    pub title: Option<String>,
    /// Relative URL of the compressed screenshot.
    pub screenshot: String,
    pub match_kind: MatchKind,
    /// Set when the previous result has the same URL, so the caller can collapse runs.
    pub same_url_as_previous: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_count: usize,
    pub count: usize,
    pub results: Vec<SearchResultItem>,
    pub most_recent: Option<String>,
    pub indexed_pages: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub indexed_pages: usize,
    pub most_recent: Option<String>,
}
