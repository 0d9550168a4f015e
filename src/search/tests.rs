//! Search Module Tests
//!
//! Validates tokenization, boolean evaluation and the HTTP surface.
//!
//! ## Test Scopes
//! - **Tokenizer**: Case folding, punctuation stripping, whitespace splitting.
//! - **Engine**: AND semantics, corpus selection, match kinds, ordering and truncation.
//! - **Handlers**: JSON search, stats, screenshot streaming and response headers.

#[cfg(test)]
mod tests {
    use crate::config::ArchiveConfig;
    use crate::search::engine::{matching_pages, search};
    use crate::search::handlers::router;
    use crate::search::tokenizer::tokenize;
    use crate::search::types::{MatchKind, SearchQuery, SearchResponse, StatsResponse};
    use crate::storage::memory::{ArchiveState, ArchiveStore};
    use crate::storage::types::PageRecord;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn add_page(state: &mut ArchiveState, page_id: &str, url: &str, captured_at: &str) {
        state.pages.insert(
            page_id.to_string(),
            PageRecord::new(
                page_id.to_string(),
                url.to_string(),
                page_id.to_string(),
                captured_at.to_string(),
                Some(format!("Title {}", page_id)),
            ),
        );
    }

    fn source(state: &mut ArchiveState, page_id: &str, text: &str) {
        state.source_index.add_tokens(page_id, tokenize(text));
    }

    fn onscreen(state: &mut ArchiveState, page_id: &str, text: &str) {
        state.onscreen_index.add_tokens(page_id, tokenize(text));
    }

    fn ids(response: &SearchResponse) -> Vec<&str> {
        response.results.iter().map(|r| r.page_id.as_str()).collect()
    }

    // ============================================================
    // TOKENIZER TESTS
    // ============================================================

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        let tokens = tokenize("Hello, World! It's C++ (v2.0)");
        assert_eq!(tokens, vec!["hello", "world", "its", "c", "v20"]);
    }

    #[test]
    fn test_tokenize_keeps_repeats_and_short_words() {
        let tokens = tokenize("a A a");
        assert_eq!(tokens, vec!["a", "a", "a"]);
    }

    #[test]
    fn test_tokenize_splits_on_any_whitespace() {
        let tokens = tokenize("one\ttwo\n\nthree   four");
        assert_eq!(tokens, vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_tokenize_punctuation_only_is_empty() {
        assert!(tokenize("... --- !!!").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_non_ascii_letters_survive() {
        let tokens = tokenize("Straße Ünïcode");
        assert_eq!(tokens, vec!["straße", "ünïcode"]);
    }

    #[test]
    fn test_tokenize_query_case_and_punctuation() {
        assert_eq!(tokenize("Error!"), tokenize("error"));
    }

    // ============================================================
    // ENGINE TESTS
    // ============================================================

    #[test]
    fn test_and_semantics_is_intersection() {
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://a", "20240101-000001");
        add_page(&mut state, "p2", "https://b", "20240101-000002");
        add_page(&mut state, "p3", "https://c", "20240101-000003");
        source(&mut state, "p1", "alpha beta");
        source(&mut state, "p2", "alpha");
        source(&mut state, "p3", "beta gamma alpha");

        let response = search(&state, &SearchQuery::new("alpha beta", 12));

        assert_eq!(ids(&response), vec!["p3", "p1"]);
        assert_eq!(response.total_count, 2);
    }

    #[test]
    fn test_unknown_token_empties_corpus() {
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://a", "20240101-000001");
        source(&mut state, "p1", "beta");

        let response = search(&state, &SearchQuery::new("alpha beta", 12));
        assert!(response.results.is_empty());
        assert_eq!(response.total_count, 0);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://a", "20240101-000001");
        source(&mut state, "p1", "anything");

        for q in ["", "   ", "?!."] {
            let response = search(&state, &SearchQuery::new(q, 12));
            assert!(response.results.is_empty(), "query {:?}", q);
            assert_eq!(response.indexed_pages, 1);
        }
    }

    #[test]
    fn test_match_kinds() {
        let mut state = ArchiveState::new();
        add_page(&mut state, "src", "https://a", "20240101-000001");
        add_page(&mut state, "ocr", "https://b", "20240101-000002");
        add_page(&mut state, "both", "https://c", "20240101-000003");
        source(&mut state, "src", "login");
        onscreen(&mut state, "ocr", "login");
        source(&mut state, "both", "login");
        onscreen(&mut state, "both", "LOGIN");

        let matches = matching_pages(&state, &tokenize("login"), true, true);

        assert_eq!(matches.len(), 3);
        assert_eq!(matches["src"], MatchKind::SourceOnly);
        assert_eq!(matches["ocr"], MatchKind::OnscreenOnly);
        assert_eq!(matches["both"], MatchKind::Both);
    }

    #[test]
    fn test_corpus_selection_flags() {
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://a", "20240101-000001");
        add_page(&mut state, "p2", "https://b", "20240101-000002");
        source(&mut state, "p1", "invoice");
        source(&mut state, "p2", "invoice");
        onscreen(&mut state, "p2", "invoice");

        let mut query = SearchQuery::new("invoice", 12);
        query.include_onscreen = false;
        let response = search(&state, &query);
        assert_eq!(ids(&response), vec!["p2", "p1"]);
        assert!(response.results.iter().all(|r| r.match_kind == MatchKind::SourceOnly));

        query.include_onscreen = true;
        query.include_source = false;
        let response = search(&state, &query);
        assert_eq!(ids(&response), vec!["p2"]);
        assert_eq!(response.results[0].match_kind, MatchKind::OnscreenOnly);

        query.include_onscreen = false;
        assert!(search(&state, &query).results.is_empty());
    }

    #[test]
    fn test_results_newest_first_and_truncated() {
        let mut state = ArchiveState::new();
        for i in 0..20 {
            let id = format!("p{:02}", i);
            add_page(&mut state, &id, &format!("https://site/{}", i), &format!("20240101-0000{:02}", i));
            source(&mut state, &id, "common");
        }

        let response = search(&state, &SearchQuery::new("common", 12));

        assert_eq!(response.total_count, 20);
        assert_eq!(response.count, 12);
        assert_eq!(response.results.len(), 12);
        assert_eq!(response.results[0].page_id, "p19");
        assert_eq!(response.results[11].page_id, "p08");
        assert_eq!(response.most_recent.as_deref(), Some("20240101-000019"));
    }

    #[test]
    fn test_same_url_flag_on_consecutive_results() {
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://same", "20240101-000001");
        add_page(&mut state, "p2", "https://same", "20240101-000002");
        add_page(&mut state, "p3", "https://other", "20240101-000003");
        add_page(&mut state, "p4", "https://same", "20240101-000004");
        for id in ["p1", "p2", "p3", "p4"] {
            source(&mut state, id, "news");
        }

        let response = search(&state, &SearchQuery::new("news", 12));
        let flags: Vec<bool> = response.results.iter().map(|r| r.same_url_as_previous).collect();

        assert_eq!(ids(&response), vec!["p4", "p3", "p2", "p1"]);
        assert_eq!(flags, vec![false, false, false, true]);
    }

    #[test]
    fn test_index_entry_without_page_record_is_skipped() {
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://a", "20240101-000001");
        source(&mut state, "p1", "orphan");
        source(&mut state, "ghost", "orphan");

        let response = search(&state, &SearchQuery::new("orphan", 12));
        assert_eq!(ids(&response), vec!["p1"]);
    }

    #[test]
    fn test_result_carries_page_metadata() {
        let mut state = ArchiveState::new();
        state.pages.insert(
            "p2".to_string(),
            PageRecord::new(
                "p2".to_string(),
                "https://example.com".to_string(),
                "p1".to_string(),
                "20240101-000002".to_string(),
                None,
            ),
        );
        source(&mut state, "p2", "metadata");

        let response = search(&state, &SearchQuery::new("metadata", 12));
        let item = &response.results[0];

        assert_eq!(item.url, "https://example.com");
        assert_eq!(item.screenshot, "screenshots/p1.webp");
        assert!(item.title.is_none());
    }

    #[test]
    fn test_search_on_empty_state() {
        let response = search(&ArchiveState::new(), &SearchQuery::new("anything", 12));
        assert_eq!(response.total_count, 0);
        assert_eq!(response.indexed_pages, 0);
        assert!(response.most_recent.is_none());
    }

    // ============================================================
    // HANDLER TESTS
    // ============================================================

    fn app(state: ArchiveState, dir: &TempDir) -> axum::Router {
        let config = ArchiveConfig {
            data_dir: dir.path().to_path_buf(),
            ..ArchiveConfig::default()
        };
        router(ArchiveStore::new(state), Arc::new(config))
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        response.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let dir = TempDir::new().unwrap();
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://a", "20240101-000001");
        add_page(&mut state, "p2", "https://b", "20240101-000002");
        source(&mut state, "p1", "error page");
        onscreen(&mut state, "p2", "error dialog");

        let response = app(state, &dir)
            .oneshot(
                Request::builder()
                    .uri("/search?q=Error&page_source=false&limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");

        let body: SearchResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body.total_count, 1);
        assert_eq!(body.results[0].page_id, "p2");
        assert_eq!(body.results[0].match_kind, MatchKind::OnscreenOnly);
        assert_eq!(body.indexed_pages, 2);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let dir = TempDir::new().unwrap();
        let mut state = ArchiveState::new();
        add_page(&mut state, "p1", "https://a", "20240101-000001");

        let response = app(state, &dir)
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let stats: StatsResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(stats.indexed_pages, 1);
        assert_eq!(stats.most_recent.as_deref(), Some("20240101-000001"));
    }

    #[tokio::test]
    async fn test_screenshot_endpoint_serves_webp() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("20240101001.webp"), b"RIFFwebp").unwrap();

        let response = app(ArchiveState::new(), &dir)
            .oneshot(
                Request::builder()
                    .uri("/screenshots/20240101001.webp")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/webp");
        assert_eq!(body_bytes(response).await, b"RIFFwebp".to_vec());
    }

    #[tokio::test]
    async fn test_screenshot_endpoint_rejects_other_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("20240101001.txt"), b"secret").unwrap();

        for uri in [
            "/screenshots/20240101001.txt",
            "/screenshots/page_metadata.json",
            "/screenshots/..%2Fetc.webp",
            "/screenshots/20240101999.webp",
        ] {
            let response = app(ArchiveState::new(), &dir)
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {}", uri);
        }
    }
}
