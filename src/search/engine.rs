use super::tokenizer::tokenize;
use super::types::{MatchKind, SearchQuery, SearchResponse, SearchResultItem};
use crate::storage::memory::ArchiveState;

use std::collections::{HashMap, HashSet};

/// Evaluates `query` against one published state.
///
/// Each selected corpus contributes the pages containing every query token. A page found in
/// both corpora is reported once as [`MatchKind::Both`]. Results are newest first; ids
/// referenced by an index but missing from the page map are skipped.
pub fn search(state: &ArchiveState, query: &SearchQuery) -> SearchResponse {
    let tokens = tokenize(&query.text);
    let matches = matching_pages(state, &tokens, query.include_source, query.include_onscreen);

    let mut results: Vec<SearchResultItem> = matches
        .into_iter()
        .filter_map(|(page_id, match_kind)| {
            let page = state.page(&page_id)?;
            Some(SearchResultItem {
                page_id,
                url: page.url.clone(),
                captured_at: page.captured_at.clone(),
                title: page.title.clone(),
                screenshot: page.screenshot_ref(),
                match_kind,
                same_url_as_previous: false,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        b.captured_at
            .cmp(&a.captured_at)
            .then_with(|| b.page_id.cmp(&a.page_id))
    });
    mark_repeated_urls(&mut results);

    let total_count = results.len();
    results.truncate(query.limit);

    SearchResponse {
        query: query.text.clone(),
        total_count,
        count: results.len(),
        results,
        most_recent: state.most_recent().map(str::to_string),
        indexed_pages: state.page_count(),
    }
}

/// Page ids matching every token in the selected corpora, tagged with where they matched.
pub fn matching_pages(
    state: &ArchiveState,
    tokens: &[String],
    include_source: bool,
    include_onscreen: bool,
) -> HashMap<String, MatchKind> {
    let source: HashSet<String> = if include_source {
        state.source_index.pages_matching_all(tokens)
    } else {
        HashSet::new()
    };
    let onscreen: HashSet<String> = if include_onscreen {
        state.onscreen_index.pages_matching_all(tokens)
    } else {
        HashSet::new()
    };

    let mut matches: HashMap<String, MatchKind> = HashMap::new();
    for page_id in &source {
        let kind = if onscreen.contains(page_id) {
            MatchKind::Both
        } else {
            MatchKind::SourceOnly
        };
        matches.insert(page_id.clone(), kind);
    }
    for page_id in onscreen {
        matches.entry(page_id).or_insert(MatchKind::OnscreenOnly);
    }
    matches
}

fn mark_repeated_urls(results: &mut [SearchResultItem]) {
    for i in 1..results.len() {
        results[i].same_url_as_previous = results[i].url == results[i - 1].url;
    }
}
