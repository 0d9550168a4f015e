use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// token -> page id -> occurrence count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct InvertedIndex {
    postings: HashMap<String, HashMap<String, u32>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of every token for `page_id`. Tokens must already be normalized.
    pub fn add_tokens<I, S>(&mut self, page_id: &str, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            *self
                .postings
                .entry(token.into())
                .or_default()
                .entry(page_id.to_string())
                .or_insert(0) += 1;
        }
    }

    /// Drops every posting for `page_id`, removing tokens left with no pages.
    pub fn remove_page(&mut self, page_id: &str) {
        self.postings.retain(|_, pages| {
            pages.remove(page_id);
            !pages.is_empty()
        });
    }

    pub fn count(&self, token: &str, page_id: &str) -> u32 {
        self.postings
            .get(token)
            .and_then(|pages| pages.get(page_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn pages_for(&self, token: &str) -> Option<&HashMap<String, u32>> {
        self.postings.get(token)
    }

    /// Pages containing every token. Empty when `tokens` is empty or any token is unknown.
    pub fn pages_matching_all(&self, tokens: &[String]) -> HashSet<String> {
        let mut result: Option<HashSet<String>> = None;

        for token in tokens {
            let Some(pages) = self.pages_for(token) else {
                return HashSet::new();
            };
            result = Some(match result {
                None => pages.keys().cloned().collect(),
                Some(acc) => acc.into_iter().filter(|id| pages.contains_key(id)).collect(),
            });
            if result.as_ref().is_some_and(|acc| acc.is_empty()) {
                break;
            }
        }

        result.unwrap_or_default()
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
