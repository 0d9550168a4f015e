use regex::Regex;
use std::sync::LazyLock;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[[:punct:]]").expect("punctuation class is a valid regex")
});

/// Normalizes text the same way for indexing and querying: ASCII punctuation is removed,
/// the rest is lowercased and split on whitespace. Repeated words are kept, since the index
/// stores occurrence counts.
pub fn tokenize(text: &str) -> Vec<String> {
    PUNCTUATION
        .replace_all(text, "")
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

