//! Hashtag extraction

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static HASHTAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#(\w+)").unwrap());

/// Every hashtag in the corpus, without the `#`, in order of appearance
pub fn extract_hashtags<S: AsRef<str>>(posts: &[S]) -> Vec<String> {
    posts
        .iter()
        .flat_map(|post| {
            HASHTAG_REGEX
                .captures_iter(post.as_ref())
                .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Hashtags ranked by frequency (ties alphabetical)
pub fn hashtag_counts<S: AsRef<str>>(posts: &[S]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for tag in extract_hashtags(posts) {
        *counts.entry(tag).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
