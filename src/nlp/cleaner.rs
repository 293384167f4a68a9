//! Post corpus normalization
//!
//! Turns raw post text into a cleaned corpus:
//! 1. strip `@name: ` mention markers and `RT` retweet markers
//! 2. drop tokens containing a link
//! 3. drop rows left empty
//! 4. drop every copy of a duplicated row
//! 5. keep only `[a-zA-Z# ]`
//! 6. drop stopwords and hashtag tokens
//!
//! Rows emptied or duplicated by steps 5-6 are dropped as well, so running the
//! normalizer on its own output changes nothing.

use super::stopwords::StopWords;
use crate::models::CleanedPost;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

static MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w*: |\bRT\b").unwrap());
static NON_LETTER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z# ]").unwrap());

const RETWEET_MARKER: &str = "RT";
const LINK_MARKER: &str = "http";

/// Cleans post corpora against a borrowed stopword lexicon
#[derive(Debug, Clone, Copy)]
pub struct TextNormalizer<'a> {
    stop_words: &'a StopWords,
}

impl<'a> TextNormalizer<'a> {
    pub fn new(stop_words: &'a StopWords) -> Self {
        Self { stop_words }
    }

    /// Remove mention and retweet markers
    pub fn strip_markers(&self, text: &str) -> String {
        MARKER_REGEX.replace_all(text, "").into_owned()
    }

    /// Remove every whitespace-delimited token containing a link
    pub fn strip_links(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|word| !word.contains(LINK_MARKER))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Remove everything outside `[a-zA-Z# ]`
    pub fn strip_punctuation(&self, text: &str) -> String {
        NON_LETTER_REGEX.replace_all(text, "").into_owned()
    }

    /// Remove stopwords and hashtags
    pub fn strip_stopwords(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|word| self.keeps(word))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn keeps(&self, word: &str) -> bool {
        !self.stop_words.contains(word)
            && !word.contains('#')
            // punctuation stripping can glue a link or marker back together
            && !word.contains(LINK_MARKER)
            && word != RETWEET_MARKER
    }

    /// Run the full pipeline, keeping every intermediate text
    pub fn clean<S: AsRef<str>>(&self, posts: &[S]) -> Vec<CleanedPost> {
        let tidy: Vec<CleanedPost> = posts
            .iter()
            .map(|post| {
                let original = post.as_ref().to_string();
                let tidy = self.strip_links(&self.strip_markers(&original));
                CleanedPost {
                    original,
                    tidy,
                    tidier: String::new(),
                }
            })
            .filter(|post| !post.tidy.is_empty())
            .collect();
        let before_dedup = tidy.len();

        let tidy = drop_duplicates(tidy, |post| &post.tidy);
        debug!(
            "{} posts, {} non-empty after link removal, {} unique",
            posts.len(),
            before_dedup,
            tidy.len()
        );

        let cleaned: Vec<CleanedPost> = tidy
            .into_iter()
            .map(|mut post| {
                post.tidier = self.strip_stopwords(&self.strip_punctuation(&post.tidy));
                post
            })
            .filter(|post| !post.tidier.is_empty())
            .collect();

        drop_duplicates(cleaned, |post| &post.tidier)
    }

    /// Run the full pipeline and return only the final text
    pub fn clean_texts<S: AsRef<str>>(&self, posts: &[S]) -> Vec<String> {
        self.clean(posts).into_iter().map(|post| post.tidier).collect()
    }
}

/// Keep only rows whose key occurs exactly once
fn drop_duplicates<F>(rows: Vec<CleanedPost>, key: F) -> Vec<CleanedPost>
where
    F: Fn(&CleanedPost) -> &String,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in &rows {
        *counts.entry(key(row).clone()).or_insert(0) += 1;
    }

    rows.into_iter()
        .filter(|row| counts.get(key(row)) == Some(&1))
        .collect()
}
