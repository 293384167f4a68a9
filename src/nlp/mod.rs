//! Text processing for post corpora
//!
//! Includes:
//! - Normalization (marker, link, punctuation and stopword stripping)
//! - The English + French stopword lexicon
//! - Hashtag extraction

mod cleaner;
mod hashtags;
mod stopwords;

pub use cleaner::TextNormalizer;
pub use hashtags::{extract_hashtags, hashtag_counts};
pub use stopwords::StopWords;
