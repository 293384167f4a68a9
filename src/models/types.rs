//! Core data types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Date format used as the join key between posts and prices
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single social-media post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Raw post text
    pub text: String,
    /// Publication time
    pub timestamp: NaiveDateTime,
    /// Link back to the original post
    pub source_url: String,
}

impl Post {
    pub fn new(text: impl Into<String>, timestamp: NaiveDateTime, source_url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp,
            source_url: source_url.into(),
        }
    }

    /// Calendar date used to align the post with daily prices
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Replies start with a mention of the account being answered
    pub fn is_reply(&self) -> bool {
        self.text.starts_with('@')
    }
}

/// Daily price observation for one asset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading day
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Closing price
    pub close: f64,
    /// Highest price of the day
    pub high: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, close: f64, high: f64) -> Self {
        Self { date, open, close, high }
    }

    /// Normalized `YYYY-MM-DD` representation of the trading day
    pub fn timestamp(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Price movement around the date of a qualifying post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRecord {
    /// Post date
    pub timestamp: NaiveDate,
    /// Open price on the post date
    pub before: f64,
    /// Mean close price over the window after the post
    pub after: f64,
    /// `after - before`
    pub differ: f64,
    /// `before`, standardized against the full Open column
    pub before_scaled: f64,
    /// `after`, standardized against the full Close column
    pub after_scaled: f64,
    /// `after_scaled - before_scaled`
    pub differ_scaled: f64,
    /// `differ_scaled` as a percentage of `before_scaled`
    pub differ_percent: f64,
    /// Text of the post the record was keyed to
    pub post_text: String,
    /// Link to that post
    pub source_url: String,
}

/// A post after each stage of text normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedPost {
    /// Input text
    pub original: String,
    /// Text without mention/retweet markers and links
    pub tidy: String,
    /// Letters-only text without stopwords and hashtags
    pub tidier: String,
}
