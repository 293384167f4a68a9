//! Data loading and saving utilities
//!
//! Reads post and price histories from CSV files and writes impact tables back out.

use crate::error::{AnalysisError, Result};
use crate::impact::ImpactTable;
use crate::models::{Post, PriceBar, DATE_FORMAT};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{Reader, Writer};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Link template for posts; `{id}` is replaced by the post id
pub const DEFAULT_URL_TEMPLATE: &str = "https://twitter.com/elonmusk/status/{id}";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One row of a post export
#[derive(Debug, Deserialize)]
struct PostRow {
    id: String,
    tweet: String,
    date: String,
}

/// One row of a daily price export
#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "High")]
    high: f64,
}

/// Parse a post timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, RFC 3339 and bare
/// `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.naive_local());
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AnalysisError::Timestamp(raw.to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Ok(date),
        Err(_) => parse_timestamp(raw).map(|ts| ts.date()),
    }
}

/// Data loader for CSV files
#[derive(Debug, Clone)]
pub struct DataLoader {
    url_template: String,
}

impl DataLoader {
    /// Create a loader that links posts with the default template
    pub fn new() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }

    /// Use a different link template for posts
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Load posts from a CSV file with `id`, `tweet` and `date` columns
    pub fn load_posts<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Post>> {
        let file = File::open(&path)?;
        let posts = self.read_posts(file)?;
        info!("Loaded {} posts from {:?}", posts.len(), path.as_ref());
        Ok(posts)
    }

    /// Read posts from any CSV source
    pub fn read_posts<R: Read>(&self, source: R) -> Result<Vec<Post>> {
        let mut reader = Reader::from_reader(source);
        let mut posts = Vec::new();

        for result in reader.deserialize() {
            let row: PostRow = result?;
            let timestamp = parse_timestamp(&row.date)?;
            let source_url = self.url_template.replace("{id}", row.id.trim());
            posts.push(Post::new(row.tweet, timestamp, source_url));
        }

        Ok(posts)
    }

    /// Load daily prices from a CSV file with `Date`, `Open`, `Close` and `High` columns
    pub fn load_prices<P: AsRef<Path>>(path: P) -> Result<Vec<PriceBar>> {
        let file = File::open(&path)?;
        let prices = Self::read_prices(file)?;
        info!("Loaded {} price bars from {:?}", prices.len(), path.as_ref());
        Ok(prices)
    }

    /// Read daily prices from any CSV source, keeping file order
    pub fn read_prices<R: Read>(source: R) -> Result<Vec<PriceBar>> {
        let mut reader = Reader::from_reader(source);
        let mut prices = Vec::new();

        for result in reader.deserialize() {
            let row: PriceRow = result?;
            prices.push(PriceBar::new(parse_date(&row.date)?, row.open, row.close, row.high));
        }

        Ok(prices)
    }

    /// Save an impact table to a CSV file
    pub fn save_impact_table<P: AsRef<Path>>(table: &ImpactTable, path: P) -> Result<()> {
        let file = File::create(&path)?;
        let mut writer = Writer::from_writer(file);

        for record in table.records() {
            writer.serialize(record)?;
        }

        writer.flush()?;
        info!("Saved {} impact records to {:?}", table.len(), path.as_ref());
        Ok(())
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}
