//! Before/after price alignment for qualifying posts
//!
//! For every post date that survives filtering, the Open price on that date is
//! compared with the mean Close price over the following `window_days` days.
//! Both sides are standardized against the full price columns they come from
//! (Open for "before", Close for "after"), never against the filtered subset.

use super::scaler::StandardScaler;
use super::table::ImpactTable;
use crate::error::{AnalysisError, Result};
use crate::models::{ImpactRecord, Post, PriceBar};
use crate::utils::config::{default_cutoff_date, default_keywords, AnalysisConfig};
use chrono::{Days, NaiveDate};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// How to average a window where some shifted dates have no price bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Average the lookups that exist; drop the date if none exist
    #[default]
    Skip,
    /// Any missing lookup makes the average NaN; the record is kept
    Propagate,
}

impl MissingPolicy {
    /// Mean of each column of a `days x dates` matrix where NaN marks a missing lookup
    pub fn column_means(self, matrix: &Array2<f64>) -> Array1<f64> {
        match self {
            MissingPolicy::Propagate => matrix
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::from_elem(matrix.ncols(), f64::NAN)),
            MissingPolicy::Skip => matrix
                .columns()
                .into_iter()
                .map(|col| {
                    let (sum, count) = col
                        .iter()
                        .filter(|v| !v.is_nan())
                        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                    if count == 0 {
                        f64::NAN
                    } else {
                        sum / count as f64
                    }
                })
                .collect(),
        }
    }
}

/// Case-sensitive keyword containment test
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordFilter {
    keywords: Vec<String>,
    invert: bool,
}

impl KeywordFilter {
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            invert: false,
        }
    }

    /// Select posts that do *not* mention any keyword
    pub fn inverted(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Does the text contain any of the keywords?
    pub fn mentions(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }

    /// Is the text in the selected partition?
    pub fn selects(&self, text: &str) -> bool {
        self.mentions(text) != self.invert
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(default_keywords())
    }
}

/// Matches posts to price observations and measures the move after each one
#[derive(Debug, Clone)]
pub struct ImpactAligner {
    window_days: u32,
    cutoff: NaiveDate,
    filter: KeywordFilter,
    missing: MissingPolicy,
}

impl ImpactAligner {
    /// Create an aligner averaging `window_days` days after each post.
    ///
    /// `window_days` must be at least 1; `align` rejects 0.
    pub fn new(window_days: u32) -> Self {
        Self {
            window_days,
            cutoff: default_cutoff_date(),
            filter: KeywordFilter::default(),
            missing: MissingPolicy::default(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            window_days: config.window_days,
            cutoff: config.cutoff_date,
            filter: KeywordFilter::new(config.keywords.clone()).inverted(config.invert_filter),
            missing: config.missing_policy,
        }
    }

    /// Only consider posts dated strictly before `cutoff`
    pub fn with_cutoff(mut self, cutoff: NaiveDate) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.filter = KeywordFilter::new(keywords).inverted(self.filter.is_inverted());
        self
    }

    /// Select posts not mentioning the keywords instead
    pub fn inverted(mut self, invert: bool) -> Self {
        self.filter = self.filter.inverted(invert);
        self
    }

    pub fn with_missing_policy(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.cutoff
    }

    pub fn filter(&self) -> &KeywordFilter {
        &self.filter
    }

    /// Is the post a candidate for alignment (not a reply, right partition, before cutoff)?
    pub fn qualifies(&self, post: &Post) -> bool {
        !post.is_reply() && self.filter.selects(&post.text) && post.date() < self.cutoff
    }

    /// Build the impact table, sorted by `differ` descending.
    ///
    /// Posts sharing a date collapse into one record carrying the first post's
    /// text. Dates without a price bar are skipped.
    pub fn align(&self, posts: &[Post], prices: &[PriceBar]) -> Result<ImpactTable> {
        if self.window_days == 0 {
            return Err(AnalysisError::InvalidWindow(self.window_days));
        }

        let mut first_post: BTreeMap<NaiveDate, &Post> = BTreeMap::new();
        for post in posts.iter().filter(|p| self.qualifies(p)) {
            first_post.entry(post.date()).or_insert(post);
        }

        let mut book: HashMap<NaiveDate, &PriceBar> = HashMap::with_capacity(prices.len());
        for bar in prices {
            book.entry(bar.date).or_insert(bar);
        }

        let dates: Vec<NaiveDate> = first_post
            .keys()
            .copied()
            .filter(|date| book.contains_key(date))
            .collect();
        debug!(
            "{} posts, {} qualifying dates, {} with a price bar",
            posts.len(),
            first_post.len(),
            dates.len()
        );

        let opens: Array1<f64> = prices.iter().map(|bar| bar.open).collect();
        let closes: Array1<f64> = prices.iter().map(|bar| bar.close).collect();
        let (Some(open_scaler), Some(close_scaler)) =
            (StandardScaler::fit(&opens), StandardScaler::fit(&closes))
        else {
            info!("No price data, impact table is empty");
            return Ok(ImpactTable::default());
        };

        let before: Array1<f64> = dates.iter().map(|date| book[date].open).collect();
        let after = self.window_means(&dates, &book);

        let before_scaled = open_scaler.transform(&before);
        let after_scaled = close_scaler.transform(&after);
        let differ = &after - &before;
        let differ_scaled = &after_scaled - &before_scaled;
        let differ_percent = &differ_scaled * 100.0 / &before_scaled;

        let records: Vec<ImpactRecord> = dates
            .iter()
            .enumerate()
            .filter(|(i, _)| self.missing == MissingPolicy::Propagate || !after[*i].is_nan())
            .map(|(i, date)| {
                let post = first_post[date];
                ImpactRecord {
                    timestamp: *date,
                    before: before[i],
                    after: after[i],
                    differ: differ[i],
                    before_scaled: before_scaled[i],
                    after_scaled: after_scaled[i],
                    differ_scaled: differ_scaled[i],
                    differ_percent: differ_percent[i],
                    post_text: post.text.clone(),
                    source_url: post.source_url.clone(),
                }
            })
            .collect();

        info!(
            "Aligned {} of {} dates over a {}-day window",
            records.len(),
            dates.len(),
            self.window_days
        );

        Ok(ImpactTable::new(records))
    }

    /// Mean Close over the window after each date, per the missing-lookup policy
    fn window_means(&self, dates: &[NaiveDate], book: &HashMap<NaiveDate, &PriceBar>) -> Array1<f64> {
        let closes = self.shifted_closes(dates, book);

        // rows past the last bar were never built; each of them is a missing lookup
        let truncated = closes.nrows() < self.window_days as usize;
        if closes.nrows() == 0 || (truncated && self.missing == MissingPolicy::Propagate) {
            return Array1::from_elem(dates.len(), f64::NAN);
        }

        self.missing.column_means(&closes)
    }

    /// Close prices `1..=window_days` days after each date; NaN where no bar exists.
    ///
    /// Offsets that reach past the last price date are left out.
    fn shifted_closes(&self, dates: &[NaiveDate], book: &HashMap<NaiveDate, &PriceBar>) -> Array2<f64> {
        let reach = match book.keys().max() {
            Some(last) => dates
                .iter()
                .map(|date| (*last - *date).num_days().max(0))
                .max()
                .unwrap_or(0),
            None => 0,
        };
        let rows = u64::from(self.window_days).min(reach as u64);
        debug!("{} of {} window offsets can reach a price bar", rows, self.window_days);

        let mut matrix = Array2::from_elem((rows as usize, dates.len()), f64::NAN);

        for (row, offset) in (1..=rows).enumerate() {
            for (col, date) in dates.iter().enumerate() {
                let bar = date
                    .checked_add_days(Days::new(offset))
                    .and_then(|shifted| book.get(&shifted));
                if let Some(bar) = bar {
                    matrix[[row, col]] = bar.close;
                }
            }
        }

        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn day(d: &str) -> NaiveDate {
        NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()
    }

    fn post(text: &str, date: &str) -> Post {
        Post::new(text, day(date).and_hms_opt(12, 0, 0).unwrap(), format!("url-{date}"))
    }

    fn bar(date: &str, open: f64, close: f64) -> PriceBar {
        PriceBar::new(day(date), open, close, close)
    }

    fn prices() -> Vec<PriceBar> {
        vec![
            bar("2021-02-01", 0.05, 0.055),
            bar("2021-02-02", 0.055, 0.06),
            bar("2021-02-03", 0.06, 0.07),
            bar("2021-02-04", 0.07, 0.04),
            bar("2021-02-05", 0.04, 0.05),
        ]
    }

    #[test]
    fn test_single_post_one_day_window() {
        let table = ImpactAligner::new(1)
            .align(&[post("Doge to the moon!", "2021-02-01")], &prices())
            .unwrap();

        assert_eq!(table.len(), 1);
        let record = &table.records()[0];
        assert_eq!(record.timestamp, day("2021-02-01"));
        assert_relative_eq!(record.before, 0.05);
        assert_relative_eq!(record.after, 0.06);
        assert_relative_eq!(record.differ, 0.01, epsilon = 1e-12);
        assert_eq!(record.post_text, "Doge to the moon!");
        assert_eq!(record.source_url, "url-2021-02-01");
    }

    #[test]
    fn test_window_averages_closes() {
        let table = ImpactAligner::new(3)
            .align(&[post("doge", "2021-02-01")], &prices())
            .unwrap();

        assert_relative_eq!(table.records()[0].after, (0.06 + 0.07 + 0.04) / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scalers_fit_on_full_columns() {
        let prices = prices();
        let table = ImpactAligner::new(1)
            .align(&[post("doge", "2021-02-02")], &prices)
            .unwrap();
        let record = &table.records()[0];

        let opens: Array1<f64> = prices.iter().map(|b| b.open).collect();
        let closes: Array1<f64> = prices.iter().map(|b| b.close).collect();
        let open_scaler = StandardScaler::fit(&opens).unwrap();
        let close_scaler = StandardScaler::fit(&closes).unwrap();

        assert_relative_eq!(record.before_scaled, open_scaler.transform_value(0.055), epsilon = 1e-12);
        assert_relative_eq!(record.after_scaled, close_scaler.transform_value(0.07), epsilon = 1e-12);
        assert_relative_eq!(
            record.differ_scaled,
            record.after_scaled - record.before_scaled,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            record.differ_percent,
            record.differ_scaled * 100.0 / record.before_scaled,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_replies_are_excluded() {
        let table = ImpactAligner::new(1)
            .align(&[post("@fan Doge is cool", "2021-02-01")], &prices())
            .unwrap();
        assert!(table.is_empty());

        let table = ImpactAligner::new(1)
            .inverted(true)
            .align(&[post("@fan thanks", "2021-02-01")], &prices())
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_keyword_partition() {
        let posts = vec![
            post("Doge rules", "2021-02-01"),
            post("dogecoin rules", "2021-02-02"),
            post("DOGE is shouting", "2021-02-03"),
            post("Mars", "2021-02-04"),
        ];

        let selected = ImpactAligner::new(1).align(&posts, &prices()).unwrap();
        let mut dates: Vec<_> = selected.iter().map(|r| r.timestamp).collect();
        dates.sort();
        assert_eq!(dates, vec![day("2021-02-01"), day("2021-02-02")]);

        let others = ImpactAligner::new(1).inverted(true).align(&posts, &prices()).unwrap();
        let mut dates: Vec<_> = others.iter().map(|r| r.timestamp).collect();
        dates.sort();
        assert_eq!(dates, vec![day("2021-02-03"), day("2021-02-04")]);
    }

    #[test]
    fn test_cutoff_is_exclusive() {
        let aligner = ImpactAligner::new(1).with_cutoff(day("2021-02-02"));
        let posts = vec![post("doge", "2021-02-01"), post("doge", "2021-02-02")];
        let table = aligner.align(&posts, &prices()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].timestamp, day("2021-02-01"));
    }

    #[test]
    fn test_dates_without_bars_are_dropped() {
        let posts = vec![post("doge", "2021-01-15"), post("doge", "2021-02-01")];
        let table = ImpactAligner::new(1).align(&posts, &prices()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].timestamp, day("2021-02-01"));
    }

    #[test]
    fn test_missing_after_policies() {
        // 2021-02-05 is the last bar, nothing follows it
        let posts = vec![post("doge", "2021-02-04"), post("doge", "2021-02-05")];

        let skipped = ImpactAligner::new(2).align(&posts, &prices()).unwrap();
        assert_eq!(skipped.len(), 1);
        assert_relative_eq!(skipped.records()[0].after, 0.05);

        let propagated = ImpactAligner::new(2)
            .with_missing_policy(MissingPolicy::Propagate)
            .align(&posts, &prices())
            .unwrap();
        assert_eq!(propagated.len(), 2);
        assert!(propagated.records().iter().all(|r| r.after.is_nan()));
    }

    #[test]
    fn test_huge_window_stops_at_last_bar() {
        let posts = vec![post("doge", "2021-02-01")];

        let skipped = ImpactAligner::new(u32::MAX).align(&posts, &prices()).unwrap();
        assert_eq!(skipped.len(), 1);
        assert_relative_eq!(skipped.records()[0].after, (0.06 + 0.07 + 0.04 + 0.05) / 4.0, epsilon = 1e-12);

        let propagated = ImpactAligner::new(u32::MAX)
            .with_missing_policy(MissingPolicy::Propagate)
            .align(&posts, &prices())
            .unwrap();
        assert_eq!(propagated.len(), 1);
        assert!(propagated.records()[0].after.is_nan());
    }

    #[test]
    fn test_huge_window_single_bar() {
        let posts = vec![post("Doge", "2021-02-01")];
        let table = ImpactAligner::new(u32::MAX)
            .align(&posts, &[bar("2021-02-01", 0.05, 0.06)])
            .unwrap();

        assert!(table.is_empty());
    }

    #[test]
    fn test_window_ending_on_last_bar_is_complete() {
        let posts = vec![post("doge", "2021-02-03")];
        let table = ImpactAligner::new(2)
            .with_missing_policy(MissingPolicy::Propagate)
            .align(&posts, &prices())
            .unwrap();

        assert_relative_eq!(table.records()[0].after, (0.04 + 0.05) / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_same_day_posts_collapse_to_first() {
        let posts = vec![post("first doge", "2021-02-01"), post("second doge", "2021-02-01")];
        let table = ImpactAligner::new(1).align(&posts, &prices()).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].post_text, "first doge");
    }

    #[test]
    fn test_sorted_by_differ_descending() {
        let posts = vec![
            post("doge", "2021-02-01"),
            post("doge", "2021-02-02"),
            post("doge", "2021-02-03"),
            post("doge", "2021-02-04"),
        ];
        let table = ImpactAligner::new(1).align(&posts, &prices()).unwrap();

        assert_eq!(table.len(), 4);
        for pair in table.records().windows(2) {
            assert!(pair[0].differ >= pair[1].differ);
        }
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let err = ImpactAligner::new(0).align(&[], &prices()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidWindow(0)));
    }

    #[test]
    fn test_empty_inputs_give_empty_table() {
        assert!(ImpactAligner::new(1).align(&[], &prices()).unwrap().is_empty());
        assert!(ImpactAligner::new(1)
            .align(&[post("doge", "2021-02-01")], &[])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_column_means() {
        let nan = f64::NAN;
        let matrix = array![[1.0, nan, nan], [3.0, 4.0, nan]];

        let skip = MissingPolicy::Skip.column_means(&matrix);
        assert_eq!(skip[0], 2.0);
        assert_eq!(skip[1], 4.0);
        assert!(skip[2].is_nan());

        let propagate = MissingPolicy::Propagate.column_means(&matrix);
        assert_eq!(propagate[0], 2.0);
        assert!(propagate[1].is_nan());
    }
}
