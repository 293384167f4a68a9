//! Sparkline of one asset's prices

use super::palette::Palette;
use crate::error::Result;
use crate::models::PriceBar;
use crate::utils::config::ChartSettings;
use chrono::{Datelike, NaiveDate};
use std::fmt;

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render a series as a sparkline, one character per value (NaN renders blank)
pub fn sparkline(data: &[f64]) -> String {
    let min_val = data.iter().filter(|v| !v.is_nan()).fold(f64::INFINITY, |a, &b| a.min(b));
    let max_val = data.iter().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let range = max_val - min_val;

    data.iter()
        .map(|&v| {
            if v.is_nan() {
                return ' ';
            }
            let normalized = if range > 1e-10 {
                (v - min_val) / range
            } else {
                0.5
            };
            let idx = (normalized * (BARS.len() - 1) as f64) as usize;
            BARS[idx.min(BARS.len() - 1)]
        })
        .collect()
}

/// Average consecutive values into at most `width` buckets
fn resample(values: &[f64], width: usize) -> Vec<f64> {
    if width == 0 || values.len() <= width {
        return values.to_vec();
    }

    (0..width)
        .map(|bucket| {
            let start = bucket * values.len() / width;
            let end = ((bucket + 1) * values.len() / width).max(start + 1);
            let slice = &values[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Sparkline of Open prices shifted so the lowest Open sits at zero
#[derive(Debug, Clone, PartialEq)]
pub struct SparklineChart {
    pub title: String,
    pub color: String,
    /// Shifted prices inside the date range, in file order
    pub points: Vec<(NaiveDate, f64)>,
    pub width: usize,
}

impl SparklineChart {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }
}

impl fmt::Display for SparklineChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.title, self.color)?;

        let values = self.values();
        if values.is_empty() {
            return writeln!(f, "  (no data)");
        }

        let max_val = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let min_val = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        writeln!(f, "  {}", sparkline(&resample(&values, self.width)))?;
        writeln!(f, "  min {:.4}  max {:.4}", min_val, max_val)
    }
}

/// Sparkline-style view of one asset's Open prices over the configured date range
pub fn scaled_prices(
    prices: &[PriceBar],
    name: &str,
    palette: &Palette,
    settings: &ChartSettings,
) -> Result<SparklineChart> {
    let color = palette.color(name)?.to_string();
    let baseline = prices.iter().fold(f64::INFINITY, |a, bar| a.min(bar.open));

    let points = prices
        .iter()
        .filter(|bar| bar.date >= settings.from && bar.date <= settings.to)
        .map(|bar| (bar.date, bar.open - baseline))
        .collect();

    Ok(SparklineChart {
        title: format!("{}-USD in {}", name, settings.from.year()),
        color,
        points,
        width: settings.width,
    })
}
