//! Multi-asset line chart of standardized prices

use super::palette::Palette;
use crate::error::Result;
use crate::impact::StandardScaler;
use crate::models::PriceBar;
use crate::utils::config::ChartSettings;
use chrono::{Datelike, NaiveDate};
use ndarray::Array1;
use std::fmt;

const GLYPHS: [char; 6] = ['*', 'o', '+', 'x', '#', '@'];

/// One line of a `LineChart`
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub color: String,
    pub glyph: char,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Date-indexed line chart with fixed axis ranges
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub subtitle: String,
    pub y_label: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub y_min: f64,
    pub y_max: f64,
    pub width: usize,
    pub height: usize,
    pub series: Vec<LineSeries>,
}

impl LineChart {
    /// Grid cell for a point, `None` when it falls outside the axes
    fn cell(&self, date: NaiveDate, value: f64) -> Option<(usize, usize)> {
        if value.is_nan() || date < self.from || date > self.to {
            return None;
        }
        if value < self.y_min || value > self.y_max {
            return None;
        }

        let width = self.width.max(2);
        let height = self.height.max(2);
        let span = (self.to - self.from).num_days().max(1) as f64;
        let offset = (date - self.from).num_days() as f64;

        let col = (offset / span * (width - 1) as f64).round() as usize;
        let row = ((self.y_max - value) / (self.y_max - self.y_min) * (height - 1) as f64).round() as usize;
        Some((row.min(height - 1), col.min(width - 1)))
    }

    /// Plot area as rows of characters, later series drawn over earlier ones
    pub fn grid(&self) -> Vec<String> {
        let width = self.width.max(2);
        let height = self.height.max(2);
        let mut grid = vec![vec![' '; width]; height];

        for series in &self.series {
            for &(date, value) in &series.points {
                if let Some((row, col)) = self.cell(date, value) {
                    grid[row][col] = series.glyph;
                }
            }
        }

        grid.into_iter().map(|row| row.into_iter().collect()).collect()
    }
}

impl fmt::Display for LineChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if !self.subtitle.trim().is_empty() {
            writeln!(f, "{}", self.subtitle)?;
        }
        writeln!(f, "{}", self.y_label)?;

        let rows = self.grid();
        let step = (self.y_max - self.y_min) / (rows.len() - 1) as f64;
        for (i, row) in rows.iter().enumerate() {
            writeln!(f, "{:>6.2} │{}", self.y_max - step * i as f64, row)?;
        }

        let width = self.width.max(2);
        writeln!(f, "{:>6} └{}", "", "─".repeat(width))?;
        let from = self.from.format("%Y-%m-%d").to_string();
        let to = self.to.format("%Y-%m-%d").to_string();
        writeln!(
            f,
            "{:>8}{}{:>pad$}",
            "",
            from,
            to,
            pad = width.saturating_sub(from.len()).max(to.len())
        )?;

        for series in &self.series {
            writeln!(f, "  {} {} [{}]", series.glyph, series.label, series.color)?;
        }

        Ok(())
    }
}

/// "A", "A and B", "A, B and C"
fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// High prices of each asset, standardized against that asset's own High column
pub fn standardized_prices(
    assets: &[(&str, &[PriceBar])],
    palette: &Palette,
    settings: &ChartSettings,
    subtitle: &str,
) -> Result<LineChart> {
    let mut series = Vec::with_capacity(assets.len());

    for (i, (name, prices)) in assets.iter().enumerate() {
        let color = palette.color(name)?.to_string();
        let highs: Array1<f64> = prices.iter().map(|bar| bar.high).collect();

        let points = match StandardScaler::fit(&highs) {
            Some(scaler) => prices
                .iter()
                .map(|bar| (bar.date, scaler.transform_value(bar.high)))
                .collect(),
            None => Vec::new(),
        };

        series.push(LineSeries {
            label: name.to_string(),
            color,
            glyph: GLYPHS[i % GLYPHS.len()],
            points,
        });
    }

    let names: Vec<&str> = assets.iter().map(|(name, _)| *name).collect();

    Ok(LineChart {
        title: format!("{} prices in {}", join_names(&names), settings.from.year()),
        subtitle: subtitle.to_string(),
        y_label: "standardized prices".to_string(),
        from: settings.from,
        to: settings.to,
        y_min: settings.y_min,
        y_max: settings.y_max,
        width: settings.width,
        height: settings.height,
        series,
    })
}
