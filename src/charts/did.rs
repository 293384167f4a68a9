//! Difference-in-differences views of impact tables

use super::palette::Palette;
use crate::error::Result;
use crate::impact::ImpactTable;
use std::fmt;

const BAR_WIDTH: usize = 30;

/// One group (asset or post partition) of a DiD chart
#[derive(Debug, Clone, PartialEq)]
pub struct DidRow {
    pub name: String,
    pub color: String,
    /// Value at the "before" label, `None` for an empty table
    pub before: Option<f64>,
    /// Value at the "after" label, `None` for an empty table
    pub after: Option<f64>,
}

impl DidRow {
    pub fn change(&self) -> Option<f64> {
        Some(self.after? - self.before?)
    }
}

/// Before/after comparison across groups
#[derive(Debug, Clone, PartialEq)]
pub struct DidChart {
    pub title: String,
    pub y_label: String,
    pub rows: Vec<DidRow>,
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for DidChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f, "({})", self.y_label)?;

        let label_width = self.rows.iter().map(|r| r.name.len()).max().unwrap_or(6).max(6);
        let max_change = self
            .rows
            .iter()
            .filter_map(DidRow::change)
            .filter(|c| !c.is_nan())
            .fold(0.0_f64, |a, c| a.max(c.abs()));

        writeln!(
            f,
            "{:<lw$} {:>9} {:>9} {:>9}",
            "",
            "before",
            "after",
            "change",
            lw = label_width
        )?;

        for row in &self.rows {
            let bar = match row.change() {
                Some(change) if max_change > 1e-10 && !change.is_nan() => {
                    let len = (change.abs() / max_change * BAR_WIDTH as f64).round() as usize;
                    let glyph = if change >= 0.0 { "+" } else { "-" };
                    glyph.repeat(len)
                }
                _ => String::new(),
            };

            writeln!(
                f,
                "{:<lw$} {:>9} {:>9} {:>9}  {} [{}]",
                row.name,
                format_value(row.before),
                format_value(row.after),
                format_value(row.change()),
                bar,
                row.color,
                lw = label_width
            )?;
        }

        Ok(())
    }
}

/// Mean standardized price before and after the posts, per group
pub fn did(tables: &[(&str, &ImpactTable)], palette: &Palette, keyword: &str) -> Result<DidChart> {
    let rows = tables
        .iter()
        .map(|(name, table)| -> Result<DidRow> {
            let means = table.scaled_means();
            Ok(DidRow {
                name: name.to_string(),
                color: palette.color(name)?.to_string(),
                before: means.map(|m| m.before),
                after: means.map(|m| m.after),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DidChart {
        title: format!("Prices before and after a {}-referencing post", keyword),
        y_label: "standardized prices".to_string(),
        rows,
    })
}

/// Mean standardized difference after the posts, per group, starting from zero
pub fn did_differences(
    tables: &[(&str, &ImpactTable)],
    palette: &Palette,
    keyword: &str,
) -> Result<DidChart> {
    let rows = tables
        .iter()
        .map(|(name, table)| -> Result<DidRow> {
            let means = table.scaled_means();
            Ok(DidRow {
                name: name.to_string(),
                color: palette.color(name)?.to_string(),
                before: means.map(|_| 0.0),
                after: means.map(|m| m.differ),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DidChart {
        title: format!("Price differences before and after a {}-referencing post", keyword),
        y_label: "standardized differences".to_string(),
        rows,
    })
}
