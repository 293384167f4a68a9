//! Ranked impact records

use crate::models::ImpactRecord;
use ndarray::Array1;
use std::cmp::Ordering;
use std::fmt;

/// Means of the standardized columns of an impact table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledMeans {
    pub before: f64,
    pub after: f64,
    pub differ: f64,
}

/// Impact records sorted by `differ`, largest first (NaN last)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImpactTable {
    records: Vec<ImpactRecord>,
}

impl ImpactTable {
    pub fn new(mut records: Vec<ImpactRecord>) -> Self {
        records.sort_by(|a, b| descending(a.differ, b.differ));
        Self { records }
    }

    pub fn records(&self) -> &[ImpactRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImpactRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The `n` largest movers
    pub fn top(&self, n: usize) -> &[ImpactRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Column means of the scaled values, `None` for an empty table
    pub fn scaled_means(&self) -> Option<ScaledMeans> {
        let column = |f: fn(&ImpactRecord) -> f64| -> Option<f64> {
            self.records.iter().map(f).collect::<Array1<f64>>().mean()
        };

        Some(ScaledMeans {
            before: column(|r| r.before_scaled)?,
            after: column(|r| r.after_scaled)?,
            differ: column(|r| r.differ_scaled)?,
        })
    }
}

impl<'a> IntoIterator for &'a ImpactTable {
    type Item = &'a ImpactRecord;
    type IntoIter = std::slice::Iter<'a, ImpactRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Display for ImpactTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>10} {:>10} {:>10} {:>10} {:>9} {:>9}  {}",
            "Date", "Before", "After", "Differ", "Differ_sc", "Differ_%", "Post"
        )?;
        writeln!(f, "{:-<90}", "")?;

        for r in &self.records {
            let text: String = r.post_text.chars().take(40).collect();
            writeln!(
                f,
                "{:>10} {:>10.4} {:>10.4} {:>10.4} {:>9.3} {:>8.1}%  {}",
                r.timestamp.format("%Y-%m-%d").to_string(),
                r.before,
                r.after,
                r.differ,
                r.differ_scaled,
                r.differ_percent,
                text.replace('\n', " ")
            )?;
        }

        Ok(())
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
