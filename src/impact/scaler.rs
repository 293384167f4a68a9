//! Standardization to zero mean and unit variance

use ndarray::Array1;

/// Standard scaler for a single price column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    /// Mean of the reference column
    pub mean: f64,
    /// Population standard deviation of the reference column
    pub std: f64,
}

impl StandardScaler {
    /// Fit the scaler to a reference column.
    ///
    /// Returns `None` for an empty column. A constant column scales by 1.
    pub fn fit(data: &Array1<f64>) -> Option<Self> {
        let mean = data.mean()?;
        let std = data.std(0.0);

        // Avoid division by zero
        let std = if std < 1e-10 { 1.0 } else { std };

        Some(Self { mean, std })
    }

    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    /// Transform data using fitted parameters
    pub fn transform(&self, data: &Array1<f64>) -> Array1<f64> {
        data.mapv(|v| self.transform_value(v))
    }
}
