//! Price impact of posts
//!
//! - `aligner` - before/after alignment and differencing
//! - `scaler` - standardization against a reference column
//! - `table` - ranked results

mod aligner;
mod scaler;
mod table;

pub use aligner::{ImpactAligner, KeywordFilter, MissingPolicy};
pub use scaler::StandardScaler;
pub use table::{ImpactTable, ScaledMeans};
