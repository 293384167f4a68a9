//! Terminal charts for price series and impact tables
//!
//! - `sparkline` - baseline-shifted Open prices of one asset
//! - `line` - standardized High prices of several assets
//! - `did` - difference-in-differences views of impact tables
//!
//! Every chart is a plain value implementing `Display`; nothing is kept between calls.

mod did;
mod line;
mod palette;
mod sparkline;

pub use did::{did, did_differences, DidChart, DidRow};
pub use line::{standardized_prices, LineChart, LineSeries};
pub use palette::Palette;
pub use sparkline::{scaled_prices, sparkline, SparklineChart};
