//! # Tweet Impact
//!
//! Exploratory toolkit for checking whether posts about a cryptocurrency are
//! followed by measurable price moves.
//!
//! ## Modules
//!
//! - `data` - CSV loaders for post and price histories
//! - `nlp` - Post text normalization and hashtag extraction
//! - `impact` - Before/after alignment of posts with prices
//! - `charts` - Terminal charts of prices and impact tables
//! - `models` - Data models
//! - `utils` - Configuration
//!
//! ## Example Usage
//!
//! ```no_run
//! use tweet_impact::{DataLoader, ImpactAligner};
//!
//! let posts = DataLoader::new().load_posts("data/elon_tweets.csv").unwrap();
//! let prices = DataLoader::load_prices("data/DOGE-USD.csv").unwrap();
//!
//! let table = ImpactAligner::new(3).align(&posts, &prices).unwrap();
//! println!("{}", table);
//! ```

pub mod charts;
pub mod data;
pub mod error;
pub mod impact;
pub mod models;
pub mod nlp;
pub mod utils;

pub use charts::Palette;
pub use data::DataLoader;
pub use error::{AnalysisError, Result};
pub use impact::{ImpactAligner, ImpactTable, MissingPolicy};
pub use models::{CleanedPost, ImpactRecord, Post, PriceBar};
pub use nlp::{StopWords, TextNormalizer};
pub use utils::AnalysisConfig;
