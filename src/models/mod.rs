//! Data models for posts, price bars and impact records

mod types;

pub use types::{CleanedPost, ImpactRecord, Post, PriceBar, DATE_FORMAT};
