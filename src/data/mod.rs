//! Data module - CSV loading and saving

mod loader;

pub use loader::{parse_timestamp, DataLoader, DEFAULT_URL_TEMPLATE};
