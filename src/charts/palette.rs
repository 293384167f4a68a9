//! Asset colors

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color (hex string) per asset or group name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(BTreeMap<String, String>);

impl Palette {
    /// Palette without any colors
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_color(mut self, name: impl Into<String>, color: impl Into<String>) -> Self {
        self.0.insert(name.into(), color.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.0.insert(name.into(), color.into());
    }

    /// Color for `name`; unknown names are an error
    pub fn color(&self, name: &str) -> Result<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| AnalysisError::UnknownAsset(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::empty()
            .with_color("BTC", "#EE6055")
            .with_color("SOL", "#119DA4")
            .with_color("DOGE", "#FFC247")
            .with_color("non DOGE", "#808080")
    }
}
