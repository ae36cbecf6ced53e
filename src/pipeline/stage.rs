//! Stage traits.
//!
//! ```text
//! Transform: Asset → Option<Asset>    (per file, parallel; None drops it)
//! Combine:   Vec<Asset> → Vec<Asset>  (whole set: concat, sprite, bundle)
//! ```

use anyhow::Result;

use super::Asset;

/// Per-file transformation.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, asset: Asset) -> Result<Option<Asset>>;
}

/// Whole-set transformation.
pub trait Combine: Send + Sync {
    fn name(&self) -> &str;

    fn combine(&self, assets: Vec<Asset>) -> Result<Vec<Asset>>;
}

pub enum Stage {
    Each(Box<dyn Transform>),
    All(Box<dyn Combine>),
}

impl Stage {
    pub fn name(&self) -> &str {
        match self {
            Self::Each(t) => t.name(),
            Self::All(c) => c.name(),
        }
    }
}
