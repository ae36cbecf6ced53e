//! Icon sprite: every SVG becomes a `<symbol>` inside one inline `<svg>`.
//!
//! ```text
//! icons/arrow.svg       → <symbol id="icon-arrow">
//! icons/social/x a.svg  → <symbol id="icon-social--x_a">
//! ```

use std::path::Path;

use anyhow::{Context, Result};

use super::svg;
use crate::pipeline::{Asset, Combine};

const SEPARATOR: &str = "--";

pub struct Sprite {
    output: String,
    prefix: String,
    whitespace: String,
}

impl Sprite {
    pub fn new(output: impl Into<String>, prefix: &str, whitespace: &str) -> Self {
        Self {
            output: output.into(),
            prefix: prefix.to_string(),
            whitespace: whitespace.to_string(),
        }
    }

    /// Symbol id for an icon path relative to the icon directory.
    pub fn symbol_id(&self, rel: &Path) -> String {
        let stem = rel.with_extension("");
        let name = stem
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        let name = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(&self.whitespace);
        format!("{}{}", self.prefix, name)
    }
}

impl Combine for Sprite {
    fn name(&self) -> &str {
        "sprite"
    }

    fn combine(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
        if assets.is_empty() {
            return Ok(Vec::new());
        }

        let mut symbols = assets
            .iter()
            .map(|asset| {
                let id = self.symbol_id(&asset.path);
                let symbol = svg::to_symbol(&asset.contents, &id)
                    .with_context(|| format!("icon {}", asset.path.display()))?;
                Ok((id, symbol))
            })
            .collect::<Result<Vec<_>>>()?;
        symbols.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::from(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">"#,
        );
        for (_, symbol) in symbols {
            out.push_str(&symbol);
        }
        out.push_str("</svg>\n");

        Ok(vec![Asset::new(&self.output, out)])
    }
}
