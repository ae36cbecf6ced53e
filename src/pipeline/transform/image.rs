//! Lossless image optimisation with an on-disk result cache.
//!
//! - SVG: cleaned (ids kept)
//! - PNG: re-encoded at best compression, kept only when smaller
//! - JPEG/GIF: passed through
//!
//! Results are cached under `<cache>/images/<blake3 of input>` so unchanged
//! images are not re-encoded on every build.

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::ImageFormat;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use super::svg;
use crate::pipeline::{Asset, Transform};
use crate::utils::hash;

/// Bumped when the optimisation output changes.
const CACHE_VERSION: &[u8] = b"images-v1";

pub struct OptimizeImages {
    cache_dir: Option<PathBuf>,
}

impl OptimizeImages {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: Some(cache_dir.into().join("images")),
        }
    }

    pub fn uncached() -> Self {
        Self { cache_dir: None }
    }

    fn cached(&self, key: &str) -> Option<Vec<u8>> {
        fs::read(self.cache_dir.as_ref()?.join(key)).ok()
    }

    fn store(&self, key: &str, data: &[u8]) -> Result<()> {
        let Some(dir) = &self.cache_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create cache dir {}", dir.display()))?;
        fs::write(dir.join(key), data)?;
        Ok(())
    }
}

impl Transform for OptimizeImages {
    fn name(&self) -> &str {
        "imagemin"
    }

    fn apply(&self, mut asset: Asset) -> Result<Option<Asset>> {
        let ext = asset.extension();
        if !matches!(ext.as_str(), "svg" | "png") {
            return Ok(Some(asset));
        }

        let key = hash::digest_parts([CACHE_VERSION, ext.as_bytes(), asset.contents.as_slice()]);
        if let Some(hit) = self.cached(&key) {
            asset.contents = hit;
            return Ok(Some(asset));
        }

        let optimized = match ext.as_str() {
            "svg" => svg::clean(&asset.contents)?,
            _ => optimize_png(&asset.contents)?,
        };
        let smaller = if optimized.len() < asset.contents.len() {
            optimized
        } else {
            std::mem::take(&mut asset.contents)
        };
        self.store(&key, &smaller)?;
        asset.contents = smaller;
        Ok(Some(asset))
    }
}

fn optimize_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)
        .context("cannot decode PNG")?;
    let mut out = Cursor::new(Vec::with_capacity(data.len()));
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder).context("cannot encode PNG")?;
    Ok(out.into_inner())
}
