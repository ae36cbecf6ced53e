//! Pipelines behind each site task.
//!
//! | Step      | Sources                 | Stages                 | Output                 |
//! |-----------|-------------------------|------------------------|------------------------|
//! | styles    | `paths.styles`          | sass → autoprefix      | `<staging>/styles`     |
//! | lint      | `paths.scripts`         | lint                   | none                   |
//! | scripts   | `paths.scripts`         | concat                 | `<staging>/scripts`    |
//! | vendor    | `paths.vendor`          | concat                 | `<staging>/scripts`    |
//! | modernizr | scripts + styles        | feature detection      | `<staging>/scripts`    |
//! | images    | `paths.images`          | imagemin (warn)        | `<dist>/images`        |
//! | icons     | `paths.icons`           | sprite                 | `build.sprite`         |
//! | html      | `paths.html`            | template               | `<staging>`            |
//! | fonts     | `paths.fonts`           | copy                   | `<staging>/webfonts`   |
//! | minify    | `<staging>/**/*`        | minify                 | `<dist>`               |

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::log;
use crate::pipeline::transform::{
    Autoprefix, Concat, Lint, Minify, Modernizr, OptimizeImages, RenderTemplates, Sass, Sprite,
};
use crate::pipeline::{ErrorPolicy, Pipeline, PipelineReport, SourceSet};

fn sources<S: AsRef<str>>(config: &SiteConfig, patterns: &[S]) -> Result<SourceSet> {
    SourceSet::new(config.root(), patterns).context("invalid source pattern")
}

fn run(pipeline: Pipeline) -> Result<PipelineReport> {
    let report = pipeline.run()?;
    if !report.written.is_empty() {
        log!(pipeline.name(); "{} file(s), {}", report.written.len(), format_size(report.bytes));
    }
    Ok(report)
}

fn format_size(bytes: u64) -> String {
    match bytes {
        b if b >= 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        b if b >= 1024 => format!("{:.1} kB", b as f64 / 1024.0),
        b => format!("{b} B"),
    }
}

pub fn styles(config: &SiteConfig) -> Result<()> {
    let styles = &config.styles;
    let sass = Sass::new(
        &styles.compiler,
        &styles.output_style,
        &styles.include_paths,
        config.root(),
    )?;
    let pipeline = Pipeline::new("styles", sources(config, &config.paths.styles)?)
        .each(sass)
        .each(Autoprefix::new(&styles.browsers)?)
        .dest(config.staging_dir().join("styles"));
    run(pipeline).map(drop)
}

pub fn lint(config: &SiteConfig) -> Result<()> {
    let pipeline = Pipeline::new("lint", sources(config, &config.paths.scripts)?)
        .each(Lint::new(config.scripts.lint_strict));
    run(pipeline).map(drop)
}

pub fn scripts(config: &SiteConfig) -> Result<()> {
    let pipeline = Pipeline::new("scripts", sources(config, &config.paths.scripts)?)
        .all(Concat::new(&config.scripts.bundle))
        .dest(config.staging_dir().join("scripts"));
    run(pipeline).map(drop)
}

pub fn vendor(config: &SiteConfig) -> Result<()> {
    let pipeline = Pipeline::new("vendor", sources(config, &config.paths.vendor)?)
        .all(Concat::new(&config.scripts.vendor_bundle))
        .dest(config.staging_dir().join("scripts"));
    run(pipeline).map(drop)
}

pub fn modernizr(config: &SiteConfig) -> Result<()> {
    let patterns: Vec<&String> = config
        .paths
        .scripts
        .iter()
        .chain(&config.paths.styles)
        .collect();
    let modernizr = &config.modernizr;
    let pipeline = Pipeline::new("modernizr", sources(config, &patterns)?)
        .all(Modernizr::new(&modernizr.output, &modernizr.options, &modernizr.tests))
        .dest(config.staging_dir().join("scripts"));
    run(pipeline).map(drop)
}

pub fn images(config: &SiteConfig) -> Result<()> {
    let pipeline = Pipeline::new("images", sources(config, &config.paths.images)?)
        .each(OptimizeImages::new(config.cache_dir()))
        .on_error(ErrorPolicy::Warn)
        .dest(config.dist_dir().join("images"));
    run(pipeline).map(drop)
}

pub fn icons(config: &SiteConfig) -> Result<()> {
    let sprite_path = config.sprite_path();
    let (Some(dir), Some(name)) = (sprite_path.parent(), sprite_path.file_name()) else {
        anyhow::bail!("invalid sprite path {}", sprite_path.display());
    };
    let icons = &config.icons;
    let pipeline = Pipeline::new("icons", sources(config, &config.paths.icons)?)
        .all(Sprite::new(
            name.to_string_lossy(),
            &icons.prefix,
            &icons.whitespace,
        ))
        .dest(dir);
    run(pipeline).map(drop)
}

pub fn html(config: &SiteConfig) -> Result<()> {
    let pipeline = Pipeline::new("html", sources(config, &config.paths.html)?)
        .each(RenderTemplates::new(&config.templates_dir(), &config.html.context))
        .dest(config.staging_dir());
    run(pipeline).map(drop)
}

pub fn fonts(config: &SiteConfig) -> Result<()> {
    let pipeline = Pipeline::new("fonts", sources(config, &config.paths.fonts)?)
        .dest(config.staging_dir().join("webfonts"));
    run(pipeline).map(drop)
}

pub fn minify(config: &SiteConfig) -> Result<()> {
    let staging = config.build.staging.to_string_lossy().replace('\\', "/");
    let pattern = format!("{}/**/*", staging.trim_end_matches('/'));
    let pipeline = Pipeline::new("minify", sources(config, &[pattern])?)
        .each(Minify)
        .dest(config.dist_dir());
    run(pipeline).map(drop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 kB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
