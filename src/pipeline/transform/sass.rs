//! Sass compilation through an external `sass` command.
//!
//! Sources are piped on stdin; the compiled CSS comes back on stdout.
//! Partials (`_name.scss`) are only ever included, never emitted, and plain
//! `.css` files pass through.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::pipeline::{Asset, Transform};
use crate::utils::exec::Cmd;

pub struct Sass {
    command: Vec<String>,
    output_style: String,
    load_paths: Vec<PathBuf>,
    cwd: PathBuf,
}

impl Sass {
    /// Resolve the compiler on `PATH`. Relative load paths are taken from
    /// `cwd`.
    pub fn new(command: &[String], output_style: &str, load_paths: &[PathBuf], cwd: &Path) -> Result<Self> {
        let Some(program) = command.first() else {
            bail!("no sass compiler configured");
        };
        which::which(program)
            .with_context(|| format!("`{program}` not found, install dart-sass or set styles.compiler"))?;

        Ok(Self {
            command: command.to_vec(),
            output_style: output_style.to_string(),
            load_paths: load_paths.iter().map(|p| cwd.join(p)).collect(),
            cwd: cwd.to_path_buf(),
        })
    }
}

impl Transform for Sass {
    fn name(&self) -> &str {
        "sass"
    }

    fn apply(&self, asset: Asset) -> Result<Option<Asset>> {
        if is_partial(&asset.path) {
            return Ok(None);
        }
        match asset.extension().as_str() {
            "css" => return Ok(Some(asset)),
            "scss" | "sass" => {}
            other => bail!("not a stylesheet: .{other}"),
        }

        let mut cmd = Cmd::from_slice(&self.command)
            .arg("--stdin")
            .arg(format!("--style={}", self.output_style))
            .arg("--no-source-map")
            .cwd(&self.cwd);
        if asset.extension() == "sass" {
            cmd = cmd.arg("--indented");
        }
        if let Some(dir) = asset.source_dir() {
            cmd = cmd.arg(format!("--load-path={}", dir.display()));
        }
        for path in &self.load_paths {
            cmd = cmd.arg(format!("--load-path={}", path.display()));
        }

        let output = cmd.stdin(&asset.contents).run()?;
        let mut asset = asset.with_extension("css");
        asset.contents = output.stdout;
        Ok(Some(asset))
    }
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}
