//! Page rendering with minijinja.
//!
//! Pages are rendered with includes and `extends` resolved against the
//! templates directory; `.nunjucks` pages become `.html`.

use std::path::Path;

use anyhow::{Result, anyhow};
use minijinja::{AutoEscape, Environment, Value, path_loader};

use crate::pipeline::{Asset, Transform};

pub struct RenderTemplates {
    env: Environment<'static>,
    context: Value,
}

impl RenderTemplates {
    pub fn new(templates_dir: &Path, context: &toml::Table) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(templates_dir.to_path_buf()));
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        Self {
            env,
            context: Value::from_serialize(context),
        }
    }
}

impl Transform for RenderTemplates {
    fn name(&self) -> &str {
        "template"
    }

    fn apply(&self, asset: Asset) -> Result<Option<Asset>> {
        let name = asset.path.to_string_lossy().replace('\\', "/");
        let rendered = self
            .env
            .render_named_str(&name, asset.text()?, &self.context)
            .map_err(|e| anyhow!("{e:#}"))?;

        let mut asset = if asset.extension() == "nunjucks" {
            asset.with_extension("html")
        } else {
            asset
        };
        asset.set_text(rendered);
        Ok(Some(asset))
    }
}
