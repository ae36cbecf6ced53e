use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::SiteConfig;
use crate::log;

/// Remove staging, dist and the generated sprite. Missing paths are fine;
/// the image cache is kept.
pub fn clean(config: &SiteConfig) -> Result<()> {
    let targets = [config.staging_dir(), config.dist_dir(), config.sprite_path()];
    let mut removed = 0;
    for path in &targets {
        if remove(path)? {
            removed += 1;
            log!("clean"; "removed {}", config.root_relative(path).display());
        }
    }
    if removed == 0 {
        log!("clean"; "nothing to remove");
    }
    Ok(())
}

fn remove(path: &Path) -> Result<bool> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => Err(e),
    };
    result.with_context(|| format!("cannot remove {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_outputs_only() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::default().with_root(dir.path());
        for rel in [".tmp/styles/main.css", "dist/index.html", ".sitekit-cache/images/x", "app/scripts/main.js"] {
            let path = dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        fs::create_dir_all(dir.path().join("app/templates/partials")).unwrap();
        fs::write(config.sprite_path(), "<svg/>").unwrap();

        clean(&config).unwrap();

        assert!(!dir.path().join(".tmp").exists());
        assert!(!dir.path().join("dist").exists());
        assert!(!config.sprite_path().exists());
        assert!(dir.path().join(".sitekit-cache/images/x").exists());
        assert!(dir.path().join("app/scripts/main.js").exists());
    }

    #[test]
    fn test_clean_on_empty_project() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig::default().with_root(dir.path());
        clean(&config).unwrap();
        clean(&config).unwrap();
    }
}
