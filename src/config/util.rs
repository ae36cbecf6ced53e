//! Config file discovery.

use std::path::{Path, PathBuf};

/// Find the config file by searching upward from the current directory.
///
/// ```text
/// /home/user/site/app/styles/  ← cwd
/// /home/user/site/sitekit.toml ← found
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

fn find_upward(start: &Path, config_name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_upward_from_nested_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("app/styles");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("sitekit.toml"), "").unwrap();

        let found = find_upward(&nested, Path::new("sitekit.toml"));
        assert_eq!(found, Some(dir.path().join("sitekit.toml")));
    }

    #[test]
    fn test_find_upward_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sitekit.toml")).unwrap();

        // A directory with the config name must not count as a config file
        let found = find_upward(dir.path(), Path::new("sitekit.toml"));
        assert!(found.is_none_or(|p| !p.starts_with(dir.path())));
    }

    #[test]
    fn test_absolute_missing() {
        assert_eq!(find_config_file(Path::new("/definitely/not/here.toml")), None);
    }
}
