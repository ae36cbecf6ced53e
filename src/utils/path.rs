//! Filesystem path helpers.

use std::path::{Component, Path, PathBuf};

/// Absolute form of a path.
///
/// Tries `canonicalize()` first, then falls back to joining with the
/// current directory for paths that do not exist yet.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Join a URL-derived relative path onto `base`, refusing anything that
/// would climb out of it.
///
/// ```text
/// ("/site/.tmp", "styles/main.css")  → Some("/site/.tmp/styles/main.css")
/// ("/site/.tmp", "../secret")        → None
/// ```
pub fn join_within(base: &Path, rel: &str) -> Option<PathBuf> {
    let mut joined = base.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/that/does/not/exist.txt");
        assert_eq!(normalize_path(path), path);
    }

    #[test]
    fn test_normalize_path_relative_is_absolute() {
        assert!(normalize_path(Path::new("some/relative")).is_absolute());
    }

    #[test]
    fn test_join_within() {
        let base = Path::new("/site/.tmp");
        assert_eq!(
            join_within(base, "styles/main.css"),
            Some(PathBuf::from("/site/.tmp/styles/main.css"))
        );
        assert_eq!(join_within(base, "./index.html"), Some(base.join("index.html")));
        assert_eq!(join_within(base, "../sitekit.toml"), None);
        assert_eq!(join_within(base, "styles/../../x"), None);
    }
}
