//! URL to filesystem path resolution over several roots.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::utils::path::join_within;

/// Directories a request may be answered from.
#[derive(Debug, Clone, Default)]
pub struct ServeRoots {
    /// Searched in order, first match wins.
    roots: Vec<PathBuf>,
    /// URL prefix (no trailing slash) to directory. Checked before roots.
    routes: Vec<(String, PathBuf)>,
}

impl ServeRoots {
    pub fn new(roots: Vec<PathBuf>, routes: Vec<(String, PathBuf)>) -> Self {
        let routes = routes
            .into_iter()
            .map(|(prefix, dir)| (prefix.trim_end_matches('/').to_string(), dir))
            .collect();
        Self { roots, routes }
    }

    /// File answering `url`, if any.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let path = normalize_url(url)?;

        for (prefix, dir) in &self.routes {
            if let Some(rest) = strip_route(&path, prefix) {
                return resolve_in(dir, rest);
            }
        }
        self.roots.iter().find_map(|root| resolve_in(root, &path))
    }
}

/// `/bower_components/jquery/x.js` under `/bower_components` → `jquery/x.js`.
fn strip_route<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('/')
    }
}

/// Resolve inside one directory, handling index.html for directories.
fn resolve_in(root: &Path, rel: &str) -> Option<PathBuf> {
    let local = join_within(root, rel.trim_start_matches('/'))?;

    // Canonicalize to resolve symlinks and verify path is under root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }
    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }
    None
}

/// Decode and strip query and fragment. Keeps the leading `/`.
fn normalize_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    if decoded.contains('\0') {
        return None;
    }
    Some(format!("/{}", decoded.trim_start_matches('/')))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn site() -> (TempDir, ServeRoots) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, ".tmp/index.html", "built");
        write(root, ".tmp/styles/main.css", "built css");
        write(root, "app/styles/main.scss", "source");
        write(root, "app/images/logo.svg", "<svg/>");
        write(root, "bower_components/jquery/dist/jquery.js", "jq");
        write(root, "secret.txt", "nope");

        let roots = ServeRoots::new(
            vec![root.join(".tmp"), root.join("app")],
            vec![("/bower_components/".into(), root.join("bower_components"))],
        );
        (dir, roots)
    }

    fn read(path: Option<PathBuf>) -> String {
        fs::read_to_string(path.expect("resolved")).unwrap()
    }

    #[test]
    fn test_first_root_wins_then_fallback() {
        let (_dir, roots) = site();
        assert_eq!(read(roots.resolve("/styles/main.css")), "built css");
        assert_eq!(read(roots.resolve("/styles/main.scss")), "source");
        assert_eq!(read(roots.resolve("/images/logo.svg?v=2")), "<svg/>");
    }

    #[test]
    fn test_directory_serves_index() {
        let (_dir, roots) = site();
        assert_eq!(read(roots.resolve("/")), "built");
        assert!(roots.resolve("/styles/").is_none());
    }

    #[test]
    fn test_route_prefix() {
        let (_dir, roots) = site();
        assert_eq!(read(roots.resolve("/bower_components/jquery/dist/jquery.js")), "jq");
        assert!(roots.resolve("/bower_componentsx/jquery/dist/jquery.js").is_none());
    }

    #[test]
    fn test_traversal_rejected() {
        let (_dir, roots) = site();
        assert!(roots.resolve("/../secret.txt").is_none());
        assert!(roots.resolve("/styles/%2e%2e/%2e%2e/secret.txt").is_none());
        assert!(roots.resolve("/bower_components/../secret.txt").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_root_rejected() {
        let (dir, roots) = site();
        std::os::unix::fs::symlink(dir.path().join("secret.txt"), dir.path().join(".tmp/leak.txt"))
            .unwrap();
        assert!(roots.resolve("/leak.txt").is_none());
    }

    #[test]
    fn test_unknown_is_none() {
        let (_dir, roots) = site();
        assert!(roots.resolve("/missing.html").is_none());
    }
}
