use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tempfile::TempDir;

use super::*;
use crate::pipeline::transform::Concat;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn sources(root: &Path, patterns: &[&str]) -> SourceSet {
    SourceSet::new(root, patterns).unwrap()
}

struct Upper;

impl Transform for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn apply(&self, mut asset: Asset) -> Result<Option<Asset>> {
        let text = asset.text()?.to_uppercase();
        asset.set_text(text);
        Ok(Some(asset))
    }
}

/// Fails on any file whose contents contain "bad".
struct Picky;

impl Transform for Picky {
    fn name(&self) -> &str {
        "picky"
    }

    fn apply(&self, asset: Asset) -> Result<Option<Asset>> {
        if asset.text()?.contains("bad") {
            bail!("refused");
        }
        Ok(Some(asset))
    }
}

struct Broken;

impl Combine for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn combine(&self, _: Vec<Asset>) -> Result<Vec<Asset>> {
        bail!("cannot combine")
    }
}

// ============================================================================
// SourceSet
// ============================================================================

#[test]
fn test_collect_relative_to_pattern_base() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/styles/main.scss", "");
    write(dir.path(), "app/styles/pages/home.scss", "");
    write(dir.path(), "app/scripts/main.js", "");

    let files = sources(dir.path(), &["app/styles/**/*.scss"]).collect();
    let rels: Vec<_> = files.iter().map(|f| f.rel.clone()).collect();
    assert_eq!(rels, vec![PathBuf::from("main.scss"), PathBuf::from("pages/home.scss")]);
}

#[test]
fn test_collect_flat_pattern_stays_shallow() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".tmp/index.html", "");
    write(dir.path(), ".tmp/blog/post.html", "");

    let files = sources(dir.path(), &[".tmp/*.html"]).collect();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].rel, PathBuf::from("index.html"));
}

#[test]
fn test_collect_skips_dotfiles_and_excluded() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/scripts/a.js", "");
    write(dir.path(), "app/scripts/.hidden.js", "");
    write(dir.path(), "app/scripts/vendor/b.js", "");

    let files = sources(dir.path(), &["app/scripts/**/*.js", "!app/scripts/vendor/**"]).collect();
    let rels: Vec<_> = files.iter().map(|f| f.rel.clone()).collect();
    assert_eq!(rels, vec![PathBuf::from("a.js")]);
}

#[test]
fn test_collect_pattern_order_and_dedup() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "lib/z.js", "");
    write(dir.path(), "app/a.js", "");

    let files = sources(dir.path(), &["lib/z.js", "app/*.js", "lib/*.js"]).collect();
    let names: Vec<_> = files.iter().map(|f| f.rel.to_string_lossy().into_owned()).collect();
    assert_eq!(names, vec!["z.js", "a.js"]);
}

#[test]
fn test_collect_missing_base_is_empty() {
    let dir = TempDir::new().unwrap();
    assert!(sources(dir.path(), &["app/fonts/**/*"]).collect().is_empty());
}

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_run_writes_under_dest_and_keeps_unrelated_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/styles/main.css", "body {}");
    write(dir.path(), "app/styles/pages/home.css", "h1 {}");
    write(dir.path(), ".tmp/styles/keep.css", "keep");

    let report = Pipeline::new("styles", sources(dir.path(), &["app/styles/**/*.css"]))
        .each(Upper)
        .dest(dir.path().join(".tmp/styles"))
        .run()
        .unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.written.len(), 2);
    assert_eq!(read(dir.path(), ".tmp/styles/main.css"), "BODY {}");
    assert_eq!(read(dir.path(), ".tmp/styles/pages/home.css"), "H1 {}");
    assert_eq!(read(dir.path(), ".tmp/styles/keep.css"), "keep");
}

#[test]
fn test_file_error_names_path_and_stage_and_siblings_complete() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.txt", "good");
    write(dir.path(), "src/b.txt", "bad");

    let err = Pipeline::new("step", sources(dir.path(), &["src/*.txt"]))
        .each(Picky)
        .each(Upper)
        .dest(dir.path().join("out"))
        .run()
        .unwrap_err();

    let errors = err.file_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path, Path::new("src/b.txt"));
    assert_eq!(errors[0].stage, "picky");
    assert!(err.to_string().contains("src/b.txt [picky]"));

    assert_eq!(read(dir.path(), "out/a.txt"), "GOOD");
    assert!(!dir.path().join("out/b.txt").exists());
}

#[test]
fn test_warn_policy_succeeds() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.txt", "bad");

    let report = Pipeline::new("images", sources(dir.path(), &["src/*.txt"]))
        .each(Picky)
        .dest(dir.path().join("out"))
        .on_error(ErrorPolicy::Warn)
        .run()
        .unwrap();
    assert_eq!(report.warned, 1);
    assert!(report.written.is_empty());
}

#[test]
fn test_combiner_failure_fails_step() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.txt", "a");

    let err = Pipeline::new("icons", sources(dir.path(), &["src/*.txt"]))
        .all(Broken)
        .dest(dir.path().join("out"))
        .run()
        .unwrap_err();
    assert!(matches!(err, PipelineError::Stage { ref stage, .. } if stage == "broken"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_concat_bundle_and_no_dest() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/scripts/b.js", "var b;");
    write(dir.path(), "app/scripts/a.js", "var a;");

    Pipeline::new("scripts", sources(dir.path(), &["app/scripts/**/*.js"]))
        .all(Concat::new("main.js"))
        .dest(dir.path().join(".tmp/scripts"))
        .run()
        .unwrap();
    assert_eq!(read(dir.path(), ".tmp/scripts/main.js"), "var a;\nvar b;");

    let report = Pipeline::new("lint", sources(dir.path(), &["app/scripts/**/*.js"]))
        .each(Upper)
        .run()
        .unwrap();
    assert_eq!(report.matched, 2);
    assert!(report.written.is_empty());
}

#[test]
fn test_rerun_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/a.txt", "a");
    let step = Pipeline::new("step", sources(dir.path(), &["src/*.txt"]))
        .each(Upper)
        .dest(dir.path().join("out"));

    step.run().unwrap();
    let first = fs::metadata(dir.path().join("out/a.txt")).unwrap().modified().unwrap();
    step.run().unwrap();
    let second = fs::metadata(dir.path().join("out/a.txt")).unwrap().modified().unwrap();

    assert_eq!(first, second);
    assert_eq!(read(dir.path(), "out/a.txt"), "A");
}
