use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use super::watch_roots::{WatchRoot, collect_roots};
use super::*;

fn binding(name: &str, patterns: &[&str], window: Duration) -> WatchBinding {
    WatchBinding::new(
        name,
        patterns,
        WatchAction::Run(vec![name.to_string()]),
        window,
        DebounceMode::FromFirst,
    )
    .unwrap()
}

fn root(path: &Path, recursive: bool) -> WatchRoot {
    WatchRoot {
        path: path.to_path_buf(),
        recursive,
    }
}

#[test]
fn test_collect_roots_merges_and_nests() {
    let base = PathBuf::from("/project");
    let window = Duration::from_millis(100);
    let bindings = [
        binding("styles", &["app/styles/**/*.scss", "app/styles/*.css"], window),
        binding("scripts", &["app/scripts/**/*.js"], window),
        binding("app", &["app/**/*.html"], window),
        binding("html", &[".tmp/*.html"], window),
    ];

    let roots = collect_roots(&base, &bindings);
    assert_eq!(
        roots,
        vec![
            root(&base.join(".tmp"), false),
            root(&base.join("app"), true),
        ]
    );
}

#[test]
fn test_collect_roots_flat_and_recursive_same_dir() {
    let base = PathBuf::from("/project");
    let window = Duration::from_millis(100);
    let bindings = [
        binding("a", &["app/scripts/*.js"], window),
        binding("b", &["app/scripts/**/*.ts"], window),
    ];
    assert_eq!(
        collect_roots(&base, &bindings),
        vec![root(&base.join("app/scripts"), true)]
    );
}

#[test]
fn test_temp_files_are_ignored() {
    assert!(is_temp_file(Path::new("app/styles/main.scss~")));
    assert!(is_temp_file(Path::new("app/styles/.main.scss.swp")));
    assert!(is_temp_file(Path::new("app/scripts/main.js.bak")));
    assert!(!is_temp_file(Path::new("app/scripts/main.js")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_burst_of_writes_fires_once() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("app/styles")).unwrap();

    let mut watcher = FileWatcher::new(&root);
    watcher.bind(binding("styles", &["app/styles/**/*.scss"], Duration::from_millis(300)));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = watcher.start(tx).unwrap();

    // Give the backend a moment to register its watches.
    tokio::time::sleep(Duration::from_millis(100)).await;
    for i in 0..5 {
        fs::write(root.join(format!("app/styles/part{i}.scss")), "a {}").unwrap();
    }
    fs::write(root.join("app/other.txt"), "ignored").unwrap();

    let trigger = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("binding never fired")
        .unwrap();
    assert_eq!(trigger.binding, "styles");
    assert_eq!(trigger.action, WatchAction::Run(vec!["styles".into()]));
    assert!(trigger.paths.iter().all(|p| p.starts_with("app/styles/")));

    let second = tokio::time::timeout(Duration::from_millis(800), rx.recv()).await;
    assert!(second.is_err(), "burst fired more than once");

    handle.shutdown().await;
    assert!(rx.recv().await.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_root_created_after_start_is_attached() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();

    let mut watcher = FileWatcher::new(&root);
    watcher.bind(binding("fonts", &["app/webfonts/**/*"], Duration::from_millis(100)));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = watcher.start(tx).unwrap();

    fs::create_dir_all(root.join("app/webfonts")).unwrap();
    // Wait past the re-attach interval before writing.
    tokio::time::sleep(REATTACH_INTERVAL * 3).await;
    fs::write(root.join("app/webfonts/body.woff2"), "font").unwrap();

    let trigger = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("binding never fired")
        .unwrap();
    assert_eq!(trigger.binding, "fonts");

    handle.shutdown().await;
}
