use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::Duration;

use parking_lot::Mutex;

use super::*;

/// Context shared by test task bodies: an execution log.
#[derive(Default)]
struct Log {
    entries: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl Log {
    fn push(&self, name: &str) {
        self.entries.lock().push(name.to_string());
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

fn record(name: &'static str) -> impl Fn(&Log) -> anyhow::Result<()> + Send + Sync + 'static {
    move |log: &Log| {
        log.push(name);
        Ok(())
    }
}

fn runner(graph: TaskGraph<Log>) -> (Runner<Log>, Arc<Log>) {
    let log = Arc::new(Log::default());
    (Runner::new(Arc::new(graph), Arc::clone(&log)), log)
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_duplicate_task_rejected() {
    let err = TaskGraphBuilder::<Log>::new()
        .task("styles", &[], record("styles"))
        .task("styles", &[], record("styles"))
        .build()
        .err();
    assert_eq!(err, Some(GraphError::DuplicateTask("styles".into())));
}

#[test]
fn test_unknown_dependency_rejected() {
    let err = TaskGraphBuilder::<Log>::new()
        .task("scripts", &["lint"], record("scripts"))
        .build()
        .err();
    assert_eq!(
        err,
        Some(GraphError::UnknownDependency {
            task: "scripts".into(),
            dependency: "lint".into(),
        })
    );
}

#[test]
fn test_cycle_rejected_at_registration() {
    let err = TaskGraphBuilder::<Log>::new()
        .task("a", &["c"], record("a"))
        .task("b", &["a"], record("b"))
        .task("c", &["b"], record("c"))
        .build()
        .err();
    match err {
        Some(GraphError::Cycle(name)) => assert!(["a", "b", "c"].contains(&name.as_str())),
        other => panic!("expected cycle error, got {other:?}"),
    }
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let err = TaskGraphBuilder::<Log>::new()
        .task("loop", &["loop"], record("loop"))
        .build()
        .err();
    assert_eq!(err, Some(GraphError::Cycle("loop".into())));
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_plan_includes_transitive_prerequisites_once() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("icons", &[], record("icons"))
        .task("html", &["icons"], record("html"))
        .task("lint", &[], record("lint"))
        .task("scripts", &["lint"], record("scripts"))
        .task("fonts", &[], record("fonts"))
        .task("build", &["html", "scripts", "icons"], record("build"))
        .build()
        .unwrap();

    let plan = graph.plan(&["build"]).unwrap();
    let names = plan.names(&graph);

    assert_eq!(plan.len(), 5);
    assert!(!names.contains(&"fonts"));
    let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
    assert!(pos("icons") < pos("html"));
    assert!(pos("lint") < pos("scripts"));
    assert_eq!(pos("build"), 4);
}

#[test]
fn test_plan_merges_multiple_targets() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("styles", &[], record("styles"))
        .task("modernizr", &[], record("modernizr"))
        .task("scripts", &[], record("scripts"))
        .build()
        .unwrap();

    let plan = graph.plan(&["styles", "modernizr", "styles"]).unwrap();
    assert_eq!(plan.len(), 2);
}

#[test]
fn test_plan_unknown_target() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("styles", &[], record("styles"))
        .build()
        .unwrap();
    assert_eq!(
        graph.plan(&["stlyes"]).err(),
        Some(GraphError::UnknownTask("stlyes".into()))
    );
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn test_prerequisite_finishes_before_dependent_starts() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("icons", &[], |log: &Log| {
            sleep(Duration::from_millis(50));
            log.push("icons");
            Ok(())
        })
        .task("html", &["icons"], record("html"))
        .task("lint", &[], record("lint"))
        .task("scripts", &["lint"], record("scripts"))
        .task("build", &["html", "scripts"], record("build"))
        .build()
        .unwrap();
    let (runner, _) = runner(graph);

    let report = runner.run(&["build"]).await.unwrap();

    for (dep, task) in [("icons", "html"), ("lint", "scripts"), ("html", "build"), ("scripts", "build")] {
        let dep = report.get(dep).unwrap();
        let task = report.get(task).unwrap();
        assert!(dep.finished <= task.started, "{} must finish before {} starts", dep.name, task.name);
    }
}

#[tokio::test]
async fn test_diamond_runs_shared_prerequisite_once() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("base", &[], record("base"))
        .task("left", &["base"], record("left"))
        .task("right", &["base"], record("right"))
        .task("top", &["left", "right"], record("top"))
        .build()
        .unwrap();
    let (runner, log) = runner(graph);

    let report = runner.run(&["top"]).await.unwrap();

    assert_eq!(report.count("base"), 1);
    assert_eq!(log.entries().iter().filter(|e| *e == "base").count(), 1);
    assert_eq!(log.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_independent_tasks_run_concurrently() {
    let slow = |name: &'static str| {
        move |log: &Log| {
            sleep(Duration::from_millis(150));
            log.push(name);
            Ok(())
        }
    };
    let graph = TaskGraphBuilder::<Log>::new()
        .task("images", &[], slow("images"))
        .task("fonts", &[], slow("fonts"))
        .group("both", &["images", "fonts"])
        .build()
        .unwrap();
    let (runner, _) = runner(graph);

    let report = runner.run(&["both"]).await.unwrap();
    let a = report.get("images").unwrap();
    let b = report.get("fonts").unwrap();

    assert!(a.started < b.finished && b.started < a.finished);
}

#[tokio::test]
async fn test_failure_blocks_dependents() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("styles", &[], |_: &Log| anyhow::bail!("app/styles/main.scss: expected `;`"))
        .task("build", &["styles"], record("build"))
        .build()
        .unwrap();
    let (runner, log) = runner(graph);

    let err = runner.run(&["build"]).await.unwrap_err();

    assert_eq!(err.failed_tasks(), vec!["styles"]);
    match err {
        RunError::Failed { failures, skipped } => {
            assert!(failures[0].error.to_string().contains("main.scss"));
            assert_eq!(skipped, vec!["build".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(log.entries().is_empty());
}

#[tokio::test]
async fn test_in_flight_sibling_completes_after_failure() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("styles", &[], |_: &Log| anyhow::bail!("broken"))
        .task("images", &[], |log: &Log| {
            sleep(Duration::from_millis(100));
            log.push("images");
            Ok(())
        })
        .group("build", &["styles", "images"])
        .build()
        .unwrap();
    let (runner, log) = runner(graph);

    assert!(runner.run(&["build"]).await.is_err());
    assert_eq!(log.entries(), vec!["images".to_string()]);
}

#[tokio::test]
async fn test_panicking_body_is_reported_as_failure() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("vendor", &[], |_: &Log| panic!("manifest missing"))
        .build()
        .unwrap();
    let (runner, _) = runner(graph);

    let err = runner.run(&["vendor"]).await.unwrap_err();
    assert!(err.to_string().contains("manifest missing"));
}

#[tokio::test]
async fn test_unknown_target_does_not_run_anything() {
    let graph = TaskGraphBuilder::<Log>::new()
        .task("styles", &[], record("styles"))
        .build()
        .unwrap();
    let (runner, log) = runner(graph);

    let err = runner.run(&["styles", "nope"]).await.unwrap_err();
    assert!(matches!(err, RunError::Graph(GraphError::UnknownTask(_))));
    assert!(log.entries().is_empty());
}
