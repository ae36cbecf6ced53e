//! One-shot task invocation: `build`, `clean`, leaf task names, `tasks`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::config::SiteConfig;
use crate::log;
use crate::site;
use crate::task::{RunError, Runner, TaskGraph};

/// Run tasks with their prerequisites, reporting every failure.
pub async fn run_tasks(config: Arc<SiteConfig>, targets: &[&str]) -> Result<()> {
    let graph = Arc::new(site::task_graph()?);
    check_known(&graph, targets)?;

    let runner = Runner::new(graph, config);
    let start = Instant::now();
    match runner.run(targets).await {
        Ok(report) => {
            log!(
                "done";
                "{} ({} task{}) in {}",
                targets.join(", "),
                report.len(),
                if report.len() == 1 { "" } else { "s" },
                format_elapsed(start.elapsed())
            );
            Ok(())
        }
        Err(RunError::Failed { failures, skipped }) => {
            for failure in &failures {
                log!("error"; "{}", failure);
            }
            if !skipped.is_empty() {
                log!("error"; "not started: {}", skipped.join(", "));
            }
            bail!("{} task(s) failed", failures.len())
        }
        Err(e) => Err(e.into()),
    }
}

/// Print every task with its prerequisites.
pub fn list_tasks() -> Result<()> {
    let graph = site::task_graph()?;
    let width = graph.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for task in graph.tasks() {
        if task.deps().is_empty() {
            println!("{}", task.name().bold());
        } else {
            println!(
                "{}  {} {}",
                format!("{:width$}", task.name()).bold(),
                "←".dimmed(),
                task.deps().join(", ")
            );
        }
    }
    Ok(())
}

fn check_known<C>(graph: &TaskGraph<C>, targets: &[&str]) -> Result<()> {
    let unknown: Vec<&str> = targets.iter().copied().filter(|t| !graph.contains(t)).collect();
    if unknown.is_empty() {
        return Ok(());
    }
    bail!(
        "unknown task{} `{}`\nknown tasks: {}",
        if unknown.len() == 1 { "" } else { "s" },
        unknown.join("`, `"),
        graph.names().join(", ")
    )
}

pub(super) fn format_elapsed(elapsed: Duration) -> String {
    if elapsed.as_secs() >= 1 {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_task_lists_known_ones() {
        let graph = site::task_graph().unwrap();
        let err = check_known(&graph, &["styles", "stylez"]).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("unknown task `stylez`"));
        assert!(text.contains("known tasks:"));
        assert!(text.contains("minify"));
    }

    #[test]
    fn test_known_tasks_pass() {
        let graph = site::task_graph().unwrap();
        assert!(check_known(&graph, &["build", "clean", "lint"]).is_ok());
    }
}
