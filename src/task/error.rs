//! Task graph errors.

use std::fmt;
use thiserror::Error;

/// Registration and lookup errors, raised before any task body runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("task `{0}` is registered more than once")]
    DuplicateTask(String),

    #[error("task `{task}` depends on unknown task `{dependency}`")]
    UnknownDependency { task: String, dependency: String },

    #[error("unknown task `{0}`")]
    UnknownTask(String),

    #[error("dependency cycle detected at task `{0}`")]
    Cycle(String),
}

/// A task body that returned an error or panicked.
#[derive(Debug)]
pub struct TaskFailure {
    pub task: String,
    pub error: anyhow::Error,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task `{}` failed: {:#}", self.task, self.error)
    }
}

/// Errors from a single task-graph invocation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// One or more bodies failed. `failures` follows topological order,
    /// `skipped` lists tasks that were never started because of them.
    #[error("{}", summarize(.failures, .skipped))]
    Failed {
        failures: Vec<TaskFailure>,
        skipped: Vec<String>,
    },

    #[error("task runtime error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl RunError {
    /// Names of the failed tasks, empty for non-execution errors.
    pub fn failed_tasks(&self) -> Vec<&str> {
        match self {
            Self::Failed { failures, .. } => failures.iter().map(|f| f.task.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn summarize(failures: &[TaskFailure], skipped: &[String]) -> String {
    let mut out = failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    if !skipped.is_empty() {
        out.push_str(&format!("\nnot started: {}", skipped.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display_lists_tasks_and_skipped() {
        let err = RunError::Failed {
            failures: vec![TaskFailure {
                task: "styles".into(),
                error: anyhow::anyhow!("unexpected token"),
            }],
            skipped: vec!["build".into()],
        };
        let text = err.to_string();
        assert!(text.contains("task `styles` failed: unexpected token"));
        assert!(text.contains("not started: build"));
        assert_eq!(err.failed_tasks(), vec!["styles"]);
    }

    #[test]
    fn test_graph_error_display() {
        let err = GraphError::UnknownDependency {
            task: "scripts".into(),
            dependency: "lnt".into(),
        };
        assert_eq!(
            err.to_string(),
            "task `scripts` depends on unknown task `lnt`"
        );
    }
}
