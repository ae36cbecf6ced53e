//! Concurrent execution of a resolved plan.
//!
//! A task starts once every prerequisite in the plan has completed; tasks
//! without an ordering constraint run concurrently on tokio's blocking pool.
//!
//! After the first failure no further task is started. Tasks already in
//! flight are awaited, then every failure is reported together.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

use petgraph::graph::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::task::JoinSet;

use super::error::{RunError, TaskFailure};
use super::graph::TaskGraph;
use crate::debug;

/// Timing of one executed task.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub name: String,
    pub started: Instant,
    pub finished: Instant,
}

/// Tasks executed by a successful run, in completion order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub records: Vec<TaskRecord>,
}

impl RunReport {
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Number of executions of `name` in this run.
    #[cfg(test)]
    pub fn count(&self, name: &str) -> usize {
        self.records.iter().filter(|r| r.name == name).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

type Outcome = (NodeIndex, Instant, Instant, anyhow::Result<()>);

/// Runs task graphs against a shared context.
pub struct Runner<C> {
    graph: Arc<TaskGraph<C>>,
    context: Arc<C>,
}

impl<C> Clone for Runner<C> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            context: Arc::clone(&self.context),
        }
    }
}

impl<C: Send + Sync + 'static> Runner<C> {
    pub fn new(graph: Arc<TaskGraph<C>>, context: Arc<C>) -> Self {
        Self { graph, context }
    }

    /// Run the targets and their transitive prerequisites.
    pub async fn run(&self, targets: &[&str]) -> Result<RunReport, RunError> {
        let plan = self.graph.plan(targets)?;
        let in_plan: FxHashSet<NodeIndex> = plan.nodes().iter().copied().collect();

        let mut waiting: FxHashMap<NodeIndex, usize> = plan
            .nodes()
            .iter()
            .map(|&ix| {
                let count = self
                    .graph
                    .prerequisites(ix)
                    .filter(|p| in_plan.contains(p))
                    .count();
                (ix, count)
            })
            .collect();

        let mut ready: Vec<NodeIndex> = plan
            .nodes()
            .iter()
            .copied()
            .filter(|ix| waiting[ix] == 0)
            .collect();

        let mut started = FxHashSet::default();
        let mut joins: JoinSet<Outcome> = JoinSet::new();
        let mut report = RunReport::default();
        let mut failures = Vec::new();

        loop {
            if failures.is_empty() {
                for ix in ready.drain(..) {
                    started.insert(ix);
                    self.spawn(&mut joins, ix);
                }
            }

            let Some(joined) = joins.join_next().await else {
                break;
            };
            let (ix, began, finished, result) = joined?;
            let name = self.graph.node(ix).name().to_string();

            match result {
                Ok(()) => {
                    debug!("task"; "finished {} in {:?}", name, finished - began);
                    report.records.push(TaskRecord {
                        name,
                        started: began,
                        finished,
                    });
                    for dependent in self.graph.dependents(ix) {
                        let Some(count) = waiting.get_mut(&dependent) else {
                            continue;
                        };
                        *count -= 1;
                        if *count == 0 {
                            ready.push(dependent);
                        }
                    }
                    ready.sort_by_key(|ix| self.graph.position(*ix));
                }
                Err(error) => failures.push((ix, TaskFailure { task: name, error })),
            }
        }

        if failures.is_empty() {
            return Ok(report);
        }

        failures.sort_by_key(|(ix, _)| self.graph.position(*ix));
        let skipped = plan
            .nodes()
            .iter()
            .filter(|ix| !started.contains(*ix))
            .map(|ix| self.graph.node(*ix).name().to_string())
            .collect();

        Err(RunError::Failed {
            failures: failures.into_iter().map(|(_, f)| f).collect(),
            skipped,
        })
    }

    fn spawn(&self, joins: &mut JoinSet<Outcome>, ix: NodeIndex) {
        let body = self.graph.node(ix).body();
        let context = Arc::clone(&self.context);
        debug!("task"; "starting {}", self.graph.node(ix).name());

        joins.spawn_blocking(move || {
            let began = Instant::now();
            let result = catch_unwind(AssertUnwindSafe(|| body(&context)))
                .unwrap_or_else(|panic| Err(anyhow::anyhow!("panicked: {}", panic_message(&panic))));
            (ix, began, Instant::now(), result)
        });
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
