//! Task registration and dependency resolution.
//!
//! Tasks are collected by [`TaskGraphBuilder`] and validated all at once in
//! [`TaskGraphBuilder::build`]: duplicate names, unknown prerequisites and
//! cycles are rejected there, so a [`TaskGraph`] is always a valid DAG.
//!
//! Edges point from a prerequisite to its dependent:
//!
//! ```text
//! icons ──► html ──► build
//! lint  ──► scripts ─┘
//! ```

use std::fmt;
use std::sync::Arc;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};

use super::error::GraphError;

/// Executable body of a task. Completion is signalled by returning.
pub type TaskBody<C> = Arc<dyn Fn(&C) -> anyhow::Result<()> + Send + Sync>;

/// A registered task.
pub struct TaskNode<C> {
    name: String,
    deps: Vec<String>,
    body: TaskBody<C>,
}

impl<C> TaskNode<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prerequisites in registration order.
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub(super) fn body(&self) -> TaskBody<C> {
        Arc::clone(&self.body)
    }
}

impl<C> fmt::Debug for TaskNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects task definitions before validation.
pub struct TaskGraphBuilder<C> {
    tasks: Vec<TaskNode<C>>,
}

impl<C> Default for TaskGraphBuilder<C> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<C> TaskGraphBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task with its prerequisites.
    pub fn task<F>(mut self, name: &str, deps: &[&str], body: F) -> Self
    where
        F: Fn(&C) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.tasks.push(TaskNode {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            body: Arc::new(body),
        });
        self
    }

    /// Register a task that only groups its prerequisites.
    #[cfg(test)]
    pub fn group(self, name: &str, deps: &[&str]) -> Self {
        self.task(name, deps, |_| Ok(()))
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> Result<TaskGraph<C>, GraphError> {
        let mut graph = DiGraph::with_capacity(self.tasks.len(), self.tasks.len() * 2);
        let mut index = FxHashMap::default();

        for task in self.tasks {
            if index.contains_key(&task.name) {
                return Err(GraphError::DuplicateTask(task.name));
            }
            let name = task.name.clone();
            let ix = graph.add_node(task);
            index.insert(name, ix);
        }

        let mut edges = Vec::new();
        for ix in graph.node_indices() {
            let task = &graph[ix];
            for dep in &task.deps {
                let Some(&dep_ix) = index.get(dep) else {
                    return Err(GraphError::UnknownDependency {
                        task: task.name.clone(),
                        dependency: dep.clone(),
                    });
                };
                edges.push((dep_ix, ix));
            }
        }
        for (from, to) in edges {
            graph.update_edge(from, to, ());
        }

        let order = toposort(&graph, None)
            .map_err(|cycle| GraphError::Cycle(graph[cycle.node_id()].name.clone()))?;
        let position = order.iter().enumerate().map(|(i, ix)| (*ix, i)).collect();

        Ok(TaskGraph {
            graph,
            index,
            order,
            position,
        })
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Validated, immutable task graph.
pub struct TaskGraph<C> {
    graph: DiGraph<TaskNode<C>, ()>,
    index: FxHashMap<String, NodeIndex>,
    /// Topological order of every node.
    order: Vec<NodeIndex>,
    position: FxHashMap<NodeIndex, usize>,
}

impl<C> TaskGraph<C> {
    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&TaskNode<C>> {
        self.index.get(name).map(|ix| &self.graph[*ix])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All tasks in topological order.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskNode<C>> {
        self.order.iter().map(|ix| &self.graph[*ix])
    }

    /// Task names sorted alphabetically.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve the targets and all their transitive prerequisites.
    ///
    /// A task reachable through several paths appears once.
    pub fn plan(&self, targets: &[&str]) -> Result<Plan, GraphError> {
        let mut seen = FxHashSet::default();
        let mut stack = Vec::with_capacity(targets.len());

        for target in targets {
            let ix = self
                .index
                .get(*target)
                .ok_or_else(|| GraphError::UnknownTask(target.to_string()))?;
            stack.push(*ix);
        }

        while let Some(ix) = stack.pop() {
            if !seen.insert(ix) {
                continue;
            }
            stack.extend(self.graph.neighbors_directed(ix, Direction::Incoming));
        }

        let nodes = self
            .order
            .iter()
            .copied()
            .filter(|ix| seen.contains(ix))
            .collect();
        Ok(Plan { nodes })
    }

    pub(super) fn node(&self, ix: NodeIndex) -> &TaskNode<C> {
        &self.graph[ix]
    }

    pub(super) fn position(&self, ix: NodeIndex) -> usize {
        self.position[&ix]
    }

    pub(super) fn prerequisites(&self, ix: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(ix, Direction::Incoming)
    }

    pub(super) fn dependents(&self, ix: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(ix, Direction::Outgoing)
    }
}

/// The ordered set of tasks one invocation will execute.
#[derive(Debug, Clone)]
pub struct Plan {
    nodes: Vec<NodeIndex>,
}

impl Plan {
    pub(super) fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Task names in execution-compatible order.
    pub fn names<'g, C>(&self, graph: &'g TaskGraph<C>) -> Vec<&'g str> {
        self.nodes.iter().map(|ix| graph.node(*ix).name()).collect()
    }
}
