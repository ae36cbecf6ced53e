//! Named tasks with prerequisites.
//!
//! - [`graph`]: registration, validation and prerequisite resolution
//! - [`runner`]: concurrent execution honoring the prerequisite order
//! - [`error`]: graph and run errors

mod error;
mod graph;
mod runner;

#[cfg(test)]
mod tests;

pub use error::{GraphError, RunError};
pub use graph::{TaskGraph, TaskGraphBuilder};
pub use runner::Runner;
