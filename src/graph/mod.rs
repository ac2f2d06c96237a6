//! Prerequisite graph structures.
//!
//! This module provides the directed-acyclic-graph view of course
//! prerequisites and hides the graph implementation (adjacency layout,
//! traversal strategy) from the service layer.
//!
//! - [`RequisiteGraph`]: the materialized DAG with validated edge
//!   mutation, reachability, and ordering queries
//! - [`GraphError`] / [`GraphResult`]: graph error taxonomy

mod error;
mod requisite_graph;

pub use error::{GraphError, GraphResult};
pub use requisite_graph::RequisiteGraph;
