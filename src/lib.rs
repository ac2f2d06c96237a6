//! Curricula: academic-records core with a cycle-safe prerequisite graph
//!
//! `curricula` is the storage-and-services core of an academic-records
//! platform: a course catalog in which courses may declare other courses
//! as prerequisites, with the guarantee that the prerequisite relation
//! never forms a cycle.
//!
//! # Features
//!
//! - **Validated edge mutation**: adding a prerequisite runs a
//!   reachability check first; an edge that would close a cycle is
//!   rejected before anything is written
//! - **Stateless graph manager**: the graph is re-derived from the store
//!   on every call, so the store stays the single source of truth
//! - **Derived queries**: courses without prerequisites, dependents of a
//!   course, courses available after a completion, study order
//! - **Deletion safety**: a course that others still require cannot be
//!   deleted
//! - **Pluggable storage**: in-memory store for tests, SQLite store with
//!   connection pooling behind the `sqlite` feature
//!
//! # Quick Start
//!
//! ```ignore
//! use curricula::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> curricula::service::Result<()> {
//!     let store = Arc::new(SqliteCourseStore::new("catalog.db").await?);
//!     let catalog = CourseCatalog::new(store);
//!
//!     let math101 = catalog.create(CourseDraft::new("MATH101", "Calculus I")).await?;
//!     let math201 = catalog.create(CourseDraft::new("MATH201", "Calculus II")).await?;
//!
//!     catalog
//!         .requisites()
//!         .add_prerequisite(math201.id(), math101.id())
//!         .await?;
//!
//!     // the reverse edge would close a cycle and is rejected
//!     let err = catalog
//!         .requisites()
//!         .add_prerequisite(math101.id(), math201.id())
//!         .await;
//!     assert!(err.is_err());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! Each module hides one design decision that is likely to change:
//!
//! - [`core`]: course records and identity (hides the record shape)
//! - [`graph`]: the prerequisite DAG (hides the graph representation)
//! - [`storage`]: persistence (hides the database choice and schema)
//! - [`service`]: the prerequisite manager and lifecycle service (hides
//!   validation order and locking)

pub mod core;
pub mod graph;
pub mod service;
pub mod storage;

// Re-export commonly used types for convenience
pub use self::core::{Course, CourseDraft, CourseId, Modality};

pub use graph::{GraphError, GraphResult, RequisiteGraph};

pub use service::{CourseCatalog, RequisiteManager, ServiceError};

pub use storage::{CourseStore, InMemoryCourseStore, StorageError};

#[cfg(feature = "sqlite")]
pub use storage::{PoolConfig, SqliteCourseStore};

// Re-export dependencies used in the public API so downstream crates
// don't hit version mismatches
pub use chrono;
pub use uuid;

/// Prelude module for convenient glob imports
///
/// # Example
///
/// ```ignore
/// use curricula::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{Course, CourseDraft, CourseId, Modality};

    pub use crate::graph::{GraphError, GraphResult, RequisiteGraph};

    pub use crate::service::{CourseCatalog, RequisiteManager, ServiceError};

    pub use crate::storage::{CourseStore, InMemoryCourseStore, StorageError};

    #[cfg(feature = "sqlite")]
    pub use crate::storage::SqliteCourseStore;

    // Re-export commonly used external types
    pub use std::sync::Arc;
}
