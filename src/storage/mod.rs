//! Storage layer for the curricula catalog.
//!
//! This module provides a trait-based interface for persisting course
//! records with multiple backend implementations:
//!
//! - [`SqliteCourseStore`]: persistent SQLite-based storage with
//!   connection pooling (feature `"sqlite"`)
//! - [`InMemoryCourseStore`]: fast in-memory storage for testing and
//!   development
//!
//! The store is the single owner of persisted state: the service layer
//! re-reads it on every operation instead of caching graph state.
//!
//! # Example
//!
//! ```no_run
//! use curricula::storage::{CourseStore, InMemoryCourseStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryCourseStore::new();
//! let all = store.find_all().await?;
//! assert!(all.is_empty());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

mod error;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export public types
pub use error::{Result, StorageError};
pub use memory::InMemoryCourseStore;

#[cfg(feature = "sqlite")]
pub use sqlite::{PoolConfig, SqliteCourseStore};

use crate::core::{Course, CourseId};

/// Trait for course record storage backends.
///
/// This trait defines the async interface for persisting and retrieving
/// courses together with their prerequisite edge sets. Implementations
/// must be thread-safe.
///
/// `find_all` and the derived queries return courses in **store iteration
/// order**, which both bundled backends define as insertion order.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Get a course by id.
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>>;

    /// Get all courses, in store iteration order.
    async fn find_all(&self) -> Result<Vec<Course>>;

    /// Insert or update a course, persisting its prerequisite set as
    /// given. Returns the stored record.
    async fn save(&self, course: Course) -> Result<Course>;

    /// Returns true if a course with this id exists.
    async fn exists_by_id(&self, id: CourseId) -> Result<bool>;

    /// Get all courses whose prerequisite set contains `prerequisite_id`,
    /// in store iteration order.
    async fn find_requiring(&self, prerequisite_id: CourseId) -> Result<Vec<Course>>;

    /// Get a course by name, case-insensitively.
    async fn find_by_name(&self, name: &str) -> Result<Option<Course>>;

    /// Get a course by code, case-insensitively.
    async fn find_by_code(&self, code: &str) -> Result<Option<Course>>;

    /// Delete a course row and its outgoing prerequisite edges.
    ///
    /// Returns true if a record was removed. Deletion safety (no other
    /// course may still require this one) is the service layer's job.
    async fn delete_by_id(&self, id: CourseId) -> Result<bool>;

    /// Number of stored courses.
    async fn count(&self) -> Result<u64>;
}

// Implement CourseStore for Box<dyn CourseStore> to allow type-erased storage
#[async_trait]
impl CourseStore for Box<dyn CourseStore> {
    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Course>> {
        (**self).find_all().await
    }

    async fn save(&self, course: Course) -> Result<Course> {
        (**self).save(course).await
    }

    async fn exists_by_id(&self, id: CourseId) -> Result<bool> {
        (**self).exists_by_id(id).await
    }

    async fn find_requiring(&self, prerequisite_id: CourseId) -> Result<Vec<Course>> {
        (**self).find_requiring(prerequisite_id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Course>> {
        (**self).find_by_name(name).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        (**self).find_by_code(code).await
    }

    async fn delete_by_id(&self, id: CourseId) -> Result<bool> {
        (**self).delete_by_id(id).await
    }

    async fn count(&self) -> Result<u64> {
        (**self).count().await
    }
}
