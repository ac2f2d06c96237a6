//! Error taxonomy for the catalog services.
//!
//! Every variant is a validation failure detected before any store
//! write, except [`ServiceError::Storage`], which surfaces backend I/O
//! failures as-is. Nothing is retried automatically.

use crate::core::CourseId;
use crate::graph::GraphError;
use crate::storage::StorageError;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced by the prerequisite manager and the course catalog
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// A referenced course id does not exist
    #[error("course not found: {course_id}")]
    NotFound {
        /// The missing course id
        course_id: CourseId,
    },

    /// Self-prerequisite or otherwise malformed input
    #[error("invalid operation: {reason}")]
    InvalidOperation {
        /// What was wrong with the request
        reason: String,
    },

    /// The candidate prerequisite edge would close a cycle
    #[error("circular prerequisite: {path}")]
    CircularDependency {
        /// Human-readable description of the offending edge
        path: String,
    },

    /// Deletion blocked because the course is still depended upon
    #[error("course {course_id} is still required by {dependents} course(s)")]
    Conflict {
        /// The course that cannot be deleted
        course_id: CourseId,
        /// How many courses still require it
        dependents: usize,
    },

    /// The course name is already in use (case-insensitively)
    #[error("course name already in use: {name}")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// The course code is already in use (case-insensitively)
    #[error("course code already in use: {code}")]
    DuplicateCode {
        /// The conflicting code
        code: String,
    },

    /// A storage backend operation failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Creates a not found error
    pub fn not_found(course_id: CourseId) -> Self {
        Self::NotFound { course_id }
    }

    /// Creates an invalid operation error
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Creates a deletion conflict error
    pub fn conflict(course_id: CourseId, dependents: usize) -> Self {
        Self::Conflict {
            course_id,
            dependents,
        }
    }

    /// Creates a duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Creates a duplicate code error
    pub fn duplicate_code(code: impl Into<String>) -> Self {
        Self::DuplicateCode { code: code.into() }
    }
}

impl From<GraphError> for ServiceError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::CycleDetected { path } => Self::CircularDependency { path },
            GraphError::CourseNotFound { course_id } => Self::NotFound { course_id },
            GraphError::SelfPrerequisite { course_id } => Self::InvalidOperation {
                reason: format!("course {} cannot be its own prerequisite", course_id),
            },
            other => Self::InvalidOperation {
                reason: other.to_string(),
            },
        }
    }
}
