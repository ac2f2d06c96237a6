//! Error types for prerequisite graph operations
//!
//! This module hides error representation details and provides
//! a unified error type for all graph operations.

use crate::core::CourseId;
use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur during prerequisite graph operations
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum GraphError {
    /// Adding the edge would close a cycle in the prerequisite graph
    #[error("cycle detected in prerequisite graph: {path}")]
    CycleDetected {
        /// Human-readable description of the offending edge
        path: String,
    },

    /// A course id was not found in the graph
    #[error("course not found in graph: {course_id}")]
    CourseNotFound {
        /// The course id that was not found
        course_id: CourseId,
    },

    /// A course was declared as its own prerequisite
    #[error("course '{course_id}' cannot be its own prerequisite")]
    SelfPrerequisite {
        /// The course with the self-edge
        course_id: CourseId,
    },

    /// A course was added to the graph twice
    #[error("duplicate course in graph: {course_id}")]
    DuplicateCourse {
        /// The duplicate course id
        course_id: CourseId,
    },
}

impl GraphError {
    /// Creates a cycle detected error with the given description
    pub fn cycle(path: impl Into<String>) -> Self {
        Self::CycleDetected { path: path.into() }
    }

    /// Creates a course not found error
    pub fn course_not_found(course_id: CourseId) -> Self {
        Self::CourseNotFound { course_id }
    }

    /// Creates a self-prerequisite error
    pub fn self_prerequisite(course_id: CourseId) -> Self {
        Self::SelfPrerequisite { course_id }
    }

    /// Creates a duplicate course error
    pub fn duplicate_course(course_id: CourseId) -> Self {
        Self::DuplicateCourse { course_id }
    }
}
