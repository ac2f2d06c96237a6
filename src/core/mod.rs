//! Core types for the curricula catalog.
//!
//! This module provides the fundamental records the rest of the crate is
//! built on:
//!
//! - [`CourseId`]: opaque course identity
//! - [`Course`]: a stored course record with its prerequisite references
//! - [`CourseDraft`]: caller-supplied input for create/update
//! - [`Modality`]: delivery modality
//!
//! The module hides the record representation: storage backends and
//! services only go through the accessors and mutators on [`Course`].

mod course;
mod course_id;

pub use course::{Course, CourseDraft, Modality};
pub use course_id::CourseId;
