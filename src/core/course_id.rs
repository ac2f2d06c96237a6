//! Course identifier type
//!
//! This module defines the CourseId type which uniquely identifies a course
//! in the catalog. The id is opaque: callers never derive meaning from it,
//! and the catalog never reuses one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a course in the catalog
///
/// Wraps a UUID so that course identity is independent of the course code,
/// which administrators occasionally rename.
///
/// # Examples
///
/// ```
/// use curricula::CourseId;
///
/// let id = CourseId::new();
/// let same = CourseId::from_uuid(id.as_uuid());
/// assert_eq!(id, same);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
    /// Creates a new random course id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a course id from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CourseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CourseId({})", self.0)
    }
}

impl From<Uuid> for CourseId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for CourseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
