//! Course record and related types
//!
//! A [`Course`] is the unit the catalog stores: identity, code, name,
//! descriptive metadata, and the ordered set of prerequisite references.
//! The prerequisite set is only ever changed through the validated edge
//! operations in the service layer; the record itself enforces just the
//! local invariants (no duplicates, no stale `updated_at`).

use super::CourseId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery modality of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    /// Taught on campus.
    InPerson,
    /// Taught fully remote.
    Online,
    /// Mixed on-campus and remote sessions.
    Hybrid,
}

impl Modality {
    /// Returns the string representation of the modality.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::InPerson => "IN_PERSON",
            Modality::Online => "ONLINE",
            Modality::Hybrid => "HYBRID",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PERSON" => Ok(Modality::InPerson),
            "ONLINE" => Ok(Modality::Online),
            "HYBRID" => Ok(Modality::Hybrid),
            _ => Err(format!("unknown modality: {}", s)),
        }
    }
}

/// Input for creating or updating a course.
///
/// This struct groups the caller-supplied fields, keeping the service API
/// stable as metadata fields are added. `prerequisites` is validated by
/// the catalog before it ever reaches a stored record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDraft {
    /// Short unique alphanumeric token, e.g. "MATH101"
    pub code: String,
    /// Human-readable course name, unique case-insensitively
    pub name: String,
    /// Credit value
    pub credits: u8,
    /// Contact hours per week
    pub weekly_hours: u16,
    /// Delivery modality
    pub modality: Modality,
    /// Whether the course is currently offered
    pub active: bool,
    /// Declared prerequisite course ids
    pub prerequisites: Vec<CourseId>,
}

impl CourseDraft {
    /// Creates a draft with the given code and name and default metadata.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            credits: 0,
            weekly_hours: 0,
            modality: Modality::InPerson,
            active: true,
            prerequisites: Vec::new(),
        }
    }

    /// Sets the declared prerequisites on the draft.
    pub fn with_prerequisites(mut self, prerequisites: Vec<CourseId>) -> Self {
        self.prerequisites = prerequisites;
        self
    }
}

/// A course in the catalog
///
/// Fields are private; mutation goes through the methods below so the
/// record can keep its local invariants (duplicate-free prerequisite set,
/// `updated_at` refreshed on every change). Graph-level invariants
/// (acyclicity, referential integrity) live in the service layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    id: CourseId,
    code: String,
    name: String,
    credits: u8,
    weekly_hours: u16,
    modality: Modality,
    active: bool,
    /// Prerequisite course ids in the order they were attached
    prerequisites: Vec<CourseId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Course {
    /// Creates a new course from a draft, with a fresh id.
    ///
    /// The draft's declared prerequisites are carried over as given; the
    /// catalog validates them before calling this.
    pub fn new(draft: CourseDraft) -> Self {
        let now = Utc::now();
        let mut prerequisites = Vec::with_capacity(draft.prerequisites.len());
        for id in draft.prerequisites {
            if !prerequisites.contains(&id) {
                prerequisites.push(id);
            }
        }
        Self {
            id: CourseId::new(),
            code: draft.code,
            name: draft.name,
            credits: draft.credits,
            weekly_hours: draft.weekly_hours,
            modality: draft.modality,
            active: draft.active,
            prerequisites,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a course from persisted parts.
    ///
    /// Storage backends use this to rebuild records; it performs no
    /// validation beyond deduplicating the prerequisite list.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: CourseId,
        code: String,
        name: String,
        credits: u8,
        weekly_hours: u16,
        modality: Modality,
        active: bool,
        prerequisites: Vec<CourseId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let mut deduped = Vec::with_capacity(prerequisites.len());
        for p in prerequisites {
            if !deduped.contains(&p) {
                deduped.push(p);
            }
        }
        Self {
            id,
            code,
            name,
            credits,
            weekly_hours,
            modality,
            active,
            prerequisites: deduped,
            created_at,
            updated_at,
        }
    }

    /// Returns the course id
    pub fn id(&self) -> CourseId {
        self.id
    }

    /// Returns the course code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the course name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the credit value
    pub fn credits(&self) -> u8 {
        self.credits
    }

    /// Returns the weekly contact hours
    pub fn weekly_hours(&self) -> u16 {
        self.weekly_hours
    }

    /// Returns the delivery modality
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Returns true if the course is currently offered
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the prerequisite ids in attachment order
    pub fn prerequisites(&self) -> &[CourseId] {
        &self.prerequisites
    }

    /// Returns true if the course has no prerequisites
    pub fn has_no_prerequisites(&self) -> bool {
        self.prerequisites.is_empty()
    }

    /// Returns true if `id` is among this course's prerequisites
    pub fn has_prerequisite(&self, id: &CourseId) -> bool {
        self.prerequisites.contains(id)
    }

    /// Returns when the course was created
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the course was last modified
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Attaches a prerequisite, preserving attachment order.
    ///
    /// Returns false (and leaves the record untouched) if the id is
    /// already present.
    pub fn add_prerequisite(&mut self, id: CourseId) -> bool {
        if self.prerequisites.contains(&id) {
            return false;
        }
        self.prerequisites.push(id);
        self.touch();
        true
    }

    /// Detaches a prerequisite.
    ///
    /// Returns false (and leaves the record untouched) if the id was not
    /// present.
    pub fn remove_prerequisite(&mut self, id: &CourseId) -> bool {
        let before = self.prerequisites.len();
        self.prerequisites.retain(|p| p != id);
        if self.prerequisites.len() == before {
            return false;
        }
        self.touch();
        true
    }

    /// Replaces the whole prerequisite set (already validated by the
    /// caller), deduplicating while preserving order.
    pub fn set_prerequisites(&mut self, prerequisites: Vec<CourseId>) {
        self.prerequisites.clear();
        for p in prerequisites {
            if !self.prerequisites.contains(&p) {
                self.prerequisites.push(p);
            }
        }
        self.touch();
    }

    /// Applies the metadata fields of a draft (everything except the
    /// prerequisite set, which goes through validated edge operations).
    pub fn apply_metadata(&mut self, draft: &CourseDraft) {
        self.code = draft.code.clone();
        self.name = draft.name.clone();
        self.credits = draft.credits;
        self.weekly_hours = draft.weekly_hours;
        self.modality = draft.modality;
        self.active = draft.active;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str) -> Course {
        Course::new(CourseDraft::new(code, format!("Course {}", code)))
    }

    #[test]
    fn test_new_course_has_empty_prerequisites() {
        let c = course("MATH101");
        assert!(c.has_no_prerequisites());
        assert_eq!(c.code(), "MATH101");
        assert!(c.is_active());
    }

    #[test]
    fn test_add_prerequisite_is_idempotent() {
        let mut c = course("MATH201");
        let p = CourseId::new();

        assert!(c.add_prerequisite(p));
        assert!(!c.add_prerequisite(p));
        assert_eq!(c.prerequisites(), &[p]);
    }

    #[test]
    fn test_remove_prerequisite() {
        let mut c = course("MATH201");
        let p = CourseId::new();
        c.add_prerequisite(p);

        assert!(c.remove_prerequisite(&p));
        assert!(!c.remove_prerequisite(&p));
        assert!(c.has_no_prerequisites());
    }

    #[test]
    fn test_prerequisites_preserve_attachment_order() {
        let mut c = course("CS301");
        let a = CourseId::new();
        let b = CourseId::new();
        c.add_prerequisite(a);
        c.add_prerequisite(b);

        assert_eq!(c.prerequisites(), &[a, b]);
    }

    #[test]
    fn test_set_prerequisites_dedups() {
        let mut c = course("CS301");
        let a = CourseId::new();
        let b = CourseId::new();
        c.set_prerequisites(vec![a, b, a]);

        assert_eq!(c.prerequisites(), &[a, b]);
    }

    #[test]
    fn test_draft_dedups_on_create() {
        let p = CourseId::new();
        let draft = CourseDraft::new("CS101", "Intro").with_prerequisites(vec![p, p]);
        let c = Course::new(draft);

        assert_eq!(c.prerequisites(), &[p]);
    }

    #[test]
    fn test_apply_metadata_keeps_prerequisites() {
        let mut c = course("CS101");
        let p = CourseId::new();
        c.add_prerequisite(p);

        let mut draft = CourseDraft::new("CS102", "Renamed");
        draft.active = false;
        c.apply_metadata(&draft);

        assert_eq!(c.code(), "CS102");
        assert_eq!(c.name(), "Renamed");
        assert!(!c.is_active());
        assert_eq!(c.prerequisites(), &[p]);
    }

    #[test]
    fn test_modality_roundtrip() {
        for m in [Modality::InPerson, Modality::Online, Modality::Hybrid] {
            let parsed: Modality = m.as_str().parse().unwrap();
            assert_eq!(parsed, m);
        }
        assert!("CORRESPONDENCE".parse::<Modality>().is_err());
    }
}
