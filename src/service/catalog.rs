//! Course lifecycle service.
//!
//! Thin orchestration over the store and the prerequisite manager:
//! create/update/delete plus read-throughs. Deletion safety and
//! prerequisite validation are delegated to the graph; this service owns
//! field validation and name/code uniqueness.

use super::error::{Result, ServiceError};
use super::requisites::RequisiteManager;
use crate::core::{Course, CourseDraft, CourseId};
use crate::storage::CourseStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Create/update/delete service for catalog courses.
///
/// Shares its mutation lock with the embedded [`RequisiteManager`], so a
/// lifecycle mutation never interleaves with an edge mutation's
/// read-check-write sequence.
///
/// # Example
///
/// ```no_run
/// use curricula::core::CourseDraft;
/// use curricula::service::CourseCatalog;
/// use curricula::storage::InMemoryCourseStore;
/// use std::sync::Arc;
///
/// # async fn example() -> curricula::service::Result<()> {
/// let store = Arc::new(InMemoryCourseStore::new());
/// let catalog = CourseCatalog::new(store);
///
/// let math101 = catalog.create(CourseDraft::new("MATH101", "Calculus I")).await?;
///
/// let math201 = catalog
///     .create(CourseDraft::new("MATH201", "Calculus II").with_prerequisites(vec![math101.id()]))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct CourseCatalog<S: CourseStore> {
    store: Arc<S>,
    requisites: RequisiteManager<S>,
    mutation_lock: Arc<Mutex<()>>,
}

impl<S: CourseStore> CourseCatalog<S> {
    /// Creates a catalog (and its prerequisite manager) over the given
    /// store.
    pub fn new(store: Arc<S>) -> Self {
        let requisites = RequisiteManager::new(Arc::clone(&store));
        let mutation_lock = Arc::clone(requisites.mutation_lock());
        Self {
            store,
            requisites,
            mutation_lock,
        }
    }

    /// Returns the prerequisite manager sharing this catalog's store and
    /// mutation lock.
    pub fn requisites(&self) -> &RequisiteManager<S> {
        &self.requisites
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Creates a new course from a draft.
    ///
    /// Rejects blank or non-alphanumeric codes, blank names, names or
    /// codes already in use (case-insensitively), prerequisites that do
    /// not exist, and prerequisite sets that would violate acyclicity.
    /// Declared prerequisites are validated edge-by-edge, exactly as
    /// repeated [`RequisiteManager::add_prerequisite`] calls would be.
    pub async fn create(&self, draft: CourseDraft) -> Result<Course> {
        let _guard = self.mutation_lock.lock().await;

        validate_draft(&draft)?;
        self.ensure_name_free(&draft.name, None).await?;
        self.ensure_code_free(&draft.code, None).await?;

        let declared = draft.prerequisites.clone();
        let mut course = Course::new(CourseDraft {
            prerequisites: Vec::new(),
            ..draft
        });

        if !declared.is_empty() {
            let mut graph = self.requisites.materialize().await?;
            graph.add_node(course.id())?;
            let validated = validate_edges(&mut graph, course.id(), &declared)?;
            course.set_prerequisites(validated);
        }

        let saved = self.store.save(course).await?;
        info!("Created course: id={}, code={}", saved.id(), saved.code());
        Ok(saved)
    }

    /// Updates an existing course from a draft.
    ///
    /// Renaming to a name (or code) used by another course is rejected.
    /// If the prerequisite set changed, the full set is revalidated
    /// exactly as creation does: the course's existing outgoing edges are
    /// cleared in the working graph, then each declared edge is validated
    /// in order.
    pub async fn update(&self, id: CourseId, draft: CourseDraft) -> Result<Course> {
        let _guard = self.mutation_lock.lock().await;

        let mut course = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(id))?;

        validate_draft(&draft)?;
        self.ensure_name_free(&draft.name, Some(id)).await?;
        self.ensure_code_free(&draft.code, Some(id)).await?;

        if !same_set(course.prerequisites(), &draft.prerequisites) {
            let mut graph = self.requisites.materialize().await?;
            graph.clear_edges(&id)?;
            let validated = validate_edges(&mut graph, id, &draft.prerequisites)?;
            course.set_prerequisites(validated);
        }

        course.apply_metadata(&draft);
        let saved = self.store.save(course).await?;
        info!("Updated course: id={}, code={}", saved.id(), saved.code());
        Ok(saved)
    }

    /// Deletes a course.
    ///
    /// Fails with a conflict while any other course still lists it as a
    /// prerequisite. On success the record and its outgoing edges are
    /// removed; incoming edges cannot exist, by the same check.
    pub async fn delete(&self, id: CourseId) -> Result<()> {
        let _guard = self.mutation_lock.lock().await;

        if !self.store.exists_by_id(id).await? {
            return Err(ServiceError::not_found(id));
        }

        let dependents = self.store.find_requiring(id).await?;
        if !dependents.is_empty() {
            return Err(ServiceError::conflict(id, dependents.len()));
        }

        self.store.delete_by_id(id).await?;
        info!("Deleted course: id={}", id);
        Ok(())
    }

    /// Gets a course by id.
    pub async fn get(&self, id: CourseId) -> Result<Course> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(id))
    }

    /// Lists all courses in store iteration order.
    pub async fn list(&self) -> Result<Vec<Course>> {
        Ok(self.store.find_all().await?)
    }

    /// Gets a course by code, case-insensitively.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Course>> {
        Ok(self.store.find_by_code(code).await?)
    }

    async fn ensure_name_free(&self, name: &str, except: Option<CourseId>) -> Result<()> {
        if let Some(existing) = self.store.find_by_name(name.trim()).await? {
            if except != Some(existing.id()) {
                return Err(ServiceError::duplicate_name(name.trim()));
            }
        }
        Ok(())
    }

    async fn ensure_code_free(&self, code: &str, except: Option<CourseId>) -> Result<()> {
        if let Some(existing) = self.store.find_by_code(code.trim()).await? {
            if except != Some(existing.id()) {
                return Err(ServiceError::duplicate_code(code.trim()));
            }
        }
        Ok(())
    }
}

/// Field-level validation shared by create and update.
fn validate_draft(draft: &CourseDraft) -> Result<()> {
    let code = draft.code.trim();
    if code.is_empty() {
        return Err(ServiceError::invalid_operation("course code must not be blank"));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ServiceError::invalid_operation(format!(
            "course code must be alphanumeric: '{}'",
            code
        )));
    }
    if draft.name.trim().is_empty() {
        return Err(ServiceError::invalid_operation("course name must not be blank"));
    }
    Ok(())
}

/// Validates a declared prerequisite set edge-by-edge against the working
/// graph, returning the deduplicated set in declaration order.
fn validate_edges(
    graph: &mut crate::graph::RequisiteGraph,
    course_id: CourseId,
    declared: &[CourseId],
) -> Result<Vec<CourseId>> {
    let mut validated = Vec::with_capacity(declared.len());
    for prereq in declared {
        graph.add_edge(course_id, *prereq)?;
        if !validated.contains(prereq) {
            validated.push(*prereq);
        }
    }
    Ok(validated)
}

/// Order-insensitive comparison of two prerequisite id sets.
fn same_set(current: &[CourseId], declared: &[CourseId]) -> bool {
    use std::collections::HashSet;
    let a: HashSet<_> = current.iter().collect();
    let b: HashSet<_> = declared.iter().collect();
    a == b
}
