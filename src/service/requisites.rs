//! Prerequisite graph manager.
//!
//! Guards the acyclicity invariant across all prerequisite-edge mutations
//! and answers derived graph queries from the current persisted state.
//! The manager keeps no graph state of its own: every operation
//! materializes a fresh [`RequisiteGraph`] from the store, so the store
//! stays the single source of truth even when something else writes to it
//! between calls.

use super::error::{Result, ServiceError};
use crate::core::{Course, CourseId};
use crate::graph::RequisiteGraph;
use crate::storage::CourseStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Manages the course prerequisite graph over a [`CourseStore`].
///
/// Mutating operations serialize on an internal lock for the whole
/// read-check-write sequence, so two overlapping edge mutations cannot
/// both validate against a snapshot that the other is about to
/// invalidate. Read-only queries take no lock.
///
/// # Example
///
/// ```no_run
/// use curricula::service::RequisiteManager;
/// use curricula::storage::InMemoryCourseStore;
/// use curricula::CourseId;
/// use std::sync::Arc;
///
/// # async fn example(math201: CourseId, math101: CourseId) -> curricula::service::Result<()> {
/// let store = Arc::new(InMemoryCourseStore::new());
/// let requisites = RequisiteManager::new(store);
///
/// requisites.add_prerequisite(math201, math101).await?;
/// # Ok(())
/// # }
/// ```
pub struct RequisiteManager<S: CourseStore> {
    store: Arc<S>,
    mutation_lock: Arc<Mutex<()>>,
}

impl<S: CourseStore> Clone for RequisiteManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            mutation_lock: Arc::clone(&self.mutation_lock),
        }
    }
}

impl<S: CourseStore> RequisiteManager<S> {
    /// Creates a new manager over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The lock serializing mutating operations. The catalog shares it so
    /// lifecycle mutations and edge mutations serialize against each
    /// other.
    pub(crate) fn mutation_lock(&self) -> &Arc<Mutex<()>> {
        &self.mutation_lock
    }

    /// Materializes the prerequisite graph from the store.
    pub(crate) async fn materialize(&self) -> Result<RequisiteGraph> {
        let courses = self.store.find_all().await?;
        Ok(RequisiteGraph::from_courses(courses.iter()))
    }

    /// Declares `prerequisite_id` a prerequisite of `course_id`.
    ///
    /// Both ids must reference existing courses. A course cannot require
    /// itself, and the new edge is rejected if `course_id` is already
    /// reachable from `prerequisite_id` along prerequisite edges (the
    /// edge would close a cycle). Nothing is written on failure.
    ///
    /// Adding an already-present prerequisite is a no-op success and
    /// returns the unchanged course.
    pub async fn add_prerequisite(
        &self,
        course_id: CourseId,
        prerequisite_id: CourseId,
    ) -> Result<Course> {
        let _guard = self.mutation_lock.lock().await;

        // The graph's node set is exactly the stored course set, so edge
        // validation doubles as the existence check
        let mut graph = self.materialize().await?;
        graph.add_edge(course_id, prerequisite_id)?;

        let mut course = self
            .store
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(course_id))?;

        if !course.add_prerequisite(prerequisite_id) {
            debug!(
                "Prerequisite already present: course={}, prerequisite={}",
                course_id, prerequisite_id
            );
            return Ok(course);
        }

        let saved = self.store.save(course).await?;
        info!(
            "Added prerequisite: course={}, prerequisite={}",
            course_id, prerequisite_id
        );
        Ok(saved)
    }

    /// Removes `prerequisite_id` from `course_id`'s prerequisite set.
    ///
    /// Both ids must reference existing courses. Removing an absent edge
    /// is a no-op success; edge removal can never violate acyclicity, so
    /// no cycle check is needed.
    pub async fn remove_prerequisite(
        &self,
        course_id: CourseId,
        prerequisite_id: CourseId,
    ) -> Result<Course> {
        let _guard = self.mutation_lock.lock().await;

        self.ensure_exists(prerequisite_id).await?;
        let mut course = self
            .store
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(course_id))?;

        if !course.remove_prerequisite(&prerequisite_id) {
            debug!(
                "Prerequisite not present, nothing to remove: course={}, prerequisite={}",
                course_id, prerequisite_id
            );
            return Ok(course);
        }

        let saved = self.store.save(course).await?;
        info!(
            "Removed prerequisite: course={}, prerequisite={}",
            course_id, prerequisite_id
        );
        Ok(saved)
    }

    /// Returns every course with an empty prerequisite set, in store
    /// iteration order.
    pub async fn courses_without_prerequisites(&self) -> Result<Vec<Course>> {
        let courses = self.store.find_all().await?;
        Ok(courses
            .into_iter()
            .filter(|c| c.has_no_prerequisites())
            .collect())
    }

    /// Returns every course that lists `prerequisite_id` as a
    /// prerequisite.
    pub async fn courses_requiring(&self, prerequisite_id: CourseId) -> Result<Vec<Course>> {
        self.ensure_exists(prerequisite_id).await?;
        Ok(self.store.find_requiring(prerequisite_id).await?)
    }

    /// Returns the courses one could reasonably attempt next after
    /// completing `completed_id`: every course other than `completed_id`
    /// itself that is not among `completed_id`'s own prerequisites.
    ///
    /// Note this does not verify that *all* of a candidate's
    /// prerequisites are satisfied by the caller's history; it only
    /// filters out the completed course and what it was built on.
    pub async fn courses_available_after(&self, completed_id: CourseId) -> Result<Vec<Course>> {
        let completed = self
            .store
            .find_by_id(completed_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(completed_id))?;

        let courses = self.store.find_all().await?;
        Ok(courses
            .into_iter()
            .filter(|c| c.id() != completed_id && !completed.has_prerequisite(&c.id()))
            .collect())
    }

    /// Returns true if no course currently requires `course_id`.
    pub async fn can_delete(&self, course_id: CourseId) -> Result<bool> {
        self.ensure_exists(course_id).await?;
        let dependents = self.store.find_requiring(course_id).await?;
        Ok(dependents.is_empty())
    }

    /// Returns the whole catalog in a valid study order: prerequisites
    /// always precede the courses that require them.
    ///
    /// Fails with a circular-dependency error if the persisted edges are
    /// malformed (which no validated mutation can produce).
    pub async fn study_order(&self) -> Result<Vec<Course>> {
        let courses = self.store.find_all().await?;
        let graph = RequisiteGraph::from_courses(courses.iter());
        let order = graph.topological_sort()?;

        let mut by_id: std::collections::HashMap<CourseId, Course> =
            courses.into_iter().map(|c| (c.id(), c)).collect();
        Ok(order.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn ensure_exists(&self, course_id: CourseId) -> Result<()> {
        if self.store.exists_by_id(course_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(course_id))
        }
    }
}
