//! Materialized view of the course prerequisite graph.
//!
//! Each course is a node; each `(course, prerequisite)` pair is a directed
//! edge from the course to the prerequisite. The graph must stay acyclic,
//! which [`RequisiteGraph::add_edge`] enforces with a reachability check
//! before any mutation.
//!
//! # Design
//!
//! The graph stores a single adjacency direction (course → prerequisites)
//! in attachment order, plus the node insertion order for deterministic
//! iteration. It is rebuilt from the store on every service operation and
//! never cached across calls, so the store stays the single source of
//! truth.

use super::error::{GraphError, GraphResult};
use crate::core::{Course, CourseId};
use std::collections::{HashMap, HashSet, VecDeque};

/// A directed acyclic graph over course prerequisite references
///
/// # Example
///
/// ```
/// use curricula::graph::RequisiteGraph;
/// use curricula::CourseId;
///
/// let math101 = CourseId::new();
/// let math201 = CourseId::new();
///
/// let mut graph = RequisiteGraph::new();
/// graph.add_node(math101).unwrap();
/// graph.add_node(math201).unwrap();
///
/// // math201 requires math101
/// graph.add_edge(math201, math101).unwrap();
///
/// // the reverse edge would close a cycle
/// assert!(graph.add_edge(math101, math201).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequisiteGraph {
    /// Map from course id to its prerequisites, in attachment order
    nodes: HashMap<CourseId, Vec<CourseId>>,
    /// Node insertion order for deterministic iteration
    insertion_order: Vec<CourseId>,
}

impl RequisiteGraph {
    /// Creates a new empty graph
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            insertion_order: Vec::new(),
        }
    }

    /// Builds a graph from persisted course records.
    ///
    /// Edges referencing courses absent from the input are kept as dangling
    /// references (the store is authoritative; a dangling edge means a
    /// concurrent delete, and traversal simply stops there).
    pub fn from_courses<'a>(courses: impl IntoIterator<Item = &'a Course>) -> Self {
        let mut graph = Self::new();
        for course in courses {
            let id = course.id();
            if graph.nodes.insert(id, course.prerequisites().to_vec()).is_none() {
                graph.insertion_order.push(id);
            }
        }
        graph
    }

    /// Returns the number of courses in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no courses
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if the course is present in the graph
    pub fn contains(&self, id: &CourseId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns a course's prerequisites in attachment order
    pub fn prerequisites(&self, id: &CourseId) -> Option<&[CourseId]> {
        self.nodes.get(id).map(|p| p.as_slice())
    }

    /// Returns an iterator over all course ids in insertion order
    pub fn course_ids(&self) -> impl Iterator<Item = &CourseId> {
        self.insertion_order.iter()
    }

    /// Adds a course with no prerequisite edges.
    ///
    /// Returns an error if the course is already present.
    pub fn add_node(&mut self, id: CourseId) -> GraphResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::duplicate_course(id));
        }
        self.insertion_order.push(id);
        self.nodes.insert(id, Vec::new());
        Ok(())
    }

    /// Adds an edge: `course` requires `prerequisite`.
    ///
    /// Returns an error if:
    /// - `course == prerequisite` (self-prerequisite)
    /// - either course is not in the graph
    /// - the edge would close a cycle
    ///
    /// Adding an edge that is already present is a no-op success.
    ///
    /// The cycle check is a reachability test: if `course` can already be
    /// reached from `prerequisite` along prerequisite edges, then the new
    /// edge `course → prerequisite` would complete a loop. Nothing is
    /// mutated on failure.
    pub fn add_edge(&mut self, course: CourseId, prerequisite: CourseId) -> GraphResult<()> {
        if course == prerequisite {
            return Err(GraphError::self_prerequisite(course));
        }
        if !self.nodes.contains_key(&course) {
            return Err(GraphError::course_not_found(course));
        }
        if !self.nodes.contains_key(&prerequisite) {
            return Err(GraphError::course_not_found(prerequisite));
        }

        // Idempotent: the edge cannot introduce a new cycle if it already exists
        if self.nodes[&course].contains(&prerequisite) {
            return Ok(());
        }

        if self.is_reachable(&prerequisite, &course) {
            return Err(GraphError::cycle(format!(
                "{} transitively requires {}, so {} cannot require {}",
                prerequisite, course, course, prerequisite
            )));
        }

        // Checked above: the key exists
        if let Some(edges) = self.nodes.get_mut(&course) {
            edges.push(prerequisite);
        }
        Ok(())
    }

    /// Drops all outgoing prerequisite edges of a course.
    ///
    /// Used when a course's whole prerequisite set is being revalidated:
    /// the edges are cleared first, then re-added one by one through
    /// [`add_edge`](Self::add_edge).
    pub fn clear_edges(&mut self, id: &CourseId) -> GraphResult<()> {
        match self.nodes.get_mut(id) {
            Some(edges) => {
                edges.clear();
                Ok(())
            }
            None => Err(GraphError::course_not_found(*id)),
        }
    }

    /// Returns true if `target` can be reached from `start` by following
    /// prerequisite edges transitively.
    ///
    /// Plain depth-first search with a per-call visited set; each node is
    /// visited at most once, bounding the work to O(V+E) even on
    /// already-malformed data.
    pub fn is_reachable(&self, start: &CourseId, target: &CourseId) -> bool {
        if start == target {
            return true;
        }

        let mut visited: HashSet<CourseId> = HashSet::new();
        let mut stack: Vec<CourseId> = vec![*start];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(prerequisites) = self.nodes.get(&current) {
                for p in prerequisites {
                    if p == target {
                        return true;
                    }
                    if !visited.contains(p) {
                        stack.push(*p);
                    }
                }
            }
        }

        false
    }

    /// Returns courses with no prerequisites, in insertion order
    pub fn roots(&self) -> Vec<CourseId> {
        self.insertion_order
            .iter()
            .filter(|id| self.nodes.get(id).is_some_and(|p| p.is_empty()))
            .copied()
            .collect()
    }

    /// Returns the courses that list `id` as a prerequisite, in insertion
    /// order
    pub fn dependents(&self, id: &CourseId) -> Vec<CourseId> {
        self.insertion_order
            .iter()
            .filter(|c| self.nodes.get(c).is_some_and(|p| p.contains(id)))
            .copied()
            .collect()
    }

    /// Detects whether the graph contains a cycle using DFS
    ///
    /// Uses three-color marking:
    /// - White (not visited): not in any set
    /// - Gray (visiting): in `on_stack`
    /// - Black (visited): in `visited` but not `on_stack`
    pub fn has_cycle(&self) -> bool {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();

        for id in self.nodes.keys() {
            if !visited.contains(id) && self.dfs_has_cycle(id, &mut visited, &mut on_stack) {
                return true;
            }
        }

        false
    }

    fn dfs_has_cycle(
        &self,
        node: &CourseId,
        visited: &mut HashSet<CourseId>,
        on_stack: &mut HashSet<CourseId>,
    ) -> bool {
        visited.insert(*node);
        on_stack.insert(*node);

        if let Some(prerequisites) = self.nodes.get(node) {
            for p in prerequisites {
                if !visited.contains(p) {
                    if self.dfs_has_cycle(p, visited, on_stack) {
                        return true;
                    }
                } else if on_stack.contains(p) {
                    // Back edge found - cycle detected
                    return true;
                }
            }
        }

        on_stack.remove(node);
        false
    }

    /// Returns a valid study order: prerequisites always come before the
    /// courses that require them.
    ///
    /// Uses Kahn's algorithm (BFS-based) seeded in insertion order for
    /// deterministic output. Returns an error if the persisted edges
    /// contain a cycle.
    pub fn topological_sort(&self) -> GraphResult<Vec<CourseId>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        // in-degree of a course = number of its (known) prerequisites;
        // dependents = reverse adjacency, needed to decrement as courses
        // are emitted
        let mut in_degrees: HashMap<CourseId, usize> = HashMap::new();
        let mut dependents: HashMap<CourseId, Vec<CourseId>> = HashMap::new();
        for id in &self.insertion_order {
            let prerequisites = &self.nodes[id];
            let known = prerequisites
                .iter()
                .filter(|p| self.nodes.contains_key(p))
                .count();
            in_degrees.insert(*id, known);
            for p in prerequisites {
                if self.nodes.contains_key(p) {
                    dependents.entry(*p).or_default().push(*id);
                }
            }
        }

        let mut queue: VecDeque<CourseId> = VecDeque::new();
        for id in &self.insertion_order {
            if in_degrees.get(id) == Some(&0) {
                queue.push_back(*id);
            }
        }

        let mut result = Vec::with_capacity(self.nodes.len());
        while let Some(id) = queue.pop_front() {
            result.push(id);

            if let Some(deps) = dependents.get(&id) {
                for d in deps {
                    if let Some(degree) = in_degrees.get_mut(d) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(*d);
                        }
                    }
                }
            }
        }

        if result.len() != self.nodes.len() {
            return Err(GraphError::cycle(
                "prerequisite edges contain a cycle - no valid study order exists",
            ));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_of(n: usize) -> (RequisiteGraph, Vec<CourseId>) {
        let mut graph = RequisiteGraph::new();
        let ids: Vec<CourseId> = (0..n).map(|_| CourseId::new()).collect();
        for id in &ids {
            graph.add_node(*id).unwrap();
        }
        (graph, ids)
    }

    #[test]
    fn test_empty_graph() {
        let graph = RequisiteGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.len(), 0);
        assert!(graph.topological_sort().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_node_error() {
        let (mut graph, ids) = graph_of(1);
        let result = graph.add_node(ids[0]);
        assert!(matches!(result, Err(GraphError::DuplicateCourse { .. })));
    }

    #[test]
    fn test_add_edge() {
        let (mut graph, ids) = graph_of(2);

        // ids[0] requires ids[1]
        graph.add_edge(ids[0], ids[1]).unwrap();

        assert_eq!(graph.prerequisites(&ids[0]).unwrap(), &[ids[1]]);
        assert!(graph.prerequisites(&ids[1]).unwrap().is_empty());
    }

    #[test]
    fn test_self_edge_error() {
        let (mut graph, ids) = graph_of(1);
        let result = graph.add_edge(ids[0], ids[0]);
        assert!(matches!(result, Err(GraphError::SelfPrerequisite { .. })));
    }

    #[test]
    fn test_unknown_node_error() {
        let (mut graph, ids) = graph_of(1);
        let stranger = CourseId::new();

        assert!(graph.contains(&ids[0]));
        assert!(!graph.contains(&stranger));
        assert!(matches!(
            graph.add_edge(ids[0], stranger),
            Err(GraphError::CourseNotFound { .. })
        ));
        assert!(matches!(
            graph.add_edge(stranger, ids[0]),
            Err(GraphError::CourseNotFound { .. })
        ));
    }

    #[test]
    fn test_add_edge_idempotent() {
        let (mut graph, ids) = graph_of(2);

        graph.add_edge(ids[0], ids[1]).unwrap();
        graph.add_edge(ids[0], ids[1]).unwrap();

        assert_eq!(graph.prerequisites(&ids[0]).unwrap(), &[ids[1]]);
    }

    #[test]
    fn test_cycle_rejected() {
        let (mut graph, ids) = graph_of(3);

        // chain: 2 requires 1 requires 0
        graph.add_edge(ids[1], ids[0]).unwrap();
        graph.add_edge(ids[2], ids[1]).unwrap();

        // closing the loop: 0 requires 2
        let result = graph.add_edge(ids[0], ids[2]);
        assert!(matches!(result, Err(GraphError::CycleDetected { .. })));

        // failed attempt must not have mutated anything
        assert!(graph.prerequisites(&ids[0]).unwrap().is_empty());
        assert!(!graph.has_cycle());
    }

    #[test]
    fn test_symmetric_edge_rejected() {
        let (mut graph, ids) = graph_of(2);

        graph.add_edge(ids[0], ids[1]).unwrap();
        let result = graph.add_edge(ids[1], ids[0]);
        assert!(matches!(result, Err(GraphError::CycleDetected { .. })));
    }

    #[test]
    fn test_is_reachable() {
        let (mut graph, ids) = graph_of(4);

        graph.add_edge(ids[1], ids[0]).unwrap();
        graph.add_edge(ids[2], ids[1]).unwrap();

        assert!(graph.is_reachable(&ids[2], &ids[0]));
        assert!(!graph.is_reachable(&ids[0], &ids[2]));
        assert!(!graph.is_reachable(&ids[3], &ids[0]));
        // a node always reaches itself
        assert!(graph.is_reachable(&ids[0], &ids[0]));
    }

    #[test]
    fn test_clear_edges() {
        let (mut graph, ids) = graph_of(3);

        graph.add_edge(ids[2], ids[0]).unwrap();
        graph.add_edge(ids[2], ids[1]).unwrap();
        graph.clear_edges(&ids[2]).unwrap();

        assert!(graph.prerequisites(&ids[2]).unwrap().is_empty());
        assert!(matches!(
            graph.clear_edges(&CourseId::new()),
            Err(GraphError::CourseNotFound { .. })
        ));
    }

    #[test]
    fn test_roots_and_dependents() {
        let (mut graph, ids) = graph_of(3);

        graph.add_edge(ids[1], ids[0]).unwrap();
        graph.add_edge(ids[2], ids[1]).unwrap();

        assert_eq!(graph.roots(), vec![ids[0]]);
        assert_eq!(graph.dependents(&ids[0]), vec![ids[1]]);
        assert!(graph.dependents(&ids[2]).is_empty());
    }

    #[test]
    fn test_topological_sort_linear() {
        let (mut graph, ids) = graph_of(3);

        graph.add_edge(ids[1], ids[0]).unwrap();
        graph.add_edge(ids[2], ids[1]).unwrap();

        let order = graph.topological_sort().unwrap();
        assert_eq!(order, vec![ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_topological_sort_diamond() {
        let (mut graph, ids) = graph_of(4);

        // diamond: 3 requires 1 and 2, both require 0
        graph.add_edge(ids[1], ids[0]).unwrap();
        graph.add_edge(ids[2], ids[0]).unwrap();
        graph.add_edge(ids[3], ids[1]).unwrap();
        graph.add_edge(ids[3], ids[2]).unwrap();

        let order = graph.topological_sort().unwrap();
        assert_eq!(order[0], ids[0]);
        assert_eq!(order[3], ids[3]);

        let middle: HashSet<_> = [order[1], order[2]].into_iter().collect();
        assert!(middle.contains(&ids[1]));
        assert!(middle.contains(&ids[2]));
    }

    #[test]
    fn test_from_courses() {
        use crate::core::CourseDraft;

        let base = Course::new(CourseDraft::new("MATH101", "Calculus I"));
        let next = {
            let mut c = Course::new(CourseDraft::new("MATH201", "Calculus II"));
            c.add_prerequisite(base.id());
            c
        };

        let graph = RequisiteGraph::from_courses([&base, &next]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.prerequisites(&next.id()).unwrap(), &[base.id()]);
        assert_eq!(graph.roots(), vec![base.id()]);

        let ids: Vec<_> = graph.course_ids().copied().collect();
        assert_eq!(ids, vec![base.id(), next.id()]);
    }

    #[test]
    fn test_dangling_edge_does_not_break_traversal() {
        use crate::core::CourseDraft;

        // the prerequisite record is missing from the input set
        let ghost = CourseId::new();
        let mut course = Course::new(CourseDraft::new("CS901", "Orphaned"));
        course.add_prerequisite(ghost);

        let graph = RequisiteGraph::from_courses([&course]);
        assert!(!graph.has_cycle());
        assert!(graph.is_reachable(&course.id(), &ghost));
        assert_eq!(graph.topological_sort().unwrap(), vec![course.id()]);
    }
}
