//! Incremental dependency graph
//!
//! Kahn's algorithm run online: every vertex tracks its in-degree, vertices
//! whose in-degree is zero sit in a FIFO frontier, and completing a vertex
//! decrements its successors. An edge `u -> v` means `v` may only be emitted
//! after `u` was completed.
//!
//! A vertex can exist before its message was ingested: when `v` names `u` as
//! its dependency and `u` has not been pushed yet, `u` is a placeholder that
//! only carries successors. It is emitted once its own message arrives.

use super::errors::GraphError;
use shared_types::MessageId;
use std::collections::{HashMap, HashSet, VecDeque};

/// Lifecycle of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexState {
    /// Known only as somebody's dependency
    Placeholder,
    /// Ingested, waiting for predecessors
    Waiting,
    /// In the frontier
    Ready,
    /// Handed out by `pop_ready`, waiting for completion
    Emitted,
}

#[derive(Debug)]
struct Vertex {
    state: VertexState,
    in_degree: usize,
    successors: Vec<MessageId>,
}

impl Vertex {
    fn placeholder() -> Self {
        Self {
            state: VertexState::Placeholder,
            in_degree: 0,
            successors: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    vertices: HashMap<MessageId, Vertex>,
    frontier: VecDeque<MessageId>,
    edge_count: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a message without dependency.
    ///
    /// Returns `true` if the vertex joined the frontier, `false` if the message
    /// was already ingested.
    pub fn add_vertex(&mut self, id: MessageId) -> bool {
        let vertex = self.vertices.entry(id).or_insert_with(Vertex::placeholder);
        if vertex.state != VertexState::Placeholder {
            return false;
        }
        vertex.state = VertexState::Ready;
        self.frontier.push_back(id);
        true
    }

    /// Ingest `to` as depending on `from`.
    pub fn add_edge(&mut self, from: MessageId, to: MessageId) -> Result<(), GraphError> {
        if let Some(vertex) = self.vertices.get(&to) {
            if vertex.state != VertexState::Placeholder {
                return Err(GraphError::AlreadyIngested(to));
            }
        }
        if from == to || self.reaches(to, from) {
            return Err(GraphError::CycleDetected { from, to });
        }

        self.vertices
            .entry(from)
            .or_insert_with(Vertex::placeholder)
            .successors
            .push(to);

        let dependent = self.vertices.entry(to).or_insert_with(Vertex::placeholder);
        dependent.state = VertexState::Waiting;
        dependent.in_degree += 1;
        self.edge_count += 1;
        Ok(())
    }

    /// Mark `id` as completed and release successors whose in-degree drops to
    /// zero. Returns the number of vertices that joined the frontier.
    /// Completing an unknown id is a no-op.
    pub fn complete(&mut self, id: MessageId) -> usize {
        let Some(vertex) = self.vertices.remove(&id) else {
            return 0;
        };

        let mut released = 0;
        for successor in vertex.successors {
            self.edge_count = self.edge_count.saturating_sub(1);
            let Some(next) = self.vertices.get_mut(&successor) else {
                continue;
            };
            next.in_degree = next.in_degree.saturating_sub(1);
            if next.in_degree == 0 && next.state == VertexState::Waiting {
                next.state = VertexState::Ready;
                self.frontier.push_back(successor);
                released += 1;
            }
        }
        released
    }

    /// Take the oldest ready vertex.
    pub fn pop_ready(&mut self) -> Option<MessageId> {
        while let Some(id) = self.frontier.pop_front() {
            // completed while queued
            let Some(vertex) = self.vertices.get_mut(&id) else {
                continue;
            };
            if vertex.state == VertexState::Ready {
                vertex.state = VertexState::Emitted;
                return Some(id);
            }
        }
        None
    }

    /// Oldest ready vertex, without taking it.
    pub fn peek_ready(&self) -> Option<MessageId> {
        self.frontier
            .iter()
            .find(|id| self.state(id) == Some(VertexState::Ready))
            .copied()
    }

    /// Number of vertices in the frontier.
    pub fn ready_len(&self) -> usize {
        self.frontier
            .iter()
            .filter(|id| self.state(id) == Some(VertexState::Ready))
            .count()
    }

    /// Vertices other messages are blocked on.
    pub fn awaited(&self) -> Vec<MessageId> {
        self.vertices
            .iter()
            .filter(|(_, vertex)| !vertex.successors.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn state(&self, id: &MessageId) -> Option<VertexState> {
        self.vertices.get(id).map(|vertex| vertex.state)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Depth-first search along successor edges.
    fn reaches(&self, start: MessageId, target: MessageId) -> bool {
        let mut stack = vec![start];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(vertex) = self.vertices.get(&id) {
                stack.extend(vertex.successors.iter().copied());
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::H256;

    fn make_id(val: u8) -> MessageId {
        H256::from_low_u64_be(val as u64)
    }

    fn drain(graph: &mut DependencyGraph) -> Vec<MessageId> {
        std::iter::from_fn(|| graph.pop_ready()).collect()
    }

    #[test]
    fn test_independent_vertices_ready_in_arrival_order() {
        let mut graph = DependencyGraph::new();
        for i in [3, 1, 2] {
            assert!(graph.add_vertex(make_id(i)));
        }

        assert_eq!(drain(&mut graph), vec![make_id(3), make_id(1), make_id(2)]);
    }

    #[test]
    fn test_duplicate_vertex_is_ignored() {
        let mut graph = DependencyGraph::new();
        assert!(graph.add_vertex(make_id(1)));
        assert!(!graph.add_vertex(make_id(1)));
        assert_eq!(drain(&mut graph), vec![make_id(1)]);
    }

    /// A → B → C: each one is released only by completing its predecessor
    #[test]
    fn test_chain_releases_on_completion() {
        let mut graph = DependencyGraph::new();
        let (a, b, c) = (make_id(1), make_id(2), make_id(3));

        graph.add_vertex(a);
        graph.add_edge(a, b).unwrap();
        graph.add_edge(b, c).unwrap();
        assert_eq!(graph.edge_count(), 2);

        assert_eq!(graph.pop_ready(), Some(a));
        // emitted but not completed: B stays blocked
        assert_eq!(graph.pop_ready(), None);

        assert_eq!(graph.complete(a), 1);
        assert_eq!(graph.pop_ready(), Some(b));
        assert_eq!(graph.pop_ready(), None);

        graph.complete(b);
        assert_eq!(graph.pop_ready(), Some(c));
        assert_eq!(graph.edge_count(), 0);
    }

    /// Fan-out:
    ///     A
    ///    / \
    ///   B   C
    #[test]
    fn test_fan_out_released_together() {
        let mut graph = DependencyGraph::new();
        let (a, b, c) = (make_id(1), make_id(2), make_id(3));

        graph.add_vertex(a);
        graph.add_edge(a, b).unwrap();
        graph.add_edge(a, c).unwrap();

        assert_eq!(drain(&mut graph), vec![a]);
        assert_eq!(graph.complete(a), 2);
        assert_eq!(drain(&mut graph), vec![b, c]);
    }

    #[test]
    fn test_dependency_pushed_after_dependent() {
        let mut graph = DependencyGraph::new();
        let (a, b) = (make_id(1), make_id(2));

        graph.add_edge(a, b).unwrap();
        assert_eq!(graph.state(&a), Some(VertexState::Placeholder));
        assert_eq!(graph.state(&b), Some(VertexState::Waiting));
        assert_eq!(graph.pop_ready(), None);

        assert!(graph.add_vertex(a));
        assert_eq!(graph.pop_ready(), Some(a));
        graph.complete(a);
        assert_eq!(graph.pop_ready(), Some(b));
    }

    #[test]
    fn test_placeholder_completed_before_ingestion_releases_dependents() {
        let mut graph = DependencyGraph::new();
        let (a, b) = (make_id(1), make_id(2));

        graph.add_edge(a, b).unwrap();
        assert_eq!(graph.complete(a), 1);
        assert_eq!(graph.pop_ready(), Some(b));
    }

    /// A → B → C → A
    #[test]
    fn test_cycle_detected() {
        let mut graph = DependencyGraph::new();
        let (a, b, c) = (make_id(1), make_id(2), make_id(3));

        graph.add_edge(c, a).unwrap();
        graph.add_edge(b, c).unwrap();
        let result = graph.add_edge(a, b);

        assert!(matches!(result, Err(GraphError::CycleDetected { .. })));
        assert!(matches!(
            graph.add_edge(a, a),
            Err(GraphError::AlreadyIngested(_))
        ));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        let a = make_id(1);
        assert!(matches!(
            graph.add_edge(a, a),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_edge_into_ingested_vertex_rejected() {
        let mut graph = DependencyGraph::new();
        let (a, b) = (make_id(1), make_id(2));
        graph.add_vertex(b);
        assert_eq!(graph.add_edge(a, b), Err(GraphError::AlreadyIngested(b)));
    }

    #[test]
    fn test_completed_while_ready_is_skipped() {
        let mut graph = DependencyGraph::new();
        let (a, b) = (make_id(1), make_id(2));
        graph.add_vertex(a);
        graph.add_vertex(b);

        graph.complete(a);
        assert_eq!(graph.peek_ready(), Some(b));
        assert_eq!(graph.pop_ready(), Some(b));
    }

    #[test]
    fn test_ready_len_ignores_stale_frontier_entries() {
        let mut graph = DependencyGraph::new();
        let (a, b, c) = (make_id(1), make_id(2), make_id(3));
        graph.add_vertex(a);
        graph.add_vertex(b);
        graph.add_edge(a, c).unwrap();
        assert_eq!(graph.ready_len(), 2);

        graph.complete(b);
        assert_eq!(graph.ready_len(), 1);

        graph.pop_ready();
        assert_eq!(graph.ready_len(), 0);
        graph.complete(a);
        assert_eq!(graph.ready_len(), 1);
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut graph = DependencyGraph::new();
        let a = make_id(1);
        graph.add_vertex(a);

        assert_eq!(graph.peek_ready(), Some(a));
        assert_eq!(graph.peek_ready(), Some(a));
        assert_eq!(graph.state(&a), Some(VertexState::Ready));
    }

    #[test]
    fn test_awaited_lists_blocking_vertices() {
        let mut graph = DependencyGraph::new();
        let (a, b) = (make_id(1), make_id(2));
        graph.add_edge(a, b).unwrap();

        assert_eq!(graph.awaited(), vec![a]);
        graph.complete(a);
        assert!(graph.awaited().is_empty());
    }

    #[test]
    fn test_complete_unknown_is_noop() {
        let mut graph = DependencyGraph::new();
        assert_eq!(graph.complete(make_id(9)), 0);
        assert!(graph.is_empty());
    }
}
