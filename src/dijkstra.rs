//! Dijkstra single-source shortest paths over any [`Heap`] implementation.
//!
//! The driver never talks to a heap directly; it goes through
//! [`QueueAdapter`], which maps vertex ids to heap handles, folds insert and
//! decrease-key into one idempotent [`push_or_decrease`] operation, and
//! wraps every heap call in a monotonic-clock pair so the three heaps can
//! be compared per operation kind.
//!
//! The driver itself is the standard lazy-deletion formulation: an entry
//! popped with a distance worse than the best known one is a leftover from
//! before a decrease and is skipped.
//!
//! [`push_or_decrease`]: QueueAdapter::push_or_decrease

use crate::binary::BinaryHeap;
use crate::fibonacci::FibonacciHeap;
use crate::graph::Graph;
use crate::hollow::HollowHeap;
use crate::stats::StructureStats;
use crate::traits::{Heap, HeapError, Key, Value};
use std::fmt;
use std::time::Instant;

/// Unreachable-distance sentinel. A quarter of the `i64` range so that a
/// relaxation can never overflow even after the driver's arithmetic guard.
pub const INFINITY: Key = i64::MAX / 4;

/// Parent sentinel for the source and unreachable vertices
pub const NO_PARENT: i32 = -1;

/// Per-operation counts and cumulative wall time recorded by the adapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueMetrics {
    pub insert_count: usize,
    pub decrease_count: usize,
    pub extract_count: usize,
    pub insert_time_ns: u64,
    pub decrease_time_ns: u64,
    pub extract_time_ns: u64,
}

/// Error type for the Dijkstra driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DijkstraError {
    /// The graph has no vertices
    GraphEmpty,
    /// The source is not a valid vertex id
    SourceOutOfRange,
    /// The underlying heap rejected an operation; the driver does not
    /// recover from these
    Heap(HeapError),
}

impl fmt::Display for DijkstraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DijkstraError::GraphEmpty => write!(f, "graph is empty"),
            DijkstraError::SourceOutOfRange => write!(f, "source vertex out of range"),
            DijkstraError::Heap(err) => write!(f, "heap operation failed: {err}"),
        }
    }
}

impl std::error::Error for DijkstraError {}

impl From<HeapError> for DijkstraError {
    fn from(err: HeapError) -> Self {
        DijkstraError::Heap(err)
    }
}

/// Which heap backs the relaxation queue. Used where the choice is made at
/// runtime; code that knows the heap statically calls [`run_dijkstra`]
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapKind {
    Binary,
    Fibonacci,
    Hollow,
}

impl HeapKind {
    pub const ALL: [HeapKind; 3] = [HeapKind::Binary, HeapKind::Fibonacci, HeapKind::Hollow];

    pub fn label(self) -> &'static str {
        match self {
            HeapKind::Binary => "binary",
            HeapKind::Fibonacci => "fibonacci",
            HeapKind::Hollow => "hollow",
        }
    }
}

/// Everything a single Dijkstra run produces: the shortest-path tree plus
/// the adapter's timing and the heap's structural peaks.
#[derive(Debug, Clone)]
pub struct DijkstraResult {
    /// `distances[v]` is the shortest distance from the source, or
    /// [`INFINITY`] if `v` is unreachable
    pub distances: Vec<Key>,
    /// `parents[v]` is the predecessor on a shortest path, or
    /// [`NO_PARENT`]
    pub parents: Vec<i32>,
    pub metrics: QueueMetrics,
    pub structure: StructureStats,
}

/// Maps vertex ids to heap handles and times every heap call.
///
/// `push_or_decrease` is idempotent over a vertex: the first call inserts,
/// later calls lower the key through the stored handle. `extract_min`
/// drops the handle, so a vertex can re-enter the queue afterwards.
pub struct QueueAdapter<H: Heap> {
    heap: H,
    handles: Vec<Option<H::Handle>>,
    metrics: QueueMetrics,
}

impl<H: Heap> QueueAdapter<H> {
    pub fn new() -> Self {
        Self {
            heap: H::new(),
            handles: Vec::new(),
            metrics: QueueMetrics::default(),
        }
    }

    /// Discards all state and pre-sizes the handle table for `node_count`
    /// vertices.
    pub fn reset(&mut self, node_count: usize) {
        self.heap = H::new();
        self.handles.clear();
        self.handles.resize(node_count, None);
        self.metrics = QueueMetrics::default();
    }

    /// Inserts `vertex` with `key`, or lowers its key if it is already
    /// queued.
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] for a negative vertex id; any error the
    /// underlying `decrease_key` reports.
    pub fn push_or_decrease(&mut self, vertex: i32, key: Key) -> Result<(), HeapError> {
        if vertex < 0 {
            return Err(HeapError::InvalidHandle);
        }
        let index = vertex as usize;
        if index >= self.handles.len() {
            self.handles.resize(index + 1, None);
        }

        if let Some(handle) = self.handles[index].clone() {
            let start = Instant::now();
            self.heap.decrease_key(&handle, key)?;
            self.metrics.decrease_time_ns += start.elapsed().as_nanos() as u64;
            self.metrics.decrease_count += 1;
        } else {
            let start = Instant::now();
            let handle = self.heap.insert(key, vertex);
            self.metrics.insert_time_ns += start.elapsed().as_nanos() as u64;
            self.metrics.insert_count += 1;
            self.handles[index] = Some(handle);
        }
        Ok(())
    }

    /// Pops the minimum entry and invalidates the vertex's stored handle.
    pub fn extract_min(&mut self) -> Result<(Key, Value), HeapError> {
        let start = Instant::now();
        let result = self.heap.extract_min()?;
        self.metrics.extract_time_ns += start.elapsed().as_nanos() as u64;
        self.metrics.extract_count += 1;

        let vertex = result.1;
        if vertex >= 0 {
            if let Some(slot) = self.handles.get_mut(vertex as usize) {
                *slot = None;
            }
        }
        Ok(result)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn metrics(&self) -> QueueMetrics {
        self.metrics
    }

    pub fn structure_stats(&self) -> &StructureStats {
        self.heap.structure_stats()
    }
}

impl<H: Heap> Default for QueueAdapter<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs Dijkstra from `source`, constructing a fresh adapter over `H`.
///
/// # Errors
/// [`DijkstraError::GraphEmpty`] for a graph without vertices,
/// [`DijkstraError::SourceOutOfRange`] for a bad source id, and
/// [`DijkstraError::Heap`] if the queue fails mid-run.
pub fn run_dijkstra<H: Heap>(graph: &Graph, source: i32) -> Result<DijkstraResult, DijkstraError> {
    let mut queue = QueueAdapter::<H>::new();
    run_dijkstra_on(graph, source, &mut queue)
}

/// Runs Dijkstra reusing an existing adapter (which is reset first).
pub fn run_dijkstra_on<H: Heap>(
    graph: &Graph,
    source: i32,
    queue: &mut QueueAdapter<H>,
) -> Result<DijkstraResult, DijkstraError> {
    if graph.is_empty() {
        return Err(DijkstraError::GraphEmpty);
    }
    let n = graph.node_count();
    if source < 0 || source as usize >= n {
        return Err(DijkstraError::SourceOutOfRange);
    }

    let mut distances = vec![INFINITY; n];
    let mut parents = vec![NO_PARENT; n];

    queue.reset(n);
    distances[source as usize] = 0;
    queue.push_or_decrease(source, 0)?;

    while !queue.is_empty() {
        let (dist_u, u) = queue.extract_min()?;
        if dist_u > distances[u as usize] {
            // Lazy deletion: a better distance was settled after this
            // entry was queued
            continue;
        }

        for edge in graph.neighbors(u) {
            if edge.weight >= INFINITY {
                continue;
            }
            if dist_u > INFINITY - edge.weight {
                // Relaxation would overflow the sentinel; treat as absent
                continue;
            }
            let candidate = dist_u + edge.weight;
            let known = &mut distances[edge.to as usize];
            if candidate < *known {
                *known = candidate;
                parents[edge.to as usize] = u;
                queue.push_or_decrease(edge.to, candidate)?;
            }
        }
    }

    Ok(DijkstraResult {
        distances,
        parents,
        metrics: queue.metrics(),
        structure: *queue.structure_stats(),
    })
}

/// Runs Dijkstra with the heap chosen at runtime.
pub fn run_dijkstra_with(
    graph: &Graph,
    source: i32,
    kind: HeapKind,
) -> Result<DijkstraResult, DijkstraError> {
    match kind {
        HeapKind::Binary => run_dijkstra::<BinaryHeap>(graph, source),
        HeapKind::Fibonacci => run_dijkstra::<FibonacciHeap>(graph, source),
        HeapKind::Hollow => run_dijkstra::<HollowHeap>(graph, source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        // 0 -> 1 (cost 4), 0 -> 2 -> 1 (cost 3), 1 -> 3
        Graph::from_edges(&[(0, 1, 4), (0, 2, 1), (2, 1, 2), (1, 3, 1)]).unwrap()
    }

    #[test]
    fn finds_shorter_indirect_path() {
        let result = run_dijkstra::<BinaryHeap>(&diamond(), 0).unwrap();
        assert_eq!(result.distances, vec![0, 3, 1, 4]);
        assert_eq!(result.parents, vec![NO_PARENT, 2, 0, 1]);
    }

    #[test]
    fn adapter_decreases_instead_of_reinserting() {
        let mut queue = QueueAdapter::<FibonacciHeap>::new();
        let result = run_dijkstra_on(&diamond(), 0, &mut queue).unwrap();
        // Vertex 1 is first seen at distance 4, then improved to 3
        assert!(result.metrics.decrease_count >= 1);
        assert_eq!(result.metrics.extract_count, 4);
        assert_eq!(result.metrics.insert_count, 4);
    }

    #[test]
    fn unreachable_vertices_keep_the_sentinel() {
        let graph = Graph::from_edges(&[(0, 1, 1), (3, 4, 1)]).unwrap();
        let result = run_dijkstra::<HollowHeap>(&graph, 0).unwrap();
        assert_eq!(result.distances[1], 1);
        assert_eq!(result.distances[2], INFINITY);
        assert_eq!(result.distances[3], INFINITY);
        assert_eq!(result.parents[3], NO_PARENT);
    }

    #[test]
    fn source_out_of_range_is_rejected() {
        let graph = diamond();
        assert_eq!(
            run_dijkstra::<BinaryHeap>(&graph, 17).unwrap_err(),
            DijkstraError::SourceOutOfRange
        );
        assert_eq!(
            run_dijkstra::<BinaryHeap>(&graph, -1).unwrap_err(),
            DijkstraError::SourceOutOfRange
        );
    }

    #[test]
    fn empty_graph_is_rejected() {
        let graph = Graph::default();
        assert_eq!(
            run_dijkstra::<BinaryHeap>(&graph, 0).unwrap_err(),
            DijkstraError::GraphEmpty
        );
    }

    #[test]
    fn infinite_weight_edges_are_skipped() {
        let graph = Graph::from_edges(&[(0, 1, INFINITY), (0, 2, 5)]).unwrap();
        let result = run_dijkstra_with(&graph, 0, HeapKind::Binary).unwrap();
        assert_eq!(result.distances[1], INFINITY);
        assert_eq!(result.distances[2], 5);
    }
}
