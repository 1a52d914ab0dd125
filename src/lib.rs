//! Addressable priority queues benchmarked as Dijkstra relaxation queues.
//!
//! This crate provides three heap implementations with efficient
//! `decrease_key` support behind one contract, plus the harness that
//! compares them: a Dijkstra driver with a per-operation timing adapter and
//! a seeded random-workload generator.
//!
//! # Heaps
//!
//! - **Binary Heap**: O(log n) insert, extract_min, and decrease_key;
//!   dense array, index-tracking handles
//! - **Fibonacci Heap**: O(1) amortized insert, decrease_key, and merge;
//!   O(log n) amortized extract_min
//! - **Hollow Heap**: same amortized bounds as Fibonacci with lazy
//!   deletion instead of cascading cuts
//!
//! # Example
//!
//! ```rust
//! use dijkstra_heaps::fibonacci::FibonacciHeap;
//! use dijkstra_heaps::Heap;
//!
//! let mut heap = FibonacciHeap::new();
//! let handle = heap.insert(5, 1);
//! heap.insert(3, 2);
//! heap.decrease_key(&handle, 1).unwrap();
//! assert_eq!(heap.peek_min(), Ok((1, 1)));
//! ```
//!
//! Running the comparison on a graph:
//!
//! ```rust
//! use dijkstra_heaps::dijkstra::{run_dijkstra_with, HeapKind};
//! use dijkstra_heaps::graph::Graph;
//!
//! let graph = Graph::parse("0 1 4\n0 2 1\n2 1 2\n").unwrap();
//! for kind in HeapKind::ALL {
//!     let result = run_dijkstra_with(&graph, 0, kind).unwrap();
//!     assert_eq!(result.distances, vec![0, 3, 1]);
//! }
//! ```

pub mod binary;
pub mod dijkstra;
pub mod fibonacci;
pub mod graph;
pub mod hollow;
pub mod stats;
pub mod traits;
pub mod workload;

// Re-export the main trait for convenience
pub use traits::{Heap, HeapError};
