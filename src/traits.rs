//! Common contract for the addressable priority queues in this crate.
//!
//! All three heaps store `(key, value)` pairs where the key is an `i64`
//! priority (lower = higher priority) and the value is an opaque `i32`
//! payload. `insert` returns a handle that can later be fed to
//! `decrease_key`; this is the operation Dijkstra's algorithm relies on and
//! the reason a plain `std::collections::BinaryHeap` is not enough.

use crate::stats::StructureStats;
use std::fmt;

/// Priority type. Lower keys sort first.
pub type Key = i64;

/// Opaque payload type. The Dijkstra driver stores vertex ids here; the
/// heaps never interpret it.
pub type Value = i32;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// `peek_min` or `extract_min` was called on an empty heap
    Empty,
    /// The handle does not name a live entry (already extracted, or never valid)
    InvalidHandle,
    /// The new key is greater than the entry's current key
    KeyNotDecreased,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::Empty => write!(f, "heap is empty"),
            HeapError::InvalidHandle => write!(f, "handle does not refer to a live entry"),
            HeapError::KeyNotDecreased => {
                write!(f, "new key is greater than the current key")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A handle to an element in the heap, used for `decrease_key`.
///
/// This is an opaque type that identifies a specific element; the concrete
/// representation varies by heap. Handles are non-owning: dropping a handle
/// never removes the entry, and a handle kept past the `extract_min` that
/// removed its entry is stale. Stale handles are rejected where the
/// representation allows it (binary, hollow) and are a caller error where it
/// does not (Fibonacci).
pub trait Handle: Clone + PartialEq + Eq {}

/// Operations shared by the binary, Fibonacci, and hollow heaps.
///
/// # Complexity
///
/// | Operation      | Binary     | Fibonacci        | Hollow           |
/// |----------------|------------|------------------|------------------|
/// | `insert`       | O(log n)   | O(1)             | O(1)             |
/// | `peek_min`     | O(1)       | O(1)             | O(1)             |
/// | `extract_min`  | O(log n)   | O(log n) amort.  | O(log n) amort.  |
/// | `decrease_key` | O(log n)   | O(1) amortized   | O(1) amortized   |
/// | `merge`        | O(n + m)   | O(1)             | O(1)             |
///
/// Ties between equal keys are broken arbitrarily but deterministically
/// within a single implementation, so two runs of the same operation stream
/// extract identical sequences.
pub trait Heap {
    /// The handle type returned by `insert` and accepted by `decrease_key`
    type Handle: Handle;

    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap holds no entries
    fn is_empty(&self) -> bool;

    /// Number of live entries (inserts minus extracts)
    fn len(&self) -> usize;

    /// Inserts an entry and returns a handle for later `decrease_key` calls
    fn insert(&mut self, key: Key, value: Value) -> Self::Handle;

    /// Returns the minimum entry without removing it.
    ///
    /// # Errors
    /// [`HeapError::Empty`] if the heap holds no entries.
    fn peek_min(&self) -> Result<(Key, Value), HeapError>;

    /// Removes and returns the minimum entry.
    ///
    /// The handle for the returned entry becomes stale; no later
    /// `decrease_key` may target it.
    ///
    /// # Errors
    /// [`HeapError::Empty`] if the heap holds no entries.
    fn extract_min(&mut self) -> Result<(Key, Value), HeapError>;

    /// Lowers the key of the entry named by `handle` to `new_key`.
    ///
    /// `new_key` equal to the current key is accepted and is a no-op
    /// ordering-wise. A rejected call leaves the heap observably unchanged.
    ///
    /// # Errors
    /// [`HeapError::KeyNotDecreased`] if `new_key` is greater than the
    /// current key; [`HeapError::InvalidHandle`] if the handle is stale and
    /// the heap detects it.
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: Key) -> Result<(), HeapError>;

    /// Moves every entry of `other` into `self`, leaving `other` empty.
    ///
    /// Handles issued by `other` remain valid and now name entries of
    /// `self`. Merging across heap variants is a type error.
    fn merge(&mut self, other: &mut Self);

    /// Structural peak counters recorded since construction
    fn structure_stats(&self) -> &StructureStats;
}
