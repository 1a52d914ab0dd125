//! Fibonacci heap.
//!
//! A collection of heap-ordered trees whose roots form a circular doubly
//! linked ring. The heap keeps a pointer to the minimum root; insert and
//! merge just splice rings, and the real work is deferred to `extract_min`,
//! which consolidates trees by degree until no two roots share one.
//!
//! # Key Invariants
//!
//! 1. Every tree is heap-ordered: `key(parent) <= key(child)`.
//! 2. `degree(x)` equals the length of `x`'s child ring.
//! 3. After consolidation, at most one root per degree.
//! 4. The mark bit tracks child loss: a marked node that loses a second
//!    child is cut itself, which cascades and keeps every tree of degree k
//!    at least Fibonacci-sized, bounding the maximum degree by
//!    log_phi(n).
//!
//! # Time Complexity
//!
//! | Operation      | Complexity         |
//! |----------------|--------------------|
//! | `insert`       | O(1)               |
//! | `peek_min`     | O(1)               |
//! | `extract_min`  | O(log n) amortized |
//! | `decrease_key` | O(1) amortized     |
//! | `merge`        | O(1)               |

use crate::stats::StructureStats;
use crate::traits::{Handle, Heap, HeapError, Key, Value};
use std::mem;
use std::ptr::NonNull;

/// Internal node. Roots live in one circular sibling ring; each node's
/// children live in another. A single-element ring is a self-loop, which
/// keeps splicing and detachment branch-free for the common cases.
struct Node {
    key: Key,
    value: Value,
    parent: Option<NonNull<Node>>,
    /// One arbitrary child; the rest are reachable through its ring
    child: Option<NonNull<Node>>,
    left: NonNull<Node>,
    right: NonNull<Node>,
    degree: usize,
    /// Set when this node has lost a child since it last became a child itself
    marked: bool,
}

/// Handle to an element in a [`FibonacciHeap`].
///
/// A raw node pointer. The handle is tied to the heap instance that issued
/// it; using it after the entry was extracted, with another heap, or after
/// the heap was dropped is undefined behavior — the pointer representation
/// has no way to detect staleness.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FibonacciHandle {
    node: NonNull<Node>,
}

impl Handle for FibonacciHandle {}

/// Fibonacci heap over `(i64, i32)` entries.
///
/// # Example
///
/// ```rust
/// use dijkstra_heaps::fibonacci::FibonacciHeap;
/// use dijkstra_heaps::Heap;
///
/// let mut heap = FibonacciHeap::new();
/// let handle = heap.insert(5, 1);
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek_min(), Ok((1, 1)));
/// ```
pub struct FibonacciHeap {
    min: Option<NonNull<Node>>,
    len: usize,
    /// Current length of the root ring
    roots: usize,
    stats: StructureStats,
}

impl Drop for FibonacciHeap {
    fn drop(&mut self) {
        while self.extract_min().is_ok() {}
    }
}

impl Heap for FibonacciHeap {
    type Handle = FibonacciHandle;

    fn new() -> Self {
        Self {
            min: None,
            len: 0,
            roots: 0,
            stats: StructureStats::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn insert(&mut self, key: Key, value: Value) -> Self::Handle {
        let node = Box::into_raw(Box::new(Node {
            key,
            value,
            parent: None,
            child: None,
            left: NonNull::dangling(), // set by splice below
            right: NonNull::dangling(),
            degree: 0,
            marked: false,
        }));
        let node = unsafe { NonNull::new_unchecked(node) };

        unsafe {
            self.splice_into_root_ring(node);
        }
        self.len += 1;
        self.update_size_metrics();
        FibonacciHandle { node }
    }

    fn peek_min(&self) -> Result<(Key, Value), HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;
        unsafe {
            let node = min.as_ptr();
            Ok(((*node).key, (*node).value))
        }
    }

    fn extract_min(&mut self) -> Result<(Key, Value), HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;

        unsafe {
            let node = min.as_ptr();
            let result = ((*node).key, (*node).value);

            // Promote children to roots. Snapshot the child ring first:
            // splicing rewires `right`, so iterating the live ring would
            // loop forever.
            if let Some(first_child) = (*node).child.take() {
                let mut children = Vec::new();
                let mut current = first_child;
                loop {
                    children.push(current);
                    current = (*current.as_ptr()).right;
                    if current == first_child {
                        break;
                    }
                }
                for child in children {
                    (*child.as_ptr()).parent = None;
                    (*child.as_ptr()).marked = false;
                    (*child.as_ptr()).left = child;
                    (*child.as_ptr()).right = child;
                    self.splice_into_root_ring(child);
                }
            }

            self.remove_from_root_ring(min);
            self.len -= 1;

            if self.min.is_some() {
                self.consolidate();
            }

            drop(Box::from_raw(node));
            self.update_size_metrics();
            Ok(result)
        }
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: Key) -> Result<(), HeapError> {
        unsafe {
            let node = handle.node.as_ptr();

            if new_key > (*node).key {
                return Err(HeapError::KeyNotDecreased);
            }
            (*node).key = new_key;

            match (*node).parent {
                None => {
                    // Already a root; only the min pointer can be stale
                    if let Some(min) = self.min {
                        if (*node).key < (*min.as_ptr()).key {
                            self.min = Some(handle.node);
                        }
                    }
                }
                Some(parent) => {
                    if (*node).key < (*parent.as_ptr()).key {
                        self.cut(handle.node, parent);
                        self.cascading_cut(parent);
                    }
                }
            }
        }
        Ok(())
    }

    fn merge(&mut self, other: &mut Self) {
        let Some(other_min) = other.min.take() else {
            return;
        };
        let other_len = mem::take(&mut other.len);
        let other_roots = mem::take(&mut other.roots);
        other.update_size_metrics();

        match self.min {
            None => {
                self.min = Some(other_min);
                self.len = other_len;
                self.roots = other_roots;
            }
            Some(self_min) => unsafe {
                // Concatenate the two root rings
                let self_left = (*self_min.as_ptr()).left;
                let other_left = (*other_min.as_ptr()).left;
                (*self_left.as_ptr()).right = other_min;
                (*other_min.as_ptr()).left = self_left;
                (*other_left.as_ptr()).right = self_min;
                (*self_min.as_ptr()).left = other_left;

                if (*other_min.as_ptr()).key < (*self_min.as_ptr()).key {
                    self.min = Some(other_min);
                }
                self.len += other_len;
                self.roots += other_roots;
            },
        }
        self.stats.note_roots(self.roots);
        self.update_size_metrics();
    }

    fn structure_stats(&self) -> &StructureStats {
        &self.stats
    }
}

impl Default for FibonacciHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl FibonacciHeap {
    /// Splices a detached self-looped node into the root ring next to
    /// `min`, updating `min` if the newcomer is smaller.
    unsafe fn splice_into_root_ring(&mut self, node: NonNull<Node>) {
        (*node.as_ptr()).parent = None;
        match self.min {
            None => {
                (*node.as_ptr()).left = node;
                (*node.as_ptr()).right = node;
                self.min = Some(node);
            }
            Some(min) => {
                let min_left = (*min.as_ptr()).left;
                (*node.as_ptr()).right = min;
                (*node.as_ptr()).left = min_left;
                (*min_left.as_ptr()).right = node;
                (*min.as_ptr()).left = node;
                if (*node.as_ptr()).key < (*min.as_ptr()).key {
                    self.min = Some(node);
                }
            }
        }
        self.roots += 1;
        self.stats.note_roots(self.roots);
    }

    /// Detaches a root from the ring, leaving it self-looped. `min` moves
    /// to the right neighbour when it pointed at the detached node.
    unsafe fn remove_from_root_ring(&mut self, node: NonNull<Node>) {
        let right = (*node.as_ptr()).right;
        if right == node {
            self.min = None;
        } else {
            let left = (*node.as_ptr()).left;
            (*left.as_ptr()).right = right;
            (*right.as_ptr()).left = left;
            if self.min == Some(node) {
                self.min = Some(right);
            }
        }
        (*node.as_ptr()).left = node;
        (*node.as_ptr()).right = node;
        self.roots -= 1;
    }

    /// Links trees of equal degree until at most one root per degree
    /// remains, then rebuilds the root ring from the degree table.
    ///
    /// The degree table is sized by the bit length of `len` plus slack; the
    /// Fibonacci property bounds the maximum degree by O(log n).
    unsafe fn consolidate(&mut self) {
        let Some(start) = self.min else {
            return;
        };
        self.stats.consolidation_passes += 1;

        let mut roots = Vec::with_capacity(self.roots);
        let mut current = start;
        loop {
            roots.push(current);
            current = (*current.as_ptr()).right;
            if current == start {
                break;
            }
        }

        let mut max_degree = 0;
        let mut n = self.len;
        while n > 0 {
            n >>= 1;
            max_degree += 1;
        }
        let mut degree_table: Vec<Option<NonNull<Node>>> = vec![None; max_degree + 2];

        for root in roots {
            let mut x = root;
            let mut d = (*x.as_ptr()).degree;
            loop {
                if d >= degree_table.len() {
                    degree_table.resize(d + 1, None);
                }
                let Some(mut y) = degree_table[d] else {
                    break;
                };
                // Equal keys keep x as parent, which fixes the tie order
                if (*y.as_ptr()).key < (*x.as_ptr()).key {
                    mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                degree_table[d] = None;
                d += 1;
            }
            degree_table[d] = Some(x);
        }

        self.min = None;
        self.roots = 0;
        for node in degree_table.into_iter().flatten() {
            (*node.as_ptr()).left = node;
            (*node.as_ptr()).right = node;
            self.splice_into_root_ring(node);
        }
    }

    /// Makes root `child` a child of root `parent`
    unsafe fn link(&mut self, child: NonNull<Node>, parent: NonNull<Node>) {
        self.remove_from_root_ring(child);
        (*child.as_ptr()).parent = Some(parent);
        (*child.as_ptr()).marked = false;

        match (*parent.as_ptr()).child {
            None => {
                (*parent.as_ptr()).child = Some(child);
                (*child.as_ptr()).left = child;
                (*child.as_ptr()).right = child;
            }
            Some(first) => {
                let first_left = (*first.as_ptr()).left;
                (*child.as_ptr()).right = first;
                (*child.as_ptr()).left = first_left;
                (*first_left.as_ptr()).right = child;
                (*first.as_ptr()).left = child;
            }
        }

        (*parent.as_ptr()).degree += 1;
        self.stats.link_operations += 1;
        self.stats.note_height_or_rank((*parent.as_ptr()).degree);
    }

    /// Detaches `node` from `parent`'s child ring and promotes it to a root
    unsafe fn cut(&mut self, node: NonNull<Node>, parent: NonNull<Node>) {
        if (*node.as_ptr()).right == node {
            (*parent.as_ptr()).child = None;
        } else {
            let left = (*node.as_ptr()).left;
            let right = (*node.as_ptr()).right;
            if (*parent.as_ptr()).child == Some(node) {
                (*parent.as_ptr()).child = Some(right);
            }
            (*left.as_ptr()).right = right;
            (*right.as_ptr()).left = left;
        }
        (*parent.as_ptr()).degree -= 1;

        (*node.as_ptr()).left = node;
        (*node.as_ptr()).right = node;
        (*node.as_ptr()).marked = false;
        self.splice_into_root_ring(node);
    }

    /// Marks an unmarked parent; cuts a marked one and recurses upward.
    /// The cascade stops at roots, which are never marked.
    unsafe fn cascading_cut(&mut self, node: NonNull<Node>) {
        let Some(parent) = (*node.as_ptr()).parent else {
            return;
        };
        if !(*node.as_ptr()).marked {
            (*node.as_ptr()).marked = true;
        } else {
            self.cut(node, parent);
            self.cascading_cut(parent);
        }
    }

    fn update_size_metrics(&mut self) {
        let bytes = self.len * mem::size_of::<Node>();
        self.stats.record_size(self.len, bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        let mut heap = FibonacciHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.peek_min(), Err(HeapError::Empty));

        heap.insert(5, 50);
        heap.insert(3, 30);
        heap.insert(7, 70);

        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek_min(), Ok((3, 30)));
        assert_eq!(heap.extract_min(), Ok((3, 30)));
        assert_eq!(heap.peek_min(), Ok((5, 50)));
        assert_eq!(heap.extract_min(), Ok((5, 50)));
        assert_eq!(heap.extract_min(), Ok((7, 70)));
        assert!(heap.is_empty());
        assert_eq!(heap.extract_min(), Err(HeapError::Empty));
    }

    #[test]
    fn decrease_key_updates_min() {
        let mut heap = FibonacciHeap::new();
        heap.insert(10, 1);
        let h2 = heap.insert(20, 2);
        let h3 = heap.insert(30, 3);

        heap.decrease_key(&h2, 5).unwrap();
        assert_eq!(heap.peek_min(), Ok((5, 2)));

        heap.decrease_key(&h3, 1).unwrap();
        assert_eq!(heap.peek_min(), Ok((1, 3)));
    }

    #[test]
    fn decrease_key_after_consolidation_cuts() {
        let mut heap = FibonacciHeap::new();
        let mut handles = Vec::new();
        for i in 0..32 {
            handles.push(heap.insert(100 + i, i as Value));
        }
        // Force a consolidation so later decreases hit non-root nodes
        assert_eq!(heap.extract_min(), Ok((100, 0)));

        heap.decrease_key(&handles[20], 1).unwrap();
        heap.decrease_key(&handles[25], 2).unwrap();
        heap.decrease_key(&handles[31], 0).unwrap();

        assert_eq!(heap.extract_min(), Ok((0, 31)));
        assert_eq!(heap.extract_min(), Ok((1, 20)));
        assert_eq!(heap.extract_min(), Ok((2, 25)));
    }

    #[test]
    fn rejected_decrease_has_no_effect() {
        let mut heap = FibonacciHeap::new();
        let h = heap.insert(5, 1);
        assert_eq!(heap.decrease_key(&h, 9), Err(HeapError::KeyNotDecreased));
        assert_eq!(heap.peek_min(), Ok((5, 1)));
    }

    #[test]
    fn merge_concatenates_root_rings() {
        let mut a = FibonacciHeap::new();
        a.insert(5, 50);
        a.insert(10, 100);

        let mut b = FibonacciHeap::new();
        b.insert(3, 30);
        b.insert(7, 70);

        a.merge(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.len(), 4);
        assert_eq!(a.extract_min(), Ok((3, 30)));
        assert_eq!(a.extract_min(), Ok((5, 50)));
        assert_eq!(a.extract_min(), Ok((7, 70)));
        assert_eq!(a.extract_min(), Ok((10, 100)));
    }

    #[test]
    fn consolidation_is_counted() {
        let mut heap = FibonacciHeap::new();
        for i in 0..100 {
            heap.insert(i, i as Value);
        }
        assert!(heap.structure_stats().max_roots >= 100);
        heap.extract_min().unwrap();
        let stats = heap.structure_stats();
        assert!(stats.consolidation_passes >= 1);
        assert!(stats.link_operations > 0);
    }
}
