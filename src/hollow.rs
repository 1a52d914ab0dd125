//! Hollow heap, single-tree variant.
//!
//! Matches the amortized bounds of the Fibonacci heap with a simpler
//! mutation story built on two ideas:
//!
//! 1. **Lazy deletion for decrease-key**: instead of cutting a node out of
//!    its tree, the item is evacuated to a freshly minted cell with the
//!    lower key and the old cell is left behind "hollow". Hollow cells stay
//!    in the tree as structural skeleton until the next `extract_min`
//!    sweeps them.
//! 2. **A second parent edge**: when the evacuating cell does not dethrone
//!    the root, the hollow cell is also hung under the new cell, giving it
//!    two parents. The structure is a DAG rather than a tree; the sweep in
//!    `extract_min` untangles it.
//!
//! Between operations there is exactly one root, every non-hollow cell is
//! reachable from it, and every handle either points at a non-hollow cell
//! or at nothing (its cell was reclaimed by `extract_min`).
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
//!
//! # References
//!
//! - Hansen, T.D., Kaplan, H., Tarjan, R.E., Zwick, U. "Hollow Heaps."
//!   *ACM Transactions on Algorithms*, 13(3), 2017.

use crate::stats::StructureStats;
use crate::traits::{Handle, Heap, HeapError, Key, Value};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::mem;
use std::rc::{Rc, Weak};

/// Internal cell. A cell is "full" while it carries an item and "hollow"
/// after `decrease_key` has evacuated the item elsewhere.
struct Cell {
    key: Key,
    /// The payload, or `None` once the cell is hollow
    item: Option<Value>,
    /// Head of the child list
    child: Option<CellRef>,
    /// Next sibling in the parent's child list
    next: Option<CellRef>,
    /// Secondary incoming edge, set when decrease_key hangs this (hollow)
    /// cell under the evacuating cell. Weak: navigation only, never keeps
    /// the cell alive.
    second_parent: Weak<RefCell<Cell>>,
    /// Bounds the subtree size, like Fibonacci degree but decreased by up
    /// to 2 on decrease_key
    rank: u32,
}

type CellRef = Rc<RefCell<Cell>>;

/// Handle to an element in a [`HollowHeap`].
///
/// The inner weak pointer follows the item, not the cell: `decrease_key`
/// redirects it to the evacuating cell, and it dies when `extract_min`
/// reclaims the cell, so stale handles fail with
/// [`HeapError::InvalidHandle`].
pub struct HollowHandle {
    cell: Rc<RefCell<Weak<RefCell<Cell>>>>,
}

impl Clone for HollowHandle {
    fn clone(&self) -> Self {
        HollowHandle {
            cell: Rc::clone(&self.cell),
        }
    }
}

impl PartialEq for HollowHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl Eq for HollowHandle {}

impl std::fmt::Debug for HollowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HollowHandle")
            .field("cell", &self.cell.borrow().as_ptr())
            .finish()
    }
}

impl Handle for HollowHandle {}

/// Hollow heap over `(i64, i32)` entries.
///
/// Eagerly links on insert and decrease_key, so between operations the
/// whole heap is a single tree (plus hollow skeleton).
///
/// # Example
///
/// ```rust
/// use dijkstra_heaps::hollow::HollowHeap;
/// use dijkstra_heaps::Heap;
///
/// let mut heap = HollowHeap::new();
/// let handle = heap.insert(5, 1);
/// heap.insert(3, 2);
/// heap.decrease_key(&handle, 1).unwrap();
/// assert_eq!(heap.peek_min(), Ok((1, 1)));
/// ```
pub struct HollowHeap {
    root: Option<CellRef>,
    /// Live items (inserts minus extracts)
    len: usize,
    /// Cells in memory, hollow skeleton included
    cells: usize,
    stats: StructureStats,
}

impl Drop for HollowHeap {
    fn drop(&mut self) {
        // Child/next chains can be arbitrarily long; dismantle iteratively
        // rather than letting Rc recurse through them.
        let mut stack: Vec<CellRef> = Vec::new();
        stack.extend(self.root.take());
        while let Some(cell) = stack.pop() {
            let mut cell = cell.borrow_mut();
            stack.extend(cell.child.take());
            stack.extend(cell.next.take());
        }
    }
}

impl Heap for HollowHeap {
    type Handle = HollowHandle;

    fn new() -> Self {
        Self {
            root: None,
            len: 0,
            cells: 0,
            stats: StructureStats::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn len(&self) -> usize {
        self.len
    }

    fn insert(&mut self, key: Key, value: Value) -> Self::Handle {
        let cell = Rc::new(RefCell::new(Cell {
            key,
            item: Some(value),
            child: None,
            next: None,
            second_parent: Weak::new(),
            rank: 0,
        }));
        let handle = HollowHandle {
            cell: Rc::new(RefCell::new(Rc::downgrade(&cell))),
        };

        self.cells += 1;
        self.len += 1;
        self.root = Some(match self.root.take() {
            None => cell,
            Some(root) => self.link(root, cell),
        });
        self.stats.note_roots(1);
        self.update_size_metrics();
        handle
    }

    fn peek_min(&self) -> Result<(Key, Value), HeapError> {
        let root = self.root.as_ref().ok_or(HeapError::Empty)?;
        let cell = root.borrow();
        let value = cell.item.expect("the root cell is never hollow");
        Ok((cell.key, value))
    }

    fn extract_min(&mut self) -> Result<(Key, Value), HeapError> {
        let root = self.root.take().ok_or(HeapError::Empty)?;
        let result = {
            let mut cell = root.borrow_mut();
            let value = cell.item.take().expect("the root cell is never hollow");
            (cell.key, value)
        };
        self.len -= 1;
        self.stats.consolidation_passes += 1;

        let mut rank_map: Vec<Option<CellRef>> = Vec::new();
        let mut max_rank: Option<usize> = None;

        // Dismantle the (now hollow) root and every hollow cell reachable
        // below it, combining the full cells they expose by rank.
        let mut work = vec![root];
        let mut idx = 0;
        while idx < work.len() {
            let parent = work[idx].clone();
            idx += 1;
            let mut cur = parent.borrow_mut().child.take();

            while let Some(cell) = cur {
                let is_full = cell.borrow().item.is_some();
                if is_full {
                    let next = cell.borrow_mut().next.take();
                    self.rank_combine(cell, &mut rank_map, &mut max_rank);
                    cur = next;
                    continue;
                }

                let second_parent = cell.borrow().second_parent.upgrade();
                match second_parent {
                    None => {
                        // Pure skeleton with a single parent: sweep it
                        let next = cell.borrow_mut().next.take();
                        work.push(cell);
                        cur = next;
                    }
                    Some(ref sp) if Rc::ptr_eq(sp, &parent) => {
                        // Reached through the secondary link. The rest of
                        // this sibling chain belongs to the other parent,
                        // whose own sweep must still see it: stop here and
                        // leave `next` intact.
                        cell.borrow_mut().second_parent = Weak::new();
                        work.push(cell);
                        cur = None;
                    }
                    Some(_) => {
                        // Reached through the primary parent. Truncate the
                        // chain behind it so the secondary parent's sweep
                        // stops after this cell, and leave the cell to
                        // that sweep.
                        let mut cell = cell.borrow_mut();
                        cell.second_parent = Weak::new();
                        cur = cell.next.take();
                    }
                }
            }
        }
        self.cells = self.cells.saturating_sub(work.len());

        let occupied = rank_map.iter().filter(|slot| slot.is_some()).count();
        self.stats.note_roots(occupied.max(usize::from(self.len > 0)));

        // Relink the survivors into a single tree, highest rank first
        let mut new_root: Option<CellRef> = None;
        if let Some(max_rank) = max_rank {
            for slot in (0..=max_rank).rev() {
                if let Some(cell) = rank_map[slot].take() {
                    new_root = Some(match new_root {
                        None => cell,
                        Some(root) => self.link(root, cell),
                    });
                }
            }
        }
        self.root = new_root;
        self.update_size_metrics();
        Ok(result)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_key: Key) -> Result<(), HeapError> {
        let cell = handle.cell.borrow().upgrade().ok_or(HeapError::InvalidHandle)?;
        {
            let cell = cell.borrow();
            if cell.item.is_none() {
                return Err(HeapError::InvalidHandle);
            }
            if new_key > cell.key {
                return Err(HeapError::KeyNotDecreased);
            }
        }

        let root = Rc::clone(self.root.as_ref().ok_or(HeapError::InvalidHandle)?);
        if Rc::ptr_eq(&root, &cell) {
            cell.borrow_mut().key = new_key;
            return Ok(());
        }

        // Evacuate the item into a fresh cell; the old cell stays behind
        // as hollow skeleton until the next extract_min sweeps it.
        let (value, old_rank) = {
            let mut cell = cell.borrow_mut();
            let value = cell.item.take().expect("checked non-hollow above");
            (value, cell.rank)
        };
        let new_cell = Rc::new(RefCell::new(Cell {
            key: new_key,
            item: Some(value),
            child: None,
            next: None,
            second_parent: Weak::new(),
            rank: old_rank.saturating_sub(2),
        }));
        self.cells += 1;
        *handle.cell.borrow_mut() = Rc::downgrade(&new_cell);

        self.stats.note_roots(2);
        let old_root_ptr = Rc::as_ptr(&root);
        let new_root = self.link(root, Rc::clone(&new_cell));
        if Rc::as_ptr(&new_root) == old_root_ptr {
            // The new cell did not dethrone the root. Hang the hollow cell
            // under it as well, preserving the degree of the hollow cell's
            // former parent; the hollow cell keeps its `next` link because
            // the sibling chain still belongs to that parent.
            new_cell.borrow_mut().child = Some(Rc::clone(&cell));
            cell.borrow_mut().second_parent = Rc::downgrade(&new_cell);
        }
        self.root = Some(new_root);
        self.update_size_metrics();
        Ok(())
    }

    fn merge(&mut self, other: &mut Self) {
        let Some(other_root) = other.root.take() else {
            return;
        };
        let other_len = mem::take(&mut other.len);
        let other_cells = mem::take(&mut other.cells);
        other.update_size_metrics();

        self.root = Some(match self.root.take() {
            None => other_root,
            Some(root) => self.link(root, other_root),
        });
        self.len += other_len;
        self.cells += other_cells;
        self.update_size_metrics();
    }

    fn structure_stats(&self) -> &StructureStats {
        &self.stats
    }
}

impl Default for HollowHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl HollowHeap {
    /// Links two roots and returns the winner. The smaller key wins; on
    /// equal keys the higher rank wins (so ranks cannot stagnate), and on
    /// equal key and rank the first argument wins.
    fn link(&mut self, u: CellRef, v: CellRef) -> CellRef {
        self.stats.link_operations += 1;
        let u_wins = {
            let u = u.borrow();
            let v = v.borrow();
            match u.key.cmp(&v.key) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => u.rank >= v.rank,
            }
        };
        let (winner, loser) = if u_wins { (u, v) } else { (v, u) };
        {
            let mut loser_mut = loser.borrow_mut();
            loser_mut.second_parent = Weak::new();
            loser_mut.next = winner.borrow_mut().child.take();
        }
        winner.borrow_mut().child = Some(loser);
        winner
    }

    /// Repeatedly links `cell` with same-rank occupants of the rank map,
    /// bumping the winner's rank each time, then parks it in its slot.
    fn rank_combine(
        &mut self,
        cell: CellRef,
        rank_map: &mut Vec<Option<CellRef>>,
        max_rank: &mut Option<usize>,
    ) {
        let mut cell = cell;
        loop {
            let rank = cell.borrow().rank as usize;
            if rank >= rank_map.len() {
                rank_map.resize(rank + 1, None);
            }
            match rank_map[rank].take() {
                Some(other) => {
                    let winner = self.link(cell, other);
                    winner.borrow_mut().rank += 1;
                    cell = winner;
                }
                None => {
                    self.stats.note_height_or_rank(rank);
                    *max_rank = Some(max_rank.map_or(rank, |m| m.max(rank)));
                    rank_map[rank] = Some(cell);
                    return;
                }
            }
        }
    }

    fn update_size_metrics(&mut self) {
        let bytes = self.cells * mem::size_of::<RefCell<Cell>>();
        self.stats.record_size(self.cells, bytes);
    }
}
