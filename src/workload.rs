//! Seeded pseudo-random operation streams for standalone heap stress
//! benchmarking.
//!
//! Each step draws an operation from the configured insert/decrease/extract
//! mix, degrading impossible choices (decrease with nothing active, extract
//! from an empty heap) to the nearest possible one. Which operation runs at
//! each step depends only on the seed, the mix, and the heap's size, so the
//! three variants see the same sequence of operation kinds and the same
//! random draws; only tie-breaking among equal keys may route a decrease to
//! a different victim.

use crate::dijkstra::QueueMetrics;
use crate::stats::StructureStats;
use crate::traits::{Heap, Key, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};

/// Operation mix in percent. Anything not claimed by insert or decrease
/// falls to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadMix {
    pub insert_pct: u32,
    pub decrease_pct: u32,
    pub extract_pct: u32,
}

impl WorkloadMix {
    pub fn valid(&self) -> bool {
        self.insert_pct + self.decrease_pct + self.extract_pct == 100
    }
}

impl Default for WorkloadMix {
    fn default() -> Self {
        Self {
            insert_pct: 40,
            decrease_pct: 35,
            extract_pct: 25,
        }
    }
}

/// Outcome of one workload run
#[derive(Debug, Clone)]
pub struct WorkloadStats {
    pub operations: usize,
    pub metrics: QueueMetrics,
    pub elapsed: Duration,
    pub structure: StructureStats,
}

struct ActiveEntry<H> {
    handle: H,
    key: Key,
    /// Position in the dense id vector, for O(1) swap-removal
    pos: usize,
}

#[derive(Clone, Copy, PartialEq)]
enum Planned {
    Insert,
    Decrease,
    Extract,
}

/// Runs `operations` random heap operations against a fresh `H`.
///
/// Keys are uniform in `1_000..=10_000_000`; decreases subtract a uniform
/// `1..=1000`, saturating at zero. The same `(operations, seed, mix)`
/// triple produces the same per-operation counts for every heap variant.
pub fn run_workload<H: Heap>(operations: usize, seed: u64, mix: &WorkloadMix) -> WorkloadStats {
    debug_assert!(mix.valid(), "workload mix must sum to 100");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut heap = H::new();
    let mut metrics = QueueMetrics::default();

    let mut active: FxHashMap<Value, ActiveEntry<H::Handle>> = FxHashMap::default();
    let mut active_ids: Vec<Value> = Vec::new();
    let mut next_value: Value = 0;

    let insert_threshold = mix.insert_pct;
    let decrease_threshold = insert_threshold + mix.decrease_pct;

    let total_start = Instant::now();
    for _ in 0..operations {
        let choice: u32 = rng.gen_range(0..100);
        let force_insert = heap.is_empty();
        let can_decrease = !active_ids.is_empty();
        let can_extract = !heap.is_empty();

        let mut planned = if choice < insert_threshold {
            Planned::Insert
        } else if choice < decrease_threshold {
            Planned::Decrease
        } else {
            Planned::Extract
        };

        if force_insert {
            planned = Planned::Insert;
        } else if planned == Planned::Decrease && !can_decrease {
            planned = if can_extract {
                Planned::Extract
            } else {
                Planned::Insert
            };
        } else if planned == Planned::Extract && !can_extract {
            planned = if can_decrease {
                Planned::Decrease
            } else {
                Planned::Insert
            };
        }

        match planned {
            Planned::Insert => {
                let key: Key = rng.gen_range(1_000..=10_000_000);
                let value = next_value;
                next_value += 1;

                let start = Instant::now();
                let handle = heap.insert(key, value);
                metrics.insert_time_ns += start.elapsed().as_nanos() as u64;
                metrics.insert_count += 1;

                active.insert(
                    value,
                    ActiveEntry {
                        handle,
                        key,
                        pos: active_ids.len(),
                    },
                );
                active_ids.push(value);
            }
            Planned::Decrease => {
                let value = active_ids[rng.gen_range(0..active_ids.len())];
                let delta: Key = rng.gen_range(1..=1000);
                let entry = active
                    .get_mut(&value)
                    .expect("every active id has a bookkeeping entry");
                let new_key = (entry.key - delta).max(0);

                let start = Instant::now();
                heap.decrease_key(&entry.handle, new_key)
                    .expect("decreasing below the tracked key cannot fail");
                metrics.decrease_time_ns += start.elapsed().as_nanos() as u64;
                metrics.decrease_count += 1;

                entry.key = new_key;
            }
            Planned::Extract => {
                let start = Instant::now();
                let (_, value) = heap
                    .extract_min()
                    .expect("extract is only planned for a non-empty heap");
                metrics.extract_time_ns += start.elapsed().as_nanos() as u64;
                metrics.extract_count += 1;

                if let Some(entry) = active.remove(&value) {
                    let last = active_ids
                        .pop()
                        .expect("an extracted id implies a non-empty id list");
                    if entry.pos < active_ids.len() {
                        active_ids[entry.pos] = last;
                        active
                            .get_mut(&last)
                            .expect("moved id stays in the table")
                            .pos = entry.pos;
                    }
                }
            }
        }
    }
    let elapsed = total_start.elapsed();

    WorkloadStats {
        operations,
        metrics,
        elapsed,
        structure: *heap.structure_stats(),
    }
}
