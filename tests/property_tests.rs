//! Property-based tests using proptest.
//!
//! Random operation sequences are replayed against a plain-vector reference
//! model, and identical streams are replayed against all three heap
//! variants to check that they agree wherever the contract says they must.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use dijkstra_heaps::binary::BinaryHeap;
use dijkstra_heaps::fibonacci::FibonacciHeap;
use dijkstra_heaps::hollow::HollowHeap;
use dijkstra_heaps::traits::{Heap, Key, Value};

/// Replays interleaved insert/extract against a vector model, checking
/// `len`, `peek_min`, and every extracted minimum.
fn check_against_model<H: Heap>(ops: Vec<(bool, i16)>) -> Result<(), TestCaseError> {
    let mut heap = H::new();
    let mut model: Vec<Key> = Vec::new();

    for (i, (should_extract, key)) in ops.into_iter().enumerate() {
        if should_extract && !model.is_empty() {
            let min = *model.iter().min().expect("model is non-empty");
            let (extracted, _) = heap.extract_min().expect("heap mirrors the model");
            prop_assert_eq!(extracted, min);
            let pos = model.iter().position(|&k| k == min).expect("min exists");
            model.swap_remove(pos);
        } else {
            heap.insert(key as Key, i as Value);
            model.push(key as Key);
        }

        prop_assert_eq!(heap.len(), model.len());
        prop_assert_eq!(heap.is_empty(), model.is_empty());
        match heap.peek_min() {
            Ok((peek, _)) => prop_assert_eq!(Some(peek), model.iter().min().copied()),
            Err(_) => prop_assert!(model.is_empty()),
        }
    }
    Ok(())
}

/// Applies random decreases through handles and checks the minimum and the
/// final drain order against the model.
fn check_decreases_against_model<H: Heap>(
    initial: Vec<i32>,
    decreases: Vec<(usize, u16)>,
) -> Result<(), TestCaseError> {
    let mut heap = H::new();
    let mut handles = Vec::new();
    let mut model: Vec<Key> = Vec::new();

    for (i, key) in initial.iter().enumerate() {
        handles.push(heap.insert(*key as Key, i as Value));
        model.push(*key as Key);
    }

    for (index, delta) in decreases {
        if handles.is_empty() {
            break;
        }
        let index = index % handles.len();
        let new_key = model[index] - delta as Key;
        heap.decrease_key(&handles[index], new_key)
            .expect("new key is never greater");
        model[index] = new_key;

        let (peek, _) = heap.peek_min().expect("heap is non-empty");
        prop_assert_eq!(Some(peek), model.iter().min().copied());
    }

    model.sort_unstable();
    let drained: Vec<Key> = std::iter::from_fn(|| heap.extract_min().ok())
        .map(|(key, _)| key)
        .collect();
    prop_assert_eq!(drained, model);
    Ok(())
}

/// Merging two heaps must drain as the sorted union of their contents.
fn check_merge_against_model<H: Heap>(a: Vec<i16>, b: Vec<i16>) -> Result<(), TestCaseError> {
    let mut heap_a = H::new();
    let mut heap_b = H::new();
    let mut union: Vec<Key> = Vec::new();

    for (i, key) in a.iter().enumerate() {
        heap_a.insert(*key as Key, i as Value);
        union.push(*key as Key);
    }
    for (i, key) in b.iter().enumerate() {
        heap_b.insert(*key as Key, (a.len() + i) as Value);
        union.push(*key as Key);
    }

    heap_a.merge(&mut heap_b);
    prop_assert!(heap_b.is_empty());
    prop_assert_eq!(heap_a.len(), union.len());

    union.sort_unstable();
    let drained: Vec<Key> = std::iter::from_fn(|| heap_a.extract_min().ok())
        .map(|(key, _)| key)
        .collect();
    prop_assert_eq!(drained, union);
    Ok(())
}

/// One raw stream step: `kind % 3` selects insert/decrease/extract, `arg`
/// parameterizes it.
type RawOp = (u8, u16);

/// Replays a raw stream against `H` and returns every `(key, value)` pair
/// extracted, mid-stream extractions first, final drain last.
///
/// Keys are kept unique by construction: insert `i` receives a key in the
/// private band `[1000 * i, 1000 * i + 999]` and decreases never leave the
/// band. With unique keys the heaps have no ties to break, so the streams
/// stay aligned across variants and the extraction sequences must agree
/// exactly.
fn replay_stream<H: Heap>(ops: &[RawOp]) -> Vec<(Key, Value)> {
    let mut heap = H::new();
    let mut handles = Vec::new();
    let mut keys: Vec<Key> = Vec::new();
    let mut alive: Vec<bool> = Vec::new();
    let mut extracted = Vec::new();

    for &(kind, arg) in ops {
        match kind % 3 {
            0 => {
                let band = 1_000 * keys.len() as Key;
                let key = band + (arg % 400) as Key;
                handles.push(heap.insert(key, keys.len() as Value));
                keys.push(key);
                alive.push(true);
            }
            1 => {
                let start = arg as usize % keys.len().max(1);
                let Some(target) = (0..keys.len())
                    .map(|offset| (start + offset) % keys.len().max(1))
                    .find(|&i| alive[i])
                else {
                    continue;
                };
                let band = 1_000 * target as Key;
                let new_key = (keys[target] - (arg % 997) as Key).max(band);
                heap.decrease_key(&handles[target], new_key)
                    .expect("new key stays at or below the current key");
                keys[target] = new_key;
            }
            _ => {
                if let Ok((key, value)) = heap.extract_min() {
                    alive[value as usize] = false;
                    extracted.push((key, value));
                }
            }
        }
    }

    while let Ok(pair) = heap.extract_min() {
        extracted.push(pair);
    }
    extracted
}

proptest! {
    #[test]
    fn binary_matches_model(ops in prop::collection::vec((any::<bool>(), any::<i16>()), 0..200)) {
        check_against_model::<BinaryHeap>(ops)?;
    }

    #[test]
    fn fibonacci_matches_model(ops in prop::collection::vec((any::<bool>(), any::<i16>()), 0..200)) {
        check_against_model::<FibonacciHeap>(ops)?;
    }

    #[test]
    fn hollow_matches_model(ops in prop::collection::vec((any::<bool>(), any::<i16>()), 0..200)) {
        check_against_model::<HollowHeap>(ops)?;
    }

    #[test]
    fn binary_decreases_match_model(
        initial in prop::collection::vec(0..1_000_000i32, 1..60),
        decreases in prop::collection::vec((any::<usize>(), any::<u16>()), 0..120),
    ) {
        check_decreases_against_model::<BinaryHeap>(initial, decreases)?;
    }

    #[test]
    fn fibonacci_decreases_match_model(
        initial in prop::collection::vec(0..1_000_000i32, 1..60),
        decreases in prop::collection::vec((any::<usize>(), any::<u16>()), 0..120),
    ) {
        check_decreases_against_model::<FibonacciHeap>(initial, decreases)?;
    }

    #[test]
    fn hollow_decreases_match_model(
        initial in prop::collection::vec(0..1_000_000i32, 1..60),
        decreases in prop::collection::vec((any::<usize>(), any::<u16>()), 0..120),
    ) {
        check_decreases_against_model::<HollowHeap>(initial, decreases)?;
    }

    #[test]
    fn binary_merge_matches_model(
        a in prop::collection::vec(any::<i16>(), 0..80),
        b in prop::collection::vec(any::<i16>(), 0..80),
    ) {
        check_merge_against_model::<BinaryHeap>(a, b)?;
    }

    #[test]
    fn fibonacci_merge_matches_model(
        a in prop::collection::vec(any::<i16>(), 0..80),
        b in prop::collection::vec(any::<i16>(), 0..80),
    ) {
        check_merge_against_model::<FibonacciHeap>(a, b)?;
    }

    #[test]
    fn hollow_merge_matches_model(
        a in prop::collection::vec(any::<i16>(), 0..80),
        b in prop::collection::vec(any::<i16>(), 0..80),
    ) {
        check_merge_against_model::<HollowHeap>(a, b)?;
    }

    #[test]
    fn identical_streams_agree_across_variants(
        ops in prop::collection::vec((any::<u8>(), any::<u16>()), 0..300),
    ) {
        let binary = replay_stream::<BinaryHeap>(&ops);
        let fibonacci = replay_stream::<FibonacciHeap>(&ops);
        let hollow = replay_stream::<HollowHeap>(&ops);
        prop_assert_eq!(&binary, &fibonacci);
        prop_assert_eq!(&binary, &hollow);
    }
}
