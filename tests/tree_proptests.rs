//! Property-based tests for `BPlusTree`.
//!
//! Differential testing against `BTreeMap` as an oracle, with a full
//! structural check after every mutation.

use leafchain::BPlusTree;
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
//  Strategies
// ============================================================================

/// Small key space so inserts collide and removes usually hit.
fn key() -> impl Strategy<Value = u16> {
    0u16..512
}

fn order() -> impl Strategy<Value = usize> {
    1usize..=6
}

#[derive(Debug, Clone)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
    RangeFrom(u16),
    RangeTo(u16),
}

fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            4 => (key(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
            3 => key().prop_map(Op::Remove),
            1 => key().prop_map(Op::Get),
            1 => key().prop_map(Op::RangeFrom),
            1 => key().prop_map(Op::RangeTo),
        ],
        0..=max_ops,
    )
}

// ============================================================================
//  Differential
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every operation agrees with BTreeMap and leaves a valid tree.
    #[test]
    fn prop_matches_btreemap(order in order(), ops in operations(400)) {
        let mut tree = BPlusTree::new(order).unwrap();
        let mut oracle = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(tree.insert(k, v), oracle.insert(k, v));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(tree.remove(&k), oracle.remove(&k));
                }
                Op::Get(k) => {
                    prop_assert_eq!(tree.get(&k), oracle.get(&k));
                }
                Op::RangeFrom(k) => {
                    let expected: Vec<&u32> = oracle.range(k..).map(|(_, v)| v).collect();
                    prop_assert_eq!(tree.range_from(&k), expected);
                }
                Op::RangeTo(k) => {
                    let expected: Vec<&u32> = oracle.range(..=k).map(|(_, v)| v).collect();
                    prop_assert_eq!(tree.range_to(&k), expected);
                }
            }
            prop_assert_eq!(tree.validate(), Ok(()));
            prop_assert_eq!(tree.len(), oracle.len());
        }

        let entries: Vec<(&u16, &u32)> = tree.iter().collect();
        let expected: Vec<(&u16, &u32)> = oracle.iter().collect();
        prop_assert_eq!(entries, expected);
    }
}

// ============================================================================
//  Round trip
// ============================================================================

proptest! {
    /// Inserting a set then removing all of it, in another order, empties
    /// the tree completely.
    #[test]
    fn prop_insert_then_remove_all(
        order in order(),
        keys in prop::collection::hash_set(any::<u32>(), 0..300),
        seed in any::<u64>(),
    ) {
        let mut tree = BPlusTree::new(order).unwrap();
        let keys: Vec<u32> = keys.into_iter().collect();
        for &k in &keys {
            prop_assert_eq!(tree.insert(k, k.wrapping_mul(3)), None);
        }
        prop_assert_eq!(tree.validate(), Ok(()));

        let mut removal = keys.clone();
        removal.sort_unstable_by_key(|k| (u64::from(*k) ^ seed).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        for k in removal {
            prop_assert_eq!(tree.remove(&k), Some(k.wrapping_mul(3)));
            prop_assert_eq!(tree.validate(), Ok(()));
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.node_count(), 0);
        prop_assert_eq!(tree.dump(), "");
    }

    /// Height stays logarithmic: a tree of n entries never exceeds the
    /// depth of a tree with every node at minimum fill.
    #[test]
    fn prop_height_bound(order in order(), keys in prop::collection::vec(any::<u32>(), 1..500)) {
        let mut tree = BPlusTree::new(order).unwrap();
        for k in keys {
            tree.insert(k, ());
        }

        // leaves hold >= D entries, index nodes >= D+1 children, root >= 2
        let d = order as f64;
        let n = tree.len() as f64;
        let bound = if n <= 2.0 * d {
            1
        } else {
            2 + ((n / (2.0 * d)).ln() / (d + 1.0).ln() + 1e-9).floor() as usize
        };
        prop_assert!(tree.height() <= bound, "height {} > bound {}", tree.height(), bound);
    }
}

// ============================================================================
//  Ranges
// ============================================================================

proptest! {
    /// range_from and range_to partition the tree around any present key,
    /// overlapping only on that key.
    #[test]
    fn prop_ranges_partition(
        order in order(),
        keys in prop::collection::btree_set(any::<i32>(), 1..300),
        pick in any::<prop::sample::Index>(),
    ) {
        let tree = BPlusTree::from_entries(order, keys.iter().map(|&k| (k, k))).unwrap();
        let all: Vec<i32> = keys.into_iter().collect();
        let pivot = all[pick.index(all.len())];

        let low: Vec<i32> = tree.range_to(&pivot).into_iter().copied().collect();
        let high: Vec<i32> = tree.range_from(&pivot).into_iter().copied().collect();

        prop_assert_eq!(low.last(), Some(&pivot));
        prop_assert_eq!(high.first(), Some(&pivot));
        let mut joined = low;
        joined.extend_from_slice(&high[1..]);
        prop_assert_eq!(joined, all);
    }

    /// Absent bounds behave like the nearest present neighbor.
    #[test]
    fn prop_absent_bounds(order in order(), keys in prop::collection::btree_set(0u32..10_000, 0..200)) {
        let tree = BPlusTree::from_entries(order, keys.iter().map(|&k| (k * 2, k))).unwrap();
        for probe in (0..20_001u32).step_by(997).map(|p| p | 1) {
            let from: Vec<u32> = keys.iter().copied().filter(|&k| k * 2 >= probe).collect();
            let to: Vec<u32> = keys.iter().copied().filter(|&k| k * 2 <= probe).collect();
            prop_assert_eq!(tree.range_from(&probe).into_iter().copied().collect::<Vec<_>>(), from);
            prop_assert_eq!(tree.range_to(&probe).into_iter().copied().collect::<Vec<_>>(), to);
        }
    }
}
