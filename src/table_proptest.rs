#![cfg(test)]

// Property tests for ProbeTable kept inside the crate so they can assert
// control-state invariants that the public surface does not expose.

use crate::policy::ElementPolicy;
use crate::table::ProbeTable;
use proptest::prelude::*;
use std::collections::HashSet;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// values, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Remove(usize),
    Find(usize),
    Traverse,
    Empty,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u64>, Vec<Op>)> {
    proptest::collection::vec(0u64..64, 1..=10).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => idx.clone().prop_map(Op::Insert),
            3 => idx.clone().prop_map(Op::Remove),
            3 => idx.clone().prop_map(Op::Find),
            1 => Just(Op::Traverse),
            1 => Just(Op::Empty),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Run a scenario against a model `HashSet`, checking parity and the
/// control-state invariants after every operation:
/// - live count equals the number of distinct inserted-and-not-removed
///   elements;
/// - find/contains parity for every pool element;
/// - traversal yields exactly the live set;
/// - `n_deleted <= n_elements <= size` and occupancy stays within one
///   element of the three-quarters load bound.
fn run_scenario<P>(
    mut table: ProbeTable<P>,
    pool: Vec<u64>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    P: ElementPolicy<Elem = u64>,
{
    let mut model: HashSet<u64> = HashSet::new();
    table.create(1);

    for op in ops {
        match op {
            Op::Insert(i) => {
                let v = pool[i];
                let replaced = table.insert(v);
                prop_assert_eq!(replaced.is_some(), model.contains(&v));
                model.insert(v);
            }
            Op::Remove(i) => {
                let v = pool[i];
                table.remove_elt(&v);
                model.remove(&v);
                prop_assert!(table.find(&v).is_none());
            }
            Op::Find(i) => {
                let v = pool[i];
                prop_assert_eq!(table.find(&v).copied(), model.get(&v).copied());
            }
            Op::Traverse => {
                let mut seen = HashSet::new();
                table.traverse(|elem| {
                    seen.insert(*elem);
                    true
                });
                prop_assert_eq!(&seen, &model);
            }
            Op::Empty => {
                table.empty();
                model.clear();
            }
        }

        // Post-conditions after each op.
        prop_assert_eq!(table.len(), model.len());
        prop_assert_eq!(table.is_empty(), model.is_empty());
        for v in &pool {
            prop_assert_eq!(table.contains(v), model.contains(v));
        }
        let core = table.core.as_deref().expect("created for the whole run");
        prop_assert!(core.n_deleted <= core.n_elements);
        prop_assert!(core.n_elements <= core.size());
        prop_assert!(core.n_elements * 4 <= core.size() * 3 + 4);
    }
    Ok(())
}

/// Well-distributed hashes: exercises the common probe paths and resizes.
#[derive(Default)]
struct MixPolicy;

impl ElementPolicy for MixPolicy {
    type Elem = u64;
    fn hash(&self, elem: &u64) -> u64 {
        elem.wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }
    fn equal(&self, existing: &u64, candidate: &u64) -> bool {
        existing == candidate
    }
}

/// Degenerate hashes (four buckets): stresses collision chains, tombstone
/// reuse, and probe continuation past deletions.
#[derive(Default)]
struct FourBucketPolicy;

impl ElementPolicy for FourBucketPolicy {
    type Elem = u64;
    fn hash(&self, elem: &u64) -> u64 {
        elem % 4
    }
    fn equal(&self, existing: &u64, candidate: &u64) -> bool {
        existing == candidate
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ProbeTable::with_policy(MixPolicy), pool, ops)?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(ProbeTable::with_policy(FourBucketPolicy), pool, ops)?;
    }
}
