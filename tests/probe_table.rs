// ProbeTable integration suite over the public surface.
//
// Each test documents the behavior being verified and the invariants
// assumed or asserted. The core invariants exercised:
// - Sizing: storage is always a supported prime >= the requested capacity.
// - Probing: equal elements resolve to their slot through collisions, and
//   deleting one collider never breaks another's probe continuation.
// - Counting: live count equals distinct inserted-and-not-removed elements.
// - Resizing: growth keeps occupancy bounded, membership is preserved, and
//   traversal shrinks sparse tables before visiting.
// - Ownership: the disposal hook runs exactly once per element leaving the
//   table, and never for elements moved by a rehash.

use probe_table::{ElementPolicy, HashedTable, InsertMode, ProbeTable};
use std::cell::Cell;
use std::rc::Rc;

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

// Test: requested capacities round up to a supported prime size.
// Verifies: create(8) yields a prime size of at least 8.
#[test]
fn create_rounds_capacity_up_to_prime() {
    let mut table: HashedTable<u64> = HashedTable::new();
    table.create(8);
    assert!(table.size() >= 8);
    assert!(is_prime(table.size()));
    assert_eq!(table.len(), 0);
}

// Policy with scripted hashes for the collision scenario below: in a
// table of size 13, hashes 2, 15, and 158 share primary position 2, and
// 15 and 158 additionally share secondary step 5, so 'c' probes straight
// through 'b''s slot.
struct ScriptedPolicy;

impl ElementPolicy for ScriptedPolicy {
    type Elem = char;
    fn hash(&self, elem: &char) -> u64 {
        match elem {
            'a' => 2,
            'b' => 15,
            'c' => 158,
            other => *other as u64,
        }
    }
    fn equal(&self, existing: &char, candidate: &char) -> bool {
        existing == candidate
    }
}

// Test: colliding inserts resolve correctly and a tombstone left by one
// collider does not terminate another collider's probe sequence.
#[test]
fn colliding_elements_survive_a_deletion_between_them() {
    let mut table = ProbeTable::with_policy(ScriptedPolicy);
    table.create(8);
    assert_eq!(table.size(), 13);

    // Exercise both halves of the insertion protocol: the explicit
    // slot-resolution path for 'a', the convenience path for the rest.
    let slot = table
        .find_slot(&'a', InsertMode::Insert)
        .expect("insert-mode probe resolves a slot");
    assert!(table.slot(slot).is_none());
    assert_eq!(table.fill_slot(slot, 'a'), None);
    table.insert('b');
    table.insert('c');

    assert_eq!(table.find(&'a'), Some(&'a'));
    assert_eq!(table.find(&'b'), Some(&'b'));
    assert_eq!(table.find(&'c'), Some(&'c'));

    table.remove_elt(&'b');
    assert_eq!(table.find(&'b'), None);
    assert_eq!(table.find(&'c'), Some(&'c'));
    assert_eq!(table.find(&'a'), Some(&'a'));
    assert_eq!(table.len(), 2);
}

// Test: growth under sustained insertion.
// Verifies: 100 elements from an initial capacity of 8 end at a prime
// size >= 200 with all elements still resident.
#[test]
fn repeated_expansion_reaches_expected_size() {
    let mut table: HashedTable<u64> = HashedTable::new();
    table.create(8);
    for v in 0..100 {
        assert_eq!(table.insert(v), None);
    }
    assert_eq!(table.len(), 100);
    assert!(table.size() >= 200);
    assert!(is_prime(table.size()));
    for v in 0..100 {
        assert_eq!(table.find(&v), Some(&v));
    }
}

// Test: traversal shrinks a sparse table before visiting.
// Verifies: after 10 inserts and 9 removals on a capacity-64 table,
// traverse() first shrinks the array and then visits the single survivor
// exactly once.
#[test]
fn traverse_shrinks_sparse_table_then_visits_survivors() {
    let mut table: HashedTable<u64> = HashedTable::new();
    table.create(64);
    let size_before = table.size();
    assert!(size_before >= 64);

    for v in 0..10 {
        table.insert(v);
    }
    for v in 0..9 {
        table.remove_elt(&v);
    }
    assert_eq!(table.len(), 1);

    let mut visited = Vec::new();
    table.traverse(|elem| {
        visited.push(*elem);
        true
    });
    assert_eq!(visited, vec![9]);
    assert!(table.size() < size_before);
    assert!(table.size() <= 32);
    assert_eq!(table.find(&9), Some(&9));
}

// Test: the slot-resolution protocol.
// Verifies: a NoInsert miss yields no slot; an Insert reservation reads
// as vacant until filled, after which lookup observes the element.
#[test]
fn find_slot_protocol_round_trip() {
    let mut table: HashedTable<String> = HashedTable::new();
    table.create(8);

    assert!(table
        .find_slot(&"absent".to_string(), InsertMode::NoInsert)
        .is_none());

    let slot = table
        .find_slot(&"present".to_string(), InsertMode::Insert)
        .expect("insert-mode probe resolves a slot");
    assert!(table.slot(slot).is_none());
    assert_eq!(table.fill_slot(slot, "present".to_string()), None);

    assert_eq!(table.find(&"present".to_string()), Some(&"present".to_string()));
    assert_eq!(table.slot(slot), Some(&"present".to_string()));
    assert_eq!(table.len(), 1);
}

// Test: removal semantics.
// Verifies: removing an element makes it unfindable; removing an absent
// element is a no-op.
#[test]
fn remove_then_find_misses() {
    let mut table: HashedTable<u64> = HashedTable::new();
    table.create(8);
    table.insert(1);
    table.insert(2);

    table.remove_elt(&1);
    assert_eq!(table.find(&1), None);
    assert_eq!(table.len(), 1);

    table.remove_elt(&42);
    assert_eq!(table.len(), 1);
    assert_eq!(table.find(&2), Some(&2));
}

// Shared disposal counter for the ownership tests.
#[derive(Clone)]
struct CountingPolicy {
    disposed: Rc<Cell<usize>>,
}

impl ElementPolicy for CountingPolicy {
    type Elem = u64;
    fn hash(&self, elem: &u64) -> u64 {
        elem.wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }
    fn equal(&self, existing: &u64, candidate: &u64) -> bool {
        existing == candidate
    }
    fn dispose(&self, _elem: u64) {
        self.disposed.set(self.disposed.get() + 1);
    }
}

// Test: disposal-hook accounting across every removal path.
// Assumes: rehashing moves elements without disposing them.
// Verifies: one hook invocation per element leaving via remove_elt,
// empty, and dispose; none for elements carried across resizes.
#[test]
fn disposal_hook_runs_exactly_once_per_departure() {
    let disposed = Rc::new(Cell::new(0));
    let mut table = ProbeTable::with_policy(CountingPolicy {
        disposed: disposed.clone(),
    });
    table.create(8);

    for v in 0..10 {
        table.insert(v);
    }
    assert_eq!(disposed.get(), 0);

    for v in 0..3 {
        table.remove_elt(&v);
    }
    assert_eq!(disposed.get(), 3);

    // Push through several expansions; live elements are moved, not
    // disposed.
    for v in 10..40 {
        table.insert(v);
    }
    assert_eq!(disposed.get(), 3);
    assert_eq!(table.len(), 37);

    table.empty();
    assert_eq!(disposed.get(), 40);

    for v in 50..55 {
        table.insert(v);
    }
    table.dispose();
    assert_eq!(disposed.get(), 45);
    assert!(!table.is_created());
}

// Test: dropping a created table behaves like dispose.
#[test]
fn drop_releases_live_elements() {
    let disposed = Rc::new(Cell::new(0));
    {
        let mut table = ProbeTable::with_policy(CountingPolicy {
            disposed: disposed.clone(),
        });
        table.create(8);
        for v in 0..6 {
            table.insert(v);
        }
    }
    assert_eq!(disposed.get(), 6);
}

// Test: precomputed-hash variants agree with the hashing variants.
#[test]
fn precomputed_hash_variants_agree() {
    fn mix(v: u64) -> u64 {
        v.wrapping_mul(0x9e37_79b9_7f4a_7c15)
    }

    struct MixPolicy;
    impl ElementPolicy for MixPolicy {
        type Elem = u64;
        fn hash(&self, elem: &u64) -> u64 {
            mix(*elem)
        }
        fn equal(&self, existing: &u64, candidate: &u64) -> bool {
            existing == candidate
        }
    }

    let mut table = ProbeTable::with_policy(MixPolicy);
    table.create(8);

    let slot = table
        .find_slot_with_hash(&7, mix(7), InsertMode::Insert)
        .expect("insert-mode probe resolves a slot");
    table.fill_slot(slot, 7);

    assert_eq!(table.find_with_hash(&7, mix(7)), Some(&7));
    assert_eq!(table.find(&7), Some(&7));

    table.remove_elt_with_hash(&7, mix(7));
    assert_eq!(table.find(&7), None);
    assert!(table.is_empty());
}

// Test: membership survives a random deletion pattern and the traversal
// yields exactly the surviving subset.
#[test]
fn traversal_yields_exactly_the_survivors() {
    let mut table: HashedTable<u64> = HashedTable::new();
    table.create(8);
    for v in 0..50 {
        table.insert(v);
    }
    // Deterministic "random" subset: multiples of 3.
    let mut survivors = Vec::new();
    for v in 0..50u64 {
        if v % 3 == 0 {
            table.remove_elt(&v);
        } else {
            survivors.push(v);
        }
    }

    let mut seen = Vec::new();
    table.traverse(|elem| {
        seen.push(*elem);
        true
    });
    seen.sort_unstable();
    assert_eq!(seen, survivors);
    assert_eq!(table.len(), survivors.len());
}

// Test: emptying a table that grew very large swaps the oversized array
// for a small one instead of clearing it in place.
#[test]
fn empty_downsizes_an_oversized_table() {
    let mut table: HashedTable<u64> = HashedTable::new();
    table.create(8);
    for v in 0..100_000 {
        table.insert(v);
    }
    assert!(table.size() > 131_072);

    table.empty();
    assert!(table.is_created());
    assert_eq!(table.len(), 0);
    assert!(table.size() <= 251);

    // Still usable at the new size.
    table.insert(17);
    assert_eq!(table.find(&17), Some(&17));
}
