//! `ProbeTable`: lifecycle, probe surface, and traversal.

use std::collections::hash_map::RandomState;

use crate::alloc::{HeapAlloc, TableAlloc};
use crate::policy::{ElementPolicy, HashedPolicy};
use crate::primes;
use crate::raw::{InsertMode, Slot, SlotIndex, TableCore, SHRINK_FLOOR};
use crate::reentrancy::ReentryCheck;

/// `empty()` discards arrays larger than this many slots instead of
/// clearing them in place, replacing them with one sized for
/// `EMPTY_REPLACEMENT_CAPACITY` elements. Both are tunable policy
/// constants: clearing a megabyte-scale array slot by slot costs more
/// than handing it back and starting small.
const EMPTY_DOWNSIZE_SLOTS: usize = 131_072;
const EMPTY_REPLACEMENT_CAPACITY: usize = 128;

const NOT_CREATED: &str = "table has not been created";

/// An open-addressing hash table of elements with double-hashed probing,
/// tombstone deletion, and prime-sized storage.
///
/// The table is constructed uncreated and must be [`create`](Self::create)d
/// before use; operations other than `create` and
/// [`is_created`](Self::is_created) panic until then. Hashing, equality,
/// and disposal come from the [`ElementPolicy`] parameter; storage comes
/// from the [`TableAlloc`] parameter. Dropping a still-created table
/// disposes its elements as [`dispose`](Self::dispose) would.
///
/// [`SlotIndex`] values returned by [`find_slot`](Self::find_slot) are
/// positions into the current array; any insert-mode probe or
/// [`traverse`](Self::traverse) may resize the table and invalidate them.
pub struct ProbeTable<P: ElementPolicy, A: TableAlloc = HeapAlloc> {
    policy: P,
    alloc: A,
    reentrancy: ReentryCheck,
    pub(crate) core: Option<Box<TableCore<P::Elem>>>,
}

/// A table of `T: Hash + Eq` elements using the standard-library hasher.
pub type HashedTable<T, S = RandomState> = ProbeTable<HashedPolicy<T, S>>;

impl<P: ElementPolicy + Default> ProbeTable<P> {
    /// An uncreated table with default policy and heap storage.
    pub fn new() -> Self {
        Self::with_parts(P::default(), HeapAlloc)
    }
}

impl<P: ElementPolicy + Default> Default for ProbeTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ElementPolicy> ProbeTable<P> {
    pub fn with_policy(policy: P) -> Self {
        Self::with_parts(policy, HeapAlloc)
    }
}

impl<P: ElementPolicy, A: TableAlloc> ProbeTable<P, A> {
    pub fn with_parts(policy: P, alloc: A) -> Self {
        Self {
            policy,
            alloc,
            reentrancy: ReentryCheck::new(),
            core: None,
        }
    }

    /// Allocate storage for at least `initial_capacity` slots, rounded up
    /// to the next supported prime size. Counters start at zero.
    pub fn create(&mut self, initial_capacity: usize) {
        assert!(self.core.is_none(), "create() on an already created table");
        let (size, size_index) = primes::size_for_at_least(initial_capacity);
        let mut core: Box<TableCore<P::Elem>> = self.alloc.alloc_control();
        core.slots = self.alloc.alloc_slots(size);
        core.size_index = size_index;
        self.core = Some(core);
    }

    pub fn is_created(&self) -> bool {
        self.core.is_some()
    }

    /// Dispose every live element, release all storage, and return to the
    /// uncreated state. Re-creation afterwards is permitted.
    pub fn dispose(&mut self) {
        let _lock = self.reentrancy.lock();
        let mut core = self.core.take().expect(NOT_CREATED);
        for slot in core.slots.iter_mut() {
            if let Slot::Occupied(elem) = std::mem::replace(slot, Slot::Empty) {
                self.policy.dispose(elem);
            }
        }
        let slots = std::mem::take(&mut core.slots);
        self.alloc.free_slots(slots);
        self.alloc.free_control(core);
    }

    /// Dispose every live element but keep the table created. Oversized
    /// arrays are replaced by a small one rather than cleared in place.
    /// The diagnostic counters are cumulative across the created lifetime
    /// and are not reset here.
    pub fn empty(&mut self) {
        let _lock = self.reentrancy.lock();
        let core = self.core.as_deref_mut().expect(NOT_CREATED);
        for slot in core.slots.iter_mut() {
            if let Slot::Occupied(elem) = std::mem::replace(slot, Slot::Empty) {
                self.policy.dispose(elem);
            }
        }
        if core.size() > EMPTY_DOWNSIZE_SLOTS {
            let (size, size_index) = primes::size_for_at_least(EMPTY_REPLACEMENT_CAPACITY);
            let old = std::mem::replace(&mut core.slots, self.alloc.alloc_slots(size));
            core.size_index = size_index;
            self.alloc.free_slots(old);
        }
        core.n_elements = 0;
        core.n_deleted = 0;
    }

    /// Look up the element matching `candidate` per the policy's equality.
    pub fn find(&self, candidate: &P::Elem) -> Option<&P::Elem> {
        self.find_with_hash(candidate, self.policy.hash(candidate))
    }

    /// Like [`find`](Self::find) with a precomputed hash.
    pub fn find_with_hash(&self, candidate: &P::Elem, hash: u64) -> Option<&P::Elem> {
        let _lock = self.reentrancy.lock();
        let core = self.core.as_deref().expect(NOT_CREATED);
        core.find_with_hash(&self.policy, candidate, hash)
    }

    pub fn contains(&self, candidate: &P::Elem) -> bool {
        self.find(candidate).is_some()
    }

    /// Resolve the slot for `candidate`: the slot of a matching element,
    /// or (in [`InsertMode::Insert`]) a reserved slot to be written with
    /// [`fill_slot`](Self::fill_slot). An insert-mode call may resize the
    /// table first, invalidating every previously returned [`SlotIndex`].
    pub fn find_slot(&mut self, candidate: &P::Elem, mode: InsertMode) -> Option<SlotIndex> {
        self.find_slot_with_hash(candidate, self.policy.hash(candidate), mode)
    }

    /// Like [`find_slot`](Self::find_slot) with a precomputed hash.
    pub fn find_slot_with_hash(
        &mut self,
        candidate: &P::Elem,
        hash: u64,
        mode: InsertMode,
    ) -> Option<SlotIndex> {
        let _lock = self.reentrancy.lock();
        let core = self.core.as_deref_mut().expect(NOT_CREATED);
        core.find_slot_with_hash(&self.policy, &self.alloc, candidate, hash, mode)
    }

    /// The occupant of a resolved slot, if any. A reserved (not yet
    /// filled) slot reads as `None`.
    pub fn slot(&self, slot: SlotIndex) -> Option<&P::Elem> {
        let core = self.core.as_deref().expect(NOT_CREATED);
        match core.slots.get(slot.0) {
            Some(Slot::Occupied(elem)) => Some(elem),
            _ => None,
        }
    }

    /// Write `elem` into a slot returned by an insert-mode
    /// [`find_slot`](Self::find_slot). Replacing a resident element hands
    /// it back to the caller; the disposal hook is not invoked.
    pub fn fill_slot(&mut self, slot: SlotIndex, elem: P::Elem) -> Option<P::Elem> {
        let _lock = self.reentrancy.lock();
        let core = self.core.as_deref_mut().expect(NOT_CREATED);
        core.fill(slot, elem)
    }

    /// Dispose the occupant of `slot` and leave a tombstone. Panics on an
    /// out-of-bounds index or a slot that holds no element.
    pub fn clear_slot(&mut self, slot: SlotIndex) {
        let _lock = self.reentrancy.lock();
        let core = self.core.as_deref_mut().expect(NOT_CREATED);
        core.clear(&self.policy, slot);
    }

    /// Insert `elem`, returning the policy-equal element it replaced, if
    /// any. May resize the table.
    pub fn insert(&mut self, elem: P::Elem) -> Option<P::Elem> {
        let hash = self.policy.hash(&elem);
        let _lock = self.reentrancy.lock();
        let core = self.core.as_deref_mut().expect(NOT_CREATED);
        let slot = core
            .find_slot_with_hash(&self.policy, &self.alloc, &elem, hash, InsertMode::Insert)
            .expect("insert-mode probe always resolves a slot");
        core.fill(slot, elem)
    }

    /// Remove and dispose the element matching `candidate`; no-op when no
    /// such element is resident.
    pub fn remove_elt(&mut self, candidate: &P::Elem) {
        self.remove_elt_with_hash(candidate, self.policy.hash(candidate));
    }

    /// Like [`remove_elt`](Self::remove_elt) with a precomputed hash.
    pub fn remove_elt_with_hash(&mut self, candidate: &P::Elem, hash: u64) {
        let _lock = self.reentrancy.lock();
        let core = self.core.as_deref_mut().expect(NOT_CREATED);
        if let Some(slot) = core.find_slot_with_hash(
            &self.policy,
            &self.alloc,
            candidate,
            hash,
            InsertMode::NoInsert,
        ) {
            core.clear(&self.policy, slot);
        }
    }

    /// Current slot-array size (always a supported prime).
    pub fn size(&self) -> usize {
        self.core.as_deref().expect(NOT_CREATED).size()
    }

    /// Live element count.
    pub fn len(&self) -> usize {
        self.core.as_deref().expect(NOT_CREATED).live()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fraction of probe steps beyond the first, per lookup, over the
    /// created lifetime of the table.
    pub fn collision_ratio(&self) -> f64 {
        let core = self.core.as_deref().expect(NOT_CREATED);
        let searches = core.searches.get();
        if searches == 0 {
            return 0.0;
        }
        core.collisions.get() as f64 / searches as f64
    }

    /// Visit every live element in raw array order, shrinking the table
    /// first when it is very sparse. The callback returns `false` to stop
    /// early. Callbacks must not change an element's hash or equality
    /// identity.
    pub fn traverse<F>(&mut self, callback: F)
    where
        F: FnMut(&mut P::Elem) -> bool,
    {
        {
            let _lock = self.reentrancy.lock();
            let core = self.core.as_deref_mut().expect(NOT_CREATED);
            let size = core.size();
            if core.live() * 8 < size && size > SHRINK_FLOOR {
                core.resize(&self.policy, &self.alloc);
            }
        }
        self.traverse_noresize(callback);
    }

    /// Visit every live element in raw array order without resizing.
    pub fn traverse_noresize<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut P::Elem) -> bool,
    {
        let core = self.core.as_deref_mut().expect(NOT_CREATED);
        for slot in core.slots.iter_mut() {
            if let Slot::Occupied(elem) = slot {
                if !callback(elem) {
                    break;
                }
            }
        }
    }
}

impl<P: ElementPolicy, A: TableAlloc> Drop for ProbeTable<P, A> {
    fn drop(&mut self) {
        if self.core.is_some() {
            self.dispose();
        }
    }
}
