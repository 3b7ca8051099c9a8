//! Slot storage, probe engine, and resize engine.
//!
//! `TableCore` owns the prime-sized slot array and the bookkeeping counters;
//! the public wrapper in `table.rs` layers lifecycle handling and the
//! reentrancy discipline on top. Probing is double hashing: a primary
//! position plus a hash-derived step, both obtained from the prime sizing
//! service so the step is always coprime to the array length.

use core::cell::Cell;
use core::mem;

use crate::alloc::TableAlloc;
use crate::policy::ElementPolicy;
use crate::primes;

/// One slot of table storage.
#[derive(Debug)]
pub enum Slot<T> {
    /// Never occupied since the array was last allocated or cleared.
    Empty,
    /// Previously occupied, now deleted. Kept non-empty so probe sequences
    /// passing through it still continue; reusable for insertion.
    Tombstone,
    /// A live element.
    Occupied(T),
}

/// Position of a resolved slot inside a table's array.
///
/// A `SlotIndex` stays valid only until the table resizes; any insert-mode
/// probe or traversal may resize. Using a stale index is misuse and panics
/// in `clear_slot`/`fill_slot` when it no longer refers to a slot in the
/// expected state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SlotIndex(pub(crate) usize);

/// Miss behavior for slot resolution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertMode {
    /// Resolve only existing elements; a miss yields no slot.
    NoInsert,
    /// Reserve a slot for the element on a miss, resizing first if the
    /// table is too full.
    Insert,
}

/// Shrinking (on resize or pre-traversal) only applies above this size;
/// smaller tables stay as they are even when sparse.
pub(crate) const SHRINK_FLOOR: usize = 32;

/// Slot array plus control state.
pub(crate) struct TableCore<T> {
    pub(crate) slots: Box<[Slot<T>]>,
    /// Index of `slots.len()` in the prime table; probe steps are derived
    /// from it without re-searching.
    pub(crate) size_index: u32,
    /// Occupied plus tombstone slots.
    pub(crate) n_elements: usize,
    /// Tombstone slots only.
    pub(crate) n_deleted: usize,
    pub(crate) searches: Cell<u64>,
    pub(crate) collisions: Cell<u64>,
}

impl<T> Default for TableCore<T> {
    fn default() -> Self {
        Self {
            slots: Box::default(),
            size_index: 0,
            n_elements: 0,
            n_deleted: 0,
            searches: Cell::new(0),
            collisions: Cell::new(0),
        }
    }
}

impl<T> TableCore<T> {
    pub(crate) fn size(&self) -> usize {
        self.slots.len()
    }

    /// Live element count (occupied slots only).
    pub(crate) fn live(&self) -> usize {
        self.n_elements - self.n_deleted
    }

    /// Read-only probe for an element matching `candidate` under `hash`.
    pub(crate) fn find_with_hash<P>(&self, policy: &P, candidate: &T, hash: u64) -> Option<&T>
    where
        P: ElementPolicy<Elem = T>,
    {
        self.searches.set(self.searches.get() + 1);
        let size = self.size();
        let mut index = primes::primary_slot(hash, self.size_index);

        match &self.slots[index] {
            Slot::Empty => return None,
            Slot::Occupied(e) if policy.equal(e, candidate) => return Some(e),
            _ => {}
        }

        let step = primes::probe_step(hash, self.size_index);
        loop {
            self.collisions.set(self.collisions.get() + 1);
            index += step;
            if index >= size {
                index -= size;
            }
            match &self.slots[index] {
                Slot::Empty => return None,
                Slot::Occupied(e) if policy.equal(e, candidate) => return Some(e),
                _ => {}
            }
        }
    }

    /// Resolve the slot for `candidate` under `hash`.
    ///
    /// In `Insert` mode this never returns `None`: the result is either the
    /// slot of a policy-equal resident element or a reserved slot (left
    /// `Empty`) that the caller must fill before issuing further probes.
    /// The first tombstone on the probe path is reclaimed in preference to
    /// extending into a fresh empty slot.
    pub(crate) fn find_slot_with_hash<P, A>(
        &mut self,
        policy: &P,
        alloc: &A,
        candidate: &T,
        hash: u64,
        mode: InsertMode,
    ) -> Option<SlotIndex>
    where
        P: ElementPolicy<Elem = T>,
        A: TableAlloc,
    {
        if mode == InsertMode::Insert && self.size() * 3 <= self.n_elements * 4 {
            self.resize(policy, alloc);
        }

        self.searches.set(self.searches.get() + 1);
        let size = self.size();
        let mut index = primes::primary_slot(hash, self.size_index);
        let mut step = 0;
        let mut first_tombstone = None;

        loop {
            match &self.slots[index] {
                Slot::Empty => break,
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Slot::Occupied(e) => {
                    if policy.equal(e, candidate) {
                        return Some(SlotIndex(index));
                    }
                }
            }
            if step == 0 {
                step = primes::probe_step(hash, self.size_index);
            }
            self.collisions.set(self.collisions.get() + 1);
            index += step;
            if index >= size {
                index -= size;
            }
        }

        if mode == InsertMode::NoInsert {
            return None;
        }

        if let Some(reclaimed) = first_tombstone {
            self.n_deleted -= 1;
            self.slots[reclaimed] = Slot::Empty;
            return Some(SlotIndex(reclaimed));
        }

        self.n_elements += 1;
        Some(SlotIndex(index))
    }

    /// Write `elem` into a slot previously resolved by `find_slot_with_hash`,
    /// returning the displaced element on replacement.
    pub(crate) fn fill(&mut self, slot: SlotIndex, elem: T) -> Option<T> {
        let size = self.size();
        let target = self
            .slots
            .get_mut(slot.0)
            .unwrap_or_else(|| panic!("slot index {} out of bounds for table of size {size}", slot.0));
        if matches!(target, Slot::Tombstone) {
            panic!("fill_slot on a deleted slot; slots must come from an insert-mode probe");
        }
        match mem::replace(target, Slot::Occupied(elem)) {
            Slot::Empty => None,
            Slot::Occupied(old) => Some(old),
            Slot::Tombstone => unreachable!(),
        }
    }

    /// Dispose the occupant of `slot` and leave a tombstone behind.
    pub(crate) fn clear<P>(&mut self, policy: &P, slot: SlotIndex)
    where
        P: ElementPolicy<Elem = T>,
    {
        let size = self.size();
        let target = self
            .slots
            .get_mut(slot.0)
            .unwrap_or_else(|| panic!("slot index {} out of bounds for table of size {size}", slot.0));
        match mem::replace(target, Slot::Tombstone) {
            Slot::Occupied(elem) => {
                self.n_deleted += 1;
                policy.dispose(elem);
            }
            Slot::Empty => panic!("clear_slot on an empty slot"),
            Slot::Tombstone => panic!("clear_slot on an already deleted slot"),
        }
    }

    /// Rehash into a new array, growing or shrinking per the load rule.
    ///
    /// A rehash at unchanged size is still useful: tombstones are dropped by
    /// omission, which is the only mechanism that ever returns `n_deleted`
    /// to zero. All previously issued `SlotIndex` values are invalidated.
    pub(crate) fn resize<P, A>(&mut self, policy: &P, alloc: &A)
    where
        P: ElementPolicy<Elem = T>,
        A: TableAlloc,
    {
        let old_size = self.size();
        let elts = self.live();

        // Change size only when the table, after discounting tombstones,
        // is either too full or very sparse.
        let (new_size, new_index) = if elts * 2 > old_size
            || (elts * 8 < old_size && old_size > SHRINK_FLOOR)
        {
            primes::size_for_at_least(elts * 2)
        } else {
            (old_size, self.size_index)
        };

        let mut old = mem::replace(&mut self.slots, alloc.alloc_slots(new_size));
        self.size_index = new_index;
        self.n_elements = elts;
        self.n_deleted = 0;

        for i in 0..old.len() {
            if let Slot::Occupied(elem) = mem::replace(&mut old[i], Slot::Empty) {
                let dest = self.slot_for_rehash(policy.hash(&elem));
                self.slots[dest] = Slot::Occupied(elem);
            }
        }
        alloc.free_slots(old);
    }

    /// Empty-slot search used while rehashing. The destination array is
    /// freshly allocated, so this never compares elements and never meets a
    /// tombstone; finding one means the structure is corrupted.
    fn slot_for_rehash(&self, hash: u64) -> usize {
        let size = self.size();
        let mut index = primes::primary_slot(hash, self.size_index);
        match self.slots[index] {
            Slot::Empty => return index,
            Slot::Tombstone => panic!("deleted slot in a fresh array; table state is corrupted"),
            Slot::Occupied(_) => {}
        }
        let step = primes::probe_step(hash, self.size_index);
        loop {
            index += step;
            if index >= size {
                index -= size;
            }
            match self.slots[index] {
                Slot::Empty => return index,
                Slot::Tombstone => {
                    panic!("deleted slot in a fresh array; table state is corrupted")
                }
                Slot::Occupied(_) => {}
            }
        }
    }
}
