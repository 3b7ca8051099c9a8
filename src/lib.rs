//! probe-table: a single-threaded, open-addressing hash table engine with
//! double hashing, tombstone deletion, and compile-time policy injection.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a reusable element table (e.g. for symbol or interning tables
//!   inside a larger host) built in small, independently verifiable layers.
//! - Layers:
//!   - primes: sizing service; table sizes are always primes from a fixed
//!     doubling sequence, and both probe positions derive from the stored
//!     table index, so the secondary step is always coprime to the size.
//!   - raw::TableCore<T>: slot array, probe engine (find / slot
//!     resolution / tombstone reclamation), and resize engine. Knows
//!     nothing about lifecycle or which policy instance it serves.
//!   - ProbeTable<P, A>: public surface adding lifecycle (create /
//!     dispose / empty), traversal, diagnostics, and the debug-only
//!     reentrancy discipline.
//!
//! Constraints
//! - Single-threaded: the control block carries `Cell` counters and is
//!   `!Sync`; callers serialize access.
//! - Elements are stored by value; the table stores no keys and no
//!   per-entry heap allocations of its own.
//! - Customization (hash, equality, disposal, storage) is selected at
//!   compile time via the `ElementPolicy` and `TableAlloc` traits; no
//!   runtime virtual dispatch anywhere.
//! - Failure model: lookup misses and absent-element removals are ordinary
//!   `Option`/no-op results. Misuse (operations on an uncreated table,
//!   invalid slot indices) and corrupted invariants panic; allocation
//!   failure aborts through the global allocator. Nothing is reported as a
//!   recoverable error because no operation has a transient failure mode.
//!
//! Reentrancy policy
//! - The table calls user code through the policy (hash, equality,
//!   disposal) and through traversal callbacks. Public entry points hold a
//!   debug-only reentrancy token while internal state may be transiently
//!   inconsistent; nested entry panics in debug builds and is free in
//!   release builds. Traversal callbacks run outside the token since the
//!   structure is consistent there and the borrow checker already denies
//!   safe reentry.
//!
//! Slot-handle semantics
//! - `find_slot` resolves to a `SlotIndex` (a position into the owned
//!   array) rather than a reference, because any insert-mode probe or
//!   `traverse` may rehash into a new array and would otherwise leave
//!   dangling references. A resize invalidates all previously issued
//!   indices; the fill/clear operations panic when handed a slot in an
//!   unexpected state.
//!
//! Notes and non-goals
//! - No internal synchronization; concurrent access must be serialized by
//!   the caller.
//! - No persistence or serialization of the table.
//! - No ordered iteration: traversal order is raw storage order.
//! - No key/value split; the table stores opaque elements and the policy
//!   defines their identity.

mod alloc;
mod policy;
pub mod primes;
mod raw;
mod reentrancy;
mod table;
mod table_proptest;

// Public surface
pub use alloc::{HeapAlloc, TableAlloc};
pub use policy::{ElementPolicy, HashedPolicy};
pub use raw::{InsertMode, Slot, SlotIndex};
pub use table::{HashedTable, ProbeTable};
