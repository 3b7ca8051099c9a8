//! Element policy: the capability bundle a table is parameterized over.

use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;

/// Hashing, equality, and disposal behavior for a table's element type.
///
/// Policies are selected at compile time; a zero-sized policy adds no
/// per-table storage and no dispatch overhead. `dispose` runs exactly once
/// for every element that leaves the table through `dispose`, `empty`,
/// `clear_slot`, or removal; elements moved during a resize are never
/// disposed. The default implementation simply drops the element, which is
/// the right ownership-release behavior for most Rust element types.
pub trait ElementPolicy {
    type Elem;

    fn hash(&self, elem: &Self::Elem) -> u64;

    /// Whether a resident element matches a lookup candidate. Two elements
    /// with equal hashes need not be equal.
    fn equal(&self, existing: &Self::Elem, candidate: &Self::Elem) -> bool;

    fn dispose(&self, elem: Self::Elem) {
        drop(elem);
    }
}

/// Policy adapter for element types that already implement `Hash + Eq`,
/// hashing through a `BuildHasher` (default `RandomState`).
pub struct HashedPolicy<T, S = RandomState> {
    build: S,
    _marker: PhantomData<fn(&T)>,
}

impl<T, S: BuildHasher> HashedPolicy<T, S> {
    pub fn with_hasher(build: S) -> Self {
        Self {
            build,
            _marker: PhantomData,
        }
    }
}

impl<T, S: BuildHasher + Default> Default for HashedPolicy<T, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T: Hash + Eq, S: BuildHasher> ElementPolicy for HashedPolicy<T, S> {
    type Elem = T;

    fn hash(&self, elem: &T) -> u64 {
        self.build.hash_one(elem)
    }

    fn equal(&self, existing: &T, candidate: &T) -> bool {
        existing == candidate
    }
}
