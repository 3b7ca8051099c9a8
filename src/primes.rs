//! Prime sizing service: table sizes and probe-step derivation.
//!
//! Table storage is always sized to one of the primes below (a roughly
//! doubling sequence). Keeping the size prime makes every secondary probe
//! step coprime to it, so a double-hashed probe path visits all slots
//! before repeating. Callers carry the returned table index alongside the
//! size so step derivation never re-searches the table.

/// Supported table sizes, smallest first.
const PRIMES: [usize; 30] = [
    7,
    13,
    31,
    61,
    127,
    251,
    509,
    1021,
    2039,
    4093,
    8191,
    16381,
    32749,
    65521,
    131071,
    262139,
    524287,
    1048573,
    2097143,
    4194301,
    8388593,
    16777213,
    33554393,
    67108859,
    134217689,
    268435399,
    536870909,
    1073741789,
    2147483647,
    4294967291,
];

/// Smallest supported size that can hold at least `n` slots, together with
/// its index into the prime table.
///
/// Panics if `n` exceeds the largest supported size; a table that large is
/// unrepresentable and the condition is unrecoverable.
pub fn size_for_at_least(n: usize) -> (usize, u32) {
    for (i, &p) in PRIMES.iter().enumerate() {
        if p >= n {
            return (p, i as u32);
        }
    }
    panic!("requested table capacity {n} exceeds the largest supported prime size");
}

/// Primary probe position for `hash` in a table of size `PRIMES[size_index]`.
#[inline]
pub fn primary_slot(hash: u64, size_index: u32) -> usize {
    (hash % PRIMES[size_index as usize] as u64) as usize
}

/// Secondary probe step for `hash`. Nonzero and strictly less than the
/// table size, hence coprime to it.
#[inline]
pub fn probe_step(hash: u64, size_index: u32) -> usize {
    1 + (hash % (PRIMES[size_index as usize] as u64 - 2)) as usize
}
