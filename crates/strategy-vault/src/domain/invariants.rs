//! # Domain Invariants
//!
//! Business rules checked by tests and debug assertions.

use super::entities::{AllocationTable, PendingClaimRegistry};
use super::value_objects::{Address, MAX_BPS};

/// Invariant: Weight sum.
///
/// Once allocations are set, target weights across all entries sum to
/// exactly 10000. A table where nothing has been allocated yet (all zero)
/// also passes.
pub fn invariant_weight_sum(table: &AllocationTable) -> bool {
    let sum: u32 = table
        .entries()
        .iter()
        .map(|e| u32::from(e.target_weight))
        .sum();
    sum == 0 || sum == u32::from(MAX_BPS)
}

/// Invariant: Weight within cap.
///
/// `target_weight <= cap_weight <= 10000` for every entry.
pub fn invariant_within_cap(table: &AllocationTable) -> bool {
    table
        .entries()
        .iter()
        .all(|e| e.target_weight <= e.cap_weight && e.cap_weight <= MAX_BPS)
}

/// Invariant: Pending consistency.
///
/// An owner's pending total equals the sum of their open requests.
pub fn invariant_pending_consistent(registry: &PendingClaimRegistry, owner: Address) -> bool {
    let outstanding: u128 = registry
        .open_requests(owner)
        .iter()
        .map(|&(_, _, assets)| assets)
        .sum();
    registry.pending_of(owner) == outstanding
}
