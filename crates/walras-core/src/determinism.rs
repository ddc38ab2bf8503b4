//! Outcome fingerprints for reproducibility checks.
//!
//! Two runs over the same market and starting prices must agree on every
//! price and every matched pair. The `outcome_root` is a SHA-256 hash over
//! those values that lets callers compare runs without diffing payloads.

use sha2::{Digest, Sha256};
use walras_types::{ClearingOutcome, constants};

/// Compute the fingerprint of a clearing outcome.
///
/// This is a deterministic hash that depends on:
/// - Seller prices (ascending seller order)
/// - Matched pairs (ascending buyer order)
/// - Total value and round count
#[must_use]
pub fn compute_outcome_root(outcome: &ClearingOutcome) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(constants::OUTCOME_ROOT_DOMAIN);

    hasher.update((outcome.prices.len() as u64).to_le_bytes());
    for (seller, price) in outcome.prices.iter() {
        hasher.update(seller.raw().to_le_bytes());
        // Normalized so 2 and 2.00 hash alike.
        hasher.update(price.normalize().to_string().as_bytes());
        hasher.update(b";");
    }

    hasher.update((outcome.matching.len() as u64).to_le_bytes());
    for (buyer, seller) in outcome.matching.iter() {
        hasher.update(buyer.raw().to_le_bytes());
        hasher.update(seller.raw().to_le_bytes());
    }

    hasher.update(outcome.total_value.normalize().to_string().as_bytes());
    hasher.update(outcome.rounds.to_le_bytes());

    let result = hasher.finalize();
    let mut root = [0u8; 32];
    root.copy_from_slice(&result);
    root
}

/// Verify that `outcome` hashes to `expected_root`.
#[must_use]
pub fn verify_outcome_root(outcome: &ClearingOutcome, expected_root: &[u8; 32]) -> bool {
    compute_outcome_root(outcome) == *expected_root
}
