//! Deterministic start-up delay.
//!
//! Runners launched together by a batch scheduler would otherwise hit the
//! coordinator at the same instant. Each job sleeps for a delay drawn from
//! a generator seeded by its own unique id, so a given job always waits the
//! same time while different jobs spread out.

use std::time::Duration;

use m4db_core::types::UniqueId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Seed derived from the SHA-256 of the hyphenated unique id (first 8 bytes,
/// big-endian).
pub fn jitter_seed(unique_id: &UniqueId) -> u64 {
    let digest = Sha256::digest(unique_id.hyphenated().to_string().as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(seed)
}

/// Whole-second delay in `[min_secs, max_secs]` for `unique_id`.
///
/// Bounds given in the wrong order are swapped.
pub fn jitter_delay(unique_id: &UniqueId, min_secs: u64, max_secs: u64) -> Duration {
    let (low, high) = if min_secs <= max_secs {
        (min_secs, max_secs)
    } else {
        (max_secs, min_secs)
    };
    let mut rng = StdRng::seed_from_u64(jitter_seed(unique_id));
    Duration::from_secs(rng.random_range(low..=high))
}
