//! Property-based round-trip tests for the engine.

use proptest::prelude::*;

/// Arbitrary binary payloads up to `max_size` bytes.
pub fn arb_payload(max_size: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max_size)
}

/// Compressible text-like payloads: a short alphabet repeated with noise.
pub fn arb_text_payload(max_size: usize) -> impl Strategy<Value = Vec<u8>> {
    (prop::collection::vec(prop::sample::select(b"abcdefgh \n".to_vec()), 1..64), 1..max_size)
        .prop_map(|(unit, len)| unit.iter().cycle().take(len).copied().collect())
}
