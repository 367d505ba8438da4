//! Fuzz target: output normalization.
//!
//! Normalizing is idempotent and normalized comparison accepts anything
//! exact comparison accepts.
#![no_main]

use crucible_verifier::{normalize, OutputMatch};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (expected, actual) = data;

    let once = normalize(actual);
    assert_eq!(normalize(&once), once, "normalize must be idempotent");

    if OutputMatch::Exact.matches(expected, actual) {
        assert!(OutputMatch::Normalized.matches(expected, actual));
    }
});
