//! Fuzz target: task file loading.
//!
//! Arbitrary input must produce a store or an error, never a panic.
#![no_main]

use crucible_verifier::MemoryTaskStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = MemoryTaskStore::from_json(text);
    }
});
