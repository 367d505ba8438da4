//! Fuzz target: cargo JSON message scanning.
//!
//! Scanning arbitrary message streams must never panic.
#![no_main]

use crucible_executor::toolchain::find_executable;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = find_executable(text, false);
    let _ = find_executable(text, true);
});
