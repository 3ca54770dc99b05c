#![no_main]
use arith::{decode, read_symbol_count};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary payloads must decode or fail cleanly, never panic.
    match read_symbol_count(data) {
        Ok(n) if n <= 1 << 20 => {
            let _ = decode(data);
        }
        _ => {}
    }
});
