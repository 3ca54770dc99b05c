#![no_main]
use arith::{decode_with, encode_with, CoderConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u8)| {
    let (input, knob) = data;
    // 9 to 16 count bits over a 24-bit interval
    let count_bits = (knob % 8) as u32 + 9;
    let divisor = (knob >> 3) as u64 % 3 + 2;
    let config = CoderConfig::new(24, count_bits, divisor).unwrap();

    let encoded = encode_with(&input, config).unwrap();
    let decoded = decode_with(&encoded, config).unwrap();
    assert_eq!(input, decoded);
});
