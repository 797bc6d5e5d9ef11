//! Differential fuzzing across AES kernels.
//!
//! Every kernel the machine supports must produce the same digest for the
//! same input, for every variant and addressing mode.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slowhash::kernel_test::verify_kernels;
use slowhash::Variant;

fuzz_target!(|data: &[u8]| {
  for variant in [Variant::V0, Variant::V1, Variant::V2] {
    for light in [false, true] {
      verify_kernels(data, variant, light)
        .unwrap_or_else(|e| panic!("{e}: variant={variant:?} light={light} len={}", data.len()));
    }
  }
});
