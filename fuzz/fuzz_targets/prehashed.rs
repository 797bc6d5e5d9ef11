//! Fuzz the pre-absorbed entry point.
//!
//! Arbitrary 200-byte states must hash deterministically and identically
//! across kernels; any other length must be rejected before computation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slowhash::kernel_test::reduced_params;
use slowhash::kernels;
use slowhash::{Error, HashContext, Variant};

fuzz_target!(|data: &[u8]| {
  let params = reduced_params(Variant::V2, false);

  if data.len() != 200 {
    let mut ctx = HashContext::new(params).unwrap();
    assert!(matches!(
      ctx.hash_prehashed(data),
      Err(Error::BadPrehashedLength { .. })
    ));
    return;
  }

  let caps = platform::caps();
  let mut reference = None;
  for &id in kernels::ALL {
    if !caps.has(id.required_caps()) {
      continue;
    }
    let mut ctx = HashContext::with_kernel(params, id).unwrap();
    let digest = ctx.hash_prehashed(data).unwrap();
    match reference {
      None => reference = Some(digest),
      Some(expected) => assert_eq!(digest, expected, "kernel {} diverged", id.as_str()),
    }
  }
});
