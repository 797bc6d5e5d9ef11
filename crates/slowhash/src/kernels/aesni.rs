//! AES-NI kernel (x86_64).
//!
//! `_mm_aesenc_si128` is exactly the round the algorithm needs: SubBytes,
//! ShiftRows, MixColumns, then XOR with the round key.
//!
//! # Safety
//!
//! Uses `unsafe` for x86 SIMD intrinsics. The dispatcher only selects this
//! kernel after verifying `x86::AES_READY` capabilities.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::arch::x86_64::*;

use super::RoundKeys;

pub(crate) fn single_round(block: &mut [u8; 16], key: &[u8; 16]) {
  // SAFETY: AES_READY was verified before this kernel was selected.
  unsafe { single_round_impl(block, key) }
}

pub(crate) fn pseudo_round(text: &mut [u8; 128], keys: &RoundKeys) {
  // SAFETY: AES_READY was verified before this kernel was selected.
  unsafe { pseudo_round_impl(text, keys) }
}

#[target_feature(enable = "aes")]
unsafe fn single_round_impl(block: &mut [u8; 16], key: &[u8; 16]) {
  let b = _mm_loadu_si128(block.as_ptr().cast());
  let k = _mm_loadu_si128(key.as_ptr().cast());
  _mm_storeu_si128(block.as_mut_ptr().cast(), _mm_aesenc_si128(b, k));
}

#[target_feature(enable = "aes")]
unsafe fn pseudo_round_impl(text: &mut [u8; 128], keys: &RoundKeys) {
  let mut rk = [_mm_setzero_si128(); 10];
  for (dst, src) in rk.iter_mut().zip(keys.iter()) {
    *dst = _mm_loadu_si128(src.as_ptr().cast());
  }
  for offset in (0..128).step_by(16) {
    let ptr = text.as_mut_ptr().add(offset);
    let mut b = _mm_loadu_si128(ptr.cast());
    for k in &rk {
      b = _mm_aesenc_si128(b, *k);
    }
    _mm_storeu_si128(ptr.cast(), b);
  }
}
