//! NEON crypto-extension kernel (aarch64).
//!
//! `vaeseq_u8` XORs its key operand *before* SubBytes/ShiftRows, so the
//! round is assembled as AESE against zero, AESMC for MixColumns, then an
//! explicit XOR with the round key.
//!
//! # Safety
//!
//! Uses `unsafe` for ARM SIMD intrinsics. The dispatcher only selects this
//! kernel after verifying `aarch64::AES_READY` capabilities.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::arch::aarch64::*;

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
  let b = vld1q_u8(block.as_ptr());
  let k = vld1q_u8(key.as_ptr());
  let r = veorq_u8(vaesmcq_u8(vaeseq_u8(b, vdupq_n_u8(0))), k);
  vst1q_u8(block.as_mut_ptr(), r);
}

#[target_feature(enable = "aes")]
unsafe fn pseudo_round_impl(text: &mut [u8; 128], keys: &RoundKeys) {
  let zero = vdupq_n_u8(0);
  let mut rk = [zero; 10];
  for (dst, src) in rk.iter_mut().zip(keys.iter()) {
    *dst = vld1q_u8(src.as_ptr());
  }
  for offset in (0..128).step_by(16) {
    let ptr = text.as_mut_ptr().add(offset);
    let mut b = vld1q_u8(ptr);
    for k in &rk {
      b = veorq_u8(vaesmcq_u8(vaeseq_u8(b, zero)), *k);
    }
    vst1q_u8(ptr, b);
  }
}
