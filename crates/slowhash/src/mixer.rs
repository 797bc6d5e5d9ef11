//! The algorithmic core: scratchpad fill, the pointer-chasing mixing loop,
//! and the fold back into the text block.
//!
//! The mixing loop is monomorphized over the variant selector, so the hot
//! loop carries no per-iteration variant branches; the AES round goes
//! through the kernel table resolved at context construction.
//!
//! Every round's scratchpad address depends on the value produced by the
//! previous access. That dependency chain is the memory-hardness property —
//! nothing here may be reordered, batched, or parallelized.

use crate::block::{self, Reg};
use crate::kernels::{expand_round_keys, AesFns};
use crate::params::{Variant, SEGMENT_BYTES};
use crate::state::SpongeState;
use crate::variant::{self, V2Math};

/// 16-byte-aligned offset of the block addressed by `x`.
///
/// `addressable_blocks` is a power of two, so the modulo compiles to the
/// reference's mask; light mode shows up here only as a smaller block count.
#[inline]
pub(crate) fn block_offset(x: u64, addressable_blocks: usize) -> usize {
  ((x >> 4) as usize % addressable_blocks) * 16
}

/// Deterministically fill the first `segments` 128-byte segments of the
/// scratchpad from the state's text block.
///
/// The text block carries forward between segments: each segment's
/// ciphertext is the next segment's plaintext.
pub(crate) fn fill(aes: &AesFns, state: &SpongeState, sp: &mut [u8], segments: usize) {
  let keys = expand_round_keys(&state.aes_key(0));
  let mut text = state.text_block();
  for segment in sp.chunks_exact_mut(SEGMENT_BYTES).take(segments) {
    (aes.pseudo_round)(&mut text, &keys);
    segment.copy_from_slice(&text);
  }
}

/// Register seeds and per-hash constants for the mixing loop, all derived
/// from key material before the first round.
pub(crate) struct MixInit {
  a: Reg,
  b: Reg,
  b1: Reg,
  math: V2Math,
  tweak: u64,
}

impl MixInit {
  pub(crate) fn new(state: &SpongeState, variant: Variant, input: &[u8]) -> Self {
    let a = Reg {
      lo: state.word(0) ^ state.word(4),
      hi: state.word(1) ^ state.word(5),
    };
    let b = Reg {
      lo: state.word(2) ^ state.word(6),
      hi: state.word(3) ^ state.word(7),
    };

    let (b1, math) = if variant == Variant::V2 {
      (
        Reg {
          lo: state.word(8) ^ state.word(10),
          hi: state.word(9) ^ state.word(11),
        },
        V2Math {
          division: state.word(12),
          sqrt: state.word(13),
        },
      )
    } else {
      (Reg { lo: 0, hi: 0 }, V2Math::default())
    };

    let tweak = if variant == Variant::V1 {
      variant::v1_tweak(state.word(24), input)
    } else {
      0
    };

    Self { a, b, b1, math, tweak }
  }
}

/// The mixing loop. `V` is the variant selector; all output is the mutated
/// scratchpad.
pub(crate) fn mix<const V: u8>(
  aes: &AesFns,
  init: &MixInit,
  sp: &mut [u8],
  rounds: usize,
  addressable_blocks: usize,
) {
  let mut a = init.a;
  let mut b = init.b;
  let mut b1 = init.b1;
  let mut math = init.math;
  let tweak = init.tweak;

  for _ in 0..rounds {
    // First half: one AES round keyed by `a`.
    let j = block_offset(a.lo, addressable_blocks);
    let mut c_bytes = block::load_block(sp, j);
    (aes.single_round)(&mut c_bytes, &a.to_bytes());
    let c = Reg::from_bytes(&c_bytes);

    if V == 2 {
      variant::v2_shuffle_add(sp, j, b1, b, a);
    }
    block::store_reg(sp, j, c.xor(b));
    if V == 1 {
      variant::v1_tweak_byte(sp, j);
    }

    // Second half: 64×64→128 multiply against the block `c` points at.
    let j2 = block_offset(c.lo, addressable_blocks);
    let mut d = block::load_reg(sp, j2);
    if V == 2 {
      math.step(&mut d, c);
    }

    let (mut hi, mut lo) = mul128(c.lo, d.lo);
    if V == 2 {
      // Sequential: the first sibling chunk absorbs the product, then the
      // second folds back into it, then the chunks rotate.
      block::xor_u64(sp, j2 ^ 0x10, hi);
      block::xor_u64(sp, (j2 ^ 0x10) + 8, lo);
      hi ^= block::read_u64(sp, j2 ^ 0x20);
      lo ^= block::read_u64(sp, (j2 ^ 0x20) + 8);
      variant::v2_shuffle_add(sp, j2, b1, b, a);
    }

    a.lo = a.lo.wrapping_add(hi);
    a.hi = a.hi.wrapping_add(lo);
    block::store_reg(sp, j2, a);
    if V == 1 {
      block::xor_u64(sp, j2 + 8, tweak);
    }
    a = a.xor(d);

    if V == 2 {
      b1 = b;
    }
    b = c;
  }
}

/// Fold the scratchpad back into the text block and write it into the state.
///
/// Forward order, same segment geometry as [`fill`], second AES-256 key.
pub(crate) fn fold(aes: &AesFns, state: &mut SpongeState, sp: &[u8], segments: usize) {
  let keys = expand_round_keys(&state.aes_key(1));
  let mut text = state.text_block();
  for segment in sp.chunks_exact(SEGMENT_BYTES).take(segments) {
    for (t, s) in text.iter_mut().zip(segment) {
      *t ^= s;
    }
    (aes.pseudo_round)(&mut text, &keys);
  }
  state.set_text_block(&text);
}

#[inline]
fn mul128(x: u64, y: u64) -> (u64, u64) {
  let wide = u128::from(x) * u128::from(y);
  ((wide >> 64) as u64, wide as u64)
}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::vec;

  use proptest::prelude::*;

  use super::*;
  use crate::kernels::{self, KernelId};

  fn portable() -> &'static AesFns {
    kernels::fns(KernelId::Portable)
  }

  #[test]
  fn mul128_widening() {
    assert_eq!(mul128(0, u64::MAX), (0, 0));
    assert_eq!(mul128(1, u64::MAX), (0, u64::MAX));
    assert_eq!(mul128(u64::MAX, u64::MAX), (u64::MAX - 1, 1));
    assert_eq!(mul128(1 << 32, 1 << 32), (1, 0));
  }

  #[test]
  fn seeds_derive_from_key_material() {
    let state = SpongeState::absorb(b"mix seed test input, at least 43 bytes long");
    let init = MixInit::new(&state, Variant::V0, b"");
    assert_eq!(init.a.lo, state.word(0) ^ state.word(4));
    assert_eq!(init.a.hi, state.word(1) ^ state.word(5));
    assert_eq!(init.b.lo, state.word(2) ^ state.word(6));
    assert_eq!(init.b.hi, state.word(3) ^ state.word(7));
    // Variant-2 state stays zeroed outside variant 2.
    assert_eq!(init.b1, Reg { lo: 0, hi: 0 });
    assert_eq!(init.math.division, 0);

    let init2 = MixInit::new(&state, Variant::V2, b"");
    assert_eq!(init2.b1.lo, state.word(8) ^ state.word(10));
    assert_eq!(init2.b1.hi, state.word(9) ^ state.word(11));
    assert_eq!(init2.math.division, state.word(12));
    assert_eq!(init2.math.sqrt, state.word(13));
  }

  #[test]
  fn fill_carries_text_forward() {
    let state = SpongeState::absorb(b"fill test");
    let mut sp = vec![0u8; 512];
    fill(portable(), &state, &mut sp, 4);

    // First segment is one pseudo-round pass over the original text block.
    let keys = expand_round_keys(&state.aes_key(0));
    let mut text = state.text_block();
    (portable().pseudo_round)(&mut text, &keys);
    assert_eq!(&sp[..128], &text[..]);

    // Second segment continues from the first, it is not a restart.
    (portable().pseudo_round)(&mut text, &keys);
    assert_eq!(&sp[128..256], &text[..]);
  }

  #[test]
  fn fill_respects_segment_count() {
    let state = SpongeState::absorb(b"fill bounds");
    let mut sp = vec![0u8; 512];
    fill(portable(), &state, &mut sp, 2);
    assert!(sp[256..].iter().all(|&b| b == 0));
    assert!(sp[..256].iter().any(|&b| b != 0));
  }

  #[test]
  fn mix_is_deterministic_and_mutates() {
    let state = SpongeState::absorb(b"mix determinism test, at least 43 bytes ok!");
    let blocks = 1024 / 16;

    let run = |variant: Variant| {
      let mut sp = vec![0u8; 1024];
      fill(portable(), &state, &mut sp, 1024 / SEGMENT_BYTES);
      let before = sp.clone();
      let init = MixInit::new(&state, variant, b"mix determinism test, at least 43 bytes ok!");
      match variant {
        Variant::V0 => mix::<0>(portable(), &init, &mut sp, 64, blocks),
        Variant::V1 => mix::<1>(portable(), &init, &mut sp, 64, blocks),
        Variant::V2 => mix::<2>(portable(), &init, &mut sp, 64, blocks),
      }
      assert_ne!(sp, before, "{variant:?} must mutate the scratchpad");
      sp
    };

    for variant in [Variant::V0, Variant::V1, Variant::V2] {
      assert_eq!(run(variant), run(variant), "{variant:?} must be deterministic");
    }
    // Variants genuinely diverge.
    assert_ne!(run(Variant::V0), run(Variant::V1));
    assert_ne!(run(Variant::V0), run(Variant::V2));
  }

  #[test]
  fn fold_reads_original_text_block() {
    let state = SpongeState::absorb(b"fold test");
    let mut sp = vec![0u8; 256];
    fill(portable(), &state, &mut sp, 2);

    let mut folded = state.clone();
    fold(portable(), &mut folded, &sp, 2);

    // Manual forward fold.
    let keys = expand_round_keys(&state.aes_key(1));
    let mut text = state.text_block();
    for segment in sp.chunks_exact(SEGMENT_BYTES) {
      for (t, s) in text.iter_mut().zip(segment) {
        *t ^= s;
      }
      (portable().pseudo_round)(&mut text, &keys);
    }
    assert_eq!(folded.text_block(), text);
    // Key material is untouched by the fold.
    assert_eq!(
      &folded.to_bytes()[..64],
      &state.to_bytes()[..64]
    );
  }

  proptest! {
    /// Every produced offset is 16-byte aligned and inside the addressable
    /// range, for full and light addressing.
    #[test]
    fn block_offset_in_bounds(x in any::<u64>(), light in any::<bool>()) {
      let page_size = 1usize << 16;
      let blocks = (page_size / 16) / if light { 2 } else { 1 };
      let offset = block_offset(x, blocks);
      prop_assert_eq!(offset % 16, 0);
      prop_assert!(offset + 16 <= page_size / if light { 2 } else { 1 }, "offset out of bounds");
    }

    /// Classic geometry reduces to the reference mask.
    #[test]
    fn block_offset_matches_reference_mask(x in any::<u64>()) {
      let blocks = (1usize << 21) / 16;
      prop_assert_eq!(block_offset(x, blocks) as u64, x & 0x1f_fff0);
    }
  }
}
