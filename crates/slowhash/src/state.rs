//! The 200-byte sponge state and its views.
//!
//! The state is kept as the permutation's native `[u64; 25]` word array;
//! byte views are materialized explicitly instead of aliasing the words in
//! place. Word `i` corresponds to bytes `[8i, 8i+8)` of the byte image,
//! little-endian.
//!
//! Layout consumed by the rest of the crate:
//!
//! - bytes `0..64` — key material (two AES-256 keys)
//! - bytes `64..192` — the text block (eight 16-byte AES blocks)
//! - byte `0` (mod 4) — finalizer selector, after the final permutation

use digest::Digest;
use sha3::Keccak256Full;

/// Full byte size of the sponge state.
pub(crate) const STATE_BYTES: usize = 200;

/// Byte size of the text block.
pub(crate) const TEXT_BYTES: usize = 128;

/// The Keccak-1600 state, shared by absorption, mixing initialization, and
/// finalization.
#[derive(Clone)]
pub(crate) struct SpongeState {
  words: [u64; 25],
}

impl SpongeState {
  /// Absorb `input` into a fresh state.
  pub(crate) fn absorb(input: &[u8]) -> Self {
    let image = Keccak256Full::digest(input);
    let mut bytes = [0u8; STATE_BYTES];
    bytes.copy_from_slice(&image);
    Self::from_bytes(&bytes)
  }

  /// Import a pre-absorbed 200-byte state verbatim.
  pub(crate) fn from_bytes(bytes: &[u8; STATE_BYTES]) -> Self {
    let mut words = [0u64; 25];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
      let mut raw = [0u8; 8];
      raw.copy_from_slice(chunk);
      *word = u64::from_le_bytes(raw);
    }
    Self { words }
  }

  /// Export the byte image of the state.
  pub(crate) fn to_bytes(&self) -> [u8; STATE_BYTES] {
    let mut bytes = [0u8; STATE_BYTES];
    for (word, chunk) in self.words.iter().zip(bytes.chunks_exact_mut(8)) {
      chunk.copy_from_slice(&word.to_le_bytes());
    }
    bytes
  }

  /// 64-bit word `i` of the byte image.
  #[inline]
  pub(crate) fn word(&self, i: usize) -> u64 {
    self.words[i]
  }

  /// One of the two 32-byte AES keys in the key material: half 0 is bytes
  /// `0..32` (scratchpad fill), half 1 is bytes `32..64` (finalize fold).
  pub(crate) fn aes_key(&self, half: usize) -> [u8; 32] {
    debug_assert!(half < 2);
    let mut key = [0u8; 32];
    for (word, chunk) in self.words[4 * half..4 * half + 4].iter().zip(key.chunks_exact_mut(8)) {
      chunk.copy_from_slice(&word.to_le_bytes());
    }
    key
  }

  /// The text block, bytes `64..192`.
  pub(crate) fn text_block(&self) -> [u8; TEXT_BYTES] {
    let mut text = [0u8; TEXT_BYTES];
    for (word, chunk) in self.words[8..24].iter().zip(text.chunks_exact_mut(8)) {
      chunk.copy_from_slice(&word.to_le_bytes());
    }
    text
  }

  /// Overwrite the text block region.
  pub(crate) fn set_text_block(&mut self, text: &[u8; TEXT_BYTES]) {
    for (word, chunk) in self.words[8..24].iter_mut().zip(text.chunks_exact(8)) {
      let mut raw = [0u8; 8];
      raw.copy_from_slice(chunk);
      *word = u64::from_le_bytes(raw);
    }
  }

  /// Run the sponge permutation in place (state transform only, no
  /// absorption).
  pub(crate) fn permute(&mut self) {
    keccak::f1600(&mut self.words);
  }

  /// Select and run the finalizer hash over the full state image.
  ///
  /// The selector is the low two bits of state byte 0; the order is fixed by
  /// the algorithm: blake-256, groestl-256, jh-256, skein-256.
  pub(crate) fn finalize_digest(&self) -> [u8; 32] {
    let image = self.to_bytes();
    match image[0] & 3 {
      0 => blake256_digest(&image),
      1 => digest32::<groestl::Groestl256>(&image),
      2 => digest32::<jh::Jh256>(&image),
      _ => digest32::<skein::Skein256<digest::consts::U32>>(&image),
    }
  }
}

fn digest32<D: Digest>(data: &[u8]) -> [u8; 32] {
  let out = D::digest(data);
  let mut digest = [0u8; 32];
  digest.copy_from_slice(&out);
  digest
}

/// BLAKE-256 finalizer. `blake-hash` exposes its `Digest` impl through the
/// `digest` 0.9 trait family (the other finalizers use `digest` 0.10), so it
/// cannot go through the generic `digest32` helper; the output bytes are the
/// same either way.
fn blake256_digest(data: &[u8]) -> [u8; 32] {
  use blake_hash::Digest as _;
  let out = blake_hash::Blake256::digest(data);
  let mut digest = [0u8; 32];
  digest.copy_from_slice(&out);
  digest
}
