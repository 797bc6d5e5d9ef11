//! Hashing parameters and their validation.
//!
//! A [`Params`] value fully determines the digest for a given input: the
//! algorithm variant, light-mode addressing, scratchpad geometry, and the
//! mixing-loop length. Validation happens eagerly — before any allocation or
//! computation — and never silently adjusts a value, since any adjustment
//! would change the output.

use crate::error::Error;

/// Scratchpad block granularity: every access is a 16-byte-aligned block.
pub const BLOCK_BYTES: usize = 16;

/// Fill/finalize segment granularity: the text block is 128 bytes.
pub const SEGMENT_BYTES: usize = 128;

/// Minimum input length for variant 1 (tweak window is `[35, 43)`).
pub const V1_MIN_INPUT: usize = 43;

/// Algorithm variant selector.
///
/// Variants are backward-compatible tweaks to the base algorithm; each one
/// changes the digest for every input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
  /// The original algorithm.
  #[default]
  V0,
  /// Byte/word obfuscation tweaks; requires inputs of at least 43 bytes.
  V1,
  /// Integer-math and chunk-shuffle steps.
  V2,
}

impl Variant {
  /// Numeric selector, matching the reference's `variant` argument.
  #[inline]
  #[must_use]
  pub const fn as_u8(self) -> u8 {
    match self {
      Self::V0 => 0,
      Self::V1 => 1,
      Self::V2 => 2,
    }
  }
}

/// Tuning parameters for one hashing context.
///
/// Immutable for the duration of a hash call. The presets mirror the
/// parameter sets the algorithm family shipped with; any custom combination
/// that passes [`validate()`](Params::validate) is accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Params {
  /// Algorithm variant.
  pub variant: Variant,
  /// Restrict addressing to half the scratchpad blocks.
  pub light: bool,
  /// Scratchpad size in bytes. Power of two, multiple of 128.
  pub page_size: u32,
  /// Bytes written by the fill pass and folded by the finalize pass.
  /// Multiple of 128, at most `page_size`.
  pub scratchpad_init_size: u32,
  /// Total scratchpad touches; the mixing loop runs half this many rounds.
  /// Even, nonzero.
  pub iteration_count: u32,
}

impl Params {
  /// Classic parameters: 2 MiB scratchpad, 524288 iterations.
  #[inline]
  #[must_use]
  pub const fn classic(variant: Variant) -> Self {
    Self {
      variant,
      light: false,
      page_size: 1 << 21,
      scratchpad_init_size: 1 << 21,
      iteration_count: 1 << 19,
    }
  }

  /// Light parameters: 1 MiB scratchpad, 262144 iterations, halved
  /// addressing range.
  #[inline]
  #[must_use]
  pub const fn lite(variant: Variant) -> Self {
    Self {
      variant,
      light: true,
      page_size: 1 << 20,
      scratchpad_init_size: 1 << 20,
      iteration_count: 1 << 18,
    }
  }

  /// Check every structural precondition.
  ///
  /// # Errors
  ///
  /// Returns the first violated precondition; see [`Error`].
  pub fn validate(&self) -> Result<(), Error> {
    let page = self.page_size;
    if page == 0 || !page.is_power_of_two() || page % SEGMENT_BYTES as u32 != 0 {
      return Err(Error::BadPageSize { page_size: page });
    }
    let init = self.scratchpad_init_size;
    if init == 0 || init % SEGMENT_BYTES as u32 != 0 || init > page {
      return Err(Error::BadInitSize {
        init_size: init,
        page_size: page,
      });
    }
    let iters = self.iteration_count;
    if iters == 0 || iters % 2 != 0 {
      return Err(Error::BadIterationCount { iterations: iters });
    }
    Ok(())
  }

  /// Number of 128-byte segments the fill and finalize passes process.
  #[inline]
  #[must_use]
  pub(crate) fn init_segments(&self) -> usize {
    self.scratchpad_init_size as usize / SEGMENT_BYTES
  }

  /// Number of mixing-loop rounds (two scratchpad touches each).
  #[inline]
  #[must_use]
  pub(crate) fn mix_rounds(&self) -> usize {
    self.iteration_count as usize / 2
  }

  /// Number of addressable 16-byte blocks, after the light-mode divisor.
  ///
  /// Power of two by construction, so the addressing modulo reduces to the
  /// reference's mask.
  #[inline]
  #[must_use]
  pub(crate) fn addressable_blocks(&self) -> usize {
    let divisor = if self.light { 2 } else { 1 };
    (self.page_size as usize / BLOCK_BYTES) / divisor
  }
}

impl Default for Params {
  fn default() -> Self {
    Self::classic(Variant::V0)
  }
}
