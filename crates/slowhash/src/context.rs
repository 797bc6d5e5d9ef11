//! The hashing context: configuration, resolved kernel, and the cached
//! scratchpad.
//!
//! One context serves one execution context (a worker thread, typically) and
//! amortizes scratchpad allocation across calls. Contexts are `Send`; a hash
//! call borrows the context mutably, so concurrent computations need one
//! context each.

use crate::dispatch::{self, Resolved};
use crate::error::Error;
use crate::kernels::KernelId;
use crate::mixer::{self, MixInit};
use crate::params::{Params, Variant, V1_MIN_INPUT};
use crate::scratchpad::Scratchpad;
use crate::state::{SpongeState, STATE_BYTES};

/// A reusable slow-hash context.
///
/// # Example
///
/// ```
/// use slowhash::{HashContext, Params, Variant};
///
/// let mut params = Params::classic(Variant::V0);
/// # params.page_size = 16384;
/// # params.scratchpad_init_size = 16384;
/// # params.iteration_count = 1024;
/// let mut ctx = HashContext::new(params)?;
/// let digest = ctx.hash(b"input bytes")?;
/// assert_eq!(digest.len(), 32);
/// # Ok::<(), slowhash::Error>(())
/// ```
pub struct HashContext {
  params: Params,
  resolved: Resolved,
  scratchpad: Option<Scratchpad>,
}

impl HashContext {
  /// Create a context with the best kernel this machine supports.
  ///
  /// # Errors
  ///
  /// Parameter validation errors; see [`Params::validate`].
  pub fn new(params: Params) -> Result<Self, Error> {
    params.validate()?;
    Ok(Self {
      resolved: dispatch::resolve(params.variant, None),
      params,
      scratchpad: None,
    })
  }

  /// Create a context pinned to a specific kernel.
  ///
  /// The request is still capability-checked: a hardware kernel on a machine
  /// without the instructions degrades to portable rather than faulting.
  /// Pinning [`KernelId::Portable`] is the software-only override.
  ///
  /// # Errors
  ///
  /// Parameter validation errors; see [`Params::validate`].
  pub fn with_kernel(params: Params, kernel: KernelId) -> Result<Self, Error> {
    params.validate()?;
    Ok(Self {
      resolved: dispatch::resolve(params.variant, Some(kernel)),
      params,
      scratchpad: None,
    })
  }

  /// The parameters this context was built with.
  #[inline]
  #[must_use]
  pub fn params(&self) -> &Params {
    &self.params
  }

  /// Name of the resolved kernel (`"aesni"`, `"neon"`, `"portable"`).
  #[inline]
  #[must_use]
  pub fn kernel_name(&self) -> &'static str {
    self.resolved.id.as_str()
  }

  /// Free the cached scratchpad. The next hash call reallocates lazily.
  pub fn release_scratchpad(&mut self) {
    self.scratchpad = None;
  }

  /// Hash `input`.
  ///
  /// # Errors
  ///
  /// [`Error::InputTooShort`] when variant 1 is configured and `input` is
  /// shorter than 43 bytes; [`Error::Alloc`] on scratchpad exhaustion.
  pub fn hash(&mut self, input: &[u8]) -> Result<[u8; 32], Error> {
    if self.params.variant == Variant::V1 && input.len() < V1_MIN_INPUT {
      return Err(Error::InputTooShort { len: input.len() });
    }
    let state = SpongeState::absorb(input);
    self.run(state, input)
  }

  /// Hash a pre-absorbed 200-byte sponge state (the `prehashed` path).
  ///
  /// The state is used verbatim, no absorption is performed. Variant 1's
  /// tweak window reads the raw state bytes, mirroring the reference.
  ///
  /// # Errors
  ///
  /// [`Error::BadPrehashedLength`] unless `state` is exactly 200 bytes;
  /// [`Error::Alloc`] on scratchpad exhaustion.
  pub fn hash_prehashed(&mut self, state: &[u8]) -> Result<[u8; 32], Error> {
    let Ok(bytes) = <&[u8; STATE_BYTES]>::try_from(state) else {
      return Err(Error::BadPrehashedLength { len: state.len() });
    };
    self.run(SpongeState::from_bytes(bytes), state)
  }

  fn run(&mut self, mut state: SpongeState, raw_input: &[u8]) -> Result<[u8; 32], Error> {
    let page = self.params.page_size as usize;
    let init_bytes = self.params.scratchpad_init_size as usize;
    let segments = self.params.init_segments();
    let rounds = self.params.mix_rounds();
    let blocks = self.params.addressable_blocks();

    if self.scratchpad.as_ref().map_or(true, |sp| sp.len() != page) {
      self.scratchpad = Some(Scratchpad::allocate(page)?);
    }
    let Some(scratchpad) = self.scratchpad.as_mut() else {
      return Err(Error::Alloc { bytes: page });
    };
    if init_bytes < page {
      // The mixing loop can address blocks the fill pass won't write; a
      // reused buffer must look freshly allocated there.
      scratchpad.zero_tail(init_bytes);
    }
    let sp = scratchpad.as_mut_slice();

    mixer::fill(self.resolved.aes, &state, sp, segments);
    let init = MixInit::new(&state, self.params.variant, raw_input);
    (self.resolved.mix)(self.resolved.aes, &init, sp, rounds, blocks);
    mixer::fold(self.resolved.aes, &mut state, sp, segments);

    state.permute();
    Ok(state.finalize_digest())
  }
}

impl core::fmt::Debug for HashContext {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("HashContext")
      .field("params", &self.params)
      .field("kernel", &self.kernel_name())
      .field("scratchpad_cached", &self.scratchpad.is_some())
      .finish()
  }
}

/// One-shot convenience wrapper: a transient context per call.
///
/// Callers hashing in a loop should hold a [`HashContext`] instead, to reuse
/// its scratchpad.
///
/// # Errors
///
/// Same as [`HashContext::new`] and [`HashContext::hash`].
pub fn slow_hash(input: &[u8], params: &Params) -> Result<[u8; 32], Error> {
  HashContext::new(*params)?.hash(input)
}
