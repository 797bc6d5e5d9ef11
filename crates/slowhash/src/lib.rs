//! A memory-hard, CPU-friendly proof-of-work digest (CryptoNight family).
//!
//! The hash of an input is a deterministic, bit-exact function of the input
//! bytes, the algorithm [`Variant`], and the tuning [`Params`] (scratchpad
//! geometry, iteration count, light-mode addressing). The computation walks
//! a large scratchpad through a pointer-chasing loop of AES rounds and
//! 128-bit multiplies in which every access depends on the value the
//! previous access produced — that dependency chain is the memory-hardness
//! property, and it makes a single hash strictly sequential.
//!
//! Hardware AES kernels (AES-NI, aarch64 crypto extensions) and a portable
//! fallback produce bit-identical output; selection happens once per
//! [`HashContext`] via [`platform`] capability detection.
//!
//! # Example
//!
//! ```
//! use slowhash::{HashContext, Params, Variant};
//!
//! let mut params = Params::classic(Variant::V2);
//! # params.page_size = 16384;
//! # params.scratchpad_init_size = 16384;
//! # params.iteration_count = 1024;
//! let mut ctx = HashContext::new(params)?;
//! let digest = ctx.hash(b"some block header")?;
//! let again = ctx.hash(b"some block header")?;
//! assert_eq!(digest, again);
//! # Ok::<(), slowhash::Error>(())
//! ```
//!
//! # Concurrency
//!
//! A context owns its scratchpad exclusively and hash calls borrow it
//! mutably; run concurrent computations on one context per thread. The only
//! process-wide state is one-time capability detection, which is idempotent.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![deny(unsafe_code)]
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod block;
mod context;
mod dispatch;
mod error;
pub mod kernels;
mod mixer;
mod params;
mod scratchpad;
mod state;
mod variant;


pub use context::{slow_hash, HashContext};
pub use error::Error;
pub use kernels::KernelId;
pub use params::{Params, Variant, V1_MIN_INPUT};
