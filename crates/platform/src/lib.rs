//! CPU detection and capabilities for slow-hash kernel selection.
//!
//! This crate is the single source of truth for CPU feature detection in the
//! workspace. Kernels ask one question — "may I use hardware AES here?" —
//! and get a cached, deterministic answer.
//!
//! # Core Type
//!
//! - [`Caps`]: a 128-bit bitset of available ISA extensions
//!
//! # Main Entry Point
//!
//! ```ignore
//! use platform::caps::x86;
//!
//! if platform::caps().has(x86::AES_READY) {
//!     // AES-NI kernel is legal on this machine
//! }
//! ```
//!
//! # Design
//!
//! 1. **One API**: callers query [`caps()`] instead of doing ad-hoc detection.
//! 2. **Cached**: runtime detection runs once per process (`OnceLock` under
//!    `std`); without `std` the compile-time feature set is used.
//! 3. **Overridable**: [`set_caps_override`] forces a capability set, for
//!    tests and for pinning the portable code path.
//! 4. **Miri-safe**: under Miri, detection always reports no SIMD features.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod caps;
mod detect;

pub use caps::{Arch, Caps};

/// Get detected CPU capabilities.
///
/// This is the main entry point for capability-based dispatch. The result is
/// deterministic for the lifetime of the process; an active override (see
/// [`set_caps_override`]) takes precedence over detection.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  detect::caps()
}

/// Set or clear the capabilities override.
///
/// When set, [`caps()`] returns the override value instead of detecting.
/// Pass `None` to clear the override and resume detection. Useful for
/// forcing the portable kernel and for exercising specific dispatch paths
/// in tests.
///
/// # Thread Safety
///
/// Thread-safe, but typically called early in program initialization, before
/// hashing contexts are constructed.
///
/// # Example
///
/// ```ignore
/// platform::set_caps_override(Some(platform::Caps::NONE));
/// // ... everything now resolves to portable kernels ...
/// platform::set_caps_override(None);
/// ```
#[inline]
pub fn set_caps_override(value: Option<Caps>) {
  detect::set_caps_override(value);
}

/// Check if an override is currently set.
#[inline]
#[must_use]
pub fn has_override() -> bool {
  detect::has_override()
}
