//! Runtime CPU detection.
//!
//! Provides the cached [`caps()`] entry point plus a process-wide override
//! used for testing and for forcing the portable code path. Detection is:
//!
//! - Runtime (`std::arch::is_*_feature_detected!`) with `std`, cached in a
//!   `OnceLock` so the cost is paid once per process.
//! - Compile-time (`cfg!(target_feature = "...")`) without `std`; `cfg!` is
//!   free, so no caching is needed.
//! - Portable-only under Miri, which cannot interpret SIMD intrinsics.
//!
//! The override is stored in atomics so it behaves identically on `std` and
//! `no_std` targets. Racing a first detection against `set_caps_override` is
//! benign: detection is deterministic and the override flag is checked on
//! every call.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::caps::Caps;

// ─────────────────────────────────────────────────────────────────────────────
// Override storage
// ─────────────────────────────────────────────────────────────────────────────

static OVERRIDE_ACTIVE: AtomicBool = AtomicBool::new(false);
static OVERRIDE_BITS: [AtomicU64; 2] = [AtomicU64::new(0), AtomicU64::new(0)];

pub(crate) fn set_caps_override(value: Option<Caps>) {
  match value {
    Some(caps) => {
      OVERRIDE_BITS[0].store(caps.0[0], Ordering::Release);
      OVERRIDE_BITS[1].store(caps.0[1], Ordering::Release);
      OVERRIDE_ACTIVE.store(true, Ordering::Release);
    }
    None => OVERRIDE_ACTIVE.store(false, Ordering::Release),
  }
}

#[inline]
pub(crate) fn has_override() -> bool {
  OVERRIDE_ACTIVE.load(Ordering::Acquire)
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry point
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
pub(crate) fn caps() -> Caps {
  if OVERRIDE_ACTIVE.load(Ordering::Acquire) {
    return Caps([
      OVERRIDE_BITS[0].load(Ordering::Acquire),
      OVERRIDE_BITS[1].load(Ordering::Acquire),
    ]);
  }
  cached()
}

#[cfg(miri)]
fn cached() -> Caps {
  Caps::NONE
}

#[cfg(all(not(miri), feature = "std"))]
fn cached() -> Caps {
  static CACHE: std::sync::OnceLock<Caps> = std::sync::OnceLock::new();
  *CACHE.get_or_init(detect)
}

#[cfg(all(not(miri), not(feature = "std")))]
fn cached() -> Caps {
  compile_time()
}

// ─────────────────────────────────────────────────────────────────────────────
// Detection
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(not(miri), feature = "std", target_arch = "x86_64"))]
fn detect() -> Caps {
  use crate::caps::x86;

  let mut c = Caps::NONE;
  if std::arch::is_x86_feature_detected!("sse2") {
    c |= x86::SSE2;
  }
  if std::arch::is_x86_feature_detected!("ssse3") {
    c |= x86::SSSE3;
  }
  if std::arch::is_x86_feature_detected!("sse4.1") {
    c |= x86::SSE41;
  }
  if std::arch::is_x86_feature_detected!("avx") {
    c |= x86::AVX;
  }
  if std::arch::is_x86_feature_detected!("avx2") {
    c |= x86::AVX2;
  }
  if std::arch::is_x86_feature_detected!("aes") {
    c |= x86::AESNI;
  }
  if std::arch::is_x86_feature_detected!("pclmulqdq") {
    c |= x86::PCLMULQDQ;
  }
  c
}

#[cfg(all(not(miri), feature = "std", target_arch = "aarch64"))]
fn detect() -> Caps {
  use crate::caps::aarch64;

  let mut c = Caps::NONE;
  if std::arch::is_aarch64_feature_detected!("neon") {
    c |= aarch64::NEON;
  }
  if std::arch::is_aarch64_feature_detected!("aes") {
    c |= aarch64::AES;
  }
  if std::arch::is_aarch64_feature_detected!("pmull") {
    c |= aarch64::PMULL;
  }
  if std::arch::is_aarch64_feature_detected!("sha2") {
    c |= aarch64::SHA2;
  }
  c
}

#[cfg(all(not(miri), feature = "std", not(any(target_arch = "x86_64", target_arch = "aarch64"))))]
fn detect() -> Caps {
  compile_time()
}

/// Compile-time feature detection from `-C target-feature` flags.
#[cfg(not(miri))]
#[allow(dead_code, unused_mut)]
fn compile_time() -> Caps {
  let mut c = Caps::NONE;

  #[cfg(target_arch = "x86_64")]
  {
    use crate::caps::x86;
    if cfg!(target_feature = "sse2") {
      c |= x86::SSE2;
    }
    if cfg!(target_feature = "ssse3") {
      c |= x86::SSSE3;
    }
    if cfg!(target_feature = "sse4.1") {
      c |= x86::SSE41;
    }
    if cfg!(target_feature = "avx") {
      c |= x86::AVX;
    }
    if cfg!(target_feature = "avx2") {
      c |= x86::AVX2;
    }
    if cfg!(target_feature = "aes") {
      c |= x86::AESNI;
    }
    if cfg!(target_feature = "pclmulqdq") {
      c |= x86::PCLMULQDQ;
    }
  }

  #[cfg(target_arch = "aarch64")]
  {
    use crate::caps::aarch64;
    if cfg!(target_feature = "neon") {
      c |= aarch64::NEON;
    }
    if cfg!(target_feature = "aes") {
      c |= aarch64::AES;
    }
    if cfg!(target_feature = "pmull") {
      c |= aarch64::PMULL;
    }
    if cfg!(target_feature = "sha2") {
      c |= aarch64::SHA2;
    }
  }

  c
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
