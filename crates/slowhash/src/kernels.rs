//! AES kernel selection surface.
//!
//! Every backend provides the same two entry points over byte blocks:
//! `pseudo_round` runs the ten identical AES rounds over each 16-byte block
//! of a 128-byte text block, `single_round` runs one AES round with an
//! injected 16-byte key. The round-key schedule is expanded once, portably,
//! and shared by all kernels — the hardware key-assist sequences compute the
//! identical schedule, and it runs only twice per hash.
//!
//! Kernels must be bit-identical; the only difference is speed. Cross-kernel
//! equivalence is enforced by `kernel_test` and the differential test suite.

use platform::Caps;

#[cfg(target_arch = "x86_64")]
mod aesni;
#[cfg(target_arch = "aarch64")]
mod neon;
mod soft;

pub(crate) use soft::expand_round_keys;

/// Ten 16-byte round keys expanded from a 256-bit key.
pub(crate) type RoundKeys = [[u8; 16]; 10];

/// Per-backend AES entry points.
pub(crate) struct AesFns {
  /// Ten sequential AES rounds over each block of the 128-byte text block.
  pub pseudo_round: fn(&mut [u8; 128], &RoundKeys),
  /// One AES round (SubBytes, ShiftRows, MixColumns, AddRoundKey).
  pub single_round: fn(&mut [u8; 16], &[u8; 16]),
}

/// Identifies one AES kernel implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum KernelId {
  /// Hardware AES via AES-NI.
  #[cfg(target_arch = "x86_64")]
  AesNi,
  /// Hardware AES via the aarch64 crypto extension.
  #[cfg(target_arch = "aarch64")]
  Neon,
  /// Portable S-box implementation; always available.
  Portable,
}

/// All kernels for this target, preferred first.
pub const ALL: &[KernelId] = &[
  #[cfg(target_arch = "x86_64")]
  KernelId::AesNi,
  #[cfg(target_arch = "aarch64")]
  KernelId::Neon,
  KernelId::Portable,
];

impl KernelId {
  #[inline]
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      #[cfg(target_arch = "x86_64")]
      Self::AesNi => "aesni",
      #[cfg(target_arch = "aarch64")]
      Self::Neon => "neon",
      Self::Portable => "portable",
    }
  }

  /// Capabilities a machine must have before this kernel may run.
  #[inline]
  #[must_use]
  pub const fn required_caps(self) -> Caps {
    match self {
      #[cfg(target_arch = "x86_64")]
      Self::AesNi => platform::caps::x86::AES_READY,
      #[cfg(target_arch = "aarch64")]
      Self::Neon => platform::caps::aarch64::AES_READY,
      Self::Portable => Caps::NONE,
    }
  }
}

#[allow(dead_code)]
#[must_use]
pub fn id_from_name(name: &str) -> Option<KernelId> {
  match name {
    #[cfg(target_arch = "x86_64")]
    "aesni" => Some(KernelId::AesNi),
    #[cfg(target_arch = "aarch64")]
    "neon" => Some(KernelId::Neon),
    "portable" => Some(KernelId::Portable),
    _ => None,
  }
}

static PORTABLE_FNS: AesFns = AesFns {
  pseudo_round: soft::pseudo_round,
  single_round: soft::single_round,
};

#[cfg(target_arch = "x86_64")]
static AESNI_FNS: AesFns = AesFns {
  pseudo_round: aesni::pseudo_round,
  single_round: aesni::single_round,
};

#[cfg(target_arch = "aarch64")]
static NEON_FNS: AesFns = AesFns {
  pseudo_round: neon::pseudo_round,
  single_round: neon::single_round,
};

/// Entry-point table for a kernel.
#[must_use]
pub(crate) fn fns(id: KernelId) -> &'static AesFns {
  match id {
    #[cfg(target_arch = "x86_64")]
    KernelId::AesNi => &AESNI_FNS,
    #[cfg(target_arch = "aarch64")]
    KernelId::Neon => &NEON_FNS,
    KernelId::Portable => &PORTABLE_FNS,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn portable_is_always_listed_last() {
    assert_eq!(*ALL.last().unwrap(), KernelId::Portable);
    assert!(KernelId::Portable.required_caps().is_empty());
  }

  #[test]
  fn names_round_trip() {
    for &id in ALL {
      assert_eq!(id_from_name(id.as_str()), Some(id));
    }
    assert_eq!(id_from_name("simd512"), None);
  }

  #[test]
  fn hardware_kernels_require_caps() {
    for &id in ALL {
      if id != KernelId::Portable {
        assert!(!id.required_caps().is_empty(), "{} must gate on caps", id.as_str());
      }
    }
  }
}
