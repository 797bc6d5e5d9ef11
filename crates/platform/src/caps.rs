//! CPU capability representation.
//!
//! [`Caps`] is a 128-bit bitset answering one question: "which instruction-set
//! extensions may a kernel legally use on this machine?" The bits are
//! architecture-specific but the API is uniform across targets.
//!
//! # Bit Layout
//!
//! - Bits 0-63: x86/x86_64 features
//! - Bits 64-127: aarch64 features
//!
//! # Usage
//!
//! ```ignore
//! use platform::caps::x86;
//!
//! if platform::caps().has(x86::AES_READY) {
//!     // Use the AES-NI kernel
//! }
//! ```

// ─────────────────────────────────────────────────────────────────────────────
// Core Capability Type
// ─────────────────────────────────────────────────────────────────────────────

/// CPU capabilities: a 128-bit feature bitset.
///
/// `Caps` is `Copy`, `Send`, and `Sync`; it can be freely shared across
/// threads. Use [`has()`](Caps::has) to check that every feature a kernel
/// requires is available.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Caps(pub(crate) [u64; 2]);

impl Caps {
  /// Empty capability set (no features).
  pub const NONE: Self = Self([0; 2]);

  /// Create a capability set from raw words.
  ///
  /// Primarily useful for testing and fuzzing; normal usage should prefer
  /// the predefined constants.
  #[cfg(any(test, feature = "testing"))]
  #[inline]
  #[must_use]
  pub const fn from_raw(words: [u64; 2]) -> Self {
    Self(words)
  }

  /// Access the raw underlying words.
  #[cfg(any(test, feature = "testing"))]
  #[inline]
  #[must_use]
  pub const fn as_raw(&self) -> &[u64; 2] {
    &self.0
  }

  /// Check if all features in `required` are present.
  ///
  /// This is the core dispatch check.
  #[inline(always)]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    (self.0[0] & required.0[0]) == required.0[0] && (self.0[1] & required.0[1]) == required.0[1]
  }

  /// Union of two capability sets.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self([self.0[0] | other.0[0], self.0[1] | other.0[1]])
  }

  /// Intersection of two capability sets.
  #[inline]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self([self.0[0] & other.0[0], self.0[1] & other.0[1]])
  }

  /// Check if the capability set is empty.
  #[inline]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0[0] == 0 && self.0[1] == 0
  }

  /// Count the number of features present.
  #[inline]
  #[must_use]
  pub const fn count(self) -> u32 {
    self.0[0].count_ones() + self.0[1].count_ones()
  }

  /// Create a capability set with a single bit set.
  #[inline]
  #[must_use]
  pub const fn bit(bit: u8) -> Self {
    debug_assert!(bit < 128);
    if bit < 64 {
      Self([1u64 << bit, 0])
    } else {
      Self([0, 1u64 << (bit - 64)])
    }
  }

  /// Check if a specific bit is set.
  #[inline]
  #[must_use]
  pub const fn has_bit(self, bit: u8) -> bool {
    if bit < 64 {
      (self.0[0] & (1u64 << bit)) != 0
    } else {
      (self.0[1] & (1u64 << (bit - 64))) != 0
    }
  }
}

impl core::ops::BitOr for Caps {
  type Output = Self;

  #[inline]
  fn bitor(self, rhs: Self) -> Self::Output {
    self.union(rhs)
  }
}

impl core::ops::BitAnd for Caps {
  type Output = Self;

  #[inline]
  fn bitand(self, rhs: Self) -> Self::Output {
    self.intersection(rhs)
  }
}

impl core::ops::BitOrAssign for Caps {
  #[inline]
  fn bitor_assign(&mut self, rhs: Self) {
    *self = self.union(rhs);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Architecture Identification
// ─────────────────────────────────────────────────────────────────────────────

/// Target architecture enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Arch {
  X86_64,
  Aarch64,
  #[default]
  Other,
}

impl Arch {
  /// Get the architecture for the current compilation target.
  #[inline]
  #[must_use]
  pub const fn current() -> Self {
    #[cfg(target_arch = "x86_64")]
    {
      Self::X86_64
    }
    #[cfg(target_arch = "aarch64")]
    {
      Self::Aarch64
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
      Self::Other
    }
  }

  /// Human-readable name for this architecture.
  #[inline]
  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
      Self::Other => "other",
    }
  }
}

impl core::fmt::Display for Arch {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(self.name())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// x86/x86_64 Features (bits 0-63)
// ─────────────────────────────────────────────────────────────────────────────

/// x86/x86_64 CPU features.
pub mod x86 {
  use super::Caps;

  pub const SSE2: Caps = Caps::bit(0);
  pub const SSSE3: Caps = Caps::bit(1);
  pub const SSE41: Caps = Caps::bit(2);
  pub const AVX: Caps = Caps::bit(3);
  pub const AVX2: Caps = Caps::bit(4);

  // ─── Crypto Extensions ───
  pub const AESNI: Caps = Caps::bit(5);
  pub const PCLMULQDQ: Caps = Caps::bit(6);

  // ─── Combined Capability Masks ───

  /// AES-NI-ready: AESNI + SSE2 (for 128-bit loads/stores and XOR).
  pub const AES_READY: Caps = Caps([AESNI.0[0] | SSE2.0[0], 0]);
}

// ─────────────────────────────────────────────────────────────────────────────
// aarch64 Features (bits 64-127)
// ─────────────────────────────────────────────────────────────────────────────

/// aarch64 CPU features.
pub mod aarch64 {
  use super::Caps;

  pub const NEON: Caps = Caps::bit(64); // Baseline on AArch64

  // ─── Crypto Extensions ───
  pub const AES: Caps = Caps::bit(65);
  pub const PMULL: Caps = Caps::bit(66); // Often bundled with AES
  pub const SHA2: Caps = Caps::bit(67);

  // ─── Combined Capability Masks ───

  /// AES-ready: NEON + the AES crypto extension.
  pub const AES_READY: Caps = Caps([0, NEON.0[1] | AES.0[1]]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Feature Name Lookup (for diagnostics)
// ─────────────────────────────────────────────────────────────────────────────

/// Feature name entry: (bit_index, name).
type FeatureEntry = (u8, &'static str);

const X86_FEATURES: &[FeatureEntry] = &[
  (0, "sse2"),
  (1, "ssse3"),
  (2, "sse4.1"),
  (3, "avx"),
  (4, "avx2"),
  (5, "aes"),
  (6, "pclmulqdq"),
];

const AARCH64_FEATURES: &[FeatureEntry] = &[(64, "neon"), (65, "aes"), (66, "pmull"), (67, "sha2")];

impl Caps {
  /// Returns an iterator over the names of all set feature bits.
  pub fn feature_names(self) -> impl Iterator<Item = &'static str> {
    X86_FEATURES
      .iter()
      .chain(AARCH64_FEATURES.iter())
      .filter_map(move |(bit, name)| if self.has_bit(*bit) { Some(*name) } else { None })
  }
}

impl core::fmt::Debug for Caps {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    let arch = Arch::current();
    write!(f, "Caps({arch}")?;

    let mut iter = self.feature_names().peekable();
    if iter.peek().is_none() {
      write!(f, ", none)")
    } else {
      write!(f, ", [")?;
      let mut first = true;
      for name in iter {
        if !first {
          write!(f, ", ")?;
        }
        first = false;
        write!(f, "{name}")?;
      }
      write!(f, "])")
    }
  }
}

impl core::fmt::Display for Caps {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    core::fmt::Debug::fmt(self, f)
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  extern crate alloc;

  use super::*;

  #[test]
  fn caps_basic() {
    let empty = Caps::NONE;
    assert!(empty.is_empty());
    assert_eq!(empty.count(), 0);

    let bit0 = Caps::bit(0);
    assert!(!bit0.is_empty());
    assert_eq!(bit0.count(), 1);
    assert!(bit0.has_bit(0));
    assert!(!bit0.has_bit(1));
  }

  #[test]
  fn caps_union_intersection() {
    let a = Caps::bit(0);
    let b = Caps::bit(1);
    let ab = a.union(b);

    assert!(ab.has_bit(0));
    assert!(ab.has_bit(1));
    assert_eq!(ab.count(), 2);

    assert!(ab.has(a));
    assert!(ab.has(b));
    assert!(!a.has(ab));
  }

  #[test]
  fn caps_word_boundary() {
    let bit63 = Caps::bit(63);
    let bit64 = Caps::bit(64);

    assert!(bit63.0[0] != 0 && bit63.0[1] == 0);
    assert!(bit64.0[0] == 0 && bit64.0[1] != 0);

    let both = bit63 | bit64;
    assert!(both.has(bit63));
    assert!(both.has(bit64));
    assert_eq!(both.count(), 2);
    assert!((bit63 & bit64).is_empty());
  }

  #[test]
  fn combined_masks() {
    assert!(x86::AES_READY.has(x86::AESNI));
    assert!(x86::AES_READY.has(x86::SSE2));
    assert!(!x86::AES_READY.has(x86::AVX2));

    assert!(aarch64::AES_READY.has(aarch64::NEON));
    assert!(aarch64::AES_READY.has(aarch64::AES));
    assert!(!aarch64::AES_READY.has(aarch64::PMULL));
  }

  #[test]
  fn feature_names_lookup() {
    let caps = x86::SSE2 | x86::AESNI;
    let names: alloc::vec::Vec<_> = caps.feature_names().collect();
    assert!(names.contains(&"sse2"));
    assert!(names.contains(&"aes"));
    assert!(!names.contains(&"avx2"));
  }

  #[test]
  fn debug_impl() {
    let caps = x86::SSE2 | x86::AESNI;
    let s = alloc::format!("{caps:?}");
    assert!(s.contains("Caps("));
    assert!(s.contains("sse2"));

    let none = alloc::format!("{:?}", Caps::NONE);
    assert!(none.contains("none"));
  }
}

#[cfg(all(test, not(miri)))]
mod proptests {
  use proptest::prelude::*;

  use super::*;

  fn arb_caps() -> impl Strategy<Value = Caps> {
    prop::array::uniform2(any::<u64>()).prop_map(Caps::from_raw)
  }

  proptest! {
    /// Union is commutative: a | b == b | a
    #[test]
    fn union_commutative(a in arb_caps(), b in arb_caps()) {
      prop_assert_eq!(a | b, b | a);
    }

    /// Union identity: a | NONE == a
    #[test]
    fn union_identity(a in arb_caps()) {
      prop_assert_eq!(a | Caps::NONE, a);
    }

    /// Self-containment: caps.has(caps) is always true
    #[test]
    fn self_containment(caps in arb_caps()) {
      prop_assert!(caps.has(caps));
    }

    /// After union, both operands are subsets of the result
    #[test]
    fn union_superset(a in arb_caps(), b in arb_caps()) {
      let union = a | b;
      prop_assert!(union.has(a));
      prop_assert!(union.has(b));
    }

    /// After intersection, result is subset of both operands
    #[test]
    fn intersection_subset(a in arb_caps(), b in arb_caps()) {
      let intersection = a & b;
      prop_assert!(a.has(intersection));
      prop_assert!(b.has(intersection));
    }

    /// Distributive law: a & (b | c) == (a & b) | (a & c)
    #[test]
    fn distributive(a in arb_caps(), b in arb_caps(), c in arb_caps()) {
      prop_assert_eq!(a & (b | c), (a & b) | (a & c));
    }

    /// Idempotence: a | a == a and a & a == a
    #[test]
    fn idempotent(a in arb_caps()) {
      prop_assert_eq!(a | a, a);
      prop_assert_eq!(a & a, a);
    }

    /// Bit setting: Caps::bit(n) sets exactly one bit at position n
    #[test]
    fn bit_sets_exactly_one(n in 0u8..128) {
      let caps = Caps::bit(n);
      prop_assert_eq!(caps.count(), 1);
      prop_assert!(caps.has_bit(n));
    }
  }
}
