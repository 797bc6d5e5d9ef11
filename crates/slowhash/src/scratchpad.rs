//! Scratchpad allocation.
//!
//! One hash computation owns one scratchpad exclusively. Buffers are
//! expensive to set up (the huge-page path in particular), so contexts cache
//! and reuse them across calls; this module only deals with getting the
//! memory and giving it back.
//!
//! Allocation policy: on Linux, try an anonymous `MAP_HUGETLB` mapping first
//! (the mixing loop's random 16-byte accesses are TLB-bound on 4 KiB pages),
//! then fall back to an ordinary zeroed heap allocation. Both paths hand out
//! zero-filled memory, so a fresh buffer always hashes identically to a
//! reused one.
//!
//! # Safety
//!
//! Uses `unsafe` for the mmap lifecycle; the mapping is private, anonymous,
//! and exclusively owned by its [`Scratchpad`].
#![allow(unsafe_code)]

use alloc::vec::Vec;

use crate::error::Error;

/// A page-size working buffer, huge-page backed when the OS cooperates.
pub(crate) struct Scratchpad {
  buf: Buffer,
}

enum Buffer {
  Heap(Vec<u8>),
  #[cfg(all(feature = "std", target_os = "linux"))]
  Huge(HugeMapping),
}

impl Scratchpad {
  /// Allocate a zeroed buffer of exactly `bytes` bytes.
  ///
  /// # Errors
  ///
  /// [`Error::Alloc`] if the heap fallback itself fails.
  pub(crate) fn allocate(bytes: usize) -> Result<Self, Error> {
    #[cfg(all(feature = "std", target_os = "linux"))]
    if let Some(mapping) = HugeMapping::map(bytes) {
      return Ok(Self {
        buf: Buffer::Huge(mapping),
      });
    }

    let mut v = Vec::new();
    v.try_reserve_exact(bytes).map_err(|_| Error::Alloc { bytes })?;
    v.resize(bytes, 0);
    Ok(Self { buf: Buffer::Heap(v) })
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    match &self.buf {
      Buffer::Heap(v) => v.len(),
      #[cfg(all(feature = "std", target_os = "linux"))]
      Buffer::Huge(m) => m.len,
    }
  }

  #[inline]
  pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
    match &mut self.buf {
      Buffer::Heap(v) => v.as_mut_slice(),
      #[cfg(all(feature = "std", target_os = "linux"))]
      // SAFETY: the mapping is live, private, and exclusively owned by this
      // scratchpad for its whole lifetime.
      Buffer::Huge(m) => unsafe { core::slice::from_raw_parts_mut(m.ptr, m.len) },
    }
  }

  /// Whether the buffer is huge-page backed (diagnostics and tests only).
  #[cfg_attr(not(test), allow(dead_code))]
  #[inline]
  pub(crate) fn is_huge_backed(&self) -> bool {
    match &self.buf {
      Buffer::Heap(_) => false,
      #[cfg(all(feature = "std", target_os = "linux"))]
      Buffer::Huge(_) => true,
    }
  }

  /// Zero everything from `from` to the end of the buffer.
  ///
  /// Reused buffers keep the previous hash's contents; when the fill pass
  /// covers less than the whole page, the mixing loop can still address the
  /// tail, so it must be returned to its freshly-allocated (zero) contents.
  pub(crate) fn zero_tail(&mut self, from: usize) {
    let slice = self.as_mut_slice();
    if let Some(tail) = slice.get_mut(from..) {
      tail.fill(0);
    }
  }
}

#[cfg(all(feature = "std", target_os = "linux"))]
struct HugeMapping {
  ptr: *mut u8,
  len: usize,
}

// SAFETY: the mapping is an exclusively owned anonymous region; nothing about
// it is tied to the creating thread.
#[cfg(all(feature = "std", target_os = "linux"))]
unsafe impl Send for HugeMapping {}
#[cfg(all(feature = "std", target_os = "linux"))]
unsafe impl Sync for HugeMapping {}

#[cfg(all(feature = "std", target_os = "linux"))]
impl HugeMapping {
  /// Try to map `len` bytes of huge-page memory.
  ///
  /// Fails (returns `None`) when the kernel has no huge pages configured,
  /// the quota is exhausted, or `len` is not a multiple of the huge page
  /// size; callers fall back to the heap.
  fn map(len: usize) -> Option<Self> {
    if len == 0 {
      return None;
    }
    // SAFETY: anonymous private mapping with no address hint; the result is
    // checked against MAP_FAILED before use.
    let ptr = unsafe {
      libc::mmap(
        core::ptr::null_mut(),
        len,
        libc::PROT_READ | libc::PROT_WRITE,
        libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_HUGETLB,
        -1,
        0,
      )
    };
    if ptr == libc::MAP_FAILED {
      return None;
    }
    Some(Self { ptr: ptr.cast(), len })
  }
}

#[cfg(all(feature = "std", target_os = "linux"))]
impl Drop for HugeMapping {
  fn drop(&mut self) {
    // SAFETY: ptr/len are exactly what mmap returned.
    unsafe {
      libc::munmap(self.ptr.cast(), self.len);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn allocation_is_zeroed() {
    let mut sp = Scratchpad::allocate(4096).unwrap();
    assert_eq!(sp.len(), 4096);
    assert!(sp.as_mut_slice().iter().all(|&b| b == 0));
  }

  #[test]
  fn zero_tail_clears_only_tail() {
    let mut sp = Scratchpad::allocate(256).unwrap();
    sp.as_mut_slice().fill(0xaa);
    sp.zero_tail(128);

    let slice = sp.as_mut_slice();
    assert!(slice[..128].iter().all(|&b| b == 0xaa));
    assert!(slice[128..].iter().all(|&b| b == 0));

    // A from-offset past the end is a no-op, not a panic.
    sp.zero_tail(1024);
  }

  #[test]
  fn reallocation_matches_fresh() {
    let mut a = Scratchpad::allocate(1 << 16).unwrap();
    a.as_mut_slice().fill(0x55);
    drop(a);

    let mut b = Scratchpad::allocate(1 << 16).unwrap();
    assert!(b.as_mut_slice().iter().all(|&b| b == 0));
  }

  #[cfg(target_os = "linux")]
  #[test]
  fn huge_backing_is_optional() {
    // Whether the kernel grants huge pages is environment-specific; the
    // allocation must succeed either way.
    let sp = Scratchpad::allocate(2 * 1024 * 1024).unwrap();
    let _ = sp.is_huge_backed();
  }
}
