//! Error types for slow-hash operations.
//!
//! All misuse is rejected before any computation begins; a failed call never
//! leaves a partially mutated context behind.

use core::fmt;

/// Errors surfaced by parameter validation, input preconditions, and
/// scratchpad allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Error {
  /// Variant 1 reads an 8-byte tweak from input offset 35; the input must be
  /// at least 43 bytes so the window `[35, 43)` is in bounds.
  InputTooShort {
    /// Actual input length in bytes.
    len: usize,
  },
  /// `page_size` must be a nonzero power of two and a multiple of 128.
  BadPageSize {
    /// Rejected value.
    page_size: u32,
  },
  /// `scratchpad_init_size` must be a nonzero multiple of 128 that does not
  /// exceed `page_size`.
  BadInitSize {
    /// Rejected value.
    init_size: u32,
    /// The page size it was checked against.
    page_size: u32,
  },
  /// `iteration_count` must be nonzero and even (the mixing loop consumes
  /// two scratchpad touches per round).
  BadIterationCount {
    /// Rejected value.
    iterations: u32,
  },
  /// A pre-absorbed sponge state is exactly 200 bytes.
  BadPrehashedLength {
    /// Actual input length in bytes.
    len: usize,
  },
  /// Scratchpad allocation failed even after falling back from huge pages to
  /// the ordinary heap.
  Alloc {
    /// Requested buffer size in bytes.
    bytes: usize,
  },
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Self::InputTooShort { len } => {
        write!(f, "variant 1 requires at least 43 input bytes, got {len}")
      }
      Self::BadPageSize { page_size } => {
        write!(f, "page size {page_size} is not a power-of-two multiple of 128")
      }
      Self::BadInitSize { init_size, page_size } => {
        write!(
          f,
          "scratchpad init size {init_size} is not a multiple of 128 within page size {page_size}"
        )
      }
      Self::BadIterationCount { iterations } => {
        write!(f, "iteration count {iterations} is not a nonzero even number")
      }
      Self::BadPrehashedLength { len } => {
        write!(f, "pre-absorbed state must be exactly 200 bytes, got {len}")
      }
      Self::Alloc { bytes } => write!(f, "scratchpad allocation of {bytes} bytes failed"),
    }
  }
}

impl core::error::Error for Error {}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::string::ToString;

  use super::*;

  #[test]
  fn display_messages() {
    assert_eq!(
      Error::InputTooShort { len: 42 }.to_string(),
      "variant 1 requires at least 43 input bytes, got 42"
    );
    assert_eq!(
      Error::BadPageSize { page_size: 100 }.to_string(),
      "page size 100 is not a power-of-two multiple of 128"
    );
    assert_eq!(
      Error::Alloc { bytes: 2097152 }.to_string(),
      "scratchpad allocation of 2097152 bytes failed"
    );
  }

  #[test]
  fn is_copy_eq() {
    let e = Error::InputTooShort { len: 1 };
    let e2 = e;
    assert_eq!(e, e2);
    assert_ne!(e, Error::InputTooShort { len: 2 });
  }

  #[test]
  fn error_trait_impl() {
    use core::error::Error as _;

    let err = Error::BadIterationCount { iterations: 3 };
    assert!(err.source().is_none());
  }

  #[test]
  fn trait_bounds() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    assert_send::<Error>();
    assert_sync::<Error>();
  }
}
