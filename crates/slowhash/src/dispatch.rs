//! Kernel and variant resolution.
//!
//! Resolution happens once, at context construction: the kernel by runtime
//! capability detection (or an explicit request, which still degrades to
//! portable when the machine can't run it), the variant by picking the
//! monomorphized mixing loop. The hot path then runs branch-free on both
//! axes.

use crate::kernels::{self, AesFns, KernelId};
use crate::mixer::{self, MixInit};
use crate::params::Variant;

pub(crate) type MixFn = fn(&AesFns, &MixInit, &mut [u8], usize, usize);

/// A fully resolved execution plan for one context.
#[derive(Clone, Copy)]
pub(crate) struct Resolved {
  pub id: KernelId,
  pub aes: &'static AesFns,
  pub mix: MixFn,
}

/// Resolve the kernel and variant once.
///
/// `forced` pins a kernel (capability-checked, falling back to portable);
/// `None` picks the best kernel the machine supports. An active
/// `platform::set_caps_override` is honored either way, which is how the
/// software-only override reaches this crate.
pub(crate) fn resolve(variant: Variant, forced: Option<KernelId>) -> Resolved {
  let caps = platform::caps();
  let id = match forced {
    Some(requested) if caps.has(requested.required_caps()) => requested,
    Some(_) => KernelId::Portable,
    None => pick(caps),
  };
  Resolved {
    id,
    aes: kernels::fns(id),
    mix: mix_fn(variant),
  }
}

fn pick(caps: platform::Caps) -> KernelId {
  for &id in kernels::ALL {
    if caps.has(id.required_caps()) {
      return id;
    }
  }
  KernelId::Portable
}

fn mix_fn(variant: Variant) -> MixFn {
  match variant {
    Variant::V0 => mixer::mix::<0>,
    Variant::V1 => mixer::mix::<1>,
    Variant::V2 => mixer::mix::<2>,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // The caps override is process-wide; one test keeps the sequence
  // serialized without locking.
  #[test]
  fn resolution_honors_caps_and_override() {
    let resolved = resolve(Variant::V0, Some(KernelId::Portable));
    assert_eq!(resolved.id, KernelId::Portable);

    let auto = resolve(Variant::V2, None);
    assert!(platform::caps().has(auto.id.required_caps()));

    platform::set_caps_override(Some(platform::Caps::NONE));
    for &id in kernels::ALL {
      assert_eq!(resolve(Variant::V1, Some(id)).id, KernelId::Portable);
    }
    assert_eq!(resolve(Variant::V1, None).id, KernelId::Portable);
    platform::set_caps_override(None);
  }
}
