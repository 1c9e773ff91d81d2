//! Minimal-diff correction patches.

use crate::{
  capability::VerifiedCapability,
  record::{Payload, Record, same_value},
};

/// Compute the smallest patch that moves `original` to `next`, restricted to
/// the fields `capability` allows.
///
/// A field undefined in `next` is left alone even if it differs from
/// `original`. An explicit `null` in `next` is written through unless
/// `original` already holds `null`.
pub fn build_patch(
  capability: &VerifiedCapability,
  original: &Record,
  next: &Record,
) -> Payload {
  let mut patch = Payload::new();

  for (field, path) in capability.fields() {
    let Some(next_value) = next.get(path) else {
      continue;
    };
    if let Some(previous) = original.get(path)
      && same_value(previous, next_value)
    {
      continue;
    }
    tracing::trace!(field, %path, "field changed");
    patch.insert(path, next_value.clone());
  }

  patch
}

// ─── Tests ────────────────────────────────────────────────────────────────────
