//! Correction intents: effective-date correction vs. field correction.
//!
//! Moving a version to a different effective date and changing that version's
//! fields are separate submissions. A request never mixes the two.

use serde_json::Value;

use crate::{
  Error, Result,
  capability::{FieldPath, VerifiedCapability},
  patch::build_patch,
  record::{Payload, Record},
};

/// Logical field, and the only acceptable payload key, for effective dates.
pub const EFFECTIVE_DATE_FIELD: &str = "effective_date";

/// Which kind of correction the editor is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionIntent {
  /// Move the version to this (trimmed) effective date and change nothing
  /// else.
  EffectiveDate(String),
  /// Correct fields of the version in place.
  Fields,
}

/// Decide the correction mode. A non-blank corrected date that differs from
/// the current one selects effective-date mode.
pub fn classify_correction(
  current_effective_date: &str,
  corrected_effective_date: Option<&str>,
) -> CorrectionIntent {
  match corrected_effective_date.map(str::trim) {
    Some(corrected)
      if !corrected.is_empty() && corrected != current_effective_date =>
    {
      CorrectionIntent::EffectiveDate(corrected.to_string())
    }
    _ => CorrectionIntent::Fields,
  }
}

/// Build the correction request for one version.
///
/// In effective-date mode the result is exactly `{ "effective_date": .. }`,
/// and only if `capability` maps `effective_date` to the payload key of the
/// same name; otherwise the correction is refused. In field mode this is
/// [`build_patch`].
pub fn build_correction_patch(
  capability: &VerifiedCapability,
  current_effective_date: &str,
  corrected_effective_date: Option<&str>,
  original: &Record,
  next: &Record,
) -> Result<Payload> {
  match classify_correction(current_effective_date, corrected_effective_date)
  {
    CorrectionIntent::EffectiveDate(corrected) => {
      if !capability.allows_identity(EFFECTIVE_DATE_FIELD) {
        tracing::debug!(
          current = current_effective_date,
          corrected = %corrected,
          "effective-date correction refused"
        );
        return Err(Error::EffectiveDateCorrectionRefused);
      }
      let mut patch = Payload::new();
      patch.insert(
        &FieldPath::Plain(EFFECTIVE_DATE_FIELD.to_string()),
        Value::String(corrected),
      );
      Ok(patch)
    }
    CorrectionIntent::Fields => Ok(build_patch(capability, original, next)),
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
