//! Error types for `tenure-core`.
//!
//! Every variant is an expected business outcome. Callers treat any `Err` as
//! "operation refused, send nothing".

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("field {0:?} is listed more than once in allowed_fields")]
  DuplicateField(String),

  #[error("allowed field {0:?} has no payload key")]
  UnmappedField(String),

  #[error("payload key mapped for field {0:?}, which is not allowed")]
  UnallowedMapping(String),

  #[error("invalid payload path {path:?} for field {field:?}")]
  InvalidPayloadPath { field: String, path: String },

  #[error("effective-date correction is not permitted by this capability")]
  EffectiveDateCorrectionRefused,
}

impl Error {
  /// The descriptor itself is untrustworthy.
  pub fn is_capability_inconsistency(&self) -> bool {
    !self.is_policy_refusal()
  }

  /// The descriptor is sound but does not grant the requested operation.
  pub fn is_policy_refusal(&self) -> bool {
    matches!(self, Self::EffectiveDateCorrectionRefused)
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
