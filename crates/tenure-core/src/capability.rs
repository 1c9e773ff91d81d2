//! Field capability descriptors and their verification.
//!
//! A descriptor arrives from the field-configuration endpoint and is treated
//! as untrusted. [`CapabilityDescriptor::verify`] is the only way to obtain a
//! [`VerifiedCapability`], which the diffing builders require.

use std::{
  collections::{BTreeMap, HashSet},
  fmt,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Key of the nested extension bag in records and payloads.
pub const EXTENSION_BAG: &str = "ext";

/// Prefix that routes a payload path into the extension bag.
const EXTENSION_PREFIX: &str = "ext.";

// ─── Payload paths ───────────────────────────────────────────────────────────

/// Where a logical field's value lands in an outgoing payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldPath {
  /// Written directly as a top-level payload key.
  Plain(String),
  /// Written into the nested `ext` bag under this name.
  Extension(String),
}

impl FieldPath {
  /// Parse a payload path string.
  ///
  /// A bare key (no `.`) is [`FieldPath::Plain`]; `ext.<name>` with a
  /// non-empty, undotted `<name>` is [`FieldPath::Extension`]. Anything else,
  /// including the empty string and a bare `ext` (which would collide with
  /// the extension bag), is rejected.
  pub fn parse(path: &str) -> Option<Self> {
    if let Some(name) = path.strip_prefix(EXTENSION_PREFIX) {
      if name.is_empty() || name.contains('.') {
        return None;
      }
      return Some(Self::Extension(name.to_string()));
    }
    if path.is_empty() || path == EXTENSION_BAG || path.contains('.') {
      return None;
    }
    Some(Self::Plain(path.to_string()))
  }

  pub fn is_plain(&self, key: &str) -> bool {
    matches!(self, Self::Plain(k) if k == key)
  }
}

impl fmt::Display for FieldPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Plain(key) => f.write_str(key),
      Self::Extension(name) => write!(f, "{EXTENSION_PREFIX}{name}"),
    }
  }
}

// ─── Raw descriptor ──────────────────────────────────────────────────────────

/// Server-issued description of which fields a caller may write and where
/// each one lands in the payload. Wire shape of the capability endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
  #[serde(default)]
  pub allowed_fields:     Vec<String>,
  #[serde(default)]
  pub field_payload_keys: BTreeMap<String, String>,
}

impl CapabilityDescriptor {
  /// Check the bijection between `allowed_fields` and the keys of
  /// `field_payload_keys`, ignoring path syntax. On success, yields each
  /// allowed field paired with its raw payload key, in descriptor order.
  fn check_bijection(&self) -> Result<Vec<(&String, &String)>> {
    let mut seen = HashSet::with_capacity(self.allowed_fields.len());
    let mut pairs = Vec::with_capacity(self.allowed_fields.len());
    for field in &self.allowed_fields {
      if !seen.insert(field.as_str()) {
        return Err(Error::DuplicateField(field.clone()));
      }
      let Some(raw) = self.field_payload_keys.get(field) else {
        return Err(Error::UnmappedField(field.clone()));
      };
      pairs.push((field, raw));
    }
    if let Some(extra) = self
      .field_payload_keys
      .keys()
      .find(|key| !seen.contains(key.as_str()))
    {
      return Err(Error::UnallowedMapping(extra.clone()));
    }
    Ok(pairs)
  }

  /// Verify the descriptor and parse every payload path.
  ///
  /// Fails on the first bijection violation or malformed path; there is no
  /// partially verified capability.
  pub fn verify(&self) -> Result<VerifiedCapability> {
    let pairs = match self.check_bijection() {
      Ok(pairs) => pairs,
      Err(err) => {
        tracing::debug!(%err, "capability descriptor rejected");
        return Err(err);
      }
    };

    let mut bindings = Vec::with_capacity(pairs.len());
    for (field, raw) in pairs {
      let Some(path) = FieldPath::parse(raw) else {
        let err = Error::InvalidPayloadPath {
          field: field.clone(),
          path:  raw.clone(),
        };
        tracing::debug!(%err, "capability descriptor rejected");
        return Err(err);
      };
      bindings.push((field.clone(), path));
    }

    Ok(VerifiedCapability { bindings })
  }
}

/// Returns true if `allowed_fields` and the keys of `field_payload_keys`
/// correspond one-to-one.
pub fn validate(descriptor: &CapabilityDescriptor) -> bool {
  descriptor.check_bijection().is_ok()
}

// ─── Verified capability ─────────────────────────────────────────────────────

/// A capability whose bijection and payload paths have been checked.
/// Only [`CapabilityDescriptor::verify`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCapability {
  bindings: Vec<(String, FieldPath)>,
}

impl VerifiedCapability {
  /// Logical fields with their resolved payload paths, in descriptor order.
  pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldPath)> {
    self.bindings.iter().map(|(field, path)| (field.as_str(), path))
  }

  pub fn path(&self, field: &str) -> Option<&FieldPath> {
    self
      .bindings
      .iter()
      .find(|(f, _)| f == field)
      .map(|(_, path)| path)
  }

  /// True if `field` is allowed and maps to the top-level key of the same
  /// name.
  pub fn allows_identity(&self, field: &str) -> bool {
    self.path(field).is_some_and(|path| path.is_plain(field))
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
