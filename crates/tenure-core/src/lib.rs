//! Intent resolution for editing effective-dated organisational records.
//!
//! Given a capability descriptor, a previous snapshot, and a desired
//! snapshot, decides which minimal change request to send to the backing
//! store, or refuses. Also resolves which effective-dated version a viewer is
//! looking at for a given as-of date.
//!
//! Everything here is pure and synchronous. Transport, persistence, and the
//! store's own versioning engine live elsewhere.

pub mod append;
pub mod capability;
pub mod correction;
pub mod error;
pub mod patch;
pub mod record;
pub mod temporal;

pub use append::build_append_payload;
pub use capability::{
  CapabilityDescriptor, EXTENSION_BAG, FieldPath, VerifiedCapability,
  validate,
};
pub use correction::{
  CorrectionIntent, EFFECTIVE_DATE_FIELD, build_correction_patch,
  classify_correction,
};
pub use error::{Error, Result};
pub use patch::build_patch;
pub use record::{Payload, Record, same_value};
pub use temporal::{
  FieldPolicyEnablement, VersionDescriptor, is_calendar_date,
  parse_calendar_date, resolve_as_of_after_policy_save,
  resolve_effective_date, should_show_future_effective_hint,
};
