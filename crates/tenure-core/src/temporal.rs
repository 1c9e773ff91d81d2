//! Temporal resolution over a record's effective-dated history.
//!
//! Two independent questions:
//!
//! - which version a viewer at a given as-of date is looking at, and
//! - whether saving a field policy should move the viewer's as-of date
//!   forward so the newly enabled field becomes visible.
//!
//! Both are total. Malformed date strings are normalised to a safe fallback,
//! never reported as errors, because they usually arrive from free text or
//! query strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical calendar date format.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Types ───────────────────────────────────────────────────────────────────

/// One point in a record's effective-dated history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionDescriptor {
  /// Kept as received; an entry that is not a calendar date is ignored by
  /// resolution.
  pub effective_date: String,
}

impl VersionDescriptor {
  pub fn date(&self) -> Option<NaiveDate> {
    parse_calendar_date(&self.effective_date)
  }
}

impl From<&str> for VersionDescriptor {
  fn from(effective_date: &str) -> Self {
    Self {
      effective_date: effective_date.to_string(),
    }
  }
}

/// The date from which a newly enabled field becomes read/write eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPolicyEnablement {
  /// Kept as received; validated when used.
  pub enabled_on: String,
}

impl FieldPolicyEnablement {
  /// See [`resolve_as_of_after_policy_save`].
  pub fn advance_as_of(&self, current_as_of: &str) -> Option<NaiveDate> {
    resolve_as_of_after_policy_save(current_as_of, &self.enabled_on)
  }
}

// ─── Calendar dates ──────────────────────────────────────────────────────────

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// Exactly ten characters, ASCII digits, and a real Gregorian day. Padding,
/// signs, times, and out-of-range days are all rejected.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
  let bytes = input.as_bytes();
  if bytes.len() != 10 {
    return None;
  }
  let shaped = bytes.iter().enumerate().all(|(i, b)| match i {
    4 | 7 => *b == b'-',
    _ => b.is_ascii_digit(),
  });
  if !shaped {
    return None;
  }
  NaiveDate::parse_from_str(input, DATE_FORMAT).ok()
}

pub fn is_calendar_date(input: &str) -> bool {
  parse_calendar_date(input).is_some()
}

// ─── Effective-date resolution ───────────────────────────────────────────────

/// Resolve the effective date to display or edit.
///
/// 1. With no versions, the requested date if well-formed, else `as_of`.
/// 2. A well-formed requested date that matches a version exactly wins, even
///    if it postdates `as_of`.
/// 3. Otherwise the latest version on or before `as_of`, falling back to the
///    earliest version when every version postdates `as_of`.
///
/// A malformed requested date behaves exactly like no request. Versions whose
/// date is malformed are skipped; if none remain, the list counts as empty.
/// Among versions sharing a date the last one in traversal order is kept.
pub fn resolve_effective_date(
  as_of: NaiveDate,
  requested_date: Option<&str>,
  versions: &[VersionDescriptor],
) -> NaiveDate {
  let requested = requested_date.and_then(parse_calendar_date);

  let dates: Vec<NaiveDate> = versions
    .iter()
    .filter_map(|version| {
      let date = version.date();
      if date.is_none() {
        tracing::debug!(
          effective_date = %version.effective_date,
          "skipping version with malformed effective date"
        );
      }
      date
    })
    .collect();

  if dates.is_empty() {
    return requested.unwrap_or(as_of);
  }

  if let Some(requested) = requested
    && dates.contains(&requested)
  {
    return requested;
  }

  let mut earliest: Option<NaiveDate> = None;
  let mut latest_not_after: Option<NaiveDate> = None;
  for date in dates {
    if earliest.is_none_or(|e| date < e) {
      earliest = Some(date);
    }
    if date <= as_of && latest_not_after.is_none_or(|l| date >= l) {
      latest_not_after = Some(date);
    }
  }

  latest_not_after.or(earliest).unwrap_or(as_of)
}

// ─── As-of advancement ───────────────────────────────────────────────────────

/// After a field policy is saved, the as-of date the viewer should move to,
/// if any.
///
/// Returns `enabled_on` when it is strictly after `current_as_of`. Returns
/// `None` when it is not, or when either date is malformed.
pub fn resolve_as_of_after_policy_save(
  current_as_of: &str,
  enabled_on: &str,
) -> Option<NaiveDate> {
  let current = parse_calendar_date(current_as_of)?;
  let enabled = parse_calendar_date(enabled_on)?;
  (enabled > current).then_some(enabled)
}

/// Whether to tell the viewer the saved policy takes effect in the future.
pub fn should_show_future_effective_hint(
  current_as_of: &str,
  enabled_on: &str,
) -> bool {
  resolve_as_of_after_policy_save(current_as_of, enabled_on).is_some()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
