//! Subcommands: decode a JSON request, call the engine, encode the result.

use std::process::ExitCode;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use tenure_core::{
  CapabilityDescriptor, Payload, Record, VersionDescriptor,
  build_append_payload, build_correction_patch, build_patch,
  resolve_as_of_after_policy_save, resolve_effective_date, validate,
};

/// Exit status for a request the engine refused.
const REFUSED_EXIT_CODE: u8 = 2;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  /// Check a capability descriptor.
  Validate,
  /// Minimal-diff patch between two snapshots.
  Patch,
  /// Correction request: effective-date move or field patch.
  Correct,
  /// Full payload for a new version.
  Append,
  /// Effective date to display for an as-of date.
  ResolveDate,
  /// Whether saving a field policy should advance the as-of date.
  PolicyHint,
}

// ─── Requests ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PatchRequest {
  capability: CapabilityDescriptor,
  #[serde(default)]
  original:   Record,
  #[serde(default)]
  next:       Record,
}

#[derive(Deserialize)]
struct CorrectRequest {
  capability:               CapabilityDescriptor,
  current_effective_date:   String,
  #[serde(default)]
  corrected_effective_date: Option<String>,
  #[serde(default)]
  original:                 Record,
  #[serde(default)]
  next:                     Record,
}

#[derive(Deserialize)]
struct AppendRequest {
  capability: CapabilityDescriptor,
  /// Keyed by logical field, not payload path.
  #[serde(default)]
  values:     Map<String, Value>,
}

#[derive(Deserialize)]
struct ResolveDateRequest {
  as_of:          NaiveDate,
  #[serde(default)]
  requested_date: Option<String>,
  #[serde(default)]
  versions:       Vec<VersionDescriptor>,
}

#[derive(Deserialize)]
struct PolicyHintRequest {
  current_as_of: String,
  enabled_on:    String,
}

// ─── Outcome ──────────────────────────────────────────────────────────────────

/// The JSON to print and whether the engine refused the request.
#[derive(Debug, PartialEq)]
pub struct Outcome {
  pub output:  Value,
  pub refused: bool,
}

impl Outcome {
  fn answered(output: Value) -> Self {
    Self {
      output,
      refused: false,
    }
  }

  fn from_payload(result: tenure_core::Result<Payload>) -> Self {
    match result {
      Ok(payload) => Self::answered(payload.to_json()),
      Err(err) => {
        tracing::warn!(%err, "request refused");
        Self {
          output:  Value::Null,
          refused: true,
        }
      }
    }
  }

  pub fn exit_code(&self) -> ExitCode {
    if self.refused {
      ExitCode::from(REFUSED_EXIT_CODE)
    } else {
      ExitCode::SUCCESS
    }
  }
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

/// Run `command` against the raw JSON request `input`.
///
/// Malformed JSON is an error; an engine refusal is an [`Outcome`] with
/// `refused` set.
pub fn run(command: Command, input: &str) -> Result<Outcome> {
  tracing::debug!(?command, "running");
  let outcome = match command {
    Command::Validate => {
      let descriptor: CapabilityDescriptor = decode(input)?;
      let verified = descriptor.verify();
      Outcome::answered(json!({
        "valid":    validate(&descriptor),
        "verified": verified.is_ok(),
        "error":    verified.err().map(|e| e.to_string()),
      }))
    }
    Command::Patch => {
      let req: PatchRequest = decode(input)?;
      Outcome::from_payload(
        req
          .capability
          .verify()
          .map(|cap| build_patch(&cap, &req.original, &req.next)),
      )
    }
    Command::Correct => {
      let req: CorrectRequest = decode(input)?;
      Outcome::from_payload(req.capability.verify().and_then(|cap| {
        build_correction_patch(
          &cap,
          &req.current_effective_date,
          req.corrected_effective_date.as_deref(),
          &req.original,
          &req.next,
        )
      }))
    }
    Command::Append => {
      let req: AppendRequest = decode(input)?;
      Outcome::from_payload(build_append_payload(&req.capability, &req.values))
    }
    Command::ResolveDate => {
      let req: ResolveDateRequest = decode(input)?;
      let resolved = resolve_effective_date(
        req.as_of,
        req.requested_date.as_deref(),
        &req.versions,
      );
      Outcome::answered(json!({ "effective_date": resolved }))
    }
    Command::PolicyHint => {
      let req: PolicyHintRequest = decode(input)?;
      let as_of =
        resolve_as_of_after_policy_save(&req.current_as_of, &req.enabled_on);
      Outcome::answered(json!({
        "as_of": as_of,
        "show_future_effective_hint": as_of.is_some(),
      }))
    }
  };
  Ok(outcome)
}

fn decode<T: DeserializeOwned>(input: &str) -> Result<T> {
  serde_json::from_str(input).context("failed to decode request JSON")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  const CAPABILITY: &str = r#"{
    "allowed_fields": ["effective_date", "name", "cost_center"],
    "field_payload_keys": {
      "effective_date": "effective_date",
      "name": "name",
      "cost_center": "ext.cost_center"
    }
  }"#;

  fn request(body: Value) -> String { body.to_string() }

  fn capability() -> Value { serde_json::from_str(CAPABILITY).unwrap() }

  #[test]
  fn validate_reports_bijection_and_paths() {
    let out = run(Command::Validate, CAPABILITY).unwrap();
    assert_eq!(
      out.output,
      json!({ "valid": true, "verified": true, "error": null })
    );

    let bad = json!({
      "allowed_fields": ["name"],
      "field_payload_keys": { "name": "a.b" }
    });
    let out = run(Command::Validate, &request(bad)).unwrap();
    assert_eq!(out.output["valid"], json!(true));
    assert_eq!(out.output["verified"], json!(false));
    assert!(out.output["error"].is_string());
    assert!(!out.refused);
  }

  #[test]
  fn patch_emits_minimal_diff() {
    let body = json!({
      "capability": capability(),
      "original": { "name": "Finance", "ext": { "cost_center": "CC-1" } },
      "next": { "name": "Finance", "ext": { "cost_center": null } }
    });
    let out = run(Command::Patch, &request(body)).unwrap();
    assert_eq!(out.output, json!({ "ext": { "cost_center": null } }));
    assert!(!out.refused);
  }

  #[test]
  fn patch_with_inconsistent_capability_is_refused() {
    let body = json!({
      "capability": { "allowed_fields": ["name"], "field_payload_keys": {} },
      "original": {},
      "next": { "name": "x" }
    });
    let out = run(Command::Patch, &request(body)).unwrap();
    assert!(out.refused);
    assert_eq!(out.output, Value::Null);
  }

  #[test]
  fn correct_moves_effective_date_only() {
    let body = json!({
      "capability": capability(),
      "current_effective_date": "2026-01-01",
      "corrected_effective_date": "2026-02-01",
      "original": { "name": "Finance" },
      "next": { "name": "Treasury" }
    });
    let out = run(Command::Correct, &request(body)).unwrap();
    assert_eq!(out.output, json!({ "effective_date": "2026-02-01" }));
  }

  #[test]
  fn correct_without_date_permission_is_refused() {
    let body = json!({
      "capability": {
        "allowed_fields": ["name"],
        "field_payload_keys": { "name": "name" }
      },
      "current_effective_date": "2026-01-01",
      "corrected_effective_date": "2026-02-01",
      "original": {},
      "next": {}
    });
    let out = run(Command::Correct, &request(body)).unwrap();
    assert!(out.refused);
  }

  #[test]
  fn append_writes_defined_values() {
    let body = json!({
      "capability": capability(),
      "values": { "name": "Ops", "effective_date": "2026-03-01" }
    });
    let out = run(Command::Append, &request(body)).unwrap();
    assert_eq!(
      out.output,
      json!({ "name": "Ops", "effective_date": "2026-03-01" })
    );
  }

  #[test]
  fn resolve_date_falls_back_to_nearest_version() {
    let body = json!({
      "as_of": "2026-02-13",
      "requested_date": null,
      "versions": [
        { "effective_date": "2026-01-01" },
        { "effective_date": "2026-01-02" },
        { "effective_date": "2026-02-01" }
      ]
    });
    let out = run(Command::ResolveDate, &request(body)).unwrap();
    assert_eq!(out.output, json!({ "effective_date": "2026-02-01" }));
  }

  #[test]
  fn append_reads_values_by_logical_field() {
    let body = json!({
      "capability": {
        "allowed_fields": ["org_name", "cost_center"],
        "field_payload_keys": {
          "org_name": "name",
          "cost_center": "ext.cost_center"
        }
      },
      "values": { "org_name": "Ops", "cost_center": "CC-1" }
    });
    let out = run(Command::Append, &request(body)).unwrap();
    assert_eq!(
      out.output,
      json!({ "name": "Ops", "ext": { "cost_center": "CC-1" } })
    );
  }

  #[test]
  fn resolve_date_skips_malformed_versions() {
    let input = r#"{"as_of":"2026-02-13","versions":[{"effective_date":"2026-01-01"},{"effective_date":"bogus"}]}"#;
    let out = run(Command::ResolveDate, input).unwrap();
    assert_eq!(out.output, json!({ "effective_date": "2026-01-01" }));
    assert!(!out.refused);
  }

  #[test]
  fn policy_hint_reports_advancement() {
    let body = json!({ "current_as_of": "2026-01-01", "enabled_on": "2026-02-20" });
    let out = run(Command::PolicyHint, &request(body)).unwrap();
    assert_eq!(
      out.output,
      json!({ "as_of": "2026-02-20", "show_future_effective_hint": true })
    );

    let body = json!({ "current_as_of": "2026-02-20", "enabled_on": "junk" });
    let out = run(Command::PolicyHint, &request(body)).unwrap();
    assert_eq!(
      out.output,
      json!({ "as_of": null, "show_future_effective_hint": false })
    );
  }

  #[test]
  fn malformed_json_is_an_error() {
    assert!(run(Command::Append, "{not json").is_err());
    assert!(run(Command::ResolveDate, r#"{"as_of":"yesterday"}"#).is_err());
  }
}
