//! Full payloads for appending a new effective-dated version.
//!
//! There is no previous state to diff against, so every defined value for an
//! allowed field is written.

use serde_json::{Map, Value};

use crate::{Result, capability::CapabilityDescriptor, record::Payload};

/// Build the payload for a brand-new version from `values`.
///
/// `values` is form state keyed by logical field; each value is written at
/// the field's payload path, which may rename it or route it into `ext`.
///
/// The descriptor is verified first; any bijection violation or malformed
/// payload path refuses the whole build. Undefined values are omitted, while
/// `null`, `false`, `0`, and `""` are written through.
pub fn build_append_payload(
  descriptor: &CapabilityDescriptor,
  values: &Map<String, Value>,
) -> Result<Payload> {
  let capability = descriptor.verify()?;

  let mut payload = Payload::new();
  for (field, path) in capability.fields() {
    if let Some(value) = values.get(field) {
      payload.insert(path, value.clone());
    }
  }

  tracing::trace!(written = payload.len(), "append payload built");
  Ok(payload)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::Error;

  fn descriptor(keys: &[(&str, &str)]) -> CapabilityDescriptor {
    CapabilityDescriptor {
      allowed_fields:     keys.iter().map(|(k, _)| k.to_string()).collect(),
      field_payload_keys: keys
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect(),
    }
  }

  fn values(value: Value) -> Map<String, Value> {
    match value {
      Value::Object(map) => map,
      other => panic!("expected a JSON object, got {other}"),
    }
  }

  #[test]
  fn undefined_is_omitted_null_is_written() {
    let d = descriptor(&[("a", "a")]);
    let omitted = build_append_payload(&d, &values(json!({}))).unwrap();
    assert_eq!(omitted.to_json(), json!({}));

    let cleared =
      build_append_payload(&d, &values(json!({ "a": null }))).unwrap();
    assert_eq!(cleared.to_json(), json!({ "a": null }));
  }

  #[test]
  fn falsy_values_are_written_through() {
    let d = descriptor(&[
      ("active", "active"),
      ("headcount", "ext.headcount"),
      ("code", "code"),
    ]);
    let v = values(json!({ "active": false, "code": "", "headcount": 0 }));
    let payload = build_append_payload(&d, &v).unwrap();
    assert_eq!(
      payload.to_json(),
      json!({ "active": false, "code": "", "ext": { "headcount": 0 } })
    );
  }

  #[test]
  fn values_are_read_by_logical_field_and_written_at_payload_path() {
    let d = descriptor(&[
      ("org_name", "name"),
      ("cost_center", "ext.cost_center"),
    ]);
    let v = values(json!({ "org_name": "Ops", "cost_center": "CC-1" }));
    let payload = build_append_payload(&d, &v).unwrap();
    assert_eq!(
      payload.to_json(),
      json!({ "name": "Ops", "ext": { "cost_center": "CC-1" } })
    );
  }

  #[test]
  fn values_keyed_by_payload_path_are_not_picked_up() {
    let d = descriptor(&[("org_name", "name")]);
    let v = values(json!({ "name": "Ops" }));
    let payload = build_append_payload(&d, &v).unwrap();
    assert!(payload.is_empty());
  }

  #[test]
  fn unallowed_values_are_dropped() {
    let d = descriptor(&[("name", "name")]);
    let v = values(json!({ "name": "Ops", "salary": 10, "secret": true }));
    let payload = build_append_payload(&d, &v).unwrap();
    assert_eq!(payload.to_json(), json!({ "name": "Ops" }));
  }

  #[test]
  fn bijection_violation_refuses_regardless_of_values() {
    let mut d = descriptor(&[("name", "name"), ("grade", "ext.grade")]);
    d.field_payload_keys.remove("grade");
    for v in [json!({}), json!({ "name": "Ops" }), json!({ "grade": 1 })] {
      let err = build_append_payload(&d, &values(v)).unwrap_err();
      assert_eq!(err, Error::UnmappedField("grade".into()));
    }

    let mut d = descriptor(&[("name", "name")]);
    d.field_payload_keys.insert("salary".into(), "salary".into());
    assert!(build_append_payload(&d, &Map::new()).is_err());
  }

  #[test]
  fn invalid_path_refuses_whole_payload() {
    let d = descriptor(&[("name", "name"), ("grade", "ext.")]);
    let v = values(json!({ "name": "Ops" }));
    let err = build_append_payload(&d, &v).unwrap_err();
    assert!(matches!(err, Error::InvalidPayloadPath { .. }));

    let d = descriptor(&[("name", "profile.name")]);
    assert!(build_append_payload(&d, &v).is_err());
  }

  #[test]
  fn no_extension_values_means_no_ext_key() {
    let d = descriptor(&[("name", "name"), ("grade", "ext.grade")]);
    let payload =
      build_append_payload(&d, &values(json!({ "name": "Ops" }))).unwrap();
    assert!(payload.to_json().get("ext").is_none());
    assert_eq!(payload.to_json(), json!({ "name": "Ops" }));
  }
}
