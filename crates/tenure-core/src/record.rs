//! Record snapshots, sparse payloads, and the value comparator used to diff
//! them.
//!
//! An absent key means "no opinion"; an explicit JSON `null` is a real value
//! meaning "clear this field". The two are never conflated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::capability::FieldPath;

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One state of an editable record: top-level fields plus an optional
/// extension bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
  /// Values of dynamically configured extension fields.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ext:    Option<Map<String, Value>>,
  #[serde(flatten)]
  pub fields: Map<String, Value>,
}

impl Record {
  /// Read the value at `path`. `None` means the field is undefined.
  pub fn get(&self, path: &FieldPath) -> Option<&Value> {
    match path {
      FieldPath::Plain(key) => self.fields.get(key),
      FieldPath::Extension(name) => self.ext.as_ref()?.get(name),
    }
  }
}

impl From<Value> for Record {
  /// Builds a record from a JSON object. Non-object values, and an `ext`
  /// entry that is not an object, contribute nothing.
  fn from(value: Value) -> Self {
    let Value::Object(mut fields) = value else {
      return Self::default();
    };
    let ext = match fields.remove(crate::capability::EXTENSION_BAG) {
      Some(Value::Object(bag)) => Some(bag),
      _ => None,
    };
    Self { ext, fields }
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// A sparse request body: a correction patch or an append payload.
///
/// The extension bag is created on first write, so a payload never carries an
/// empty `ext` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Payload {
  #[serde(flatten)]
  fields: Map<String, Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  ext:    Option<Map<String, Value>>,
}

impl Payload {
  pub fn new() -> Self { Self::default() }

  /// Write `value` at `path`, creating the extension bag if needed.
  pub fn insert(&mut self, path: &FieldPath, value: Value) {
    match path {
      FieldPath::Plain(key) => {
        self.fields.insert(key.clone(), value);
      }
      FieldPath::Extension(name) => {
        self
          .ext
          .get_or_insert_with(Map::new)
          .insert(name.clone(), value);
      }
    }
  }

  /// Number of written values, counting each extension field separately.
  pub fn len(&self) -> usize {
    self.fields.len() + self.ext.as_ref().map_or(0, Map::len)
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// The JSON request body.
  pub fn to_json(&self) -> Value {
    let mut body = self.fields.clone();
    if let Some(ext) = &self.ext {
      body.insert(
        crate::capability::EXTENSION_BAG.to_string(),
        Value::Object(ext.clone()),
      );
    }
    Value::Object(body)
  }
}

// ─── Comparison ──────────────────────────────────────────────────────────────

/// Same-value equality: `+0` and `-0` differ, `NaN` equals itself, and an
/// integer equals the float with the same value. Arrays and objects compare
/// member-wise.
pub fn same_value(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => same_number(x, y),
    (Value::Array(x), Value::Array(y)) => {
      x.len() == y.len() && x.iter().zip(y).all(|(a, b)| same_value(a, b))
    }
    (Value::Object(x), Value::Object(y)) => {
      x.len() == y.len()
        && x
          .iter()
          .all(|(key, a)| y.get(key).is_some_and(|b| same_value(a, b)))
    }
    _ => a == b,
  }
}

fn same_number(x: &Number, y: &Number) -> bool {
  if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
    return a == b;
  }
  if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
    return a == b;
  }
  match (x.as_f64(), y.as_f64()) {
    (Some(a), Some(b)) if a.is_nan() || b.is_nan() => a.is_nan() && b.is_nan(),
    (Some(a), Some(b)) => a.to_bits() == b.to_bits(),
    _ => false,
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
