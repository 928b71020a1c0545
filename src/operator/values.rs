//! Value semantics shared by the built-in operators
//!
//! Queries come from a dynamically typed world, so scalar comparisons are
//! loose: `"5"` equals `5`, `true` equals `1`, `null` equals an absent value,
//! and ordering between mixed types goes through numeric coercion. An absent
//! value is `None` throughout; it coerces to no number at all, so every
//! ordered comparison against it is false.

use serde_json::Value;
use std::cmp::Ordering;

/// Whether a value counts as "true" when a condition result is needed.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Coerce a value to a number. `None` stands for "not a number".
pub fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [single] => parse_number(&to_primitive_string(single)),
            _ => None,
        },
        Value::Object(_) => None,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return match trimmed {
            "Infinity" | "+Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        };
    }
    trimmed.parse::<f64>().ok()
}

/// String form of a value, as used when a structured value meets a scalar.
fn to_primitive_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_primitive_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
        other => other.to_string(),
    }
}

/// Loose scalar equality.
///
/// Absent and `null` equal each other and nothing else. Scalars of different
/// types coerce towards numbers. An array or object against a scalar
/// compares through its string form. Two arrays or objects compare
/// structurally, as JSON values carry no identity.
pub fn loose_eq(left: Option<&Value>, right: Option<&Value>) -> bool {
    let (left, right) = match (left, right) {
        (None | Some(Value::Null), None | Some(Value::Null)) => return true,
        (None | Some(Value::Null), _) | (_, None | Some(Value::Null)) => return false,
        (Some(left), Some(right)) => (left, right),
    };

    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => left == right,
        (Value::Array(_) | Value::Object(_), scalar) | (scalar, Value::Array(_) | Value::Object(_)) => {
            let structured = if left.is_array() || left.is_object() {
                left
            } else {
                right
            };
            let primitive = Value::String(to_primitive_string(structured));
            loose_eq(Some(&primitive), Some(scalar))
        }
        _ => match (to_number(Some(left)), to_number(Some(right))) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// Ordering between two values: strings compare lexically, everything else
/// numerically. `None` when the values are not comparable.
pub fn compare(left: Option<&Value>, right: Option<&Value>) -> Option<Ordering> {
    let (left, right) = (left?, right?);

    let left_text = primitive_text(left);
    let right_text = primitive_text(right);
    if let (Some(a), Some(b)) = (&left_text, &right_text) {
        return Some(a.cmp(b));
    }

    to_number(Some(left))?.partial_cmp(&to_number(Some(right))?)
}

fn primitive_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(to_primitive_string(value)),
        _ => None,
    }
}

/// Turn a computed number back into a JSON value. Non-finite results are absent.
pub fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        Some(Value::from(n))
    }
}

/// Round half up, towards positive infinity.
pub fn round_half_up(n: f64) -> f64 {
    (n + 0.5).floor()
}

/// Emptiness: empty containers, null, absent, falsy scalars and the string `"0"`.
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(Value::String(s)) if s == "0" => true,
        other => !truthy(other),
    }
}
