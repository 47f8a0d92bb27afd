//! Form serialization
//!
//! Nested objects become `a[b]=`, arrays of scalars `a[]=`, and arrays that
//! hold objects or arrays use the index, `a[0][b]=`. Keys come out sorted.

use serde_json::Value;
use url::form_urlencoded::byte_serialize;

/// Serialize a JSON value as `application/x-www-form-urlencoded`
///
/// A top-level scalar has no key to attach to and serializes as its text.
pub fn to_query_string(value: &Value) -> String {
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                push_pairs(key, inner, &mut pairs);
            }
        }
        Value::Array(items) => {
            for (index, inner) in items.iter().enumerate() {
                push_pairs(&index.to_string(), inner, &mut pairs);
            }
        }
        Value::Null => {}
        scalar => return encode(&scalar_text(scalar)),
    }
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn push_pairs(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                push_pairs(&format!("{prefix}[{key}]"), inner, out);
            }
        }
        Value::Array(items) => {
            for (index, inner) in items.iter().enumerate() {
                if inner.is_object() || inner.is_array() {
                    push_pairs(&format!("{prefix}[{index}]"), inner, out);
                } else {
                    out.push((format!("{prefix}[]"), scalar_text(inner)));
                }
            }
        }
        scalar => out.push((prefix.to_string(), scalar_text(scalar))),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encode(text: &str) -> String {
    byte_serialize(text.as_bytes()).collect()
}
