//! User data in the side table
//!
//! Keys are normalized to camelCase. A key with no stored value falls back
//! to the matching `data-*` attribute, parsed as JSON when it is valid JSON
//! and kept as a string otherwise; the value read is stored so later reads
//! do not go back to the attribute.

use serde_json::{Map, Value};
use sr_dom::NodeId;

use crate::util::{camel_case, camel_to_kebab};
use crate::Runtime;

fn parse_attribute(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub(crate) fn get(rt: &mut Runtime, node: NodeId, key: &str) -> Option<Value> {
    let key = camel_case(key);
    if let Some(value) = rt.side_table.get(node).and_then(|r| r.data.get(&key)) {
        return Some(value.clone());
    }

    let attribute = format!("data-{}", camel_to_kebab(&key));
    let value = parse_attribute(rt.doc.attribute(node, &attribute)?);
    rt.side_table.entry(node).data.insert(key, value.clone());
    Some(value)
}

/// Every stored value, with unread `data-*` attributes primed first
pub(crate) fn get_all(rt: &mut Runtime, node: NodeId) -> Map<String, Value> {
    let from_attributes: Vec<(String, Value)> = rt
        .doc
        .element(node)
        .map(|element| {
            element
                .attrs
                .iter()
                .filter_map(|attr| {
                    let name = attr.name.strip_prefix("data-")?;
                    Some((camel_case(name), parse_attribute(&attr.value)))
                })
                .collect()
        })
        .unwrap_or_default();

    if !from_attributes.is_empty() {
        let data = &mut rt.side_table.entry(node).data;
        for (key, value) in from_attributes {
            data.entry(key).or_insert(value);
        }
    }
    rt.side_table
        .get(node)
        .map(|record| record.data.clone())
        .unwrap_or_default()
}

pub(crate) fn set(rt: &mut Runtime, node: NodeId, key: &str, value: Value) {
    if rt.doc.node(node).is_none() {
        tracing::warn!("data({}): unknown node {}", key, node);
        return;
    }
    rt.side_table.entry(node).data.insert(camel_case(key), value);
}

/// Delete `keys`, or all user data when `keys` is empty
pub(crate) fn remove(rt: &mut Runtime, node: NodeId, keys: &[&str]) {
    let Some(record) = rt.side_table.get_mut(node) else {
        return;
    };
    if keys.is_empty() {
        record.data.clear();
    } else {
        for key in keys {
            record.data.remove(&camel_case(key));
        }
    }
    rt.side_table.prune(node);
}
