//! Request-key decoding.
//!
//! The request parameter namespace has three groups: `f` (filters), `o`
//! (orders) and `q` (scope queries). Each group accepts three interchangeable
//! key shapes, freely mixable within one request:
//!
//! - flat double-underscore keys: `f__status__eq=1`
//! - literal bracket keys: `f[status][eq]=1` (query-string layers on this
//!   side of the fence hand brackets through as literal text, so the decoder
//!   parses them itself)
//! - an already-nested value: key `f` with the JSON object
//!   `{"status": {"eq": 1}}`
//!
//! All three merge into the same `group → field → operator` shape. A raw
//! scalar at the field level (`f[status]=1`) leaves the operator slot to the
//! caller's default (equality). Keys outside the three groups are ignored;
//! paging keys are read separately by [`crate::pagination::PageSpec`].

use serde_json::{Map, Value as JsonValue};

/// Decoded request parameters, one nested map per group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedParams {
    /// `field → scalar` or `field → {operator: value}`.
    pub filters: Map<String, JsonValue>,
    /// `field → direction`.
    pub orders: Map<String, JsonValue>,
    /// `scope name → argument value`.
    pub queries: Map<String, JsonValue>,
}

const FILTER_GROUP: &str = "f";
const ORDER_GROUP: &str = "o";
const QUERY_GROUP: &str = "q";

/// Decode a raw parameter map into its three groups.
#[must_use]
pub fn decode_params(params: &Map<String, JsonValue>) -> DecodedParams {
    let mut decoded = DecodedParams::default();
    for (key, value) in params {
        let segments = split_key(key);
        let Some((group, path)) = segments.split_first() else {
            continue;
        };
        let target = match group.as_str() {
            FILTER_GROUP => &mut decoded.filters,
            ORDER_GROUP => &mut decoded.orders,
            QUERY_GROUP => &mut decoded.queries,
            _ => continue,
        };
        merge_path(target, path, value.clone());
    }
    decoded
}

/// Split a raw key into group/field/operator segments.
///
/// Bracket keys split on each `[...]`; plain keys split on the first two
/// `__` delimiters only: the shape is two levels deep at most, so a third
/// delimiter is part of the operator token, never further nesting.
fn split_key(key: &str) -> Vec<String> {
    if let Some(open) = key.find('[') {
        if !key.ends_with(']') {
            return vec![key.to_string()];
        }
        let mut segments = vec![key[..open].to_string()];
        for part in key[open..].split('[') {
            if part.is_empty() {
                continue;
            }
            match part.strip_suffix(']') {
                Some(segment) => segments.push(segment.to_string()),
                // malformed bracket run, keep the whole key opaque
                None => return vec![key.to_string()],
            }
        }
        return segments;
    }
    key.splitn(3, "__").map(str::to_string).collect()
}

/// Merge `value` into `target` at `path`, deep-merging objects so the three
/// key shapes can address the same field without clobbering each other.
fn merge_path(target: &mut Map<String, JsonValue>, path: &[String], value: JsonValue) {
    match path.split_first() {
        // bare group key: the value itself is the nested form
        None => {
            if let JsonValue::Object(entries) = value {
                for (key, nested) in entries {
                    merge_entry(target, key, nested);
                }
            }
        }
        Some((head, rest)) => merge_entry(target, head.clone(), nest(rest, value)),
    }
}

/// Wrap `value` in objects keyed by `path`, innermost last.
fn nest(path: &[String], value: JsonValue) -> JsonValue {
    path.iter().rev().fold(value, |inner, key| {
        let mut wrapper = Map::new();
        wrapper.insert(key.clone(), inner);
        JsonValue::Object(wrapper)
    })
}

fn merge_entry(target: &mut Map<String, JsonValue>, key: String, value: JsonValue) {
    match value {
        JsonValue::Object(incoming) => {
            let slot = target
                .entry(key)
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if let JsonValue::Object(existing) = slot {
                for (nested_key, nested_value) in incoming {
                    merge_entry(existing, nested_key, nested_value);
                }
            } else {
                *slot = JsonValue::Object(incoming);
            }
        }
        scalar => {
            target.insert(key, scalar);
        }
    }
}
