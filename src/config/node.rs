//! In-memory representation of configuration values.
//!
//! A [`ConfigNode`] is a `serde_json::Value` built with `preserve_order`, so
//! mappings keep the order keys were authored in. YAML is parsed with
//! `serde_yaml` and converted here, which is where non-string YAML keys get
//! their string form.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;

/// A configuration value: scalar, ordered sequence, or ordered string-keyed mapping.
pub type ConfigNode = Value;

/// Ordered mapping of configuration keys to values.
pub type ConfigMap = Map<String, Value>;

/// Convert a parsed YAML value into a [`ConfigNode`].
///
/// Scalar mapping keys are stringified (`1` becomes `"1"`), a `null` key becomes
/// the empty string and tagged values lose their tag. Compound keys are rendered
/// as flow YAML so they stay distinct.
pub fn from_yaml(value: Yaml) -> ConfigNode {
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(from_yaml).collect()),
        Yaml::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                map.insert(yaml_key(&key), from_yaml(value));
            }
            Value::Object(map)
        }
        Yaml::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        let f = n.as_f64().unwrap_or(f64::NAN);
        // .inf and .nan have no JSON number form
        Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

fn yaml_key(key: &Yaml) -> String {
    match key {
        Yaml::Null => String::new(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::String(s) => s.clone(),
        Yaml::Tagged(tagged) => yaml_key(&tagged.value),
        compound => serde_yaml::to_string(compound)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Whether a key looks like a number (`"0"`, `"-3"`, `"1.5"`).
pub fn is_numeric_key(key: &str) -> bool {
    let trimmed = key.trim_start();
    !trimmed.is_empty()
        && trimmed == key
        && key.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Classify a node as associative (object-shaped) or list-shaped.
///
/// Empty collections and sequences are list-shaped. A mapping is list-shaped
/// when its keys are exactly `"0"`, `"1"`, ... in order. Scalars are never
/// associative.
pub fn is_associative(node: &ConfigNode) -> bool {
    match node {
        Value::Object(map) => !map.is_empty() && !is_list_shaped(map),
        _ => false,
    }
}

/// Whether a mapping's keys are the contiguous index range `0..len` in order.
pub fn is_list_shaped(map: &ConfigMap) -> bool {
    map.keys()
        .enumerate()
        .all(|(i, key)| key.parse::<usize>().is_ok_and(|k| k == i && key == &k.to_string()))
}

/// Whether a node is a mapping or a sequence.
pub fn is_collection(node: &ConfigNode) -> bool {
    matches!(node, Value::Object(_) | Value::Array(_))
}

/// Whether a node counts as empty: null, `false`, zero, `""`, `"0"` or an
/// empty collection.
pub fn is_empty(node: &ConfigNode) -> bool {
    match node {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
