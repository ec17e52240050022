//! Distinct deep merge for configuration trees.
//!
//! Associative mappings are merged key by key with later values winning.
//! Sequences are merged as a deduplicated union: an overlay entry is appended
//! only when no structurally equal entry is already present. A mapping inside
//! a sequence is the exception: it merges into the entry at the same position.

use super::node::{ConfigMap, ConfigNode, is_associative, is_collection, is_numeric_key};
use crate::error::{ConfigError, Result};
use serde_json::Value;

/// Maximum nesting depth the merge will descend before giving up.
pub const MAX_MERGE_DEPTH: usize = 128;

/// Merge `overlay` into `base` with distinct semantics.
///
/// - Mappings merge recursively; an overlay key replaces a scalar base value
/// - Sequences merge as a deduplicated union (`[1, 2]` + `[2, 3]` = `[1, 2, 3]`),
///   except mappings, which merge into the entry at their position
/// - A sequence replaces a mapping
/// - A scalar overlay is treated as a one-element sequence
///
/// # Example
/// ```
/// use serde_json::json;
/// use staged_config::config::distinct_merge;
///
/// let base = json!({"server": {"port": 8080, "host": "localhost"}, "tags": ["a"]});
/// let overlay = json!({"server": {"port": 9000}, "tags": ["a", "b"]});
/// let merged = distinct_merge(base, overlay).unwrap();
/// assert_eq!(
///     merged,
///     json!({"server": {"port": 9000, "host": "localhost"}, "tags": ["a", "b"]})
/// );
/// ```
pub fn distinct_merge(base: ConfigNode, overlay: ConfigNode) -> Result<ConfigNode> {
    merge_at(base, overlay, 0)
}

/// Merge `base` with each overlay in order.
///
/// With no overlays the base is returned unchanged.
pub fn merge(base: ConfigNode, overlays: impl IntoIterator<Item = ConfigNode>) -> Result<ConfigNode> {
    overlays.into_iter().try_fold(base, distinct_merge)
}

/// Fold every value into an initially empty tree, later values taking precedence.
pub fn distinct_merge_all(values: impl IntoIterator<Item = ConfigNode>) -> Result<ConfigNode> {
    merge(Value::Array(Vec::new()), values)
}

/// Key of an overlay entry: a sequence position or a mapping key.
enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    fn is_numeric(&self) -> bool {
        match self {
            Key::Index(_) => true,
            Key::Name(name) => is_numeric_key(name),
        }
    }

    fn as_string(&self) -> String {
        match self {
            Key::Index(i) => i.to_string(),
            Key::Name(name) => name.clone(),
        }
    }
}

/// Working form of a base node while entries are merged into it.
enum Shape {
    List(Vec<ConfigNode>),
    Map(ConfigMap),
}

impl Shape {
    /// Collections keep their shape; an empty mapping becomes an empty list so
    /// the first overlay decides the shape. Null becomes empty, other scalars
    /// become one-element lists.
    fn from_node(node: ConfigNode) -> Self {
        match node {
            Value::Array(items) => Shape::List(items),
            Value::Object(map) if map.is_empty() => Shape::List(Vec::new()),
            Value::Object(map) => Shape::Map(map),
            Value::Null => Shape::List(Vec::new()),
            scalar => Shape::List(vec![scalar]),
        }
    }

    fn into_node(self) -> ConfigNode {
        match self {
            Shape::List(items) => Value::Array(items),
            Shape::Map(map) => Value::Object(map),
        }
    }

    fn get(&self, key: &Key) -> Option<&ConfigNode> {
        match (self, key) {
            (Shape::List(items), Key::Index(i)) => items.get(*i),
            (Shape::List(items), Key::Name(name)) => name
                .parse::<usize>()
                .ok()
                .filter(|i| i.to_string() == *name)
                .and_then(|i| items.get(i)),
            (Shape::Map(map), key) => map.get(&key.as_string()),
        }
    }

    fn take(&mut self, key: &Key) -> Option<ConfigNode> {
        match self {
            Shape::List(_) => self.get(key).cloned(),
            Shape::Map(map) => map.get_mut(&key.as_string()).map(|v| v.take()),
        }
    }

    fn contains_value(&self, value: &ConfigNode) -> bool {
        match self {
            Shape::List(items) => items.contains(value),
            Shape::Map(map) => map.values().any(|v| v == value),
        }
    }

    /// Append with the next free integer key.
    fn push(&mut self, value: ConfigNode) {
        match self {
            Shape::List(items) => items.push(value),
            Shape::Map(map) => {
                let next = map
                    .keys()
                    .filter_map(|k| k.parse::<i64>().ok().filter(|i| i.to_string() == *k))
                    .max()
                    .map_or(0, |max| max + 1)
                    .max(0);
                map.insert(next.to_string(), value);
            }
        }
    }

    /// Set a key, turning a list into a mapping when the key is not a position
    /// the list already holds.
    fn set(&mut self, key: &Key, value: ConfigNode) {
        if let Shape::List(items) = self {
            let position = match key {
                Key::Index(i) => Some(*i),
                Key::Name(name) => name.parse::<usize>().ok().filter(|i| i.to_string() == *name),
            };
            match position {
                Some(i) if i < items.len() => {
                    items[i] = value;
                    return;
                }
                Some(i) if i == items.len() => {
                    items.push(value);
                    return;
                }
                _ => {
                    let map = std::mem::take(items)
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), v))
                        .collect();
                    *self = Shape::Map(map);
                }
            }
        }
        if let Shape::Map(map) = self {
            map.insert(key.as_string(), value);
        }
    }
}

fn entries(overlay: ConfigNode) -> Vec<(Key, ConfigNode)> {
    match overlay {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Index(i), v))
            .collect(),
        Value::Object(map) => map.into_iter().map(|(k, v)| (Key::Name(k), v)).collect(),
        scalar => vec![(Key::Index(0), scalar)],
    }
}

fn merge_at(base: ConfigNode, overlay: ConfigNode, depth: usize) -> Result<ConfigNode> {
    if depth >= MAX_MERGE_DEPTH {
        return Err(ConfigError::NestingTooDeep {
            limit: MAX_MERGE_DEPTH,
        });
    }

    let mut base = Shape::from_node(base);

    for (key, value) in entries(overlay) {
        let numeric = key.is_numeric();

        let existing = base.get(&key);
        if existing.is_none() && !numeric {
            base.set(&key, value);
            continue;
        }

        // Lists under the same key union; a list never folds into a mapping.
        let nested = if is_associative(&value) {
            true
        } else if numeric {
            false
        } else {
            is_collection(&value)
                && existing.is_some_and(|current| is_collection(current) && !is_associative(current))
        };

        if nested {
            let current = base.take(&key).unwrap_or(Value::Null);
            let merged = merge_at(current, value, depth + 1)?;
            base.set(&key, merged);
        } else if numeric {
            if !base.contains_value(&value) {
                base.push(value);
            }
        } else {
            base.set(&key, value);
        }
    }

    Ok(base.into_node())
}
