//! Dot-path lookup over a configuration tree.
//!
//! `a.b.c` walks mappings key by key. A numeric segment also indexes into a
//! sequence (`hosts.0`). The `*` segment fans out over every child at that
//! level and collects one result per branch, so `services.*.port` returns the
//! list of ports.

use super::node::ConfigNode;
use serde_json::Value;

/// Path segment matching every key at its level.
pub const WILDCARD: &str = "*";

/// Separator between path segments.
pub const SEPARATOR: char = '.';

enum Resolved {
    One(ConfigNode),
    Many(Vec<ConfigNode>),
}

impl Resolved {
    fn into_vec(self) -> Vec<ConfigNode> {
        match self {
            Resolved::One(node) => vec![node],
            Resolved::Many(nodes) => nodes,
        }
    }
}

fn child<'a>(node: &'a ConfigNode, segment: &str) -> Option<&'a ConfigNode> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn children(node: &ConfigNode) -> Option<Vec<&ConfigNode>> {
    match node {
        Value::Object(map) => Some(map.values().collect()),
        Value::Array(items) => Some(items.iter().collect()),
        _ => None,
    }
}

fn walk(node: &ConfigNode, segments: &[&str], default: &ConfigNode) -> Resolved {
    let Some((segment, rest)) = segments.split_first() else {
        return Resolved::One(node.clone());
    };

    if *segment == WILDCARD {
        let Some(children) = children(node) else {
            return Resolved::One(default.clone());
        };
        let found = children
            .into_iter()
            .flat_map(|c| walk(c, rest, default).into_vec())
            .collect();
        return Resolved::Many(found);
    }

    match child(node, segment) {
        Some(next) => walk(next, rest, default),
        None => Resolved::One(default.clone()),
    }
}

/// Resolve `path` against `tree`, returning `default` where it does not resolve.
///
/// Without wildcards the result is the value at the path or `default`. With
/// wildcards it is a sequence holding one entry per matched branch, with
/// `default` standing in for branches that stop short.
pub fn get(tree: &ConfigNode, path: &str, default: &ConfigNode) -> ConfigNode {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    match walk(tree, &segments, default) {
        Resolved::One(node) => node,
        Resolved::Many(nodes) => Value::Array(nodes),
    }
}

/// Borrow the value at a literal path. `*` is treated as an ordinary key.
pub fn find<'a>(tree: &'a ConfigNode, path: &str) -> Option<&'a ConfigNode> {
    path.split(SEPARATOR)
        .try_fold(tree, |node, segment| child(node, segment))
}
