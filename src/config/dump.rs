//! YAML rendering of a configuration tree for inspection.
//!
//! Nested collections are written in block style until `inline` levels deep,
//! then in flow style (`[a, b]`, `{ k: v }`). This is a debugging aid; it
//! parses back to an equal tree but the layout is not stable.

use super::node::ConfigNode;
use serde_json::Value;

/// Block levels before switching to flow style.
pub const DEFAULT_INLINE: usize = 10;

/// Spaces per nesting level.
pub const DEFAULT_INDENT: usize = 2;

/// Formatting parameters for [`dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    pub inline: usize,
    pub indent: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            inline: DEFAULT_INLINE,
            indent: DEFAULT_INDENT,
        }
    }
}

/// Render a tree as YAML text.
pub fn dump(node: &ConfigNode, options: DumpOptions) -> String {
    let mut out = String::new();
    write_block(&mut out, node, options.inline, 0, options.indent);
    out
}

fn entries(node: &ConfigNode) -> Option<Vec<(Option<&str>, &ConfigNode)>> {
    match node {
        Value::Object(map) if !map.is_empty() => {
            Some(map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect())
        }
        Value::Array(items) if !items.is_empty() => Some(items.iter().map(|v| (None, v)).collect()),
        _ => None,
    }
}

fn write_block(out: &mut String, node: &ConfigNode, inline: usize, indent: usize, step: usize) {
    let prefix = " ".repeat(indent);
    let entries = match entries(node) {
        Some(entries) if inline > 0 => entries,
        _ => {
            out.push_str(&prefix);
            out.push_str(&flow(node));
            return;
        }
    };

    for (key, value) in entries {
        let inlined = inline <= 1 || entries_of(value) == 0;
        out.push_str(&prefix);
        match key {
            Some(key) => {
                out.push_str(&scalar_string(key));
                out.push(':');
            }
            None => out.push('-'),
        }
        if inlined {
            out.push(' ');
            write_block(out, value, 0, 0, step);
            out.push('\n');
        } else {
            out.push('\n');
            write_block(out, value, inline - 1, indent + step, step);
        }
    }
}

fn entries_of(node: &ConfigNode) -> usize {
    match node {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}

/// Render a node in flow style on one line.
fn flow(node: &ConfigNode) -> String {
    match node {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => scalar_string(s),
        Value::Array(items) if items.is_empty() => "[]".to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(flow).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", scalar_string(k), flow(v)))
                .collect();
            format!("{{ {} }}", parts.join(", "))
        }
    }
}

/// Quote a string only when YAML would otherwise read it differently.
fn scalar_string(s: &str) -> String {
    let needs_double_quotes = s.contains('\n') || s.chars().any(char::is_control);
    if !needs_double_quotes && !s.contains([',', '[', ']', '{', '}', ':', '#']) {
        if let Ok(text) = serde_yaml::to_string(s) {
            let text = text.trim_end_matches('\n');
            if !text.contains('\n') {
                return text.to_string();
            }
        }
    }
    serde_json::to_string(s).unwrap_or_else(|_| format!("{s:?}"))
}
