//! Generic tree traversal.
//!
//! [`walk`] and [`walk_mut`] visit every node pre-order together with its
//! [`NodePath`]. [`classify`] tells callers which nodes may refer to a named
//! entity elsewhere in the document, so a rename can dispatch on [`NodeKind`]
//! instead of subclassing a visitor per entity type.

use crate::document::is_http_method;
use crate::node_path::NodePath;
use serde_json::Value;

/// Node kinds that can refer to a named entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A `$ref` string
    Reference,
    /// An operation's `tags` list
    TagUsage,
    /// One entry of a `security` list (scheme name -> scopes)
    SecurityRequirement,
    Other,
}

/// Classify a node by where it sits and what it holds
pub fn classify(path: &NodePath, value: &Value) -> NodeKind {
    let segments = path.segments();
    let len = segments.len();

    if value.is_string() && path.last() == Some("$ref") {
        return NodeKind::Reference;
    }

    if value.is_array() && len == 4 && is_operation_path(&segments[..3]) && segments[3] == "tags" {
        return NodeKind::TagUsage;
    }

    if value.is_object() && len >= 2 && segments[len - 2] == "security" {
        let at_root = len == 2;
        let on_operation = len == 5 && is_operation_path(&segments[..3]);
        if at_root || on_operation {
            return NodeKind::SecurityRequirement;
        }
    }

    NodeKind::Other
}

/// `paths/{path}/{method}`
pub fn is_operation_path(segments: &[String]) -> bool {
    segments.len() == 3 && segments[0] == "paths" && is_http_method(&segments[2])
}

/// Visit every node, pre-order
pub fn walk<F>(root: &Value, visit: &mut F)
where
    F: FnMut(&NodePath, &Value),
{
    let mut path = NodePath::root();
    walk_value(root, &mut path, visit);
}

fn walk_value<F>(value: &Value, path: &mut NodePath, visit: &mut F)
where
    F: FnMut(&NodePath, &Value),
{
    visit(path, value);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                walk_value(child, path, visit);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                walk_value(child, path, visit);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Visit every node mutably, pre-order. A node's children are walked after
/// the callback has run on it, so they reflect any edit it made.
pub fn walk_mut<F>(root: &mut Value, visit: &mut F)
where
    F: FnMut(&NodePath, &mut Value),
{
    let mut path = NodePath::root();
    walk_value_mut(root, &mut path, visit);
}

fn walk_value_mut<F>(value: &mut Value, path: &mut NodePath, visit: &mut F)
where
    F: FnMut(&NodePath, &mut Value),
{
    visit(path, value);
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                path.push(key.clone());
                walk_value_mut(child, path, visit);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter_mut().enumerate() {
                path.push(index.to_string());
                walk_value_mut(child, path, visit);
                path.pop();
            }
        }
        _ => {}
    }
}

/// Collect the paths of all nodes of one kind
pub fn find_all(root: &Value, kind: NodeKind) -> Vec<NodePath> {
    let mut found = Vec::new();
    walk(root, &mut |path, value| {
        if classify(path, value) == kind {
            found.push(path.clone());
        }
    });
    found
}
