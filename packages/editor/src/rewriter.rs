//! # Reference Rewriter
//!
//! Renaming a named entity must keep every reference to it valid. The rewriter
//! walks the whole document once, dispatching on [`NodeKind`] to a per-kind
//! rewrite function, and records each touched node's path and prior value.
//! Undo revisits exactly those nodes instead of walking the tree again.
//!
//! Recorded paths are valid in the tree as it stood right after the rewrite,
//! so a rename must restore references before it reverses its own structural
//! change.

use apicollab_model::document::rename_entry;
use apicollab_model::traverse::classify;
use apicollab_model::{ApiDocument, NodeKind, NodePath};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A node changed by a rewrite, with its value beforehand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewrittenNode {
    pub path: NodePath,
    pub old_value: Value,
}

/// Rewrites one node from the old identifier to the new one; reports a change
pub type NodeRewrite = fn(&mut Value, &str, &str) -> bool;

#[derive(Debug, Clone, Default)]
pub struct ReferenceRewriter {
    handlers: HashMap<NodeKind, NodeRewrite>,
}

impl ReferenceRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the rewrite for a node kind
    pub fn on(mut self, kind: NodeKind, rewrite: NodeRewrite) -> Self {
        self.handlers.insert(kind, rewrite);
        self
    }

    /// `$ref` pointers (schema definitions, path items)
    pub fn references() -> Self {
        Self::new().on(NodeKind::Reference, rewrite_reference)
    }

    /// Operation `tags` lists
    pub fn tag_usages() -> Self {
        Self::new().on(NodeKind::TagUsage, rewrite_tag_usage)
    }

    /// Keys of `security` requirement entries
    pub fn security_requirements() -> Self {
        Self::new().on(NodeKind::SecurityRequirement, rewrite_security_requirement)
    }

    /// Rewrite every matching node from `from` to `to`
    pub fn rewrite(&self, document: &mut ApiDocument, from: &str, to: &str) -> Vec<RewrittenNode> {
        let mut rewritten = Vec::new();
        if self.handlers.is_empty() {
            return rewritten;
        }

        document.walk_mut(&mut |path, node| {
            let Some(rewrite) = self.handlers.get(&classify(path, node)) else {
                return;
            };
            let before = node.clone();
            if rewrite(node, from, to) {
                rewritten.push(RewrittenNode {
                    path: path.clone(),
                    old_value: before,
                });
            }
        });

        tracing::debug!(from, to, count = rewritten.len(), "rewrote references");
        rewritten
    }

    /// Put recorded nodes back, most recent first
    pub fn restore(document: &mut ApiDocument, rewritten: &[RewrittenNode]) {
        for node in rewritten.iter().rev() {
            match document.node_mut(&node.path) {
                Some(slot) => *slot = node.old_value.clone(),
                None => tracing::debug!(path = %node.path, "rewritten node vanished"),
            }
        }
    }
}

/// `#/definitions/Pet` and anything below it (`#/definitions/Pet/properties/id`)
fn rewrite_reference(node: &mut Value, from: &str, to: &str) -> bool {
    let Value::String(reference) = node else {
        return false;
    };
    if reference == from {
        *reference = to.to_string();
        return true;
    }
    match reference.strip_prefix(from) {
        Some(rest) if rest.starts_with('/') => {
            *reference = format!("{}{}", to, rest);
            true
        }
        _ => false,
    }
}

fn rewrite_tag_usage(node: &mut Value, from: &str, to: &str) -> bool {
    let Value::Array(tags) = node else {
        return false;
    };
    let mut changed = false;
    for tag in tags.iter_mut() {
        if tag.as_str() == Some(from) {
            *tag = Value::String(to.to_string());
            changed = true;
        }
    }
    changed
}

fn rewrite_security_requirement(node: &mut Value, from: &str, to: &str) -> bool {
    match node {
        Value::Object(requirement) => rename_entry(requirement, from, to),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> ApiDocument {
        ApiDocument::from_value(json!({
            "swagger": "2.0",
            "security": [ { "key": [] } ],
            "paths": {
                "/pets": {
                    "get": {
                        "tags": ["pets", "misc"],
                        "security": [ { "oauth": [], "key": [] } ],
                        "responses": {
                            "200": { "schema": { "$ref": "#/definitions/Pet" } },
                            "404": { "schema": { "$ref": "#/definitions/PetError" } }
                        }
                    }
                }
            },
            "definitions": {
                "Pet": { "properties": { "id": { "$ref": "#/definitions/Pet/properties/id" } } },
                "PetError": {}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_rewrites_exact_and_nested_refs_only() {
        let mut doc = document();
        let rewritten =
            ReferenceRewriter::references().rewrite(&mut doc, "#/definitions/Pet", "#/definitions/Dog");

        assert_eq!(rewritten.len(), 2);
        let json = doc.to_json();
        assert!(json.contains("\"#/definitions/Dog\""));
        assert!(json.contains("\"#/definitions/Dog/properties/id\""));
        assert!(json.contains("\"#/definitions/PetError\""));
    }

    #[test]
    fn test_restore_is_pointwise() {
        let mut doc = document();
        let before = doc.to_json();
        let rewritten = ReferenceRewriter::tag_usages().rewrite(&mut doc, "pets", "animals");
        assert_eq!(rewritten.len(), 1);

        ReferenceRewriter::restore(&mut doc, &rewritten);
        assert_eq!(doc.to_json(), before);
    }

    #[test]
    fn test_security_keys_keep_position() {
        let mut doc = document();
        let rewritten =
            ReferenceRewriter::security_requirements().rewrite(&mut doc, "oauth", "oauth2");
        assert_eq!(rewritten.len(), 1);

        let requirement = doc
            .node(&NodePath::parse("/paths/~1pets/get/security/0").unwrap())
            .unwrap();
        let keys: Vec<_> = requirement.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["oauth2", "key"]);
    }

    #[test]
    fn test_empty_rewriter_touches_nothing() {
        let mut doc = document();
        assert!(ReferenceRewriter::new().rewrite(&mut doc, "pets", "x").is_empty());
    }
}
