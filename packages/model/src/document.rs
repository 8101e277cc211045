//! # API Document
//!
//! The shared tree that collaborators edit. An [`ApiDocument`] is a JSON object
//! (Swagger 2.0 or OpenAPI 3.x) whose key order is significant: two documents
//! are identical when their serialized text is identical.
//!
//! The primitives here are the only structural edits commands perform. Every
//! one of them preserves the position of untouched entries and reports enough
//! about what it changed for the caller to reverse it exactly.

use crate::error::{ModelError, ModelResult};
use crate::node_path::NodePath;
use crate::version::DocumentVersion;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operation keys of a path item
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.contains(&key)
}

/// A node taken out of its parent, with the slot it occupied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Removal {
    /// Position among the parent's entries (object key order or array index)
    pub index: usize,
    pub value: Value,
}

/// Editable API description document
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDocument {
    root: Value,
}

impl ApiDocument {
    /// Wrap a parsed JSON value
    pub fn from_value(root: Value) -> ModelResult<Self> {
        if !root.is_object() {
            return Err(ModelError::NotAnObject);
        }
        DocumentVersion::detect(&root).ok_or(ModelError::UnknownVersion)?;
        Ok(Self { root })
    }

    pub fn from_json(source: &str) -> ModelResult<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    /// Minimal OpenAPI 3 document
    pub fn new_openapi3(title: &str, version: &str) -> Self {
        Self {
            root: serde_json::json!({
                "openapi": "3.0.2",
                "info": { "title": title, "version": version }
            }),
        }
    }

    /// Minimal Swagger 2.0 document
    pub fn new_swagger2(title: &str, version: &str) -> Self {
        Self {
            root: serde_json::json!({
                "swagger": "2.0",
                "info": { "title": title, "version": version }
            }),
        }
    }

    /// Schema-version family. A root that no longer declares one (possible only
    /// after a whole-document replacement) is treated as OpenAPI 3.
    pub fn version(&self) -> DocumentVersion {
        DocumentVersion::detect(&self.root).unwrap_or_default()
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Swap the whole tree, returning the previous one
    pub fn replace_root(&mut self, root: Value) -> Value {
        std::mem::replace(&mut self.root, root)
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn to_json(&self) -> String {
        self.root.to_string()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.root).unwrap_or_else(|_| self.to_json())
    }

    pub fn node(&self, path: &NodePath) -> Option<&Value> {
        path.resolve(&self.root)
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut Value> {
        path.resolve_mut(&mut self.root)
    }

    /// Visit every node, pre-order
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&NodePath, &Value),
    {
        crate::traverse::walk(&self.root, visit);
    }

    /// Visit every node mutably, pre-order
    pub fn walk_mut<F>(&mut self, visit: &mut F)
    where
        F: FnMut(&NodePath, &mut Value),
    {
        crate::traverse::walk_mut(&mut self.root, visit);
    }

    pub fn exists(&self, path: &NodePath) -> bool {
        self.node(path).is_some()
    }

    pub fn object(&self, path: &NodePath) -> Option<&Map<String, Value>> {
        self.node(path).and_then(Value::as_object)
    }

    pub fn object_mut(&mut self, path: &NodePath) -> Option<&mut Map<String, Value>> {
        self.node_mut(path).and_then(Value::as_object_mut)
    }

    pub fn array(&self, path: &NodePath) -> Option<&Vec<Value>> {
        self.node(path).and_then(Value::as_array)
    }

    pub fn array_mut(&mut self, path: &NodePath) -> Option<&mut Vec<Value>> {
        self.node_mut(path).and_then(Value::as_array_mut)
    }

    /// Detach the addressed node from its parent
    pub fn remove_node(&mut self, path: &NodePath) -> Option<Removal> {
        let key = path.last()?.to_string();
        let parent = self.node_mut(&path.parent()?)?;
        match parent {
            Value::Object(map) => {
                remove_entry(map, &key).map(|(index, value)| Removal { index, value })
            }
            Value::Array(items) => {
                let index = key.parse::<usize>().ok().filter(|i| *i < items.len())?;
                Some(Removal {
                    index,
                    value: items.remove(index),
                })
            }
            _ => None,
        }
    }

    /// Put a removed node back into the slot it came from
    pub fn restore_node(&mut self, path: &NodePath, removal: Removal) -> bool {
        let (Some(key), Some(parent_path)) = (path.last(), path.parent()) else {
            return false;
        };
        let key = key.to_string();
        match self.node_mut(&parent_path) {
            Some(Value::Object(map)) => {
                insert_entry(map, removal.index, key, removal.value);
                true
            }
            Some(Value::Array(items)) => {
                let index = removal.index.min(items.len());
                items.insert(index, removal.value);
                true
            }
            _ => {
                tracing::debug!(path = %path, "parent vanished, cannot restore node");
                false
            }
        }
    }

    /// Set `key` on the object at `object_path`.
    ///
    /// Returns `None` when there is no such object, otherwise the prior value
    /// (`Some(None)` if the key was absent).
    pub fn set_field(
        &mut self,
        object_path: &NodePath,
        key: &str,
        value: Value,
    ) -> Option<Option<Value>> {
        let map = self.object_mut(object_path)?;
        Some(map.insert(key.to_string(), value))
    }

    /// Reverse a [`set_field`](Self::set_field)
    pub fn restore_field(&mut self, object_path: &NodePath, key: &str, prior: Option<Value>) {
        let Some(map) = self.object_mut(object_path) else {
            return;
        };
        match prior {
            Some(value) => {
                map.insert(key.to_string(), value);
            }
            None => {
                remove_entry(map, key);
            }
        }
    }

    /// Rename a key of the object at `object_path`, keeping its position.
    /// Fails when `old` is absent or `new` is taken.
    pub fn rename_key(&mut self, object_path: &NodePath, old: &str, new: &str) -> bool {
        self.object_mut(object_path)
            .map(|map| rename_entry(map, old, new))
            .unwrap_or(false)
    }

    /// Make sure an object exists at `path`, creating missing ancestors.
    ///
    /// Returns the paths that were created (outermost first), or `None` if the
    /// path is blocked by a non-object node.
    pub fn ensure_object(&mut self, path: &NodePath) -> Option<Vec<NodePath>> {
        let mut created = Vec::new();
        let mut current = NodePath::root();
        for (depth, segment) in path.segments().iter().enumerate() {
            let next = current.child(segment.clone());
            match self.node(&next) {
                Some(Value::Object(_)) => {}
                Some(Value::Array(_)) if depth + 1 < path.len() => {}
                Some(_) => return None,
                None => {
                    let parent = self.object_mut(&current)?;
                    parent.insert(segment.clone(), Value::Object(Map::new()));
                    created.push(next.clone());
                }
            }
            current = next;
        }
        Some(created)
    }

    /// Make sure `object_path` has an array under `key`.
    ///
    /// Returns whether the array had to be created, or `None` if the parent is
    /// missing or `key` holds something other than an array.
    pub fn ensure_array(&mut self, object_path: &NodePath, key: &str) -> Option<bool> {
        let map = self.object_mut(object_path)?;
        match map.get(key) {
            Some(Value::Array(_)) => Some(false),
            Some(_) => None,
            None => {
                map.insert(key.to_string(), Value::Array(Vec::new()));
                Some(true)
            }
        }
    }

    /// Remove containers created by [`ensure_object`](Self::ensure_object) or
    /// [`ensure_array`](Self::ensure_array), innermost first. A container that
    /// is no longer empty is left alone.
    pub fn prune_created(&mut self, created: &[NodePath]) {
        for path in created.iter().rev() {
            let empty = match self.node(path) {
                Some(Value::Object(map)) => map.is_empty(),
                Some(Value::Array(items)) => items.is_empty(),
                _ => false,
            };
            if empty {
                self.remove_node(path);
            } else if self.exists(path) {
                tracing::warn!(path = %path, "created container is not empty, leaving it in place");
            }
        }
    }
}

/// Order-preserving removal from a JSON object
pub fn remove_entry(map: &mut Map<String, Value>, key: &str) -> Option<(usize, Value)> {
    let index = map.keys().position(|k| k == key)?;
    let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
    let (_, value) = entries.remove(index);
    *map = entries.into_iter().collect();
    Some((index, value))
}

/// Insert at a given position; an existing key is overwritten in place
pub fn insert_entry(map: &mut Map<String, Value>, index: usize, key: String, value: Value) {
    if let Some(slot) = map.get_mut(&key) {
        *slot = value;
        return;
    }
    let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
    let index = index.min(entries.len());
    entries.insert(index, (key, value));
    *map = entries.into_iter().collect();
}

/// Rename a key in place
pub fn rename_entry(map: &mut Map<String, Value>, old: &str, new: &str) -> bool {
    if old == new || !map.contains_key(old) || map.contains_key(new) {
        return false;
    }
    let entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
    *map = entries
        .into_iter()
        .map(|(k, v)| if k == old { (new.to_string(), v) } else { (k, v) })
        .collect();
    true
}
