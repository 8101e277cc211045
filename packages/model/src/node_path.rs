//! # Node Addressing
//!
//! A [`NodePath`] locates a node inside an API document tree. Its string form is
//! an RFC 6901 JSON pointer (`/paths/~1pets/get`), which is also how it travels
//! on the wire.
//!
//! Paths are resolved fresh against whatever revision of the tree they are
//! given, so a path recorded before a rewind/replay still addresses the
//! equivalent node afterwards (or nothing, if that node is gone).

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Location of a node in the document tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from raw (unescaped) segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a JSON pointer
    pub fn parse(pointer: &str) -> Result<Self, ModelError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        let rest = pointer
            .strip_prefix('/')
            .ok_or_else(|| ModelError::InvalidPath(pointer.to_string()))?;

        let segments = rest
            .split('/')
            .map(|raw| unescape(raw).ok_or_else(|| ModelError::InvalidPath(pointer.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// Parse an in-document reference (`#/definitions/Pet`)
    pub fn from_reference(reference: &str) -> Option<Self> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| Self::parse(pointer).ok())
    }

    /// Render as an in-document reference (`#/definitions/Pet`)
    pub fn to_reference(&self) -> String {
        format!("#{}", self)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Final segment (the key or index of the addressed node within its parent)
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<NodePath> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn child(&self, segment: impl Into<String>) -> NodePath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Whether `prefix` is this path or one of its ancestors
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Whether either path contains the other
    pub fn intersects(&self, other: &NodePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    pub(crate) fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    /// Find the addressed node, or `None` if any step is missing
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }

    pub fn resolve_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Value> {
        let mut node = root;
        for segment in &self.segments {
            node = match node {
                Value::Object(map) => map.get_mut(segment)?,
                Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> Option<String> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_and_display_escapes() {
        let path = NodePath::parse("/paths/~1pets~1{id}/get").unwrap();
        assert_eq!(path.segments(), &["paths", "/pets/{id}", "get"]);
        assert_eq!(path.to_string(), "/paths/~1pets~1{id}/get");
    }

    #[test]
    fn test_root_is_empty_pointer() {
        let root = NodePath::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "");
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_invalid_pointer() {
        assert!(NodePath::parse("paths").is_err());
        assert!(NodePath::parse("/a~2b").is_err());
    }

    #[test]
    fn test_resolve_objects_and_arrays() {
        let doc = json!({
            "paths": { "/pets": { "get": { "parameters": [ { "name": "limit" } ] } } }
        });
        let path = NodePath::from_segments(["paths", "/pets", "get", "parameters", "0", "name"]);
        assert_eq!(path.resolve(&doc), Some(&json!("limit")));

        let missing = NodePath::from_segments(["paths", "/owners", "get"]);
        assert!(missing.resolve(&doc).is_none());

        let bad_index = NodePath::from_segments(["paths", "/pets", "get", "parameters", "x"]);
        assert!(bad_index.resolve(&doc).is_none());
    }

    #[test]
    fn test_reference_round_trip() {
        let path = NodePath::from_reference("#/components/schemas/Pet").unwrap();
        assert_eq!(path.last(), Some("Pet"));
        assert_eq!(path.to_reference(), "#/components/schemas/Pet");
        assert!(NodePath::from_reference("Pet.json").is_none());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let path = NodePath::from_segments(["paths", "/pets"]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/paths/~1pets\"");
        let back: NodePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }

    #[test]
    fn test_intersects() {
        let a = NodePath::from_segments(["paths", "/pets"]);
        let b = a.child("get");
        let c = NodePath::from_segments(["paths", "/owners"]);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }
}
