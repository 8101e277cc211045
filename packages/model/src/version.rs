//! Schema-version families and their structural encodings.
//!
//! Commands that behave differently per family capture a [`DocumentVersion`]
//! once at construction and consult it instead of re-inspecting the document.

use crate::node_path::NodePath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentVersion {
    /// Swagger 2.0: `definitions`, `securityDefinitions`, inline body parameters
    Swagger2,
    /// OpenAPI 3.x: `components`, `servers`, dedicated request bodies
    #[default]
    OpenApi3,
}

impl DocumentVersion {
    /// Inspect a document root
    pub fn detect(root: &Value) -> Option<Self> {
        let root = root.as_object()?;
        if let Some(v) = root.get("openapi").and_then(Value::as_str) {
            if v.starts_with('3') {
                return Some(DocumentVersion::OpenApi3);
            }
        }
        if let Some(v) = root.get("swagger").and_then(Value::as_str) {
            if v.starts_with('2') {
                return Some(DocumentVersion::Swagger2);
            }
        }
        None
    }

    /// Container holding named schema definitions
    pub fn definitions_container(self) -> NodePath {
        match self {
            DocumentVersion::Swagger2 => NodePath::from_segments(["definitions"]),
            DocumentVersion::OpenApi3 => NodePath::from_segments(["components", "schemas"]),
        }
    }

    pub fn definition_path(self, name: &str) -> NodePath {
        self.definitions_container().child(name)
    }

    /// `$ref` value pointing at a named schema definition
    pub fn definition_ref(self, name: &str) -> String {
        self.definition_path(name).to_reference()
    }

    /// Container holding named security schemes
    pub fn security_schemes_container(self) -> NodePath {
        match self {
            DocumentVersion::Swagger2 => NodePath::from_segments(["securityDefinitions"]),
            DocumentVersion::OpenApi3 => {
                NodePath::from_segments(["components", "securitySchemes"])
            }
        }
    }

    pub fn security_scheme_path(self, name: &str) -> NodePath {
        self.security_schemes_container().child(name)
    }

    /// Only OpenAPI 3 documents carry `servers`
    pub fn supports_servers(self) -> bool {
        matches!(self, DocumentVersion::OpenApi3)
    }
}
