//! Delete-all commands.
//!
//! Entries are removed one at a time and remembered in removal order. Object
//! entries are taken front to back and array elements back to front, so every
//! recorded slot is valid when undo restores them in reverse.

use super::{noop, path_item_path, FieldEdit, RemovedNode};
use crate::command::{record_codec, Command};
use apicollab_model::{is_http_method, ApiDocument, DocumentVersion, NodePath};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paths of the entries of an object, in key order
fn object_entries<F>(document: &ApiDocument, container: &NodePath, keep: F) -> Vec<NodePath>
where
    F: Fn(&str, &Value) -> bool,
{
    let Some(map) = document.object(container) else {
        return Vec::new();
    };
    map.iter()
        .filter(|(key, value)| keep(key, value))
        .map(|(key, _)| container.child(key.as_str()))
        .collect()
}

/// Paths of the elements of an array, last first
fn array_elements<F>(document: &ApiDocument, array: &NodePath, keep: F) -> Vec<NodePath>
where
    F: Fn(&Value) -> bool,
{
    let Some(items) = document.array(array) else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, item)| keep(item))
        .map(|(index, _)| array.child(index.to_string()))
        .collect()
}

fn take_all(document: &mut ApiDocument, targets: Vec<NodePath>) -> Vec<RemovedNode> {
    targets
        .into_iter()
        .filter_map(|path| RemovedNode::take(document, path))
        .collect()
}

fn restore_all(document: &mut ApiDocument, removed: Vec<RemovedNode>) {
    for node in removed.into_iter().rev() {
        node.put_back(document);
    }
}

macro_rules! delete_all {
    ($command:ident) => {
        impl Command for $command {
            fn type_tag(&self) -> &'static str {
                stringify!($command)
            }

            fn execute(&mut self, document: &mut ApiDocument) {
                let targets = self.targets(document);
                self.removed = take_all(document, targets);
                if self.removed.is_empty() {
                    noop(self.type_tag(), "nothing to delete");
                }
            }

            fn undo(&mut self, document: &mut ApiDocument) {
                restore_all(document, std::mem::take(&mut self.removed));
            }

            record_codec!();
        }
    };
}

/// Deletes every property of a schema, and its `required` list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllPropertiesCommand {
    pub schema_path: NodePath,
    #[serde(default)]
    removed: Vec<RemovedNode>,
    #[serde(default)]
    removed_required: Option<FieldEdit>,
}

impl DeleteAllPropertiesCommand {
    pub fn new(schema_path: NodePath) -> Self {
        Self {
            schema_path,
            ..Self::default()
        }
    }
}

impl Command for DeleteAllPropertiesCommand {
    fn type_tag(&self) -> &'static str {
        "DeleteAllPropertiesCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let targets = object_entries(document, &self.schema_path.child("properties"), |_, _| true);
        self.removed = take_all(document, targets);
        self.removed_required = None;
        if self.removed.is_empty() {
            noop(self.type_tag(), "schema has no properties");
            return;
        }
        self.removed_required = FieldEdit::remove(document, &self.schema_path, "required");
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(required) = self.removed_required.take() {
            required.revert(document, &self.schema_path, "required");
        }
        restore_all(document, std::mem::take(&mut self.removed));
    }

    record_codec!();
}

/// Deletes the parameters of a path item or operation, optionally only those
/// in one location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllParametersCommand {
    pub parent_path: NodePath,
    #[serde(default)]
    pub param_location: Option<String>,
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllParametersCommand {
    pub fn new(parent_path: NodePath, param_location: Option<String>) -> Self {
        Self {
            parent_path,
            param_location,
            removed: Vec::new(),
        }
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        array_elements(document, &self.parent_path.child("parameters"), |param| {
            match &self.param_location {
                Some(location) => {
                    param.get("in").and_then(Value::as_str) == Some(location.as_str())
                }
                None => true,
            }
        })
    }
}

delete_all!(DeleteAllParametersCommand);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllResponsesCommand {
    pub operation_path: NodePath,
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllResponsesCommand {
    pub fn new(operation_path: NodePath) -> Self {
        Self {
            operation_path,
            removed: Vec::new(),
        }
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        object_entries(document, &self.operation_path.child("responses"), |_, _| true)
    }
}

delete_all!(DeleteAllResponsesCommand);

/// Deletes every top-level tag definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllTagsCommand {
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllTagsCommand {
    pub fn new() -> Self {
        Self::default()
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        array_elements(document, &NodePath::from_segments(["tags"]), |_| true)
    }
}

delete_all!(DeleteAllTagsCommand);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllServersCommand {
    pub parent_path: NodePath,
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllServersCommand {
    pub fn new(parent_path: NodePath) -> Self {
        Self {
            parent_path,
            removed: Vec::new(),
        }
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        array_elements(document, &self.parent_path.child("servers"), |_| true)
    }
}

delete_all!(DeleteAllServersCommand);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllSecurityRequirementsCommand {
    pub parent_path: NodePath,
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllSecurityRequirementsCommand {
    pub fn new(parent_path: NodePath) -> Self {
        Self {
            parent_path,
            removed: Vec::new(),
        }
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        array_elements(document, &self.parent_path.child("security"), |_| true)
    }
}

delete_all!(DeleteAllSecurityRequirementsCommand);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllSecuritySchemesCommand {
    pub version: DocumentVersion,
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllSecuritySchemesCommand {
    pub fn for_document(document: &ApiDocument) -> Self {
        Self {
            version: document.version(),
            removed: Vec::new(),
        }
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        object_entries(document, &self.version.security_schemes_container(), |_, _| true)
    }
}

delete_all!(DeleteAllSecuritySchemesCommand);

/// Deletes every operation of a path item, keeping its other fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllOperationsCommand {
    pub path: String,
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllOperationsCommand {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            removed: Vec::new(),
        }
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        object_entries(document, &path_item_path(&self.path), |key, _| is_http_method(key))
    }
}

delete_all!(DeleteAllOperationsCommand);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllExamplesCommand {
    pub parent_path: NodePath,
    #[serde(default)]
    removed: Vec<RemovedNode>,
}

impl DeleteAllExamplesCommand {
    pub fn new(parent_path: NodePath) -> Self {
        Self {
            parent_path,
            removed: Vec::new(),
        }
    }

    fn targets(&self, document: &ApiDocument) -> Vec<NodePath> {
        object_entries(document, &self.parent_path.child("examples"), |_, _| true)
    }
}

delete_all!(DeleteAllExamplesCommand);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::operation_path;
    use crate::commands::test_support::{assert_noop, assert_reversible};
    use serde_json::json;

    fn document() -> ApiDocument {
        ApiDocument::from_value(json!({
            "swagger": "2.0",
            "info": { "title": "Pets", "version": "1.0" },
            "tags": [ { "name": "a" }, { "name": "b" }, { "name": "c" } ],
            "security": [ { "key": [] }, { "oauth": [] } ],
            "paths": {
                "/pets": {
                    "summary": "Pets",
                    "get": {
                        "parameters": [
                            { "name": "limit", "in": "query" },
                            { "name": "X-Trace", "in": "header" },
                            { "name": "offset", "in": "query" }
                        ],
                        "responses": { "200": {}, "404": {}, "default": {} }
                    },
                    "put": {},
                    "x-owner": "team"
                }
            },
            "definitions": {
                "Pet": {
                    "required": ["id"],
                    "properties": { "id": {}, "name": {}, "tag": {} },
                    "example": {}
                }
            },
            "securityDefinitions": { "key": {}, "oauth": {} }
        }))
        .unwrap()
    }

    #[test]
    fn test_delete_all_properties_drops_required() {
        let mut doc = document();
        let pet = NodePath::parse("/definitions/Pet").unwrap();
        let mut cmd = DeleteAllPropertiesCommand::new(pet.clone());
        assert_reversible(&mut doc, &mut cmd, |doc| {
            assert_eq!(doc.node(&pet.child("properties")).unwrap(), &json!({}));
            assert!(!doc.exists(&pet.child("required")));
        });
    }

    #[test]
    fn test_delete_parameters_by_location() {
        let mut doc = document();
        let get = operation_path("/pets", "get");
        let mut cmd = DeleteAllParametersCommand::new(get.clone(), Some("query".to_string()));
        assert_reversible(&mut doc, &mut cmd, |doc| {
            assert_eq!(
                doc.node(&get.child("parameters")).unwrap(),
                &json!([{ "name": "X-Trace", "in": "header" }])
            );
        });
    }

    #[test]
    fn test_delete_all_operations_keeps_other_fields() {
        let mut doc = document();
        let mut cmd = DeleteAllOperationsCommand::new("/pets");
        assert_reversible(&mut doc, &mut cmd, |doc| {
            assert_eq!(
                doc.node(&path_item_path("/pets")).unwrap(),
                &json!({ "summary": "Pets", "x-owner": "team" })
            );
        });
    }

    #[test]
    fn test_every_delete_all_is_reversible() {
        let mut doc = document();
        let get = operation_path("/pets", "get");
        let mut commands: Vec<Box<dyn Command>> = vec![
            Box::new(DeleteAllResponsesCommand::new(get)),
            Box::new(DeleteAllTagsCommand::new()),
            Box::new(DeleteAllSecurityRequirementsCommand::new(NodePath::root())),
            Box::new(DeleteAllSecuritySchemesCommand::for_document(&doc)),
            Box::new(DeleteAllParametersCommand::new(operation_path("/pets", "get"), None)),
        ];

        let before = doc.to_json();
        for command in commands.iter_mut() {
            command.execute(&mut doc);
            assert_ne!(doc.to_json(), before, "{} changed nothing", command.type_tag());
            command.undo(&mut doc);
            assert_eq!(doc.to_json(), before, "{} did not undo cleanly", command.type_tag());
        }
    }

    #[test]
    fn test_nothing_to_delete() {
        let mut doc = document();
        assert_noop(&mut doc, &mut DeleteAllServersCommand::new(NodePath::root()));
        assert_noop(
            &mut doc,
            &mut DeleteAllExamplesCommand::new(operation_path("/pets", "get")),
        );
        assert_noop(&mut doc, &mut DeleteAllOperationsCommand::new("/dogs"));
    }
}
