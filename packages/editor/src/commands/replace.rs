//! Replace commands: swap a whole node for a new one, in place.

use super::{find_index, noop, operation_path, path_item_path, replace_node, NodeSnapshot};
use crate::command::{record_codec, Command};
use apicollab_model::{ApiDocument, DocumentVersion, NodePath};
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! replace_in_place {
    ($command:ident, $replacement:ident) => {
        impl Command for $command {
            fn type_tag(&self) -> &'static str {
                stringify!($command)
            }

            fn execute(&mut self, document: &mut ApiDocument) {
                self.old = self
                    .locate(document)
                    .and_then(|path| replace_node(document, &path, self.$replacement.clone()));
                if self.old.is_none() {
                    noop(self.type_tag(), "node to replace not found");
                }
            }

            fn undo(&mut self, document: &mut ApiDocument) {
                if let Some(old) = self.old.take() {
                    old.restore(document);
                }
            }

            record_codec!();
        }
    };
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOperationCommand {
    pub path: String,
    pub method: String,
    pub new_operation: Value,
    #[serde(default)]
    old: Option<NodeSnapshot>,
}

impl ReplaceOperationCommand {
    pub fn new(path: impl Into<String>, method: impl Into<String>, new_operation: Value) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            new_operation,
            old: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(operation_path(&self.path, &self.method))
    }
}

replace_in_place!(ReplaceOperationCommand, new_operation);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacePathItemCommand {
    pub path: String,
    pub new_path_item: Value,
    #[serde(default)]
    old: Option<NodeSnapshot>,
}

impl ReplacePathItemCommand {
    pub fn new(path: impl Into<String>, new_path_item: Value) -> Self {
        Self {
            path: path.into(),
            new_path_item,
            old: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(path_item_path(&self.path))
    }
}

replace_in_place!(ReplacePathItemCommand, new_path_item);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSchemaDefinitionCommand {
    pub version: DocumentVersion,
    pub definition_name: String,
    pub new_definition: Value,
    #[serde(default)]
    old: Option<NodeSnapshot>,
}

impl ReplaceSchemaDefinitionCommand {
    pub fn for_document(
        document: &ApiDocument,
        definition_name: impl Into<String>,
        new_definition: Value,
    ) -> Self {
        Self {
            version: document.version(),
            definition_name: definition_name.into(),
            new_definition,
            old: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(self.version.definition_path(&self.definition_name))
    }
}

replace_in_place!(ReplaceSchemaDefinitionCommand, new_definition);

/// Replaces a security requirement (matched by value) at the same index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSecurityRequirementCommand {
    pub parent_path: NodePath,
    pub old_requirement: Value,
    pub new_requirement: Value,
    #[serde(default)]
    old: Option<NodeSnapshot>,
}

impl ReplaceSecurityRequirementCommand {
    pub fn new(parent_path: NodePath, old_requirement: Value, new_requirement: Value) -> Self {
        Self {
            parent_path,
            old_requirement,
            new_requirement,
            old: None,
        }
    }

    fn locate(&self, document: &ApiDocument) -> Option<NodePath> {
        let security = self.parent_path.child("security");
        let index = find_index(document, &security, |entry| *entry == self.old_requirement)?;
        Some(security.child(index.to_string()))
    }
}

replace_in_place!(ReplaceSecurityRequirementCommand, new_requirement);

/// Replaces the entire document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceDocumentCommand {
    pub new_document: Value,
    #[serde(default)]
    old_document: Option<Value>,
}

impl ReplaceDocumentCommand {
    pub fn new(new_document: Value) -> Self {
        Self {
            new_document,
            old_document: None,
        }
    }
}

impl Command for ReplaceDocumentCommand {
    fn type_tag(&self) -> &'static str {
        "ReplaceDocumentCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_document = None;
        if !self.new_document.is_object() {
            noop(self.type_tag(), "replacement is not a JSON object");
            return;
        }
        self.old_document = Some(document.replace_root(self.new_document.clone()));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(old) = self.old_document.take() {
            document.replace_root(old);
        }
    }

    record_codec!();
}
