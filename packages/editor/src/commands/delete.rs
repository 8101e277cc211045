//! Delete commands.
//!
//! Most deletes detach a single node and keep it as a [`RemovedNode`]; the
//! `single_delete!` macro supplies the shared execute/undo given a `locate`
//! method. Property and tag deletes also clean up what refers to them.

use super::{
    find_index, find_parameter, find_server, find_tag, info_path, noop, operation_path,
    path_item_path, FieldEdit, RemovedNode,
};
use crate::command::{record_codec, Command};
use crate::commands::add::body_parameter_index;
use apicollab_model::{ApiDocument, DocumentVersion, NodePath};
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! single_delete {
    ($command:ident) => {
        impl Command for $command {
            fn type_tag(&self) -> &'static str {
                stringify!($command)
            }

            fn execute(&mut self, document: &mut ApiDocument) {
                self.removed = self
                    .locate(document)
                    .and_then(|path| RemovedNode::take(document, path));
                if self.removed.is_none() {
                    noop(self.type_tag(), "target not found");
                }
            }

            fn undo(&mut self, document: &mut ApiDocument) {
                if let Some(removed) = self.removed.take() {
                    removed.put_back(document);
                }
            }

            record_codec!();
        }
    };
}

/// Deletes a path item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePathCommand {
    pub path: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeletePathCommand {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(path_item_path(&self.path))
    }
}

single_delete!(DeletePathCommand);

/// Deletes one operation of a path item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOperationCommand {
    pub path: String,
    pub method: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteOperationCommand {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(operation_path(&self.path, &self.method))
    }
}

single_delete!(DeleteOperationCommand);

/// Deletes a named schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSchemaDefinitionCommand {
    pub version: DocumentVersion,
    pub definition_name: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteSchemaDefinitionCommand {
    pub fn for_document(document: &ApiDocument, definition_name: impl Into<String>) -> Self {
        Self {
            version: document.version(),
            definition_name: definition_name.into(),
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(self.version.definition_path(&self.definition_name))
    }
}

single_delete!(DeleteSchemaDefinitionCommand);

/// Deletes a parameter identified by location and name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParameterCommand {
    pub parent_path: NodePath,
    pub param_location: String,
    pub param_name: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteParameterCommand {
    pub fn new(
        parent_path: NodePath,
        param_location: impl Into<String>,
        param_name: impl Into<String>,
    ) -> Self {
        Self {
            parent_path,
            param_location: param_location.into(),
            param_name: param_name.into(),
            removed: None,
        }
    }

    fn locate(&self, document: &ApiDocument) -> Option<NodePath> {
        let index =
            find_parameter(document, &self.parent_path, &self.param_location, &self.param_name)?;
        Some(self.parent_path.child("parameters").child(index.to_string()))
    }
}

single_delete!(DeleteParameterCommand);

/// Deletes a response, e.g. `/paths/~1pets/get/responses/404`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponseCommand {
    pub response_path: NodePath,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteResponseCommand {
    pub fn new(response_path: NodePath) -> Self {
        Self {
            response_path,
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(self.response_path.clone())
    }
}

single_delete!(DeleteResponseCommand);

/// Deletes a vendor extension (`x-...`) from any node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExtensionCommand {
    pub parent_path: NodePath,
    pub extension_name: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteExtensionCommand {
    pub fn new(parent_path: NodePath, extension_name: impl Into<String>) -> Self {
        Self {
            parent_path,
            extension_name: extension_name.into(),
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        self.extension_name
            .starts_with("x-")
            .then(|| self.parent_path.child(self.extension_name.as_str()))
    }
}

single_delete!(DeleteExtensionCommand);

/// Deletes a named example from a parameter, media type or response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteExampleCommand {
    pub parent_path: NodePath,
    pub example_name: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteExampleCommand {
    pub fn new(parent_path: NodePath, example_name: impl Into<String>) -> Self {
        Self {
            parent_path,
            example_name: example_name.into(),
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(
            self.parent_path
                .child("examples")
                .child(self.example_name.as_str()),
        )
    }
}

single_delete!(DeleteExampleCommand);

/// Deletes a server identified by URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteServerCommand {
    pub parent_path: NodePath,
    pub url: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteServerCommand {
    pub fn new(parent_path: NodePath, url: impl Into<String>) -> Self {
        Self {
            parent_path,
            url: url.into(),
            removed: None,
        }
    }

    fn locate(&self, document: &ApiDocument) -> Option<NodePath> {
        let index = find_server(document, &self.parent_path, &self.url)?;
        Some(self.parent_path.child("servers").child(index.to_string()))
    }
}

single_delete!(DeleteServerCommand);

/// Deletes a security requirement, matched by value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSecurityRequirementCommand {
    pub parent_path: NodePath,
    pub requirement: Value,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteSecurityRequirementCommand {
    pub fn new(parent_path: NodePath, requirement: Value) -> Self {
        Self {
            parent_path,
            requirement,
            removed: None,
        }
    }

    fn locate(&self, document: &ApiDocument) -> Option<NodePath> {
        let security = self.parent_path.child("security");
        let index = find_index(document, &security, |entry| *entry == self.requirement)?;
        Some(security.child(index.to_string()))
    }
}

single_delete!(DeleteSecurityRequirementCommand);

/// Deletes a named security scheme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSecuritySchemeCommand {
    pub version: DocumentVersion,
    pub scheme_name: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteSecuritySchemeCommand {
    pub fn for_document(document: &ApiDocument, scheme_name: impl Into<String>) -> Self {
        Self {
            version: document.version(),
            scheme_name: scheme_name.into(),
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(self.version.security_scheme_path(&self.scheme_name))
    }
}

single_delete!(DeleteSecuritySchemeCommand);

/// Deletes an operation's request body (the `in: body` parameter on 2.0)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequestBodyCommand {
    pub version: DocumentVersion,
    pub operation_path: NodePath,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteRequestBodyCommand {
    pub fn for_document(document: &ApiDocument, operation_path: NodePath) -> Self {
        Self {
            version: document.version(),
            operation_path,
            removed: None,
        }
    }

    fn locate(&self, document: &ApiDocument) -> Option<NodePath> {
        match self.version {
            DocumentVersion::Swagger2 => {
                let index = body_parameter_index(document, &self.operation_path)?;
                Some(
                    self.operation_path
                        .child("parameters")
                        .child(index.to_string()),
                )
            }
            DocumentVersion::OpenApi3 => Some(self.operation_path.child("requestBody")),
        }
    }
}

single_delete!(DeleteRequestBodyCommand);

/// Deletes a media type, e.g. `.../requestBody/content/application~1json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMediaTypeCommand {
    pub media_type_path: NodePath,
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteMediaTypeCommand {
    pub fn new(media_type_path: NodePath) -> Self {
        Self {
            media_type_path,
            removed: None,
        }
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(self.media_type_path.clone())
    }
}

single_delete!(DeleteMediaTypeCommand);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteContactCommand {
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteContactCommand {
    pub fn new() -> Self {
        Self::default()
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(info_path().child("contact"))
    }
}

single_delete!(DeleteContactCommand);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteLicenseCommand {
    #[serde(default)]
    removed: Option<RemovedNode>,
}

impl DeleteLicenseCommand {
    pub fn new() -> Self {
        Self::default()
    }

    fn locate(&self, _document: &ApiDocument) -> Option<NodePath> {
        Some(info_path().child("license"))
    }
}

single_delete!(DeleteLicenseCommand);

/// Deletes a schema property, and its entry in the schema's `required` list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePropertyCommand {
    pub schema_path: NodePath,
    pub property_name: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
    #[serde(default)]
    removed_required: Option<RemovedNode>,
    /// The `required` list itself, when it held only this property
    #[serde(default)]
    removed_required_list: Option<FieldEdit>,
}

impl DeletePropertyCommand {
    pub fn new(schema_path: NodePath, property_name: impl Into<String>) -> Self {
        Self {
            schema_path,
            property_name: property_name.into(),
            ..Self::default()
        }
    }
}

impl Command for DeletePropertyCommand {
    fn type_tag(&self) -> &'static str {
        "DeletePropertyCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.removed_required = None;
        self.removed_required_list = None;

        let property = self
            .schema_path
            .child("properties")
            .child(self.property_name.as_str());
        self.removed = RemovedNode::take(document, property);
        if self.removed.is_none() {
            noop(self.type_tag(), "property not found");
            return;
        }

        let required = self.schema_path.child("required");
        let name = Value::String(self.property_name.clone());
        if let Some(index) = find_index(document, &required, |entry| *entry == name) {
            self.removed_required =
                RemovedNode::take(document, required.child(index.to_string()));
        }
        let emptied = self.removed_required.is_some()
            && document.array(&required).is_some_and(Vec::is_empty);
        if emptied {
            self.removed_required_list = FieldEdit::remove(document, &self.schema_path, "required");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(list) = self.removed_required_list.take() {
            list.revert(document, &self.schema_path, "required");
        }
        if let Some(entry) = self.removed_required.take() {
            entry.put_back(document);
        }
        if let Some(property) = self.removed.take() {
            property.put_back(document);
        }
    }

    record_codec!();
}

/// Deletes a tag definition and every use of it on operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTagCommand {
    pub tag_name: String,
    #[serde(default)]
    removed: Option<RemovedNode>,
    /// Usages taken out of operation `tags` lists, in removal order
    #[serde(default)]
    removed_usages: Vec<RemovedNode>,
}

impl DeleteTagCommand {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }
}

impl Command for DeleteTagCommand {
    fn type_tag(&self) -> &'static str {
        "DeleteTagCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.removed_usages.clear();
        self.removed = find_tag(document, &self.tag_name).and_then(|index| {
            RemovedNode::take(
                document,
                NodePath::from_segments(["tags".to_string(), index.to_string()]),
            )
        });
        if self.removed.is_none() {
            noop(self.type_tag(), "tag not found");
            return;
        }

        let mut usages = Vec::new();
        document.walk(&mut |path, node| {
            if apicollab_model::classify(path, node) != apicollab_model::NodeKind::TagUsage {
                return;
            }
            let Some(tags) = node.as_array() else {
                return;
            };
            // descending, so earlier removals do not shift later indexes
            for (index, tag) in tags.iter().enumerate().rev() {
                if tag.as_str() == Some(self.tag_name.as_str()) {
                    usages.push(path.child(index.to_string()));
                }
            }
        });
        for usage in usages {
            if let Some(removed) = RemovedNode::take(document, usage) {
                self.removed_usages.push(removed);
            }
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        for usage in std::mem::take(&mut self.removed_usages).into_iter().rev() {
            usage.put_back(document);
        }
        if let Some(tag) = self.removed.take() {
            tag.put_back(document);
        }
    }

    record_codec!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{assert_noop, assert_reversible};
    use serde_json::json;

    fn petstore() -> ApiDocument {
        ApiDocument::from_value(json!({
            "openapi": "3.0.2",
            "info": {
                "title": "Pets",
                "version": "1.0",
                "contact": { "name": "Ops" },
                "license": { "name": "MIT" }
            },
            "tags": [ { "name": "pets" }, { "name": "admin" } ],
            "paths": {
                "/pets": {
                    "parameters": [ { "name": "limit", "in": "query" } ],
                    "get": {
                        "tags": ["pets", "admin", "pets"],
                        "security": [ { "key": [] }, { "oauth": ["read"] } ],
                        "x-internal": true,
                        "responses": { "200": { "description": "ok" } }
                    },
                    "post": {
                        "tags": ["admin"],
                        "requestBody": {
                            "content": {
                                "application/json": { "examples": { "cat": {}, "dog": {} } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "required": ["id", "name"],
                        "properties": { "id": {}, "name": {} }
                    },
                    "Tag": { "required": ["label"], "properties": { "label": {} } }
                },
                "securitySchemes": { "key": { "type": "apiKey" } }
            },
            "servers": [ { "url": "https://a" }, { "url": "https://b" } ]
        }))
        .unwrap()
    }

    fn pointer(p: &str) -> NodePath {
        NodePath::parse(p).unwrap()
    }

    #[test]
    fn test_single_deletes_are_reversible() {
        let mut doc = petstore();
        let get = operation_path("/pets", "get");
        let post = operation_path("/pets", "post");
        let media = pointer("/paths/~1pets/post/requestBody/content/application~1json");

        let mut commands: Vec<Box<dyn Command>> = vec![
            Box::new(DeletePathCommand::new("/pets")),
            Box::new(DeleteOperationCommand::new("/pets", "get")),
            Box::new(DeleteSchemaDefinitionCommand::for_document(&doc, "Pet")),
            Box::new(DeleteParameterCommand::new(path_item_path("/pets"), "query", "limit")),
            Box::new(DeleteResponseCommand::new(get.child("responses").child("200"))),
            Box::new(DeleteExtensionCommand::new(get.clone(), "x-internal")),
            Box::new(DeleteExampleCommand::new(media.clone(), "cat")),
            Box::new(DeleteServerCommand::new(NodePath::root(), "https://b")),
            Box::new(DeleteSecurityRequirementCommand::new(get.clone(), json!({ "oauth": ["read"] }))),
            Box::new(DeleteSecuritySchemeCommand::for_document(&doc, "key")),
            Box::new(DeleteRequestBodyCommand::for_document(&doc, post)),
            Box::new(DeleteMediaTypeCommand::new(media)),
            Box::new(DeleteContactCommand::new()),
            Box::new(DeleteLicenseCommand::new()),
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
    fn test_delete_missing_targets_are_noops() {
        let mut doc = petstore();
        assert_noop(&mut doc, &mut DeletePathCommand::new("/dogs"));
        assert_noop(
            &mut doc,
            &mut DeleteParameterCommand::new(path_item_path("/pets"), "header", "limit"),
        );
        assert_noop(&mut doc, &mut DeleteServerCommand::new(NodePath::root(), "https://z"));
        assert_noop(
            &mut doc,
            &mut DeleteExtensionCommand::new(operation_path("/pets", "get"), "responses"),
        );
        assert_noop(&mut doc, &mut DeleteTagCommand::new("nope"));
    }

    #[test]
    fn test_delete_property_removes_required_entry() {
        let mut doc = petstore();
        let pet = pointer("/components/schemas/Pet");
        assert_reversible(&mut doc, &mut DeletePropertyCommand::new(pet.clone(), "id"), |doc| {
            assert_eq!(doc.node(&pet.child("required")).unwrap(), &json!(["name"]));
        });

        let tag = pointer("/components/schemas/Tag");
        assert_reversible(&mut doc, &mut DeletePropertyCommand::new(tag.clone(), "label"), |doc| {
            assert!(!doc.exists(&tag.child("required")));
        });
    }

    #[test]
    fn test_delete_property_leaves_foreign_empty_required() {
        let mut doc = ApiDocument::from_value(json!({
            "swagger": "2.0",
            "definitions": {
                "Pet": { "required": [], "properties": { "id": {}, "name": {} } }
            }
        }))
        .unwrap();
        let pet = pointer("/definitions/Pet");
        assert_reversible(&mut doc, &mut DeletePropertyCommand::new(pet.clone(), "id"), |doc| {
            assert!(!doc.exists(&pet.child("properties").child("id")));
            assert_eq!(doc.node(&pet.child("required")).unwrap(), &json!([]));
        });
    }

    #[test]
    fn test_delete_tag_removes_usages() {
        let mut doc = petstore();
        assert_reversible(&mut doc, &mut DeleteTagCommand::new("pets"), |doc| {
            assert_eq!(
                doc.node(&pointer("/paths/~1pets/get/tags")).unwrap(),
                &json!(["admin"])
            );
            assert_eq!(doc.node(&pointer("/tags")).unwrap(), &json!([{ "name": "admin" }]));
        });
    }

    #[test]
    fn test_record_carries_undo_state() {
        let mut doc = petstore();
        let mut cmd = DeletePathCommand::new("/pets");
        cmd.execute(&mut doc);

        let record = cmd.serialize_record().unwrap();
        assert_eq!(record["__type"], json!("DeletePathCommand"));
        assert_eq!(record["removed"]["path"], json!("/paths/~1pets"));

        let mut restored = DeletePathCommand::default();
        restored
            .deserialize_record(record, &crate::registry::CommandRegistry::new())
            .unwrap();
        restored.undo(&mut doc);
        assert_eq!(doc.to_json(), petstore().to_json());
    }
}
