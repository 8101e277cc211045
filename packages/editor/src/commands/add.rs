//! Add-if-absent commands.

use super::{
    add_entry, find_parameter, find_server, find_tag, noop, path_item_path, paths_container,
    remove_added_entry, ArrayAddition,
};
use crate::command::{record_codec, Command};
use crate::simplified::SimplifiedType;
use apicollab_model::{ApiDocument, DocumentVersion, NodePath};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Adds an empty path item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPathCommand {
    pub new_path: String,
    /// Containers created by the last execute; `None` if it added nothing
    #[serde(default)]
    added: Option<Vec<NodePath>>,
}

impl NewPathCommand {
    pub fn new(new_path: impl Into<String>) -> Self {
        Self {
            new_path: new_path.into(),
            ..Self::default()
        }
    }
}

impl Command for NewPathCommand {
    fn type_tag(&self) -> &'static str {
        "NewPathCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.added = add_entry(
            document,
            &NodePath::root(),
            &paths_container(),
            &self.new_path,
            json!({}),
        );
        if self.added.is_none() {
            noop(self.type_tag(), "path already exists");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(created) = self.added.take() {
            remove_added_entry(document, &paths_container(), &self.new_path, &created);
        }
    }

    record_codec!();
}

/// Adds an empty operation to an existing path item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOperationCommand {
    pub path: String,
    pub method: String,
    #[serde(default)]
    added: Option<Vec<NodePath>>,
}

impl NewOperationCommand {
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            ..Self::default()
        }
    }
}

impl Command for NewOperationCommand {
    fn type_tag(&self) -> &'static str {
        "NewOperationCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let item = path_item_path(&self.path);
        self.added = add_entry(document, &item, &item, &self.method, json!({}));
        if self.added.is_none() {
            noop(self.type_tag(), "path item missing or operation exists");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(created) = self.added.take() {
            let item = path_item_path(&self.path);
            remove_added_entry(document, &item, &self.method, &created);
        }
    }

    record_codec!();
}

/// Adds a named schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchemaDefinitionCommand {
    pub version: DocumentVersion,
    pub definition_name: String,
    /// Initial content; an empty object schema if absent
    #[serde(default)]
    pub definition: Option<Value>,
    #[serde(default)]
    added: Option<Vec<NodePath>>,
}

impl NewSchemaDefinitionCommand {
    pub fn for_document(
        document: &ApiDocument,
        definition_name: impl Into<String>,
        definition: Option<Value>,
    ) -> Self {
        Self {
            version: document.version(),
            definition_name: definition_name.into(),
            definition,
            added: None,
        }
    }
}

impl Command for NewSchemaDefinitionCommand {
    fn type_tag(&self) -> &'static str {
        "NewSchemaDefinitionCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let definition = self
            .definition
            .clone()
            .unwrap_or_else(|| json!({ "type": "object" }));
        self.added = add_entry(
            document,
            &NodePath::root(),
            &self.version.definitions_container(),
            &self.definition_name,
            definition,
        );
        if self.added.is_none() {
            noop(self.type_tag(), "definition already exists");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(created) = self.added.take() {
            let container = self.version.definitions_container();
            remove_added_entry(document, &container, &self.definition_name, &created);
        }
    }

    record_codec!();
}

/// Adds a property to a schema's `properties`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchemaPropertyCommand {
    pub schema_path: NodePath,
    pub property_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub property_type: Option<SimplifiedType>,
    #[serde(default)]
    added: Option<Vec<NodePath>>,
}

impl NewSchemaPropertyCommand {
    pub fn new(schema_path: NodePath, property_name: impl Into<String>) -> Self {
        Self {
            schema_path,
            property_name: property_name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, property_type: SimplifiedType) -> Self {
        self.property_type = Some(property_type);
        self
    }

    fn property(&self) -> Value {
        let mut property = match &self.property_type {
            Some(t) => t.to_schema(),
            None => json!({ "type": "string" }),
        };
        if let (Some(description), Some(map)) = (&self.description, property.as_object_mut()) {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
        property
    }
}

impl Command for NewSchemaPropertyCommand {
    fn type_tag(&self) -> &'static str {
        "NewSchemaPropertyCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let container = self.schema_path.child("properties");
        self.added = add_entry(
            document,
            &self.schema_path,
            &container,
            &self.property_name,
            self.property(),
        );
        if self.added.is_none() {
            noop(self.type_tag(), "schema missing or property exists");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(created) = self.added.take() {
            let container = self.schema_path.child("properties");
            remove_added_entry(document, &container, &self.property_name, &created);
        }
    }

    record_codec!();
}

/// Adds a tag definition to the document's `tags`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTagCommand {
    pub tag_name: String,
    #[serde(default)]
    pub tag_description: Option<String>,
    #[serde(default)]
    added: Option<ArrayAddition>,
}

impl NewTagCommand {
    pub fn new(tag_name: impl Into<String>, tag_description: Option<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            tag_description,
            added: None,
        }
    }
}

impl Command for NewTagCommand {
    fn type_tag(&self) -> &'static str {
        "NewTagCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.added = None;
        if find_tag(document, &self.tag_name).is_some() {
            noop(self.type_tag(), "tag already exists");
            return;
        }
        let mut tag = json!({ "name": self.tag_name });
        if let Some(description) = &self.tag_description {
            tag["description"] = Value::String(description.clone());
        }
        self.added = ArrayAddition::push(document, &NodePath::root(), "tags", tag);
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(added) = self.added.take() {
            added.revert(document, &NodePath::root(), "tags");
        }
    }

    record_codec!();
}

/// Adds a parameter to a path item or operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParamCommand {
    pub version: DocumentVersion,
    pub parent_path: NodePath,
    pub param_name: String,
    /// `in`: query, header, path, cookie (or formData on 2.0)
    pub param_location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    added: Option<ArrayAddition>,
}

impl NewParamCommand {
    pub fn for_document(
        document: &ApiDocument,
        parent_path: NodePath,
        param_name: impl Into<String>,
        param_location: impl Into<String>,
    ) -> Self {
        Self {
            version: document.version(),
            parent_path,
            param_name: param_name.into(),
            param_location: param_location.into(),
            description: None,
            added: None,
        }
    }

    fn parameter(&self) -> Value {
        let mut param = json!({ "name": self.param_name, "in": self.param_location });
        if let Some(description) = &self.description {
            param["description"] = Value::String(description.clone());
        }
        if self.param_location == "path" {
            param["required"] = Value::Bool(true);
        }
        match self.version {
            DocumentVersion::Swagger2 => param["type"] = json!("string"),
            DocumentVersion::OpenApi3 => param["schema"] = json!({ "type": "string" }),
        }
        param
    }
}

impl Command for NewParamCommand {
    fn type_tag(&self) -> &'static str {
        "NewParamCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.added = None;
        if find_parameter(document, &self.parent_path, &self.param_location, &self.param_name)
            .is_some()
        {
            noop(self.type_tag(), "parameter already exists");
            return;
        }
        self.added =
            ArrayAddition::push(document, &self.parent_path, "parameters", self.parameter());
        if self.added.is_none() {
            noop(self.type_tag(), "parent missing");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(added) = self.added.take() {
            added.revert(document, &self.parent_path, "parameters");
        }
    }

    record_codec!();
}

/// Adds a response (by status code) to an operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResponseCommand {
    pub operation_path: NodePath,
    pub status_code: String,
    #[serde(default)]
    added: Option<Vec<NodePath>>,
}

impl NewResponseCommand {
    pub fn new(operation_path: NodePath, status_code: impl Into<String>) -> Self {
        Self {
            operation_path,
            status_code: status_code.into(),
            added: None,
        }
    }
}

impl Command for NewResponseCommand {
    fn type_tag(&self) -> &'static str {
        "NewResponseCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let container = self.operation_path.child("responses");
        self.added = add_entry(
            document,
            &self.operation_path,
            &container,
            &self.status_code,
            json!({ "description": "" }),
        );
        if self.added.is_none() {
            noop(self.type_tag(), "operation missing or response exists");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(created) = self.added.take() {
            let container = self.operation_path.child("responses");
            remove_added_entry(document, &container, &self.status_code, &created);
        }
    }

    record_codec!();
}

/// Adds a request body to an operation.
///
/// On 2.0 documents this is an `in: body` parameter; on 3.x a `requestBody`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestBodyCommand {
    pub version: DocumentVersion,
    pub operation_path: NodePath,
    #[serde(default)]
    added_parameter: Option<ArrayAddition>,
    #[serde(default)]
    added_body: Option<Vec<NodePath>>,
}

impl NewRequestBodyCommand {
    pub fn for_document(document: &ApiDocument, operation_path: NodePath) -> Self {
        Self {
            version: document.version(),
            operation_path,
            added_parameter: None,
            added_body: None,
        }
    }
}

pub(crate) fn body_parameter_index(document: &ApiDocument, operation: &NodePath) -> Option<usize> {
    super::find_index(document, &operation.child("parameters"), |param| {
        param.get("in").and_then(Value::as_str) == Some("body")
    })
}

impl Command for NewRequestBodyCommand {
    fn type_tag(&self) -> &'static str {
        "NewRequestBodyCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.added_parameter = None;
        self.added_body = None;
        match self.version {
            DocumentVersion::Swagger2 => {
                if body_parameter_index(document, &self.operation_path).is_some() {
                    noop(self.type_tag(), "body parameter exists");
                    return;
                }
                let body = json!({ "name": "body", "in": "body", "schema": {} });
                self.added_parameter =
                    ArrayAddition::push(document, &self.operation_path, "parameters", body);
            }
            DocumentVersion::OpenApi3 => {
                self.added_body = add_entry(
                    document,
                    &self.operation_path,
                    &self.operation_path,
                    "requestBody",
                    json!({ "content": {} }),
                );
            }
        }
        if self.added_parameter.is_none() && self.added_body.is_none() {
            noop(self.type_tag(), "operation missing or body exists");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(added) = self.added_parameter.take() {
            added.revert(document, &self.operation_path, "parameters");
        }
        if let Some(created) = self.added_body.take() {
            remove_added_entry(document, &self.operation_path, "requestBody", &created);
        }
    }

    record_codec!();
}

/// Adds a server to the document, a path item or an operation (3.x only)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServerCommand {
    pub version: DocumentVersion,
    pub parent_path: NodePath,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    added: Option<ArrayAddition>,
}

impl NewServerCommand {
    pub fn for_document(
        document: &ApiDocument,
        parent_path: NodePath,
        url: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            version: document.version(),
            parent_path,
            url: url.into(),
            description,
            added: None,
        }
    }
}

impl Command for NewServerCommand {
    fn type_tag(&self) -> &'static str {
        "NewServerCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.added = None;
        if !self.version.supports_servers() {
            noop(self.type_tag(), "document version has no servers");
            return;
        }
        if find_server(document, &self.parent_path, &self.url).is_some() {
            noop(self.type_tag(), "server already exists");
            return;
        }
        let mut server = json!({ "url": self.url });
        if let Some(description) = &self.description {
            server["description"] = Value::String(description.clone());
        }
        self.added = ArrayAddition::push(document, &self.parent_path, "servers", server);
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(added) = self.added.take() {
            added.revert(document, &self.parent_path, "servers");
        }
    }

    record_codec!();
}

/// Adds a named security scheme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSecuritySchemeCommand {
    pub version: DocumentVersion,
    pub scheme_name: String,
    pub scheme: Value,
    #[serde(default)]
    added: Option<Vec<NodePath>>,
}

impl NewSecuritySchemeCommand {
    pub fn for_document(
        document: &ApiDocument,
        scheme_name: impl Into<String>,
        scheme: Value,
    ) -> Self {
        Self {
            version: document.version(),
            scheme_name: scheme_name.into(),
            scheme,
            added: None,
        }
    }
}

impl Command for NewSecuritySchemeCommand {
    fn type_tag(&self) -> &'static str {
        "NewSecuritySchemeCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.added = add_entry(
            document,
            &NodePath::root(),
            &self.version.security_schemes_container(),
            &self.scheme_name,
            self.scheme.clone(),
        );
        if self.added.is_none() {
            noop(self.type_tag(), "scheme already exists");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(created) = self.added.take() {
            let container = self.version.security_schemes_container();
            remove_added_entry(document, &container, &self.scheme_name, &created);
        }
    }

    record_codec!();
}
