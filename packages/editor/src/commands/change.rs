//! Change commands.
//!
//! Field-level changes keep a [`FieldEdit`]; type changes rewrite several keys
//! of one node at once and keep a [`NodeSnapshot`] of it instead.

use super::{find_parameter, find_server, info_path, noop, replace_node, FieldEdit, NodeSnapshot};
use crate::command::{record_codec, Command};
use crate::simplified::{SimplifiedParameterType, SimplifiedPropertyType, SimplifiedType};
use apicollab_model::{ApiDocument, DocumentVersion, NodePath};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A single field write, possibly under containers created for it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedFieldEdit {
    #[serde(default)]
    created: Vec<NodePath>,
    #[serde(default)]
    edit: Option<FieldEdit>,
}

impl ScopedFieldEdit {
    /// Write `object[key]`, creating `object` if absent
    fn apply(document: &mut ApiDocument, object: &NodePath, key: &str, value: Value) -> Self {
        let Some(created) = document.ensure_object(object) else {
            return Self::default();
        };
        let edit = FieldEdit::set(document, object, key, value);
        Self { created, edit }
    }

    fn changed(&self) -> bool {
        self.edit.is_some()
    }

    fn revert(self, document: &mut ApiDocument, object: &NodePath, key: &str) {
        if let Some(edit) = self.edit {
            edit.revert(document, object, key);
        }
        document.prune_created(&self.created);
    }
}

macro_rules! info_field_change {
    ($command:ident, $field:literal) => {
        impl $command {
            pub fn new(value: impl Into<String>) -> Self {
                Self {
                    value: value.into(),
                    change: None,
                }
            }
        }

        impl Command for $command {
            fn type_tag(&self) -> &'static str {
                stringify!($command)
            }

            fn execute(&mut self, document: &mut ApiDocument) {
                let value = Value::String(self.value.clone());
                let change = ScopedFieldEdit::apply(document, &info_path(), $field, value);
                if !change.changed() {
                    noop(self.type_tag(), "info is not an object");
                }
                self.change = Some(change);
            }

            fn undo(&mut self, document: &mut ApiDocument) {
                if let Some(change) = self.change.take() {
                    change.revert(document, &info_path(), $field);
                }
            }

            record_codec!();
        }
    };
}

/// Sets `info.title`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTitleCommand {
    pub value: String,
    #[serde(default)]
    change: Option<ScopedFieldEdit>,
}

info_field_change!(ChangeTitleCommand, "title");

/// Sets `info.version`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeVersionCommand {
    pub value: String,
    #[serde(default)]
    change: Option<ScopedFieldEdit>,
}

info_field_change!(ChangeVersionCommand, "version");

/// Sets `info.description`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDescriptionCommand {
    pub value: String,
    #[serde(default)]
    change: Option<ScopedFieldEdit>,
}

info_field_change!(ChangeDescriptionCommand, "description");

/// Object value with only the given fields that are set
fn sparse_object(fields: &[(&str, &Option<String>)]) -> Value {
    let mut object = Map::new();
    for (key, value) in fields {
        if let Some(value) = value {
            object.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    Value::Object(object)
}

/// Replaces `info.contact`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeContactCommand {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    change: Option<ScopedFieldEdit>,
}

impl ChangeContactCommand {
    pub fn new(name: Option<String>, email: Option<String>, url: Option<String>) -> Self {
        Self {
            name,
            email,
            url,
            change: None,
        }
    }
}

impl Command for ChangeContactCommand {
    fn type_tag(&self) -> &'static str {
        "ChangeContactCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let contact = sparse_object(&[
            ("name", &self.name),
            ("email", &self.email),
            ("url", &self.url),
        ]);
        self.change = Some(ScopedFieldEdit::apply(document, &info_path(), "contact", contact));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(change) = self.change.take() {
            change.revert(document, &info_path(), "contact");
        }
    }

    record_codec!();
}

/// Replaces `info.license`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLicenseCommand {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    change: Option<ScopedFieldEdit>,
}

impl ChangeLicenseCommand {
    pub fn new(name: impl Into<String>, url: Option<String>) -> Self {
        Self {
            name: name.into(),
            url,
            change: None,
        }
    }
}

impl Command for ChangeLicenseCommand {
    fn type_tag(&self) -> &'static str {
        "ChangeLicenseCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let license = sparse_object(&[("name", &Some(self.name.clone())), ("url", &self.url)]);
        self.change = Some(ScopedFieldEdit::apply(document, &info_path(), "license", license));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(change) = self.change.take() {
            change.revert(document, &info_path(), "license");
        }
    }

    record_codec!();
}

/// Sets (or with `None`, removes) a single field of any existing node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePropertyCommand {
    pub node_path: NodePath,
    pub property: String,
    #[serde(default)]
    pub new_value: Option<Value>,
    #[serde(default)]
    edit: Option<FieldEdit>,
}

impl ChangePropertyCommand {
    pub fn new(node_path: NodePath, property: impl Into<String>, new_value: Option<Value>) -> Self {
        Self {
            node_path,
            property: property.into(),
            new_value,
            edit: None,
        }
    }
}

impl Command for ChangePropertyCommand {
    fn type_tag(&self) -> &'static str {
        "ChangePropertyCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.edit = match &self.new_value {
            Some(value) => FieldEdit::set(document, &self.node_path, &self.property, value.clone()),
            None => FieldEdit::remove(document, &self.node_path, &self.property),
        };
        if self.edit.is_none() {
            noop(self.type_tag(), "node or field not found");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(edit) = self.edit.take() {
            edit.revert(document, &self.node_path, &self.property);
        }
    }

    record_codec!();
}

/// Write a parameter's type in the encoding its version uses
fn write_parameter_type(
    version: DocumentVersion,
    parameter: &mut Map<String, Value>,
    new_type: &SimplifiedParameterType,
) {
    let body = parameter.get("in").and_then(Value::as_str) == Some("body");
    if version == DocumentVersion::Swagger2 && !body {
        new_type.base.write_into(parameter);
    } else {
        let schema = parameter
            .entry("schema")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(schema) = schema.as_object_mut() {
            new_type.base.write_into(schema);
        }
    }

    // path parameters are always required
    let path = parameter.get("in").and_then(Value::as_str) == Some("path");
    match new_type.required {
        _ if path => {
            parameter.insert("required".to_string(), Value::Bool(true));
        }
        Some(required) => {
            parameter.insert("required".to_string(), Value::Bool(required));
        }
        None => {}
    }
}

/// Changes the type (and required flag) of a parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeParameterTypeCommand {
    pub version: DocumentVersion,
    pub parent_path: NodePath,
    pub param_location: String,
    pub param_name: String,
    pub new_type: SimplifiedParameterType,
    #[serde(default)]
    old_parameter: Option<NodeSnapshot>,
}

impl ChangeParameterTypeCommand {
    pub fn for_document(
        document: &ApiDocument,
        parent_path: NodePath,
        param_location: impl Into<String>,
        param_name: impl Into<String>,
        new_type: SimplifiedParameterType,
    ) -> Self {
        Self {
            version: document.version(),
            parent_path,
            param_location: param_location.into(),
            param_name: param_name.into(),
            new_type,
            old_parameter: None,
        }
    }
}

impl Command for ChangeParameterTypeCommand {
    fn type_tag(&self) -> &'static str {
        "ChangeParameterTypeCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_parameter = None;
        let Some(index) =
            find_parameter(document, &self.parent_path, &self.param_location, &self.param_name)
        else {
            noop(self.type_tag(), "parameter not found");
            return;
        };
        let path = self.parent_path.child("parameters").child(index.to_string());
        let Some(Value::Object(parameter)) = document.node(&path) else {
            noop(self.type_tag(), "parameter is not an object");
            return;
        };

        let mut updated = parameter.clone();
        write_parameter_type(self.version, &mut updated, &self.new_type);
        self.old_parameter = replace_node(document, &path, Value::Object(updated));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(old) = self.old_parameter.take() {
            old.restore(document);
        }
    }

    record_codec!();
}

/// Changes a schema property's type and its entry in the parent `required`
/// list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePropertyTypeCommand {
    /// e.g. `/definitions/Pet/properties/id`
    pub property_path: NodePath,
    pub new_type: SimplifiedPropertyType,
    #[serde(default)]
    old_property: Option<NodeSnapshot>,
    #[serde(default)]
    required_change: Option<ScopedRequired>,
}

/// Edit of a schema's `required` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopedRequired {
    schema_path: NodePath,
    edit: FieldEdit,
}

impl ChangePropertyTypeCommand {
    pub fn new(property_path: NodePath, new_type: SimplifiedPropertyType) -> Self {
        Self {
            property_path,
            new_type,
            old_property: None,
            required_change: None,
        }
    }

    /// Add or drop the property name in the parent schema's `required`
    fn update_required(&self, document: &mut ApiDocument) -> Option<ScopedRequired> {
        let required = self.new_type.required?;
        let name = self.property_path.last()?.to_string();
        // .../{schema}/properties/{name}
        let schema_path = self.property_path.parent()?.parent()?;

        let current: Vec<Value> = document
            .node(&schema_path.child("required"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let listed = current.iter().any(|entry| entry.as_str() == Some(name.as_str()));

        let edit = match (required, listed) {
            (true, false) => {
                let mut list = current;
                list.push(Value::String(name));
                FieldEdit::set(document, &schema_path, "required", Value::Array(list))?
            }
            (false, true) => {
                let list: Vec<Value> = current
                    .into_iter()
                    .filter(|entry| entry.as_str() != Some(name.as_str()))
                    .collect();
                if list.is_empty() {
                    FieldEdit::remove(document, &schema_path, "required")?
                } else {
                    FieldEdit::set(document, &schema_path, "required", Value::Array(list))?
                }
            }
            _ => return None,
        };
        Some(ScopedRequired { schema_path, edit })
    }
}

impl Command for ChangePropertyTypeCommand {
    fn type_tag(&self) -> &'static str {
        "ChangePropertyTypeCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_property = None;
        self.required_change = None;
        let Some(Value::Object(property)) = document.node(&self.property_path) else {
            noop(self.type_tag(), "property not found");
            return;
        };

        let mut updated = property.clone();
        self.new_type.base.write_into(&mut updated);
        self.old_property = replace_node(document, &self.property_path, Value::Object(updated));
        self.required_change = self.update_required(document);
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(change) = self.required_change.take() {
            change.edit.revert(document, &change.schema_path, "required");
        }
        if let Some(old) = self.old_property.take() {
            old.restore(document);
        }
    }

    record_codec!();
}

/// Changes the schema of a response.
///
/// 2.0 responses carry a single `schema`; 3.x responses carry one per media
/// type, and get `application/json` if they have none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeResponseTypeCommand {
    pub version: DocumentVersion,
    pub response_path: NodePath,
    pub new_type: SimplifiedType,
    #[serde(default)]
    old_response: Option<NodeSnapshot>,
}

impl ChangeResponseTypeCommand {
    pub fn for_document(
        document: &ApiDocument,
        response_path: NodePath,
        new_type: SimplifiedType,
    ) -> Self {
        Self {
            version: document.version(),
            response_path,
            new_type,
            old_response: None,
        }
    }
}

fn write_schema_type(holder: &mut Map<String, Value>, new_type: &SimplifiedType) {
    let schema = holder
        .entry("schema")
        .or_insert_with(|| Value::Object(Map::new()));
    match schema.as_object_mut() {
        Some(schema) => new_type.write_into(schema),
        None => *schema = new_type.to_schema(),
    }
}

impl Command for ChangeResponseTypeCommand {
    fn type_tag(&self) -> &'static str {
        "ChangeResponseTypeCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_response = None;
        let Some(Value::Object(response)) = document.node(&self.response_path) else {
            noop(self.type_tag(), "response not found");
            return;
        };

        let mut updated = response.clone();
        match self.version {
            DocumentVersion::Swagger2 => write_schema_type(&mut updated, &self.new_type),
            DocumentVersion::OpenApi3 => {
                let content = updated
                    .entry("content")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Some(content) = content.as_object_mut() {
                    if content.is_empty() {
                        content.insert("application/json".to_string(), json!({}));
                    }
                    for media_type in content.values_mut() {
                        if let Some(media_type) = media_type.as_object_mut() {
                            write_schema_type(media_type, &self.new_type);
                        }
                    }
                }
            }
        }
        self.old_response = replace_node(document, &self.response_path, Value::Object(updated));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(old) = self.old_response.take() {
            old.restore(document);
        }
    }

    record_codec!();
}

/// Replaces the body of an existing security scheme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSecuritySchemeCommand {
    pub version: DocumentVersion,
    pub scheme_name: String,
    pub scheme: Value,
    #[serde(default)]
    old_scheme: Option<NodeSnapshot>,
}

impl ChangeSecuritySchemeCommand {
    pub fn for_document(
        document: &ApiDocument,
        scheme_name: impl Into<String>,
        scheme: Value,
    ) -> Self {
        Self {
            version: document.version(),
            scheme_name: scheme_name.into(),
            scheme,
            old_scheme: None,
        }
    }
}

impl Command for ChangeSecuritySchemeCommand {
    fn type_tag(&self) -> &'static str {
        "ChangeSecuritySchemeCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        let path = self.version.security_scheme_path(&self.scheme_name);
        self.old_scheme = replace_node(document, &path, self.scheme.clone());
        if self.old_scheme.is_none() {
            noop(self.type_tag(), "security scheme not found");
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(old) = self.old_scheme.take() {
            old.restore(document);
        }
    }

    record_codec!();
}

/// Changes the description and variables of a server, identified by URL
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeServerCommand {
    pub parent_path: NodePath,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub variables: Option<Value>,
    #[serde(default)]
    old_server: Option<NodeSnapshot>,
}

impl ChangeServerCommand {
    pub fn new(
        parent_path: NodePath,
        url: impl Into<String>,
        description: Option<String>,
        variables: Option<Value>,
    ) -> Self {
        Self {
            parent_path,
            url: url.into(),
            description,
            variables,
            old_server: None,
        }
    }
}

impl Command for ChangeServerCommand {
    fn type_tag(&self) -> &'static str {
        "ChangeServerCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_server = None;
        let Some(index) = find_server(document, &self.parent_path, &self.url) else {
            noop(self.type_tag(), "server not found");
            return;
        };

        let mut server = Map::new();
        server.insert("url".to_string(), Value::String(self.url.clone()));
        if let Some(description) = &self.description {
            server.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(variables) = &self.variables {
            server.insert("variables".to_string(), variables.clone());
        }
        let path = self.parent_path.child("servers").child(index.to_string());
        self.old_server = replace_node(document, &path, Value::Object(server));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(old) = self.old_server.take() {
            old.restore(document);
        }
    }

    record_codec!();
}

/// Changes the schema type of a media type entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMediaTypeTypeCommand {
    pub media_type_path: NodePath,
    pub new_type: SimplifiedType,
    #[serde(default)]
    old_media_type: Option<NodeSnapshot>,
}

impl ChangeMediaTypeTypeCommand {
    pub fn new(media_type_path: NodePath, new_type: SimplifiedType) -> Self {
        Self {
            media_type_path,
            new_type,
            old_media_type: None,
        }
    }
}

impl Command for ChangeMediaTypeTypeCommand {
    fn type_tag(&self) -> &'static str {
        "ChangeMediaTypeTypeCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_media_type = None;
        let Some(Value::Object(media_type)) = document.node(&self.media_type_path) else {
            noop(self.type_tag(), "media type not found");
            return;
        };

        let mut updated = media_type.clone();
        write_schema_type(&mut updated, &self.new_type);
        self.old_media_type =
            replace_node(document, &self.media_type_path, Value::Object(updated));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(old) = self.old_media_type.take() {
            old.restore(document);
        }
    }

    record_codec!();
}
