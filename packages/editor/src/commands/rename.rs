//! Rename commands.
//!
//! A rename never merges: if the new name is taken the command does nothing.
//! Renames of entities that can be referenced from elsewhere run the
//! [`ReferenceRewriter`] after the structural rename, and undo restores the
//! rewritten references before renaming back.

use super::{
    find_index, find_parameter, find_tag, noop, path_item_path, paths_container, replace_node,
    NodeSnapshot,
};
use crate::command::{record_codec, Command};
use crate::rewriter::{ReferenceRewriter, RewrittenNode};
use apicollab_model::{ApiDocument, DocumentVersion, NodePath};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Renames a schema definition and every `$ref` to it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSchemaDefinitionCommand {
    pub version: DocumentVersion,
    pub old_name: String,
    pub new_name: String,
    #[serde(default)]
    renamed: bool,
    #[serde(default)]
    rewritten: Vec<RewrittenNode>,
}

impl RenameSchemaDefinitionCommand {
    pub fn for_document(
        document: &ApiDocument,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            version: document.version(),
            old_name: old_name.into(),
            new_name: new_name.into(),
            renamed: false,
            rewritten: Vec::new(),
        }
    }
}

impl Command for RenameSchemaDefinitionCommand {
    fn type_tag(&self) -> &'static str {
        "RenameSchemaDefinitionCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.rewritten.clear();
        let container = self.version.definitions_container();
        self.renamed = document.rename_key(&container, &self.old_name, &self.new_name);
        if !self.renamed {
            noop(self.type_tag(), "definition missing or new name taken");
            return;
        }
        self.rewritten = ReferenceRewriter::references().rewrite(
            document,
            &self.version.definition_ref(&self.old_name),
            &self.version.definition_ref(&self.new_name),
        );
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if !std::mem::take(&mut self.renamed) {
            return;
        }
        ReferenceRewriter::restore(document, &std::mem::take(&mut self.rewritten));
        let container = self.version.definitions_container();
        document.rename_key(&container, &self.new_name, &self.old_name);
    }

    record_codec!();
}

/// Renames a tag definition and its uses on operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameTagCommand {
    pub old_name: String,
    pub new_name: String,
    #[serde(default)]
    old_definition: Option<NodeSnapshot>,
    #[serde(default)]
    rewritten: Vec<RewrittenNode>,
}

impl RenameTagCommand {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
            ..Self::default()
        }
    }
}

impl Command for RenameTagCommand {
    fn type_tag(&self) -> &'static str {
        "RenameTagCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_definition = None;
        self.rewritten.clear();
        if find_tag(document, &self.new_name).is_some() {
            noop(self.type_tag(), "new tag name taken");
            return;
        }
        let Some(index) = find_tag(document, &self.old_name) else {
            noop(self.type_tag(), "tag not found");
            return;
        };

        let name = NodePath::from_segments(["tags".to_string(), index.to_string()]).child("name");
        self.old_definition = replace_node(document, &name, Value::String(self.new_name.clone()));
        self.rewritten =
            ReferenceRewriter::tag_usages().rewrite(document, &self.old_name, &self.new_name);
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        let Some(definition) = self.old_definition.take() else {
            return;
        };
        ReferenceRewriter::restore(document, &std::mem::take(&mut self.rewritten));
        definition.restore(document);
    }

    record_codec!();
}

/// Renames a security scheme and the requirements that name it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSecuritySchemeCommand {
    pub version: DocumentVersion,
    pub old_name: String,
    pub new_name: String,
    #[serde(default)]
    renamed: bool,
    #[serde(default)]
    rewritten: Vec<RewrittenNode>,
}

impl RenameSecuritySchemeCommand {
    pub fn for_document(
        document: &ApiDocument,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            version: document.version(),
            old_name: old_name.into(),
            new_name: new_name.into(),
            renamed: false,
            rewritten: Vec::new(),
        }
    }
}

impl Command for RenameSecuritySchemeCommand {
    fn type_tag(&self) -> &'static str {
        "RenameSecuritySchemeCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.rewritten.clear();
        let container = self.version.security_schemes_container();
        self.renamed = document.rename_key(&container, &self.old_name, &self.new_name);
        if !self.renamed {
            noop(self.type_tag(), "scheme missing or new name taken");
            return;
        }
        self.rewritten = ReferenceRewriter::security_requirements().rewrite(
            document,
            &self.old_name,
            &self.new_name,
        );
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if !std::mem::take(&mut self.renamed) {
            return;
        }
        ReferenceRewriter::restore(document, &std::mem::take(&mut self.rewritten));
        let container = self.version.security_schemes_container();
        document.rename_key(&container, &self.new_name, &self.old_name);
    }

    record_codec!();
}

/// Renames a schema property, including its `required` entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePropertyCommand {
    pub schema_path: NodePath,
    pub old_name: String,
    pub new_name: String,
    #[serde(default)]
    renamed: bool,
    #[serde(default)]
    old_required_entry: Option<NodeSnapshot>,
}

impl RenamePropertyCommand {
    pub fn new(
        schema_path: NodePath,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            schema_path,
            old_name: old_name.into(),
            new_name: new_name.into(),
            renamed: false,
            old_required_entry: None,
        }
    }
}

impl Command for RenamePropertyCommand {
    fn type_tag(&self) -> &'static str {
        "RenamePropertyCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_required_entry = None;
        let properties = self.schema_path.child("properties");
        self.renamed = document.rename_key(&properties, &self.old_name, &self.new_name);
        if !self.renamed {
            noop(self.type_tag(), "property missing or new name taken");
            return;
        }

        let required = self.schema_path.child("required");
        let old_name = Value::String(self.old_name.clone());
        if let Some(index) = find_index(document, &required, |entry| *entry == old_name) {
            self.old_required_entry = replace_node(
                document,
                &required.child(index.to_string()),
                Value::String(self.new_name.clone()),
            );
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if !std::mem::take(&mut self.renamed) {
            return;
        }
        if let Some(entry) = self.old_required_entry.take() {
            entry.restore(document);
        }
        let properties = self.schema_path.child("properties");
        document.rename_key(&properties, &self.new_name, &self.old_name);
    }

    record_codec!();
}

/// Renames a parameter within its location
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameParameterCommand {
    pub parent_path: NodePath,
    pub param_location: String,
    pub old_name: String,
    pub new_name: String,
    #[serde(default)]
    old_name_field: Option<NodeSnapshot>,
}

impl RenameParameterCommand {
    pub fn new(
        parent_path: NodePath,
        param_location: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            parent_path,
            param_location: param_location.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
            old_name_field: None,
        }
    }
}

impl Command for RenameParameterCommand {
    fn type_tag(&self) -> &'static str {
        "RenameParameterCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.old_name_field = None;
        let location = self.param_location.as_str();
        if find_parameter(document, &self.parent_path, location, &self.new_name).is_some() {
            noop(self.type_tag(), "new parameter name taken");
            return;
        }
        let Some(index) = find_parameter(document, &self.parent_path, location, &self.old_name)
        else {
            noop(self.type_tag(), "parameter not found");
            return;
        };

        let name = self
            .parent_path
            .child("parameters")
            .child(index.to_string())
            .child("name");
        self.old_name_field = replace_node(document, &name, Value::String(self.new_name.clone()));
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        if let Some(name) = self.old_name_field.take() {
            name.restore(document);
        }
    }

    record_codec!();
}

/// One path item moved by a [`RenamePathItemCommand`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathItemMove {
    pub from: String,
    pub to: String,
    /// The item as it was before its parameters were reconciled
    pub old_item: Value,
}

/// Renames a path item, optionally together with every path below it.
///
/// Path parameters follow the template. A declaration whose name the new
/// template still contains is kept; otherwise it takes the new name at its
/// old position, or is removed as orphaned. `$ref`s to a moved item are
/// rewritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamePathItemCommand {
    pub old_path: String,
    pub new_path: String,
    #[serde(default)]
    pub also_rename_subpaths: bool,
    #[serde(default)]
    moves: Vec<PathItemMove>,
    #[serde(default)]
    rewritten: Vec<RewrittenNode>,
}

impl RenamePathItemCommand {
    pub fn new(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            ..Self::default()
        }
    }

    pub fn with_subpaths(mut self) -> Self {
        self.also_rename_subpaths = true;
        self
    }

    /// (from, to) pairs for every item this rename moves
    fn planned_moves(&self, document: &ApiDocument) -> Vec<(String, String)> {
        let Some(paths) = document.object(&paths_container()) else {
            return Vec::new();
        };
        paths
            .keys()
            .filter_map(|key| {
                if *key == self.old_path {
                    return Some((key.clone(), self.new_path.clone()));
                }
                if !self.also_rename_subpaths {
                    return None;
                }
                let rest = key.strip_prefix(self.old_path.as_str())?;
                rest.starts_with('/')
                    .then(|| (key.clone(), format!("{}{}", self.new_path, rest)))
            })
            .collect()
    }
}

/// `{name}` segments of a path template, in order
pub fn template_params(template: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        params.push(rest[open + 1..open + close].to_string());
        rest = &rest[open + close + 1..];
    }
    params
}

/// Bring the path parameter declarations of a moved item in line with its
/// new template. A slot only passes its new name on when no existing
/// declaration already answers to that name.
fn reconcile_path_params(item: &mut Value, old_template: &str, new_template: &str) {
    let old_params = template_params(old_template);
    let new_params = template_params(new_template);

    let target = |name: &str| -> Option<String> {
        if new_params.iter().any(|p| p == name) {
            return Some(name.to_string());
        }
        let position = old_params.iter().position(|p| p == name)?;
        new_params
            .get(position)
            .filter(|candidate| !old_params.contains(candidate))
            .cloned()
    };

    let Some(item) = item.as_object_mut() else {
        return;
    };
    for (key, node) in item.iter_mut() {
        let parameters = if key == "parameters" {
            Some(node)
        } else if apicollab_model::is_http_method(key) {
            node.get_mut("parameters")
        } else {
            None
        };
        let Some(Value::Array(parameters)) = parameters else {
            continue;
        };
        parameters.retain_mut(|param| {
            if param.get("in").and_then(Value::as_str) != Some("path") {
                return true;
            }
            let Some(name) = param.get("name").and_then(Value::as_str) else {
                return true;
            };
            match target(name) {
                Some(new_name) => {
                    param["name"] = Value::String(new_name);
                    true
                }
                None => false,
            }
        });
    }
}

impl Command for RenamePathItemCommand {
    fn type_tag(&self) -> &'static str {
        "RenamePathItemCommand"
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        self.moves.clear();
        self.rewritten.clear();

        let planned = self.planned_moves(document);
        if planned.is_empty() {
            noop(self.type_tag(), "path not found");
            return;
        }
        if planned
            .iter()
            .any(|(_, to)| document.exists(&path_item_path(to)))
        {
            noop(self.type_tag(), "new path taken");
            return;
        }

        let paths = paths_container();
        for (from, to) in planned {
            let Some(old_item) = document.node(&path_item_path(&from)).cloned() else {
                continue;
            };
            if !document.rename_key(&paths, &from, &to) {
                continue;
            }
            if let Some(item) = document.node_mut(&path_item_path(&to)) {
                reconcile_path_params(item, &from, &to);
            }
            self.moves.push(PathItemMove { from, to, old_item });
        }

        let rewriter = ReferenceRewriter::references();
        for PathItemMove { from, to, .. } in &self.moves {
            let rewritten = rewriter.rewrite(
                document,
                &path_item_path(from).to_reference(),
                &path_item_path(to).to_reference(),
            );
            self.rewritten.extend(rewritten);
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        ReferenceRewriter::restore(document, &std::mem::take(&mut self.rewritten));
        let paths = paths_container();
        for PathItemMove { from, to, old_item } in std::mem::take(&mut self.moves).into_iter().rev()
        {
            if document.rename_key(&paths, &to, &from) {
                if let Some(item) = document.node_mut(&path_item_path(&from)) {
                    *item = old_item;
                }
            }
        }
    }

    record_codec!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{assert_noop, assert_reversible};
    use serde_json::json;

    fn pointer(p: &str) -> NodePath {
        NodePath::parse(p).unwrap()
    }

    fn document() -> ApiDocument {
        ApiDocument::from_value(json!({
            "openapi": "3.0.2",
            "info": { "title": "Pets", "version": "1.0" },
            "tags": [ { "name": "pets" }, { "name": "admin" } ],
            "security": [ { "key": [] } ],
            "paths": {
                "/pets/{petId}": {
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true },
                        { "name": "verbose", "in": "query" }
                    ],
                    "get": {
                        "tags": ["pets"],
                        "security": [ { "key": [], "oauth": [] } ],
                        "responses": {
                            "200": {
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Pet" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/pets/{petId}/toys/{toyId}": {
                    "get": {
                        "parameters": [
                            { "name": "petId", "in": "path" },
                            { "name": "toyId", "in": "path" }
                        ]
                    }
                },
                "/alias": { "$ref": "#/paths/~1pets~1{petId}" }
            },
            "components": {
                "schemas": {
                    "Pet": {
                        "required": ["id"],
                        "properties": {
                            "id": {},
                            "owner": { "$ref": "#/components/schemas/Pet/properties/id" }
                        }
                    },
                    "Toy": { "properties": { "pet": { "$ref": "#/components/schemas/Pet" } } }
                },
                "securitySchemes": { "key": {}, "oauth": {} }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_rename_definition_rewrites_every_ref() {
        let mut doc = document();
        let mut cmd = RenameSchemaDefinitionCommand::for_document(&doc, "Pet", "Animal");
        assert_reversible(&mut doc, &mut cmd, |doc| {
            let json = doc.to_json();
            assert!(!json.contains("schemas/Pet"));
            assert!(json.contains("\"#/components/schemas/Animal/properties/id\""));
            let keys: Vec<_> = doc
                .object(&pointer("/components/schemas"))
                .unwrap()
                .keys()
                .cloned()
                .collect();
            assert_eq!(keys, vec!["Animal", "Toy"]);
        });
    }

    #[test]
    fn test_rename_never_merges() {
        let mut doc = document();
        let mut definition = RenameSchemaDefinitionCommand::for_document(&doc, "Pet", "Toy");
        assert_noop(&mut doc, &mut definition);
        assert_noop(&mut doc, &mut RenameTagCommand::new("pets", "admin"));
        let mut scheme = RenameSecuritySchemeCommand::for_document(&doc, "key", "oauth");
        assert_noop(&mut doc, &mut scheme);
        assert_noop(
            &mut doc,
            &mut RenamePropertyCommand::new(pointer("/components/schemas/Pet"), "id", "owner"),
        );
    }

    #[test]
    fn test_rename_tag_and_usages() {
        let mut doc = document();
        assert_reversible(&mut doc, &mut RenameTagCommand::new("pets", "animals"), |doc| {
            assert_eq!(doc.node(&pointer("/tags/0/name")).unwrap(), &json!("animals"));
            assert_eq!(
                doc.node(&pointer("/paths/~1pets~1{petId}/get/tags")).unwrap(),
                &json!(["animals"])
            );
        });
    }

    #[test]
    fn test_rename_security_scheme_keys() {
        let mut doc = document();
        let mut cmd = RenameSecuritySchemeCommand::for_document(&doc, "key", "apiKey");
        assert_reversible(&mut doc, &mut cmd, |doc| {
            assert_eq!(doc.node(&pointer("/security/0")).unwrap(), &json!({ "apiKey": [] }));
            let op_req = doc
                .object(&pointer("/paths/~1pets~1{petId}/get/security/0"))
                .unwrap();
            let keys: Vec<_> = op_req.keys().cloned().collect();
            assert_eq!(keys, vec!["apiKey", "oauth"]);
        });
    }

    #[test]
    fn test_rename_property_and_required() {
        let mut doc = document();
        let pet = pointer("/components/schemas/Pet");
        let mut cmd = RenamePropertyCommand::new(pet.clone(), "id", "petId");
        assert_reversible(&mut doc, &mut cmd, |doc| {
            assert!(doc.exists(&pet.child("properties").child("petId")));
            assert_eq!(doc.node(&pet.child("required")).unwrap(), &json!(["petId"]));
        });
    }

    #[test]
    fn test_rename_parameter() {
        let mut doc = document();
        let item = path_item_path("/pets/{petId}");
        let mut cmd = RenameParameterCommand::new(item.clone(), "query", "verbose", "detail");
        assert_reversible(&mut doc, &mut cmd, |doc| {
            assert_eq!(
                doc.node(&item.child("parameters").child("1").child("name")).unwrap(),
                &json!("detail")
            );
        });
        assert_noop(
            &mut doc,
            &mut RenameParameterCommand::new(item, "path", "verbose", "detail"),
        );
    }

    #[test]
    fn test_template_params() {
        assert_eq!(template_params("/a/{x}/b/{y}"), vec!["x", "y"]);
        assert!(template_params("/a/b").is_empty());
        assert_eq!(template_params("/a/{x"), Vec::<String>::new());
    }

    #[test]
    fn test_rename_path_renames_template_params_and_refs() {
        let mut doc = document();
        let mut cmd = RenamePathItemCommand::new("/pets/{petId}", "/animals/{animalId}");
        assert_reversible(&mut doc, &mut cmd, |doc| {
            let item = path_item_path("/animals/{animalId}");
            assert_eq!(
                doc.node(&item.child("parameters").child("0").child("name")).unwrap(),
                &json!("animalId")
            );
            assert_eq!(
                doc.node(&pointer("/paths/~1alias/$ref")).unwrap(),
                &json!("#/paths/~1animals~1{animalId}")
            );
            // sub-path untouched without the flag
            assert!(doc.exists(&path_item_path("/pets/{petId}/toys/{toyId}")));
        });
    }

    #[test]
    fn test_rename_path_with_subpaths() {
        let mut doc = document();
        let mut cmd = RenamePathItemCommand::new("/pets/{petId}", "/pets").with_subpaths();
        assert_reversible(&mut doc, &mut cmd, |doc| {
            let item = path_item_path("/pets");
            // orphaned path parameter removed, query parameter kept
            assert_eq!(
                doc.node(&item.child("parameters")).unwrap(),
                &json!([{ "name": "verbose", "in": "query" }])
            );
            let toys = path_item_path("/pets/toys/{toyId}");
            assert_eq!(
                doc.node(&toys.child("get").child("parameters")).unwrap(),
                &json!([{ "name": "toyId", "in": "path" }])
            );
        });
    }

    #[test]
    fn test_rename_path_into_existing_is_noop() {
        let mut doc = document();
        assert_noop(&mut doc, &mut RenamePathItemCommand::new("/pets/{petId}", "/alias"));
        assert_noop(&mut doc, &mut RenamePathItemCommand::new("/dogs", "/cats"));
    }
}
