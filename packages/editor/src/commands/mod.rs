//! # Command catalogue
//!
//! Every concrete command falls into one of a few shapes:
//!
//! | Shape | Execute | Undo |
//! |---|---|---|
//! | Add-if-absent | no-op if the name exists; remembers containers it created | removes only what it created |
//! | Delete | no-op if absent; snapshots the removed subtree and its slot | re-attaches the snapshot at its slot |
//! | Delete-all | snapshots every removed entry in removal order | restores in reverse order |
//! | Change | snapshots the prior value; applies the new one | restores the prior value |
//! | Rename | no-op if the new name is taken; rewrites references | restores references, renames back |
//! | Replace | snapshots the whole node; installs the new one in place | reinstalls the snapshot |
//! | Aggregate | children in order | children in reverse order |
//!
//! Commands recapture their undo state on every execute, so the engine can
//! undo and replay them freely. A command whose target cannot be resolved
//! logs at debug level and does nothing.

mod add;
mod aggregate;
mod change;
mod delete;
mod delete_all;
mod rename;
mod replace;

pub use add::*;
pub use aggregate::AggregateCommand;
pub use change::*;
pub use delete::*;
pub use delete_all::*;
pub use rename::*;
pub use replace::*;

use crate::registry::CommandRegistry;
use apicollab_model::{ApiDocument, NodePath, Removal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub fn paths_container() -> NodePath {
    NodePath::from_segments(["paths"])
}

pub fn path_item_path(path_name: &str) -> NodePath {
    paths_container().child(path_name)
}

pub fn operation_path(path_name: &str, method: &str) -> NodePath {
    path_item_path(path_name).child(method)
}

pub(crate) fn info_path() -> NodePath {
    NodePath::from_segments(["info"])
}

pub(crate) fn noop(type_tag: &str, reason: &str) {
    tracing::debug!(command = type_tag, reason, "command is a no-op");
}

/// A node taken out of the document, and where it lived
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedNode {
    pub path: NodePath,
    pub removal: Removal,
}

impl RemovedNode {
    pub(crate) fn take(document: &mut ApiDocument, path: NodePath) -> Option<Self> {
        let removal = document.remove_node(&path)?;
        Some(Self { path, removal })
    }

    pub(crate) fn put_back(self, document: &mut ApiDocument) {
        document.restore_node(&self.path, self.removal);
    }
}

/// Full prior value of a node edited in place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
    pub path: NodePath,
    pub value: Value,
}

impl NodeSnapshot {
    pub(crate) fn restore(self, document: &mut ApiDocument) {
        match document.node_mut(&self.path) {
            Some(node) => *node = self.value,
            None => tracing::debug!(path = %self.path, "snapshot target vanished"),
        }
    }
}

/// Replace a node in place, returning its prior value
pub(crate) fn replace_node(
    document: &mut ApiDocument,
    path: &NodePath,
    value: Value,
) -> Option<NodeSnapshot> {
    let node = document.node_mut(path)?;
    let prior = std::mem::replace(node, value);
    Some(NodeSnapshot {
        path: path.clone(),
        value: prior,
    })
}

/// Reversible edit of a single object field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FieldEdit {
    /// The field was written; `prior` is `None` if it did not exist
    Set { prior: Option<Value> },
    /// The field was deleted from its slot
    Removed(Removal),
}

impl FieldEdit {
    pub(crate) fn set(
        document: &mut ApiDocument,
        object: &NodePath,
        key: &str,
        value: Value,
    ) -> Option<Self> {
        document
            .set_field(object, key, value)
            .map(|prior| FieldEdit::Set { prior })
    }

    pub(crate) fn remove(document: &mut ApiDocument, object: &NodePath, key: &str) -> Option<Self> {
        document.remove_node(&object.child(key)).map(FieldEdit::Removed)
    }

    pub(crate) fn revert(self, document: &mut ApiDocument, object: &NodePath, key: &str) {
        match self {
            FieldEdit::Set { prior } => document.restore_field(object, key, prior),
            FieldEdit::Removed(removal) => {
                document.restore_node(&object.child(key), removal);
            }
        }
    }
}

/// Entry pushed onto an array, possibly creating the array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayAddition {
    pub index: usize,
    pub created_array: bool,
}

impl ArrayAddition {
    /// Push onto `parent[key]`, creating the array if needed. `None` if the
    /// parent is missing or `key` holds something else.
    pub(crate) fn push(
        document: &mut ApiDocument,
        parent: &NodePath,
        key: &str,
        value: Value,
    ) -> Option<Self> {
        let created_array = document.ensure_array(parent, key)?;
        let items = document.array_mut(&parent.child(key))?;
        items.push(value);
        Some(Self {
            index: items.len() - 1,
            created_array,
        })
    }

    pub(crate) fn revert(self, document: &mut ApiDocument, parent: &NodePath, key: &str) {
        let array = parent.child(key);
        document.remove_node(&array.child(self.index.to_string()));
        if self.created_array {
            document.prune_created(&[array]);
        }
    }
}

/// Add `container[key] = value` unless present. Missing containers below
/// `anchor` are created; `anchor` itself must exist. Returns the created
/// container paths.
pub(crate) fn add_entry(
    document: &mut ApiDocument,
    anchor: &NodePath,
    container: &NodePath,
    key: &str,
    value: Value,
) -> Option<Vec<NodePath>> {
    if !document.exists(anchor) || document.exists(&container.child(key)) {
        return None;
    }
    let created = document.ensure_object(container)?;
    document
        .object_mut(container)?
        .insert(key.to_string(), value);
    Some(created)
}

/// Reverse an [`add_entry`]
pub(crate) fn remove_added_entry(
    document: &mut ApiDocument,
    container: &NodePath,
    key: &str,
    created: &[NodePath],
) {
    document.remove_node(&container.child(key));
    document.prune_created(created);
}

/// Index of the first array element matching `predicate`
pub(crate) fn find_index<F>(document: &ApiDocument, array: &NodePath, predicate: F) -> Option<usize>
where
    F: Fn(&Value) -> bool,
{
    document.array(array)?.iter().position(predicate)
}

/// Parameters are identified by location (`in`) and name
pub(crate) fn find_parameter(
    document: &ApiDocument,
    parent: &NodePath,
    location: &str,
    name: &str,
) -> Option<usize> {
    find_index(document, &parent.child("parameters"), |param| {
        param.get("in").and_then(Value::as_str) == Some(location)
            && param.get("name").and_then(Value::as_str) == Some(name)
    })
}

/// Servers are identified by URL
pub(crate) fn find_server(document: &ApiDocument, parent: &NodePath, url: &str) -> Option<usize> {
    find_index(document, &parent.child("servers"), |server| {
        server.get("url").and_then(Value::as_str) == Some(url)
    })
}

/// Tag definitions are identified by name
pub(crate) fn find_tag(document: &ApiDocument, name: &str) -> Option<usize> {
    find_index(document, &NodePath::from_segments(["tags"]), |tag| {
        tag.get("name").and_then(Value::as_str) == Some(name)
    })
}

/// Register every built-in command
pub fn register_builtin(registry: &mut CommandRegistry) {
    // Add-if-absent
    registry.register_default::<NewPathCommand>();
    registry.register_default::<NewOperationCommand>();
    registry.register_default::<NewSchemaDefinitionCommand>();
    registry.register_default::<NewSchemaPropertyCommand>();
    registry.register_default::<NewTagCommand>();
    registry.register_default::<NewParamCommand>();
    registry.register_default::<NewResponseCommand>();
    registry.register_default::<NewRequestBodyCommand>();
    registry.register_default::<NewServerCommand>();
    registry.register_default::<NewSecuritySchemeCommand>();

    // Delete
    registry.register_default::<DeletePathCommand>();
    registry.register_default::<DeleteOperationCommand>();
    registry.register_default::<DeleteSchemaDefinitionCommand>();
    registry.register_default::<DeletePropertyCommand>();
    registry.register_default::<DeleteParameterCommand>();
    registry.register_default::<DeleteResponseCommand>();
    registry.register_default::<DeleteTagCommand>();
    registry.register_default::<DeleteExtensionCommand>();
    registry.register_default::<DeleteExampleCommand>();
    registry.register_default::<DeleteServerCommand>();
    registry.register_default::<DeleteSecurityRequirementCommand>();
    registry.register_default::<DeleteSecuritySchemeCommand>();
    registry.register_default::<DeleteRequestBodyCommand>();
    registry.register_default::<DeleteMediaTypeCommand>();
    registry.register_default::<DeleteContactCommand>();
    registry.register_default::<DeleteLicenseCommand>();

    // Delete-all
    registry.register_default::<DeleteAllPropertiesCommand>();
    registry.register_default::<DeleteAllParametersCommand>();
    registry.register_default::<DeleteAllResponsesCommand>();
    registry.register_default::<DeleteAllTagsCommand>();
    registry.register_default::<DeleteAllServersCommand>();
    registry.register_default::<DeleteAllSecurityRequirementsCommand>();
    registry.register_default::<DeleteAllSecuritySchemesCommand>();
    registry.register_default::<DeleteAllOperationsCommand>();
    registry.register_default::<DeleteAllExamplesCommand>();

    // Change
    registry.register_default::<ChangeTitleCommand>();
    registry.register_default::<ChangeVersionCommand>();
    registry.register_default::<ChangeDescriptionCommand>();
    registry.register_default::<ChangeContactCommand>();
    registry.register_default::<ChangeLicenseCommand>();
    registry.register_default::<ChangePropertyCommand>();
    registry.register_default::<ChangeParameterTypeCommand>();
    registry.register_default::<ChangePropertyTypeCommand>();
    registry.register_default::<ChangeResponseTypeCommand>();
    registry.register_default::<ChangeSecuritySchemeCommand>();
    registry.register_default::<ChangeServerCommand>();
    registry.register_default::<ChangeMediaTypeTypeCommand>();

    // Rename
    registry.register_default::<RenamePathItemCommand>();
    registry.register_default::<RenameSchemaDefinitionCommand>();
    registry.register_default::<RenamePropertyCommand>();
    registry.register_default::<RenameTagCommand>();
    registry.register_default::<RenameParameterCommand>();
    registry.register_default::<RenameSecuritySchemeCommand>();

    // Replace
    registry.register_default::<ReplaceOperationCommand>();
    registry.register_default::<ReplacePathItemCommand>();
    registry.register_default::<ReplaceSchemaDefinitionCommand>();
    registry.register_default::<ReplaceSecurityRequirementCommand>();
    registry.register_default::<ReplaceDocumentCommand>();

    registry.register_default::<AggregateCommand>();
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::command::Command;
    use apicollab_model::ApiDocument;

    /// Execute, check the document changed as expected, undo, check it is
    /// byte-identical to before.
    pub fn assert_reversible<C, F>(document: &mut ApiDocument, command: &mut C, check: F)
    where
        C: Command,
        F: FnOnce(&ApiDocument),
    {
        let before = document.to_json();
        command.execute(document);
        check(document);
        command.undo(document);
        assert_eq!(document.to_json(), before, "{} did not undo cleanly", command.type_tag());
    }

    /// Execute and undo must both leave the document untouched
    pub fn assert_noop<C: Command>(document: &mut ApiDocument, command: &mut C) {
        let before = document.to_json();
        command.execute(document);
        assert_eq!(document.to_json(), before, "{} should be a no-op", command.type_tag());
        command.undo(document);
        assert_eq!(document.to_json(), before);
    }
}
