//! Named group of commands applied as one.

use crate::command::{Command, CommandRecord, TYPE_KEY};
use crate::errors::CommandError;
use crate::registry::CommandRegistry;
use apicollab_model::ApiDocument;
use serde_json::Value;

const TYPE_TAG: &str = "AggregateCommand";

/// Executes its children in order and undoes them in reverse, since a later
/// child may depend on an earlier one being in effect.
#[derive(Debug, Default)]
pub struct AggregateCommand {
    pub name: String,
    pub commands: Vec<Box<dyn Command>>,
}

impl AggregateCommand {
    pub fn new(name: impl Into<String>, commands: Vec<Box<dyn Command>>) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    /// Append a child
    pub fn push(&mut self, command: impl Command + 'static) {
        self.commands.push(Box::new(command));
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn malformed(message: &str) -> CommandError {
    CommandError::Malformed {
        type_tag: TYPE_TAG.to_string(),
        source: serde::de::Error::custom(message),
    }
}

impl Command for AggregateCommand {
    fn type_tag(&self) -> &'static str {
        TYPE_TAG
    }

    fn execute(&mut self, document: &mut ApiDocument) {
        tracing::debug!(name = %self.name, children = self.commands.len(), "executing aggregate");
        for command in self.commands.iter_mut() {
            command.execute(document);
        }
    }

    fn undo(&mut self, document: &mut ApiDocument) {
        for command in self.commands.iter_mut().rev() {
            command.undo(document);
        }
    }

    fn serialize_record(&self) -> Result<CommandRecord, CommandError> {
        let children = self
            .commands
            .iter()
            .map(|command| command.serialize_record().map(Value::Object))
            .collect::<Result<Vec<_>, _>>()?;

        let mut record = CommandRecord::new();
        record.insert(TYPE_KEY.to_string(), Value::String(TYPE_TAG.to_string()));
        record.insert("name".to_string(), Value::String(self.name.clone()));
        record.insert("commands".to_string(), Value::Array(children));
        Ok(record)
    }

    fn deserialize_record(
        &mut self,
        mut record: CommandRecord,
        registry: &CommandRegistry,
    ) -> Result<(), CommandError> {
        let name = match record.remove("name") {
            Some(Value::String(name)) => name,
            None => String::new(),
            Some(_) => return Err(malformed("`name` must be a string")),
        };
        let children = match record.remove("commands") {
            Some(Value::Array(children)) => children,
            None => Vec::new(),
            Some(_) => return Err(malformed("`commands` must be an array")),
        };

        let commands = children
            .into_iter()
            .map(|child| registry.unmarshal_value(child))
            .collect::<Result<Vec<_>, _>>()?;

        self.name = name;
        self.commands = commands;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        paths_container, NewOperationCommand, NewPathCommand, RenamePathItemCommand,
    };
    use serde_json::json;

    fn create_pets() -> AggregateCommand {
        let mut aggregate = AggregateCommand::new("Create pets", Vec::new());
        aggregate.push(NewPathCommand::new("/pets"));
        aggregate.push(NewOperationCommand::new("/pets", "get"));
        aggregate
    }

    #[test]
    fn test_undo_runs_in_reverse() {
        let mut doc = ApiDocument::new_openapi3("Pets", "1.0");
        let before = doc.to_json();

        let mut aggregate = create_pets();
        aggregate.push(RenamePathItemCommand::new("/pets", "/animals"));
        aggregate.execute(&mut doc);
        assert!(doc.exists(&crate::commands::operation_path("/animals", "get")));

        // forward-order undo would fail to find /pets/get after the rename
        aggregate.undo(&mut doc);
        assert_eq!(doc.to_json(), before);
        assert!(!doc.exists(&paths_container()));
    }

    #[test]
    fn test_record_nests_children() {
        let registry = CommandRegistry::with_builtin();
        let aggregate = create_pets();

        let record = aggregate.serialize_record().unwrap();
        assert_eq!(record["name"], json!("Create pets"));
        assert_eq!(record["commands"][1]["__type"], json!("NewOperationCommand"));

        let mut rebuilt = registry.unmarshal(record).unwrap();
        let mut doc = ApiDocument::new_openapi3("Pets", "1.0");
        rebuilt.execute(&mut doc);
        assert!(doc.exists(&crate::commands::operation_path("/pets", "get")));
    }

    #[test]
    fn test_unknown_child_fails_whole_record() {
        let registry = CommandRegistry::with_builtin();
        let err = registry
            .unmarshal_value(json!({
                "__type": "AggregateCommand",
                "name": "bad",
                "commands": [ { "__type": "NoSuchCommand" } ]
            }))
            .unwrap_err();
        assert!(matches!(err, CommandError::UnknownType(_)));
    }
}
