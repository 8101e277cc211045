//! # Command Registry
//!
//! Maps a wire discriminator to a constructor producing a blank command, which
//! is then filled in from the record. The registry is explicit and populated
//! at startup; an unregistered discriminator is a broken wire contract and is
//! reported to the caller.

use crate::command::{record_type, Command, CommandRecord};
use crate::commands;
use crate::errors::CommandError;
use serde_json::Value;
use std::collections::HashMap;

/// Produces a blank command ready for `deserialize_record`
pub type Constructor = fn() -> Box<dyn Command>;

fn construct_default<C: Command + Default + 'static>() -> Box<dyn Command> {
    Box::new(C::default())
}

#[derive(Clone)]
pub struct CommandRegistry {
    constructors: HashMap<String, Constructor>,
}

impl CommandRegistry {
    /// Registry with no commands
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with every built-in command
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        commands::register_builtin(&mut registry);
        registry
    }

    pub fn register(&mut self, type_tag: impl Into<String>, constructor: Constructor) {
        let type_tag = type_tag.into();
        if self.constructors.insert(type_tag.clone(), constructor).is_some() {
            tracing::debug!(%type_tag, "replaced command constructor");
        }
    }

    /// Register a command type under the tag its default instance reports
    pub fn register_default<C: Command + Default + 'static>(&mut self) {
        let type_tag = C::default().type_tag();
        self.register(type_tag, construct_default::<C>);
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.constructors.contains_key(type_tag)
    }

    /// Registered discriminators, sorted
    pub fn type_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Blank command for a discriminator
    pub fn construct(&self, type_tag: &str) -> Result<Box<dyn Command>, CommandError> {
        self.constructors
            .get(type_tag)
            .map(|constructor| constructor())
            .ok_or_else(|| CommandError::UnknownType(type_tag.to_string()))
    }

    /// Rebuild a command from its record
    pub fn unmarshal(&self, record: CommandRecord) -> Result<Box<dyn Command>, CommandError> {
        let mut command = self.construct(record_type(&record)?)?;
        command.deserialize_record(record, self)?;
        Ok(command)
    }

    pub fn unmarshal_value(&self, value: Value) -> Result<Box<dyn Command>, CommandError> {
        match value {
            Value::Object(record) => self.unmarshal(record),
            _ => Err(CommandError::NotARecord),
        }
    }

    pub fn unmarshal_json(&self, json: &str) -> Result<Box<dyn Command>, CommandError> {
        let value: Value = serde_json::from_str(json).map_err(|source| CommandError::Malformed {
            type_tag: "<unknown>".to_string(),
            source,
        })?;
        self.unmarshal_value(value)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("types", &self.type_tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NewPathCommand;
    use serde_json::json;

    #[test]
    fn test_unknown_type_is_an_error() {
        let registry = CommandRegistry::with_builtin();
        let err = registry
            .unmarshal_value(json!({ "__type": "LaunchRocketCommand" }))
            .unwrap_err();
        assert!(matches!(err, CommandError::UnknownType(tag) if tag == "LaunchRocketCommand"));
    }

    #[test]
    fn test_empty_registry_knows_nothing() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.construct("NewPathCommand").is_err());
    }

    #[test]
    fn test_register_default_uses_type_tag() {
        let mut registry = CommandRegistry::new();
        registry.register_default::<NewPathCommand>();
        assert!(registry.contains("NewPathCommand"));

        let command = registry.construct("NewPathCommand").unwrap();
        assert_eq!(command.type_tag(), "NewPathCommand");
    }

    #[test]
    fn test_non_object_record() {
        let registry = CommandRegistry::with_builtin();
        assert!(matches!(
            registry.unmarshal_value(json!(["NewPathCommand"])),
            Err(CommandError::NotARecord)
        ));
    }
}
