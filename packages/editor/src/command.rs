//! # Command contract
//!
//! A [`Command`] is a self-contained, reversible unit of change against an
//! [`ApiDocument`]. Commands capture whatever "before" state they need at the
//! moment they execute, so they can be undone and re-executed any number of
//! times while the engine rewinds and replays history.
//!
//! ## Wire form
//!
//! A command travels as a [`CommandRecord`]: a flat JSON object holding a
//! `__type` discriminator followed by the command's own fields (camelCase),
//! including its captured undo state. Node paths travel in their string form.

use crate::errors::CommandError;
use crate::registry::CommandRegistry;
use apicollab_model::ApiDocument;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialized command
pub type CommandRecord = Map<String, Value>;

/// Discriminator key of a [`CommandRecord`]
pub const TYPE_KEY: &str = "__type";

/// Trait for reversible document commands
///
/// Each command provides:
/// - Execute logic that tolerates a missing target by doing nothing
/// - Undo logic that reverses exactly the most recent execute
/// - A field-by-field wire representation
pub trait Command: std::fmt::Debug + Send {
    /// Stable wire discriminator
    fn type_tag(&self) -> &'static str;

    /// Apply the change, capturing what undo will need
    fn execute(&mut self, document: &mut ApiDocument);

    /// Reverse the most recent execute (a no-op if that execute was one)
    fn undo(&mut self, document: &mut ApiDocument);

    fn serialize_record(&self) -> Result<CommandRecord, CommandError>;

    /// Overwrite this (typically blank) command from a record. Nested
    /// commands are rebuilt through `registry`.
    fn deserialize_record(
        &mut self,
        record: CommandRecord,
        registry: &CommandRegistry,
    ) -> Result<(), CommandError>;
}

/// Encode a command's serde fields behind a `__type` discriminator
pub fn encode<T: Serialize>(type_tag: &str, command: &T) -> Result<CommandRecord, CommandError> {
    let fields = serde_json::to_value(command).map_err(|source| CommandError::Malformed {
        type_tag: type_tag.to_string(),
        source,
    })?;
    let Value::Object(fields) = fields else {
        return Err(CommandError::NotARecord);
    };

    let mut record = CommandRecord::new();
    record.insert(TYPE_KEY.to_string(), Value::String(type_tag.to_string()));
    record.extend(fields);
    Ok(record)
}

/// Decode a command's serde fields, ignoring the discriminator
pub fn decode<T: DeserializeOwned>(
    type_tag: &str,
    mut record: CommandRecord,
) -> Result<T, CommandError> {
    record.remove(TYPE_KEY);
    serde_json::from_value(Value::Object(record)).map_err(|source| CommandError::Malformed {
        type_tag: type_tag.to_string(),
        source,
    })
}

/// Read the discriminator of a record
pub fn record_type(record: &CommandRecord) -> Result<&str, CommandError> {
    record
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or(CommandError::MissingType)
}

/// Implements the record methods of [`Command`] through the type's serde derive.
macro_rules! record_codec {
    () => {
        fn serialize_record(&self) -> Result<$crate::command::CommandRecord, $crate::errors::CommandError> {
            $crate::command::encode(self.type_tag(), self)
        }

        fn deserialize_record(
            &mut self,
            record: $crate::command::CommandRecord,
            _registry: &$crate::registry::CommandRegistry,
        ) -> Result<(), $crate::errors::CommandError> {
            *self = $crate::command::decode(self.type_tag(), record)?;
            Ok(())
        }
    };
}

pub(crate) use record_codec;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Retitle {
        new_title: String,
        old_title: Option<String>,
    }

    #[test]
    fn test_encode_puts_type_first() {
        let retitle = Retitle {
            new_title: "Pets".to_string(),
            old_title: None,
        };
        let record = encode("RetitleCommand", &retitle).unwrap();
        let keys: Vec<_> = record.keys().cloned().collect();
        assert_eq!(keys[0], TYPE_KEY);
        assert_eq!(record["newTitle"], json!("Pets"));
        assert_eq!(record_type(&record).unwrap(), "RetitleCommand");
    }

    #[test]
    fn test_decode_malformed_record() {
        let mut record = CommandRecord::new();
        record.insert(TYPE_KEY.to_string(), json!("RetitleCommand"));
        record.insert("newTitle".to_string(), json!(42));

        let err = decode::<Retitle>("RetitleCommand", record).unwrap_err();
        assert!(matches!(err, CommandError::Malformed { .. }));
    }

    #[test]
    fn test_missing_discriminator() {
        let record = CommandRecord::new();
        assert!(matches!(record_type(&record), Err(CommandError::MissingType)));
    }
}
