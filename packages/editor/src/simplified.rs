//! Simplified type descriptors.
//!
//! Editors describe schema types with a small value object rather than raw
//! JSON schema: a primitive (`string` + format), an array (`of` another
//! descriptor), a reference (`#/components/schemas/Pet`) or an enum. These are
//! serialized field-by-field as nested records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON schema keys a descriptor owns; everything else on a schema is kept.
const TYPE_KEYS: [&str; 5] = ["$ref", "type", "format", "items", "enum"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedType {
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(rename = "enum", default)]
    pub enum_: Option<Vec<Value>>,
    #[serde(default)]
    pub of: Option<Box<SimplifiedType>>,
    #[serde(rename = "as", default)]
    pub as_: Option<String>,
}

impl SimplifiedType {
    pub fn primitive(type_: &str, format: Option<&str>) -> Self {
        Self {
            type_: Some(type_.to_string()),
            as_: format.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn reference(reference: &str) -> Self {
        Self {
            type_: Some(reference.to_string()),
            ..Self::default()
        }
    }

    pub fn array_of(item: SimplifiedType) -> Self {
        Self {
            type_: Some("array".to_string()),
            of: Some(Box::new(item)),
            ..Self::default()
        }
    }

    pub fn is_ref(&self) -> bool {
        self.type_.as_deref().is_some_and(|t| t.starts_with("#/"))
    }

    pub fn is_array(&self) -> bool {
        self.type_.as_deref() == Some("array")
    }

    pub fn is_enum(&self) -> bool {
        self.enum_.as_ref().is_some_and(|values| !values.is_empty())
    }

    /// Render as a standalone JSON schema fragment
    pub fn to_schema(&self) -> Value {
        let mut schema = Map::new();
        self.write_into(&mut schema);
        Value::Object(schema)
    }

    /// Replace the type-describing keys of an existing schema object
    pub fn write_into(&self, schema: &mut Map<String, Value>) {
        for key in TYPE_KEYS {
            schema.remove(key);
        }

        let Some(type_) = &self.type_ else {
            return;
        };

        if self.is_ref() {
            schema.insert("$ref".to_string(), Value::String(type_.clone()));
            return;
        }

        schema.insert("type".to_string(), Value::String(type_.clone()));
        if self.is_array() {
            if let Some(of) = &self.of {
                schema.insert("items".to_string(), of.to_schema());
            }
            return;
        }
        if let Some(format) = &self.as_ {
            schema.insert("format".to_string(), Value::String(format.clone()));
        }
        if self.is_enum() {
            schema.insert(
                "enum".to_string(),
                Value::Array(self.enum_.clone().unwrap_or_default()),
            );
        }
    }

    /// Read a descriptor back from a JSON schema fragment
    pub fn from_schema(schema: &Value) -> Self {
        let Some(schema) = schema.as_object() else {
            return Self::default();
        };
        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            return Self::reference(reference);
        }
        Self {
            type_: schema.get("type").and_then(Value::as_str).map(str::to_string),
            enum_: schema.get("enum").and_then(Value::as_array).cloned(),
            of: schema
                .get("items")
                .map(|items| Box::new(Self::from_schema(items))),
            as_: schema.get("format").and_then(Value::as_str).map(str::to_string),
        }
    }
}

/// Type of a parameter, plus whether it is required
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedParameterType {
    #[serde(flatten)]
    pub base: SimplifiedType,
    #[serde(default)]
    pub required: Option<bool>,
}

/// Type of a schema property, plus whether the parent lists it as required
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedPropertyType {
    #[serde(flatten)]
    pub base: SimplifiedType,
    #[serde(default)]
    pub required: Option<bool>,
}
