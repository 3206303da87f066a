#![allow(clippy::self_named_module_files)]

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod reader;
pub mod writer;

/// One MCP server entry, kept exactly as it appeared on disk.
///
/// The engine never looks inside a definition beyond comparing it with another
/// one, so it is stored as raw JSON rather than a typed struct. Equality is
/// structural: object keys compare regardless of order, arrays compare in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerDefinition(Value);

impl ServerDefinition {
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Top-level field of the definition, if it is an object.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

impl From<Value> for ServerDefinition {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Server name to definition, in document order.
pub type ServerMap = IndexMap<String, ServerDefinition>;

/// An IDE config file split into its server map and everything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    pub servers: ServerMap,
    /// Top-level fields other than the server map, in their original order.
    pub extras: Map<String, Value>,
}

impl ConfigDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Splits a parsed config file into servers and extras.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the value is not an object or if
    /// the server map key holds something other than an object.
    pub fn from_value(value: Value, server_key: &str) -> Result<Self, String> {
        let root = match value {
            Value::Object(root) => root,
            other => {
                return Err(format!(
                    "top-level value must be an object, found {}",
                    type_name(&other)
                ));
            },
        };

        let mut document = Self::empty();
        for (key, value) in root {
            if key != server_key {
                document.extras.insert(key, value);
                continue;
            }

            match value {
                Value::Object(servers) => {
                    document.servers = servers
                        .into_iter()
                        .map(|(name, definition)| (name, ServerDefinition::new(definition)))
                        .collect();
                },
                other => {
                    return Err(format!(
                        "\"{server_key}\" must be an object, found {}",
                        type_name(&other)
                    ));
                },
            }
        }

        Ok(document)
    }

    /// Rebuilds the top-level object: extras first, then the server map.
    pub fn to_value(&self, server_key: &str) -> Value {
        let mut root = self.extras.clone();
        let servers: Map<String, Value> = self
            .servers
            .iter()
            .map(|(name, definition)| (name.clone(), definition.as_value().clone()))
            .collect();
        root.insert(server_key.to_string(), Value::Object(servers));
        Value::Object(root)
    }

    /// Same extras, new server map.
    #[must_use]
    pub fn into_merged(self, servers: ServerMap) -> Self {
        Self { servers, extras: self.extras }
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
