//! Variables file support
//!
//! Loads static variable bindings from a TOML file into the global scope of
//! a [`VariableStore`]:
//!
//! ```toml
//! [variables]
//! host = "staging.example.com"
//! retries = 3
//! admins = ["ada", "grace"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::resolve::{VariableScope, VariableStore};
use crate::value::Value;

/// Errors that can occur when loading or parsing a variables file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read variables file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse variables TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A parsed variables file
#[derive(Debug, Clone)]
pub struct VariablesFile {
    /// Variable bindings: name -> value
    pub variables: HashMap<String, Value>,
}

/// TOML structure for deserializing variables files
#[derive(Deserialize)]
struct TomlVariables {
    #[serde(default)]
    variables: HashMap<String, toml::Value>,
}

impl VariablesFile {
    /// Load a variables file from disk
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a variables file from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlVariables = toml::from_str(content)?;
        Ok(VariablesFile {
            variables: parsed
                .variables
                .into_iter()
                .map(|(name, value)| (name, toml_to_value(value)))
                .collect(),
        })
    }

    /// Move the bindings into the global scope of a fresh store
    pub fn into_store(self) -> VariableStore {
        let mut store = VariableStore::new();
        for (name, value) in self.variables {
            store.set(VariableScope::Global, name, value);
        }
        store
    }
}

fn toml_to_value(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::Text(s),
        toml::Value::Integer(i) => Value::Integer(i),
        toml::Value::Float(x) => Value::Float(x),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::Text(dt.to_string()),
        toml::Value::Array(items) => Value::List(items.into_iter().map(toml_to_value).collect()),
        toml::Value::Table(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(name, value)| (name, toml_to_value(value)))
                .collect(),
        ),
    }
}
