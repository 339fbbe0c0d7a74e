// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::engine::Middleware;
use crate::errors::ConstructionError;

/// Configuration of one command.
///
/// Middleware factories read it to decide whether and how to take part in
/// the command. It is fixed once the command is compiled.
///
/// # Fields
/// * `schema` - JSON schema the input must match (used by the schema middleware)
/// * `action` - terminal handler (used by the action middlewares); never deserialized
/// * `options` - any other named options, flattened
///
/// # Example
/// ```yaml
/// schema:
///   type: string
/// retries: 3
/// ```
#[derive(Clone, Default, Deserialize)]
pub struct CommandConfig {
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(skip)]
    pub action: Option<Middleware>,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl CommandConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, ConstructionError> {
        if !value.is_object() {
            return Err(ConstructionError::InvalidConfig {
                provided: value.to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| ConstructionError::InvalidConfig {
            provided: e.to_string(),
        })
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_action(mut self, action: Middleware) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// This configuration laid over `defaults`; entries set here win.
    pub fn merged_over(&self, defaults: &CommandConfig) -> CommandConfig {
        let mut options = defaults.options.clone();
        options.extend(self.options.iter().map(|(k, v)| (k.clone(), v.clone())));

        CommandConfig {
            schema: self.schema.clone().or_else(|| defaults.schema.clone()),
            action: self.action.clone().or_else(|| defaults.action.clone()),
            options,
        }
    }
}

impl fmt::Debug for CommandConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandConfig")
            .field("schema", &self.schema)
            .field("action", &self.action.as_ref().map(Middleware::name))
            .field("options", &self.options)
            .finish()
    }
}
