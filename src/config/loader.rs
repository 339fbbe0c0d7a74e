// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::{CommandConfig, CommandSet, Registry, RegistryOptions};
use crate::engine::{Middleware, MiddlewareFactory};
use crate::errors::ConstructionError;

/// Command definitions read from a file.
///
/// Actions are code, so they are attached after loading with
/// [`CommandDefinitions::with_action`].
///
/// # Example
/// ```yaml
/// defaults:
///   retries: 3
/// context:
///   service: billing
/// commands:
///   echo:
///     schema:
///       type: string
///   charge:
///     schema:
///       type: object
///       required: [amount]
///     retries: 5
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CommandDefinitions {
    #[serde(default)]
    pub defaults: CommandConfig,
    #[serde(default)]
    pub context: Map<String, Value>,
    #[serde(default)]
    pub commands: BTreeMap<String, CommandConfig>,
}

impl CommandDefinitions {
    /// Attach an action to a defined command. Unknown names are ignored.
    pub fn with_action(mut self, command: &str, action: Middleware) -> Self {
        if let Some(config) = self.commands.get_mut(command) {
            config.action = Some(action);
        }
        self
    }

    /// Registry options carrying this file's defaults and context.
    pub fn registry_options(&self, middlewares: Vec<MiddlewareFactory>) -> RegistryOptions {
        RegistryOptions::new(middlewares)
            .with_defaults(self.defaults.clone())
            .with_context(self.context.clone())
    }

    /// Compile every defined command against `middlewares`.
    pub fn compile(self, middlewares: Vec<MiddlewareFactory>) -> Result<CommandSet, ConstructionError> {
        let registry = Registry::new(self.registry_options(middlewares));
        registry.object(self.commands)
    }
}

/// Load command definitions from a YAML, JSON or TOML file, picked by extension.
/// Anything that is not `.json` or `.toml` is read as YAML.
pub fn load_commands<P: AsRef<Path>>(path: P) -> Result<CommandDefinitions, ConstructionError> {
    let path = path.as_ref();
    let load_error = |reason: String| ConstructionError::Load {
        path: path.display().to_string(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    match extension {
        "json" => serde_json::from_str(&content).map_err(|e| load_error(e.to_string())),
        "toml" => toml::from_str(&content).map_err(|e| load_error(e.to_string())),
        _ => parse_commands(&content).map_err(|e| load_error(e.to_string())),
    }
}

/// Parse YAML command definitions.
pub fn parse_commands(yaml: &str) -> Result<CommandDefinitions, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
