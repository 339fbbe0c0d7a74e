// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::consts::DEFAULT_COMMAND_NAME;
use crate::config::{CommandConfig, RegistryOptions};
use crate::engine::{Command, CommandFactory, MiddlewareFactory};
use crate::errors::ConstructionError;

/// Compiles commands against one shared list of middleware factories.
#[derive(Debug, Clone)]
pub struct Registry {
    options: Arc<RegistryOptions>,
}

impl Registry {
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Compile a single command, named `execute`.
    pub fn command(&self, config: CommandConfig) -> Result<Command, ConstructionError> {
        self.command_named(DEFAULT_COMMAND_NAME, config)
    }

    pub fn command_named(&self, name: &str, config: CommandConfig) -> Result<Command, ConstructionError> {
        CommandFactory::compile(name, &config, &self.options)
    }

    /// Start an empty command set.
    pub fn builder(&self) -> CommandSetBuilder {
        CommandSetBuilder {
            registry: self.clone(),
            commands: BTreeMap::new(),
        }
    }

    /// Start a command set with one command in it.
    pub fn define(
        &self,
        name: impl Into<String>,
        config: CommandConfig,
    ) -> Result<CommandSetBuilder, ConstructionError> {
        self.builder().define(name, config)
    }

    /// Compile a batch of named commands straight into a [`CommandSet`].
    pub fn object<I, S>(&self, commands: I) -> Result<CommandSet, ConstructionError>
    where
        I: IntoIterator<Item = (S, CommandConfig)>,
        S: Into<String>,
    {
        commands
            .into_iter()
            .try_fold(self.builder(), |builder, (name, config)| builder.define(name, config))
            .map(CommandSetBuilder::finish)
    }
}

impl From<RegistryOptions> for Registry {
    fn from(options: RegistryOptions) -> Self {
        Self::new(options)
    }
}

impl From<Vec<MiddlewareFactory>> for Registry {
    fn from(middlewares: Vec<MiddlewareFactory>) -> Self {
        Self::new(RegistryOptions::new(middlewares))
    }
}

/// A command set that can still grow.
#[derive(Debug)]
pub struct CommandSetBuilder {
    registry: Registry,
    commands: BTreeMap<String, Command>,
}

impl CommandSetBuilder {
    /// Compile and add a command. A command already defined under `name` is
    /// replaced.
    pub fn define(mut self, name: impl Into<String>, config: CommandConfig) -> Result<Self, ConstructionError> {
        let name = name.into();
        let command = self.registry.command_named(&name, config)?;
        self.commands.insert(name, command);
        Ok(self)
    }

    /// Freeze the set. The result can no longer be extended.
    pub fn finish(self) -> CommandSet {
        CommandSet {
            commands: self.commands,
        }
    }
}

/// Resolved name-to-command mapping.
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    commands: BTreeMap<String, Command>,
}

impl CommandSet {
    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Command)> {
        self.commands.iter().map(|(name, command)| (name.as_str(), command))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl IntoIterator for CommandSet {
    type Item = (String, Command);
    type IntoIter = std::collections::btree_map::IntoIter<String, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Middleware;
    use crate::middlewares::action;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::from(vec![action()])
    }

    fn constant(value: &'static str) -> CommandConfig {
        CommandConfig::new().with_action(Middleware::sync(move |_, _| Ok(Some(json!(value)))))
    }

    #[test]
    fn test_single_command_is_named_execute() {
        let command = registry().command(CommandConfig::new()).unwrap();
        assert_eq!(command.name(), "execute");
        assert!(command.is_empty());
    }

    #[tokio::test]
    async fn test_object_compiles_every_command() {
        let commands = registry()
            .object([("ping", constant("pong")), ("hello", constant("world"))])
            .unwrap();

        assert_eq!(commands.len(), 2);
        assert_eq!(commands.names().collect::<Vec<_>>(), vec!["hello", "ping"]);

        let ping = commands.get("ping").expect("ping command");
        assert_eq!(ping.name(), "ping");
        assert_eq!(ping.call("anything").await.unwrap(), Some(json!("pong")));
    }

    #[tokio::test]
    async fn test_builder_define_chain() {
        let commands = registry()
            .define("first", constant("1"))
            .and_then(|b| b.define("second", constant("2")))
            .and_then(|b| b.define("first", constant("one")))
            .unwrap()
            .finish();

        assert_eq!(commands.len(), 2);
        let first = commands.get("first").unwrap();
        assert_eq!(first.call(json!(null)).await.unwrap(), Some(json!("one")));
    }

    #[test]
    fn test_object_propagates_construction_errors() {
        let failing = MiddlewareFactory::new("failing", |_, _| Err("cannot build".into()));
        let registry = Registry::from(vec![action(), failing]);

        let error = registry.object([("ping", constant("pong"))]).unwrap_err();
        assert!(matches!(error, ConstructionError::Factory { index: 1, .. }));
    }

    #[test]
    fn test_commands_without_action_have_no_handlers() {
        let commands = registry().object([("empty", CommandConfig::new())]).unwrap();
        assert!(commands.get("empty").unwrap().is_empty());
        assert!(!commands.contains("missing"));
    }
}
