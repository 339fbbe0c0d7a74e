// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};

use crate::config::CommandConfig;
use crate::engine::{ExecutionContext, MiddlewareFactory};

/// Settings shared by every command of one registry.
///
/// # Fields
/// * `middlewares` - factories instantiated, in order, for each command
/// * `defaults` - configuration every command is laid over
/// * `context` - read-only context handed to every handler
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    pub middlewares: Vec<MiddlewareFactory>,
    pub defaults: CommandConfig,
    pub context: ExecutionContext,
}

impl RegistryOptions {
    pub fn new(middlewares: Vec<MiddlewareFactory>) -> Self {
        Self {
            middlewares,
            ..Default::default()
        }
    }

    pub fn with_defaults(mut self, defaults: CommandConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = ExecutionContext::new(context);
        self
    }
}

impl From<Vec<MiddlewareFactory>> for RegistryOptions {
    fn from(middlewares: Vec<MiddlewareFactory>) -> Self {
        Self::new(middlewares)
    }
}
