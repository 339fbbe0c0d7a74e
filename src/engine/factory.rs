// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::{CommandConfig, RegistryOptions};
use crate::engine::pipeline::Pipeline;
use crate::engine::Command;
use crate::errors::ConstructionError;
use crate::observability::messages::{command::*, StructuredLog};

/// Compiles command configurations into [`Command`]s.
pub struct CommandFactory;

impl CommandFactory {
    /// Compile one command.
    ///
    /// The registry defaults sit under `config`, every registry factory is
    /// instantiated in order, and the ones that opt out are left out of the
    /// chain.
    pub fn compile(
        name: &str,
        config: &CommandConfig,
        options: &RegistryOptions,
    ) -> Result<Command, ConstructionError> {
        let config = config.merged_over(&options.defaults);

        let mut middlewares = Vec::with_capacity(options.middlewares.len());
        for (index, factory) in options.middlewares.iter().enumerate() {
            if let Some(middleware) = factory.instantiate(&config, options, index)? {
                middlewares.push(middleware);
            }
        }

        CommandCompiled {
            command: name,
            handler_count: middlewares.len(),
            skipped: options.middlewares.len() - middlewares.len(),
        }
        .log();

        let name: Arc<str> = Arc::from(name);
        let pipeline = Pipeline::new(Arc::clone(&name), middlewares, options.context.clone());
        Ok(Command::new(name, pipeline))
    }
}
