// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;        // command config, registry, loader
pub mod engine;        // pipeline executor + dual-mode commands
pub mod errors;        // error handling
pub mod middlewares;   // built-in middleware factories
pub mod observability;
pub mod traits;        // handler abstractions

pub use config::{CommandConfig, CommandSet, CommandSetBuilder, Registry, RegistryOptions};
pub use engine::{Command, Completion, ExecutionContext, Middleware, MiddlewareFactory};
pub use errors::{CommandError, ConstructionError, Raised, ValidationError, Violation};
pub use traits::{AsyncHandler, CallbackHandler, HandlerResult, SyncHandler};
