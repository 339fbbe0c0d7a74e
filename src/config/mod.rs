// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod command_config;
mod loader;
mod registry;
mod registry_options;

pub mod consts;

pub use command_config::CommandConfig;
pub use loader::{load_commands, parse_commands, CommandDefinitions};
pub use registry::{CommandSet, CommandSetBuilder, Registry};
pub use registry_options::RegistryOptions;
