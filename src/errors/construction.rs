// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while building a registry or compiling a command.

use thiserror::Error;

/// Malformed registry or command setup. Always returned synchronously at
/// setup time and never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    /// A command configuration was supplied as something other than an object.
    #[error(
        "To instantiate a command, you must pass a configuration which must be an object. \
         You provided: {provided}"
    )]
    InvalidConfig { provided: String },

    /// A middleware factory failed to produce its handler.
    #[error("Middleware factory '{name}' with index {index} failed: {reason}")]
    Factory {
        index: usize,
        name: String,
        reason: String,
    },

    /// A JSON schema could not be compiled.
    #[error("Invalid schema at '{path}': {reason}")]
    InvalidSchema { path: String, reason: String },

    /// A command definitions file could not be read or parsed.
    #[error("Failed to load command definitions from '{path}': {reason}")]
    Load { path: String, reason: String },
}
