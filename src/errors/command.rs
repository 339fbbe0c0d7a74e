// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The uniform error a command call fails with.

use serde_json::Value;
use std::backtrace::Backtrace;
use std::fmt;
use thiserror::Error;

use super::{BoxError, ConstructionError, ValidationError};

/// Outcome of one command call. `Ok(None)` means the chain produced no value.
pub type CommandResult = Result<Option<Value>, CommandError>;

/// Every failed command call surfaces exactly one of these.
///
/// Handler errors keep their original shape where they have one; only
/// primitive values and panics are wrapped, with a backtrace captured where
/// the wrapping happened.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The input did not match the command's schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Setup failed; only seen when a handler forwards a construction error.
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// A handler failed with an error value.
    #[error("{source}")]
    Handler { source: BoxError },

    /// A handler raised a structured (object or array) JSON value.
    #[error("{}", raised_message(.0))]
    Raised(Value),

    /// A handler raised a primitive value or panicked.
    #[error(transparent)]
    Wrapped(WrappedError),

    /// A callback handler dropped its completion without settling it.
    #[error("Handler '{handler}' dropped its completion without settling")]
    CompletionDropped { handler: String },
}

impl CommandError {
    /// Backtrace captured when a primitive value or panic was wrapped.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            CommandError::Wrapped(wrapped) => Some(wrapped.backtrace()),
            _ => None,
        }
    }

    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CommandError::Validation(error) => Some(error),
            _ => None,
        }
    }

    /// Downcast the error a handler failed with.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            CommandError::Handler { source } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

fn raised_message(value: &Value) -> String {
    match value.get("message") {
        Some(Value::String(message)) => message.clone(),
        _ => value.to_string(),
    }
}

/// Error built from a raised primitive or a panic payload.
pub struct WrappedError {
    message: String,
    backtrace: Backtrace,
}

impl WrappedError {
    /// Captures the backtrace here, not where the value was originally raised.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            backtrace: Backtrace::force_capture(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for WrappedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for WrappedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}\n{}", self.message, self.backtrace)
    }
}

impl std::error::Error for WrappedError {}
