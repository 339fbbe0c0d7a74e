// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for command compilation and the execution lifecycle.

use crate::errors::CommandError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A command was compiled into its handler chain.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use metalman::observability::messages::command::CommandCompiled;
///
/// let msg = CommandCompiled {
///     command: "charge",
///     handler_count: 2,
///     skipped: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct CommandCompiled<'a> {
    pub command: &'a str,
    pub handler_count: usize,
    pub skipped: usize,
}

impl Display for CommandCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled command '{}': {} handlers, {} factories opted out",
            self.command, self.handler_count, self.skipped
        )
    }
}

impl StructuredLog for CommandCompiled<'_> {
    fn log(&self) {
        tracing::info!(
            command = self.command,
            handler_count = self.handler_count,
            skipped = self.skipped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "command_compiled",
            span_name = name,
            command = self.command,
            handler_count = self.handler_count,
            skipped = self.skipped,
        )
    }
}

/// A command call started.
///
/// # Log Level
/// `debug!` - Per-call detail
///
/// # Example
/// ```
/// use metalman::observability::messages::command::CommandExecutionStarted;
///
/// let msg = CommandExecutionStarted {
///     command: "charge",
///     mode: "deferred",
///     handler_count: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct CommandExecutionStarted<'a> {
    pub command: &'a str,
    pub mode: &'a str,
    pub handler_count: usize,
}

impl Display for CommandExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Calling command '{}' ({} mode) through {} handlers",
            self.command, self.mode, self.handler_count
        )
    }
}

impl StructuredLog for CommandExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            command = self.command,
            mode = self.mode,
            handler_count = self.handler_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "command_call",
            span_name = name,
            command = self.command,
            mode = self.mode,
            handler_count = self.handler_count,
        )
    }
}

/// A command call settled successfully.
///
/// # Log Level
/// `debug!` - Per-call detail
///
/// # Example
/// ```
/// use metalman::observability::messages::command::CommandExecutionCompleted;
/// use std::time::Duration;
///
/// let msg = CommandExecutionCompleted {
///     command: "charge",
///     produced_value: true,
///     duration: Duration::from_millis(4),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct CommandExecutionCompleted<'a> {
    pub command: &'a str,
    pub produced_value: bool,
    pub duration: Duration,
}

impl Display for CommandExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Command '{}' completed in {:?}", self.command, self.duration)
    }
}

impl StructuredLog for CommandExecutionCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            command = self.command,
            produced_value = self.produced_value,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "command_completed",
            span_name = name,
            command = self.command,
            produced_value = self.produced_value,
            duration = ?self.duration,
        )
    }
}

/// A command call settled with an error.
///
/// # Log Level
/// `warn!` - The caller receives the error; the engine itself is fine
///
/// # Example
/// ```
/// use metalman::errors::CommandError;
/// use metalman::observability::messages::command::CommandExecutionFailed;
///
/// let error = CommandError::Raised(serde_json::json!({"message": "declined"}));
/// let msg = CommandExecutionFailed {
///     command: "charge",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct CommandExecutionFailed<'a> {
    pub command: &'a str,
    pub error: &'a CommandError,
}

impl Display for CommandExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Command '{}' failed: {}", self.command, self.error)
    }
}

impl StructuredLog for CommandExecutionFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            command = self.command,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "command_failed",
            span_name = name,
            command = self.command,
            error = %self.error,
        )
    }
}

/// A handler did not settle synchronously; the rest of the chain continues
/// once it does.
///
/// # Log Level
/// `trace!` - Scheduling detail
///
/// # Example
/// ```
/// use metalman::observability::messages::command::CommandSuspended;
///
/// let msg = CommandSuspended {
///     command: "charge",
///     handler: "action.handler",
///     index: 1,
/// };
///
/// tracing::trace!("{}", msg);
/// ```
pub struct CommandSuspended<'a> {
    pub command: &'a str,
    pub handler: &'a str,
    pub index: usize,
}

impl Display for CommandSuspended<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Command '{}' suspended on handler '{}' at position {}",
            self.command, self.handler, self.index
        )
    }
}

impl StructuredLog for CommandSuspended<'_> {
    fn log(&self) {
        tracing::trace!(
            command = self.command,
            handler = self.handler,
            index = self.index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "command_suspended",
            span_name = name,
            command = self.command,
            handler = self.handler,
            index = self.index,
        )
    }
}
