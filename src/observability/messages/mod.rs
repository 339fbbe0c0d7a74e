// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging.
//!
//! * `command` - command compilation and execution lifecycle
//! * `middleware` - middleware instantiation and completion events
//! * `validation` - schema compilation and validation failures

pub mod command;
pub mod middleware;
pub mod validation;

use tracing::Span;

/// A message that knows how to log itself.
///
/// `log` emits one event at the message's level with its fields attached.
/// `span` opens a span carrying the same fields.
pub trait StructuredLog {
    fn log(&self);
    fn span(&self, name: &str) -> Span;
}
