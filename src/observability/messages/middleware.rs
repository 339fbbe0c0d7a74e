// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for middleware instantiation and completion handling.

use crate::errors::ConstructionError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A middleware factory failed while compiling a command.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use metalman::errors::ConstructionError;
/// use metalman::observability::messages::middleware::MiddlewareFactoryFailed;
///
/// let error = ConstructionError::Factory {
///     index: 0,
///     name: "schema".to_string(),
///     reason: "bad schema".to_string(),
/// };
/// let msg = MiddlewareFactoryFailed {
///     factory: "schema",
///     index: 0,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct MiddlewareFactoryFailed<'a> {
    pub factory: &'a str,
    pub index: usize,
    pub error: &'a ConstructionError,
}

impl Display for MiddlewareFactoryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StructuredLog for MiddlewareFactoryFailed<'_> {
    fn log(&self) {
        tracing::error!(
            factory = self.factory,
            index = self.index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "middleware_factory_failed",
            span_name = name,
            factory = self.factory,
            index = self.index,
        )
    }
}

/// A factory opted out of a command.
///
/// # Log Level
/// `debug!` - Compilation detail
///
/// # Example
/// ```
/// use metalman::observability::messages::middleware::MiddlewareSkipped;
///
/// let msg = MiddlewareSkipped {
///     factory: "schema",
///     index: 0,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct MiddlewareSkipped<'a> {
    pub factory: &'a str,
    pub index: usize,
}

impl Display for MiddlewareSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Middleware factory '{}' (index {}) opted out",
            self.factory, self.index
        )
    }
}

impl StructuredLog for MiddlewareSkipped<'_> {
    fn log(&self) {
        tracing::debug!(factory = self.factory, index = self.index, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "middleware_skipped",
            span_name = name,
            factory = self.factory,
            index = self.index,
        )
    }
}

/// A factory produced a handler for a command.
///
/// # Log Level
/// `debug!` - Compilation detail
///
/// # Example
/// ```
/// use metalman::observability::messages::middleware::MiddlewareInstantiated;
///
/// let msg = MiddlewareInstantiated {
///     factory: "action",
///     handler: "action.handler",
///     kind: "callback",
///     index: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct MiddlewareInstantiated<'a> {
    pub factory: &'a str,
    pub handler: &'a str,
    pub kind: &'a str,
    pub index: usize,
}

impl Display for MiddlewareInstantiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Middleware factory '{}' (index {}) produced {} handler '{}'",
            self.factory, self.index, self.kind, self.handler
        )
    }
}

impl StructuredLog for MiddlewareInstantiated<'_> {
    fn log(&self) {
        tracing::debug!(
            factory = self.factory,
            handler = self.handler,
            kind = self.kind,
            index = self.index,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "middleware_instantiated",
            span_name = name,
            factory = self.factory,
            handler = self.handler,
            kind = self.kind,
            index = self.index,
        )
    }
}

/// A callback handler settled its completion after it had already settled,
/// or after returning a value. The later outcome is dropped.
///
/// # Log Level
/// `warn!` - Misbehaving handler
///
/// # Example
/// ```
/// use metalman::observability::messages::middleware::LateCompletionIgnored;
///
/// let msg = LateCompletionIgnored {
///     handler: "action.handler",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct LateCompletionIgnored<'a> {
    pub handler: &'a str,
}

impl Display for LateCompletionIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Handler '{}' settled more than once; ignoring the later outcome",
            self.handler
        )
    }
}

impl StructuredLog for LateCompletionIgnored<'_> {
    fn log(&self) {
        tracing::warn!(handler = self.handler, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("late_completion", span_name = name, handler = self.handler)
    }
}
