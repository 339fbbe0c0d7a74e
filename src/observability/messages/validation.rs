// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for schema compilation and input validation.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An input was rejected by a command's schema.
///
/// # Log Level
/// `debug!` - The caller receives the violations
///
/// # Example
/// ```
/// use metalman::errors::{ValidationError, Violation};
/// use metalman::observability::messages::validation::SchemaValidationFailed;
///
/// let error = ValidationError::new(vec![Violation {
///     keyword: "type".to_string(),
///     message: "should be string".to_string(),
///     params: serde_json::json!({"type": "string"}),
///     data_path: String::new(),
/// }]);
/// let msg = SchemaValidationFailed { error: &error };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct SchemaValidationFailed<'a> {
    pub error: &'a ValidationError,
}

impl Display for SchemaValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StructuredLog for SchemaValidationFailed<'_> {
    fn log(&self) {
        let keywords: Vec<&str> = self.error.keywords().collect();
        tracing::debug!(
            violation_count = self.error.violations.len(),
            keywords = keywords.join(","),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "schema_validation",
            span_name = name,
            violation_count = self.error.violations.len(),
        )
    }
}

/// A schema keyword the validator does not implement. The keyword is
/// ignored.
///
/// # Log Level
/// `debug!` - Compilation detail
///
/// # Example
/// ```
/// use metalman::observability::messages::validation::UnsupportedSchemaKeyword;
///
/// let msg = UnsupportedSchemaKeyword {
///     keyword: "format",
///     path: "#/properties/email",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct UnsupportedSchemaKeyword<'a> {
    pub keyword: &'a str,
    pub path: &'a str,
}

impl Display for UnsupportedSchemaKeyword<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring unsupported schema keyword '{}' at '{}'",
            self.keyword, self.path
        )
    }
}

impl StructuredLog for UnsupportedSchemaKeyword<'_> {
    fn log(&self) {
        tracing::debug!(keyword = self.keyword, path = self.path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "unsupported_schema_keyword",
            span_name = name,
            keyword = self.keyword,
            path = self.path,
        )
    }
}
