// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A single schema rule the input broke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Schema keyword that failed, e.g. `type` or `required`.
    pub keyword: String,
    pub message: String,
    /// Keyword-specific parameters, e.g. `{"type": "string"}`.
    pub params: Value,
    /// Location of the failing value inside the input, `""` for the root.
    pub data_path: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data_path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} {}", self.data_path, self.message)
        }
    }
}

/// The input failed a schema check.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("Validation failed: {}", summarize(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.keyword.as_str())
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
