// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};
use std::sync::Arc;

/// Read-only bundle handed to every handler of every call.
///
/// All calls of a compiled command share one context, so it carries
/// configuration only. Per-call state belongs in the working value.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext(Arc<Map<String, Value>>);

impl ExecutionContext {
    pub fn new(entries: Map<String, Value>) -> Self {
        Self(Arc::new(entries))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ExecutionContext {
    fn from(entries: Map<String, Value>) -> Self {
        Self::new(entries)
    }
}
