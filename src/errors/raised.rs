// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The value a handler fails with, before normalization.

use serde_json::Value;
use std::any::Any;
use std::fmt;

/// Boxed error type accepted from handlers and middleware factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Anything a handler can fail with.
///
/// Handlers return `Result<_, Raised>`, so `?` works on any
/// `std::error::Error`. Plain JSON values can be raised too; primitives among
/// them are wrapped into a message-bearing error by the normalizer
/// (see [`crate::engine::normalize`]).
pub enum Raised {
    /// An error-shaped value. Passed through normalization untouched.
    Error(BoxError),
    /// An arbitrary JSON value, e.g. `Raised::value("something")`.
    Value(Value),
    /// A caught panic payload.
    Panic(Box<dyn Any + Send + 'static>),
}

impl Raised {
    pub fn value(value: impl Into<Value>) -> Self {
        Raised::Value(value.into())
    }

    pub fn boxed(error: BoxError) -> Self {
        Raised::Error(error)
    }

    pub fn panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        Raised::Panic(payload)
    }
}

impl<E> From<E> for Raised
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Raised::Error(Box::new(error))
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raised::Error(error) => f.debug_tuple("Error").field(error).finish(),
            Raised::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Raised::Panic(_) => f.write_str("Panic(..)"),
        }
    }
}
