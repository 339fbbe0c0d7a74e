// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in middleware factories.
//!
//! * `action` - runs the command's configured action as the terminal handler
//! * `deferred_action` - same, but always settles on a later scheduler turn
//! * `schema` - validates the input against the command's JSON schema
//!
//! A typical registry validates first and acts last:
//! ```rust
//! use metalman::Registry;
//! use metalman::middlewares::{action, schema};
//!
//! let registry = Registry::from(vec![schema(), action()]);
//! ```

pub mod action;
pub mod deferred_action;
pub mod json_schema;
pub mod schema;

pub use action::action;
pub use deferred_action::deferred_action;
pub use json_schema::CompiledSchema;
pub use schema::schema;
