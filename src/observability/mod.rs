// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for command compilation and execution.
//!
//! Every log line the crate emits is a message struct with a `Display`
//! implementation and a [`messages::StructuredLog`] implementation that picks
//! the level and attaches the message's fields to the tracing event.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::command` - command compilation and the execution lifecycle
//! * `messages::middleware` - factory instantiation and completion handling
//! * `messages::validation` - schema compilation and input validation
//!
//! # Usage
//!
//! ```rust
//! use metalman::observability::messages::command::CommandCompiled;
//! use metalman::observability::messages::StructuredLog;
//!
//! CommandCompiled {
//!     command: "charge",
//!     handler_count: 2,
//!     skipped: 1,
//! }
//! .log();
//! ```
//!
//! Nothing is printed until the application installs a subscriber, for
//! example `tracing_subscriber::fmt().with_env_filter(...)`.

pub mod messages;
