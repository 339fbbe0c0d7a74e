// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A compiled command with its two calling conventions.
//!
//! ```rust
//! use metalman::{Middleware, Registry, CommandConfig};
//! use metalman::middlewares::action;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::from(vec![action()]);
//! let ping = registry.command(
//!     CommandConfig::new().with_action(Middleware::sync(|_, _| Ok(Some(json!("pong"))))),
//! )?;
//!
//! // Awaited.
//! assert_eq!(ping.call("ping").await?, Some(json!("pong")));
//!
//! // With a completion callback; this chain settles before `call_with` returns.
//! ping.call_with("ping", |result| assert_eq!(result.unwrap(), Some(json!("pong"))));
//! # Ok(())
//! # }
//! ```

use serde_json::Value;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{Instrument, Span};

use crate::engine::pipeline::{Pipeline, Progress};
use crate::engine::ExecutionContext;
use crate::errors::{CommandError, CommandResult};
use crate::observability::messages::{command::*, StructuredLog};

const MODE_DEFERRED: &str = "deferred";
const MODE_CALLBACK: &str = "callback";
const FALLBACK_THREAD_NAME: &str = "metalman-fallback";

/// A compiled, immutable command. Cloning is cheap and clones share the
/// compiled chain.
#[derive(Clone)]
pub struct Command {
    name: Arc<str>,
    pipeline: Arc<Pipeline>,
}

impl Command {
    pub(crate) fn new(name: Arc<str>, pipeline: Pipeline) -> Self {
        Self {
            name,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the handlers that made it into the chain, in order.
    pub fn handler_names(&self) -> Vec<&str> {
        self.pipeline.middlewares().iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.pipeline.middlewares().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline.is_empty()
    }

    pub fn context(&self) -> &ExecutionContext {
        self.pipeline.context()
    }

    /// Run the command and await its outcome.
    pub async fn call(&self, input: impl Into<Value>) -> CommandResult {
        let (started, span) = self.begin(MODE_DEFERRED);
        let result = match span.in_scope(|| self.pipeline.start(input.into())) {
            Progress::Complete(result) => result,
            Progress::Suspended(future) => future.instrument(span).await,
        };
        report(&self.name, &result, started);
        result
    }

    /// Run the command and hand its outcome to `done`, exactly once.
    ///
    /// When every handler settles synchronously, `done` runs before this
    /// returns. Otherwise the rest of the chain is spawned on the current
    /// tokio runtime. Without one, a shared fallback runtime is entered for
    /// the whole call, so handlers can still use tokio timers and IO.
    pub fn call_with<F>(&self, input: impl Into<Value>, done: F)
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        let (started, span) = self.begin(MODE_CALLBACK);
        let handle = match runtime_handle() {
            Ok(handle) => handle,
            Err(error) => {
                let result = Err(error);
                report(&self.name, &result, started);
                done(result);
                return;
            }
        };
        let _runtime = handle.enter();

        match span.in_scope(|| self.pipeline.start(input.into())) {
            Progress::Complete(result) => {
                report(&self.name, &result, started);
                done(result);
            }
            Progress::Suspended(future) => {
                let name = Arc::clone(&self.name);
                let finish = async move {
                    let result = future.await;
                    report(&name, &result, started);
                    done(result);
                };
                handle.spawn(finish.instrument(span));
            }
        }
    }

    fn begin(&self, mode: &str) -> (Instant, Span) {
        let started = CommandExecutionStarted {
            command: &self.name,
            mode,
            handler_count: self.len(),
        };
        started.log();
        (Instant::now(), started.span("command_call"))
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("handlers", &self.handler_names())
            .finish()
    }
}

static FALLBACK_RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

/// The caller's runtime, or the shared fallback runtime when there is none.
fn runtime_handle() -> Result<Handle, CommandError> {
    if let Ok(handle) = Handle::try_current() {
        return Ok(handle);
    }

    FALLBACK_RUNTIME
        .get_or_init(|| {
            Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name(FALLBACK_THREAD_NAME)
                .enable_all()
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map(|runtime| runtime.handle().clone())
        .map_err(|reason| CommandError::Handler {
            source: reason.clone().into(),
        })
}

fn report(command: &str, result: &CommandResult, started: Instant) {
    match result {
        Ok(value) => CommandExecutionCompleted {
            command,
            produced_value: value.is_some(),
            duration: started.elapsed(),
        }
        .log(),
        Err(error) => CommandExecutionFailed { command, error }.log(),
    }
}
