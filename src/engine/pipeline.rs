// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequential executor for one compiled command.
//!
//! The executor threads a working value through the middlewares in order:
//!
//! * `Ok(Some(value))` from a handler replaces the working value;
//! * `Ok(None)` retains it;
//! * the first `Err` aborts the chain and later handlers never run.
//!
//! Steps that settle on the spot are consumed inline. Only when a step is
//! actually pending does the run turn into a boxed future, which awaits it
//! and carries on with the rest of the chain. A chain where every handler
//! completes synchronously therefore finishes without ever yielding.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::sync::Arc;

use crate::engine::middleware::{settle, Middleware, Step};
use crate::engine::ExecutionContext;
use crate::errors::CommandResult;
use crate::observability::messages::{command::*, StructuredLog};

/// How far [`Pipeline::start`] got without waiting.
pub(crate) enum Progress {
    Complete(CommandResult),
    Suspended(BoxFuture<'static, CommandResult>),
}

pub struct Pipeline {
    command: Arc<str>,
    middlewares: Vec<Middleware>,
    context: ExecutionContext,
}

impl Pipeline {
    pub fn new(command: Arc<str>, middlewares: Vec<Middleware>, context: ExecutionContext) -> Self {
        Self {
            command,
            middlewares,
            context,
        }
    }

    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Run the chain until it finishes or a step has to be waited on.
    ///
    /// An empty chain produces no value; otherwise the result is the final
    /// working value.
    pub(crate) fn start(self: &Arc<Self>, input: Value) -> Progress {
        if self.middlewares.is_empty() {
            return Progress::Complete(Ok(None));
        }

        let mut value = input;
        for (index, middleware) in self.middlewares.iter().enumerate() {
            match middleware.invoke(&self.context, value.clone()) {
                Step::Ready(Ok(Some(next))) => value = next,
                Step::Ready(Ok(None)) => {}
                Step::Ready(Err(error)) => return Progress::Complete(Err(error)),
                Step::Pending(pending) => {
                    CommandSuspended {
                        command: &self.command,
                        handler: middleware.name(),
                        index,
                    }
                    .log();
                    let pipeline = Arc::clone(self);
                    return Progress::Suspended(pipeline.resume(index, pending, value).boxed());
                }
            }
        }

        Progress::Complete(Ok(Some(value)))
    }

    async fn resume(
        self: Arc<Self>,
        index: usize,
        pending: BoxFuture<'static, CommandResult>,
        mut value: Value,
    ) -> CommandResult {
        if let Some(next) = settle(pending).await? {
            value = next;
        }

        for middleware in &self.middlewares[index + 1..] {
            let settled = match middleware.invoke(&self.context, value.clone()) {
                Step::Ready(result) => result?,
                Step::Pending(pending) => settle(pending).await?,
            };
            if let Some(next) = settled {
                value = next;
            }
        }

        Ok(Some(value))
    }

    /// Run the whole chain.
    pub async fn run(self: &Arc<Self>, input: Value) -> CommandResult {
        match self.start(input) {
            Progress::Complete(result) => result,
            Progress::Suspended(future) => future.await,
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("command", &self.command)
            .field("middlewares", &self.middlewares)
            .finish()
    }
}
