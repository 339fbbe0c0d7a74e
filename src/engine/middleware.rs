// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Middlewares, their factories, and the normalization that turns every
//! handler shape into a single [`Step`].

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::task::noop_waker_ref;
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::config::consts::{ANONYMOUS_MIDDLEWARE, HANDLER_SUFFIX};
use crate::config::{CommandConfig, RegistryOptions};
use crate::engine::continuation::{adapt, Completion};
use crate::engine::normalize::normalize;
use crate::engine::ExecutionContext;
use crate::errors::{BoxError, CommandResult, ConstructionError, Raised};
use crate::observability::messages::{middleware::*, StructuredLog};
use crate::traits::{AsyncHandler, CallbackHandler, HandlerResult, SyncHandler};

/// Calling convention of a handler, declared up front.
#[derive(Clone)]
pub enum Handler {
    Sync(Arc<dyn SyncHandler>),
    Async(Arc<dyn AsyncHandler>),
    Callback(Arc<dyn CallbackHandler>),
}

impl Handler {
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Sync(_) => "sync",
            Handler::Async(_) => "async",
            Handler::Callback(_) => "callback",
        }
    }
}

/// Outcome of invoking one handler: settled already, or settling later.
pub(crate) enum Step {
    Ready(CommandResult),
    Pending(BoxFuture<'static, CommandResult>),
}

/// One step of a command's chain.
#[derive(Clone)]
pub struct Middleware {
    name: Option<Arc<str>>,
    handler: Handler,
}

impl Middleware {
    pub fn new(handler: Handler) -> Self {
        Self { name: None, handler }
    }

    /// A handler that returns its outcome directly.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&ExecutionContext, Value) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(Handler::Sync(Arc::new(FnHandler(f))))
    }

    /// A handler that settles through a future.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(ExecutionContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::new(Handler::Async(Arc::new(FnHandler(f))))
    }

    /// A continuation-passing handler.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&ExecutionContext, Value, Completion) + Send + Sync + 'static,
    {
        Self::new(Handler::Callback(Arc::new(FnHandler(f))))
    }

    pub fn from_sync(handler: impl SyncHandler + 'static) -> Self {
        Self::new(Handler::Sync(Arc::new(handler)))
    }

    pub fn from_async(handler: impl AsyncHandler + 'static) -> Self {
        Self::new(Handler::Async(Arc::new(handler)))
    }

    pub fn from_callback(handler: impl CallbackHandler + 'static) -> Self {
        Self::new(Handler::Callback(Arc::new(handler)))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Arc::from(name.into()));
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS_MIDDLEWARE)
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn kind(&self) -> &'static str {
        self.handler.kind()
    }

    /// Run the handler on `value`. Handlers that settle on the spot, including
    /// futures that are ready on their first poll, yield [`Step::Ready`].
    ///
    /// That first poll does not run under the calling task's waker. Pending
    /// steps must be awaited through [`settle`].
    pub(crate) fn invoke(&self, ctx: &ExecutionContext, value: Value) -> Step {
        match &self.handler {
            Handler::Sync(handler) => {
                match catch_unwind(AssertUnwindSafe(|| handler.handle(ctx, value))) {
                    Ok(result) => Step::Ready(result.map_err(normalize)),
                    Err(payload) => Step::Ready(Err(normalize(Raised::panic(payload)))),
                }
            }
            Handler::Async(handler) => {
                let handler = Arc::clone(handler);
                let ctx = ctx.clone();
                let mut future = async move {
                    match AssertUnwindSafe(handler.handle(ctx, value)).catch_unwind().await {
                        Ok(result) => result.map_err(normalize),
                        Err(payload) => Err(normalize(Raised::panic(payload))),
                    }
                }
                .boxed();

                let mut cx = Context::from_waker(noop_waker_ref());
                match future.as_mut().poll(&mut cx) {
                    Poll::Ready(result) => Step::Ready(result),
                    Poll::Pending => Step::Pending(future),
                }
            }
            Handler::Callback(handler) => {
                let name = self
                    .name
                    .clone()
                    .unwrap_or_else(|| Arc::from(ANONYMOUS_MIDDLEWARE));
                adapt(handler.as_ref(), &name, ctx, value)
            }
        }
    }

    /// Run the handler to completion.
    pub async fn run(&self, ctx: &ExecutionContext, value: Value) -> CommandResult {
        match self.invoke(ctx, value) {
            Step::Ready(result) => result,
            Step::Pending(future) => settle(future).await,
        }
    }
}

/// Await a step that was pending after its first poll.
///
/// The first poll of an async handler runs under a no-op waker, so any wake
/// it scheduled for itself is lost. Yielding once under the task's own waker
/// gives the scheduler the turn the handler asked for.
pub(crate) async fn settle(pending: BoxFuture<'static, CommandResult>) -> CommandResult {
    tokio::task::yield_now().await;
    pending.await
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Closure adapter for the three handler traits.
pub(crate) struct FnHandler<F>(pub(crate) F);

impl<F> SyncHandler for FnHandler<F>
where
    F: Fn(&ExecutionContext, Value) -> HandlerResult + Send + Sync,
{
    fn handle(&self, ctx: &ExecutionContext, value: Value) -> HandlerResult {
        (self.0)(ctx, value)
    }
}

#[async_trait]
impl<F, Fut> AsyncHandler for FnHandler<F>
where
    F: Fn(ExecutionContext, Value) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, ctx: ExecutionContext, value: Value) -> HandlerResult {
        (self.0)(ctx, value).await
    }
}

impl<F> CallbackHandler for FnHandler<F>
where
    F: Fn(&ExecutionContext, Value, Completion) + Send + Sync,
{
    fn handle(&self, ctx: &ExecutionContext, value: Value, done: Completion) {
        (self.0)(ctx, value, done)
    }
}

type BuildFn =
    dyn Fn(&CommandConfig, &RegistryOptions) -> Result<Option<Middleware>, BoxError> + Send + Sync;

/// Produces a command's middleware from its configuration, or opts out by
/// returning `Ok(None)`. Called once per command compilation.
#[derive(Clone)]
pub struct MiddlewareFactory {
    name: Option<Arc<str>>,
    build: Arc<BuildFn>,
}

impl MiddlewareFactory {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&CommandConfig, &RegistryOptions) -> Result<Option<Middleware>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: Some(Arc::from(name.into())),
            build: Arc::new(build),
        }
    }

    pub fn anonymous<F>(build: F) -> Self
    where
        F: Fn(&CommandConfig, &RegistryOptions) -> Result<Option<Middleware>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: None,
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS_MIDDLEWARE)
    }

    /// Instantiate this factory's middleware for one command.
    ///
    /// A middleware without a name of its own is named `<factory>.handler`.
    pub fn instantiate(
        &self,
        config: &CommandConfig,
        options: &RegistryOptions,
        index: usize,
    ) -> Result<Option<Middleware>, ConstructionError> {
        let built = (self.build)(config, options).map_err(|error| {
            let error = ConstructionError::Factory {
                index,
                name: self.name().to_string(),
                reason: error.to_string(),
            };
            MiddlewareFactoryFailed {
                factory: self.name(),
                index,
                error: &error,
            }
            .log();
            error
        })?;

        let Some(mut middleware) = built else {
            MiddlewareSkipped {
                factory: self.name(),
                index,
            }
            .log();
            return Ok(None);
        };

        if middleware.name.is_none() {
            middleware = middleware.named(format!("{}.{}", self.name(), HANDLER_SUFFIX));
        }

        MiddlewareInstantiated {
            factory: self.name(),
            handler: middleware.name(),
            kind: middleware.kind(),
            index,
        }
        .log();

        Ok(Some(middleware))
    }
}

impl fmt::Debug for MiddlewareFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFactory")
            .field("name", &self.name())
            .finish()
    }
}
