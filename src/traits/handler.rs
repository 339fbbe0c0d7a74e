// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::{Completion, ExecutionContext};
use crate::errors::Raised;

/// What a handler settles with. `Ok(None)` leaves the working value unchanged.
pub type HandlerResult = Result<Option<Value>, Raised>;

/// A handler that finishes before returning.
pub trait SyncHandler: Send + Sync {
    fn handle(&self, ctx: &ExecutionContext, value: Value) -> HandlerResult;
}

/// A handler that settles through a future.
#[async_trait]
pub trait AsyncHandler: Send + Sync {
    async fn handle(&self, ctx: ExecutionContext, value: Value) -> HandlerResult;
}

/// A continuation-passing handler. It reports its outcome through `done`,
/// either before returning or later from anywhere (another task, another
/// thread). Dropping `done` without completing it fails the call.
pub trait CallbackHandler: Send + Sync {
    fn handle(&self, ctx: &ExecutionContext, value: Value, done: Completion);
}
