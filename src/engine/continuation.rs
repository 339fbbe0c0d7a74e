// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Adapter for continuation-passing handlers.
//!
//! A [`CallbackHandler`] receives the working value and a [`Completion`]. The
//! adapter decides after the handler returns which way the call went:
//!
//! * the completion already fired: its result is returned as a ready step,
//!   with no channel allocated and no scheduling round-trip;
//! * it has not fired yet: a oneshot channel is parked in the shared slot and
//!   the step becomes a future on the receiving end.
//!
//! ```text
//! Pending ──complete()──▶ Settled ──adapter returns──▶ Delivered (ready step)
//!    │
//!    └──adapter returns──▶ Awaiting(tx) ──complete()──▶ Delivered (pending step)
//! ```
//!
//! `Completion::complete` consumes the completion, and every transition out
//! of `Pending`/`Awaiting` lands in a terminal state, so an outcome is
//! delivered at most once.

use futures::FutureExt;
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::engine::middleware::Step;
use crate::engine::normalize::normalize;
use crate::engine::ExecutionContext;
use crate::errors::{CommandError, CommandResult, Raised};
use crate::observability::messages::{middleware::*, StructuredLog};
use crate::traits::{CallbackHandler, HandlerResult};

enum Slot {
    Pending,
    Settled(CommandResult),
    Awaiting(oneshot::Sender<CommandResult>),
    Delivered,
}

type SharedSlot = Arc<Mutex<Slot>>;

fn lock(slot: &SharedSlot) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Completion callback handed to a [`CallbackHandler`].
///
/// Call exactly one of the completing methods, now or later. Dropping it
/// without doing so fails the command with
/// [`CommandError::CompletionDropped`].
pub struct Completion {
    slot: SharedSlot,
    handler: Arc<str>,
}

impl Completion {
    fn new(slot: SharedSlot, handler: Arc<str>) -> Self {
        Self { slot, handler }
    }

    /// Settle with a handler result.
    pub fn complete(self, result: HandlerResult) {
        self.settle(result.map_err(normalize));
    }

    /// Settle successfully, replacing the working value.
    pub fn ok(self, value: impl Into<Value>) {
        self.settle(Ok(Some(value.into())));
    }

    /// Settle successfully, leaving the working value unchanged.
    pub fn unchanged(self) {
        self.settle(Ok(None));
    }

    /// Settle with a failure.
    pub fn fail(self, raised: impl Into<Raised>) {
        self.settle(Err(normalize(raised.into())));
    }

    fn settle(self, result: CommandResult) {
        let mut slot = lock(&self.slot);
        match std::mem::replace(&mut *slot, Slot::Delivered) {
            Slot::Pending => *slot = Slot::Settled(result),
            Slot::Awaiting(sender) => {
                // The receiver is gone only when the call itself was dropped.
                let _ = sender.send(result);
            }
            Slot::Settled(_) | Slot::Delivered => {
                LateCompletionIgnored {
                    handler: &self.handler,
                }
                .log();
            }
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("handler", &self.handler)
            .finish()
    }
}

/// Run a callback handler once and report how it settled.
pub(crate) fn adapt(
    handler: &dyn CallbackHandler,
    name: &Arc<str>,
    ctx: &ExecutionContext,
    value: Value,
) -> Step {
    let slot: SharedSlot = Arc::new(Mutex::new(Slot::Pending));
    let done = Completion::new(Arc::clone(&slot), Arc::clone(name));

    let outcome = catch_unwind(AssertUnwindSafe(|| handler.handle(ctx, value, done)));

    let mut guard = lock(&slot);
    if let Slot::Settled(result) = std::mem::replace(&mut *guard, Slot::Delivered) {
        return Step::Ready(result);
    }

    if let Err(payload) = outcome {
        return Step::Ready(Err(normalize(Raised::panic(payload))));
    }

    // Nobody else holds the slot: the completion was dropped unfired.
    if Arc::strong_count(&slot) == 1 {
        return Step::Ready(Err(dropped(name)));
    }

    let (sender, receiver) = oneshot::channel();
    *guard = Slot::Awaiting(sender);
    drop(guard);

    let name = Arc::clone(name);
    Step::Pending(
        async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(dropped(&name)))
        }
        .boxed(),
    )
}

fn dropped(handler: &str) -> CommandError {
    CommandError::CompletionDropped {
        handler: handler.to_string(),
    }
}
