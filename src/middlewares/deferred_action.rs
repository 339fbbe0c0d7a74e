// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::engine::{Middleware, MiddlewareFactory};
use crate::errors::Raised;

pub const DEFERRED_ACTION_FACTORY: &str = "deferred_action";

/// Runs `config.action` and then yields to the scheduler once before
/// settling, so the command never completes on the caller's stack.
/// Commands without an action opt out.
pub fn deferred_action() -> MiddlewareFactory {
    MiddlewareFactory::new(DEFERRED_ACTION_FACTORY, |config, _options| {
        let Some(action) = config.action.clone() else {
            return Ok(None);
        };
        let action = Arc::new(action);

        Ok(Some(Middleware::future(move |ctx, value| {
            let action = Arc::clone(&action);
            async move {
                let result = action.run(&ctx, value).await;
                tokio::task::yield_now().await;
                result.map_err(Raised::from)
            }
        })))
    })
}
