// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::MiddlewareFactory;

pub const ACTION_FACTORY: &str = "action";

/// Exposes `config.action` as a handler of the chain. Commands without an
/// action opt out.
pub fn action() -> MiddlewareFactory {
    MiddlewareFactory::new(ACTION_FACTORY, |config, _options| Ok(config.action.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandConfig, RegistryOptions};
    use crate::engine::Middleware;

    #[test]
    fn test_action_opts_out_without_action() {
        let middleware = action()
            .instantiate(&CommandConfig::new(), &RegistryOptions::default(), 0)
            .unwrap();
        assert!(middleware.is_none());
    }

    #[test]
    fn test_action_is_named_after_factory() {
        let config = CommandConfig::new().with_action(Middleware::sync(|_, _| Ok(None)));
        let middleware = action()
            .instantiate(&config, &RegistryOptions::default(), 0)
            .unwrap()
            .expect("action middleware");
        assert_eq!(middleware.name(), "action.handler");
    }
}
