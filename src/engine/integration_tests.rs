// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::config::{CommandConfig, Registry, RegistryOptions};
use crate::engine::{Command, Middleware, MiddlewareFactory};
use crate::errors::{CommandError, CommandResult, Raised};
use crate::middlewares::{action, schema};

/// End-to-end tests running compiled commands in both invocation modes
#[cfg(test)]
mod tests {
    use super::*;

    /// Compile a command whose chain is exactly `handlers`, in order.
    fn chain(handlers: Vec<Middleware>) -> Command {
        chain_with(RegistryOptions::default(), handlers)
    }

    fn chain_with(options: RegistryOptions, handlers: Vec<Middleware>) -> Command {
        let factories = handlers
            .into_iter()
            .enumerate()
            .map(|(index, handler)| {
                MiddlewareFactory::new(format!("h{}", index + 1), move |_, _| Ok(Some(handler.clone())))
            })
            .collect();

        Registry::new(RegistryOptions { middlewares: factories, ..options })
            .command(CommandConfig::new())
            .unwrap()
    }

    /// Invoke in callback mode and wait for the single delivery.
    async fn call_back(command: &Command, input: Value) -> CommandResult {
        let (sender, receiver) = tokio::sync::oneshot::channel();
        command.call_with(input, move |result| {
            let _ = sender.send(result);
        });
        receiver.await.expect("done was called")
    }

    fn text(value: &Value) -> &str {
        value.as_str().unwrap_or_default()
    }

    fn outcome(result: CommandResult) -> Result<Option<Value>, String> {
        result.map_err(|e| e.to_string())
    }

    #[tokio::test]
    async fn test_empty_chain_yields_no_value() {
        let command = chain(vec![]);

        assert_eq!(command.call("Input").await.unwrap(), None);
        assert_eq!(call_back(&command, json!("Input")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_handlers_returning_nothing_retain_the_input() {
        let command = chain(vec![
            Middleware::sync(|_, _| Ok(None)),
            Middleware::future(|_, _| async move {
                tokio::task::yield_now().await;
                Ok(None)
            }),
            Middleware::callback(|_, _, done| done.unchanged()),
        ]);

        let input = json!({"id": 7, "tags": ["a", "b"]});
        assert_eq!(command.call(input.clone()).await.unwrap(), Some(input.clone()));
        assert_eq!(call_back(&command, input.clone()).await.unwrap(), Some(input));
    }

    #[tokio::test]
    async fn test_failure_stops_later_handlers() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);

        let command = chain(vec![
            Middleware::sync(|_, value| Ok(Some(json!(format!("seen {}", text(&value)))))),
            Middleware::future(|_, _| async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                Err(Raised::value(json!({"message": "card declined", "code": 402})))
            }),
            Middleware::sync(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }),
        ]);

        let error = command.call("charge").await.unwrap_err();
        assert_eq!(error.to_string(), "card declined");
        assert!(matches!(&error, CommandError::Raised(value) if value["code"] == json!(402)));

        let error = call_back(&command, json!("charge")).await.unwrap_err();
        assert_eq!(error.to_string(), "card declined");

        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_callback_mode_delivers_exactly_once() {
        let sync_chain = chain(vec![Middleware::callback(|_, value, done| done.ok(value))]);
        let async_chain = chain(vec![Middleware::callback(|_, value, done| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                done.ok(value);
            });
        })]);

        for command in [sync_chain, async_chain] {
            let deliveries = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&deliveries);
            let (sender, receiver) = tokio::sync::oneshot::channel();

            command.call_with("once", move |result| {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = sender.send(result);
            });

            assert_eq!(receiver.await.unwrap().unwrap(), Some(json!("once")));
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(deliveries.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_synchronous_chain_delivers_before_call_with_returns() {
        let command = chain(vec![Middleware::sync(|_, _| Ok(Some(json!("now"))))]);
        let delivered = Arc::new(std::sync::Mutex::new(None));
        let slot = Arc::clone(&delivered);

        command.call_with(json!(null), move |result| {
            *slot.lock().unwrap() = Some(outcome(result));
        });

        assert_eq!(*delivered.lock().unwrap(), Some(Ok(Some(json!("now")))));
    }

    #[test]
    fn test_callback_mode_without_runtime() {
        let command = chain(vec![Middleware::callback(|_, value, done| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                done.ok(json!(format!("{} later", text(&value))));
            });
        })]);

        let (sender, receiver) = mpsc::channel();
        command.call_with("settled", move |result| {
            let _ = sender.send(outcome(result));
        });

        let delivered = receiver.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(delivered, Ok(Some(json!("settled later"))));
    }

    #[test]
    fn test_callback_mode_without_runtime_supports_tokio_timers() {
        let command = chain(vec![
            Middleware::future(|_, value| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(Some(json!([value, "slept"])))
            }),
            Middleware::future(|_, value| async move {
                tokio::task::yield_now().await;
                Ok(Some(json!({"steps": value})))
            }),
        ]);

        let (sender, receiver) = mpsc::channel();
        command.call_with("nap", move |result| {
            let _ = sender.send(outcome(result));
        });

        let delivered = receiver.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(delivered, Ok(Some(json!({"steps": ["nap", "slept"]}))));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_handlers_run_inside_command_call_span() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        fn current_span() -> Value {
            json!(tracing::Span::current().metadata().map(|meta| meta.name()))
        }

        let command = chain(vec![
            Middleware::sync(|_, _| Ok(Some(current_span()))),
            Middleware::future(|_, value| async move {
                tokio::task::yield_now().await;
                Ok(Some(json!([value, current_span()])))
            }),
        ]);

        assert_eq!(
            command.call(1).await.unwrap(),
            Some(json!(["command_call", "command_call"]))
        );
    }

    #[tokio::test]
    async fn test_callback_and_returning_forms_agree() {
        fn decide(value: &Value) -> Result<Value, Raised> {
            match value.as_i64() {
                Some(n) if n >= 0 => Ok(json!(n * 2)),
                Some(_) => Err(Raised::value("negative input")),
                None => Err(Raised::value(json!({"message": "not a number", "input": value}))),
            }
        }

        let callback_form = chain(vec![Middleware::callback(|_, value, done| {
            done.complete(decide(&value).map(Some))
        })]);
        let returning_form = chain(vec![Middleware::sync(|_, value| decide(&value).map(Some))]);

        for input in [json!(21), json!(-1), json!("x")] {
            let from_callback = outcome(callback_form.call(input.clone()).await);
            let from_return = outcome(returning_form.call(input.clone()).await);
            assert_eq!(from_callback, from_return, "input {}", input);

            let from_callback = outcome(call_back(&callback_form, input.clone()).await);
            let from_return = outcome(call_back(&returning_form, input.clone()).await);
            assert_eq!(from_callback, from_return, "input {}", input);
        }
    }

    #[tokio::test]
    async fn test_callback_result_feeds_next_handler() {
        let command = chain(vec![
            Middleware::callback(|_, cmd, done| done.ok(format!("value with {}", text(&cmd)))),
            Middleware::sync(|_, cmd| Ok(Some(json!(format!("retained {}", text(&cmd)))))),
        ]);

        assert_eq!(
            command.call("Input").await.unwrap(),
            Some(json!("retained value with Input"))
        );
        assert_eq!(
            call_back(&command, json!("Input")).await.unwrap(),
            Some(json!("retained value with Input"))
        );
    }

    #[tokio::test]
    async fn test_raised_primitive_is_wrapped_with_backtrace() {
        let command = chain(vec![Middleware::sync(|_, _| Err(Raised::value("something")))]);

        let error = command.call("Input").await.unwrap_err();
        assert_eq!(error.to_string(), "something");
        match &error {
            CommandError::Wrapped(wrapped) => assert_eq!(wrapped.message(), "something"),
            other => panic!("expected a wrapped error, got {:?}", other),
        }
        assert!(error.backtrace().is_some());

        let error = call_back(&command, json!("Input")).await.unwrap_err();
        assert_eq!(error.to_string(), "something");
    }

    #[tokio::test]
    async fn test_panicking_handler_is_reported_as_error() {
        let command = chain(vec![Middleware::callback(|_, _, _done| panic!("handler exploded"))]);

        let error = command.call(1).await.unwrap_err();
        assert_eq!(error.to_string(), "handler exploded");
        assert!(error.backtrace().is_some());
    }

    #[tokio::test]
    async fn test_first_settlement_wins_over_later_panic() {
        let command = chain(vec![Middleware::callback(|_, value, done| {
            done.ok(value);
            panic!("after completing");
        })]);

        assert_eq!(command.call("kept").await.unwrap(), Some(json!("kept")));
    }

    #[tokio::test]
    async fn test_dropped_completion_fails_the_call() {
        let now = chain(vec![Middleware::callback(|_, _, done| drop(done))]);
        let later = chain(vec![Middleware::callback(|_, _, done| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                drop(done);
            });
        })]);

        for command in [now, later] {
            match command.call(1).await {
                Err(CommandError::CompletionDropped { handler }) => assert_eq!(handler, "h1.handler"),
                other => panic!("expected CompletionDropped, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_schema_then_action() {
        let registry = Registry::from(vec![schema(), action()]);
        let command = registry
            .command(
                CommandConfig::new()
                    .with_schema(json!({"type": "string"}))
                    .with_action(Middleware::sync(|_, _| Ok(None))),
            )
            .unwrap();

        let error = command.call(42).await.unwrap_err();
        let validation = error.as_validation().expect("validation error");
        assert_eq!(validation.violations.len(), 1);
        assert_eq!(validation.violations[0].keyword, "type");
        assert_eq!(validation.violations[0].params, json!({"type": "string"}));

        assert_eq!(command.call("ok").await.unwrap(), Some(json!("ok")));
    }

    #[tokio::test]
    async fn test_shared_context_is_visible_to_every_handler() {
        let mut context = Map::new();
        context.insert("tenant".to_string(), json!("acme"));
        let options = RegistryOptions::default().with_context(context);

        let command = chain_with(
            options,
            vec![
                Middleware::sync(|ctx, _| Ok(Some(ctx.get("tenant").cloned().unwrap_or_default()))),
                Middleware::future(|ctx, value| async move {
                    Ok(Some(json!([value, ctx.contains_key("tenant")])))
                }),
            ],
        );

        let calls = (0..4).map(|n| command.call(n));
        for result in futures::future::join_all(calls).await {
            assert_eq!(result.unwrap(), Some(json!(["acme", true])));
        }
        assert_eq!(command.context().get("tenant"), Some(&json!("acme")));
    }

    #[tokio::test]
    async fn test_registry_defaults_reach_factories() {
        let retries = MiddlewareFactory::new("retries", |config, _| {
            let retries = config.option("retries").cloned().unwrap_or(Value::Null);
            Ok(Some(Middleware::sync(move |_, _| Ok(Some(retries.clone())))))
        });
        let options = RegistryOptions::new(vec![retries])
            .with_defaults(CommandConfig::new().with_option("retries", 3));
        let registry = Registry::new(options);

        let inherited = registry.command(CommandConfig::new()).unwrap();
        let overridden = registry
            .command(CommandConfig::new().with_option("retries", 5))
            .unwrap();

        assert_eq!(inherited.call(json!(null)).await.unwrap(), Some(json!(3)));
        assert_eq!(overridden.call(json!(null)).await.unwrap(), Some(json!(5)));
    }
}
