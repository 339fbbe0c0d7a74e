// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use metalman::config::{load_commands, parse_commands, CommandDefinitions};
use metalman::middlewares::{action, schema};
use metalman::{Command, CommandSet, Middleware, Raised};

const BUILTIN_DEFINITIONS: &str = include_str!("../demos/commands.yaml");

/// Greets `name` on behalf of the service named in the shared context.
fn greet_action() -> Middleware {
    Middleware::sync(|ctx, input| {
        let name = input["name"].as_str().unwrap_or_default();
        let punctuation = input["punctuation"].as_str().unwrap_or_default();
        let service = ctx.get("service").and_then(Value::as_str).unwrap_or("unknown");
        Ok(Some(json!(format!("Hello, {}{} (from {})", name, punctuation, service))))
    })
}

/// Sums `items` on another thread and reports back through the completion.
fn total_action() -> Middleware {
    Middleware::callback(|_ctx, input, done| {
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            let Some(items) = input["items"].as_array() else {
                done.fail(Raised::value("items must be an array"));
                return;
            };
            let sum: f64 = items.iter().filter_map(Value::as_f64).sum();
            done.ok(json!({ "total": sum, "count": items.len() }));
        });
    })
}

fn definitions(path: Option<&String>) -> Result<CommandDefinitions> {
    let definitions = match path {
        Some(path) => load_commands(path)?,
        None => parse_commands(BUILTIN_DEFINITIONS).context("parsing built-in definitions")?,
    };
    Ok(definitions
        .with_action("greet", greet_action())
        .with_action("total", total_action()))
}

async fn run_both_modes(name: &str, command: &Command, input: &Value) {
    println!("▶ {} {}", name, input);

    match command.call(input.clone()).await {
        Ok(value) => println!("  awaited:  {}", describe(value)),
        Err(error) => println!("  awaited:  error: {}", error),
    }

    let (sender, receiver) = tokio::sync::oneshot::channel();
    command.call_with(input.clone(), move |result| {
        let _ = sender.send(result);
    });
    match receiver.await {
        Ok(Ok(value)) => println!("  callback: {}", describe(value)),
        Ok(Err(error)) => println!("  callback: error: {}", error),
        Err(_) => println!("  callback: never delivered"),
    }
}

fn describe(value: Option<Value>) -> String {
    value.map_or_else(|| "<no value>".to_string(), |v| v.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("metalman=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 4 {
        eprintln!("Usage: {} [commands.yaml] [command] [json input]", args[0]);
        std::process::exit(1);
    }

    let commands: CommandSet = definitions(args.get(1))?.compile(vec![schema(), action()])?;

    if let Some(name) = args.get(2) {
        let command = commands
            .get(name)
            .ok_or_else(|| anyhow!("no command named '{}'", name))?;
        let input: Value = match args.get(3) {
            Some(raw) => serde_json::from_str(raw).context("input must be JSON")?,
            None => Value::Null,
        };
        run_both_modes(name, command, &input).await;
        return Ok(());
    }

    println!("metalman demo: {} commands", commands.len());
    let samples = [
        ("greet", json!({ "name": "Ada" })),
        ("greet", json!({ "name": "" })),
        ("total", json!({ "items": [1.5, 2, 3] })),
        ("total", json!({ "items": [1, -2] })),
    ];
    for (name, input) in samples {
        if let Some(command) = commands.get(name) {
            run_both_modes(name, command, &input).await;
        }
    }

    Ok(())
}
