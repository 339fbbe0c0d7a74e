// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

use crate::engine::{ExecutionContext, Middleware, MiddlewareFactory};
use crate::errors::ValidationError;
use crate::middlewares::json_schema::CompiledSchema;
use crate::observability::messages::{validation::*, StructuredLog};
use crate::traits::{HandlerResult, SyncHandler};

pub const SCHEMA_FACTORY: &str = "schema";

/// Validates the input against `config.schema`, compiled once per command.
///
/// Commands without a schema (or with `schema: null`) opt out. A schema that
/// does not compile fails command construction.
pub fn schema() -> MiddlewareFactory {
    MiddlewareFactory::new(SCHEMA_FACTORY, |config, _options| {
        let source = match &config.schema {
            None | Some(Value::Null) => return Ok(None),
            Some(source) => source,
        };

        let compiled = CompiledSchema::compile(source)?;
        Ok(Some(Middleware::from_sync(SchemaValidator::new(compiled))))
    })
}

/// Rejects inputs the schema does not accept. Passes valid input through
/// unchanged unless defaults were filled in.
#[derive(Debug)]
pub struct SchemaValidator {
    schema: CompiledSchema,
}

impl SchemaValidator {
    pub fn new(schema: CompiledSchema) -> Self {
        Self { schema }
    }
}

impl SyncHandler for SchemaValidator {
    fn handle(&self, _ctx: &ExecutionContext, mut value: Value) -> HandlerResult {
        let outcome = self.schema.validate(&mut value);

        if !outcome.is_valid() {
            let error = ValidationError::new(outcome.violations);
            SchemaValidationFailed { error: &error }.log();
            return Err(error.into());
        }

        if outcome.defaults_applied {
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandConfig, Registry, RegistryOptions};
    use crate::errors::{CommandError, ConstructionError};
    use serde_json::json;

    fn instantiate(config: &CommandConfig) -> Result<Option<Middleware>, ConstructionError> {
        schema().instantiate(config, &RegistryOptions::default(), 0)
    }

    #[test]
    fn test_schema_opts_out_without_schema() {
        assert!(instantiate(&CommandConfig::new()).unwrap().is_none());

        let null_schema = CommandConfig::new().with_schema(Value::Null);
        assert!(instantiate(&null_schema).unwrap().is_none());
    }

    #[test]
    fn test_uncompilable_schema_fails_construction() {
        let config = CommandConfig::new().with_schema(json!("string"));
        let error = instantiate(&config).unwrap_err();

        match error {
            ConstructionError::Factory { index, name, reason } => {
                assert_eq!(index, 0);
                assert_eq!(name, "schema");
                assert!(reason.contains("a schema must be an object"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_type_violation_rejects_input() {
        let command = Registry::from(vec![schema()])
            .command(CommandConfig::new().with_schema(json!({"type": "string"})))
            .unwrap();

        let error = command.call(42).await.unwrap_err();
        let validation = error.as_validation().expect("validation error");
        assert_eq!(validation.keywords().collect::<Vec<_>>(), vec!["type"]);
        assert!(matches!(error, CommandError::Validation(_)));

        assert_eq!(command.call("ok").await.unwrap(), Some(json!("ok")));
    }

    #[tokio::test]
    async fn test_defaults_replace_working_value() {
        let config = CommandConfig::new().with_schema(json!({
            "type": "object",
            "properties": {"limit": {"type": "integer", "default": 10}}
        }));
        let command = Registry::from(vec![schema()]).command(config).unwrap();

        assert_eq!(
            command.call(json!({"q": "rust"})).await.unwrap(),
            Some(json!({"q": "rust", "limit": 10}))
        );
    }
}
