// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turns whatever a handler failed with into a [`CommandError`].

use serde_json::Value;
use std::any::Any;

use crate::config::consts::NO_STRING_REPRESENTATION;
use crate::errors::{BoxError, CommandError, ConstructionError, Raised, ValidationError, WrappedError};

/// Normalize a raised value.
///
/// Error-shaped values come back unchanged: a boxed `CommandError`,
/// `ValidationError` or `ConstructionError` is unboxed, any other error is kept as the source of
/// `CommandError::Handler`, and JSON objects or arrays are kept as-is.
/// Primitives and panic payloads become a [`WrappedError`] whose backtrace
/// points here.
pub fn normalize(raised: Raised) -> CommandError {
    match raised {
        Raised::Error(error) => unbox(error),
        Raised::Value(value @ (Value::Object(_) | Value::Array(_))) => CommandError::Raised(value),
        Raised::Value(value) => CommandError::Wrapped(WrappedError::new(value_to_string(&value))),
        Raised::Panic(payload) => CommandError::Wrapped(WrappedError::new(panic_message(payload.as_ref()))),
    }
}

fn unbox(error: BoxError) -> CommandError {
    let error = match error.downcast::<CommandError>() {
        Ok(command_error) => return *command_error,
        Err(other) => other,
    };
    let error = match error.downcast::<ValidationError>() {
        Ok(validation) => return CommandError::Validation(*validation),
        Err(other) => other,
    };
    match error.downcast::<ConstructionError>() {
        Ok(construction) => CommandError::Construction(*construction),
        Err(source) => CommandError::Handler { source },
    }
}

/// String form of a primitive; strings are not quoted.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        NO_STRING_REPRESENTATION.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Violation;
    use serde_json::json;
    use std::io;

    #[test]
    fn test_primitive_string_becomes_wrapped_error() {
        let error = normalize(Raised::value("something"));
        assert_eq!(error.to_string(), "something");
        assert!(matches!(error, CommandError::Wrapped(_)));
        assert!(error.backtrace().is_some());
    }

    #[test]
    fn test_primitive_number_and_null() {
        assert_eq!(normalize(Raised::value(42)).to_string(), "42");
        assert_eq!(normalize(Raised::Value(Value::Null)).to_string(), "null");
        assert_eq!(normalize(Raised::value(false)).to_string(), "false");
    }

    #[test]
    fn test_structured_values_stay_untouched() {
        let object = json!({"message": "nope", "status": 409});
        match normalize(Raised::Value(object.clone())) {
            CommandError::Raised(value) => assert_eq!(value, object),
            other => panic!("expected raised object, got {:?}", other),
        }

        let array = json!(["a", "b"]);
        assert!(matches!(normalize(Raised::Value(array)), CommandError::Raised(_)));
    }

    #[test]
    fn test_error_values_keep_their_type() {
        let error = normalize(io::Error::new(io::ErrorKind::NotFound, "missing").into());
        assert_eq!(error.to_string(), "missing");
        let source = error.downcast_ref::<io::Error>().expect("io error source");
        assert_eq!(source.kind(), io::ErrorKind::NotFound);
        assert!(error.backtrace().is_none());
    }

    #[test]
    fn test_command_errors_are_unboxed() {
        let original = CommandError::CompletionDropped {
            handler: "h".to_string(),
        };
        let error = normalize(original.into());
        assert!(matches!(error, CommandError::CompletionDropped { ref handler } if handler == "h"));

        let validation = ValidationError::new(vec![Violation {
            keyword: "type".to_string(),
            message: "should be string".to_string(),
            params: json!({"type": "string"}),
            data_path: String::new(),
        }]);
        let error = normalize(validation.clone().into());
        assert_eq!(error.as_validation(), Some(&validation));
    }

    #[test]
    fn test_construction_errors_are_unboxed() {
        let load = ConstructionError::Load {
            path: "commands.yaml".to_string(),
            reason: "missing".to_string(),
        };
        match normalize(load.clone().into()) {
            CommandError::Construction(error) => assert_eq!(error, load),
            other => panic!("expected a construction error, got {:?}", other),
        }
    }

    #[test]
    fn test_boxed_errors_normalize_like_plain_ones() {
        let boxed: BoxError = Box::new(io::Error::new(io::ErrorKind::Other, "boxed failure"));
        let error = normalize(Raised::boxed(boxed));
        assert_eq!(error.to_string(), "boxed failure");
        assert!(error.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn test_panic_payloads() {
        let error = normalize(Raised::panic(Box::new("static message")));
        assert_eq!(error.to_string(), "static message");

        let error = normalize(Raised::panic(Box::new(String::from("owned message"))));
        assert_eq!(error.to_string(), "owned message");

        let error = normalize(Raised::panic(Box::new(17_u8)));
        assert_eq!(error.to_string(), NO_STRING_REPRESENTATION);
    }
}
