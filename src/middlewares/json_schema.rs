// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A compiled JSON-schema subset.
//!
//! Supported keywords: `type`, `enum`, `const`, `properties`, `required`,
//! `additionalProperties`, `items`, `minLength`, `maxLength`, `minimum`,
//! `maximum`, `exclusiveMinimum`, `exclusiveMaximum`, `minItems`, `maxItems`
//! and `default`. Other keywords are accepted and ignored.
//!
//! Boolean schemas are accepted: `true` allows anything, `false` nothing.
//! Missing object properties that declare a `default` are filled in once the
//! object passed its `type` check and before the rest of it is checked. Violations are reported with ajv-style messages and data
//! paths (`.user.tags[0]`).

use serde_json::{json, Map, Number, Value};

use crate::errors::{ConstructionError, Violation};
use crate::observability::messages::{validation::*, StructuredLog};

const ROOT_PATH: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "null" => Some(JsonType::Null),
            "boolean" => Some(JsonType::Boolean),
            "integer" => Some(JsonType::Integer),
            "number" => Some(JsonType::Number),
            "string" => Some(JsonType::String),
            "array" => Some(JsonType::Array),
            "object" => Some(JsonType::Object),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            JsonType::Null => "null",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (JsonType::Null, Value::Null) => true,
            (JsonType::Boolean, Value::Bool(_)) => true,
            (JsonType::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().map_or(false, |f| f.fract() == 0.0)
            }
            (JsonType::Number, Value::Number(_)) => true,
            (JsonType::String, Value::String(_)) => true,
            (JsonType::Array, Value::Array(_)) => true,
            (JsonType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default)]
enum Additional {
    #[default]
    Allowed,
    Forbidden,
    Schema(Box<SchemaNode>),
}

#[derive(Debug, Clone, Default)]
struct SchemaNode {
    /// Compiled from the boolean schema `false`.
    rejects_everything: bool,
    types: Option<Vec<JsonType>>,
    enumeration: Option<Vec<Value>>,
    constant: Option<Value>,
    properties: Vec<(String, SchemaNode)>,
    required: Vec<String>,
    additional: Additional,
    items: Option<Box<SchemaNode>>,
    min_length: Option<u64>,
    max_length: Option<u64>,
    minimum: Option<Number>,
    maximum: Option<Number>,
    exclusive_minimum: Option<Number>,
    exclusive_maximum: Option<Number>,
    min_items: Option<u64>,
    max_items: Option<u64>,
    default: Option<Value>,
}

/// Result of checking one value.
#[derive(Debug, Default)]
pub struct Validation {
    /// At least one missing property was filled from its `default`.
    pub defaults_applied: bool,
    pub violations: Vec<Violation>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn violation(&mut self, keyword: &str, message: String, params: Value, data_path: &str) {
        self.violations.push(Violation {
            keyword: keyword.to_string(),
            message,
            params,
            data_path: data_path.to_string(),
        });
    }
}

/// A schema compiled once and checked against many values.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    root: SchemaNode,
    source: Value,
}

impl CompiledSchema {
    pub fn compile(schema: &Value) -> Result<Self, ConstructionError> {
        Ok(Self {
            root: compile_node(schema, ROOT_PATH)?,
            source: schema.clone(),
        })
    }

    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Check `value`, filling in defaults along the way.
    pub fn validate(&self, value: &mut Value) -> Validation {
        let mut outcome = Validation::default();
        check(&self.root, value, "", &mut outcome);
        outcome
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(&mut value.clone()).is_valid()
    }
}

fn invalid(path: &str, reason: impl Into<String>) -> ConstructionError {
    ConstructionError::InvalidSchema {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn compile_node(schema: &Value, path: &str) -> Result<SchemaNode, ConstructionError> {
    let keywords = match schema {
        Value::Object(keywords) => keywords,
        Value::Bool(accepts) => {
            return Ok(SchemaNode {
                rejects_everything: !accepts,
                ..SchemaNode::default()
            })
        }
        _ => return Err(invalid(path, "a schema must be an object or a boolean")),
    };

    let mut node = SchemaNode::default();
    for (keyword, rule) in keywords {
        match keyword.as_str() {
            "type" => node.types = Some(compile_types(rule, path)?),
            "enum" => {
                let values = rule
                    .as_array()
                    .ok_or_else(|| invalid(path, "'enum' must be an array"))?;
                node.enumeration = Some(values.clone());
            }
            "const" => node.constant = Some(rule.clone()),
            "properties" => node.properties = compile_properties(rule, path)?,
            "required" => node.required = compile_required(rule, path)?,
            "additionalProperties" => {
                node.additional = match rule {
                    Value::Bool(true) => Additional::Allowed,
                    Value::Bool(false) => Additional::Forbidden,
                    other => Additional::Schema(Box::new(compile_node(
                        other,
                        &format!("{}/additionalProperties", path),
                    )?)),
                }
            }
            "items" => {
                node.items = Some(Box::new(compile_node(rule, &format!("{}/items", path))?))
            }
            "minLength" => node.min_length = Some(count(rule, path, keyword)?),
            "maxLength" => node.max_length = Some(count(rule, path, keyword)?),
            "minItems" => node.min_items = Some(count(rule, path, keyword)?),
            "maxItems" => node.max_items = Some(count(rule, path, keyword)?),
            "minimum" => node.minimum = Some(number(rule, path, keyword)?),
            "maximum" => node.maximum = Some(number(rule, path, keyword)?),
            "exclusiveMinimum" => node.exclusive_minimum = Some(number(rule, path, keyword)?),
            "exclusiveMaximum" => node.exclusive_maximum = Some(number(rule, path, keyword)?),
            "default" => node.default = Some(rule.clone()),
            _ => UnsupportedSchemaKeyword { keyword, path }.log(),
        }
    }
    Ok(node)
}

fn compile_types(rule: &Value, path: &str) -> Result<Vec<JsonType>, ConstructionError> {
    let parse = |name: &Value| {
        name.as_str()
            .and_then(JsonType::parse)
            .ok_or_else(|| invalid(path, format!("unknown type {}", name)))
    };

    match rule {
        Value::String(_) => Ok(vec![parse(rule)?]),
        Value::Array(names) if !names.is_empty() => names.iter().map(parse).collect(),
        _ => Err(invalid(path, "'type' must be a type name or a non-empty array of them")),
    }
}

fn compile_properties(rule: &Value, path: &str) -> Result<Vec<(String, SchemaNode)>, ConstructionError> {
    let properties = rule
        .as_object()
        .ok_or_else(|| invalid(path, "'properties' must be an object"))?;

    properties
        .iter()
        .map(|(name, child)| {
            let child_path = format!("{}/properties/{}", path, name);
            Ok((name.clone(), compile_node(child, &child_path)?))
        })
        .collect()
}

fn compile_required(rule: &Value, path: &str) -> Result<Vec<String>, ConstructionError> {
    let names = rule
        .as_array()
        .ok_or_else(|| invalid(path, "'required' must be an array of strings"))?;

    names
        .iter()
        .map(|name| {
            name.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(path, "'required' must be an array of strings"))
        })
        .collect()
}

fn count(rule: &Value, path: &str, keyword: &str) -> Result<u64, ConstructionError> {
    rule.as_u64()
        .ok_or_else(|| invalid(path, format!("'{}' must be a non-negative integer", keyword)))
}

fn number(rule: &Value, path: &str, keyword: &str) -> Result<Number, ConstructionError> {
    match rule {
        Value::Number(n) => Ok(n.clone()),
        _ => Err(invalid(path, format!("'{}' must be a number", keyword))),
    }
}

fn check(node: &SchemaNode, value: &mut Value, path: &str, outcome: &mut Validation) {
    if node.rejects_everything {
        outcome.violation("false schema", "boolean schema is false".to_string(), json!({}), path);
        return;
    }

    if let Some(types) = &node.types {
        if !types.iter().any(|t| t.matches(value)) {
            let expected = types.iter().map(|t| t.name()).collect::<Vec<_>>().join(",");
            outcome.violation("type", format!("should be {}", expected), json!({ "type": expected }), path);
            return;
        }
    }

    if let Value::Object(map) = value {
        apply_defaults(node, map, outcome);
    }

    if let Some(allowed) = &node.enumeration {
        if !allowed.contains(value) {
            outcome.violation(
                "enum",
                "should be equal to one of the allowed values".to_string(),
                json!({ "allowedValues": allowed }),
                path,
            );
        }
    }

    if let Some(constant) = &node.constant {
        if constant != &*value {
            outcome.violation(
                "const",
                "should be equal to constant".to_string(),
                json!({ "allowedValue": constant }),
                path,
            );
        }
    }

    match value {
        Value::String(text) => check_string(node, text, path, outcome),
        Value::Number(n) => check_number(node, n, path, outcome),
        Value::Array(items) => check_array(node, items, path, outcome),
        Value::Object(map) => check_object(node, map, path, outcome),
        Value::Null | Value::Bool(_) => {}
    }
}

fn apply_defaults(node: &SchemaNode, map: &mut Map<String, Value>, outcome: &mut Validation) {
    for (name, child) in &node.properties {
        if let (false, Some(default)) = (map.contains_key(name), &child.default) {
            map.insert(name.clone(), default.clone());
            outcome.defaults_applied = true;
        }
    }
}

fn check_string(node: &SchemaNode, text: &str, path: &str, outcome: &mut Validation) {
    let length = text.chars().count() as u64;
    if let Some(limit) = node.min_length.filter(|limit| length < *limit) {
        outcome.violation(
            "minLength",
            format!("should NOT be shorter than {} characters", limit),
            json!({ "limit": limit }),
            path,
        );
    }
    if let Some(limit) = node.max_length.filter(|limit| length > *limit) {
        outcome.violation(
            "maxLength",
            format!("should NOT be longer than {} characters", limit),
            json!({ "limit": limit }),
            path,
        );
    }
}

fn check_number(node: &SchemaNode, n: &Number, path: &str, outcome: &mut Validation) {
    let Some(actual) = n.as_f64() else {
        return;
    };

    let bounds = [
        ("minimum", &node.minimum, ">=", false),
        ("maximum", &node.maximum, "<=", false),
        ("exclusiveMinimum", &node.exclusive_minimum, ">", true),
        ("exclusiveMaximum", &node.exclusive_maximum, "<", true),
    ];

    for (keyword, limit, comparison, exclusive) in bounds {
        let Some(limit) = limit else { continue };
        let bound = limit.as_f64().unwrap_or(f64::NAN);
        let holds = match comparison {
            ">=" => actual >= bound,
            "<=" => actual <= bound,
            ">" => actual > bound,
            _ => actual < bound,
        };
        if !holds {
            outcome.violation(
                keyword,
                format!("should be {} {}", comparison, limit),
                json!({ "comparison": comparison, "limit": limit, "exclusive": exclusive }),
                path,
            );
        }
    }
}

fn check_array(node: &SchemaNode, items: &mut [Value], path: &str, outcome: &mut Validation) {
    let len = items.len() as u64;
    if let Some(limit) = node.min_items.filter(|limit| len < *limit) {
        outcome.violation(
            "minItems",
            format!("should NOT have fewer than {} items", limit),
            json!({ "limit": limit }),
            path,
        );
    }
    if let Some(limit) = node.max_items.filter(|limit| len > *limit) {
        outcome.violation(
            "maxItems",
            format!("should NOT have more than {} items", limit),
            json!({ "limit": limit }),
            path,
        );
    }

    if let Some(item_schema) = &node.items {
        for (index, item) in items.iter_mut().enumerate() {
            check(item_schema, item, &format!("{}[{}]", path, index), outcome);
        }
    }
}

fn check_object(node: &SchemaNode, map: &mut Map<String, Value>, path: &str, outcome: &mut Validation) {
    for name in &node.required {
        if !map.contains_key(name) {
            outcome.violation(
                "required",
                format!("should have required property '{}'", name),
                json!({ "missingProperty": name }),
                path,
            );
        }
    }

    for (name, child) in &node.properties {
        if let Some(property) = map.get_mut(name) {
            check(child, property, &property_path(path, name), outcome);
        }
    }

    if matches!(node.additional, Additional::Allowed) {
        return;
    }

    let extra: Vec<String> = map
        .keys()
        .filter(|key| !node.properties.iter().any(|(name, _)| name == *key))
        .cloned()
        .collect();

    for key in extra {
        match &node.additional {
            Additional::Forbidden => outcome.violation(
                "additionalProperties",
                "should NOT have additional properties".to_string(),
                json!({ "additionalProperty": key }),
                path,
            ),
            Additional::Schema(schema) => {
                if let Some(property) = map.get_mut(&key) {
                    check(schema, property, &property_path(path, &key), outcome);
                }
            }
            Additional::Allowed => {}
        }
    }
}

fn property_path(parent: &str, name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = chars
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if is_identifier {
        format!("{}.{}", parent, name)
    } else {
        format!("{}['{}']", parent, name.replace('\'', "\\'"))
    }
}
