//! JSON-schema argument lists for function tools.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{AsRefStr, Display};

use crate::types::Tool;

/// JSON type of a single tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ArgKind {
    String,
    Integer,
    Number,
    Boolean,
}

/// The `parameters` object of a function tool.
///
/// Schemas built here are closed objects (`additionalProperties: false`) so
/// backends that validate arguments reject keys the tool never declared.
/// [`ToolParameters::from_schema`] accepts anything verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolParameters {
    pub schema: Value,
}

impl ToolParameters {
    pub fn from_schema(schema: Value) -> Self {
        Self { schema }
    }

    /// A tool that takes no arguments.
    pub fn empty() -> Self {
        ArgumentsBuilder::default().build()
    }

    pub fn builder() -> ArgumentsBuilder {
        ArgumentsBuilder::default()
    }

    /// Schema of the argument called `name`, if declared.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.schema.get("properties")?.get(name)
    }

    /// Names the model must always supply, in declaration order.
    pub fn required(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn into_tool(self, name: impl Into<String>, description: impl Into<String>) -> Tool {
        Tool::function(name, description, self.schema)
    }
}

/// Declares arguments one at a time. Redeclaring a name replaces the earlier
/// schema and its required flag.
#[derive(Debug, Clone, Default)]
pub struct ArgumentsBuilder {
    arguments: Map<String, Value>,
    required: Vec<String>,
}

impl ArgumentsBuilder {
    /// An argument the model must always supply.
    pub fn required(self, name: &str, kind: ArgKind, description: &str) -> Self {
        self.declare(name, scalar(kind, description), true)
    }

    pub fn optional(self, name: &str, kind: ArgKind, description: &str) -> Self {
        self.declare(name, scalar(kind, description), false)
    }

    /// A string restricted to `choices`.
    pub fn one_of(self, name: &str, description: &str, choices: &[&str], required: bool) -> Self {
        let schema = json!({ "type": "string", "description": description, "enum": choices });
        self.declare(name, schema, required)
    }

    /// An array whose items are all of `item`.
    pub fn list(self, name: &str, item: ArgKind, description: &str, required: bool) -> Self {
        let schema = json!({
            "type": "array",
            "description": description,
            "items": { "type": item.as_ref() },
        });
        self.declare(name, schema, required)
    }

    fn declare(mut self, name: &str, schema: Value, required: bool) -> Self {
        self.arguments.insert(name.to_owned(), schema);
        self.required.retain(|existing| existing != name);
        if required {
            self.required.push(name.to_owned());
        }
        self
    }

    pub fn build(self) -> ToolParameters {
        let mut schema = json!({
            "type": "object",
            "properties": self.arguments,
            "additionalProperties": false,
        });
        if !self.required.is_empty() {
            schema["required"] = json!(self.required);
        }
        ToolParameters { schema }
    }
}

fn scalar(kind: ArgKind, description: &str) -> Value {
    json!({ "type": kind.as_ref(), "description": description })
}
