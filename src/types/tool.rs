//! Tool definitions and the tool calls a model emits against them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A tool offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    Function(FunctionTool),
    Custom(CustomTool),
}

/// A function tool with a JSON Schema parameter definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionTool {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A free-form tool whose input is plain text, optionally constrained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<CustomToolFormat>,
}

/// Input constraint for a custom tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CustomToolFormat {
    Text,
    Grammar { syntax: String, definition: String },
}

impl Tool {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self::Function(FunctionTool {
            name: name.into(),
            description: description.into(),
            parameters,
        })
    }

    pub fn custom(name: impl Into<String>, description: Option<String>) -> Self {
        Self::Custom(CustomTool {
            name: name.into(),
            description,
            format: None,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Function(tool) => &tool.name,
            Self::Custom(tool) => &tool.name,
        }
    }

    pub fn kind(&self) -> ToolCallType {
        match self {
            Self::Function(_) => ToolCallType::Function,
            Self::Custom(_) => ToolCallType::Custom,
        }
    }
}

/// Type tag of a tool call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolCallType {
    #[default]
    Function,
    Custom,
}

/// A tool call requested by the model.
///
/// While streaming, the payload text grows fragment by fragment and is not
/// guaranteed to parse until the owning message is finished.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Stream position used to correlate fragments when the backend does not
    /// repeat the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub id: String,
    #[serde(flatten)]
    pub payload: ToolCallPayload,
}

/// The accumulated invocation of a tool call. Exactly one variant per call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolCallPayload {
    Function(FunctionCall),
    Custom(CustomCall),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomCall {
    pub name: String,
    pub input: String,
}

impl ToolCall {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            index: None,
            id: id.into(),
            payload: ToolCallPayload::Function(FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
        }
    }

    pub fn custom(id: impl Into<String>, name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            index: None,
            id: id.into(),
            payload: ToolCallPayload::Custom(CustomCall {
                name: name.into(),
                input: input.into(),
            }),
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn kind(&self) -> ToolCallType {
        match self.payload {
            ToolCallPayload::Function(_) => ToolCallType::Function,
            ToolCallPayload::Custom(_) => ToolCallType::Custom,
        }
    }

    pub fn name(&self) -> &str {
        match &self.payload {
            ToolCallPayload::Function(call) => &call.name,
            ToolCallPayload::Custom(call) => &call.name,
        }
    }

    /// Function arguments or custom input, whichever this call carries.
    pub fn input(&self) -> &str {
        match &self.payload {
            ToolCallPayload::Function(call) => &call.arguments,
            ToolCallPayload::Custom(call) => &call.input,
        }
    }

    /// Decode the accumulated payload as JSON.
    ///
    /// An empty payload decodes as `{}` so argument-less functions work.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let raw = self.input();
        if raw.trim().is_empty() {
            serde_json::from_str("{}")
        } else {
            serde_json::from_str(raw)
        }
    }
}
