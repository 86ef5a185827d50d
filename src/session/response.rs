//! The result of a buffered run and typed tool-argument extraction.

use serde::de::DeserializeOwned;

use crate::error::{ExtractionError, PalaverError};
use crate::types::Message;

/// Messages produced by one buffered run, in production order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionResponse {
    pub messages: Vec<Message>,
}

impl SessionResponse {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Decode the arguments of the last message's tool call named `name`.
    pub fn extract_tool<T: DeserializeOwned>(&self, name: &str) -> Result<T, PalaverError> {
        let message = self.last_message().ok_or(ExtractionError::MissingMessage)?;
        if !message.has_tool_calls() {
            return Err(ExtractionError::MissingToolCalls.into());
        }
        let call = message
            .tool_call(name)
            .ok_or_else(|| ExtractionError::MissingToolCall { name: name.to_string() })?;
        call.decode().map_err(|source| {
            ExtractionError::Decode {
                name: name.to_string(),
                source,
            }
            .into()
        })
    }
}
