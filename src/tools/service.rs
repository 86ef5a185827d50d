//! The tool-execution collaborator the session run loop dispatches to.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::types::{Message, ToolCall};

/// Outcome of executing one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResponse {
    /// Messages to append to the conversation (usually one tool message).
    pub messages: Vec<Message>,
    /// Whether the run should ask the model for another turn.
    pub should_continue: bool,
}

impl ToolCallResponse {
    pub fn new(messages: Vec<Message>, should_continue: bool) -> Self {
        Self {
            messages,
            should_continue,
        }
    }

    /// A single tool message answering `call`; the run continues.
    pub fn reply(call: &ToolCall, text: impl Into<String>) -> Self {
        Self::new(vec![Message::tool(&call.id, call.name(), text)], true)
    }

    /// End the run after these messages.
    pub fn stop(messages: Vec<Message>) -> Self {
        Self::new(messages, false)
    }
}

/// Executes tool calls on behalf of the run loop.
///
/// Calls from one model turn are dispatched concurrently; implementations
/// must not rely on ordering between them.
#[async_trait]
pub trait ToolCallService: Send + Sync {
    async fn call(&self, tool_call: &ToolCall) -> Result<ToolCallResponse, PalaverError>;
}
