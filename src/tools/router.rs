//! Name-routed tool collaborator built from closures.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::service::{ToolCallResponse, ToolCallService};
use crate::error::PalaverError;
use crate::types::{Tool, ToolCall};

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(ToolCall) -> Pin<Box<dyn Future<Output = Result<ToolCallResponse, PalaverError>> + Send>>
    + Send
    + Sync;

/// Routes each tool call to the handler registered under its name.
///
/// Calls naming an unregistered tool fail with [`PalaverError::Tool`].
#[derive(Clone, Default)]
pub struct ToolRouter {
    definitions: Vec<Tool>,
    handlers: HashMap<String, Arc<ToolHandler>>,
}

impl ToolRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool and its handler. A later registration under the same
    /// name replaces the earlier one.
    pub fn register<F, Fut>(mut self, tool: Tool, handler: F) -> Self
    where
        F: Fn(ToolCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolCallResponse, PalaverError>> + Send + 'static,
    {
        let name = tool.name().to_string();
        self.definitions.retain(|existing| existing.name() != name);
        self.definitions.push(tool);
        self.handlers
            .insert(name, Arc::new(move |call| Box::pin(handler(call))));
        self
    }

    /// Tool definitions to offer the model, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.definitions.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

#[async_trait]
impl ToolCallService for ToolRouter {
    async fn call(&self, tool_call: &ToolCall) -> Result<ToolCallResponse, PalaverError> {
        let handler = self
            .handlers
            .get(tool_call.name())
            .cloned()
            .ok_or_else(|| PalaverError::tool(tool_call.name(), "unknown tool"))?;
        handler(tool_call.clone()).await
    }
}

impl std::fmt::Debug for ToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRouter")
            .field("tools", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
