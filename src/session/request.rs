//! The input to one session run.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::provider::ChatService;
use crate::tools::ToolCallService;
use crate::types::{Message, Tool};

/// Everything needed to start a run.
#[derive(Clone)]
pub struct SessionRequest {
    pub service: Arc<dyn ChatService>,
    pub model: String,
    pub tool_service: Option<Arc<dyn ToolCallService>>,
    pub system: Option<String>,
    pub history: Vec<Message>,
    pub tools: Vec<Tool>,
    /// Forced on the first round only.
    pub tool_choice: Option<Tool>,
    /// Rendered into a `<user_context>` block ahead of the system prompt.
    pub context: BTreeMap<String, String>,
    pub options: HashMap<String, serde_json::Value>,
}

impl SessionRequest {
    pub fn new(service: Arc<dyn ChatService>, model: impl Into<String>) -> Self {
        Self {
            service,
            model: model.into(),
            tool_service: None,
            system: None,
            history: Vec::new(),
            tools: Vec::new(),
            tool_choice: None,
            context: BTreeMap::new(),
            options: HashMap::new(),
        }
    }

    pub fn with_tool_service(mut self, tool_service: Arc<dyn ToolCallService>) -> Self {
        self.tool_service = Some(tool_service);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Force `tool` on the first round. Later rounds never force a tool.
    pub fn with_tool_choice(mut self, tool: Tool) -> Self {
        self.tool_choice = Some(tool);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// System prompt with the user-context block prepended, if either exists.
    pub fn system_prompt(&self) -> Option<String> {
        let block = render_context(&self.context);
        match (block, self.system.as_deref()) {
            (None, None) => None,
            (Some(block), None) => Some(block),
            (None, Some(system)) => Some(system.to_string()),
            (Some(block), Some(system)) => Some(format!("{block}\n\n{system}")),
        }
    }

    /// The conversation sent on the first round: system prompt, then history.
    pub(crate) fn initial_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        if let Some(system) = self.system_prompt() {
            messages.push(Message::system(system));
        }
        messages.extend(self.history.iter().cloned());
        messages
    }
}

fn render_context(context: &BTreeMap<String, String>) -> Option<String> {
    if context.is_empty() {
        return None;
    }
    let mut block = String::from("<user_context>\n");
    for (key, value) in context {
        block.push_str(key);
        block.push_str(": ");
        block.push_str(value);
        block.push('\n');
    }
    block.push_str("</user_context>");
    Some(block)
}

impl std::fmt::Debug for SessionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRequest")
            .field("model", &self.model)
            .field("has_tool_service", &self.tool_service.is_some())
            .field("system", &self.system)
            .field("history", &self.history.len())
            .field("tools", &self.tools.iter().map(Tool::name).collect::<Vec<_>>())
            .field("tool_choice", &self.tool_choice.as_ref().map(Tool::name))
            .field("context", &self.context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PalaverError;
    use crate::provider::{ChatServiceRequest, DeltaStream};
    use crate::types::Role;
    use async_trait::async_trait;

    struct NullService;

    #[async_trait]
    impl ChatService for NullService {
        async fn completion(&self, _request: ChatServiceRequest) -> Result<Message, PalaverError> {
            Err(PalaverError::UnsupportedOperation("null".into()))
        }

        async fn completion_stream(
            &self,
            _request: ChatServiceRequest,
        ) -> Result<DeltaStream, PalaverError> {
            Err(PalaverError::UnsupportedOperation("null".into()))
        }
    }

    fn request() -> SessionRequest {
        SessionRequest::new(Arc::new(NullService), "test-model")
    }

    #[test]
    fn no_system_and_no_context_sends_history_only() {
        let req = request().with_history(vec![Message::user("hi")]);
        let messages = req.initial_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn context_block_precedes_system_prompt() {
        let req = request()
            .with_system("Be brief.")
            .with_context("timezone", "UTC")
            .with_context("name", "Ada");
        assert_eq!(
            req.system_prompt().as_deref(),
            Some("<user_context>\nname: Ada\ntimezone: UTC\n</user_context>\n\nBe brief.")
        );
        assert_eq!(req.initial_messages()[0].role, Role::System);
    }

    #[test]
    fn context_without_system_prompt_still_renders() {
        let req = request().with_context("k", "v");
        assert_eq!(
            req.system_prompt().as_deref(),
            Some("<user_context>\nk: v\n</user_context>")
        );
    }
}
