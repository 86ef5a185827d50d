//! Fan-out/fan-in execution of one turn's tool calls.

use std::panic::AssertUnwindSafe;

use futures::{stream, FutureExt, StreamExt};
use tracing::warn;

use crate::error::PalaverError;
use crate::tools::{ToolCallResponse, ToolCallService};
use crate::types::{Message, ToolCall};

#[derive(Debug, Clone)]
pub(super) struct DispatchOutcome {
    /// Messages from every call, in completion order.
    pub(super) messages: Vec<Message>,
    /// False if any call asked to stop.
    pub(super) should_continue: bool,
}

/// Run every call with at most `max_concurrent` in flight and wait for all
/// of them, even after one has asked to stop.
pub(super) async fn dispatch_tool_calls(
    service: &dyn ToolCallService,
    calls: &[ToolCall],
    max_concurrent: usize,
) -> DispatchOutcome {
    let pending: Vec<_> = calls
        .iter()
        .map(|call| execute_tool_call(service, call).boxed())
        .collect();
    let responses: Vec<ToolCallResponse> = stream::iter(pending)
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let should_continue = responses.iter().all(|response| response.should_continue);
    let messages = responses
        .into_iter()
        .flat_map(|response| response.messages)
        .collect();

    DispatchOutcome {
        messages,
        should_continue,
    }
}

async fn execute_tool_call(service: &dyn ToolCallService, call: &ToolCall) -> ToolCallResponse {
    match AssertUnwindSafe(service.call(call)).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            warn!(tool = call.name(), tool_call_id = %call.id, error = %err, "tool call failed");
            failed_tool_response(call, &err)
        }
        Err(_) => {
            let err = PalaverError::tool(call.name(), "tool handler panicked");
            warn!(tool = call.name(), tool_call_id = %call.id, "tool handler panicked");
            failed_tool_response(call, &err)
        }
    }
}

fn failed_tool_response(call: &ToolCall, err: &PalaverError) -> ToolCallResponse {
    let text = format!("Tool '{}' failed: {err}", call.name());
    ToolCallResponse::stop(vec![Message::tool(&call.id, call.name(), text)])
}
