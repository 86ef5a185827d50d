//! The model/tool round-trip loop, in buffered and streaming flavours.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use super::history::merge_message;
use super::request::SessionRequest;
use super::tooling::{dispatch_tool_calls, DispatchOutcome};
use crate::config::SessionConfig;
use crate::error::PalaverError;
use crate::provider::{ChatService, ChatServiceRequest};
use crate::tools::ToolCallService;
use crate::types::{FinishReason, Message, Role, Tool, ToolCall};

/// State shared by both loop flavours for the lifetime of one run.
struct RunLoop {
    run_id: String,
    service: Arc<dyn ChatService>,
    tool_service: Option<Arc<dyn ToolCallService>>,
    model: String,
    tools: Vec<Tool>,
    tool_choice: Option<Tool>,
    options: std::collections::HashMap<String, serde_json::Value>,
    config: SessionConfig,
    conversation: Vec<Message>,
    produced: Vec<Message>,
    iteration: usize,
}

impl RunLoop {
    fn new(request: SessionRequest, config: SessionConfig) -> Self {
        let conversation = request.initial_messages();
        let run = Self {
            run_id: Uuid::new_v4().to_string(),
            service: request.service,
            tool_service: request.tool_service,
            model: request.model,
            tools: request.tools,
            tool_choice: request.tool_choice,
            options: request.options,
            config,
            conversation,
            produced: Vec::new(),
            iteration: 0,
        };
        debug!(
            run_id = %run.run_id,
            model = %run.model,
            history = run.conversation.len(),
            tools = run.tools.len(),
            "palaver run start"
        );
        run
    }

    /// Build the request for the next round, or fail once the limit is spent.
    fn next_request(&mut self) -> Result<ChatServiceRequest, PalaverError> {
        let limit = self.config.run_loop_limit;
        if self.iteration >= limit {
            warn!(run_id = %self.run_id, limit, "palaver run limit reached");
            return Err(PalaverError::RunLimit { limit });
        }
        self.iteration += 1;
        Ok(ChatServiceRequest::new(self.model.clone(), self.conversation.clone())
            .with_tools(self.tools.clone())
            .with_tool_choice(self.tool_choice.take())
            .with_options(self.options.clone()))
    }

    fn new_assistant_message(&self) -> Message {
        let mut message = Message::new(Role::Assistant);
        self.tag(&mut message);
        message
    }

    fn tag(&self, message: &mut Message) {
        message.metadata.set_run_id(self.run_id.clone());
        if message.role == Role::Assistant && message.metadata.model_id().is_none() {
            message.metadata.set_model_id(self.model.clone());
        }
    }

    /// Tag and merge a produced message, returning the stored copy.
    fn record(&mut self, mut message: Message) -> Message {
        self.tag(&mut message);
        merge_message(&mut self.conversation, message.clone());
        merge_message(&mut self.produced, message.clone());
        message
    }

    fn pending_tool_calls(&self, message: &Message) -> Option<(Arc<dyn ToolCallService>, Vec<ToolCall>)> {
        if !message.has_tool_calls() {
            return None;
        }
        let service = self.tool_service.clone()?;
        Some((service, message.tool_calls.clone()))
    }

    async fn dispatch(&self, service: &dyn ToolCallService, calls: &[ToolCall]) -> DispatchOutcome {
        let outcome = dispatch_tool_calls(service, calls, self.config.effective_concurrency()).await;
        debug!(
            run_id = %self.run_id,
            iteration = self.iteration,
            tool_calls = calls.len(),
            should_continue = outcome.should_continue,
            "palaver tools dispatched"
        );
        outcome
    }

    fn round_complete(&self, message: &Message) {
        debug!(
            run_id = %self.run_id,
            iteration = self.iteration,
            tool_calls = message.tool_calls.len(),
            finish_reason = ?message.finish_reason,
            "palaver iteration complete"
        );
    }

    fn finish(self) -> Vec<Message> {
        debug!(run_id = %self.run_id, messages = self.produced.len(), "palaver run completed");
        self.produced
    }
}

/// Run to completion, returning every message the run produced.
pub(super) async fn run_buffered(
    request: SessionRequest,
    config: SessionConfig,
) -> Result<Vec<Message>, PalaverError> {
    let mut run = RunLoop::new(request, config);
    loop {
        let chat_request = run.next_request()?;
        let mut message = run.service.completion(chat_request).await?;
        finalize(&mut message);
        run.tag(&mut message);
        let message = run.record(message);
        run.round_complete(&message);

        let Some((service, calls)) = run.pending_tool_calls(&message) else {
            break;
        };
        let outcome = run.dispatch(service.as_ref(), &calls).await;
        for tool_message in outcome.messages {
            run.record(tool_message);
        }
        if !outcome.should_continue {
            break;
        }
    }
    Ok(run.finish())
}

/// Give a message the backend left open a finish reason. Returns whether it
/// changed.
fn finalize(message: &mut Message) -> bool {
    if message.is_finalized() {
        return false;
    }
    let reason = if message.has_tool_calls() {
        FinishReason::ToolCalls
    } else {
        FinishReason::Stop
    };
    message.finish_reason = Some(reason);
    message.touch();
    true
}

enum StreamExit {
    /// The consumer dropped the receiving half.
    Disconnected,
    Failed(PalaverError),
}

impl From<PalaverError> for StreamExit {
    fn from(err: PalaverError) -> Self {
        Self::Failed(err)
    }
}

/// Drive a run, sending assistant snapshots and tool messages to `tx`.
///
/// Ends when the run completes, the consumer goes away, or `cancel` fires.
/// A failure is sent as the final item.
pub(super) async fn run_streaming(
    request: SessionRequest,
    config: SessionConfig,
    tx: mpsc::Sender<Result<Message, PalaverError>>,
    cancel: CancellationToken,
) {
    let mut run = RunLoop::new(request, config);
    let run_id = run.run_id.clone();

    let outcome = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(run_id = %run_id, "palaver run canceled");
            return;
        }
        outcome = drive_stream(&mut run, &tx) => outcome,
    };

    match outcome {
        Ok(()) => {
            run.finish();
        }
        Err(StreamExit::Disconnected) => {
            debug!(run_id = %run_id, "palaver stream consumer disconnected");
        }
        Err(StreamExit::Failed(err)) => {
            debug!(run_id = %run_id, error = %err, "palaver run failed");
            let _ = tx.send(Err(err)).await;
        }
    }
}

async fn drive_stream(
    run: &mut RunLoop,
    tx: &mpsc::Sender<Result<Message, PalaverError>>,
) -> Result<(), StreamExit> {
    loop {
        let chat_request = run.next_request()?;
        let mut deltas = run.service.completion_stream(chat_request).await?;
        let mut message = run.new_assistant_message();
        let mut fragments = 0usize;

        while let Some(delta) = deltas.next().await {
            message.apply(delta?);
            fragments += 1;
            emit(tx, message.clone()).await?;
        }
        if fragments == 0 {
            return Err(PalaverError::Response("stream ended without producing a message".into()).into());
        }
        if finalize(&mut message) {
            emit(tx, message.clone()).await?;
        }

        let message = run.record(message);
        run.round_complete(&message);

        let Some((service, calls)) = run.pending_tool_calls(&message) else {
            return Ok(());
        };
        let outcome = run.dispatch(service.as_ref(), &calls).await;
        for tool_message in outcome.messages {
            let tool_message = run.record(tool_message);
            emit(tx, tool_message).await?;
        }
        if !outcome.should_continue {
            return Ok(());
        }
    }
}

async fn emit(
    tx: &mpsc::Sender<Result<Message, PalaverError>>,
    message: Message,
) -> Result<(), StreamExit> {
    tx.send(Ok(message)).await.map_err(|_| StreamExit::Disconnected)
}
