//! Shared test helpers: a scripted chat backend and tool collaborators.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use palaver::error::PalaverError;
use palaver::provider::{ChatService, ChatServiceRequest, DeltaStream};
use palaver::tools::{ToolCallResponse, ToolCallService};
use palaver::types::*;

/// One scripted backend turn.
pub enum Scripted {
    /// Returned whole by `completion`; streamed as a single delta.
    Message(Message),
    /// Streamed one delta at a time.
    Deltas(Vec<MessageDelta>),
    /// Streams these deltas, then never finishes.
    Hang(Vec<MessageDelta>),
    /// Streams these deltas, then fails.
    FailAfter(Vec<MessageDelta>, String),
    /// The request itself fails.
    Fail(String),
}

/// A chat backend that plays back queued turns and records each request.
#[derive(Default)]
pub struct MockChatService {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatServiceRequest>>,
    calls: AtomicUsize,
}

impl MockChatService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn push(&self, turn: Scripted) -> &Self {
        self.script.lock().unwrap().push_back(turn);
        self
    }

    /// Queue a plain text reply.
    pub fn queue_text(&self, text: &str) -> &Self {
        self.push(Scripted::Message(
            Message::assistant(text).with_finish_reason(FinishReason::Stop),
        ))
    }

    /// Queue an assistant turn requesting the given tool calls.
    pub fn queue_tool_calls(&self, calls: Vec<ToolCall>) -> &Self {
        self.push(Scripted::Message(
            Message::new(Role::Assistant)
                .with_tool_calls(calls)
                .with_finish_reason(FinishReason::ToolCalls),
        ))
    }

    pub fn requests(&self) -> Vec<ChatServiceRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self, request: ChatServiceRequest) -> Option<Scripted> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.script.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl ChatService for MockChatService {
    async fn completion(&self, request: ChatServiceRequest) -> Result<Message, PalaverError> {
        match self.next(request) {
            None => Ok(Message::assistant("Mock response").with_finish_reason(FinishReason::Stop)),
            Some(Scripted::Message(message)) => Ok(message),
            Some(Scripted::Fail(reason)) => Err(PalaverError::Response(reason)),
            Some(_) => Err(PalaverError::UnsupportedOperation(
                "streaming turn queued for a buffered completion".into(),
            )),
        }
    }

    async fn completion_stream(&self, request: ChatServiceRequest) -> Result<DeltaStream, PalaverError> {
        let deltas = match self.next(request) {
            None => vec![
                MessageDelta::text("Mock "),
                MessageDelta::text("streamed response"),
                MessageDelta::finish(FinishReason::Stop),
            ],
            Some(Scripted::Message(message)) => {
                let mut delta = MessageDelta::text(message.text());
                delta.tool_calls = message
                    .tool_calls
                    .iter()
                    .enumerate()
                    .map(|(index, call)| {
                        ToolCallDelta::start(index, call.id.clone(), call.name())
                            .with_kind(call.kind())
                            .with_fragment(call.input())
                    })
                    .collect();
                delta.finish_reason = message.finish_reason;
                vec![delta]
            }
            Some(Scripted::Deltas(deltas)) => deltas,
            Some(Scripted::Hang(deltas)) => {
                let head = futures::stream::iter(deltas.into_iter().map(Ok));
                return Ok(head.chain(futures::stream::pending()).boxed());
            }
            Some(Scripted::FailAfter(deltas, reason)) => {
                let stream = async_stream::stream! {
                    for delta in deltas {
                        yield Ok(delta);
                    }
                    yield Err(PalaverError::Stream(reason));
                };
                return Ok(Box::pin(stream));
            }
            Some(Scripted::Fail(reason)) => return Err(PalaverError::Request(reason)),
        };
        Ok(futures::stream::iter(deltas.into_iter().map(Ok)).boxed())
    }
}

/// How a [`ScriptedTools`] handler behaves for one tool name.
#[derive(Clone)]
pub enum ToolBehavior {
    Reply(String),
    Stop(String),
    Fail(String),
}

/// Tool collaborator with per-name behavior and delay that records every call
/// and tracks peak concurrency.
#[derive(Default)]
pub struct ScriptedTools {
    behaviors: HashMap<String, (ToolBehavior, Duration)>,
    calls: Mutex<Vec<String>>,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, name: &str, behavior: ToolBehavior, delay_ms: u64) -> Self {
        self.behaviors
            .insert(name.to_string(), (behavior, Duration::from_millis(delay_ms)));
        self
    }

    pub fn called(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolCallService for ScriptedTools {
    async fn call(&self, tool_call: &ToolCall) -> Result<ToolCallResponse, PalaverError> {
        self.calls.lock().unwrap().push(tool_call.id.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let (behavior, delay) = self
            .behaviors
            .get(tool_call.name())
            .cloned()
            .unwrap_or((ToolBehavior::Reply("ok".into()), Duration::ZERO));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        match behavior {
            ToolBehavior::Reply(text) => Ok(ToolCallResponse::reply(tool_call, text)),
            ToolBehavior::Stop(text) => Ok(ToolCallResponse::stop(vec![Message::tool(
                &tool_call.id,
                tool_call.name(),
                text,
            )])),
            ToolBehavior::Fail(reason) => Err(PalaverError::tool(tool_call.name(), reason)),
        }
    }
}

pub fn call(id: &str, name: &str) -> ToolCall {
    ToolCall::function(id, name, "{}")
}
