//! Backend service traits.
//!
//! Each capability is its own trait so an integration implements only what
//! its backend supports. Wire encoding, transport and authentication live in
//! the implementations, not here.

pub mod media;

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::PalaverError;
use crate::types::{Message, MessageDelta, Model, Tool};

pub use media::{
    EmbeddingServiceRequest, ImagineServiceRequest, SpeechServiceRequest,
    TranscriptionServiceRequest, Voice, VoiceCloneRequest,
};

/// Stream of fragments produced by [`ChatService::completion_stream`].
pub type DeltaStream = BoxStream<'static, Result<MessageDelta, PalaverError>>;

/// A request sent to a chat backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatServiceRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
    pub tool_choice: Option<Tool>,
    pub options: HashMap<String, serde_json::Value>,
}

impl ChatServiceRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            options: HashMap::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool: Option<Tool>) -> Self {
        self.tool_choice = tool;
        self
    }

    pub fn with_options(mut self, options: HashMap<String, serde_json::Value>) -> Self {
        self.options = options;
        self
    }
}

/// Chat completion, buffered or streamed.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Generate a complete message.
    async fn completion(&self, request: ChatServiceRequest) -> Result<Message, PalaverError>;

    /// Generate a message as a stream of fragments.
    ///
    /// The caller folds every fragment, in order, into its own message. When
    /// the caller stops polling, the implementation must stop producing.
    async fn completion_stream(
        &self,
        request: ChatServiceRequest,
    ) -> Result<DeltaStream, PalaverError>;
}

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embeddings(&self, request: EmbeddingServiceRequest) -> Result<Vec<f64>, PalaverError>;
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn imagine(&self, request: ImagineServiceRequest) -> Result<Vec<Vec<u8>>, PalaverError>;
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn speak(&self, request: SpeechServiceRequest) -> Result<Vec<u8>, PalaverError>;

    async fn voices(&self) -> Result<Vec<Voice>, PalaverError>;

    /// Register a cloned voice and return its identifier.
    async fn voice_clone(&self, request: VoiceCloneRequest) -> Result<String, PalaverError>;
}

#[async_trait]
pub trait TranscriptionService: Send + Sync {
    async fn transcribe(&self, request: TranscriptionServiceRequest) -> Result<String, PalaverError>;
}

#[async_trait]
pub trait ModelService: Send + Sync {
    async fn models(&self) -> Result<Vec<Model>, PalaverError>;
}
