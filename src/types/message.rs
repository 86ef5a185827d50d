//! Message types for model communication.

use std::collections::HashMap;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::tool::ToolCall;

/// A message in a conversation.
///
/// The id is fixed at construction. While a model turn is streaming the
/// message is folded in place by [`crate::aggregate`]; once `finish_reason`
/// is set it is a finished snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Message {
    /// Create an empty message with a fresh id.
    pub fn new(role: Role) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), role)
    }

    /// Create an empty message with a caller-chosen id.
    pub fn with_id(id: impl Into<String>, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            role,
            contents: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            finish_reason: None,
            metadata: Metadata::default(),
            created: now,
            modified: now,
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System).with_text(text)
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User).with_text(text)
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant).with_text(text)
    }

    /// Create a tool result message answering `tool_call_id`.
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut message = Self::new(Role::Tool).with_text(text);
        message.tool_call_id = Some(tool_call_id.into());
        message.name = Some(name.into());
        message
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.contents.push(Content::Text(text.into()));
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Extract the text content, concatenating all text parts.
    pub fn text(&self) -> String {
        self.contents
            .iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(text.as_str()),
                Content::Image { .. } | Content::Audio { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// First tool call with the given name.
    pub fn tool_call(&self, name: &str) -> Option<&ToolCall> {
        self.tool_calls.iter().find(|call| call.name() == name)
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    pub fn is_finalized(&self) -> bool {
        self.finish_reason.is_some()
    }

    /// Bump the `modified` timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single part of message content.
///
/// Consecutive text parts belong to the same context and may be joined for
/// display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Content {
    Text(String),
    Image { url: String, format: ImageFormat },
    Audio { url: String, format: AudioFormat },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Inline image bytes as a base64 `data:` URL.
    pub fn image_data(bytes: &[u8], format: ImageFormat) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self::Image {
            url: format!("data:{};base64,{encoded}", format.mime_type()),
            format,
        }
    }

    /// Inline audio bytes as a base64 `data:` URL.
    pub fn audio_data(bytes: &[u8], format: AudioFormat) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self::Audio {
            url: format!("data:{};base64,{encoded}", format.mime_type()),
            format,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Image { .. } | Self::Audio { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Opus,
    Aac,
    Pcm,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Flac => "audio/flac",
            Self::Opus => "audio/opus",
            Self::Aac => "audio/aac",
            Self::Pcm => "audio/pcm",
        }
    }
}

/// Why generation finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Cancelled,
    Error,
}

/// Auxiliary string metadata attached to a message.
///
/// Entries are independent of the message's domain fields; dropping them
/// never changes what the message says.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Metadata {
    entries: HashMap<String, String>,
}

impl Metadata {
    pub const RUN_ID: &'static str = "run_id";
    pub const MODEL_ID: &'static str = "model_id";
    pub const REFERENCE_ID: &'static str = "reference_id";

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy every entry of `other` into `self`, overwriting on conflict.
    pub fn extend(&mut self, other: &Metadata) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    pub fn run_id(&self) -> Option<&str> {
        self.get(Self::RUN_ID)
    }

    pub fn set_run_id(&mut self, run_id: impl Into<String>) {
        self.insert(Self::RUN_ID, run_id);
    }

    pub fn model_id(&self) -> Option<&str> {
        self.get(Self::MODEL_ID)
    }

    pub fn set_model_id(&mut self, model_id: impl Into<String>) {
        self.insert(Self::MODEL_ID, model_id);
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.get(Self::REFERENCE_ID)
    }

    pub fn set_reference_id(&mut self, reference_id: impl Into<String>) {
        self.insert(Self::REFERENCE_ID, reference_id);
    }
}
