//! Request shapes for the non-chat capabilities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingServiceRequest {
    pub model: String,
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImagineServiceRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default = "default_image_count")]
    pub n: u32,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, serde_json::Value>,
}

fn default_image_count() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechServiceRequest {
    pub model: String,
    pub voice: String,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<AudioFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoiceCloneRequest {
    pub name: String,
    pub description: Option<String>,
    /// Raw audio samples of the voice to clone.
    pub samples: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TranscriptionServiceRequest {
    pub model: String,
    pub audio: Vec<u8>,
    pub format: AudioFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// A voice a speech backend can synthesize with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
