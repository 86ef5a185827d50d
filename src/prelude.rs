//! Convenience re-exports for common use.

pub use crate::config::SessionConfig;
pub use crate::error::{ExtractionError, PalaverError, Result};
pub use crate::parser::{ParsedContent, Tag, TagParser};
pub use crate::provider::{ChatService, ChatServiceRequest, DeltaStream};
pub use crate::session::{Session, SessionRequest, SessionResponse, SessionStream};
pub use crate::template::PromptTemplate;
pub use crate::tools::{ArgKind, ToolCallResponse, ToolCallService, ToolParameters, ToolRouter};
pub use crate::types::{
    Content, FinishReason, Message, MessageDelta, Metadata, Role, Tool, ToolCall, ToolCallDelta,
};
