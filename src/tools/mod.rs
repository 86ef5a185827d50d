//! Tool definitions and the tool-execution collaborator.

pub mod router;
pub mod service;
pub mod types;

pub use router::ToolRouter;
pub use service::{ToolCallResponse, ToolCallService};
pub use types::{ArgKind, ArgumentsBuilder, ToolParameters};
