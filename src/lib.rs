//! Palaver — conversational orchestration over chat backends
//!
//! Provides a backend-neutral message model, a streaming aggregation engine
//! that folds incremental deltas into complete messages, and a session
//! orchestrator that runs the model/tool round-trip loop with bounded
//! concurrent tool dispatch.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use palaver::prelude::*;
//!
//! # async fn example(service: Arc<dyn ChatService>) -> palaver::error::Result<()> {
//! let request = SessionRequest::new(service, "my-model")
//!     .with_system("You are terse.")
//!     .with_history(vec![Message::user("Hello!")]);
//! let response = Session::new().completion(request).await?;
//! println!("{}", response.last_message().map(Message::text).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod parser;
pub mod prelude;
pub mod provider;
pub mod session;
pub mod template;
pub mod tools;
pub mod types;
