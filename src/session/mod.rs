//! Multi-turn orchestration: send a conversation, run any requested tools,
//! feed their results back, repeat until done.

pub mod history;
pub mod request;
pub mod response;
mod runner;
pub mod stream;
mod tooling;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

pub use history::merge_message;
pub use request::SessionRequest;
pub use response::SessionResponse;
pub use stream::SessionStream;

use crate::config::SessionConfig;
use crate::error::PalaverError;

/// Runs conversations against a [`crate::provider::ChatService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Session {
    config: SessionConfig,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run to completion and return every message the run produced.
    pub async fn completion(&self, request: SessionRequest) -> Result<SessionResponse, PalaverError> {
        let messages = runner::run_buffered(request, self.config).await?;
        Ok(SessionResponse::new(messages))
    }

    /// Start a streaming run. Nothing is sent until the stream is first polled.
    pub fn stream(&self, request: SessionRequest) -> SessionStream {
        let config = self.config;
        let token = CancellationToken::new();
        let run_token = token.clone();

        let inner = async_stream::stream! {
            let (tx, rx) = mpsc::channel(config.effective_stream_buffer());
            let producer = tokio::spawn(runner::run_streaming(request, config, tx, run_token));
            let mut receiver = ReceiverStream::new(rx);
            while let Some(item) = receiver.next().await {
                let failed = item.is_err();
                yield item;
                if failed {
                    break;
                }
            }
            if let Err(err) = producer.await {
                if err.is_panic() {
                    yield Err(PalaverError::Stream("session run panicked".into()));
                }
            }
        };

        SessionStream::new(Box::pin(inner), token)
    }
}
