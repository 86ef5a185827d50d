//! The consumer side of a streaming run.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use tokio_util::sync::{CancellationToken, DropGuard};

use super::history::merge_message;
use crate::error::PalaverError;
use crate::types::Message;

/// Messages from a streaming run.
///
/// Yields successive snapshots of the in-progress assistant message (same
/// id, growing content), then each tool message. A failure is the last item.
/// Dropping the stream cancels the run, including in-flight tool calls.
pub struct SessionStream {
    inner: BoxStream<'static, Result<Message, PalaverError>>,
    token: CancellationToken,
    _guard: DropGuard,
}

impl SessionStream {
    pub(super) fn new(
        inner: BoxStream<'static, Result<Message, PalaverError>>,
        token: CancellationToken,
    ) -> Self {
        Self {
            inner,
            _guard: token.clone().drop_guard(),
            token,
        }
    }

    /// Stop the run. Items already buffered may still be yielded.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drain the stream, folding snapshots by id into the final messages.
    ///
    /// Fails with [`PalaverError::Canceled`] if the run was cancelled first.
    pub async fn collect_messages(mut self) -> Result<Vec<Message>, PalaverError> {
        let mut messages = Vec::new();
        while let Some(item) = self.next().await {
            merge_message(&mut messages, item?);
        }
        if self.token.is_cancelled() {
            return Err(PalaverError::Canceled);
        }
        Ok(messages)
    }
}

impl Stream for SessionStream {
    type Item = Result<Message, PalaverError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for SessionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStream")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
