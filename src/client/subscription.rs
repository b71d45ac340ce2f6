//! Consumer-facing handles of a running filtered stream.
//!
//! # Types
//!
//! - **FilterStream**: owns the message receiver and controls the stream
//! - **StreamHandle**: cloneable control half (`close`, `done`, `err`)
//! - **MessageStream**: receiver half, implements `Stream` for use with `StreamExt`
//!
//! # Lifecycle
//!
//! 1. Created by `StreamClient::filter()`; connecting starts in the background
//! 2. Messages are read with `recv().await` or as a `Stream`
//! 3. The stream ends on `close()`, on a fatal response, when the error
//!    callback asks it to, or when the message receiver is dropped
//! 4. `done()` resolves after the background task has exited; `err()` then
//!    returns the terminal error
//!
//! Messages should be read continuously. The channel holds a single message
//! while the stream task waits to hand over the next one, and a slow reader
//! makes the server-side queue fill up until the server disconnects the
//! stream. Once the stream has shut down no further message is returned; one
//! that was still buffered at that point is discarded.
//!
//! # Examples
//!
//! ```ignore
//! use twitter_stream::{FilterParams, StreamClient};
//! use futures::StreamExt;
//!
//! let mut stream = client.filter(FilterParams::new().track(["rust"]), None);
//! while let Some(message) = stream.next().await {
//!     println!("{}", message.kind());
//! }
//! println!("stream ended: {:?}", stream.err());
//! ```

use crate::error::{Result, StreamError};
use crate::types::StreamMessage;
use futures::Stream;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

/// Lifecycle state published by the stream task.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StreamState {
    Running,
    Closed(StreamError),
}

/// Control half of a filtered stream.
///
/// Cheap to clone; every clone controls the same stream.
#[derive(Debug, Clone)]
pub struct StreamHandle {
    cancel: CancellationToken,
    state: watch::Receiver<StreamState>,
}

impl StreamHandle {
    pub(crate) fn new(cancel: CancellationToken, state: watch::Receiver<StreamState>) -> Self {
        StreamHandle { cancel, state }
    }

    /// Stop the stream and wait until it has fully shut down.
    ///
    /// Returns the error that ended the stream, the same value [`err`]
    /// reports. Closing a healthy stream yields [`StreamError::Cancelled`];
    /// use [`StreamError::is_cancelled`] to tell it apart from a fault. Safe
    /// to call any number of times.
    ///
    /// [`err`]: StreamHandle::err
    pub async fn close(&self) -> Result<()> {
        self.cancel.cancel();
        self.done().await;
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Wait until the stream has fully shut down.
    ///
    /// Resolves once the background task has exited and no further message
    /// can be delivered. Can be awaited any number of times.
    pub async fn done(&self) {
        let mut state = self.state.clone();
        // An Err means the task is gone without publishing; it is done either way.
        let _ = state.wait_for(|s| matches!(s, StreamState::Closed(_))).await;
    }

    /// The error that ended the stream.
    ///
    /// `None` while the stream is running.
    pub fn err(&self) -> Option<StreamError> {
        match &*self.state.borrow() {
            StreamState::Closed(err) => Some(err.clone()),
            StreamState::Running if self.state.has_changed().is_err() => Some(
                StreamError::Internal("stream task exited unexpectedly".to_string()),
            ),
            StreamState::Running => None,
        }
    }

    /// Whether the stream has shut down.
    pub fn is_closed(&self) -> bool {
        self.err().is_some()
    }
}

/// A running filtered stream.
///
/// Reads messages and controls the stream. Use [`FilterStream::split`] to
/// move the receiver to another task while keeping control here.
#[derive(Debug)]
pub struct FilterStream {
    receiver: mpsc::Receiver<StreamMessage>,
    handle: StreamHandle,
}

impl FilterStream {
    pub(crate) fn new(receiver: mpsc::Receiver<StreamMessage>, handle: StreamHandle) -> Self {
        FilterStream { receiver, handle }
    }

    /// Receive the next message.
    ///
    /// Returns `None` once the stream has shut down.
    pub async fn recv(&mut self) -> Option<StreamMessage> {
        std::future::poll_fn(|cx| self.poll_message(cx)).await
    }

    fn poll_message(&mut self, cx: &mut Context<'_>) -> Poll<Option<StreamMessage>> {
        let message = ready!(self.receiver.poll_recv(cx));
        if self.handle.is_closed() {
            self.receiver.close();
            return Poll::Ready(None);
        }
        Poll::Ready(message)
    }

    /// A handle controlling this stream.
    pub fn handle(&self) -> StreamHandle {
        self.handle.clone()
    }

    /// Split into the message receiver and the control handle.
    pub fn split(self) -> (MessageStream, StreamHandle) {
        let messages = MessageStream::new(self.receiver, self.handle.clone());
        (messages, self.handle)
    }

    /// Stop the stream and wait for shutdown. See [`StreamHandle::close`].
    pub async fn close(&self) -> Result<()> {
        self.handle.close().await
    }

    /// Wait until the stream has shut down. See [`StreamHandle::done`].
    pub async fn done(&self) {
        self.handle.done().await
    }

    /// The error that ended the stream. See [`StreamHandle::err`].
    pub fn err(&self) -> Option<StreamError> {
        self.handle.err()
    }
}

impl Stream for FilterStream {
    type Item = StreamMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.poll_message(cx)
    }
}

/// Receiver half of a split [`FilterStream`].
///
/// Dropping it stops the stream.
#[derive(Debug)]
pub struct MessageStream {
    receiver: ReceiverStream<StreamMessage>,
    handle: StreamHandle,
}

impl MessageStream {
    fn new(receiver: mpsc::Receiver<StreamMessage>, handle: StreamHandle) -> Self {
        MessageStream {
            receiver: ReceiverStream::new(receiver),
            handle,
        }
    }
}

impl Stream for MessageStream {
    type Item = StreamMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let message = ready!(Pin::new(&mut self.receiver).poll_next(cx));
        if self.handle.is_closed() {
            self.receiver.close();
            return Poll::Ready(None);
        }
        Poll::Ready(message)
    }
}
