//! Line framer for the streaming response body.
//!
//! Incremental splitter that turns a live byte stream into frames delimited by
//! `\r\n`. Reads may end anywhere, including between the two delimiter bytes,
//! so partial data is buffered until the rest of the frame arrives.
//!
//! # Framing Rules
//!
//! 1. Bytes accumulate until `\r\n` is found
//! 2. Everything before the delimiter is one frame, the delimiter is dropped
//! 3. A frame that is empty or whitespace only is a keep-alive
//! 4. When the body ends, leftover bytes form a final frame
//!
//! # Examples
//!
//! ```
//! use twitter_stream::client::{Frame, LineFramer};
//!
//! let mut framer = LineFramer::new();
//!
//! let frames = framer.feed(b"{\"text\":\"hel").unwrap();
//! assert!(frames.is_empty());
//!
//! let frames = framer.feed(b"lo\"}\r\n\r\n").unwrap();
//! assert_eq!(frames.len(), 2);
//! assert!(matches!(frames[0], Frame::Message(_)));
//! assert_eq!(frames[1], Frame::KeepAlive);
//! ```

use crate::error::{Result, StreamError};
use crate::protocol::{FRAME_DELIMITER, MAX_FRAME_LEN};
use bytes::{Bytes, BytesMut};
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// One delimiter-bounded chunk of the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Empty or whitespace-only frame sent to keep the connection alive.
    KeepAlive,
    /// Frame carrying an encoded message.
    Message(Bytes),
}

impl Frame {
    fn classify(bytes: Bytes) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            Frame::KeepAlive
        } else {
            Frame::Message(bytes)
        }
    }
}

/// Splits a byte stream into [`Frame`]s.
///
/// One framer serves exactly one connection; a reconnect starts over with a
/// fresh framer.
#[derive(Debug)]
pub struct LineFramer {
    /// Bytes received but not yet framed
    buffer: BytesMut,
    /// Prefix of `buffer` already searched for a delimiter
    scanned: usize,
    /// Largest frame accepted
    max_frame_len: usize,
}

impl LineFramer {
    /// Create a framer with the default maximum frame length.
    pub fn new() -> Self {
        Self::with_max_frame_len(MAX_FRAME_LEN)
    }

    /// Create a framer rejecting frames longer than `max_frame_len`.
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        LineFramer {
            buffer: BytesMut::with_capacity(8192),
            scanned: 0,
            max_frame_len,
        }
    }

    /// Feed bytes to the framer, returning every frame they complete.
    ///
    /// Fails with [`StreamError::FrameTooLarge`] once the buffered,
    /// undelimited data exceeds the maximum frame length.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Frame>> {
        self.buffer.extend_from_slice(data);
        let mut frames = Vec::new();

        while let Some(pos) = self.find_delimiter() {
            let mut frame = self.buffer.split_to(pos + FRAME_DELIMITER.len());
            frame.truncate(pos);
            self.scanned = 0;
            frames.push(Frame::classify(frame.freeze()));
        }

        if self.buffer.len() > self.max_frame_len {
            return Err(StreamError::FrameTooLarge(self.max_frame_len));
        }

        Ok(frames)
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<Frame> {
        self.scanned = 0;
        if self.buffer.is_empty() {
            return None;
        }
        Some(Frame::classify(self.buffer.split().freeze()))
    }

    /// Number of buffered bytes not yet framed.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Find the next delimiter, resuming where the last search stopped.
    fn find_delimiter(&mut self) -> Option<usize> {
        // Back up one byte in case the previous read ended on '\r'.
        let start = self.scanned.saturating_sub(1);
        let found = self.buffer[start..]
            .windows(FRAME_DELIMITER.len())
            .position(|w| w == FRAME_DELIMITER)
            .map(|p| start + p);
        if found.is_none() {
            self.scanned = self.buffer.len();
        }
        found
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy stream of frames over one connection's response body.
///
/// Ends when the body ends. A body error or an oversized frame is yielded
/// once and then the stream ends.
pub struct FrameStream<S> {
    body: S,
    framer: LineFramer,
    ready: VecDeque<Frame>,
    bytes_read: usize,
    finished: bool,
}

impl<S> FrameStream<S>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    /// Frame `body` with a fresh [`LineFramer`].
    pub fn new(body: S) -> Self {
        Self::with_framer(body, LineFramer::new())
    }

    /// Frame `body` with the given framer.
    pub fn with_framer(body: S, framer: LineFramer) -> Self {
        FrameStream {
            body,
            framer,
            ready: VecDeque::new(),
            bytes_read: 0,
            finished: false,
        }
    }
}

impl<S> FrameStream<S> {
    /// Number of body bytes received so far.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }
}

impl<S> Stream for FrameStream<S>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
{
    type Item = Result<Frame>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if let Some(frame) = this.ready.pop_front() {
                return Poll::Ready(Some(Ok(frame)));
            }
            if this.finished {
                return Poll::Ready(None);
            }

            match ready!(Pin::new(&mut this.body).poll_next(cx)) {
                Some(Ok(chunk)) => {
                    this.bytes_read += chunk.len();
                    match this.framer.feed(&chunk) {
                        Ok(frames) => this.ready.extend(frames),
                        Err(e) => {
                            this.finished = true;
                            return Poll::Ready(Some(Err(e)));
                        }
                    }
                }
                Some(Err(e)) => {
                    this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    this.finished = true;
                    this.ready.extend(this.framer.finish());
                }
            }
        }
    }
}
