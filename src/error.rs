//! Error types for filtered-stream operations.
//!
//! Every failure the stream can run into is a [`StreamError`]. Most of them
//! never reach the caller directly: retryable failures are absorbed by the
//! reconnect loop and only surface through the optional error callback. The
//! error that ends a stream is available from `err()` once `done()` fires.
//!
//! # Error Categories
//!
//! | Category | Variants | Retryable |
//! |----------|----------|-----------|
//! | Network | `Transport`, `Body`, `ConnectionClosed`, `Stalled` | Yes |
//! | HTTP | `Http` | Depends on status |
//! | Corruption | `Decode`, `FrameTooLarge` | Yes (connection is dropped) |
//! | Shutdown | `Cancelled`, `ReceiverDropped`, `Callback` | No |
//! | Setup | `Config`, `Signing`, `Internal` | No |
//!
//! # Examples
//!
//! ```
//! use twitter_stream::StreamError;
//!
//! let err = StreamError::Http { status: 403, reason: "Forbidden".into() };
//! assert!(err.is_fatal());
//! assert_eq!(err.to_string(), "403: Forbidden");
//!
//! let err = StreamError::Http { status: 503, reason: "Service Unavailable".into() };
//! assert!(err.is_retryable());
//! ```

use crate::protocol::status;
use std::time::Duration;
use thiserror::Error;

/// Result type for stream operations.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Errors that can occur while running a filtered stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StreamError {
    /// The request never produced a response (DNS, TCP, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-200 status code.
    #[error("{status}: {reason}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// Reading the response body failed mid-stream.
    #[error("body read error: {0}")]
    Body(String),

    /// The server ended the response body.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// No frame, keep-alives included, arrived within the stall timeout.
    #[error("stream stalled: no data for {0:?}")]
    Stalled(Duration),

    /// A frame grew past the maximum frame length without a delimiter.
    #[error("frame exceeds {0} bytes without a delimiter")]
    FrameTooLarge(usize),

    /// A frame was not a valid stream message.
    #[error("decode error: {0}")]
    Decode(String),

    /// The stream was closed by the caller.
    #[error("stream cancelled")]
    Cancelled,

    /// Every message receiver was dropped.
    #[error("message receiver dropped")]
    ReceiverDropped,

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The request could not be signed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Error returned by an error callback to stop the stream.
    #[error("{0}")]
    Callback(String),

    /// Unexpected internal state.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StreamError {
    /// Build an HTTP error with the canonical reason phrase for `status`.
    pub fn http(status: u16) -> Self {
        StreamError::Http {
            status,
            reason: status::reason(status).to_string(),
        }
    }

    /// Check if the reconnect loop keeps going after this error.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Http { status: code, .. } => !status::is_fatal(*code),
            StreamError::Transport(_)
            | StreamError::Body(_)
            | StreamError::ConnectionClosed
            | StreamError::Stalled(_)
            | StreamError::FrameTooLarge(_)
            | StreamError::Decode(_) => true,
            _ => false,
        }
    }

    /// Check if this error ends the stream as a fault.
    ///
    /// Caller cancellation is not a fault.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable() && !self.is_cancelled()
    }

    /// Check if the stream ended because the caller asked it to.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled | StreamError::ReceiverDropped)
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StreamError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for StreamError {
    fn from(err: url::ParseError) -> Self {
        StreamError::Config(err.to_string())
    }
}
