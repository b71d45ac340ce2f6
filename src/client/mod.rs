//! Filtered-stream client implementation.
//!
//! This module opens a long-lived filter request and keeps it alive:
//!
//! - **Frames the response body** on `\r\n`, skipping keep-alives
//! - **Decodes messages** into typed [`StreamMessage`](crate::types::StreamMessage) values
//! - **Reconnects automatically** with two-track backoff
//! - **Detects stalls** when no data arrives for 90 seconds
//! - **Reports failures** to an optional error callback that may stop the stream
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch        - StreamClient and the reqwest transport
//! ├── transport    - Transport and RequestSigner seams
//! ├── config       - Client configuration
//! ├── framer       - \r\n line framer over the response body
//! ├── decoder      - Frame to StreamMessage decoding
//! ├── backoff      - Reconnect backoff tracks
//! ├── attempt      - One request/response cycle
//! ├── supervisor   - Reconnect loop
//! └── subscription - FilterStream and StreamHandle
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`StreamClient`] | Opens filtered streams |
//! | [`FilterStream`] | Receives messages and controls one stream |
//! | [`StreamHandle`] | Cloneable `close` / `done` / `err` handle |
//! | [`Backoff`] | Reconnect backoff passed to the error callback |
//! | [`ClientConfig`] | Client configuration options |
//! | [`Transport`] | HTTP seam, implemented by [`HttpTransport`] |
//!
//! # Examples
//!
//! ## Configuring a Client
//!
//! ```
//! use twitter_stream::client::{BearerToken, ClientConfig, StreamClient};
//! use std::time::Duration;
//!
//! let config = ClientConfig::default()
//!     .with_stall_timeout(Duration::from_secs(60))
//!     .with_user_agent("tracker/1.0");
//! let client = StreamClient::http(config, BearerToken::new("token")).unwrap();
//! assert_eq!(client.config().stall_timeout, Duration::from_secs(60));
//! ```
//!
//! ## Framing a Body
//!
//! ```
//! use twitter_stream::client::{Frame, LineFramer};
//!
//! let mut framer = LineFramer::new();
//! let frames = framer.feed(b"\r\n{\"text\":\"hi\"}\r\n{\"te").unwrap();
//! assert_eq!(frames.len(), 2);
//! assert_eq!(frames[0], Frame::KeepAlive);
//! assert_eq!(framer.pending(), 4);
//! ```

mod attempt;
mod backoff;
mod config;
mod decoder;
mod fetch;
mod framer;
mod subscription;
mod supervisor;
mod transport;

use crate::error::StreamError;
use std::sync::Arc;

pub use backoff::Backoff;
pub use config::ClientConfig;
pub use decoder::decode;
pub use fetch::{HttpTransport, StreamClient};
pub use framer::{Frame, FrameStream, LineFramer};
pub use subscription::{FilterStream, MessageStream, StreamHandle};
pub use transport::{
    BearerToken, ByteStream, RequestSigner, StreamRequest, Transport, TransportResponse,
};

/// Callback invoked after every retryable failure, before the backoff sleep.
///
/// Receives the backoff state already updated for this failure, so
/// [`Backoff::next_wait`] is the delay about to be slept. Returning
/// `Some(error)` stops the stream with that error; returning `None` lets it
/// reconnect. The callback runs on the stream task and should return
/// quickly.
pub type ErrorCallback = Arc<dyn Fn(&Backoff, &StreamError) -> Option<StreamError> + Send + Sync>;
