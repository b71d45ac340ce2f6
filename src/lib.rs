#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # twitter_stream: filtered streaming API client
//!
//! This crate opens a long-lived connection to the filtered streaming
//! endpoint and keeps it alive for as long as the caller wants messages.
//!
//! ## Overview
//!
//! A filtered stream goes through a small reconnect loop:
//!
//! 1. **Connect** - send the filter request as a form-encoded POST
//! 2. **Stream** - split the body on `\r\n`, skip keep-alives, decode each frame
//! 3. **Back off** - on failure, wait on the network or HTTP backoff track
//! 4. **Close** - on a fatal status, a callback override or `close()`
//!
//! Messages are delivered through a bounded channel. The stream task never
//! buffers more than one decoded message, so a slow reader pushes back on the
//! connection.
//!
//! ## Key Features
//!
//! - **Typed Messages**: tweets and control notices (`delete`, `limit`,
//!   `disconnect`, `warning`, ...) as a single [`StreamMessage`] enum
//! - **Stall Detection**: the connection is dropped after 90 seconds without data
//! - **Two-Track Backoff**:
//!   - network failures: +250ms per failure, capped at 16s
//!   - HTTP failures: 5s (60s for `420`), doubling, capped at 320s
//! - **Error Callback**: observe every retryable failure and optionally stop
//! - **Prompt Shutdown**: `close()` interrupts any in-progress wait
//!
//! ## Client Usage
//!
//! ```ignore
//! use twitter_stream::{BearerToken, ClientConfig, FilterParams, StreamClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StreamClient::http(ClientConfig::default(), BearerToken::new("token"))?;
//!     let mut stream = client.filter(FilterParams::new().track(["rust", "tokio"]), None);
//!
//!     while let Some(message) = stream.recv().await {
//!         if let Some(tweet) = message.as_tweet() {
//!             println!("@{}: {}", tweet.user.as_ref().map_or("?", |u| &u.screen_name), tweet.best_text());
//!         }
//!     }
//!
//!     println!("stream ended: {:?}", stream.err());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[types]** - Filter parameters, credentials and stream messages
//! - **[error]** - Error types and result handling
//! - **[client]** - Stream client, framing, decoding and reconnect logic
//! - **[protocol]** - Endpoint constants, form encoding and status codes

pub mod client;
pub mod error;
pub mod protocol;
pub mod types;

pub use client::{
    Backoff, BearerToken, ClientConfig, ErrorCallback, FilterStream, HttpTransport, MessageStream,
    RequestSigner, StreamClient, StreamHandle, Transport,
};
pub use error::{Result, StreamError};
pub use types::{AccessCredentials, BoundingBox, FilterLevel, FilterParams, StreamMessage, Tweet};
