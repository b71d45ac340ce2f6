//! The transport seam between the stream and the network.
//!
//! The stream only needs one capability: "perform a signed HTTP request and
//! give me the status, headers and a streaming body". [`Transport`] is that
//! capability. [`HttpTransport`](crate::client::HttpTransport) implements it on
//! top of `reqwest`; tests substitute scripted transports.
//!
//! Cancellation is done by dropping: the stream drops the pending `perform`
//! future or the response body when it shuts down or abandons a connection.

use crate::error::{Result, StreamError};
use crate::types::AccessCredentials;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::Method;
use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

/// Streaming response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A request to open a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    /// HTTP method.
    pub method: Method,
    /// Full request URL.
    pub url: String,
    /// Credentials replacing the signer's defaults for this request.
    pub credentials: Option<AccessCredentials>,
    /// Form fields, sent as the body (or the query string for GET).
    pub form: Vec<(String, String)>,
}

impl StreamRequest {
    /// Create a POST request with a form body.
    pub fn post(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        StreamRequest {
            method: Method::POST,
            url: url.into(),
            credentials: None,
            form,
        }
    }

    /// Use `credentials` instead of the signer's defaults.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<AccessCredentials>) -> Self {
        self.credentials = credentials;
        self
    }
}

/// Response to a [`StreamRequest`] with a body that has not been read yet.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Response body, read incrementally.
    pub body: ByteStream,
}

impl TransportResponse {
    /// Create a response from its parts.
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: ByteStream) -> Self {
        TransportResponse {
            status,
            headers,
            body,
        }
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Performs signed HTTP requests with streaming bodies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return as soon as the response head is available.
    ///
    /// An `Err` means no response was received at all.
    async fn perform(&self, request: StreamRequest) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn perform(&self, request: StreamRequest) -> Result<TransportResponse> {
        (**self).perform(request).await
    }
}

/// Produces the `Authorization` header for a request.
///
/// OAuth 1.0a signing lives behind this trait; the stream treats it as a
/// black box.
pub trait RequestSigner: Send + Sync {
    /// Authorization header value for `request`.
    fn authorization(&self, request: &StreamRequest) -> Result<String>;
}

/// Signs every request with a fixed bearer token.
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    /// Create a signer from a bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        BearerToken {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl RequestSigner for BearerToken {
    fn authorization(&self, request: &StreamRequest) -> Result<String> {
        if request.credentials.is_some() {
            return Err(StreamError::Signing(
                "bearer tokens cannot sign with user access credentials".to_string(),
            ));
        }
        if self.token.is_empty() {
            return Err(StreamError::Signing("empty bearer token".to_string()));
        }
        Ok(format!("Bearer {}", self.token))
    }
}
