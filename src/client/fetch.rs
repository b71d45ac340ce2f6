//! Stream client and its HTTP transport.
//!
//! Provides [`StreamClient`], the entry point for opening filtered streams,
//! and [`HttpTransport`], the `reqwest`-backed [`Transport`] it normally uses.
//!
//! # Examples
//!
//! ## Tracking keywords
//!
//! ```ignore
//! use twitter_stream::{BearerToken, ClientConfig, FilterParams, StreamClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StreamClient::http(ClientConfig::default(), BearerToken::new("token"))?;
//!     let mut stream = client.filter(FilterParams::new().track(["rust"]), None);
//!
//!     while let Some(message) = stream.recv().await {
//!         if let Some(tweet) = message.as_tweet() {
//!             println!("{}", tweet.text);
//!         }
//!     }
//!
//!     match stream.close().await {
//!         Err(e) if !e.is_cancelled() => Err(e.into()),
//!         _ => Ok(()),
//!     }
//! }
//! ```
//!
//! ## Stopping after repeated failures
//!
//! ```ignore
//! use std::sync::Arc;
//! use twitter_stream::{FilterParams, StreamError};
//!
//! let on_error = Arc::new(|backoff: &twitter_stream::Backoff, err: &StreamError| {
//!     eprintln!("retry {} in {:?}: {}", backoff.retries(), backoff.next_wait(), err);
//!     (backoff.retries() >= 10).then(|| StreamError::Callback("too many retries".into()))
//! });
//! let stream = client.filter(FilterParams::new().track(["rust"]), Some(on_error));
//! ```

use crate::client::config::ClientConfig;
use crate::client::subscription::{FilterStream, StreamHandle, StreamState};
use crate::client::supervisor::Supervisor;
use crate::client::transport::{
    ByteStream, RequestSigner, StreamRequest, Transport, TransportResponse,
};
use crate::client::ErrorCallback;
use crate::error::{Result, StreamError};
use crate::protocol;
use crate::types::{AccessCredentials, FilterParams};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Client for the filtered streaming API.
///
/// Cheap to clone. Each call to [`StreamClient::filter`] starts an
/// independent stream with its own connection and backoff.
#[derive(Clone)]
pub struct StreamClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    credentials: Option<AccessCredentials>,
}

impl StreamClient {
    /// Create a client over any transport.
    pub fn new(transport: impl Transport + 'static, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(StreamClient {
            transport: Arc::new(transport),
            config: Arc::new(config),
            credentials: None,
        })
    }

    /// Create a client backed by [`HttpTransport`].
    pub fn http(config: ClientConfig, signer: impl RequestSigner + 'static) -> Result<Self> {
        let transport = HttpTransport::with_config(&config, Some(Arc::new(signer)))?;
        Self::new(transport, config)
    }

    /// Copy of this client that signs its requests with `credentials`.
    #[must_use]
    pub fn with_credentials(&self, credentials: AccessCredentials) -> Self {
        StreamClient {
            credentials: Some(credentials),
            ..self.clone()
        }
    }

    /// Start a filtered stream.
    ///
    /// Returns immediately; connecting happens on a background task, so this
    /// must be called from within a tokio runtime.
    ///
    /// `on_error` is called on the stream task after every retryable failure,
    /// with the backoff that is about to be applied. Returning `Some(error)`
    /// stops the stream with that error. The callback must not block for long:
    /// reconnecting waits for it.
    pub fn filter(&self, params: FilterParams, on_error: Option<ErrorCallback>) -> FilterStream {
        let request = StreamRequest::post(self.config.endpoint.clone(), params.to_form())
            .with_credentials(self.credentials.clone());

        let (tx, rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(StreamState::Running);
        let cancel = CancellationToken::new();

        let supervisor = Supervisor {
            transport: Arc::clone(&self.transport),
            request,
            stall_timeout: self.config.stall_timeout,
            enable_logging: self.config.enable_logging,
            on_error,
            outbound: tx,
            cancel: cancel.clone(),
            state: state_tx,
        };
        tokio::spawn(supervisor.run());

        FilterStream::new(rx, StreamHandle::new(cancel, state_rx))
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// [`Transport`] over `reqwest` with streaming response bodies.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl HttpTransport {
    /// Create an unsigned transport with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default(), None)
    }

    /// Create a transport from the client configuration.
    pub fn with_config(
        config: &ClientConfig,
        signer: Option<Arc<dyn RequestSigner>>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .gzip(config.gzip)
            .user_agent(config.user_agent.clone());

        if !config.proxy_url.is_empty() {
            let url = url::Url::parse(&config.proxy_url)
                .map_err(|e| StreamError::Config(format!("invalid proxy: {}", e)))?;
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| StreamError::Config(format!("invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(HttpTransport {
            client: builder.build()?,
            signer,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: StreamRequest) -> Result<TransportResponse> {
        let mut req_builder = self.client.request(request.method.clone(), &request.url);

        req_builder = if matches!(request.method, Method::GET | Method::HEAD) {
            req_builder.query(&request.form)
        } else {
            req_builder
                .header(CONTENT_TYPE, protocol::FORM_CONTENT_TYPE)
                .form(&request.form)
        };

        if let Some(signer) = &self.signer {
            req_builder = req_builder.header(AUTHORIZATION, signer.authorization(&request)?);
        } else if request.credentials.is_some() {
            return Err(StreamError::Signing(
                "access credentials given but no signer configured".to_string(),
            ));
        }

        let response = req_builder.send().await?;
        let status = response.status().as_u16();

        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_string(), val.to_string());
            }
        }

        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| StreamError::Body(e.to_string()))),
        );

        Ok(TransportResponse::new(status, headers, body))
    }
}
