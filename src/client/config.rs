//! Configuration for the stream client.
//!
//! # Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `endpoint` | public filter endpoint | URL the filter request is sent to |
//! | `stall_timeout` | 90s | Inactivity window before a connection is dropped |
//! | `connect_timeout_ms` | 30000 | TCP/TLS connect timeout |
//! | `gzip` | true | Ask for a gzip-compressed stream |
//! | `proxy_url` | empty | Optional proxy for all requests |
//! | `user_agent` | crate name/version | `User-Agent` header |
//! | `enable_logging` | true | Log every retryable failure at warn level |
//!
//! # Examples
//!
//! ```
//! use twitter_stream::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::default()
//!     .with_endpoint("https://stream.example.com/filter.json")
//!     .with_stall_timeout(Duration::from_secs(30));
//! assert!(config.validate().is_ok());
//!
//! let config = ClientConfig {
//!     gzip: false,
//!     ..Default::default()
//! };
//! assert_eq!(config.stall_timeout, Duration::from_secs(90));
//! ```

use crate::error::{Result, StreamError};
use crate::protocol;
use std::time::Duration;
use url::Url;

/// Configuration for the stream client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Filter endpoint URL.
    pub endpoint: String,

    /// Inactivity window after which the current connection is torn down and
    /// retried.
    ///
    /// Keep-alives count as activity.
    pub stall_timeout: Duration,

    /// Connection timeout in milliseconds.
    ///
    /// Only the connect phase is bounded; the response body is read for as
    /// long as the stream lives.
    pub connect_timeout_ms: u64,

    /// Request a gzip-compressed stream.
    pub gzip: bool,

    /// Proxy URL (optional).
    ///
    /// If set, requests will be routed through this proxy.
    pub proxy_url: String,

    /// `User-Agent` header value.
    pub user_agent: String,

    /// Enable failure logging.
    ///
    /// When enabled, every retryable failure is logged at warn level using
    /// the `tracing` crate.
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: protocol::FILTER_ENDPOINT.to_string(),
            stall_timeout: protocol::STALL_TIMEOUT,
            connect_timeout_ms: 30_000,
            gzip: true,
            proxy_url: String::new(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            enable_logging: true,
        }
    }
}

impl ClientConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim().to_string();
        self
    }

    /// Set the stall timeout.
    #[must_use]
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = timeout;
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable or disable gzip.
    #[must_use]
    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    /// Route requests through a proxy.
    #[must_use]
    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy_url = proxy_url.into();
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable or disable failure logging.
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Check that the configuration can be used to open a stream.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StreamError::Config(format!(
                "endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.stall_timeout.is_zero() {
            return Err(StreamError::Config(
                "stall_timeout must be greater than zero".to_string(),
            ));
        }
        if !self.proxy_url.is_empty() {
            Url::parse(&self.proxy_url)?;
        }
        Ok(())
    }
}
