//! Reconnect loop of a filtered stream.
//!
//! The supervisor is the only owner of the stream's [`Backoff`]. It runs
//! connection attempts one after another, feeds each outcome into the
//! backoff tracks, reports retryable failures to the error callback and
//! sleeps between attempts:
//!
//! ```text
//! Connecting ──200──▶ Streaming ──ends/stalls──▶ Backoff Wait ──▶ Connecting
//!     │                                              ▲
//!     ├──retryable status / no response──────────────┘
//!     └──fatal status / callback override / cancel──▶ Closed
//! ```
//!
//! Every wait selects against cancellation, so `close()` never waits out a
//! backoff sleep.

use crate::client::attempt::{AttemptOutcome, ConnectionAttempt};
use crate::client::backoff::Backoff;
use crate::client::subscription::StreamState;
use crate::client::transport::{StreamRequest, Transport};
use crate::client::ErrorCallback;
use crate::error::StreamError;
use crate::protocol::status::RATE_LIMITED;
use crate::types::StreamMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

pub(crate) struct Supervisor {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) request: StreamRequest,
    pub(crate) stall_timeout: Duration,
    pub(crate) enable_logging: bool,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) outbound: mpsc::Sender<StreamMessage>,
    pub(crate) cancel: CancellationToken,
    pub(crate) state: watch::Sender<StreamState>,
}

impl Supervisor {
    /// Run until the stream terminates, then publish the terminal error.
    pub(crate) async fn run(self) {
        let error = self.supervise().await;

        let Supervisor {
            outbound,
            cancel,
            state,
            ..
        } = self;
        cancel.cancel();
        // No message may be sent once the stream reports itself closed.
        drop(outbound);
        debug!("Stream closed: {}", error);
        state.send_replace(StreamState::Closed(error));
    }

    async fn supervise(&self) -> StreamError {
        let mut backoff = Backoff::default();

        loop {
            let outcome = ConnectionAttempt {
                transport: self.transport.as_ref(),
                request: self.request.clone(),
                stall_timeout: self.stall_timeout,
                outbound: &self.outbound,
                cancel: &self.cancel,
            }
            .run()
            .await;

            if self.shutdown_requested() {
                return self.shutdown_error();
            }

            let err = match outcome {
                AttemptOutcome::Cancelled => return self.shutdown_error(),
                AttemptOutcome::Fatal(err) => {
                    error!("Stream rejected, not retrying: {}", err);
                    return err;
                }
                AttemptOutcome::Transport(err) => {
                    backoff.inc_network_delay();
                    err
                }
                AttemptOutcome::Dropped { error, streamed } => {
                    // Data arrived, so this is the first failure of a new run.
                    if streamed {
                        backoff.reset();
                    }
                    backoff.inc_network_delay();
                    error
                }
                AttemptOutcome::Http { status, error } => {
                    backoff.inc_http_delay(status == RATE_LIMITED);
                    error
                }
            };

            if self.enable_logging {
                warn!(
                    "Stream failed (retry {}), reconnecting after {:?}: {}",
                    backoff.retries() + 1,
                    backoff.next_wait(),
                    err
                );
            }

            if let Some(stop) = self.notify_error(&backoff, &err) {
                error!("Error callback stopped the stream: {}", stop);
                return stop;
            }

            let delay = backoff.wait();
            if delay.is_zero() {
                continue;
            }
            debug!("Sleeping {:?} before reconnecting", delay);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return self.shutdown_error(),
                _ = self.outbound.closed() => return self.shutdown_error(),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Invoke the error callback, if any.
    ///
    /// Runs on the stream task; the next reconnect waits for it to return.
    fn notify_error(&self, backoff: &Backoff, err: &StreamError) -> Option<StreamError> {
        self.on_error.as_ref().and_then(|callback| callback(backoff, err))
    }

    fn shutdown_requested(&self) -> bool {
        self.cancel.is_cancelled() || self.outbound.is_closed()
    }

    fn shutdown_error(&self) -> StreamError {
        if self.cancel.is_cancelled() {
            StreamError::Cancelled
        } else if self.outbound.is_closed() {
            StreamError::ReceiverDropped
        } else {
            StreamError::Internal("attempt cancelled without a shutdown request".to_string())
        }
    }
}
