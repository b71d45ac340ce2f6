//! One connection attempt: a single request/response cycle.
//!
//! An attempt sends the filter request, classifies the response status and,
//! on `200`, reads frames off the body until the connection ends. It never
//! touches the backoff state; the supervisor learns what happened from the
//! returned [`AttemptOutcome`].
//!
//! | Status | Outcome |
//! |--------|---------|
//! | 200 | stream until the body ends, then `Dropped` (`streamed` once a byte arrived) |
//! | 401, 403, 404, 406, 413, 416 | `Fatal` |
//! | 420 | `Http` (rate limited) |
//! | other | `Http` |
//! | no response | `Transport` |

use crate::client::decoder::decode;
use crate::client::framer::{Frame, FrameStream};
use crate::client::transport::{StreamRequest, Transport};
use crate::error::StreamError;
use crate::protocol::status;
use crate::types::StreamMessage;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// How a connection attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AttemptOutcome {
    /// No response was received.
    Transport(StreamError),
    /// The server answered 200 and the stream later ended, stalled or broke.
    ///
    /// `streamed` is set once at least one body byte was received.
    Dropped { error: StreamError, streamed: bool },
    /// Retryable non-200 status.
    Http { status: u16, error: StreamError },
    /// Non-retryable status or request setup failure.
    Fatal(StreamError),
    /// Cancellation was observed or the consumer went away.
    Cancelled,
}

/// One request/response cycle against the filter endpoint.
pub(crate) struct ConnectionAttempt<'a> {
    pub(crate) transport: &'a dyn Transport,
    pub(crate) request: StreamRequest,
    pub(crate) stall_timeout: Duration,
    pub(crate) outbound: &'a mpsc::Sender<StreamMessage>,
    pub(crate) cancel: &'a CancellationToken,
}

impl ConnectionAttempt<'_> {
    pub(crate) async fn run(self) -> AttemptOutcome {
        let request = self.request.clone();
        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return AttemptOutcome::Cancelled,
            _ = self.outbound.closed() => return AttemptOutcome::Cancelled,
            result = self.transport.perform(request) => result,
        };

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return match e.status() {
                    Some(code) => classify_status(code, e),
                    None if e.is_fatal() => AttemptOutcome::Fatal(e),
                    None => AttemptOutcome::Transport(e),
                }
            }
        };

        match response.status {
            status::OK => {
                info!("Stream established: {}", self.request.url);
                self.read_messages(FrameStream::new(response.body)).await
            }
            code => classify_status(code, StreamError::http(code)),
        }
    }

    /// Forward decoded messages until the connection ends.
    async fn read_messages<S>(&self, mut frames: FrameStream<S>) -> AttemptOutcome
    where
        S: futures::Stream<Item = crate::error::Result<bytes::Bytes>> + Unpin,
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return AttemptOutcome::Cancelled,
                _ = self.outbound.closed() => return AttemptOutcome::Cancelled,
                next = tokio::time::timeout(self.stall_timeout, frames.next()) => next,
            };

            let frame = match next {
                Err(_) => {
                    debug!("No data for {:?}, dropping connection", self.stall_timeout);
                    return dropped(&frames, StreamError::Stalled(self.stall_timeout));
                }
                Ok(None) => return dropped(&frames, StreamError::ConnectionClosed),
                Ok(Some(Err(e))) => return dropped(&frames, e),
                Ok(Some(Ok(frame))) => frame,
            };

            let payload = match frame {
                Frame::KeepAlive => {
                    trace!("Keep-alive");
                    continue;
                }
                Frame::Message(payload) => payload,
            };

            let message = match decode(&payload) {
                Ok(message) => message,
                Err(e) => return dropped(&frames, e),
            };

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return AttemptOutcome::Cancelled,
                sent = self.outbound.send(message) => {
                    if sent.is_err() {
                        return AttemptOutcome::Cancelled;
                    }
                }
            }
        }
    }
}

/// Outcome of a non-200 status, whether read off the wire or reported by the transport.
fn classify_status(code: u16, error: StreamError) -> AttemptOutcome {
    if status::is_fatal(code) {
        AttemptOutcome::Fatal(error)
    } else {
        AttemptOutcome::Http {
            status: code,
            error,
        }
    }
}

fn dropped<S>(frames: &FrameStream<S>, error: StreamError) -> AttemptOutcome {
    AttemptOutcome::Dropped {
        error,
        streamed: frames.bytes_read() > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::{ByteStream, TransportResponse};
    use crate::error::Result;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::BTreeMap;

    struct OneShot {
        status: u16,
        chunks: Vec<&'static str>,
    }

    #[async_trait]
    impl Transport for OneShot {
        async fn perform(&self, _request: StreamRequest) -> Result<TransportResponse> {
            let chunks: Vec<Result<Bytes>> = self
                .chunks
                .iter()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect();
            let body: ByteStream = Box::pin(futures::stream::iter(chunks));
            Ok(TransportResponse::new(self.status, BTreeMap::new(), body))
        }
    }

    /// Fails every request with the given error.
    struct Failing(StreamError);

    #[async_trait]
    impl Transport for Failing {
        async fn perform(&self, _request: StreamRequest) -> Result<TransportResponse> {
            Err(self.0.clone())
        }
    }

    async fn run(transport: &dyn Transport, tx: &mpsc::Sender<StreamMessage>) -> AttemptOutcome {
        let cancel = CancellationToken::new();
        ConnectionAttempt {
            transport,
            request: StreamRequest::post("http://localhost/filter.json", vec![]),
            stall_timeout: Duration::from_secs(90),
            outbound: tx,
            cancel: &cancel,
        }
        .run()
        .await
    }

    #[tokio::test]
    async fn test_streams_until_body_ends() {
        let transport = OneShot {
            status: 200,
            chunks: vec!["{\"text\":\"one\"}\r\n\r\n{\"te", "xt\":\"two\"}\r\n"],
        };
        let (tx, mut rx) = mpsc::channel(8);
        let outcome = run(&transport, &tx).await;
        assert_eq!(
            outcome,
            AttemptOutcome::Dropped {
                error: StreamError::ConnectionClosed,
                streamed: true
            }
        );
        assert_eq!(rx.recv().await.unwrap().as_tweet().unwrap().text, "one");
        assert_eq!(rx.recv().await.unwrap().as_tweet().unwrap().text, "two");
    }

    #[tokio::test]
    async fn test_corrupt_frame_drops_connection() {
        let transport = OneShot {
            status: 200,
            chunks: vec!["{\"text\":\"ok\"}\r\n{oops\r\n{\"text\":\"never\"}\r\n"],
        };
        let (tx, mut rx) = mpsc::channel(8);
        let outcome = run(&transport, &tx).await;
        assert!(matches!(
            outcome,
            AttemptOutcome::Dropped {
                error: StreamError::Decode(_),
                streamed: true
            }
        ));
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_status_classification() {
        let (tx, _rx) = mpsc::channel(1);
        for status in [401, 403, 404, 406, 413, 416] {
            let outcome = run(&OneShot { status, chunks: vec![] }, &tx).await;
            assert_eq!(outcome, AttemptOutcome::Fatal(StreamError::http(status)));
        }
        for status in [420, 500, 503, 429] {
            let outcome = run(&OneShot { status, chunks: vec![] }, &tx).await;
            assert_eq!(
                outcome,
                AttemptOutcome::Http {
                    status,
                    error: StreamError::http(status)
                }
            );
        }
    }

    #[tokio::test]
    async fn test_empty_body_has_not_streamed() {
        let (tx, _rx) = mpsc::channel(1);
        let outcome = run(&OneShot { status: 200, chunks: vec![] }, &tx).await;
        assert_eq!(
            outcome,
            AttemptOutcome::Dropped {
                error: StreamError::ConnectionClosed,
                streamed: false
            }
        );
    }

    #[tokio::test]
    async fn test_transport_error() {
        let (tx, _rx) = mpsc::channel(1);
        let refused = Failing(StreamError::Transport("connection refused".into()));
        let outcome = run(&refused, &tx).await;
        assert!(matches!(outcome, AttemptOutcome::Transport(_)));

        let unsigned = Failing(StreamError::Signing("no signer".into()));
        assert_eq!(
            run(&unsigned, &tx).await,
            AttemptOutcome::Fatal(StreamError::Signing("no signer".into()))
        );
    }

    #[tokio::test]
    async fn test_status_error_from_transport_is_classified_by_status() {
        let (tx, _rx) = mpsc::channel(1);
        assert_eq!(
            run(&Failing(StreamError::http(503)), &tx).await,
            AttemptOutcome::Http {
                status: 503,
                error: StreamError::http(503)
            }
        );
        assert_eq!(
            run(&Failing(StreamError::http(401)), &tx).await,
            AttemptOutcome::Fatal(StreamError::http(401))
        );
    }

    #[tokio::test]
    async fn test_dropped_receiver_cancels() {
        let transport = OneShot {
            status: 200,
            chunks: vec!["{\"text\":\"one\"}\r\n"],
        };
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        assert_eq!(run(&transport, &tx).await, AttemptOutcome::Cancelled);
    }
}
