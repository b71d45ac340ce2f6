//! Reconnect backoff for the filtered stream.
//!
//! Two independent tracks decide how long to wait before reconnecting:
//!
//! | Track | Start | Growth | Cap |
//! |-------|-------|--------|-----|
//! | Network (no response, dropped connection) | 250ms | +250ms | 16s |
//! | HTTP (non-200 status) | 5s (60s for 420) | x2 | 320s |
//!
//! Transient network trouble backs off gently while repeated server-side
//! rejection backs off hard. Both tracks reset once a connection is
//! established.

use std::time::Duration;

/// Reconnect backoff state of a stream.
///
/// The error callback receives a read-only view of the stream's backoff; only
/// the stream's own reconnect loop can change it.
///
/// # Examples
///
/// ```
/// use twitter_stream::Backoff;
/// use std::time::Duration;
///
/// let backoff = Backoff::default();
/// assert_eq!(backoff.next_wait(), Duration::ZERO);
/// assert_eq!(backoff.retries(), 0);
/// assert_eq!(Backoff::MAX_NETWORK_DELAY, Duration::from_secs(16));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Backoff {
    network_delay: Duration,
    http_delay: Duration,
    waited: Duration,
    retries: u32,
}

impl Backoff {
    /// Increment of the network track per consecutive network failure.
    pub const NETWORK_DELAY_STEP: Duration = Duration::from_millis(250);
    /// Upper bound of the network track.
    pub const MAX_NETWORK_DELAY: Duration = Duration::from_secs(16);
    /// First delay of the HTTP track.
    pub const HTTP_INITIAL_DELAY: Duration = Duration::from_secs(5);
    /// First delay of the HTTP track when the server answered 420.
    pub const RATE_LIMITED_INITIAL_DELAY: Duration = Duration::from_secs(60);
    /// Upper bound of the HTTP track.
    pub const MAX_HTTP_DELAY: Duration = Duration::from_secs(320);

    /// Duration the stream will wait before reconnecting.
    pub fn next_wait(&self) -> Duration {
        self.network_delay.max(self.http_delay)
    }

    /// Total time waited since the last established connection, not
    /// counting `next_wait()`.
    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Number of retries since the last established connection.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Current value of the network track.
    pub fn network_delay(&self) -> Duration {
        self.network_delay
    }

    /// Current value of the HTTP track.
    pub fn http_delay(&self) -> Duration {
        self.http_delay
    }

    pub(crate) fn reset(&mut self) {
        *self = Backoff::default();
    }

    /// Take the upcoming wait, recording it as waited and counting a retry.
    pub(crate) fn wait(&mut self) -> Duration {
        let wait = self.next_wait();
        self.waited += wait;
        self.retries += 1;
        wait
    }

    pub(crate) fn inc_network_delay(&mut self) {
        self.network_delay =
            (self.network_delay + Self::NETWORK_DELAY_STEP).min(Self::MAX_NETWORK_DELAY);
    }

    pub(crate) fn inc_http_delay(&mut self, rate_limited: bool) {
        if self.http_delay.is_zero() {
            self.http_delay = if rate_limited {
                Self::RATE_LIMITED_INITIAL_DELAY
            } else {
                Self::HTTP_INITIAL_DELAY
            };
            return;
        }
        self.http_delay = self.http_delay.saturating_mul(2).min(Self::MAX_HTTP_DELAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_track_grows_linearly() {
        let mut backoff = Backoff::default();
        let mut waits = Vec::new();
        for _ in 0..3 {
            backoff.inc_network_delay();
            waits.push(backoff.wait());
        }
        assert_eq!(
            waits,
            vec![
                Duration::from_millis(250),
                Duration::from_millis(500),
                Duration::from_millis(750)
            ]
        );
        assert_eq!(backoff.retries(), 3);
        assert_eq!(backoff.waited(), Duration::from_millis(1500));
    }

    #[test]
    fn test_network_track_is_capped() {
        let mut backoff = Backoff::default();
        let mut previous = Duration::ZERO;
        for _ in 0..200 {
            backoff.inc_network_delay();
            let next = backoff.next_wait();
            assert!(next >= previous);
            assert!(next <= Backoff::MAX_NETWORK_DELAY);
            previous = next;
        }
        assert_eq!(previous, Backoff::MAX_NETWORK_DELAY);
    }

    #[test]
    fn test_http_track_doubles_from_five_seconds() {
        let mut backoff = Backoff::default();
        let expected = [5, 10, 20, 40, 80, 160, 320, 320, 320];
        for secs in expected {
            backoff.inc_http_delay(false);
            assert_eq!(backoff.next_wait(), Duration::from_secs(secs));
        }
    }

    #[test]
    fn test_rate_limited_starts_at_sixty_seconds() {
        let mut backoff = Backoff::default();
        backoff.inc_http_delay(true);
        assert_eq!(backoff.next_wait(), Duration::from_secs(60));
        backoff.inc_http_delay(true);
        assert_eq!(backoff.next_wait(), Duration::from_secs(120));
    }

    #[test]
    fn test_next_wait_is_max_of_tracks() {
        let mut backoff = Backoff::default();
        backoff.inc_network_delay();
        backoff.inc_http_delay(false);
        assert_eq!(backoff.next_wait(), Duration::from_secs(5));
        assert_eq!(backoff.network_delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut backoff = Backoff::default();
        backoff.inc_http_delay(true);
        backoff.inc_network_delay();
        backoff.wait();
        backoff.reset();
        assert_eq!(backoff, Backoff::default());

        backoff.inc_network_delay();
        assert_eq!(backoff.next_wait(), Backoff::NETWORK_DELAY_STEP);
    }

    #[test]
    fn test_wait_without_failures_is_zero() {
        let mut backoff = Backoff::default();
        assert_eq!(backoff.wait(), Duration::ZERO);
        assert_eq!(backoff.retries(), 1);
    }
}
