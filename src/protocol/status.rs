//! Response status codes of the streaming endpoint.
//!
//! | Status | Meaning | Reconnect |
//! |--------|---------|-----------|
//! | `200` | Stream open | after the body ends |
//! | `401 403 404 406 413 416` | Request or credentials invalid | never |
//! | `420` | Rate limited | HTTP track, from 60s |
//! | anything else | Server-side failure | HTTP track, from 5s |

/// The stream opened.
pub const OK: u16 = 200;

/// Too many connection attempts in a short time.
pub const RATE_LIMITED: u16 = 420;

/// Statuses meaning the request itself is wrong and retrying cannot help.
pub const FATAL: [u16; 6] = [401, 403, 404, 406, 413, 416];

/// Check if a status ends the stream without retrying.
///
/// # Examples
///
/// ```
/// use twitter_stream::protocol::status;
///
/// assert!(status::is_fatal(401));
/// assert!(!status::is_fatal(420));
/// assert!(!status::is_fatal(503));
/// ```
#[inline]
pub fn is_fatal(status: u16) -> bool {
    FATAL.contains(&status)
}

/// Reason phrase for a status, including the non-standard `420`.
pub fn reason(status: u16) -> &'static str {
    match status {
        RATE_LIMITED => "Rate Limited",
        _ => http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown Status"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_phrases() {
        assert_eq!(reason(420), "Rate Limited");
        assert_eq!(reason(403), "Forbidden");
        assert_eq!(reason(599), "Unknown Status");
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [400, 408, 429, 500, 502, 503, 504] {
            assert!(!is_fatal(status));
        }
    }
}
