//! Wire-level constants and encoding helpers for the streaming API.
//!
//! | Item | Value |
//! |------|-------|
//! | Filter endpoint | `https://stream.twitter.com/1.1/statuses/filter.json` |
//! | Frame delimiter | `\r\n` |
//! | Request body | `application/x-www-form-urlencoded` |
//! | Stall timeout | 90 seconds without any frame |

pub mod form;
pub mod status;

pub use form::{format_list, parse_list};

use std::time::Duration;

/// Public filtered-stream endpoint.
pub const FILTER_ENDPOINT: &str = "https://stream.twitter.com/1.1/statuses/filter.json";

/// Bytes separating two frames on the wire.
pub const FRAME_DELIMITER: &[u8; 2] = b"\r\n";

/// Largest frame accepted before the stream is considered corrupt.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Inactivity window after which a connection is considered dead.
///
/// The server sends keep-alives well within this window.
pub const STALL_TIMEOUT: Duration = Duration::from_secs(90);

/// Content type of the filter request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Form field names used by the filter request.
pub mod fields {
    /// Minimum filter level of delivered tweets.
    pub const FILTER_LEVEL: &str = "filter_level";
    /// Ask the server for stall warnings.
    pub const STALL_WARNINGS: &str = "stall_warnings";
    /// User IDs to follow.
    pub const FOLLOW: &str = "follow";
    /// Languages to match.
    pub const LANGUAGE: &str = "language";
    /// Bounding boxes to match.
    pub const LOCATIONS: &str = "locations";
    /// Keywords to track.
    pub const TRACK: &str = "track";
}
