//! Messages delivered by the filtered stream.
//!
//! A [`StreamMessage`] always holds exactly one kind of event. Values are only
//! produced by the frame decoder; see [`crate::client::decode`].

use serde::Deserialize;
use serde_json::{Map, Value};

/// One event read off the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// A tweet matching the filter.
    Tweet(Box<Tweet>),
    /// A tweet was deleted.
    Delete(DeleteNotice),
    /// Geolocation data must be removed from a range of tweets.
    ScrubGeo(ScrubGeoNotice),
    /// More tweets matched than the rate limit lets through.
    Limit(LimitNotice),
    /// A tweet was withheld in some countries.
    StatusWithheld(StatusWithheldNotice),
    /// A user's tweets were withheld in some countries.
    UserWithheld(UserWithheldNotice),
    /// The server is about to close the connection.
    Disconnect(DisconnectNotice),
    /// The client is falling behind and may be disconnected.
    Warning(StallWarning),
}

impl StreamMessage {
    /// The tweet carried by this message, if it is one.
    pub fn as_tweet(&self) -> Option<&Tweet> {
        match self {
            StreamMessage::Tweet(tweet) => Some(tweet),
            _ => None,
        }
    }

    /// Short name of the message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamMessage::Tweet(_) => "tweet",
            StreamMessage::Delete(_) => "delete",
            StreamMessage::ScrubGeo(_) => "scrub_geo",
            StreamMessage::Limit(_) => "limit",
            StreamMessage::StatusWithheld(_) => "status_withheld",
            StreamMessage::UserWithheld(_) => "user_withheld",
            StreamMessage::Disconnect(_) => "disconnect",
            StreamMessage::Warning(_) => "warning",
        }
    }
}

/// A tweet.
///
/// Commonly used fields are typed; everything else is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tweet {
    /// Numeric ID.
    pub id: i64,
    /// String ID.
    pub id_str: String,
    /// Tweet text.
    pub text: String,
    /// Untruncated text, when requested.
    pub full_text: Option<String>,
    /// Creation time as sent by the server.
    pub created_at: String,
    /// Detected language.
    pub lang: Option<String>,
    /// Filter level the tweet was classified with.
    pub filter_level: Option<String>,
    /// Whether `text` was truncated.
    pub truncated: bool,
    /// Author.
    pub user: Option<User>,
    /// Full content of a truncated tweet.
    pub extended_tweet: Option<ExtendedTweet>,
    /// Location reported by the client, as GeoJSON.
    pub coordinates: Option<Coordinates>,
    /// Retweet source.
    pub retweeted_status: Option<Box<Tweet>>,
    /// Quoted tweet.
    pub quoted_status: Option<Box<Tweet>>,
    /// Reply target status ID.
    pub in_reply_to_status_id: Option<i64>,
    /// Reply target user ID.
    pub in_reply_to_user_id: Option<i64>,
    /// Favorite count.
    pub favorite_count: i64,
    /// Retweet count.
    pub retweet_count: i64,
    /// Countries the tweet is withheld in.
    pub withheld_in_countries: Vec<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tweet {
    /// The most complete text available for this tweet.
    pub fn best_text(&self) -> &str {
        self.extended_tweet
            .as_ref()
            .map(|e| e.full_text.as_str())
            .or(self.full_text.as_deref())
            .unwrap_or(&self.text)
    }
}

/// Full text and range of a truncated tweet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtendedTweet {
    /// Untruncated text.
    pub full_text: String,
    /// Displayable range of `full_text`.
    pub display_text_range: Vec<u32>,
}

/// GeoJSON point, longitude first.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Coordinates {
    /// `[longitude, latitude]`.
    pub coordinates: [f64; 2],
    /// GeoJSON type, normally `Point`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Author of a tweet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct User {
    /// Numeric ID.
    pub id: i64,
    /// String ID.
    pub id_str: String,
    /// Display name.
    pub name: String,
    /// Handle.
    pub screen_name: String,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A tweet was deleted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeleteNotice {
    /// The deleted status.
    pub status: DeletedStatus,
    /// Server timestamp in milliseconds.
    pub timestamp_ms: Option<String>,
}

/// Identity of a deleted status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeletedStatus {
    /// Status ID.
    pub id: i64,
    /// Status ID as a string.
    pub id_str: String,
    /// Owner ID.
    pub user_id: i64,
    /// Owner ID as a string.
    pub user_id_str: String,
}

/// Geolocation must be stripped from a user's tweets up to a status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScrubGeoNotice {
    /// User ID.
    pub user_id: i64,
    /// User ID as a string.
    pub user_id_str: String,
    /// Last affected status.
    pub up_to_status_id: i64,
    /// Last affected status as a string.
    pub up_to_status_id_str: String,
}

/// Number of undelivered tweets since the connection opened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitNotice {
    /// Undelivered tweet count.
    pub track: i64,
}

/// A tweet was withheld.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatusWithheldNotice {
    /// Status ID.
    pub id: i64,
    /// Owner ID.
    pub user_id: i64,
    /// Affected countries.
    pub withheld_in_countries: Vec<String>,
}

/// A user was withheld.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserWithheldNotice {
    /// User ID.
    pub id: i64,
    /// Affected countries.
    pub withheld_in_countries: Vec<String>,
}

/// The server is closing the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisconnectNotice {
    /// Disconnect code.
    pub code: i32,
    /// Name of the stream being closed.
    pub stream_name: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Sent when the client reads too slowly and the server queue fills up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StallWarning {
    /// Warning code, e.g. `FALLING_BEHIND`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// How full the server-side queue is.
    pub percent_full: u8,
}
