//! Data types of the filtered stream: request parameters, credentials and
//! the messages read off the wire.

mod credentials;
mod message;
mod params;

pub use credentials::AccessCredentials;
pub use message::{
    Coordinates, DeleteNotice, DeletedStatus, DisconnectNotice, ExtendedTweet, LimitNotice,
    ScrubGeoNotice, StallWarning, StatusWithheldNotice, StreamMessage, Tweet, User,
    UserWithheldNotice,
};
pub use params::{BoundingBox, FilterLevel, FilterParams};
