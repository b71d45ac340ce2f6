//! Frame decoder.
//!
//! Each message frame is a JSON object. Control messages are wrapped in a
//! single envelope key naming their kind; anything else is a tweet.
//!
//! | Envelope key | Message |
//! |--------------|---------|
//! | `delete` | [`StreamMessage::Delete`] |
//! | `scrub_geo` | [`StreamMessage::ScrubGeo`] |
//! | `limit` | [`StreamMessage::Limit`] |
//! | `status_withheld` | [`StreamMessage::StatusWithheld`] |
//! | `user_withheld` | [`StreamMessage::UserWithheld`] |
//! | `disconnect`, `disconnect_message` | [`StreamMessage::Disconnect`] |
//! | `warning` | [`StreamMessage::Warning`] |
//! | none of the above | [`StreamMessage::Tweet`] |

use crate::error::{Result, StreamError};
use crate::types::StreamMessage;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decode one message frame.
///
/// Fails with [`StreamError::Decode`] when the frame is not a JSON object or
/// its envelope does not match the expected shape. Keep-alive frames never
/// reach the decoder.
///
/// # Examples
///
/// ```
/// use twitter_stream::client::decode;
/// use twitter_stream::StreamMessage;
///
/// let message = decode(br#"{"text":"hello"}"#).unwrap();
/// assert_eq!(message.as_tweet().unwrap().text, "hello");
///
/// let message = decode(br#"{"limit":{"track":42}}"#).unwrap();
/// assert!(matches!(message, StreamMessage::Limit(ref l) if l.track == 42));
///
/// assert!(decode(b"not json").is_err());
/// ```
pub fn decode(frame: &[u8]) -> Result<StreamMessage> {
    let mut object: Map<String, Value> = serde_json::from_slice(frame)?;

    if let Some(v) = object.remove("delete") {
        return envelope(v).map(StreamMessage::Delete);
    }
    if let Some(v) = object.remove("scrub_geo") {
        return envelope(v).map(StreamMessage::ScrubGeo);
    }
    if let Some(v) = object.remove("limit") {
        return envelope(v).map(StreamMessage::Limit);
    }
    if let Some(v) = object.remove("status_withheld") {
        return envelope(v).map(StreamMessage::StatusWithheld);
    }
    if let Some(v) = object.remove("user_withheld") {
        return envelope(v).map(StreamMessage::UserWithheld);
    }
    if let Some(v) = object
        .remove("disconnect")
        .or_else(|| object.remove("disconnect_message"))
    {
        return envelope(v).map(StreamMessage::Disconnect);
    }
    if let Some(v) = object.remove("warning") {
        return envelope(v).map(StreamMessage::Warning);
    }

    let tweet = serde_json::from_value(Value::Object(object))?;
    Ok(StreamMessage::Tweet(Box::new(tweet)))
}

fn envelope<T: DeserializeOwned>(value: Value) -> Result<T> {
    if !value.is_object() {
        return Err(StreamError::Decode(format!(
            "expected an object envelope, got {}",
            value
        )));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tweet() {
        let message = decode(br#"{"text":"hello"}"#).unwrap();
        let tweet = message.as_tweet().unwrap();
        assert_eq!(tweet.text, "hello");
        assert_eq!(message.kind(), "tweet");
    }

    #[test]
    fn test_decode_full_tweet_keeps_unknown_fields() {
        let frame = br#"{
            "id": 850006245121695744,
            "id_str": "850006245121695744",
            "text": "short",
            "truncated": true,
            "lang": "en",
            "coordinates": null,
            "user": {"id": 6253282, "id_str": "6253282", "name": "API", "screen_name": "api", "verified": true},
            "extended_tweet": {"full_text": "the long version", "display_text_range": [0, 16]},
            "source": "web"
        }"#;
        let message = decode(frame).unwrap();
        let tweet = message.as_tweet().unwrap();
        assert_eq!(tweet.id, 850006245121695744);
        assert_eq!(tweet.best_text(), "the long version");
        assert_eq!(tweet.user.as_ref().unwrap().screen_name, "api");
        assert_eq!(tweet.extra.get("source"), Some(&Value::from("web")));
        assert!(tweet.coordinates.is_none());
    }

    #[test]
    fn test_decode_delete() {
        let frame = br#"{"delete":{"status":{"id":1,"id_str":"1","user_id":3,"user_id_str":"3"},"timestamp_ms":"1481920000000"}}"#;
        match decode(frame).unwrap() {
            StreamMessage::Delete(notice) => {
                assert_eq!(notice.status.id, 1);
                assert_eq!(notice.status.user_id, 3);
                assert_eq!(notice.timestamp_ms.as_deref(), Some("1481920000000"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_decode_scrub_geo() {
        let frame = br#"{"scrub_geo":{"user_id":14090452,"user_id_str":"14090452","up_to_status_id":23260136625,"up_to_status_id_str":"23260136625"}}"#;
        assert!(matches!(
            decode(frame).unwrap(),
            StreamMessage::ScrubGeo(ref n) if n.up_to_status_id == 23260136625
        ));
    }

    #[test]
    fn test_decode_withheld() {
        let frame = br#"{"status_withheld":{"id":1234567890,"user_id":123456,"withheld_in_countries":["DE","AR"]}}"#;
        assert!(matches!(
            decode(frame).unwrap(),
            StreamMessage::StatusWithheld(ref n) if n.withheld_in_countries == ["DE", "AR"]
        ));

        let frame = br#"{"user_withheld":{"id":123456,"withheld_in_countries":["DE"]}}"#;
        assert!(matches!(
            decode(frame).unwrap(),
            StreamMessage::UserWithheld(ref n) if n.id == 123456
        ));
    }

    #[test]
    fn test_decode_disconnect_aliases() {
        for frame in [
            &br#"{"disconnect":{"code":4,"stream_name":"filter","reason":"duplicate"}}"#[..],
            &br#"{"disconnect_message":{"code":4,"stream_name":"filter","reason":"duplicate"}}"#[..],
        ] {
            match decode(frame).unwrap() {
                StreamMessage::Disconnect(notice) => {
                    assert_eq!(notice.code, 4);
                    assert_eq!(notice.reason, "duplicate");
                }
                other => panic!("unexpected message: {:?}", other),
            }
        }
    }

    #[test]
    fn test_decode_stall_warning() {
        let frame = br#"{"warning":{"code":"FALLING_BEHIND","message":"Your connection is falling behind","percent_full":60}}"#;
        assert!(matches!(
            decode(frame).unwrap(),
            StreamMessage::Warning(ref w) if w.percent_full == 60 && w.code == "FALLING_BEHIND"
        ));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(matches!(decode(b"[1,2,3]"), Err(StreamError::Decode(_))));
        assert!(matches!(decode(b"42"), Err(StreamError::Decode(_))));
        assert!(matches!(decode(b"{\"text\":"), Err(StreamError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_malformed_envelope() {
        assert!(matches!(
            decode(br#"{"limit":7}"#),
            Err(StreamError::Decode(_))
        ));
        assert!(matches!(
            decode(br#"{"limit":{"track":"many"}}"#),
            Err(StreamError::Decode(_))
        ));
    }
}
