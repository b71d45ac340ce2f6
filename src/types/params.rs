//! Filter parameters for a stream session.

use crate::protocol::{fields, format_list};
use std::fmt;

/// Minimum filter level of the tweets delivered by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLevel {
    /// Deliver everything.
    None,
    /// Deliver low and medium filter level tweets.
    Low,
    /// Deliver only medium filter level tweets.
    Medium,
}

impl FilterLevel {
    /// Wire value of this filter level.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterLevel::None => "none",
            FilterLevel::Low => "low",
            FilterLevel::Medium => "medium",
        }
    }
}

impl fmt::Display for FilterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geographic bounding box, south-west corner first.
///
/// Serialized as `sw_long,sw_lat,ne_long,ne_lat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// South-west longitude.
    pub sw_long: f64,
    /// South-west latitude.
    pub sw_lat: f64,
    /// North-east longitude.
    pub ne_long: f64,
    /// North-east latitude.
    pub ne_lat: f64,
}

impl BoundingBox {
    /// Create a bounding box from its south-west and north-east corners.
    pub fn new(sw_long: f64, sw_lat: f64, ne_long: f64, ne_lat: f64) -> Self {
        BoundingBox {
            sw_long,
            sw_lat,
            ne_long,
            ne_lat,
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.sw_long, self.sw_lat, self.ne_long, self.ne_lat
        )
    }
}

/// Parameters of a filtered stream.
///
/// Built once by the caller and cloned into the stream when it starts; the
/// running stream never changes them.
///
/// # Examples
///
/// ```
/// use twitter_stream::{FilterLevel, FilterParams};
///
/// let params = FilterParams::new()
///     .track(["rust", "tokio"])
///     .language(["en"])
///     .filter_level(FilterLevel::Low)
///     .stall_warnings(true);
///
/// let form = params.to_form();
/// assert!(form.contains(&("track".to_string(), "rust,tokio".to_string())));
/// assert!(form.contains(&("stall_warnings".to_string(), "true".to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    /// Minimum filter level.
    pub filter_level: Option<FilterLevel>,
    /// User IDs whose tweets are delivered.
    pub follow: Vec<String>,
    /// Languages to restrict delivery to.
    pub language: Vec<String>,
    /// Bounding boxes to match.
    pub locations: Vec<BoundingBox>,
    /// Keywords to track.
    pub track: Vec<String>,
    /// Ask the server to send stall warnings.
    pub stall_warnings: bool,
}

impl FilterParams {
    /// Create empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter level.
    #[must_use]
    pub fn filter_level(mut self, level: FilterLevel) -> Self {
        self.filter_level = Some(level);
        self
    }

    /// Add user IDs to follow.
    #[must_use]
    pub fn follow<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.follow.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Add languages.
    #[must_use]
    pub fn language<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.language.extend(languages.into_iter().map(Into::into));
        self
    }

    /// Add a bounding box.
    #[must_use]
    pub fn location(mut self, bbox: BoundingBox) -> Self {
        self.locations.push(bbox);
        self
    }

    /// Add keywords to track.
    #[must_use]
    pub fn track<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.track.extend(keywords.into_iter().map(Into::into));
        self
    }

    /// Enable or disable stall warnings.
    #[must_use]
    pub fn stall_warnings(mut self, enabled: bool) -> Self {
        self.stall_warnings = enabled;
        self
    }

    /// Encode the parameters as form fields.
    ///
    /// Unset settings and empty lists are omitted.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = Vec::new();
        if let Some(level) = self.filter_level {
            form.push((fields::FILTER_LEVEL.to_string(), level.to_string()));
        }
        if self.stall_warnings {
            form.push((fields::STALL_WARNINGS.to_string(), "true".to_string()));
        }
        if !self.follow.is_empty() {
            form.push((fields::FOLLOW.to_string(), format_list(&self.follow)));
        }
        if !self.language.is_empty() {
            form.push((fields::LANGUAGE.to_string(), format_list(&self.language)));
        }
        if !self.locations.is_empty() {
            let boxes: Vec<String> = self.locations.iter().map(ToString::to_string).collect();
            form.push((fields::LOCATIONS.to_string(), format_list(&boxes)));
        }
        if !self.track.is_empty() {
            form.push((fields::TRACK.to_string(), format_list(&self.track)));
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parse_list;

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_empty_params_encode_nothing() {
        assert!(FilterParams::new().to_form().is_empty());
    }

    #[test]
    fn test_stall_warnings_absent_when_false() {
        let form = FilterParams::new().stall_warnings(false).to_form();
        assert_eq!(field(&form, "stall_warnings"), None);

        let form = FilterParams::new().stall_warnings(true).to_form();
        assert_eq!(field(&form, "stall_warnings"), Some("true"));
    }

    #[test]
    fn test_lists_are_comma_joined() {
        let form = FilterParams::new()
            .follow(["12", "34"])
            .language(["en", "fr"])
            .track(["rust"])
            .to_form();
        assert_eq!(field(&form, "follow"), Some("12,34"));
        assert_eq!(field(&form, "language"), Some("en,fr"));
        assert_eq!(field(&form, "track"), Some("rust"));
        assert_eq!(parse_list(field(&form, "follow").unwrap()), vec!["12", "34"]);
    }

    #[test]
    fn test_locations_flatten_boxes() {
        let form = FilterParams::new()
            .location(BoundingBox::new(-122.75, 36.8, -121.75, 37.8))
            .location(BoundingBox::new(-74.0, 40.0, -73.0, 41.0))
            .to_form();
        assert_eq!(
            field(&form, "locations"),
            Some("-122.75,36.8,-121.75,37.8,-74,40,-73,41")
        );
    }

    #[test]
    fn test_filter_level_wire_value() {
        let form = FilterParams::new().filter_level(FilterLevel::Medium).to_form();
        assert_eq!(field(&form, "filter_level"), Some("medium"));
    }
}
