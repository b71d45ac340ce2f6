//! Comma-separated list fields of the filter request form.
//!
//! `follow`, `language`, `locations` and `track` are each sent as a single
//! form field holding a comma-joined list.
//!
//! # Examples
//!
//! ```
//! use twitter_stream::protocol::{format_list, parse_list};
//!
//! let field = format_list(&["rust", "tokio"]);
//! assert_eq!(field, "rust,tokio");
//!
//! let items = parse_list("rust, tokio");
//! assert_eq!(items, vec!["rust", "tokio"]);
//! ```

/// Join list items into a single comma-separated form value.
///
/// Items are written as-is; form encoding of the result is left to the
/// transport.
///
/// # Examples
///
/// ```
/// use twitter_stream::protocol::format_list;
///
/// assert_eq!(format_list(&["en"]), "en");
/// assert_eq!(format_list(&["en", "fr", "de"]), "en,fr,de");
/// assert_eq!(format_list::<&str>(&[]), "");
/// ```
pub fn format_list<S: AsRef<str>>(items: &[S]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(item.as_ref());
    }
    out
}

/// Split a comma-separated form value back into its items.
///
/// Whitespace around items is trimmed and empty items are skipped.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
