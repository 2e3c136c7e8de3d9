//! String encoding for references between containers.
//!
//! JSON cannot express that two places hold the same object. When a container
//! is met again during serialization, it is written as a string made of
//! [`PREFIX`] followed by the root-relative path of its first occurrence.
//!
//! Every string the store treats specially starts with [`SPECIAL_MARKER`];
//! anything else is always plain text, which keeps classification cheap for
//! ordinary data.

use crate::form::{FormCodec, FormId};

/// Marker shared by all reserved strings.
pub const SPECIAL_MARKER: &str = "__";

/// Prefix of a reference string. The rest of the string is a path.
pub const PREFIX: &str = "__reference|";

/// Check whether a string starts with the reserved marker.
pub fn is_special(text: &str) -> bool {
    text.starts_with(SPECIAL_MARKER)
}

/// Build the reference string for a root-relative path.
pub fn encode(path: &str) -> String {
    let mut out = String::with_capacity(PREFIX.len() + path.len());
    out.push_str(PREFIX);
    out.push_str(path);
    out
}

/// Extract the path from a reference string.
///
/// # Example
///
/// ```
/// use jcontainers::json::reference;
///
/// assert_eq!(reference::decode("__reference|.a[0]"), Some(".a[0]"));
/// assert_eq!(reference::decode("__reference|"), Some(""));
/// assert_eq!(reference::decode("__other"), None);
/// ```
pub fn decode(text: &str) -> Option<&str> {
    text.strip_prefix(PREFIX)
}

/// What a string read from a document stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind<'a> {
    /// Plain text, stored as is
    Literal,
    /// Form text; unresolvable form text reads as the null form
    Form(FormId),
    /// Reference to the container at the given root-relative path
    Reference(&'a str),
}

/// Classify a document string.
///
/// Form text takes precedence over references. A string that starts with the
/// reserved marker but is neither stays literal text.
pub fn classify<'a>(codec: &dyn FormCodec, text: &'a str) -> StringKind<'a> {
    if !is_special(text) {
        return StringKind::Literal;
    }

    if codec.is_form_text(text) {
        return StringKind::Form(codec.from_text(text).unwrap_or(FormId::ZERO));
    }

    match decode(text) {
        Some(path) => StringKind::Reference(path),
        None => StringKind::Literal,
    }
}
