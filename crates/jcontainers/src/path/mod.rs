//! Path expressions for addressing items inside a container graph.
//!
//! A path is a sequence of steps applied left to right from a root
//! container:
//!
//! - `.key` looks up `key` in a string-keyed map; the key runs up to the next
//!   `.` or `[` and may be empty. Any other character, `]` included, is part
//!   of the key
//! - `[n]` looks up position `n` of an array
//! - `[form-text]` looks up a form map entry, with the key written as form
//!   text (see [`crate::form`])
//!
//! The empty path addresses the root itself.

mod resolve;

pub use resolve::{assign, has_path, resolve, resolve_with};

use std::fmt;

use crate::form::FormCodec;
use crate::object::Key;

/// One step of a parsed path, not yet matched against a container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep<'a> {
    /// `.key`
    Key(&'a str),
    /// `[text]`, an array index or form text depending on the container
    Bracket(&'a str),
}

impl<'a> PathStep<'a> {
    /// Convert this step to a container key given the kind it is applied to.
    ///
    /// Returns `None` when the step cannot address that kind of container:
    /// `.key` on an array, a non-numeric index, unknown form text.
    pub(crate) fn to_key(self, kind: crate::ObjectKind, codec: &dyn FormCodec) -> Option<Key> {
        use crate::ObjectKind;

        match (self, kind) {
            (PathStep::Key(k), ObjectKind::Map) => Some(Key::Str(k.to_owned())),
            (PathStep::Bracket(text), ObjectKind::Array) => text.parse().ok().map(Key::Index),
            (PathStep::Bracket(text), ObjectKind::FormMap) => codec.from_text(text).map(Key::Form),
            _ => None,
        }
    }
}

impl fmt::Display for PathStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(k) => write!(f, ".{}", k),
            PathStep::Bracket(text) => write!(f, "[{}]", text),
        }
    }
}

/// Split a path into steps.
///
/// Returns `None` for malformed paths: text before the first `.` or `[`, an
/// unterminated bracket, or an empty bracket.
///
/// # Example
///
/// ```
/// use jcontainers::path::{parse, PathStep};
///
/// let steps = parse(".npcs[0].name").unwrap();
/// assert_eq!(
///     steps,
///     vec![PathStep::Key("npcs"), PathStep::Bracket("0"), PathStep::Key("name")]
/// );
/// assert!(parse("").unwrap().is_empty());
/// assert!(parse("npcs").is_none());
/// ```
pub fn parse(path: &str) -> Option<Vec<PathStep<'_>>> {
    let mut steps = Vec::new();
    let mut rest = path;

    while let Some(first) = rest.chars().next() {
        match first {
            '.' => {
                let body = &rest[1..];
                let end = body.find(['.', '[']).unwrap_or(body.len());
                steps.push(PathStep::Key(&body[..end]));
                rest = &body[end..];
            }
            '[' => {
                let body = &rest[1..];
                let end = body.find(']')?;
                if end == 0 {
                    return None;
                }
                steps.push(PathStep::Bracket(&body[..end]));
                rest = &body[end + 1..];
            }
            _ => return None,
        }
    }

    Some(steps)
}

/// Append the path step for `key` to `out`.
///
/// Returns `false` for a form key the codec cannot encode.
pub(crate) fn push_step(out: &mut String, key: &Key, codec: &dyn FormCodec) -> bool {
    use std::fmt::Write;

    match key {
        Key::Str(k) => {
            out.push('.');
            out.push_str(k);
        }
        Key::Index(idx) => {
            // Writing into a String cannot fail
            let _ = write!(out, "[{}]", idx);
        }
        Key::Form(id) => match codec.to_text(*id) {
            Some(text) => {
                out.push('[');
                out.push_str(&text);
                out.push(']');
            }
            None => return false,
        },
    }
    true
}
