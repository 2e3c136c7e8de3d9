//! Value cells stored inside containers

mod display;
mod impls;

use std::sync::Arc;

use crate::form::FormId;
use crate::object::Object;

/// A single slot of a container.
///
/// Holds exactly one alternative at a time; reading through the typed
/// extractors may coerce between numeric kinds, but the stored
/// representation is never changed implicitly.
#[derive(Clone, Default)]
pub enum Item {
    /// Empty slot (JSON `null`)
    #[default]
    None,

    /// Boolean
    Bool(bool),

    /// 32-bit signed integer
    Int(i32),

    /// 64-bit floating point
    Real(f64),

    /// Text (Arc-wrapped so copying a container under its lock stays cheap)
    String(Arc<String>),

    /// External entity identifier
    Form(FormId),

    /// Shared reference to another container
    Object(Object),
}
