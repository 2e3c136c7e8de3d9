//! Item trait implementations: constructors, predicates, extractors, From traits, PartialEq

use std::sync::Arc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Item {
    /// Create a string item
    pub fn string(s: impl Into<String>) -> Self {
        Item::String(Arc::new(s.into()))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if the slot is empty
    pub fn is_none(&self) -> bool {
        matches!(self, Item::None)
    }

    /// Check if item is numeric (integer or real)
    pub fn is_numeric(&self) -> bool {
        matches!(self, Item::Int(_) | Item::Real(_))
    }

    /// Check if item is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Item::String(_))
    }

    /// Check if item references a container
    pub fn is_object(&self) -> bool {
        matches!(self, Item::Object(_))
    }

    /// Short name of the stored alternative
    pub fn type_name(&self) -> &'static str {
        match self {
            Item::None => "none",
            Item::Bool(_) => "bool",
            Item::Int(_) => "int",
            Item::Real(_) => "real",
            Item::String(_) => "string",
            Item::Form(_) => "form",
            Item::Object(_) => "object",
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extractors (return Option for safe access)
    // ═══════════════════════════════════════════════════════════════════

    /// Read as integer. Reals are truncated toward zero, booleans read as 0/1.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Item::Int(n) => Some(*n),
            Item::Real(n) => Some(*n as i32),
            Item::Bool(b) => Some(i32::from(*b)),
            _ => None,
        }
    }

    /// Read as real. Integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Item::Real(n) => Some(*n),
            Item::Int(n) => Some(f64::from(*n)),
            _ => None,
        }
    }

    /// Read as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Item::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Extract form id
    pub fn as_form(&self) -> Option<FormId> {
        match self {
            Item::Form(id) => Some(*id),
            _ => None,
        }
    }

    /// Extract the referenced container
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Item::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Take the referenced container out of the item
    pub fn into_object(self) -> Option<Object> {
        match self {
            Item::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PartialEq Implementation
// ═══════════════════════════════════════════════════════════════════

impl PartialEq for Item {
    /// Primitives compare by value, containers by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Item::None, Item::None) => true,
            (Item::Bool(a), Item::Bool(b)) => a == b,
            (Item::Int(a), Item::Int(b)) => a == b,
            (Item::Real(a), Item::Real(b)) => a == b,
            (Item::String(a), Item::String(b)) => a == b,
            (Item::Form(a), Item::Form(b)) => a == b,
            (Item::Object(a), Item::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::Bool(b)
    }
}

impl From<i32> for Item {
    fn from(n: i32) -> Self {
        Item::Int(n)
    }
}

impl From<f64> for Item {
    fn from(n: f64) -> Self {
        Item::Real(n)
    }
}

impl From<f32> for Item {
    fn from(n: f32) -> Self {
        Item::Real(f64::from(n))
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::string(s)
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::String(Arc::new(s))
    }
}

impl From<FormId> for Item {
    fn from(id: FormId) -> Self {
        Item::Form(id)
    }
}

impl From<Object> for Item {
    fn from(obj: Object) -> Self {
        Item::Object(obj)
    }
}

impl From<&Object> for Item {
    fn from(obj: &Object) -> Self {
        Item::Object(obj.clone())
    }
}

impl From<Option<Object>> for Item {
    fn from(obj: Option<Object>) -> Self {
        obj.map_or(Item::None, Item::Object)
    }
}
