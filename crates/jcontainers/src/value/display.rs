//! Display and Debug implementations for Item

use std::fmt;

use super::*;

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::None => write!(f, "none"),
            Item::Bool(b) => write!(f, "{}", b),
            Item::Int(n) => write!(f, "{}", n),
            Item::Real(n) => write!(f, "{:?}", n),
            Item::String(s) => write!(f, "{:?}", s.as_ref()),
            Item::Form(id) => write!(f, "form({})", id),
            // Containers may be cyclic, so never descend into them here
            Item::Object(obj) => write!(f, "{:?}", obj),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::String(s) => write!(f, "{}", s.as_ref()), // No quotes for Display
            _ => fmt::Debug::fmt(self, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_primitives() {
        assert_eq!(format!("{:?}", Item::None), "none");
        assert_eq!(format!("{:?}", Item::Int(-4)), "-4");
        assert_eq!(format!("{:?}", Item::Real(1.0)), "1.0");
        assert_eq!(format!("{:?}", Item::string("hi")), "\"hi\"");
        assert_eq!(format!("{:?}", Item::Form(FormId(0x14))), "form(0x00000014)");
    }

    #[test]
    fn test_display_string_unquoted() {
        assert_eq!(Item::string("hi").to_string(), "hi");
        assert_eq!(Item::Bool(false).to_string(), "false");
    }

    #[test]
    fn test_debug_cyclic_object_terminates() {
        let obj = Object::map();
        obj.set_value_for_key("self", &obj);
        let text = format!("{:?}", Item::from(&obj));
        assert!(text.starts_with("map@"));
    }
}
