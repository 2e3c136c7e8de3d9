//! Form identifiers and their textual encoding
//!
//! A form id is a 32-bit entity identifier whose high byte is the load-order
//! index of the plugin that defines it. Ids are stored verbatim in value cells
//! and form maps, but in documents they are written as strings of the form
//! `__formData|<plugin>|0x<low 24 bits>` so that a document stays valid when
//! the plugin load order changes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved key marking a JSON object as a form map, and prefix of form text.
pub const FORM_DATA: &str = "__formData";

/// Separator between the parts of a form string.
pub const SEPARATOR: char = '|';

/// Load-order index reserved for forms created at runtime.
pub const DYNAMIC_INDEX: u32 = 0xFF;

const LOW_MASK: u32 = 0x00FF_FFFF;

/// An external entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FormId(pub u32);

impl FormId {
    /// The null form.
    pub const ZERO: FormId = FormId(0);

    /// Build an id from a plugin index and a plugin-local id.
    pub fn from_parts(plugin_index: u32, local: u32) -> Self {
        FormId((plugin_index << 24) | (local & LOW_MASK))
    }

    /// Load-order index of the defining plugin.
    pub fn plugin_index(self) -> u32 {
        self.0 >> 24
    }

    /// Id within the defining plugin.
    pub fn local(self) -> u32 {
        self.0 & LOW_MASK
    }

    /// Check for the null form.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

/// Converts form ids to and from their textual form.
///
/// Implementations must be usable from several threads at once since one
/// codec is shared by every document operation.
pub trait FormCodec: fmt::Debug + Send + Sync {
    /// Encode a form id, or `None` if it cannot be represented.
    fn to_text(&self, id: FormId) -> Option<String>;

    /// Decode form text, or `None` if it is malformed or names an unknown plugin.
    fn from_text(&self, text: &str) -> Option<FormId>;

    /// Check whether a string has the shape of form text, resolvable or not.
    fn is_form_text(&self, text: &str) -> bool {
        text.strip_prefix(FORM_DATA)
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }
}

/// Form codec backed by the plugin load order.
///
/// # Example
///
/// ```
/// use jcontainers::{FormCodec, FormId, PluginTable};
///
/// let plugins = PluginTable::new(["Skyrim.esm", "Update.esm"]);
///
/// let text = plugins.to_text(FormId(0x0100_0d62)).unwrap();
/// assert_eq!(text, "__formData|Update.esm|0xd62");
/// assert_eq!(plugins.from_text(&text), Some(FormId(0x0100_0d62)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginTable {
    /// Plugin file names in load order
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl PluginTable {
    /// Create a table from plugin names in load order.
    pub fn new<I, S>(plugins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            plugins: plugins.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a table from its JSON configuration, `{"plugins": [...]}`.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    fn index_of(&self, name: &str) -> Option<u32> {
        self.plugins
            .iter()
            .position(|p| p.eq_ignore_ascii_case(name))
            .and_then(|idx| u32::try_from(idx).ok())
            .filter(|idx| *idx < DYNAMIC_INDEX)
    }
}

impl FormCodec for PluginTable {
    fn to_text(&self, id: FormId) -> Option<String> {
        if id.is_zero() {
            return None;
        }

        let plugin = match id.plugin_index() {
            DYNAMIC_INDEX => "",
            idx => self.plugins.get(idx as usize)?.as_str(),
        };

        Some(format!(
            "{FORM_DATA}{SEPARATOR}{plugin}{SEPARATOR}{:#x}",
            id.local()
        ))
    }

    fn from_text(&self, text: &str) -> Option<FormId> {
        let rest = text.strip_prefix(FORM_DATA)?.strip_prefix(SEPARATOR)?;
        let (plugin, local) = rest.rsplit_once(SEPARATOR)?;

        let digits = local
            .strip_prefix("0x")
            .or_else(|| local.strip_prefix("0X"))?;
        let local = u32::from_str_radix(digits, 16).ok()?;

        let index = if plugin.is_empty() {
            DYNAMIC_INDEX
        } else {
            self.index_of(plugin)?
        };

        Some(FormId::from_parts(index, local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PluginTable {
        PluginTable::new(["Skyrim.esm", "Update.esm", "Dawnguard.esm"])
    }

    #[test]
    fn test_form_parts() {
        let id = FormId(0x0201_2345);
        assert_eq!(id.plugin_index(), 2);
        assert_eq!(id.local(), 0x01_2345);
        assert_eq!(FormId::from_parts(2, 0x01_2345), id);
        assert_eq!(id.to_string(), "0x02012345");
    }

    #[test]
    fn test_encode_known_plugin() {
        assert_eq!(
            table().to_text(FormId(0x14)).as_deref(),
            Some("__formData|Skyrim.esm|0x14")
        );
    }

    #[test]
    fn test_encode_dynamic_form() {
        assert_eq!(
            table().to_text(FormId(0xFF00_0800)).as_deref(),
            Some("__formData||0x800")
        );
    }

    #[test]
    fn test_encode_unrepresentable() {
        assert_eq!(table().to_text(FormId::ZERO), None);
        assert_eq!(table().to_text(FormId(0x0900_0001)), None);
    }

    #[test]
    fn test_decode() {
        let t = table();
        assert_eq!(
            t.from_text("__formData|Dawnguard.esm|0x2b2c"),
            Some(FormId(0x0200_2b2c))
        );
        assert_eq!(
            t.from_text("__formData|dawnguard.ESM|0X2b2c"),
            Some(FormId(0x0200_2b2c))
        );
        assert_eq!(t.from_text("__formData||0x800"), Some(FormId(0xFF00_0800)));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let t = table();
        assert_eq!(t.from_text("__formData|Missing.esp|0x14"), None);
        assert_eq!(t.from_text("__formData|Skyrim.esm|14"), None);
        assert_eq!(t.from_text("__formData|Skyrim.esm|0xZZ"), None);
        assert_eq!(t.from_text("__formData"), None);
        assert_eq!(t.from_text("Skyrim.esm|0x14"), None);
    }

    #[test]
    fn test_is_form_text() {
        let t = table();
        assert!(t.is_form_text("__formData|Missing.esp|0x14"));
        assert!(!t.is_form_text(FORM_DATA));
        assert!(!t.is_form_text("__reference|.a"));
    }

    #[test]
    fn test_table_from_json() {
        let t = PluginTable::from_json(r#"{"plugins": ["Skyrim.esm"]}"#).unwrap();
        assert_eq!(t, PluginTable::new(["Skyrim.esm"]));
        assert_eq!(PluginTable::from_json("{}").unwrap(), PluginTable::default());
    }
}
