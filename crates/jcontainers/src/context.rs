//! Codec configuration shared by the serializer, deserializer and path resolver

use std::sync::Arc;

use crate::form::{FormCodec, PluginTable};

/// Default indentation for printed documents.
pub const DEFAULT_INDENT: usize = 2;

/// Configuration for reading and writing documents.
///
/// Carries the form codec used to encode entity ids as text (both for
/// form-map keys and for form values) and the printer settings.
#[derive(Debug, Clone)]
pub struct JsonContext {
    /// Converts form ids to and from their textual form
    pub codec: Arc<dyn FormCodec>,

    /// Spaces per indentation level when printing
    pub indent: usize,
}

impl Default for JsonContext {
    fn default() -> Self {
        Self {
            codec: Arc::new(PluginTable::default()),
            indent: DEFAULT_INDENT,
        }
    }
}

impl JsonContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that resolves forms against the given plugin list.
    pub fn with_plugins(plugins: PluginTable) -> Self {
        Self::default().with_codec(Arc::new(plugins))
    }

    /// Replace the form codec.
    pub fn with_codec(mut self, codec: Arc<dyn FormCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Set the printer indentation.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Borrow the form codec.
    pub fn codec(&self) -> &dyn FormCodec {
        self.codec.as_ref()
    }
}
