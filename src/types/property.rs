//! Property records returned by iteration and localized-text lookups

use crate::core::options::PropFlags;
use std::fmt;

/// One node visited by an iterator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpProperty {
    /// Namespace URI of the schema the node belongs to
    pub schema: String,
    /// Path of the node, empty for schema nodes
    pub path: String,
    /// Text value, empty for structs, arrays and schema nodes
    pub value: String,
    pub options: PropFlags,
}

impl XmpProperty {
    pub fn new(
        schema: impl Into<String>,
        path: impl Into<String>,
        value: impl Into<String>,
        options: PropFlags,
    ) -> Self {
        Self {
            schema: schema.into(),
            path: path.into(),
            value: value.into(),
            options,
        }
    }

    /// Whether this is the node opening a schema
    pub fn is_schema(&self) -> bool {
        self.options.is_schema()
    }

    pub fn is_qualifier(&self) -> bool {
        self.options.contains(PropFlags::IS_QUALIFIER)
    }

    pub fn is_array(&self) -> bool {
        self.options.is_array()
    }

    pub fn is_struct(&self) -> bool {
        self.options.is_struct()
    }
}

impl fmt::Display for XmpProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_schema() {
            write!(f, "{}", self.schema)
        } else {
            write!(f, "{} = {:?}", self.path, self.value)
        }
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for XmpProperty {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("XmpProperty", 4)?;
        state.serialize_field("schema", &self.schema)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("options", &self.options.bits())?;
        state.end()
    }
}

/// An alt-text item chosen by language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    /// Language of the item actually chosen, which may differ from the one asked for
    pub actual_lang: String,
    pub value: String,
    pub options: PropFlags,
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for LocalizedText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("LocalizedText", 3)?;
        state.serialize_field("actual_lang", &self.actual_lang)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("options", &self.options.bits())?;
        state.end()
    }
}
