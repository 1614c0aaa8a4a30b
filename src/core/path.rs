//! Property path composition
//!
//! The engine addresses nested values by path strings:
//! - `creator[2]`, `creator[last()]` - array items, 1-based
//! - `Flash/exif:Fired` - structure fields, always prefixed
//! - `title[1]/?xml:lang` - qualifiers
//! - `title[?xml:lang="en-US"]` - alt-text items by language
//!
//! These helpers build such paths from parts. Field and qualifier prefixes
//! are accepted with or without their trailing colon, as the registry
//! returns them with one.

use crate::core::error::{XmpError, XmpResult};

/// Index addressing the last array item
pub const LAST_ITEM: i32 = -1;

fn require(what: &str, value: &str) -> XmpResult<()> {
    if value.is_empty() {
        return Err(XmpError::BadParam(format!("empty {}", what)));
    }
    Ok(())
}

fn qualified(prefix: &str, name: &str) -> XmpResult<String> {
    let prefix = prefix.strip_suffix(':').unwrap_or(prefix);
    require("namespace prefix", prefix)?;
    require("name", name)?;
    if name.contains(['/', '[', ']', ':']) {
        return Err(XmpError::BadParam(format!("name must be a local name: {:?}", name)));
    }
    Ok(format!("{}:{}", prefix, name))
}

/// Path of item `index` (1-based, or [`LAST_ITEM`]) of the array at `array_path`
pub fn compose_array_item_path(array_path: &str, index: i32) -> XmpResult<String> {
    require("array path", array_path)?;
    match index {
        LAST_ITEM => Ok(format!("{}[last()]", array_path)),
        i if i >= 1 => Ok(format!("{}[{}]", array_path, i)),
        _ => Err(XmpError::BadParam(format!("array index out of range: {}", index))),
    }
}

/// Path of field `prefix:field_name` of the structure at `struct_path`
pub fn compose_struct_field_path(
    struct_path: &str,
    field_prefix: &str,
    field_name: &str,
) -> XmpResult<String> {
    require("struct path", struct_path)?;
    Ok(format!("{}/{}", struct_path, qualified(field_prefix, field_name)?))
}

/// Path of qualifier `prefix:qual_name` of the property at `prop_path`
pub fn compose_qualifier_path(
    prop_path: &str,
    qual_prefix: &str,
    qual_name: &str,
) -> XmpResult<String> {
    require("property path", prop_path)?;
    Ok(format!("{}/?{}", prop_path, qualified(qual_prefix, qual_name)?))
}

/// Path selecting the item of `array_path` whose `xml:lang` is `lang`
pub fn compose_lang_selector(array_path: &str, lang: &str) -> XmpResult<String> {
    require("array path", array_path)?;
    require("language", lang)?;
    if lang.contains('"') {
        return Err(XmpError::BadParam(format!("invalid language tag: {:?}", lang)));
    }
    Ok(format!("{}[?xml:lang=\"{}\"]", array_path, lang))
}
