//! XMP Metadata
//!
//! [`XmpMeta`] owns one packet handle of the engine and exposes the property
//! accessors bound to it.
//!
//! Lookups come in two shapes. String lookups (`get_property`,
//! `get_array_item`, `get_struct_field`, ...) return `Ok(None)` when nothing
//! is at the path. Typed lookups (`get_property_bool`, `get_property_i32`,
//! ...) return [`XmpError::PropertyNotFound`] instead.

use crate::core::error::{check_last_error, check_result, XmpError, XmpResult};
use crate::core::handle::{cstring, null_handle, XmpString};
use crate::core::iterator::XmpIterator;
use crate::core::options::{IterClass, IterFlags, PropFlags, SerialFlags};
use crate::core::path::{compose_array_item_path, compose_qualifier_path, compose_struct_field_path};
use crate::engine::{Context, Engine, PacketPtr, RawDateTime};
use crate::types::datetime::XmpDateTime;
use crate::types::property::LocalizedText;
use chrono::{DateTime, Utc};
use std::ffi::CStr;

/// A metadata packet
pub struct XmpMeta<'c> {
    ctx: &'c Context,
    ptr: PacketPtr,
}

impl<'c> XmpMeta<'c> {
    /// Create a new empty packet
    pub fn new(ctx: &'c Context) -> XmpResult<Self> {
        match ctx.engine().new_empty() {
            Some(ptr) => Ok(Self { ctx, ptr }),
            None => Err(null_handle(ctx.engine(), "new_empty")),
        }
    }

    /// Create a packet from serialized XMP
    ///
    /// The string should contain a complete XMP packet (with or without the
    /// `<?xpacket>` wrapper).
    pub fn parse(ctx: &'c Context, s: &str) -> XmpResult<Self> {
        let mut meta = Self::new(ctx)?;
        meta.parse_from_str(s)?;
        Ok(meta)
    }

    /// Take ownership of a packet handle
    pub(crate) fn from_raw(ctx: &'c Context, ptr: PacketPtr) -> Self {
        Self { ctx, ptr }
    }

    pub(crate) fn ptr(&self) -> PacketPtr {
        self.ptr
    }

    /// The context this packet belongs to
    pub fn context(&self) -> &'c Context {
        self.ctx
    }

    fn engine(&self) -> &'c dyn Engine {
        self.ctx.engine()
    }

    /// Parse serialized XMP into this packet
    ///
    /// Properties already present are merged with the parsed ones by the
    /// engine.
    pub fn parse_from_str(&mut self, s: &str) -> XmpResult<()> {
        let ok = self.engine().parse(self.ptr, s.as_bytes());
        check_result(self.engine(), || format!("parse({} bytes)", s.len()), ok)
    }

    /// Deep copy of this packet
    pub fn try_clone(&self) -> XmpResult<XmpMeta<'c>> {
        match self.engine().copy(self.ptr) {
            Some(ptr) => Ok(Self::from_raw(self.ctx, ptr)),
            None => Err(null_handle(self.engine(), "copy")),
        }
    }

    /// Serialize with the engine's default formatting
    ///
    /// # Arguments
    ///
    /// * `options` - Serialization options
    /// * `padding` - Padding bytes to reserve, 0 for the engine default
    pub fn serialize_to_str(&self, options: SerialFlags, padding: u32) -> XmpResult<String> {
        self.serialize_and_format(options, padding, "", "", 0)
    }

    /// Serialize with explicit formatting
    ///
    /// # Arguments
    ///
    /// * `options` - Serialization options
    /// * `padding` - Padding bytes to reserve, 0 for the engine default
    /// * `newline` - Line terminator, empty for the engine default
    /// * `tab` - Indentation unit, empty for the engine default
    /// * `indent` - Number of units every line is indented by
    pub fn serialize_and_format(
        &self,
        options: SerialFlags,
        padding: u32,
        newline: &str,
        tab: &str,
        indent: i32,
    ) -> XmpResult<String> {
        let c_newline = cstring("newline", newline)?;
        let c_tab = cstring("tab", tab)?;
        let buffer = XmpString::new(self.engine())?;
        let ok = self.engine().serialize_and_format(
            self.ptr,
            buffer.ptr(),
            options.bits(),
            padding,
            &c_newline,
            &c_tab,
            indent,
        );
        check_result(self.engine(), || format!("serialize({:?})", options), ok)?;
        buffer.read_utf8()
    }

    /// Serialize to bytes, for the UTF-16/32 encodings
    pub fn serialize_to_bytes(&self, options: SerialFlags, padding: u32) -> XmpResult<Vec<u8>> {
        let c_empty = cstring("newline", "")?;
        let buffer = XmpString::new(self.engine())?;
        let ok = self.engine().serialize_and_format(
            self.ptr,
            buffer.ptr(),
            options.bits(),
            padding,
            &c_empty,
            &c_empty,
            0,
        );
        check_result(self.engine(), || format!("serialize({:?})", options), ok)?;
        Ok(self.engine().string_bytes(buffer.ptr()))
    }

    // ---------------------------------------------------------------------
    // Simple properties
    // ---------------------------------------------------------------------

    /// Get a property value
    ///
    /// # Arguments
    ///
    /// * `schema` - The namespace URI
    /// * `path` - The property path (e.g., "CreatorTool" or "creator\[1\]")
    pub fn get_property(&self, schema: &str, path: &str) -> XmpResult<Option<String>> {
        Ok(self
            .get_property_with_options(schema, path)?
            .map(|(value, _)| value))
    }

    /// Get a property value together with its option bits
    pub fn get_property_with_options(
        &self,
        schema: &str,
        path: &str,
    ) -> XmpResult<Option<(String, PropFlags)>> {
        let c_schema = cstring("schema", schema)?;
        let c_path = cstring("path", path)?;
        let value = XmpString::new(self.engine())?;
        let mut options = 0;
        let found =
            self.engine()
                .get_property(self.ptr, &c_schema, &c_path, value.ptr(), &mut options);
        if !found {
            check_last_error(self.engine(), || {
                format!("get_property({}, {})", schema, path)
            })?;
            return Ok(None);
        }
        Ok(Some((value.read_utf8()?, PropFlags::from_bits_retain(options))))
    }

    /// Shared body of the typed getters
    ///
    /// A `false` return with no error code means the property is missing,
    /// which typed lookups report as [`XmpError::PropertyNotFound`].
    fn get_typed<T: Default>(
        &self,
        operation: &str,
        schema: &str,
        path: &str,
        get: impl FnOnce(&dyn Engine, PacketPtr, &CStr, &CStr, &mut T, &mut u32) -> bool,
    ) -> XmpResult<T> {
        let c_schema = cstring("schema", schema)?;
        let c_path = cstring("path", path)?;
        let mut value = T::default();
        let mut options = 0;
        let found = get(self.engine(), self.ptr, &c_schema, &c_path, &mut value, &mut options);
        if !found && self.engine().get_error() == 0 {
            return Err(XmpError::PropertyNotFound {
                schema: schema.to_string(),
                path: path.to_string(),
            });
        }
        check_result(
            self.engine(),
            || format!("{}({}, {})", operation, schema, path),
            found,
        )?;
        Ok(value)
    }

    /// Get a property as a boolean
    pub fn get_property_bool(&self, schema: &str, path: &str) -> XmpResult<bool> {
        self.get_typed("get_property_bool", schema, path, |e, x, s, p, v, o| {
            e.get_property_bool(x, s, p, v, o)
        })
    }

    /// Get a property as a 32-bit integer
    pub fn get_property_i32(&self, schema: &str, path: &str) -> XmpResult<i32> {
        self.get_typed("get_property_int32", schema, path, |e, x, s, p, v, o| {
            e.get_property_int32(x, s, p, v, o)
        })
    }

    /// Get a property as a 64-bit integer
    pub fn get_property_i64(&self, schema: &str, path: &str) -> XmpResult<i64> {
        self.get_typed("get_property_int64", schema, path, |e, x, s, p, v, o| {
            e.get_property_int64(x, s, p, v, o)
        })
    }

    /// Get a property as a float
    pub fn get_property_f64(&self, schema: &str, path: &str) -> XmpResult<f64> {
        self.get_typed("get_property_float", schema, path, |e, x, s, p, v, o| {
            e.get_property_float(x, s, p, v, o)
        })
    }

    /// Get a date property as stored, with its own offset
    pub fn get_property_date_fields(&self, schema: &str, path: &str) -> XmpResult<XmpDateTime> {
        let raw: RawDateTime =
            self.get_typed("get_property_date", schema, path, |e, x, s, p, v, o| {
                e.get_property_date(x, s, p, v, o)
            })?;
        XmpDateTime::try_from(raw)
    }

    /// Get a date property as an instant in UTC
    ///
    /// The stored offset is applied, so two dates written with different
    /// offsets for the same instant read back equal.
    pub fn get_property_datetime(&self, schema: &str, path: &str) -> XmpResult<DateTime<Utc>> {
        self.get_property_date_fields(schema, path)?.to_utc()
    }

    /// Set a property value
    ///
    /// Intermediate structs and arrays implied by the path are created.
    ///
    /// # Arguments
    ///
    /// * `schema` - The namespace URI
    /// * `path` - The property path
    /// * `value` - The value to set
    /// * `options` - Option bits of the new node
    pub fn set_property(
        &mut self,
        schema: &str,
        path: &str,
        value: &str,
        options: PropFlags,
    ) -> XmpResult<()> {
        let c_value = cstring("value", value)?;
        self.set_typed("set_property", schema, path, |e, x, s, p| {
            e.set_property(x, s, p, &c_value, options.bits())
        })
    }

    fn set_typed(
        &mut self,
        operation: &str,
        schema: &str,
        path: &str,
        set: impl FnOnce(&dyn Engine, PacketPtr, &CStr, &CStr) -> bool,
    ) -> XmpResult<()> {
        let c_schema = cstring("schema", schema)?;
        let c_path = cstring("path", path)?;
        let ok = set(self.engine(), self.ptr, &c_schema, &c_path);
        check_result(
            self.engine(),
            || format!("{}({}, {})", operation, schema, path),
            ok,
        )
    }

    pub fn set_property_bool(
        &mut self,
        schema: &str,
        path: &str,
        value: bool,
        options: PropFlags,
    ) -> XmpResult<()> {
        self.set_typed("set_property_bool", schema, path, |e, x, s, p| {
            e.set_property_bool(x, s, p, value, options.bits())
        })
    }

    pub fn set_property_i32(
        &mut self,
        schema: &str,
        path: &str,
        value: i32,
        options: PropFlags,
    ) -> XmpResult<()> {
        self.set_typed("set_property_int32", schema, path, |e, x, s, p| {
            e.set_property_int32(x, s, p, value, options.bits())
        })
    }

    pub fn set_property_i64(
        &mut self,
        schema: &str,
        path: &str,
        value: i64,
        options: PropFlags,
    ) -> XmpResult<()> {
        self.set_typed("set_property_int64", schema, path, |e, x, s, p| {
            e.set_property_int64(x, s, p, value, options.bits())
        })
    }

    pub fn set_property_f64(
        &mut self,
        schema: &str,
        path: &str,
        value: f64,
        options: PropFlags,
    ) -> XmpResult<()> {
        self.set_typed("set_property_float", schema, path, |e, x, s, p| {
            e.set_property_float(x, s, p, value, options.bits())
        })
    }

    /// Set a date property, keeping the offset of `value`
    pub fn set_property_datetime(
        &mut self,
        schema: &str,
        path: &str,
        value: &XmpDateTime,
        options: PropFlags,
    ) -> XmpResult<()> {
        let raw = RawDateTime::from(*value);
        self.set_typed("set_property_date", schema, path, |e, x, s, p| {
            e.set_property_date(x, s, p, &raw, options.bits())
        })
    }

    /// Delete a property and everything below it
    ///
    /// Deleting a missing property is not an error.
    pub fn delete_property(&mut self, schema: &str, path: &str) -> XmpResult<()> {
        self.set_typed("delete_property", schema, path, |e, x, s, p| {
            e.delete_property(x, s, p)
        })
    }

    /// Check if a property exists
    ///
    /// A missing property is `Ok(false)`; an engine error such as an
    /// unregistered schema is still an error.
    pub fn does_property_exist(&self, schema: &str, path: &str) -> XmpResult<bool> {
        let c_schema = cstring("schema", schema)?;
        let c_path = cstring("path", path)?;
        let exists = self.engine().has_property(self.ptr, &c_schema, &c_path);
        check_last_error(self.engine(), || {
            format!("has_property({}, {})", schema, path)
        })?;
        Ok(exists)
    }

    // ---------------------------------------------------------------------
    // Arrays
    // ---------------------------------------------------------------------

    /// Get array item `index`, counting from 1
    pub fn get_array_item(
        &self,
        schema: &str,
        array_path: &str,
        index: usize,
    ) -> XmpResult<Option<String>> {
        let index = item_index(index)?;
        let c_schema = cstring("schema", schema)?;
        let c_path = cstring("array path", array_path)?;
        let value = XmpString::new(self.engine())?;
        let mut options = 0;
        let found = self.engine().get_array_item(
            self.ptr,
            &c_schema,
            &c_path,
            index,
            value.ptr(),
            &mut options,
        );
        if !found {
            check_last_error(self.engine(), || {
                format!("get_array_item({}, {}, {})", schema, array_path, index)
            })?;
            return Ok(None);
        }
        Ok(Some(value.read_utf8()?))
    }

    /// Replace array item `index`, counting from 1
    ///
    /// Index `len + 1` appends. With `INSERT_BEFORE_ITEM` or
    /// `INSERT_AFTER_ITEM` in `options` the value is inserted next to the
    /// item instead of replacing it.
    pub fn set_array_item(
        &mut self,
        schema: &str,
        array_path: &str,
        index: usize,
        value: &str,
        options: PropFlags,
    ) -> XmpResult<()> {
        let index = item_index(index)?;
        let c_value = cstring("value", value)?;
        self.set_typed("set_array_item", schema, array_path, |e, x, s, p| {
            e.set_array_item(x, s, p, index, &c_value, options.bits())
        })
    }

    /// Append an item, creating the array if needed
    ///
    /// # Arguments
    ///
    /// * `schema` - The namespace URI
    /// * `array_path` - Path of the array
    /// * `array_options` - Form of the array (`ARRAY_IS_ORDERED`, ...);
    ///   required when the array does not exist yet, must match its form
    ///   otherwise
    /// * `value` - The item value
    /// * `options` - Option bits of the new item
    pub fn append_array_item(
        &mut self,
        schema: &str,
        array_path: &str,
        array_options: PropFlags,
        value: &str,
        options: PropFlags,
    ) -> XmpResult<()> {
        let c_value = cstring("value", value)?;
        self.set_typed("append_array_item", schema, array_path, |e, x, s, p| {
            e.append_array_item(x, s, p, array_options.bits(), &c_value, options.bits())
        })
    }

    /// Delete array item `index`, counting from 1
    pub fn delete_array_item(
        &mut self,
        schema: &str,
        array_path: &str,
        index: usize,
    ) -> XmpResult<()> {
        let path = compose_array_item_path(array_path, item_index(index)?)?;
        self.delete_property(schema, &path)
    }

    /// Number of items of an array, 0 when it does not exist
    ///
    /// Probes items 1, 2, ... until one is missing: O(n) engine calls.
    pub fn count_array_items(&self, schema: &str, array_path: &str) -> XmpResult<usize> {
        let mut count = 0;
        while self.get_array_item(schema, array_path, count + 1)?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Whether the array has an item equal to `item`
    ///
    /// Probes items 1, 2, ... in order: O(n) engine calls.
    pub fn does_array_item_exist(
        &self,
        schema: &str,
        array_path: &str,
        item: &str,
    ) -> XmpResult<bool> {
        let mut index = 1;
        while let Some(value) = self.get_array_item(schema, array_path, index)? {
            if value == item {
                return Ok(true);
            }
            index += 1;
        }
        Ok(false)
    }

    // ---------------------------------------------------------------------
    // Localized text
    // ---------------------------------------------------------------------

    /// Get the alt-text item best matching a language
    ///
    /// The engine picks the item: an exact `specific_lang` match, then an
    /// item of the `generic_lang` family, then `x-default`, then the first.
    pub fn get_localized_text(
        &self,
        schema: &str,
        alt_path: &str,
        generic_lang: Option<&str>,
        specific_lang: &str,
    ) -> XmpResult<Option<LocalizedText>> {
        let c_schema = cstring("schema", schema)?;
        let c_path = cstring("alt-text path", alt_path)?;
        let c_generic = generic_lang.map(|lang| cstring("language", lang)).transpose()?;
        let c_specific = cstring("language", specific_lang)?;
        let actual = XmpString::new(self.engine())?;
        let value = XmpString::new(self.engine())?;
        let mut options = 0;
        let found = self.engine().get_localized_text(
            self.ptr,
            &c_schema,
            &c_path,
            c_generic.as_deref(),
            &c_specific,
            actual.ptr(),
            value.ptr(),
            &mut options,
        );
        if !found {
            check_last_error(self.engine(), || {
                format!("get_localized_text({}, {}, {})", schema, alt_path, specific_lang)
            })?;
            return Ok(None);
        }
        Ok(Some(LocalizedText {
            actual_lang: actual.read_utf8()?,
            value: value.read_utf8()?,
            options: PropFlags::from_bits_retain(options),
        }))
    }

    /// Set the alt-text item for a language, creating the array if needed
    pub fn set_localized_text(
        &mut self,
        schema: &str,
        alt_path: &str,
        generic_lang: Option<&str>,
        specific_lang: &str,
        value: &str,
        options: PropFlags,
    ) -> XmpResult<()> {
        let c_generic = generic_lang.map(|lang| cstring("language", lang)).transpose()?;
        let c_specific = cstring("language", specific_lang)?;
        let c_value = cstring("value", value)?;
        self.set_typed("set_localized_text", schema, alt_path, |e, x, s, p| {
            e.set_localized_text(
                x,
                s,
                p,
                c_generic.as_deref(),
                &c_specific,
                &c_value,
                options.bits(),
            )
        })
    }

    /// Delete the alt-text item for a language
    pub fn delete_localized_text(
        &mut self,
        schema: &str,
        alt_path: &str,
        generic_lang: Option<&str>,
        specific_lang: &str,
    ) -> XmpResult<()> {
        let c_generic = generic_lang.map(|lang| cstring("language", lang)).transpose()?;
        let c_specific = cstring("language", specific_lang)?;
        self.set_typed("delete_localized_text", schema, alt_path, |e, x, s, p| {
            e.delete_localized_text(x, s, p, c_generic.as_deref(), &c_specific)
        })
    }

    // ---------------------------------------------------------------------
    // Struct fields and qualifiers
    // ---------------------------------------------------------------------

    /// Registered prefix of a field or qualifier namespace
    fn prefix_of(&self, namespace: &str) -> XmpResult<String> {
        self.ctx.namespace_prefix(namespace)?.ok_or_else(|| {
            XmpError::BadParam(format!("namespace not registered: {}", namespace))
        })
    }

    fn field_path(&self, struct_path: &str, field_ns: &str, field_name: &str) -> XmpResult<String> {
        compose_struct_field_path(struct_path, &self.prefix_of(field_ns)?, field_name)
    }

    fn qualifier_path(&self, prop_path: &str, qual_ns: &str, qual_name: &str) -> XmpResult<String> {
        compose_qualifier_path(prop_path, &self.prefix_of(qual_ns)?, qual_name)
    }

    /// Get a struct field value
    ///
    /// # Arguments
    ///
    /// * `schema` - The namespace URI of the struct
    /// * `struct_path` - Path of the struct
    /// * `field_ns` - The namespace URI of the field
    /// * `field_name` - Local name of the field
    pub fn get_struct_field(
        &self,
        schema: &str,
        struct_path: &str,
        field_ns: &str,
        field_name: &str,
    ) -> XmpResult<Option<String>> {
        let path = self.field_path(struct_path, field_ns, field_name)?;
        self.get_property(schema, &path)
    }

    pub fn set_struct_field(
        &mut self,
        schema: &str,
        struct_path: &str,
        field_ns: &str,
        field_name: &str,
        value: &str,
        options: PropFlags,
    ) -> XmpResult<()> {
        let path = self.field_path(struct_path, field_ns, field_name)?;
        self.set_property(schema, &path, value, options)
    }

    pub fn delete_struct_field(
        &mut self,
        schema: &str,
        struct_path: &str,
        field_ns: &str,
        field_name: &str,
    ) -> XmpResult<()> {
        let path = self.field_path(struct_path, field_ns, field_name)?;
        self.delete_property(schema, &path)
    }

    pub fn does_struct_field_exist(
        &self,
        schema: &str,
        struct_path: &str,
        field_ns: &str,
        field_name: &str,
    ) -> XmpResult<bool> {
        let path = self.field_path(struct_path, field_ns, field_name)?;
        self.does_property_exist(schema, &path)
    }

    /// Get a qualifier value
    ///
    /// # Arguments
    ///
    /// * `schema` - The namespace URI of the property
    /// * `prop_path` - Path of the qualified property
    /// * `qual_ns` - The namespace URI of the qualifier
    /// * `qual_name` - Local name of the qualifier
    pub fn get_qualifier(
        &self,
        schema: &str,
        prop_path: &str,
        qual_ns: &str,
        qual_name: &str,
    ) -> XmpResult<Option<String>> {
        let path = self.qualifier_path(prop_path, qual_ns, qual_name)?;
        self.get_property(schema, &path)
    }

    pub fn set_qualifier(
        &mut self,
        schema: &str,
        prop_path: &str,
        qual_ns: &str,
        qual_name: &str,
        value: &str,
        options: PropFlags,
    ) -> XmpResult<()> {
        let path = self.qualifier_path(prop_path, qual_ns, qual_name)?;
        self.set_property(schema, &path, value, options)
    }

    pub fn delete_qualifier(
        &mut self,
        schema: &str,
        prop_path: &str,
        qual_ns: &str,
        qual_name: &str,
    ) -> XmpResult<()> {
        let path = self.qualifier_path(prop_path, qual_ns, qual_name)?;
        self.delete_property(schema, &path)
    }

    pub fn does_qualifier_exist(
        &self,
        schema: &str,
        prop_path: &str,
        qual_ns: &str,
        qual_name: &str,
    ) -> XmpResult<bool> {
        let path = self.qualifier_path(prop_path, qual_ns, qual_name)?;
        self.does_property_exist(schema, &path)
    }

    // ---------------------------------------------------------------------
    // Iteration
    // ---------------------------------------------------------------------

    /// Walk every property of the packet
    ///
    /// Each call starts a fresh walk.
    pub fn iter(&self) -> XmpResult<XmpIterator<'_>> {
        self.iter_with(None, None, IterFlags::empty())
    }

    /// Walk part of the packet
    ///
    /// # Arguments
    ///
    /// * `schema` - Limit the walk to one schema
    /// * `path` - Limit the walk to one property of `schema` and its subtree
    /// * `options` - Which nodes to emit
    pub fn iter_with(
        &self,
        schema: Option<&str>,
        path: Option<&str>,
        options: IterFlags,
    ) -> XmpResult<XmpIterator<'_>> {
        self.iter_class(IterClass::Properties, schema, path, options)
    }

    /// Walk with an explicit iteration class
    pub fn iter_class(
        &self,
        class: IterClass,
        schema: Option<&str>,
        path: Option<&str>,
        options: IterFlags,
    ) -> XmpResult<XmpIterator<'_>> {
        let c_schema = schema.map(|s| cstring("schema", s)).transpose()?;
        let c_path = path.map(|p| cstring("path", p)).transpose()?;
        XmpIterator::new(
            self.engine(),
            self.ptr,
            c_schema.as_deref(),
            c_path.as_deref(),
            options.with_class(class),
        )
    }
}

/// Convert a 1-based host index to the engine's index type
fn item_index(index: usize) -> XmpResult<i32> {
    i32::try_from(index)
        .map_err(|_| XmpError::BadParam(format!("array index out of range: {}", index)))
}

impl std::fmt::Debug for XmpMeta<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmpMeta").field("ptr", &self.ptr).finish()
    }
}

impl Drop for XmpMeta<'_> {
    fn drop(&mut self) {
        let ok = self.engine().free(self.ptr);
        if let Err(e) = check_result(self.engine(), || "free".to_string(), ok) {
            log::warn!("failed to free packet: {e}");
        }
    }
}
