//! In-process engine
//!
//! [`MemoryEngine`] keeps property trees in memory and follows the native
//! engine's calling convention: boolean returns, a last-error code that is
//! reset on every call, 1-based arrays, alt-text language fallback, a
//! namespace registry and depth-first iteration with skip.
//!
//! It does not read or write RDF/XML: `parse` reports `Unimplemented`, and
//! so does `serialize_and_format` once its options have been validated.
//! Files are not touched beyond format detection; packets put into a file
//! are kept in memory, keyed by path, for the lifetime of the engine.

mod alt_text;
mod files;
mod iter;
mod path;
mod registry;
mod tree;

use self::files::OpenFile;
use self::iter::{Cursor, Scope};
use self::path::{expand_path, Step};
use self::registry::NamespaceRegistry;
use self::tree::{Packet, XmpNode, ITEM_NAME};
use super::{Engine, FilePtr, IteratorPtr, PacketPtr, RawDateTime, StringPtr};
use crate::core::error::ErrorCode;
use crate::core::handle::{bytes_to_path, path_to_bytes};
use crate::core::options::{IterClass, IterFlags, OpenFlags, PropFlags, SerialFlags};
use crate::files::format::FileType;
use crate::utils::datetime::{format_date_time, parse_date_time};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Engine state behind the handles
struct State {
    last_handle: usize,
    registry: NamespaceRegistry,
    packets: HashMap<usize, Packet>,
    strings: HashMap<usize, Vec<u8>>,
    iterators: HashMap<usize, Cursor>,
    files: HashMap<usize, OpenFile>,
    /// Packets written to files, by path
    store: HashMap<PathBuf, Packet>,
}

impl State {
    fn new() -> Self {
        Self {
            last_handle: 0,
            registry: NamespaceRegistry::new(),
            packets: HashMap::new(),
            strings: HashMap::new(),
            iterators: HashMap::new(),
            files: HashMap::new(),
            store: HashMap::new(),
        }
    }

    fn alloc(&mut self) -> usize {
        self.last_handle += 0x10;
        self.last_handle
    }

    fn packet(&self, xmp: PacketPtr) -> Result<&Packet, ErrorCode> {
        self.packets.get(&xmp.addr()).ok_or(ErrorCode::BadObject)
    }

    fn packet_mut(&mut self, xmp: PacketPtr) -> Result<&mut Packet, ErrorCode> {
        self.packets.get_mut(&xmp.addr()).ok_or(ErrorCode::BadObject)
    }

    fn file_mut(&mut self, file: FilePtr) -> Result<&mut OpenFile, ErrorCode> {
        self.files.get_mut(&file.addr()).ok_or(ErrorCode::BadObject)
    }

    fn write(&mut self, string: StringPtr, text: &str) -> Result<(), ErrorCode> {
        self.write_bytes(string, text.as_bytes())
    }

    fn write_bytes(&mut self, string: StringPtr, bytes: &[u8]) -> Result<(), ErrorCode> {
        let buffer = self
            .strings
            .get_mut(&string.addr())
            .ok_or(ErrorCode::BadObject)?;
        buffer.clear();
        buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Schema URI and expanded steps of a property path
    fn resolve(&self, schema: &str, path: &str) -> Result<(String, Vec<Step>), ErrorCode> {
        let prefix = self.registry.prefix(schema).ok_or(ErrorCode::BadSchema)?;
        let steps = expand_path(path, prefix, &self.registry)?;
        Ok((schema.to_string(), steps))
    }

    fn resolve_c(&self, schema: &CStr, name: &CStr) -> Result<(String, Vec<Step>), ErrorCode> {
        self.resolve(text(schema)?, text(name)?)
    }

    /// Value and options of a property, `None` when absent
    fn lookup(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
    ) -> Result<Option<(String, u32)>, ErrorCode> {
        let (uri, steps) = self.resolve_c(schema, name)?;
        Ok(self
            .packet(xmp)?
            .find(&uri, &steps)
            .map(|node| (node.value.clone(), node.options.bits())))
    }

    /// The alt-text array at `name`, if present
    ///
    /// With `create`, a missing array is created and an array whose items
    /// all carry a language is promoted to alt-text.
    fn alt_text_array(
        &mut self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        create: bool,
    ) -> Result<Option<&mut XmpNode>, ErrorCode> {
        let (uri, steps) = self.resolve_c(schema, name)?;
        let packet = self.packet_mut(xmp)?;
        let array = if create {
            packet.find_or_create(&uri, &steps)?
        } else {
            match packet.find_checked(&uri, &steps)? {
                Some(array) => array,
                None => return Ok(None),
            }
        };
        if !array.options.is_alt_text() {
            let promotable = array.children.iter().all(|item| item.lang().is_some());
            if !create || !array.value.is_empty() || array.options.is_struct() || !promotable {
                return Err(ErrorCode::BadXPath);
            }
            array.options |= PropFlags::ARRAY_IS_ALTTEXT.normalized();
        }
        Ok(Some(array))
    }
}

fn text(s: &CStr) -> Result<&str, ErrorCode> {
    s.to_str().map_err(|_| ErrorCode::BadUnicode)
}

fn host_path(s: &CStr) -> Result<PathBuf, ErrorCode> {
    bytes_to_path(s.to_bytes()).ok_or(ErrorCode::BadUnicode)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

/// Decimal, or hexadecimal with a `0x` prefix
fn parse_i64(s: &str) -> Option<i64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// In-memory implementation of [`Engine`]
///
/// Single threaded like the native engine; all state sits behind a
/// `RefCell`. Handles are small distinct integers and stay valid until freed
/// or until `terminate`.
///
/// Clones share their state, so a clone kept outside a
/// [`Context`](crate::Context) can inspect the handles the context holds.
#[derive(Clone)]
pub struct MemoryEngine {
    state: Rc<RefCell<State>>,
    last_error: Rc<Cell<i32>>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("live_packets", &self.live_packets())
            .field("live_strings", &self.live_strings())
            .field("last_error", &self.last_error.get())
            .finish()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State::new())),
            last_error: Rc::new(Cell::new(0)),
        }
    }

    /// Number of packet handles not yet freed
    pub fn live_packets(&self) -> usize {
        self.state.borrow().packets.len()
    }

    /// Number of string handles not yet freed
    pub fn live_strings(&self) -> usize {
        self.state.borrow().strings.len()
    }

    /// Number of iterator handles not yet freed
    pub fn live_iterators(&self) -> usize {
        self.state.borrow().iterators.len()
    }

    /// Number of file handles not yet freed
    pub fn live_files(&self) -> usize {
        self.state.borrow().files.len()
    }

    /// Whether a packet has been stored for `path` by a file closed after `put_xmp`
    pub fn has_stored_packet(&self, path: impl AsRef<Path>) -> bool {
        self.state.borrow().store.contains_key(path.as_ref())
    }

    /// Run one entry point: reset the last error, record a failure code
    fn call<T>(&self, failed: T, op: impl FnOnce(&mut State) -> Result<T, ErrorCode>) -> T {
        self.last_error.set(0);
        let result = op(&mut self.state.borrow_mut());
        match result {
            Ok(value) => value,
            Err(code) => {
                log::trace!("memory engine: {}", code);
                self.last_error.set(code.code());
                failed
            }
        }
    }

    fn get_typed<T>(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut T,
        options: &mut u32,
        convert: impl FnOnce(&str) -> Option<T>,
    ) -> bool {
        self.call(false, |state| {
            let Some((text, bits)) = state.lookup(xmp, schema, name)? else {
                return Ok(false);
            };
            *value = convert(&text).ok_or(ErrorCode::BadValue)?;
            *options = bits;
            Ok(true)
        })
    }

    fn set_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &str,
        options: u32,
    ) -> bool {
        self.call(false, |state| {
            let (uri, steps) = state.resolve_c(schema, name)?;
            state
                .packet_mut(xmp)?
                .find_or_create(&uri, &steps)?
                .assign(value, PropFlags::from_bits_retain(options))?;
            Ok(true)
        })
    }
}

impl Engine for MemoryEngine {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn init(&self) -> bool {
        self.call(false, |_| Ok(true))
    }

    fn terminate(&self) {
        self.call((), |state| {
            state.packets.clear();
            state.strings.clear();
            state.iterators.clear();
            state.files.clear();
            Ok(())
        })
    }

    fn get_error(&self) -> i32 {
        self.last_error.get()
    }

    fn new_empty(&self) -> Option<PacketPtr> {
        self.call(None, |state| {
            let id = state.alloc();
            state.packets.insert(id, Packet::default());
            Ok(PacketPtr::from_raw(id))
        })
    }

    fn copy(&self, xmp: PacketPtr) -> Option<PacketPtr> {
        self.call(None, |state| {
            let packet = state.packet(xmp)?.clone();
            let id = state.alloc();
            state.packets.insert(id, packet);
            Ok(PacketPtr::from_raw(id))
        })
    }

    fn free(&self, xmp: PacketPtr) -> bool {
        self.call(false, |state| {
            state.packets.remove(&xmp.addr()).ok_or(ErrorCode::BadObject)?;
            Ok(true)
        })
    }

    fn parse(&self, xmp: PacketPtr, _buffer: &[u8]) -> bool {
        self.call(false, |state| {
            state.packet(xmp)?;
            Err(ErrorCode::Unimplemented)
        })
    }

    fn serialize_and_format(
        &self,
        xmp: PacketPtr,
        buffer: StringPtr,
        options: u32,
        _padding: u32,
        _newline: &CStr,
        _tab: &CStr,
        _indent: i32,
    ) -> bool {
        self.call(false, |state| {
            state.packet(xmp)?;
            if !state.strings.contains_key(&buffer.addr()) {
                return Err(ErrorCode::BadObject);
            }
            let flags = SerialFlags::from_bits_retain(options);
            if flags.contains(SerialFlags::OMIT_PACKET_WRAPPER)
                && flags.intersects(SerialFlags::NEEDS_WRAPPER)
            {
                return Err(ErrorCode::BadOptions);
            }
            Err(ErrorCode::Unimplemented)
        })
    }

    fn string_new(&self) -> Option<StringPtr> {
        self.call(None, |state| {
            let id = state.alloc();
            state.strings.insert(id, Vec::new());
            Ok(StringPtr::from_raw(id))
        })
    }

    fn string_free(&self, string: StringPtr) {
        self.call((), |state| {
            state.strings.remove(&string.addr()).ok_or(ErrorCode::BadObject)?;
            Ok(())
        })
    }

    fn string_bytes(&self, string: StringPtr) -> Vec<u8> {
        self.call(Vec::new(), |state| {
            state
                .strings
                .get(&string.addr())
                .cloned()
                .ok_or(ErrorCode::BadObject)
        })
    }

    fn register_namespace(
        &self,
        uri: &CStr,
        suggested_prefix: &CStr,
        registered_prefix: Option<StringPtr>,
    ) -> bool {
        self.call(false, |state| {
            let prefix = state
                .registry
                .register(text(uri)?, text(suggested_prefix)?)
                .ok_or(ErrorCode::BadParam)?;
            if let Some(out) = registered_prefix {
                state.write(out, &format!("{}:", prefix))?;
            }
            Ok(true)
        })
    }

    fn namespace_prefix(&self, uri: &CStr, prefix: StringPtr) -> bool {
        self.call(false, |state| {
            let Some(found) = state.registry.prefix(text(uri)?).map(|p| format!("{}:", p)) else {
                return Ok(false);
            };
            state.write(prefix, &found)?;
            Ok(true)
        })
    }

    fn prefix_namespace_uri(&self, prefix: &CStr, uri: StringPtr) -> bool {
        self.call(false, |state| {
            let Some(found) = state.registry.uri(text(prefix)?).map(str::to_string) else {
                return Ok(false);
            };
            state.write(uri, &found)?;
            Ok(true)
        })
    }

    fn get_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        self.call(false, |state| {
            let Some((text, bits)) = state.lookup(xmp, schema, name)? else {
                return Ok(false);
            };
            state.write(value, &text)?;
            *options = bits;
            Ok(true)
        })
    }

    fn get_property_date(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut RawDateTime,
        options: &mut u32,
    ) -> bool {
        self.get_typed(xmp, schema, name, value, options, parse_date_time)
    }

    fn get_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut bool,
        options: &mut u32,
    ) -> bool {
        self.get_typed(xmp, schema, name, value, options, parse_bool)
    }

    fn get_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i32,
        options: &mut u32,
    ) -> bool {
        self.get_typed(xmp, schema, name, value, options, |s| {
            parse_i64(s).and_then(|v| i32::try_from(v).ok())
        })
    }

    fn get_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i64,
        options: &mut u32,
    ) -> bool {
        self.get_typed(xmp, schema, name, value, options, parse_i64)
    }

    fn get_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut f64,
        options: &mut u32,
    ) -> bool {
        self.get_typed(xmp, schema, name, value, options, |s| s.trim().parse().ok())
    }

    fn set_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &CStr,
        options: u32,
    ) -> bool {
        match text(value) {
            Ok(value) => self.set_text(xmp, schema, name, value, options),
            Err(code) => self.call(false, |_| Err(code)),
        }
    }

    fn set_property_date(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &RawDateTime,
        options: u32,
    ) -> bool {
        self.set_text(xmp, schema, name, &format_date_time(value), options)
    }

    fn set_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: bool,
        options: u32,
    ) -> bool {
        self.set_text(xmp, schema, name, format_bool(value), options)
    }

    fn set_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i32,
        options: u32,
    ) -> bool {
        self.set_text(xmp, schema, name, &value.to_string(), options)
    }

    fn set_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i64,
        options: u32,
    ) -> bool {
        self.set_text(xmp, schema, name, &value.to_string(), options)
    }

    fn set_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: f64,
        options: u32,
    ) -> bool {
        self.set_text(xmp, schema, name, &value.to_string(), options)
    }

    fn delete_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool {
        self.call(false, |state| {
            let (uri, steps) = state.resolve_c(schema, name)?;
            state.packet_mut(xmp)?.delete(&uri, &steps)?;
            Ok(true)
        })
    }

    fn has_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool {
        self.call(false, |state| Ok(state.lookup(xmp, schema, name)?.is_some()))
    }

    fn get_array_item(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        index: i32,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        self.call(false, |state| {
            let (uri, mut steps) = state.resolve_c(schema, name)?;
            steps.push(match index {
                -1 => Step::Last,
                i if i >= 1 => Step::Index(i as usize),
                _ => return Err(ErrorCode::BadIndex),
            });
            let Some(item) = state.packet(xmp)?.find(&uri, &steps) else {
                return Ok(false);
            };
            let (text, bits) = (item.value.clone(), item.options.bits());
            state.write(value, &text)?;
            *options = bits;
            Ok(true)
        })
    }

    fn set_array_item(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        index: i32,
        value: &CStr,
        options: u32,
    ) -> bool {
        self.call(false, |state| {
            let value = text(value)?;
            let (uri, steps) = state.resolve_c(schema, name)?;
            let Some(array) = state.packet_mut(xmp)?.find_checked(&uri, &steps)? else {
                return Err(ErrorCode::BadXPath);
            };
            if !array.is_array() {
                return Err(ErrorCode::BadXPath);
            }
            let flags = PropFlags::from_bits_retain(options);
            let len = array.children.len();
            let index = match index {
                -1 => len,
                i if i >= 0 => i as usize,
                _ => return Err(ErrorCode::BadIndex),
            };

            let mut item = XmpNode::new(ITEM_NAME);
            item.assign(value, flags)?;
            if flags.contains(PropFlags::INSERT_AFTER_ITEM) {
                if index > len {
                    return Err(ErrorCode::BadIndex);
                }
                array.children.insert(index, item);
            } else if flags.contains(PropFlags::INSERT_BEFORE_ITEM) {
                if index == 0 || index > len + 1 {
                    return Err(ErrorCode::BadIndex);
                }
                array.children.insert(index - 1, item);
            } else if (1..=len).contains(&index) {
                array.children[index - 1].assign(value, flags)?;
            } else if index == len + 1 {
                array.children.push(item);
            } else {
                return Err(ErrorCode::BadIndex);
            }
            Ok(true)
        })
    }

    fn append_array_item(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        array_options: u32,
        value: &CStr,
        options: u32,
    ) -> bool {
        self.call(false, |state| {
            let value = text(value)?;
            let (uri, steps) = state.resolve_c(schema, name)?;
            let packet = state.packet_mut(xmp)?;
            let form = PropFlags::from_bits_retain(array_options).normalized();

            let existing = packet.find_checked(&uri, &steps)?.map(|node| node.options);
            match existing {
                Some(current) if !current.is_array() => return Err(ErrorCode::BadXPath),
                Some(current) => {
                    let mask = PropFlags::ARRAY_FORM_MASK;
                    if !form.is_empty() && (form & mask) != (current & mask) {
                        return Err(ErrorCode::BadOptions);
                    }
                }
                None if !form.is_array() => return Err(ErrorCode::BadOptions),
                None => {}
            }

            let mut item = XmpNode::new(ITEM_NAME);
            item.assign(value, PropFlags::from_bits_retain(options))?;
            let array = packet.find_or_create(&uri, &steps)?;
            if existing.is_none() {
                array.assign("", form)?;
            }
            array.children.push(item);
            Ok(true)
        })
    }

    fn get_localized_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        generic_lang: Option<&CStr>,
        specific_lang: &CStr,
        actual_lang: StringPtr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        self.call(false, |state| {
            let generic = generic_lang.map(text).transpose()?;
            let specific = text(specific_lang)?;
            let Some(array) = state.alt_text_array(xmp, schema, name, false)? else {
                return Ok(false);
            };
            let chosen = alt_text::choose_localized(&array.children, generic, specific);
            let Some(item) = chosen.index().and_then(|i| array.children.get(i)) else {
                return Ok(false);
            };
            let lang = item
                .qualifier(tree::XML_LANG)
                .map(|q| q.value.clone())
                .unwrap_or_default();
            let (text, bits) = (item.value.clone(), item.options.bits());
            state.write(actual_lang, &lang)?;
            state.write(value, &text)?;
            *options = bits;
            Ok(true)
        })
    }

    fn set_localized_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        generic_lang: Option<&CStr>,
        specific_lang: &CStr,
        value: &CStr,
        options: u32,
    ) -> bool {
        // Items are always simple values; bits other than the composite
        // forms are accepted and ignored
        self.call(false, |state| {
            if PropFlags::from_bits_retain(options).intersects(PropFlags::COMPOSITE_MASK) {
                return Err(ErrorCode::BadOptions);
            }
            let generic = generic_lang.map(text).transpose()?;
            let specific = text(specific_lang)?;
            let value = text(value)?;
            if specific.is_empty() {
                return Err(ErrorCode::BadParam);
            }
            if let Some(array) = state.alt_text_array(xmp, schema, name, true)? {
                alt_text::set_localized(array, generic, specific, value);
            }
            Ok(true)
        })
    }

    fn delete_localized_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        generic_lang: Option<&CStr>,
        specific_lang: &CStr,
    ) -> bool {
        self.call(false, |state| {
            let generic = generic_lang.map(text).transpose()?;
            let specific = text(specific_lang)?;
            if let Some(array) = state.alt_text_array(xmp, schema, name, false)? {
                alt_text::delete_localized(array, generic, specific);
            }
            Ok(true)
        })
    }

    fn iterator_new(
        &self,
        xmp: PacketPtr,
        schema: Option<&CStr>,
        name: Option<&CStr>,
        options: u32,
    ) -> Option<IteratorPtr> {
        self.call(None, |state| {
            match IterFlags::split(options) {
                (Some(IterClass::Properties), _) => {}
                (Some(_), _) => return Err(ErrorCode::Unimplemented),
                (None, _) => return Err(ErrorCode::BadOptions),
            }
            let flags = IterFlags::split(options).1;
            let schema = schema.map(text).transpose()?.filter(|s| !s.is_empty());
            let name = name.map(text).transpose()?.filter(|s| !s.is_empty());

            let scope = match (schema, name) {
                (None, None) => Scope::Everything,
                (Some(uri), None) => Scope::Schema(uri),
                (Some(uri), Some(path)) => Scope::Property(uri, state.resolve(uri, path)?.1),
                (None, Some(_)) => return Err(ErrorCode::BadSchema),
            };
            let cursor = Cursor::new(state.packet(xmp)?, scope, flags);
            let id = state.alloc();
            state.iterators.insert(id, cursor);
            Ok(IteratorPtr::from_raw(id))
        })
    }

    fn iterator_next(
        &self,
        iter: IteratorPtr,
        schema: StringPtr,
        path: StringPtr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        self.call(false, |state| {
            let cursor = state
                .iterators
                .get_mut(&iter.addr())
                .ok_or(ErrorCode::BadObject)?;
            let Some(row) = cursor.next_row().cloned() else {
                return Ok(false);
            };
            state.write(schema, &row.schema)?;
            state.write(path, &row.path)?;
            state.write(value, &row.value)?;
            *options = row.options;
            Ok(true)
        })
    }

    fn iterator_skip(&self, iter: IteratorPtr, options: u32) -> bool {
        self.call(false, |state| {
            state
                .iterators
                .get_mut(&iter.addr())
                .ok_or(ErrorCode::BadObject)?
                .skip(options)?;
            Ok(true)
        })
    }

    fn iterator_free(&self, iter: IteratorPtr) -> bool {
        self.call(false, |state| {
            state.iterators.remove(&iter.addr()).ok_or(ErrorCode::BadObject)?;
            Ok(true)
        })
    }

    fn files_new(&self) -> Option<FilePtr> {
        self.call(None, |state| {
            let id = state.alloc();
            state.files.insert(id, OpenFile::default());
            Ok(FilePtr::from_raw(id))
        })
    }

    fn files_open_new(&self, path: &CStr, options: u32) -> Option<FilePtr> {
        let file = self.files_new()?;
        if self.files_open(file, path, options) {
            return Some(file);
        }
        // Keep the open failure as the reported error
        let code = self.last_error.get();
        self.files_free(file);
        self.last_error.set(code);
        None
    }

    fn files_open(&self, file: FilePtr, path: &CStr, options: u32) -> bool {
        self.call(false, |state| {
            let path = host_path(path)?;
            if state.file_mut(file)?.is_open() {
                return Err(ErrorCode::BadParam);
            }
            if !path.exists() {
                return Err(ErrorCode::ExternalFailure);
            }
            let format = files::detect_format(&path);
            let flags = OpenFlags::from_bits_retain(options);
            if flags.contains(OpenFlags::USE_SMART_HANDLER)
                && files::handler_flags(format).is_none()
            {
                return Err(ErrorCode::NoFileHandler);
            }
            let packet = state.store.get(&path).cloned();
            let open = state.file_mut(file)?;
            open.path = Some(path);
            open.options = options;
            open.format = Some(format);
            open.packet = packet;
            Ok(true)
        })
    }

    fn files_close(&self, file: FilePtr, _options: u32) -> bool {
        self.call(false, |state| {
            if let Some((path, packet)) = state.file_mut(file)?.close() {
                state.store.insert(path, packet);
            }
            Ok(true)
        })
    }

    fn files_get_new_xmp(&self, file: FilePtr) -> Option<PacketPtr> {
        self.call(None, |state| {
            let open = state.file_mut(file)?;
            if !open.is_open() {
                return Err(ErrorCode::BadObject);
            }
            let Some(packet) = open.packet.clone() else {
                return Ok(None);
            };
            let id = state.alloc();
            state.packets.insert(id, packet);
            Ok(PacketPtr::from_raw(id))
        })
    }

    fn files_get_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool {
        self.call(false, |state| {
            state.packet(xmp)?;
            let open = state.file_mut(file)?;
            if !open.is_open() {
                return Err(ErrorCode::BadObject);
            }
            let Some(packet) = open.packet.clone() else {
                return Ok(false);
            };
            *state.packet_mut(xmp)? = packet;
            Ok(true)
        })
    }

    fn files_can_put_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool {
        self.call(false, |state| {
            state.packet(xmp)?;
            let open = state.file_mut(file)?;
            Ok(open.is_open() && OpenFlags::from_bits_retain(open.options).is_for_update())
        })
    }

    fn files_put_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool {
        self.call(false, |state| {
            let packet = state.packet(xmp)?.clone();
            let open = state.file_mut(file)?;
            if !open.is_open() {
                return Err(ErrorCode::BadObject);
            }
            if !OpenFlags::from_bits_retain(open.options).is_for_update() {
                return Err(ErrorCode::BadParam);
            }
            open.packet = Some(packet);
            open.pending = true;
            Ok(true)
        })
    }

    fn files_get_file_info(
        &self,
        file: FilePtr,
        path: StringPtr,
        options: &mut u32,
        format: &mut u32,
        handler_flags: &mut u32,
    ) -> bool {
        self.call(false, |state| {
            let open = state.file_mut(file)?;
            let (Some(open_path), Some(open_format)) = (open.path.clone(), open.format) else {
                return Ok(false);
            };
            let open_options = open.options;
            let bytes = path_to_bytes(&open_path).ok_or(ErrorCode::BadUnicode)?;
            state.write_bytes(path, bytes)?;
            *options = open_options;
            *format = open_format.raw();
            *handler_flags = files::handler_flags(open_format).map_or(0, |f| f.bits());
            Ok(true)
        })
    }

    fn files_free(&self, file: FilePtr) -> bool {
        self.call(false, |state| {
            state.files.remove(&file.addr()).ok_or(ErrorCode::BadObject)?;
            Ok(true)
        })
    }

    fn files_check_file_format(&self, path: &CStr) -> u32 {
        let unknown = FileType::Unknown.raw();
        self.call(unknown, |_| {
            let path = host_path(path)?;
            if !path.exists() {
                return Ok(unknown);
            }
            Ok(files::detect_format(&path).raw())
        })
    }

    fn files_get_format_info(&self, format: u32, flags: &mut u32) -> bool {
        self.call(false, |_| {
            let Some(found) = files::handler_flags(FileType::from_raw(format)) else {
                return Ok(false);
            };
            *flags = found.bits();
            Ok(true)
        })
    }
}
