//! Shared fixtures for the integration tests

#![allow(dead_code)]

use libxmp::engine::{FilePtr, IteratorPtr, PacketPtr, StringPtr};
use libxmp::{Context, Engine, MemoryEngine, RawDateTime};
use std::cell::Cell;
use std::ffi::CStr;
use std::io::Write;
use std::rc::Rc;
use tempfile::NamedTempFile;

pub const NS1: &str = "ns:test1/";
pub const NS2: &str = "ns:test2/";

/// Install a logger once; repeated calls are harmless
pub fn init_logger() {
    _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::max())
        .try_init();
}

/// A memory context with the two test namespaces registered
pub fn context() -> (Context, MemoryEngine) {
    init_logger();
    let engine = MemoryEngine::new();
    let ctx = Context::new(engine.clone()).unwrap();
    ctx.register_namespace(NS1, "ns1").unwrap();
    ctx.register_namespace(NS2, "ns2").unwrap();
    (ctx, engine)
}

/// A temporary file starting with a JPEG signature
pub fn jpeg_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).unwrap();
    file
}

/// A temporary file whose format no handler claims
pub fn unknown_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".zzz").tempfile().unwrap();
    file.write_all(b"plain bytes").unwrap();
    file
}

/// Number of file-open calls that reached the engine
#[derive(Debug, Clone, Default)]
pub struct OpenCalls(Rc<Cell<usize>>);

impl OpenCalls {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// When set, `files_close` fails without reaching the inner engine
#[derive(Debug, Clone, Default)]
pub struct FailingClose(Rc<Cell<bool>>);

impl FailingClose {
    pub fn set(&self, fail: bool) {
        self.0.set(fail);
    }
}

/// A [`MemoryEngine`] that counts file-open calls
pub struct RecordingEngine {
    inner: MemoryEngine,
    opens: OpenCalls,
    failing_close: FailingClose,
}

impl RecordingEngine {
    pub fn new() -> (Self, OpenCalls) {
        let opens = OpenCalls::default();
        let engine = Self {
            inner: MemoryEngine::new(),
            opens: opens.clone(),
            failing_close: FailingClose::default(),
        };
        (engine, opens)
    }

    /// Switch for failing `files_close` on demand
    pub fn failing_close(&self) -> FailingClose {
        self.failing_close.clone()
    }

    /// The wrapped engine, sharing its state
    pub fn memory(&self) -> MemoryEngine {
        self.inner.clone()
    }
}

impl Engine for RecordingEngine {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn init(&self) -> bool {
        self.inner.init()
    }

    fn terminate(&self) {
        self.inner.terminate()
    }

    fn get_error(&self) -> i32 {
        self.inner.get_error()
    }

    fn new_empty(&self) -> Option<PacketPtr> {
        self.inner.new_empty()
    }

    fn copy(&self, xmp: PacketPtr) -> Option<PacketPtr> {
        self.inner.copy(xmp)
    }

    fn free(&self, xmp: PacketPtr) -> bool {
        self.inner.free(xmp)
    }

    fn parse(&self, xmp: PacketPtr, buffer: &[u8]) -> bool {
        self.inner.parse(xmp, buffer)
    }

    fn serialize_and_format(
        &self,
        xmp: PacketPtr,
        buffer: StringPtr,
        options: u32,
        padding: u32,
        newline: &CStr,
        tab: &CStr,
        indent: i32,
    ) -> bool {
        self.inner
            .serialize_and_format(xmp, buffer, options, padding, newline, tab, indent)
    }

    fn string_new(&self) -> Option<StringPtr> {
        self.inner.string_new()
    }

    fn string_free(&self, string: StringPtr) {
        self.inner.string_free(string)
    }

    fn string_bytes(&self, string: StringPtr) -> Vec<u8> {
        self.inner.string_bytes(string)
    }

    fn register_namespace(
        &self,
        uri: &CStr,
        suggested_prefix: &CStr,
        registered_prefix: Option<StringPtr>,
    ) -> bool {
        self.inner
            .register_namespace(uri, suggested_prefix, registered_prefix)
    }

    fn namespace_prefix(&self, uri: &CStr, prefix: StringPtr) -> bool {
        self.inner.namespace_prefix(uri, prefix)
    }

    fn prefix_namespace_uri(&self, prefix: &CStr, uri: StringPtr) -> bool {
        self.inner.prefix_namespace_uri(prefix, uri)
    }

    fn get_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        self.inner.get_property(xmp, schema, name, value, options)
    }

    fn get_property_date(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut RawDateTime,
        options: &mut u32,
    ) -> bool {
        self.inner.get_property_date(xmp, schema, name, value, options)
    }

    fn get_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut bool,
        options: &mut u32,
    ) -> bool {
        self.inner.get_property_bool(xmp, schema, name, value, options)
    }

    fn get_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i32,
        options: &mut u32,
    ) -> bool {
        self.inner.get_property_int32(xmp, schema, name, value, options)
    }

    fn get_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i64,
        options: &mut u32,
    ) -> bool {
        self.inner.get_property_int64(xmp, schema, name, value, options)
    }

    fn get_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut f64,
        options: &mut u32,
    ) -> bool {
        self.inner.get_property_float(xmp, schema, name, value, options)
    }

    fn set_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &CStr,
        options: u32,
    ) -> bool {
        self.inner.set_property(xmp, schema, name, value, options)
    }

    fn set_property_date(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &RawDateTime,
        options: u32,
    ) -> bool {
        self.inner.set_property_date(xmp, schema, name, value, options)
    }

    fn set_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: bool,
        options: u32,
    ) -> bool {
        self.inner.set_property_bool(xmp, schema, name, value, options)
    }

    fn set_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i32,
        options: u32,
    ) -> bool {
        self.inner.set_property_int32(xmp, schema, name, value, options)
    }

    fn set_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i64,
        options: u32,
    ) -> bool {
        self.inner.set_property_int64(xmp, schema, name, value, options)
    }

    fn set_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: f64,
        options: u32,
    ) -> bool {
        self.inner.set_property_float(xmp, schema, name, value, options)
    }

    fn delete_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool {
        self.inner.delete_property(xmp, schema, name)
    }

    fn has_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool {
        self.inner.has_property(xmp, schema, name)
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
        self.inner
            .get_array_item(xmp, schema, name, index, value, options)
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
        self.inner
            .set_array_item(xmp, schema, name, index, value, options)
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
        self.inner
            .append_array_item(xmp, schema, name, array_options, value, options)
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
        self.inner.get_localized_text(
            xmp,
            schema,
            name,
            generic_lang,
            specific_lang,
            actual_lang,
            value,
            options,
        )
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
        self.inner.set_localized_text(
            xmp,
            schema,
            name,
            generic_lang,
            specific_lang,
            value,
            options,
        )
    }

    fn delete_localized_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        generic_lang: Option<&CStr>,
        specific_lang: &CStr,
    ) -> bool {
        self.inner
            .delete_localized_text(xmp, schema, name, generic_lang, specific_lang)
    }

    fn iterator_new(
        &self,
        xmp: PacketPtr,
        schema: Option<&CStr>,
        name: Option<&CStr>,
        options: u32,
    ) -> Option<IteratorPtr> {
        self.inner.iterator_new(xmp, schema, name, options)
    }

    fn iterator_next(
        &self,
        iter: IteratorPtr,
        schema: StringPtr,
        path: StringPtr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        self.inner.iterator_next(iter, schema, path, value, options)
    }

    fn iterator_skip(&self, iter: IteratorPtr, options: u32) -> bool {
        self.inner.iterator_skip(iter, options)
    }

    fn iterator_free(&self, iter: IteratorPtr) -> bool {
        self.inner.iterator_free(iter)
    }

    fn files_new(&self) -> Option<FilePtr> {
        self.inner.files_new()
    }

    fn files_open_new(&self, path: &CStr, options: u32) -> Option<FilePtr> {
        self.opens.bump();
        self.inner.files_open_new(path, options)
    }

    fn files_open(&self, file: FilePtr, path: &CStr, options: u32) -> bool {
        self.opens.bump();
        self.inner.files_open(file, path, options)
    }

    fn files_close(&self, file: FilePtr, options: u32) -> bool {
        if self.failing_close.0.get() {
            return false;
        }
        self.inner.files_close(file, options)
    }

    fn files_get_new_xmp(&self, file: FilePtr) -> Option<PacketPtr> {
        self.inner.files_get_new_xmp(file)
    }

    fn files_get_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool {
        self.inner.files_get_xmp(file, xmp)
    }

    fn files_can_put_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool {
        self.inner.files_can_put_xmp(file, xmp)
    }

    fn files_put_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool {
        self.inner.files_put_xmp(file, xmp)
    }

    fn files_get_file_info(
        &self,
        file: FilePtr,
        path: StringPtr,
        options: &mut u32,
        format: &mut u32,
        handler_flags: &mut u32,
    ) -> bool {
        self.inner
            .files_get_file_info(file, path, options, format, handler_flags)
    }

    fn files_free(&self, file: FilePtr) -> bool {
        self.inner.files_free(file)
    }

    fn files_check_file_format(&self, path: &CStr) -> u32 {
        self.inner.files_check_file_format(path)
    }

    fn files_get_format_info(&self, format: u32, flags: &mut u32) -> bool {
        self.inner.files_get_format_info(format, flags)
    }
}
