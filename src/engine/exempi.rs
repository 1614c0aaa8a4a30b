//! Native engine backed by `libexempi`
//!
//! The declarations follow `exempi/xmp.h`. Exempi keeps its registry and
//! handler tables in process-wide state, so at most one [`ExempiEngine`]
//! may be alive at a time.

use super::{Engine, FilePtr, IteratorPtr, PacketPtr, RawDateTime, StringPtr};
use crate::core::error::{XmpError, XmpResult};
use std::ffi::{c_char, c_void, CStr};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};

mod sys {
    use super::RawDateTime;
    use std::ffi::{c_char, c_void};

    pub type XmpPtr = *mut c_void;
    pub type XmpFilePtr = *mut c_void;
    pub type XmpStringPtr = *mut c_void;
    pub type XmpIteratorPtr = *mut c_void;

    #[link(name = "exempi")]
    extern "C" {
        pub fn xmp_init() -> bool;
        pub fn xmp_terminate();
        pub fn xmp_get_error() -> i32;

        pub fn xmp_new_empty() -> XmpPtr;
        pub fn xmp_copy(xmp: XmpPtr) -> XmpPtr;
        pub fn xmp_free(xmp: XmpPtr) -> bool;
        pub fn xmp_parse(xmp: XmpPtr, buffer: *const c_char, len: usize) -> bool;
        pub fn xmp_serialize_and_format(
            xmp: XmpPtr,
            buffer: XmpStringPtr,
            options: u32,
            padding: u32,
            newline: *const c_char,
            tab: *const c_char,
            indent: i32,
        ) -> bool;

        pub fn xmp_string_new() -> XmpStringPtr;
        pub fn xmp_string_free(s: XmpStringPtr);
        pub fn xmp_string_cstr(s: XmpStringPtr) -> *const c_char;

        pub fn xmp_register_namespace(
            namespace_uri: *const c_char,
            suggested_prefix: *const c_char,
            registered_prefix: XmpStringPtr,
        ) -> bool;
        pub fn xmp_namespace_prefix(ns: *const c_char, prefix: XmpStringPtr) -> bool;
        pub fn xmp_prefix_namespace_uri(prefix: *const c_char, ns: XmpStringPtr) -> bool;

        pub fn xmp_get_property(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            property: XmpStringPtr,
            props_bits: *mut u32,
        ) -> bool;
        pub fn xmp_get_property_date(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            property: *mut RawDateTime,
            props_bits: *mut u32,
        ) -> bool;
        pub fn xmp_get_property_float(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            property: *mut f64,
            props_bits: *mut u32,
        ) -> bool;
        pub fn xmp_get_property_bool(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            property: *mut bool,
            props_bits: *mut u32,
        ) -> bool;
        pub fn xmp_get_property_int32(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            property: *mut i32,
            props_bits: *mut u32,
        ) -> bool;
        pub fn xmp_get_property_int64(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            property: *mut i64,
            props_bits: *mut u32,
        ) -> bool;

        pub fn xmp_set_property(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            value: *const c_char,
            option_bits: u32,
        ) -> bool;
        pub fn xmp_set_property_date(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            value: *const RawDateTime,
            option_bits: u32,
        ) -> bool;
        pub fn xmp_set_property_float(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            value: f64,
            option_bits: u32,
        ) -> bool;
        pub fn xmp_set_property_bool(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            value: bool,
            option_bits: u32,
        ) -> bool;
        pub fn xmp_set_property_int32(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            value: i32,
            option_bits: u32,
        ) -> bool;
        pub fn xmp_set_property_int64(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            value: i64,
            option_bits: u32,
        ) -> bool;

        pub fn xmp_delete_property(xmp: XmpPtr, schema: *const c_char, name: *const c_char) -> bool;
        pub fn xmp_has_property(xmp: XmpPtr, schema: *const c_char, name: *const c_char) -> bool;

        pub fn xmp_get_array_item(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            index: i32,
            property: XmpStringPtr,
            props_bits: *mut u32,
        ) -> bool;
        pub fn xmp_set_array_item(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            index: i32,
            value: *const c_char,
            option_bits: u32,
        ) -> bool;
        pub fn xmp_append_array_item(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            array_options: u32,
            value: *const c_char,
            option_bits: u32,
        ) -> bool;

        pub fn xmp_get_localized_text(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            generic_lang: *const c_char,
            specific_lang: *const c_char,
            actual_lang: XmpStringPtr,
            item_value: XmpStringPtr,
            prop_bits: *mut u32,
        ) -> bool;
        pub fn xmp_set_localized_text(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            generic_lang: *const c_char,
            specific_lang: *const c_char,
            value: *const c_char,
            options: u32,
        ) -> bool;
        pub fn xmp_delete_localized_text(
            xmp: XmpPtr,
            schema: *const c_char,
            name: *const c_char,
            generic_lang: *const c_char,
            specific_lang: *const c_char,
        ) -> bool;

        pub fn xmp_iterator_new(
            xmp: XmpPtr,
            schema: *const c_char,
            prop_name: *const c_char,
            options: u32,
        ) -> XmpIteratorPtr;
        pub fn xmp_iterator_next(
            iter: XmpIteratorPtr,
            schema: XmpStringPtr,
            prop_name: XmpStringPtr,
            prop_value: XmpStringPtr,
            options: *mut u32,
        ) -> bool;
        pub fn xmp_iterator_skip(iter: XmpIteratorPtr, options: u32) -> bool;
        pub fn xmp_iterator_free(iter: XmpIteratorPtr) -> bool;

        pub fn xmp_files_new() -> XmpFilePtr;
        pub fn xmp_files_open_new(path: *const c_char, options: u32) -> XmpFilePtr;
        pub fn xmp_files_open(xf: XmpFilePtr, path: *const c_char, options: u32) -> bool;
        pub fn xmp_files_close(xf: XmpFilePtr, options: u32) -> bool;
        pub fn xmp_files_get_new_xmp(xf: XmpFilePtr) -> XmpPtr;
        pub fn xmp_files_get_xmp(xf: XmpFilePtr, xmp: XmpPtr) -> bool;
        pub fn xmp_files_can_put_xmp(xf: XmpFilePtr, xmp: XmpPtr) -> bool;
        pub fn xmp_files_put_xmp(xf: XmpFilePtr, xmp: XmpPtr) -> bool;
        pub fn xmp_files_get_file_info(
            xf: XmpFilePtr,
            file_path: XmpStringPtr,
            options: *mut u32,
            file_format: *mut u32,
            handler_flags: *mut u32,
        ) -> bool;
        pub fn xmp_files_free(xf: XmpFilePtr) -> bool;
        pub fn xmp_files_check_file_format(path: *const c_char) -> u32;
        pub fn xmp_files_get_format_info(format: u32, options: *mut u32) -> bool;
    }
}

/// Set while an [`ExempiEngine`] is alive
static ACQUIRED: AtomicBool = AtomicBool::new(false);

/// The native engine
///
/// Holding one is the process-wide claim on `libexempi`; dropping it releases
/// the claim. `init`/`terminate` are still issued by the owning
/// [`Context`](super::Context).
#[derive(Debug)]
pub struct ExempiEngine {
    _private: (),
}

impl ExempiEngine {
    /// Claim the native engine
    ///
    /// Fails with [`XmpError::AlreadyInitialized`] while another instance is
    /// alive.
    pub fn acquire() -> XmpResult<Self> {
        if ACQUIRED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(XmpError::AlreadyInitialized);
        }
        Ok(Self { _private: () })
    }
}

impl Drop for ExempiEngine {
    fn drop(&mut self) {
        ACQUIRED.store(false, Ordering::Release);
    }
}

fn packet(xmp: PacketPtr) -> sys::XmpPtr {
    xmp.addr() as sys::XmpPtr
}

fn file(xf: FilePtr) -> sys::XmpFilePtr {
    xf.addr() as sys::XmpFilePtr
}

fn string(s: StringPtr) -> sys::XmpStringPtr {
    s.addr() as sys::XmpStringPtr
}

fn iterator(iter: IteratorPtr) -> sys::XmpIteratorPtr {
    iter.addr() as sys::XmpIteratorPtr
}

fn opt_cstr(s: Option<&CStr>) -> *const c_char {
    s.map_or(ptr::null(), CStr::as_ptr)
}

// SAFETY (all calls below): every pointer handed to libexempi is either a
// live handle previously returned by it, a NUL-terminated string borrowed
// for the duration of the call, or a valid out-parameter reference.
impl Engine for ExempiEngine {
    fn name(&self) -> &'static str {
        "exempi"
    }

    fn init(&self) -> bool {
        unsafe { sys::xmp_init() }
    }

    fn terminate(&self) {
        unsafe { sys::xmp_terminate() }
    }

    fn get_error(&self) -> i32 {
        unsafe { sys::xmp_get_error() }
    }

    fn new_empty(&self) -> Option<PacketPtr> {
        PacketPtr::from_raw(unsafe { sys::xmp_new_empty() } as usize)
    }

    fn copy(&self, xmp: PacketPtr) -> Option<PacketPtr> {
        PacketPtr::from_raw(unsafe { sys::xmp_copy(packet(xmp)) } as usize)
    }

    fn free(&self, xmp: PacketPtr) -> bool {
        unsafe { sys::xmp_free(packet(xmp)) }
    }

    fn parse(&self, xmp: PacketPtr, buffer: &[u8]) -> bool {
        unsafe { sys::xmp_parse(packet(xmp), buffer.as_ptr().cast(), buffer.len()) }
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
        unsafe {
            sys::xmp_serialize_and_format(
                packet(xmp),
                string(buffer),
                options,
                padding,
                newline.as_ptr(),
                tab.as_ptr(),
                indent,
            )
        }
    }

    fn string_new(&self) -> Option<StringPtr> {
        StringPtr::from_raw(unsafe { sys::xmp_string_new() } as usize)
    }

    fn string_free(&self, s: StringPtr) {
        unsafe { sys::xmp_string_free(string(s)) }
    }

    fn string_bytes(&self, s: StringPtr) -> Vec<u8> {
        let raw = unsafe { sys::xmp_string_cstr(string(s)) };
        if raw.is_null() {
            return Vec::new();
        }
        // The bytes stay owned by the string handle; copy them out
        unsafe { CStr::from_ptr(raw) }.to_bytes().to_vec()
    }

    fn register_namespace(
        &self,
        uri: &CStr,
        suggested_prefix: &CStr,
        registered_prefix: Option<StringPtr>,
    ) -> bool {
        let out = registered_prefix.map_or(ptr::null_mut::<c_void>(), string);
        unsafe { sys::xmp_register_namespace(uri.as_ptr(), suggested_prefix.as_ptr(), out) }
    }

    fn namespace_prefix(&self, uri: &CStr, prefix: StringPtr) -> bool {
        unsafe { sys::xmp_namespace_prefix(uri.as_ptr(), string(prefix)) }
    }

    fn prefix_namespace_uri(&self, prefix: &CStr, uri: StringPtr) -> bool {
        unsafe { sys::xmp_prefix_namespace_uri(prefix.as_ptr(), string(uri)) }
    }

    fn get_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_get_property(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                string(value),
                options,
            )
        }
    }

    fn get_property_date(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut RawDateTime,
        options: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_get_property_date(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn get_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut bool,
        options: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_get_property_bool(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn get_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i32,
        options: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_get_property_int32(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn get_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i64,
        options: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_get_property_int64(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn get_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut f64,
        options: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_get_property_float(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn set_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &CStr,
        options: u32,
    ) -> bool {
        unsafe {
            sys::xmp_set_property(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                value.as_ptr(),
                options,
            )
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
        unsafe {
            sys::xmp_set_property_date(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn set_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: bool,
        options: u32,
    ) -> bool {
        unsafe {
            sys::xmp_set_property_bool(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn set_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i32,
        options: u32,
    ) -> bool {
        unsafe {
            sys::xmp_set_property_int32(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn set_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i64,
        options: u32,
    ) -> bool {
        unsafe {
            sys::xmp_set_property_int64(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn set_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: f64,
        options: u32,
    ) -> bool {
        unsafe {
            sys::xmp_set_property_float(packet(xmp), schema.as_ptr(), name.as_ptr(), value, options)
        }
    }

    fn delete_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool {
        unsafe { sys::xmp_delete_property(packet(xmp), schema.as_ptr(), name.as_ptr()) }
    }

    fn has_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool {
        unsafe { sys::xmp_has_property(packet(xmp), schema.as_ptr(), name.as_ptr()) }
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
        unsafe {
            sys::xmp_get_array_item(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                index,
                string(value),
                options,
            )
        }
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
        unsafe {
            sys::xmp_set_array_item(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                index,
                value.as_ptr(),
                options,
            )
        }
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
        unsafe {
            sys::xmp_append_array_item(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                array_options,
                value.as_ptr(),
                options,
            )
        }
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
        unsafe {
            sys::xmp_get_localized_text(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                opt_cstr(generic_lang),
                specific_lang.as_ptr(),
                string(actual_lang),
                string(value),
                options,
            )
        }
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
        unsafe {
            sys::xmp_set_localized_text(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                opt_cstr(generic_lang),
                specific_lang.as_ptr(),
                value.as_ptr(),
                options,
            )
        }
    }

    fn delete_localized_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        generic_lang: Option<&CStr>,
        specific_lang: &CStr,
    ) -> bool {
        unsafe {
            sys::xmp_delete_localized_text(
                packet(xmp),
                schema.as_ptr(),
                name.as_ptr(),
                opt_cstr(generic_lang),
                specific_lang.as_ptr(),
            )
        }
    }

    fn iterator_new(
        &self,
        xmp: PacketPtr,
        schema: Option<&CStr>,
        name: Option<&CStr>,
        options: u32,
    ) -> Option<IteratorPtr> {
        let raw = unsafe {
            sys::xmp_iterator_new(packet(xmp), opt_cstr(schema), opt_cstr(name), options)
        };
        IteratorPtr::from_raw(raw as usize)
    }

    fn iterator_next(
        &self,
        iter: IteratorPtr,
        schema: StringPtr,
        path: StringPtr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_iterator_next(
                iterator(iter),
                string(schema),
                string(path),
                string(value),
                options,
            )
        }
    }

    fn iterator_skip(&self, iter: IteratorPtr, options: u32) -> bool {
        unsafe { sys::xmp_iterator_skip(iterator(iter), options) }
    }

    fn iterator_free(&self, iter: IteratorPtr) -> bool {
        unsafe { sys::xmp_iterator_free(iterator(iter)) }
    }

    fn files_new(&self) -> Option<FilePtr> {
        FilePtr::from_raw(unsafe { sys::xmp_files_new() } as usize)
    }

    fn files_open_new(&self, path: &CStr, options: u32) -> Option<FilePtr> {
        FilePtr::from_raw(unsafe { sys::xmp_files_open_new(path.as_ptr(), options) } as usize)
    }

    fn files_open(&self, xf: FilePtr, path: &CStr, options: u32) -> bool {
        unsafe { sys::xmp_files_open(file(xf), path.as_ptr(), options) }
    }

    fn files_close(&self, xf: FilePtr, options: u32) -> bool {
        unsafe { sys::xmp_files_close(file(xf), options) }
    }

    fn files_get_new_xmp(&self, xf: FilePtr) -> Option<PacketPtr> {
        PacketPtr::from_raw(unsafe { sys::xmp_files_get_new_xmp(file(xf)) } as usize)
    }

    fn files_get_xmp(&self, xf: FilePtr, xmp: PacketPtr) -> bool {
        unsafe { sys::xmp_files_get_xmp(file(xf), packet(xmp)) }
    }

    fn files_can_put_xmp(&self, xf: FilePtr, xmp: PacketPtr) -> bool {
        unsafe { sys::xmp_files_can_put_xmp(file(xf), packet(xmp)) }
    }

    fn files_put_xmp(&self, xf: FilePtr, xmp: PacketPtr) -> bool {
        unsafe { sys::xmp_files_put_xmp(file(xf), packet(xmp)) }
    }

    fn files_get_file_info(
        &self,
        xf: FilePtr,
        path: StringPtr,
        options: &mut u32,
        format: &mut u32,
        handler_flags: &mut u32,
    ) -> bool {
        unsafe {
            sys::xmp_files_get_file_info(file(xf), string(path), options, format, handler_flags)
        }
    }

    fn files_free(&self, xf: FilePtr) -> bool {
        unsafe { sys::xmp_files_free(file(xf)) }
    }

    fn files_check_file_format(&self, path: &CStr) -> u32 {
        unsafe { sys::xmp_files_check_file_format(path.as_ptr()) }
    }

    fn files_get_format_info(&self, format: u32, flags: &mut u32) -> bool {
        unsafe { sys::xmp_files_get_format_info(format, flags) }
    }
}
