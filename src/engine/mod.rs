//! Metadata engine seam
//!
//! [`Engine`] mirrors the native engine's C entry points one to one: boolean
//! success returns, a separate last-error channel, opaque scalar handles and
//! caller-allocated string handles for out-parameters. Everything above this
//! module talks to the engine only through this trait.

mod context;
#[cfg(feature = "exempi")]
mod exempi;
pub mod memory;

pub use context::Context;
pub(crate) use context::ensure_exists;
#[cfg(feature = "exempi")]
pub use exempi::ExempiEngine;
pub use memory::MemoryEngine;

use std::ffi::CStr;
use std::fmt;
use std::num::NonZeroUsize;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonZeroUsize);

        impl $name {
            /// Wrap a raw address; zero (the engine's null handle) yields `None`
            pub fn from_raw(addr: usize) -> Option<Self> {
                NonZeroUsize::new(addr).map(Self)
            }

            /// The raw address
            pub fn addr(self) -> usize {
                self.0.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({:#x})"), self.0)
            }
        }
    };
}

handle_type!(
    /// Handle to an in-memory metadata packet
    PacketPtr
);
handle_type!(
    /// Handle to a (possibly not yet opened) container file
    FilePtr
);
handle_type!(
    /// Handle to an engine-owned string buffer
    StringPtr
);
handle_type!(
    /// Handle to the traversal state of an iterator
    IteratorPtr
);

/// Date/time record exchanged with the engine
///
/// Field order and width match the engine's struct layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawDateTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
    /// -1 west of UTC, 0 UTC, +1 east of UTC
    pub tz_sign: i32,
    pub tz_hour: i32,
    pub tz_minute: i32,
    pub nano_second: i32,
}

/// The entry points of a metadata engine
///
/// Failure is reported the way the native library reports it: a `false` (or
/// `None` for handle constructors) return and/or a non-zero [`get_error`]
/// code. Callers must check both; see [`crate::core::error::check_result`].
///
/// Handles passed in must come from the same engine and must not have been
/// freed. The engine does not guard against use after free.
///
/// [`get_error`]: Engine::get_error
pub trait Engine {
    /// Short name for log output
    fn name(&self) -> &'static str;

    /// Initialize process-wide engine state
    fn init(&self) -> bool;
    /// Tear down process-wide engine state; all handles become invalid
    fn terminate(&self);
    /// Last error code, zero when the last call succeeded
    fn get_error(&self) -> i32;

    // Packets
    fn new_empty(&self) -> Option<PacketPtr>;
    fn copy(&self, xmp: PacketPtr) -> Option<PacketPtr>;
    fn free(&self, xmp: PacketPtr) -> bool;
    fn parse(&self, xmp: PacketPtr, buffer: &[u8]) -> bool;
    #[allow(clippy::too_many_arguments)]
    fn serialize_and_format(
        &self,
        xmp: PacketPtr,
        buffer: StringPtr,
        options: u32,
        padding: u32,
        newline: &CStr,
        tab: &CStr,
        indent: i32,
    ) -> bool;

    // Strings
    fn string_new(&self) -> Option<StringPtr>;
    fn string_free(&self, string: StringPtr);
    /// Copy out the current bytes of a string handle
    fn string_bytes(&self, string: StringPtr) -> Vec<u8>;

    // Namespace registry
    fn register_namespace(
        &self,
        uri: &CStr,
        suggested_prefix: &CStr,
        registered_prefix: Option<StringPtr>,
    ) -> bool;
    fn namespace_prefix(&self, uri: &CStr, prefix: StringPtr) -> bool;
    fn prefix_namespace_uri(&self, prefix: &CStr, uri: StringPtr) -> bool;

    // Property getters
    fn get_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool;
    fn get_property_date(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut RawDateTime,
        options: &mut u32,
    ) -> bool;
    fn get_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut bool,
        options: &mut u32,
    ) -> bool;
    fn get_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i32,
        options: &mut u32,
    ) -> bool;
    fn get_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut i64,
        options: &mut u32,
    ) -> bool;
    fn get_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &mut f64,
        options: &mut u32,
    ) -> bool;

    // Property setters
    fn set_property(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &CStr,
        options: u32,
    ) -> bool;
    fn set_property_date(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: &RawDateTime,
        options: u32,
    ) -> bool;
    fn set_property_bool(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: bool,
        options: u32,
    ) -> bool;
    fn set_property_int32(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i32,
        options: u32,
    ) -> bool;
    fn set_property_int64(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: i64,
        options: u32,
    ) -> bool;
    fn set_property_float(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        value: f64,
        options: u32,
    ) -> bool;

    fn delete_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool;
    fn has_property(&self, xmp: PacketPtr, schema: &CStr, name: &CStr) -> bool;

    // Arrays, 1-based
    fn get_array_item(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        index: i32,
        value: StringPtr,
        options: &mut u32,
    ) -> bool;
    fn set_array_item(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        index: i32,
        value: &CStr,
        options: u32,
    ) -> bool;
    fn append_array_item(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        array_options: u32,
        value: &CStr,
        options: u32,
    ) -> bool;

    // Localized text
    #[allow(clippy::too_many_arguments)]
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
    ) -> bool;
    #[allow(clippy::too_many_arguments)]
    fn set_localized_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        generic_lang: Option<&CStr>,
        specific_lang: &CStr,
        value: &CStr,
        options: u32,
    ) -> bool;
    fn delete_localized_text(
        &self,
        xmp: PacketPtr,
        schema: &CStr,
        name: &CStr,
        generic_lang: Option<&CStr>,
        specific_lang: &CStr,
    ) -> bool;

    // Iteration
    fn iterator_new(
        &self,
        xmp: PacketPtr,
        schema: Option<&CStr>,
        name: Option<&CStr>,
        options: u32,
    ) -> Option<IteratorPtr>;
    fn iterator_next(
        &self,
        iter: IteratorPtr,
        schema: StringPtr,
        path: StringPtr,
        value: StringPtr,
        options: &mut u32,
    ) -> bool;
    fn iterator_skip(&self, iter: IteratorPtr, options: u32) -> bool;
    fn iterator_free(&self, iter: IteratorPtr) -> bool;

    // Files
    fn files_new(&self) -> Option<FilePtr>;
    fn files_open_new(&self, path: &CStr, options: u32) -> Option<FilePtr>;
    fn files_open(&self, file: FilePtr, path: &CStr, options: u32) -> bool;
    fn files_close(&self, file: FilePtr, options: u32) -> bool;
    fn files_get_new_xmp(&self, file: FilePtr) -> Option<PacketPtr>;
    fn files_get_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool;
    fn files_can_put_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool;
    fn files_put_xmp(&self, file: FilePtr, xmp: PacketPtr) -> bool;
    fn files_get_file_info(
        &self,
        file: FilePtr,
        path: StringPtr,
        options: &mut u32,
        format: &mut u32,
        handler_flags: &mut u32,
    ) -> bool;
    fn files_free(&self, file: FilePtr) -> bool;
    fn files_check_file_format(&self, path: &CStr) -> u32;
    fn files_get_format_info(&self, format: u32, flags: &mut u32) -> bool;
}
