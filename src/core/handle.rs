//! Owned wrappers for engine handles
//!
//! Raw handles never leave these wrappers: each one is freed exactly once,
//! when its owner is dropped, on success and error paths alike.

use crate::core::error::{ErrorCode, XmpError, XmpResult};
use crate::engine::{Engine, StringPtr};
use std::ffi::CString;
use std::path::{Path, PathBuf};

/// Scratch string handle used for a single out-parameter
///
/// The engine keeps ownership of the bytes until the handle is freed, so the
/// contents are copied out with [`XmpString::read_utf8`] before the wrapper
/// goes away.
pub(crate) struct XmpString<'e> {
    engine: &'e dyn Engine,
    ptr: StringPtr,
}

impl<'e> XmpString<'e> {
    pub(crate) fn new(engine: &'e dyn Engine) -> XmpResult<Self> {
        match engine.string_new() {
            Some(ptr) => Ok(Self { engine, ptr }),
            None => Err(null_handle(engine, "string_new")),
        }
    }

    pub(crate) fn ptr(&self) -> StringPtr {
        self.ptr
    }

    /// Copy the current contents out as a host string
    pub(crate) fn read_utf8(&self) -> XmpResult<String> {
        String::from_utf8(self.read_bytes()).map_err(|e| XmpError::BadUnicode(e.to_string()))
    }

    pub(crate) fn read_bytes(&self) -> Vec<u8> {
        self.engine.string_bytes(self.ptr)
    }

    /// Copy the current contents out as a file path
    pub(crate) fn read_path(&self) -> XmpResult<PathBuf> {
        let bytes = self.read_bytes();
        bytes_to_path(&bytes).ok_or_else(|| {
            XmpError::BadUnicode(format!(
                "engine returned an unusable path: {}",
                String::from_utf8_lossy(&bytes)
            ))
        })
    }
}

impl Drop for XmpString<'_> {
    fn drop(&mut self) {
        self.engine.string_free(self.ptr);
    }
}

/// Convert a host string to a C string, rejecting interior NULs
pub(crate) fn cstring(what: &str, value: &str) -> XmpResult<CString> {
    CString::new(value)
        .map_err(|_| XmpError::BadParam(format!("{} contains a NUL byte: {:?}", what, value)))
}

/// Convert a file path to the C string handed to the engine
///
/// On Unix the path's bytes go through unchanged. Elsewhere the path must be
/// valid Unicode; it is never replaced by a lossy rendering.
pub(crate) fn path_cstring(path: &Path) -> XmpResult<CString> {
    let bytes = path_to_bytes(path).ok_or_else(|| {
        XmpError::BadParam(format!("path is not valid Unicode: {}", path.display()))
    })?;
    CString::new(bytes)
        .map_err(|_| XmpError::BadParam(format!("path contains a NUL byte: {}", path.display())))
}

/// Raw bytes of a path as the engine receives them
#[cfg(unix)]
pub(crate) fn path_to_bytes(path: &Path) -> Option<&[u8]> {
    use std::os::unix::ffi::OsStrExt;
    Some(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
pub(crate) fn path_to_bytes(path: &Path) -> Option<&[u8]> {
    path.to_str().map(str::as_bytes)
}

/// Path from the raw bytes the engine hands back
#[cfg(unix)]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> Option<PathBuf> {
    use std::os::unix::ffi::OsStrExt;
    Some(PathBuf::from(std::ffi::OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
pub(crate) fn bytes_to_path(bytes: &[u8]) -> Option<PathBuf> {
    std::str::from_utf8(bytes).ok().map(PathBuf::from)
}

/// Error for an engine constructor that returned a null handle
///
/// A null handle is always a failure, even when the engine left its
/// last-error code at zero.
pub(crate) fn null_handle(engine: &dyn Engine, operation: &str) -> XmpError {
    let code = match engine.get_error() {
        0 => ErrorCode::BadObject.code(),
        code => code,
    };
    XmpError::Engine {
        operation: format!("{} returned a null handle", operation),
        code,
    }
}
