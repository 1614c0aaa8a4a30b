//! XMP File API
//!
//! [`XmpFiles`] owns one file handle of the engine. The engine locates the
//! XMP inside the container with its own format handlers; this module only
//! drives the open / read / put / close cycle.
//!
//! # File Update Behavior
//!
//! A packet handed to [`XmpFiles::put_xmp`] is not written immediately. It
//! becomes durable when [`XmpFiles::close_file`] is called (or when the
//! `XmpFiles` is dropped while the file is still open).
//!
//! # Example
//!
//! ```rust,no_run
//! use libxmp::{CloseFlags, Context, OpenOptions, PropFlags, XmpFiles};
//! use libxmp::core::namespace::XMP_NS_XMP;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = Context::init()?;
//! let mut file = XmpFiles::with_file(&ctx, "image.jpg", OpenOptions::default().for_update())?;
//!
//! if let Some(mut meta) = file.get_xmp()? {
//!     meta.set_property(XMP_NS_XMP, "CreatorTool", "MyApp", PropFlags::empty())?;
//!     file.put_xmp(&meta)?;
//! }
//! file.close_file(CloseFlags::SAFE_UPDATE)?;
//! # Ok(())
//! # }
//! ```

use crate::core::error::{check_last_error, check_result, XmpError, XmpResult};
use crate::core::handle::{null_handle, path_cstring, XmpString};
use crate::core::meta::XmpMeta;
use crate::core::options::{CloseFlags, OpenFlags};
use crate::engine::{ensure_exists, Context, Engine, FilePtr};
use crate::files::format::{FileType, FormatFlags};
use std::path::{Path, PathBuf};

/// What the engine reports about an open file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Path the file was opened from
    pub path: PathBuf,
    /// Options it was opened with
    pub options: OpenFlags,
    /// Detected container format
    pub format: FileType,
    /// Capabilities of the handler serving the file
    pub handler_flags: FormatFlags,
}

/// A container file holding (or about to hold) XMP
pub struct XmpFiles<'c> {
    ctx: &'c Context,
    ptr: FilePtr,
    /// Set while a file is open
    path: Option<PathBuf>,
}

impl<'c> XmpFiles<'c> {
    /// Create a handle with no file open
    pub fn new(ctx: &'c Context) -> XmpResult<Self> {
        match ctx.engine().files_new() {
            Some(ptr) => Ok(Self {
                ctx,
                ptr,
                path: None,
            }),
            None => Err(null_handle(ctx.engine(), "files_new")),
        }
    }

    /// Create a handle and open `path` in one engine call
    ///
    /// A missing path fails with a `NotFound` I/O error before the engine
    /// is called.
    pub fn with_file(
        ctx: &'c Context,
        path: impl AsRef<Path>,
        options: impl Into<OpenFlags>,
    ) -> XmpResult<Self> {
        let path = path.as_ref();
        let options = options.into();
        ensure_exists(path)?;
        let c_path = path_cstring(path)?;
        match ctx.engine().files_open_new(&c_path, options.bits()) {
            Some(ptr) => {
                log::debug!("opened {} with {:?}", path.display(), options);
                Ok(Self {
                    ctx,
                    ptr,
                    path: Some(path.to_path_buf()),
                })
            }
            None => Err(null_handle(
                ctx.engine(),
                &format!("files_open_new({})", path.display()),
            )),
        }
    }

    fn engine(&self) -> &'c dyn Engine {
        self.ctx.engine()
    }

    /// Path of the open file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.path.is_some()
    }

    fn open_path(&self) -> XmpResult<&Path> {
        self.path.as_deref().ok_or(XmpError::FileNotOpen)
    }

    /// Open a file on this handle
    ///
    /// Every open mode reads the existing file, so a missing path fails
    /// locally with a `NotFound` I/O error and the engine is never called.
    /// Fails with [`XmpError::FileAlreadyOpen`] while another file is open.
    pub fn open_file(
        &mut self,
        path: impl AsRef<Path>,
        options: impl Into<OpenFlags>,
    ) -> XmpResult<()> {
        let path = path.as_ref();
        let options = options.into();
        if let Some(open) = &self.path {
            return Err(XmpError::FileAlreadyOpen(open.display().to_string()));
        }
        ensure_exists(path)?;
        let c_path = path_cstring(path)?;
        let ok = self.engine().files_open(self.ptr, &c_path, options.bits());
        check_result(
            self.engine(),
            || format!("files_open({}, {:?})", path.display(), options),
            ok,
        )?;
        log::debug!("opened {} with {:?}", path.display(), options);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Close the open file, writing any packet put since it was opened
    ///
    /// When the engine fails to close, the file stays open on this handle
    /// and the close can be retried.
    pub fn close_file(&mut self, options: CloseFlags) -> XmpResult<()> {
        let path = self.open_path()?;
        let ok = self.engine().files_close(self.ptr, options.bits());
        check_result(
            self.engine(),
            || format!("files_close({}, {:?})", path.display(), options),
            ok,
        )?;
        log::debug!("closed {}", path.display());
        self.path = None;
        Ok(())
    }

    /// A new packet holding the file's XMP, `None` if it has none
    pub fn get_xmp(&self) -> XmpResult<Option<XmpMeta<'c>>> {
        let path = self.open_path()?;
        match self.engine().files_get_new_xmp(self.ptr) {
            Some(ptr) => Ok(Some(XmpMeta::from_raw(self.ctx, ptr))),
            None => {
                check_last_error(self.engine(), || {
                    format!("files_get_new_xmp({})", path.display())
                })?;
                Ok(None)
            }
        }
    }

    /// Replace the contents of `meta` with the file's XMP
    ///
    /// Returns `false`, leaving `meta` untouched, when the file has none.
    pub fn get_xmp_into(&self, meta: &mut XmpMeta<'_>) -> XmpResult<bool> {
        let path = self.open_path()?;
        let found = self.engine().files_get_xmp(self.ptr, meta.ptr());
        if !found {
            check_last_error(self.engine(), || {
                format!("files_get_xmp({})", path.display())
            })?;
        }
        Ok(found)
    }

    /// Whether `meta` can be written into the open file
    pub fn can_put_xmp(&self, meta: &XmpMeta<'_>) -> XmpResult<bool> {
        let path = self.open_path()?;
        let can = self.engine().files_can_put_xmp(self.ptr, meta.ptr());
        check_last_error(self.engine(), || {
            format!("files_can_put_xmp({})", path.display())
        })?;
        Ok(can)
    }

    /// Stage `meta` to be written into the file on close
    ///
    /// Checks [`can_put_xmp`](Self::can_put_xmp) first and fails with
    /// [`XmpError::CannotPutXmp`] when the file cannot take it, typically
    /// because it was not opened for update.
    pub fn put_xmp(&mut self, meta: &XmpMeta<'_>) -> XmpResult<()> {
        if !self.can_put_xmp(meta)? {
            let path = self.open_path()?;
            return Err(XmpError::CannotPutXmp(path.display().to_string()));
        }
        let ok = self.engine().files_put_xmp(self.ptr, meta.ptr());
        check_result(self.engine(), || "files_put_xmp".to_string(), ok)
    }

    /// What the engine knows about the open file
    pub fn get_file_info(&self) -> XmpResult<FileInfo> {
        self.open_path()?;
        let path = XmpString::new(self.engine())?;
        let (mut options, mut format, mut handler_flags) = (0, 0, 0);
        let ok = self.engine().files_get_file_info(
            self.ptr,
            path.ptr(),
            &mut options,
            &mut format,
            &mut handler_flags,
        );
        check_result(self.engine(), || "files_get_file_info".to_string(), ok)?;
        Ok(FileInfo {
            path: path.read_path()?,
            options: OpenFlags::from_bits_retain(options),
            format: FileType::from_raw(format),
            handler_flags: FormatFlags::from_bits_retain(handler_flags),
        })
    }
}

impl std::fmt::Debug for XmpFiles<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmpFiles")
            .field("ptr", &self.ptr)
            .field("path", &self.path)
            .finish()
    }
}

impl Drop for XmpFiles<'_> {
    fn drop(&mut self) {
        if self.path.is_some() {
            if let Err(e) = self.close_file(CloseFlags::empty()) {
                log::warn!("failed to close file: {e}");
            }
        }
        let ok = self.engine().files_free(self.ptr);
        if let Err(e) = check_result(self.engine(), || "files_free".to_string(), ok) {
            log::warn!("failed to free file handle: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use std::io::Write;

    fn jpeg() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        file
    }

    #[test]
    fn test_open_twice() {
        let ctx = Context::memory().unwrap();
        let file = jpeg();
        let mut xmp_file = XmpFiles::new(&ctx).unwrap();
        xmp_file.open_file(file.path(), OpenFlags::READ).unwrap();
        let err = xmp_file.open_file(file.path(), OpenFlags::READ).unwrap_err();
        assert!(matches!(err, XmpError::FileAlreadyOpen(_)));
    }

    #[test]
    fn test_requires_open_file() {
        let ctx = Context::memory().unwrap();
        let mut xmp_file = XmpFiles::new(&ctx).unwrap();
        assert!(matches!(xmp_file.get_xmp(), Err(XmpError::FileNotOpen)));
        assert!(matches!(
            xmp_file.close_file(CloseFlags::empty()),
            Err(XmpError::FileNotOpen)
        ));
        assert!(matches!(xmp_file.get_file_info(), Err(XmpError::FileNotOpen)));
    }

    #[test]
    fn test_file_info() {
        let ctx = Context::memory().unwrap();
        let file = jpeg();
        let xmp_file = XmpFiles::with_file(&ctx, file.path(), OpenFlags::READ).unwrap();
        let info = xmp_file.get_file_info().unwrap();
        assert_eq!(info.path, file.path());
        assert_eq!(info.options, OpenFlags::READ);
        assert_eq!(info.format, FileType::Jpeg);
        assert!(info.handler_flags.contains(FormatFlags::CAN_INJECT_XMP));
    }

    #[test]
    fn test_drop_releases_handle() {
        let engine = MemoryEngine::new();
        let ctx = Context::new(engine.clone()).unwrap();
        let file = jpeg();
        let xmp_file = XmpFiles::with_file(&ctx, file.path(), OpenFlags::READ).unwrap();
        assert_eq!(engine.live_files(), 1);
        drop(xmp_file);
        assert_eq!(engine.live_files(), 0);
    }
}
