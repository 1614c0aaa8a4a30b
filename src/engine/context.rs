//! Engine lifetime
//!
//! A [`Context`] is the single owner of an initialized engine. Every packet,
//! file and iterator borrows it, so nothing obtained from the engine can
//! outlive `terminate`.

use crate::core::error::{check_last_error, check_result, XmpError, XmpResult};
use crate::core::handle::{cstring, path_cstring, XmpString};
use crate::engine::{Engine, MemoryEngine};
use crate::files::format::{FileType, FormatFlags};
use std::path::Path;

/// An initialized metadata engine
///
/// The context is neither `Send` nor `Sync`; the engine is not thread-safe
/// and callers sharing one across threads must serialize access themselves.
pub struct Context {
    engine: Box<dyn Engine>,
    live: bool,
}

impl Context {
    /// Initialize `engine` and take ownership of it
    pub fn new(engine: impl Engine + 'static) -> XmpResult<Self> {
        Self::from_boxed(Box::new(engine))
    }

    /// Initialize an already boxed engine
    pub fn from_boxed(engine: Box<dyn Engine>) -> XmpResult<Self> {
        let ok = engine.init();
        check_result(engine.as_ref(), || "init".to_string(), ok)?;
        log::debug!("initialized {} engine", engine.name());
        Ok(Self { engine, live: true })
    }

    /// A context over a fresh [`MemoryEngine`]
    pub fn memory() -> XmpResult<Self> {
        Self::new(MemoryEngine::new())
    }

    /// A context over the native engine
    ///
    /// Fails with [`XmpError::AlreadyInitialized`] while another native
    /// context is alive.
    #[cfg(feature = "exempi")]
    pub fn exempi() -> XmpResult<Self> {
        Self::new(crate::engine::ExempiEngine::acquire()?)
    }

    /// A context over the default engine: native when compiled in, else memory
    pub fn init() -> XmpResult<Self> {
        #[cfg(feature = "exempi")]
        {
            Self::exempi()
        }
        #[cfg(not(feature = "exempi"))]
        {
            Self::memory()
        }
    }

    /// The engine behind this context
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// Terminate the engine now instead of at drop
    pub fn terminate(mut self) -> XmpResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> XmpResult<()> {
        if !self.live {
            return Ok(());
        }
        self.live = false;
        self.engine.terminate();
        log::debug!("terminated {} engine", self.engine.name());
        check_last_error(self.engine(), || "terminate".to_string())
    }

    /// Register a namespace URI under a suggested prefix
    ///
    /// # Arguments
    ///
    /// * `uri` - The namespace URI
    /// * `suggested_prefix` - The prefix to use if it is free
    ///
    /// # Returns
    ///
    /// The prefix actually registered, as the engine reports it (with its
    /// trailing colon). When the URI is already registered this is the
    /// existing prefix.
    pub fn register_namespace(&self, uri: &str, suggested_prefix: &str) -> XmpResult<String> {
        let c_uri = cstring("namespace URI", uri)?;
        let c_prefix = cstring("prefix", suggested_prefix)?;
        let registered = XmpString::new(self.engine())?;
        let ok = self
            .engine
            .register_namespace(&c_uri, &c_prefix, Some(registered.ptr()));
        check_result(
            self.engine(),
            || format!("register_namespace({}, {})", uri, suggested_prefix),
            ok,
        )?;
        registered.read_utf8()
    }

    /// The registered prefix of a namespace URI, if any
    pub fn namespace_prefix(&self, uri: &str) -> XmpResult<Option<String>> {
        let c_uri = cstring("namespace URI", uri)?;
        let prefix = XmpString::new(self.engine())?;
        if self.engine.namespace_prefix(&c_uri, prefix.ptr()) {
            return Ok(Some(prefix.read_utf8()?));
        }
        check_last_error(self.engine(), || format!("namespace_prefix({})", uri))?;
        Ok(None)
    }

    /// The namespace URI registered for a prefix, if any
    ///
    /// The prefix may be given with or without its trailing colon.
    pub fn prefix_namespace_uri(&self, prefix: &str) -> XmpResult<Option<String>> {
        let c_prefix = cstring("prefix", prefix)?;
        let uri = XmpString::new(self.engine())?;
        if self.engine.prefix_namespace_uri(&c_prefix, uri.ptr()) {
            return Ok(Some(uri.read_utf8()?));
        }
        check_last_error(self.engine(), || format!("prefix_namespace_uri({})", prefix))?;
        Ok(None)
    }

    /// Detect the container format of a file
    ///
    /// A missing file is reported locally as `NotFound` without calling the
    /// engine.
    pub fn check_file_format(&self, path: impl AsRef<Path>) -> XmpResult<FileType> {
        let path = path.as_ref();
        ensure_exists(path)?;
        let c_path = path_cstring(path)?;
        let raw = self.engine.files_check_file_format(&c_path);
        check_last_error(self.engine(), || {
            format!("check_file_format({})", path.display())
        })?;
        Ok(FileType::from_raw(raw))
    }

    /// Capabilities of the engine's handler for a format, if it has one
    pub fn get_format_info(&self, format: FileType) -> XmpResult<Option<FormatFlags>> {
        let mut flags = 0;
        if self.engine.files_get_format_info(format.raw(), &mut flags) {
            return Ok(Some(FormatFlags::from_bits_retain(flags)));
        }
        check_last_error(self.engine(), || format!("get_format_info({:?})", format))?;
        Ok(None)
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("engine", &self.engine.name())
            .field("live", &self.live)
            .finish()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("failed to terminate engine: {e}");
        }
    }
}

/// Fail with a local `NotFound` error when `path` does not exist
pub(crate) fn ensure_exists(path: &Path) -> XmpResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(XmpError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )))
    }
}
