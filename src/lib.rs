//! # libxmp
//!
//! A Rust binding to the Exempi XMP metadata engine.
//!
//! Everything goes through a [`Context`], which owns one initialized engine:
//! the native `libexempi` ([`ExempiEngine`], behind the `exempi` feature) or
//! the in-process [`MemoryEngine`]. Packets ([`XmpMeta`]), files
//! ([`XmpFiles`]) and iterators ([`XmpIterator`]) borrow the context, so none
//! of them can outlive the engine that produced them.
//!
//! ## Quick Start
//!
//! ```rust
//! use libxmp::{Context, PropFlags, XmpMeta};
//! use libxmp::core::namespace::XMP_NS_XMP;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = Context::memory()?;
//! let mut meta = XmpMeta::new(&ctx)?;
//! meta.set_property(XMP_NS_XMP, "CreatorTool", "MyApp", PropFlags::empty())?;
//! assert_eq!(
//!     meta.get_property(XMP_NS_XMP, "CreatorTool")?.as_deref(),
//!     Some("MyApp")
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading
//!
//! The engine keeps process-wide state and is not thread-safe. [`Context`]
//! is neither `Send` nor `Sync`; share one across threads only behind
//! external serialization.

pub mod core;
pub mod engine;
pub mod files;
pub mod types;
pub mod utils;

pub use crate::core::error::{describe_code, ErrorCode, XmpError, XmpResult};
pub use crate::core::iterator::{IterState, XmpIterator};
pub use crate::core::meta::XmpMeta;
pub use crate::core::options::{
    compose, has_option, CloseFlags, IterClass, IterFlags, OpenFlags, OpenOptions, OptionTable,
    PropFlags, SerialFlags, SkipFlags, UnknownOptions,
};
pub use crate::core::path::{
    compose_array_item_path, compose_lang_selector, compose_qualifier_path,
    compose_struct_field_path, LAST_ITEM,
};
#[cfg(feature = "exempi")]
pub use engine::ExempiEngine;
pub use engine::{Context, Engine, MemoryEngine, RawDateTime};
pub use files::{FileInfo, FileType, FormatFlags, XmpFiles};
pub use types::{LocalizedText, TzSign, XmpDateTime, XmpProperty};
pub use utils::{file_to_dict, object_to_dict, PropertyDict};
