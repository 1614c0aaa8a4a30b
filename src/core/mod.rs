//! XMP Core module
//!
//! This module contains the packet-level functionality: errors, option bits,
//! handle ownership, path composition, the [`XmpMeta`] packet façade and the
//! [`XmpIterator`] over its properties.

pub mod error;
pub(crate) mod handle;
pub mod iterator;
pub mod meta;
pub mod namespace;
pub mod options;
pub mod path;

pub use error::{ErrorCode, XmpError, XmpResult};
pub use iterator::{IterState, XmpIterator};
pub use meta::XmpMeta;
pub use options::{
    CloseFlags, IterClass, IterFlags, OpenFlags, OpenOptions, OptionTable, PropFlags,
    SerialFlags, SkipFlags, UnknownOptions,
};
pub use path::{
    compose_array_item_path, compose_lang_selector, compose_qualifier_path,
    compose_struct_field_path, LAST_ITEM,
};
