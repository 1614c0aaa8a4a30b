//! File support for XMP
//!
//! Container formats are handled entirely by the engine. This module wraps
//! its file handles ([`XmpFiles`]) and describes the format tags and handler
//! capabilities it reports.

pub mod file;
pub mod format;

pub use file::{FileInfo, XmpFiles};
pub use format::{FileType, FormatFlags};
