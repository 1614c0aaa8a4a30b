//! XMP value types
//!
//! This module defines the values the accessors hand back: date/times,
//! iterated properties and localized text.

pub mod datetime;
pub mod property;

pub use datetime::{TzSign, XmpDateTime};
pub use property::{LocalizedText, XmpProperty};
