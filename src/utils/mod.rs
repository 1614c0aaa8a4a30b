//! Utility helpers

pub mod datetime;
pub mod dict;

pub use dict::{file_to_dict, object_to_dict, PropertyDict};
