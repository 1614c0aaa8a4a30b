//! Namespace registry of the memory engine
//!
//! Prefixes are kept without their trailing colon and reported with it, the
//! way the native registry reports them.

use crate::core::namespace::STANDARD_PREFIXES;
use std::collections::HashMap;

/// Bidirectional map of namespace URI and prefix
#[derive(Debug, Clone, Default)]
pub(crate) struct NamespaceRegistry {
    uri_to_prefix: HashMap<String, String>,
    prefix_to_uri: HashMap<String, String>,
}

impl NamespaceRegistry {
    /// A registry holding the standard namespaces
    pub(crate) fn new() -> Self {
        let mut registry = Self::default();
        for (uri, prefix) in STANDARD_PREFIXES {
            registry.insert(uri, prefix);
        }
        registry
    }

    fn insert(&mut self, uri: &str, prefix: &str) {
        self.uri_to_prefix
            .insert(uri.to_string(), prefix.to_string());
        self.prefix_to_uri
            .insert(prefix.to_string(), uri.to_string());
    }

    /// Register `uri`, preferring `suggested` as its prefix
    ///
    /// An already registered URI keeps its prefix. A suggested prefix taken
    /// by another URI gets a numbered variant (`dc_1_`). Returns the
    /// registered prefix, or `None` for an empty URI or malformed prefix.
    pub(crate) fn register(&mut self, uri: &str, suggested: &str) -> Option<String> {
        let suggested = suggested.strip_suffix(':').unwrap_or(suggested);
        if uri.is_empty() || !is_xml_name(suggested) {
            return None;
        }
        if let Some(existing) = self.uri_to_prefix.get(uri) {
            return Some(existing.clone());
        }

        let mut prefix = suggested.to_string();
        let mut n = 1;
        while self.prefix_to_uri.contains_key(&prefix) {
            prefix = format!("{}_{}_", suggested, n);
            n += 1;
        }
        self.insert(uri, &prefix);
        Some(prefix)
    }

    /// Prefix registered for `uri`
    pub(crate) fn prefix(&self, uri: &str) -> Option<&str> {
        self.uri_to_prefix.get(uri).map(String::as_str)
    }

    /// URI registered for `prefix`, with or without its trailing colon
    pub(crate) fn uri(&self, prefix: &str) -> Option<&str> {
        let prefix = prefix.strip_suffix(':').unwrap_or(prefix);
        self.prefix_to_uri.get(prefix).map(String::as_str)
    }
}

/// Loose check for an XML NCName: a letter or `_` followed by name characters
pub(crate) fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
