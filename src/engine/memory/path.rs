//! Property path expansion for the memory engine
//!
//! Supports the path forms the accessors compose:
//! - `Prop` or `prefix:Prop` - top-level property
//! - `Prop/prefix:Field` - structure field
//! - `Prop[1]`, `Prop[last()]` - array item, 1-based
//! - `Prop/?xml:lang` (or `/@xml:lang`) - qualifier
//! - `Prop[?xml:lang="en-US"]` - alt-text item by language
//!
//! An unprefixed name takes the prefix of the schema being addressed.

use super::registry::{is_xml_name, NamespaceRegistry};
use crate::core::error::ErrorCode;

/// One step of an expanded path
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// A property or structure field, fully qualified
    Field(String),
    /// A qualifier, fully qualified
    Qualifier(String),
    /// A 1-based array index
    Index(usize),
    /// The last array item
    Last,
    /// The alt-text item with this `xml:lang`
    Lang(String),
}

impl Step {
    /// Leaf name as iterators report it
    pub(crate) fn leaf_name(&self) -> String {
        match self {
            Step::Field(name) => name.clone(),
            Step::Qualifier(name) => format!("?{}", name),
            Step::Index(index) => format!("[{}]", index),
            Step::Last => "[last()]".to_string(),
            Step::Lang(lang) => format!("[?xml:lang=\"{}\"]", lang),
        }
    }

    pub(crate) fn is_array_step(&self) -> bool {
        matches!(self, Step::Index(_) | Step::Last | Step::Lang(_))
    }
}

/// Expand `path` into steps
///
/// `schema_prefix` is the registered prefix of the schema, without colon.
pub(crate) fn expand_path(
    path: &str,
    schema_prefix: &str,
    registry: &NamespaceRegistry,
) -> Result<Vec<Step>, ErrorCode> {
    let mut steps = Vec::new();
    let (root, mut rest) = take_name(path);
    let root = qualify(root, schema_prefix, registry)?;
    if root.split_once(':').map(|(prefix, _)| prefix) != Some(schema_prefix) {
        return Err(ErrorCode::BadSchema);
    }
    steps.push(Step::Field(root));

    while let Some(c) = rest.chars().next() {
        match c {
            '/' => {
                let after = &rest[1..];
                let (is_qualifier, after) = match after.strip_prefix(['?', '@']) {
                    Some(stripped) => (true, stripped),
                    None => (false, after),
                };
                let (name, tail) = take_name(after);
                let name = qualify(name, schema_prefix, registry)?;
                steps.push(if is_qualifier {
                    Step::Qualifier(name)
                } else {
                    Step::Field(name)
                });
                rest = tail;
            }
            '[' => {
                let (step, tail) = take_selector(&rest[1..])?;
                steps.push(step);
                rest = tail;
            }
            _ => return Err(ErrorCode::BadXPath),
        }
    }
    Ok(steps)
}

/// Render steps back into a path string
pub(crate) fn build_path(steps: &[Step]) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        match step {
            Step::Field(name) if i > 0 => {
                out.push('/');
                out.push_str(name);
            }
            Step::Qualifier(_) => {
                out.push('/');
                out.push_str(&step.leaf_name());
            }
            _ => out.push_str(&step.leaf_name()),
        }
    }
    out
}

fn take_name(s: &str) -> (&str, &str) {
    let end = s.find(['/', '[']).unwrap_or(s.len());
    s.split_at(end)
}

fn qualify(
    name: &str,
    schema_prefix: &str,
    registry: &NamespaceRegistry,
) -> Result<String, ErrorCode> {
    match name.split_once(':') {
        Some((prefix, local)) => {
            if !is_xml_name(local) {
                return Err(ErrorCode::BadXPath);
            }
            if registry.uri(prefix).is_none() {
                return Err(ErrorCode::BadSchema);
            }
            Ok(name.to_string())
        }
        None if is_xml_name(name) => Ok(format!("{}:{}", schema_prefix, name)),
        None => Err(ErrorCode::BadXPath),
    }
}

fn take_selector(s: &str) -> Result<(Step, &str), ErrorCode> {
    if let Some(lang) = s
        .strip_prefix("?xml:lang=")
        .or_else(|| s.strip_prefix("@xml:lang="))
    {
        let quote = lang.chars().next().filter(|q| *q == '"' || *q == '\'');
        let quote = quote.ok_or(ErrorCode::BadXPath)?;
        let body = &lang[1..];
        let end = body.find(quote).ok_or(ErrorCode::BadXPath)?;
        let tail = body[end + 1..]
            .strip_prefix(']')
            .ok_or(ErrorCode::BadXPath)?;
        return Ok((Step::Lang(body[..end].to_string()), tail));
    }

    let end = s.find(']').ok_or(ErrorCode::BadXPath)?;
    let (inner, tail) = (&s[..end], &s[end + 1..]);
    if inner == "last()" {
        return Ok((Step::Last, tail));
    }
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorCode::BadXPath);
    }
    match inner.parse::<usize>() {
        Ok(0) | Err(_) => Err(ErrorCode::BadIndex),
        Ok(index) => Ok((Step::Index(index), tail)),
    }
}
