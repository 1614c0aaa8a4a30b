//! Property tree of the memory engine
//!
//! A packet holds schemas in insertion order; each schema holds its
//! top-level properties. Every node carries a text value, its option bits,
//! its qualifiers and its children (struct fields or array items).

use super::path::Step;
use crate::core::error::ErrorCode;
use crate::core::options::PropFlags;

/// Name given to array items; their position is their name in paths
pub(crate) const ITEM_NAME: &str = "[]";
pub(crate) const XML_LANG: &str = "xml:lang";
pub(crate) const RDF_TYPE: &str = "rdf:type";
pub(crate) const X_DEFAULT: &str = "x-default";

/// Bits a setter may not set directly
const DERIVED_BITS: PropFlags = PropFlags::HAS_QUALIFIERS
    .union(PropFlags::IS_QUALIFIER)
    .union(PropFlags::HAS_LANG)
    .union(PropFlags::HAS_TYPE)
    .union(PropFlags::INSERT_BEFORE_ITEM)
    .union(PropFlags::INSERT_AFTER_ITEM)
    .union(PropFlags::IS_SCHEMA);

/// A node in the property tree
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct XmpNode {
    pub(crate) name: String,
    pub(crate) value: String,
    pub(crate) options: PropFlags,
    pub(crate) qualifiers: Vec<XmpNode>,
    pub(crate) children: Vec<XmpNode>,
}

impl XmpNode {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            options: PropFlags::empty(),
            qualifiers: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A simple leaf with a value
    pub(crate) fn leaf(
        name: impl Into<String>,
        value: impl Into<String>,
        options: PropFlags,
    ) -> Self {
        let mut node = Self::new(name);
        node.value = value.into();
        node.options = options;
        node
    }

    /// An alt-text item with its language qualifier
    pub(crate) fn lang_item(lang: &str, value: &str) -> Self {
        let mut item = Self::leaf(ITEM_NAME, value, PropFlags::empty());
        item.set_qualifier(XML_LANG, lang);
        item
    }

    pub(crate) fn is_array(&self) -> bool {
        self.options.is_array()
    }

    pub(crate) fn is_composite(&self) -> bool {
        !self.options.is_simple()
    }

    pub(crate) fn field(&self, name: &str) -> Option<&XmpNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub(crate) fn qualifier(&self, name: &str) -> Option<&XmpNode> {
        self.qualifiers.iter().find(|q| q.name == name)
    }

    /// The `xml:lang` of an item, lowercased
    pub(crate) fn lang(&self) -> Option<String> {
        self.qualifier(XML_LANG).map(|q| q.value.to_ascii_lowercase())
    }

    /// Set or replace a qualifier and refresh the qualifier bits
    pub(crate) fn set_qualifier(&mut self, name: &str, value: &str) {
        match self.qualifiers.iter_mut().find(|q| q.name == name) {
            Some(qual) => qual.value = value.to_string(),
            None => {
                let qual = XmpNode::leaf(name, value, PropFlags::IS_QUALIFIER);
                // xml:lang goes first, rdf:type second
                let pos = match name {
                    XML_LANG => 0,
                    RDF_TYPE => usize::from(self.qualifier(XML_LANG).is_some()),
                    _ => self.qualifiers.len(),
                };
                self.qualifiers.insert(pos, qual);
            }
        }
        self.refresh_qualifier_bits();
    }

    pub(crate) fn refresh_qualifier_bits(&mut self) {
        let has = |name: &str| self.qualifiers.iter().any(|q| q.name == name);
        let mut bits = PropFlags::empty();
        if !self.qualifiers.is_empty() {
            bits |= PropFlags::HAS_QUALIFIERS;
        }
        if has(XML_LANG) {
            bits |= PropFlags::HAS_LANG;
        }
        if has(RDF_TYPE) {
            bits |= PropFlags::HAS_TYPE;
        }
        self.options.remove(PropFlags::HAS_QUALIFIERS | PropFlags::HAS_LANG | PropFlags::HAS_TYPE);
        self.options |= bits;
    }

    /// Store a value and form bits from a setter
    pub(crate) fn assign(&mut self, value: &str, options: PropFlags) -> Result<(), ErrorCode> {
        let options = options.normalized() - DERIVED_BITS;
        if !options.is_simple() && !value.is_empty() {
            return Err(ErrorCode::BadOptions);
        }
        if self.is_composite() && options.is_simple() {
            if !self.children.is_empty() {
                return Err(ErrorCode::BadXPath);
            }
            self.options.remove(PropFlags::COMPOSITE_MASK);
        }
        if !options.is_simple() {
            // Changing the form of a non-empty composite is not allowed
            let current = self.options & PropFlags::COMPOSITE_MASK;
            let wanted = options & PropFlags::COMPOSITE_MASK;
            if !self.children.is_empty() && current != wanted {
                return Err(ErrorCode::BadXPath);
            }
            self.value.clear();
        } else {
            self.value = value.to_string();
        }
        let keep = self.options
            & (PropFlags::HAS_QUALIFIERS
                | PropFlags::HAS_LANG
                | PropFlags::HAS_TYPE
                | PropFlags::IS_QUALIFIER);
        self.options = options | keep;
        Ok(())
    }

    /// Descend one step, optionally creating what is missing
    fn child_mut(
        &mut self,
        step: &Step,
        create: bool,
        next: Option<&Step>,
    ) -> Result<Option<&mut XmpNode>, ErrorCode> {
        match step {
            Step::Field(name) => {
                if self.is_array() {
                    return Err(ErrorCode::BadXPath);
                }
                let pos = self.children.iter().position(|c| &c.name == name);
                let pos = match (pos, create) {
                    (Some(pos), _) => pos,
                    (None, false) => return Ok(None),
                    (None, true) => {
                        if !self.value.is_empty() {
                            return Err(ErrorCode::BadXPath);
                        }
                        self.options |= PropFlags::VALUE_IS_STRUCT;
                        self.children.push(implicit_node(name, next));
                        self.children.len() - 1
                    }
                };
                Ok(self.children.get_mut(pos))
            }
            Step::Qualifier(name) => {
                let pos = self.qualifiers.iter().position(|q| &q.name == name);
                match (pos, create) {
                    (Some(pos), _) => Ok(self.qualifiers.get_mut(pos)),
                    (None, false) => Ok(None),
                    (None, true) => {
                        self.set_qualifier(name, "");
                        let pos = self.qualifiers.iter().position(|q| &q.name == name);
                        Ok(pos.and_then(|pos| self.qualifiers.get_mut(pos)))
                    }
                }
            }
            Step::Index(_) | Step::Last | Step::Lang(_) => {
                if !self.is_array() {
                    if !create || !self.value.is_empty() || !self.children.is_empty() {
                        return Err(ErrorCode::BadXPath);
                    }
                    self.options |= implicit_array_form(step);
                }
                let len = self.children.len();
                let pos = match step {
                    Step::Index(index) if *index <= len => Some(index - 1),
                    Step::Index(index) if *index == len + 1 && create => None,
                    Step::Index(_) if create => return Err(ErrorCode::BadIndex),
                    Step::Index(_) => return Ok(None),
                    Step::Last if len > 0 => Some(len - 1),
                    Step::Last => None,
                    Step::Lang(lang) => {
                        let lang = lang.to_ascii_lowercase();
                        self.children
                            .iter()
                            .position(|item| item.lang().as_deref() == Some(lang.as_str()))
                    }
                    _ => None,
                };
                match (pos, create) {
                    (Some(pos), _) => Ok(self.children.get_mut(pos)),
                    (None, false) => Ok(None),
                    (None, true) => {
                        let item = match step {
                            Step::Lang(lang) => XmpNode::lang_item(lang, ""),
                            _ => implicit_node(ITEM_NAME, next),
                        };
                        self.children.push(item);
                        Ok(self.children.last_mut())
                    }
                }
            }
        }
    }

    fn child(&self, step: &Step) -> Option<&XmpNode> {
        match step {
            Step::Field(name) => self.field(name),
            Step::Qualifier(name) => self.qualifier(name),
            Step::Index(index) => self.children.get(index.checked_sub(1)?),
            Step::Last => self.children.last(),
            Step::Lang(lang) => {
                let lang = lang.to_ascii_lowercase();
                self.children
                    .iter()
                    .find(|item| item.lang().as_deref() == Some(lang.as_str()))
            }
        }
    }
}

/// Node created implicitly on the way to a deeper step
fn implicit_node(name: &str, next: Option<&Step>) -> XmpNode {
    let mut node = XmpNode::new(name);
    match next {
        Some(Step::Field(_)) => node.options = PropFlags::VALUE_IS_STRUCT,
        Some(step) if step.is_array_step() => node.options = implicit_array_form(step),
        _ => {}
    }
    node
}

fn implicit_array_form(step: &Step) -> PropFlags {
    match step {
        Step::Lang(_) => PropFlags::ARRAY_IS_ALTTEXT.normalized(),
        _ => PropFlags::VALUE_IS_ARRAY,
    }
}

/// The properties of one namespace
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SchemaNode {
    pub(crate) uri: String,
    pub(crate) properties: Vec<XmpNode>,
}

/// A metadata packet
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Packet {
    pub(crate) schemas: Vec<SchemaNode>,
}

impl Packet {
    pub(crate) fn schema(&self, uri: &str) -> Option<&SchemaNode> {
        self.schemas.iter().find(|s| s.uri == uri)
    }

    /// Find the node at `steps` below `uri`
    pub(crate) fn find(&self, uri: &str, steps: &[Step]) -> Option<&XmpNode> {
        let (first, rest) = steps.split_first()?;
        let Step::Field(name) = first else {
            return None;
        };
        let schema = self.schema(uri)?;
        let mut node = schema.properties.iter().find(|p| &p.name == name)?;
        for step in rest {
            node = node.child(step)?;
        }
        Some(node)
    }

    /// Find the node at `steps`, failing on a path that contradicts the tree
    pub(crate) fn find_checked(
        &mut self,
        uri: &str,
        steps: &[Step],
    ) -> Result<Option<&mut XmpNode>, ErrorCode> {
        self.walk(uri, steps, false)
    }

    /// Find or create the node at `steps`
    pub(crate) fn find_or_create(
        &mut self,
        uri: &str,
        steps: &[Step],
    ) -> Result<&mut XmpNode, ErrorCode> {
        self.walk(uri, steps, true)?.ok_or(ErrorCode::InternalFailure)
    }

    fn walk(
        &mut self,
        uri: &str,
        steps: &[Step],
        create: bool,
    ) -> Result<Option<&mut XmpNode>, ErrorCode> {
        let Some((Step::Field(name), rest)) = steps.split_first() else {
            return Err(ErrorCode::BadXPath);
        };
        let schema_pos = match self.schemas.iter().position(|s| s.uri == uri) {
            Some(pos) => pos,
            None if create => {
                self.schemas.push(SchemaNode {
                    uri: uri.to_string(),
                    properties: Vec::new(),
                });
                self.schemas.len() - 1
            }
            None => return Ok(None),
        };
        let schema = &mut self.schemas[schema_pos];
        let prop_pos = match schema.properties.iter().position(|p| &p.name == name) {
            Some(pos) => pos,
            None if create => {
                schema.properties.push(implicit_node(name, rest.first()));
                schema.properties.len() - 1
            }
            None => return Ok(None),
        };

        let mut node = &mut schema.properties[prop_pos];
        for (i, step) in rest.iter().enumerate() {
            match node.child_mut(step, create, rest.get(i + 1))? {
                Some(child) => node = child,
                None => return Ok(None),
            }
        }
        Ok(Some(node))
    }

    /// Remove the node at `steps`; a missing node is not an error
    pub(crate) fn delete(&mut self, uri: &str, steps: &[Step]) -> Result<(), ErrorCode> {
        let Some((last, parent_steps)) = steps.split_last() else {
            return Err(ErrorCode::BadXPath);
        };
        if parent_steps.is_empty() {
            if let Some(schema_pos) = self.schemas.iter().position(|s| s.uri == uri) {
                let schema = &mut self.schemas[schema_pos];
                if let Step::Field(name) = last {
                    schema.properties.retain(|p| &p.name != name);
                }
                if schema.properties.is_empty() {
                    self.schemas.remove(schema_pos);
                }
            }
            return Ok(());
        }

        let Some(parent) = self.find_checked(uri, parent_steps)? else {
            return Ok(());
        };
        match last {
            Step::Qualifier(name) => {
                parent.qualifiers.retain(|q| &q.name != name);
                parent.refresh_qualifier_bits();
            }
            Step::Field(name) => parent.children.retain(|c| &c.name != name),
            Step::Index(index) => {
                if *index <= parent.children.len() {
                    parent.children.remove(index - 1);
                }
            }
            Step::Last => {
                parent.children.pop();
            }
            Step::Lang(lang) => {
                let lang = lang.to_ascii_lowercase();
                if let Some(pos) = parent
                    .children
                    .iter()
                    .position(|item| item.lang().as_deref() == Some(lang.as_str()))
                {
                    parent.children.remove(pos);
                }
            }
        }
        Ok(())
    }
}
