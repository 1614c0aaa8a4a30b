//! Option bitmasks
//!
//! Typed `bitflags` sets for every option family the engine accepts, plus the
//! named option tables used to compose a bitmask from `(name, bool)` pairs.
//! The bit values are the engine's and must match it exactly.

use crate::core::error::{XmpError, XmpResult};
use bitflags::bitflags;

bitflags! {
    /// Property option bits, both passed to setters and reported by getters
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropFlags: u32 {
        /// The value is a URI, serialized as `rdf:resource`
        const VALUE_IS_URI = 0x0000_0002;
        /// The property has qualifiers (including `xml:lang` and `rdf:type`)
        const HAS_QUALIFIERS = 0x0000_0010;
        /// The node is a qualifier
        const IS_QUALIFIER = 0x0000_0020;
        /// The property has an `xml:lang` qualifier; implies `HAS_QUALIFIERS`
        const HAS_LANG = 0x0000_0040;
        /// The property has an `rdf:type` qualifier; implies `HAS_QUALIFIERS`
        const HAS_TYPE = 0x0000_0080;
        /// The value is a structure with nested fields
        const VALUE_IS_STRUCT = 0x0000_0100;
        /// The value is an array; alone it means an unordered array
        const VALUE_IS_ARRAY = 0x0000_0200;
        /// Item order matters; implies `VALUE_IS_ARRAY`
        const ARRAY_IS_ORDERED = 0x0000_0400;
        /// Items are alternates; implies `ARRAY_IS_ORDERED`
        const ARRAY_IS_ALT = 0x0000_0800;
        /// Items are localized text; implies `ARRAY_IS_ALT`
        const ARRAY_IS_ALTTEXT = 0x0000_1000;
        /// Insert before the given array index
        const INSERT_BEFORE_ITEM = 0x0000_4000;
        /// Insert after the given array index
        const INSERT_AFTER_ITEM = 0x0000_8000;
        /// The property is an alias for another property
        const IS_ALIAS = 0x0001_0000;
        /// The property is the base value of a set of aliases
        const HAS_ALIASES = 0x0002_0000;
        /// Owned by applications rather than the document
        const IS_INTERNAL = 0x0004_0000;
        /// Not derived from the document content
        const IS_STABLE = 0x0010_0000;
        /// Derived from the document content
        const IS_DERIVED = 0x0020_0000;
        /// Reported by iterators for schema nodes
        const IS_SCHEMA = 0x8000_0000;
    }
}

impl PropFlags {
    /// Unordered array; same bit as `VALUE_IS_ARRAY`
    pub const ARRAY_IS_UNORDERED: PropFlags = PropFlags::VALUE_IS_ARRAY;

    /// All bits describing the form of an array
    pub const ARRAY_FORM_MASK: PropFlags = PropFlags::VALUE_IS_ARRAY
        .union(PropFlags::ARRAY_IS_ORDERED)
        .union(PropFlags::ARRAY_IS_ALT)
        .union(PropFlags::ARRAY_IS_ALTTEXT);

    /// All bits marking a composite (struct or array) value
    pub const COMPOSITE_MASK: PropFlags = PropFlags::VALUE_IS_STRUCT.union(Self::ARRAY_FORM_MASK);

    /// Bits reserved for transient use by the engine
    pub const RESERVED_MASK: u32 = 0x7000_0000;

    /// Neither a struct nor an array
    pub fn is_simple(self) -> bool {
        !self.intersects(Self::COMPOSITE_MASK)
    }

    pub fn is_struct(self) -> bool {
        self.contains(PropFlags::VALUE_IS_STRUCT)
    }

    pub fn is_array(self) -> bool {
        self.contains(PropFlags::VALUE_IS_ARRAY)
    }

    pub fn is_alt_text(self) -> bool {
        self.contains(PropFlags::ARRAY_IS_ALTTEXT)
    }

    pub fn is_schema(self) -> bool {
        self.contains(PropFlags::IS_SCHEMA)
    }

    /// Add the bits implied by the ones present
    ///
    /// `HAS_LANG`/`HAS_TYPE` imply `HAS_QUALIFIERS`, alt-text implies alt,
    /// alt implies ordered, ordered implies array.
    pub fn normalized(self) -> Self {
        let mut flags = self;
        if flags.intersects(PropFlags::HAS_LANG | PropFlags::HAS_TYPE) {
            flags |= PropFlags::HAS_QUALIFIERS;
        }
        if flags.contains(PropFlags::ARRAY_IS_ALTTEXT) {
            flags |= PropFlags::ARRAY_IS_ALT;
        }
        if flags.contains(PropFlags::ARRAY_IS_ALT) {
            flags |= PropFlags::ARRAY_IS_ORDERED;
        }
        if flags.contains(PropFlags::ARRAY_IS_ORDERED) {
            flags |= PropFlags::VALUE_IS_ARRAY;
        }
        flags
    }
}

bitflags! {
    /// Serialization options
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SerialFlags: u32 {
        /// Little-endian marker for the UTF-16/UTF-32 encodings
        const LITTLE_ENDIAN_BIT = 0x0001;
        /// UTF-16, big-endian
        const ENCODE_UTF16_BIG = 0x0002;
        /// UTF-16, little-endian
        const ENCODE_UTF16_LITTLE = 0x0003;
        /// UTF-32, big-endian
        const ENCODE_UTF32_BIG = 0x0004;
        /// UTF-32, little-endian
        const ENCODE_UTF32_LITTLE = 0x0005;
        /// Do not include an XML packet wrapper
        const OMIT_PACKET_WRAPPER = 0x0010;
        /// Create a read-only packet wrapper
        const READ_ONLY_PACKET = 0x0020;
        /// Use the compact RDF syntax
        const USE_COMPACT_FORMAT = 0x0040;
        /// Pad for a JPEG thumbnail if no `xmp:Thumbnails` is present
        const INCLUDE_THUMBNAIL_PAD = 0x0100;
        /// The padding parameter is the overall packet length
        const EXACT_PACKET_LENGTH = 0x0200;
        /// Show aliases as XML comments
        const WRITE_ALIAS_COMMENTS = 0x0400;
        /// Omit all formatting whitespace
        const OMIT_ALL_FORMATTING = 0x0800;
    }
}

impl SerialFlags {
    /// The low bits selecting the output encoding
    pub const ENCODING_MASK: u32 = 0x0007;

    /// Options that make no sense without a packet wrapper
    pub const NEEDS_WRAPPER: SerialFlags = SerialFlags::READ_ONLY_PACKET
        .union(SerialFlags::INCLUDE_THUMBNAIL_PAD)
        .union(SerialFlags::EXACT_PACKET_LENGTH);
}

bitflags! {
    /// Options for opening a file
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenFlags: u32 {
        /// Open for read-only access
        const READ = 0x0000_0001;
        /// Open for reading and writing
        const FOR_UPDATE = 0x0000_0002;
        /// Only the XMP is wanted
        const ONLY_XMP = 0x0000_0004;
        /// Cache a thumbnail if possible
        const CACHE_THUMBNAIL = 0x0000_0008;
        /// Be strict about locating XMP and reconciling with other forms
        const STRICTLY = 0x0000_0010;
        /// Require a smart handler
        const USE_SMART_HANDLER = 0x0000_0020;
        /// Force packet scanning, do not use a smart handler
        const USE_PACKET_SCANNING = 0x0000_0040;
        /// Only packet scan files known to need scanning
        const LIMIT_SCANNING = 0x0000_0080;
        /// Attempt to repair a file opened for update
        const REPAIR_FILE = 0x0000_0100;
        /// The caller is a background thread
        const IN_BACKGROUND = 0x1000_0000;
    }
}

impl OpenFlags {
    pub fn is_for_update(self) -> bool {
        self.contains(OpenFlags::FOR_UPDATE)
    }
}

bitflags! {
    /// Options for closing a file
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CloseFlags: u32 {
        /// Write into a temporary file and swap it in
        const SAFE_UPDATE = 0x0001;
    }
}

/// What an iterator walks; the low 8 bits of the iterator options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum IterClass {
    /// The property tree of a packet
    #[default]
    Properties = 0x00,
    /// The global alias table
    Aliases = 0x01,
    /// The global namespace table
    Namespaces = 0x02,
}

bitflags! {
    /// Iterator options above the class byte
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IterFlags: u32 {
        /// Just the immediate children of the root
        const JUST_CHILDREN = 0x0100;
        /// Just the leaf nodes
        const JUST_LEAF_NODES = 0x0200;
        /// Only the leaf part of each path
        const JUST_LEAF_NAME = 0x0400;
        /// Include aliases
        const INCLUDE_ALIASES = 0x0800;
        /// Omit all qualifiers
        const OMIT_QUALIFIERS = 0x1000;
    }
}

impl IterFlags {
    /// The low byte holding the [`IterClass`]
    pub const CLASS_MASK: u32 = 0x00FF;

    /// Combine these flags with an iteration class into the engine's bitmask
    pub fn with_class(self, class: IterClass) -> u32 {
        self.bits() | class as u32
    }

    /// Split a raw iterator bitmask into its class and flags
    pub fn split(bits: u32) -> (Option<IterClass>, IterFlags) {
        let class = match bits & Self::CLASS_MASK {
            0x00 => Some(IterClass::Properties),
            0x01 => Some(IterClass::Aliases),
            0x02 => Some(IterClass::Namespaces),
            _ => None,
        };
        (class, IterFlags::from_bits_truncate(bits))
    }
}

bitflags! {
    /// Options for `XmpIterator::skip`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SkipFlags: u32 {
        /// Skip the subtree below the current node
        const SKIP_SUBTREE = 0x0001;
        /// Skip the subtree and the remaining siblings of the current node
        const SKIP_SIBLINGS = 0x0002;
    }
}

/// What to do with option names missing from a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownOptions {
    /// Silently skip them
    #[default]
    Ignore,
    /// Fail with [`XmpError::UnknownOption`]
    Reject,
}

/// A named mapping from option keyword to bit value
#[derive(Debug)]
pub struct OptionTable {
    family: &'static str,
    entries: &'static [(&'static str, u32)],
}

impl OptionTable {
    /// Name of the option family, used in error messages
    pub fn family(&self) -> &'static str {
        self.family
    }

    /// Bit value for a keyword
    pub fn bit(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, bit)| *bit)
    }

    /// All keywords of this table, in declaration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    /// Compose a bitmask, ignoring unknown names
    pub fn compose<'a, I>(&self, selected: I) -> u32
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        selected
            .into_iter()
            .filter(|(_, on)| *on)
            .filter_map(|(name, _)| self.bit(name))
            .fold(0, |acc, bit| acc | bit)
    }

    /// Compose a bitmask under an explicit policy for unknown names
    pub fn compose_with<'a, I>(&self, selected: I, policy: UnknownOptions) -> XmpResult<u32>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut mask = 0;
        for (name, on) in selected {
            match self.bit(name) {
                Some(bit) if on => mask |= bit,
                Some(_) => {}
                None if policy == UnknownOptions::Reject => {
                    return Err(XmpError::UnknownOption {
                        family: self.family,
                        name: name.to_string(),
                    })
                }
                None => {}
            }
        }
        Ok(mask)
    }
}

/// Compose a bitmask from `table` and the `(name, enabled)` pairs in `selected`
///
/// Names missing from the table are ignored.
pub fn compose<'a, I>(table: &OptionTable, selected: I) -> u32
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    table.compose(selected)
}

/// Test a single option bit in a mask
pub fn has_option(option: u32, mask: u32) -> bool {
    option & mask != 0
}

/// File open options by keyword
pub static OPEN_OPTIONS: OptionTable = OptionTable {
    family: "open",
    entries: &[
        ("open_nooption", 0x0000_0000),
        ("open_read", 0x0000_0001),
        ("open_forupdate", 0x0000_0002),
        ("open_onlyxmp", 0x0000_0004),
        ("open_cachetnail", 0x0000_0008),
        ("open_strictly", 0x0000_0010),
        ("open_usesmarthandler", 0x0000_0020),
        ("open_usepacketscanning", 0x0000_0040),
        ("open_limitscanning", 0x0000_0080),
        ("open_repairfile", 0x0000_0100),
        ("open_inbackground", 0x1000_0000),
    ],
};

/// File close options by keyword
pub static CLOSE_OPTIONS: OptionTable = OptionTable {
    family: "close",
    entries: &[("close_nooption", 0x0000), ("close_safeupdate", 0x0001)],
};

/// Serialization options by keyword
pub static SERIAL_OPTIONS: OptionTable = OptionTable {
    family: "serialize",
    entries: &[
        ("omit_packet_wrapper", 0x0010),
        ("read_only_packet", 0x0020),
        ("use_compact_format", 0x0040),
        ("include_thumbnail_pad", 0x0100),
        ("exact_packet_length", 0x0200),
        ("write_alias_comments", 0x0400),
        ("omit_all_formatting", 0x0800),
    ],
};

/// Iterator options by keyword
pub static ITER_OPTIONS: OptionTable = OptionTable {
    family: "iterator",
    entries: &[
        ("iter_properties", 0x0000),
        ("iter_aliases", 0x0001),
        ("iter_namespaces", 0x0002),
        ("iter_justchildren", 0x0100),
        ("iter_justleafnodes", 0x0200),
        ("iter_justleafname", 0x0400),
        ("iter_includealiases", 0x0800),
        ("iter_omitqualifiers", 0x1000),
    ],
};

/// Iterator skip options by keyword
pub static SKIP_OPTIONS: OptionTable = OptionTable {
    family: "skip",
    entries: &[("iter_skipsubtree", 0x0001), ("iter_skipsiblings", 0x0002)],
};

/// Property options by keyword
pub static PROP_OPTIONS: OptionTable = OptionTable {
    family: "property",
    entries: &[
        ("prop_value_is_uri", 0x0000_0002),
        ("prop_has_qualifiers", 0x0000_0010),
        ("prop_is_qualifier", 0x0000_0020),
        ("prop_has_lang", 0x0000_0040),
        ("prop_has_type", 0x0000_0080),
        ("prop_value_is_struct", 0x0000_0100),
        ("prop_value_is_array", 0x0000_0200),
        ("prop_array_is_unordered", 0x0000_0200),
        ("prop_array_is_ordered", 0x0000_0400),
        ("prop_array_is_alt", 0x0000_0800),
        ("prop_array_is_alttext", 0x0000_1000),
        ("prop_is_alias", 0x0001_0000),
        ("prop_has_aliases", 0x0002_0000),
        ("prop_is_internal", 0x0004_0000),
        ("prop_is_stable", 0x0010_0000),
        ("prop_is_derived", 0x0020_0000),
        ("prop_is_schema", 0x8000_0000),
    ],
};

/// Options for opening a file, as a builder
///
/// # Example
///
/// ```rust
/// use libxmp::{OpenFlags, OpenOptions};
///
/// let options = OpenOptions::default().for_update().strict();
/// assert!(options.flags().contains(OpenFlags::FOR_UPDATE | OpenFlags::STRICTLY));
/// ```
#[derive(Default, Clone, Copy, Debug)]
pub struct OpenOptions {
    /// Open for read-only access
    pub read: bool,
    /// Open for reading and writing (default: read-only)
    pub for_update: bool,
    /// Only the XMP is wanted, skip reconciliation with native metadata
    pub only_xmp: bool,
    /// Cache a thumbnail if possible
    pub cache_thumbnail: bool,
    /// Be strict about locating XMP and reconciling with other forms
    pub strict: bool,
    /// Require the use of a smart handler
    pub use_smart_handler: bool,
    /// Force packet scanning (do not use smart handler)
    pub use_packet_scanning: bool,
    /// Only packet scan files "known" to need scanning
    pub limited_scanning: bool,
    /// Attempt to repair a file opened for update
    pub repair: bool,
    /// The caller is a background thread
    pub in_background: bool,
}

impl OpenOptions {
    /// Open for read-only access.
    pub fn for_read(mut self) -> Self {
        self.read = true;
        self.for_update = false;
        self
    }

    /// Open for reading and writing.
    ///
    /// Files opened for update are written to only when closing.
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self.read = false;
        self
    }

    /// Only the XMP is wanted.
    pub fn only_xmp(mut self) -> Self {
        self.only_xmp = true;
        self
    }

    /// Cache a thumbnail if possible.
    pub fn cache_thumbnail(mut self) -> Self {
        self.cache_thumbnail = true;
        self
    }

    /// Be strict about locating XMP and reconciling with other forms.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Require the use of a smart handler.
    ///
    /// Do not fall back to packet scanning.
    pub fn use_smart_handler(mut self) -> Self {
        self.use_smart_handler = true;
        self
    }

    /// Force packet scanning.
    ///
    /// Do not use a smart handler.
    pub fn use_packet_scanning(mut self) -> Self {
        self.use_packet_scanning = true;
        self
    }

    /// Only packet scan files "known" to need scanning.
    pub fn limited_scanning(mut self) -> Self {
        self.limited_scanning = true;
        self
    }

    /// Attempt to repair a damaged file opened for update.
    pub fn repair(mut self) -> Self {
        self.repair = true;
        self
    }

    /// Mark the caller as a background thread.
    pub fn in_background(mut self) -> Self {
        self.in_background = true;
        self
    }

    /// The engine bitmask for these options
    pub fn flags(&self) -> OpenFlags {
        [
            (self.read, OpenFlags::READ),
            (self.for_update, OpenFlags::FOR_UPDATE),
            (self.only_xmp, OpenFlags::ONLY_XMP),
            (self.cache_thumbnail, OpenFlags::CACHE_THUMBNAIL),
            (self.strict, OpenFlags::STRICTLY),
            (self.use_smart_handler, OpenFlags::USE_SMART_HANDLER),
            (self.use_packet_scanning, OpenFlags::USE_PACKET_SCANNING),
            (self.limited_scanning, OpenFlags::LIMIT_SCANNING),
            (self.repair, OpenFlags::REPAIR_FILE),
            (self.in_background, OpenFlags::IN_BACKGROUND),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(OpenFlags::empty(), |acc, (_, flag)| acc | flag)
    }
}

impl From<OpenOptions> for OpenFlags {
    fn from(options: OpenOptions) -> Self {
        options.flags()
    }
}
