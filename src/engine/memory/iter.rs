//! Depth-first traversal of a packet
//!
//! The traversal is flattened into rows up front, in pre-order, each row
//! remembering where its subtree and its sibling group end. Filtering options
//! only decide which rows are emitted; skipping moves the cursor past a
//! subtree or a sibling group.

use super::path::{build_path, Step};
use super::tree::{Packet, XmpNode};
use crate::core::error::ErrorCode;
use crate::core::options::{IterFlags, PropFlags, SkipFlags};

#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub(crate) schema: String,
    pub(crate) path: String,
    pub(crate) value: String,
    pub(crate) options: u32,
    emit: bool,
    /// First row past this row's descendants
    subtree_end: usize,
    /// First row past this row's remaining siblings
    siblings_end: usize,
}

/// Traversal state of one iterator
#[derive(Debug)]
pub(crate) struct Cursor {
    rows: Vec<Row>,
    next: usize,
    current: Option<usize>,
}

/// What an iterator covers
pub(crate) enum Scope<'a> {
    Everything,
    Schema(&'a str),
    Property(&'a str, Vec<Step>),
}

impl Cursor {
    pub(crate) fn new(packet: &Packet, scope: Scope<'_>, flags: IterFlags) -> Self {
        let mut builder = Builder {
            rows: Vec::new(),
            flags,
        };
        let just_children = flags.contains(IterFlags::JUST_CHILDREN);
        match scope {
            Scope::Everything => {
                let group: Vec<usize> = packet
                    .schemas
                    .iter()
                    .map(|schema| {
                        let at = builder.schema(&schema.uri, &schema.properties);
                        if just_children {
                            builder.hide_descendants(at);
                        }
                        at
                    })
                    .collect();
                builder.close_group(&group);
            }
            Scope::Schema(uri) => {
                if let Some(schema) = packet.schema(uri) {
                    let at = builder.schema(&schema.uri, &schema.properties);
                    builder.close_group(&[at]);
                    if just_children {
                        builder.children_only(at);
                    }
                }
            }
            Scope::Property(uri, steps) => {
                if let Some(node) = packet.find(uri, &steps) {
                    let leaf = steps.last().map(Step::leaf_name).unwrap_or_default();
                    let at = builder.node(uri, node, build_path(&steps), leaf);
                    builder.close_group(&[at]);
                    if just_children {
                        builder.children_only(at);
                    }
                }
            }
        }
        Self {
            rows: builder.rows,
            next: 0,
            current: None,
        }
    }

    /// Advance to the next emitted row
    pub(crate) fn next_row(&mut self) -> Option<&Row> {
        let pos = (self.next..self.rows.len()).find(|&i| self.rows[i].emit)?;
        self.next = pos + 1;
        self.current = Some(pos);
        self.rows.get(pos)
    }

    /// Skip the rest of the current row's subtree or sibling group
    ///
    /// Before the first row has been returned there is nothing to skip.
    pub(crate) fn skip(&mut self, options: u32) -> Result<(), ErrorCode> {
        let flags = SkipFlags::from_bits(options).ok_or(ErrorCode::BadOptions)?;
        if flags != SkipFlags::SKIP_SUBTREE && flags != SkipFlags::SKIP_SIBLINGS {
            return Err(ErrorCode::BadOptions);
        }
        let Some(current) = self.current.and_then(|pos| self.rows.get(pos)) else {
            return Ok(());
        };
        let end = if flags == SkipFlags::SKIP_SUBTREE {
            current.subtree_end
        } else {
            current.siblings_end
        };
        self.next = self.next.max(end);
        Ok(())
    }
}

struct Builder {
    rows: Vec<Row>,
    flags: IterFlags,
}

impl Builder {
    fn push(&mut self, row: Row) -> usize {
        self.rows.push(row);
        self.rows.len() - 1
    }

    fn schema(&mut self, uri: &str, properties: &[XmpNode]) -> usize {
        let at = self.push(Row {
            schema: uri.to_string(),
            path: String::new(),
            value: String::new(),
            options: PropFlags::IS_SCHEMA.bits(),
            emit: !self.flags.contains(IterFlags::JUST_LEAF_NODES),
            subtree_end: 0,
            siblings_end: 0,
        });
        let group: Vec<usize> = properties
            .iter()
            .map(|prop| self.node(uri, prop, prop.name.clone(), prop.name.clone()))
            .collect();
        self.close_group(&group);
        self.rows[at].subtree_end = self.rows.len();
        at
    }

    fn node(&mut self, uri: &str, node: &XmpNode, path: String, leaf: String) -> usize {
        let just_leaf_name = self.flags.contains(IterFlags::JUST_LEAF_NAME);
        let leaf_only = self.flags.contains(IterFlags::JUST_LEAF_NODES);
        let at = self.push(Row {
            schema: uri.to_string(),
            path: if just_leaf_name { leaf } else { path.clone() },
            value: node.value.clone(),
            options: node.options.bits(),
            emit: !(leaf_only && !node.children.is_empty()),
            subtree_end: 0,
            siblings_end: 0,
        });

        let mut group = Vec::new();
        if !self.flags.contains(IterFlags::OMIT_QUALIFIERS) {
            for qual in &node.qualifiers {
                let leaf = format!("?{}", qual.name);
                group.push(self.node(uri, qual, format!("{}/{}", path, leaf), leaf));
            }
        }
        let is_array = node.is_array();
        for (i, child) in node.children.iter().enumerate() {
            let (child_path, leaf) = if is_array {
                let leaf = format!("[{}]", i + 1);
                (format!("{}{}", path, leaf), leaf)
            } else {
                (format!("{}/{}", path, child.name), child.name.clone())
            };
            group.push(self.node(uri, child, child_path, leaf));
        }
        self.close_group(&group);
        self.rows[at].subtree_end = self.rows.len();
        at
    }

    fn close_group(&mut self, group: &[usize]) {
        let end = self.rows.len();
        for &i in group {
            self.rows[i].siblings_end = end;
        }
    }

    /// Emit the row at `at` but none of its descendants
    fn hide_descendants(&mut self, at: usize) {
        let end = self.rows[at].subtree_end;
        for row in &mut self.rows[at + 1..end] {
            row.emit = false;
        }
    }

    /// Emit only the immediate children of the row at `at`
    fn children_only(&mut self, at: usize) {
        self.rows[at].emit = false;
        let end = self.rows[at].subtree_end;
        let mut i = at + 1;
        while i < end {
            let child_end = self.rows[i].subtree_end;
            self.hide_descendants(i);
            i = child_end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NS1: &str = "ns:test1/";
    const NS2: &str = "ns:test2/";

    fn field(name: &str) -> Step {
        Step::Field(name.to_string())
    }

    fn fixture() -> Packet {
        let mut packet = Packet::default();
        let mut set = |uri: &str, steps: &[Step], value: &str| {
            packet
                .find_or_create(uri, steps)
                .unwrap()
                .assign(value, PropFlags::empty())
                .unwrap();
        };
        set(NS1, &[field("ns1:Simple")], "s");
        set(NS1, &[field("ns1:Array"), Step::Index(1)], "a1");
        set(NS1, &[field("ns1:Array"), Step::Index(2)], "a2");
        set(NS1, &[field("ns1:Struct"), field("ns2:Field")], "f");
        set(NS2, &[field("ns2:Prop")], "p");
        packet
            .find_or_create(NS1, &[field("ns1:Simple")])
            .unwrap()
            .set_qualifier("xml:lang", "en");
        packet
    }

    fn paths(cursor: &mut Cursor) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(row) = cursor.next_row() {
            out.push(format!("{}|{}", row.schema, row.path));
        }
        out
    }

    #[test]
    fn test_full_traversal_order() {
        let mut cursor = Cursor::new(&fixture(), Scope::Everything, IterFlags::empty());
        assert_eq!(
            paths(&mut cursor),
            vec![
                "ns:test1/|",
                "ns:test1/|ns1:Simple",
                "ns:test1/|ns1:Simple/?xml:lang",
                "ns:test1/|ns1:Array",
                "ns:test1/|ns1:Array[1]",
                "ns:test1/|ns1:Array[2]",
                "ns:test1/|ns1:Struct",
                "ns:test1/|ns1:Struct/ns2:Field",
                "ns:test2/|",
                "ns:test2/|ns2:Prop",
            ]
        );
    }

    #[test]
    fn test_skip_subtree_of_schema() {
        let mut cursor = Cursor::new(&fixture(), Scope::Everything, IterFlags::empty());
        assert_eq!(cursor.next_row().unwrap().schema, NS1);
        cursor.skip(SkipFlags::SKIP_SUBTREE.bits()).unwrap();
        assert_eq!(paths(&mut cursor), vec!["ns:test2/|", "ns:test2/|ns2:Prop"]);
    }

    #[test]
    fn test_skip_siblings() {
        let mut cursor = Cursor::new(&fixture(), Scope::Everything, IterFlags::empty());
        cursor.next_row();
        cursor.next_row();
        assert_eq!(cursor.next_row().unwrap().path, "ns1:Simple/?xml:lang");
        cursor.skip(SkipFlags::SKIP_SIBLINGS.bits()).unwrap();
        assert_eq!(cursor.next_row().unwrap().path, "ns1:Array");
        cursor.next_row();
        cursor.skip(SkipFlags::SKIP_SIBLINGS.bits()).unwrap();
        assert_eq!(cursor.next_row().unwrap().path, "ns1:Struct");
    }

    #[test]
    fn test_skip_validation() {
        let mut cursor = Cursor::new(&fixture(), Scope::Everything, IterFlags::empty());
        assert_eq!(cursor.skip(0), Err(ErrorCode::BadOptions));
        assert_eq!(cursor.skip(3), Err(ErrorCode::BadOptions));
        // Nothing visited yet
        assert_eq!(cursor.skip(1), Ok(()));
        assert_eq!(cursor.next_row().unwrap().path, "");
    }

    #[test]
    fn test_leaf_filters() {
        let flags =
            IterFlags::JUST_LEAF_NODES | IterFlags::JUST_LEAF_NAME | IterFlags::OMIT_QUALIFIERS;
        let mut cursor = Cursor::new(&fixture(), Scope::Everything, flags);
        assert_eq!(
            paths(&mut cursor),
            vec![
                "ns:test1/|ns1:Simple",
                "ns:test1/|[1]",
                "ns:test1/|[2]",
                "ns:test1/|ns2:Field",
                "ns:test2/|ns2:Prop",
            ]
        );
    }

    #[test]
    fn test_scoped_traversal() {
        let packet = fixture();
        let mut cursor = Cursor::new(&packet, Scope::Schema(NS2), IterFlags::empty());
        assert_eq!(paths(&mut cursor), vec!["ns:test2/|", "ns:test2/|ns2:Prop"]);

        let scope = Scope::Property(NS1, vec![field("ns1:Array")]);
        let mut cursor = Cursor::new(&packet, scope, IterFlags::empty());
        assert_eq!(
            paths(&mut cursor),
            vec!["ns:test1/|ns1:Array", "ns:test1/|ns1:Array[1]", "ns:test1/|ns1:Array[2]"]
        );

        let mut cursor = Cursor::new(&packet, Scope::Schema("ns:missing/"), IterFlags::empty());
        assert!(cursor.next_row().is_none());
    }

    #[test]
    fn test_just_children() {
        let packet = fixture();
        let mut cursor = Cursor::new(&packet, Scope::Everything, IterFlags::JUST_CHILDREN);
        assert_eq!(paths(&mut cursor), vec!["ns:test1/|", "ns:test2/|"]);

        let mut cursor = Cursor::new(&packet, Scope::Schema(NS1), IterFlags::JUST_CHILDREN);
        assert_eq!(
            paths(&mut cursor),
            vec!["ns:test1/|ns1:Simple", "ns:test1/|ns1:Array", "ns:test1/|ns1:Struct"]
        );
    }
}
