//! Whole-packet dumps grouped by schema

use crate::core::error::XmpResult;
use crate::core::meta::XmpMeta;
use crate::core::options::OpenFlags;
use crate::engine::{ensure_exists, Context};
use crate::files::file::XmpFiles;
use crate::types::property::XmpProperty;
use std::path::Path;

/// Every property of a packet, grouped by schema URI in walk order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDict {
    groups: Vec<(String, Vec<XmpProperty>)>,
}

impl PropertyDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of schemas
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Schema URIs in walk order
    pub fn schemas(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(schema, _)| schema.as_str())
    }

    /// Properties of one schema
    pub fn get(&self, schema: &str) -> Option<&[XmpProperty]> {
        self.groups
            .iter()
            .find(|(uri, _)| uri == schema)
            .map(|(_, rows)| rows.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[XmpProperty])> {
        self.groups
            .iter()
            .map(|(schema, rows)| (schema.as_str(), rows.as_slice()))
    }

    fn group_mut(&mut self, schema: &str) -> &mut Vec<XmpProperty> {
        let index = match self.groups.iter().position(|(uri, _)| uri == schema) {
            Some(index) => index,
            None => {
                self.groups.push((schema.to_string(), Vec::new()));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index].1
    }

    /// JSON object of schema URI to property rows
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for PropertyDict {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (schema, rows) in &self.groups {
            map.serialize_entry(schema, rows)?;
        }
        map.end()
    }
}

/// Dump every property of `meta`
///
/// Schema nodes open a group and are not listed themselves.
pub fn object_to_dict(meta: &XmpMeta<'_>) -> XmpResult<PropertyDict> {
    let mut dict = PropertyDict::new();
    for property in meta.iter()? {
        let property = property?;
        let group = dict.group_mut(&property.schema);
        if !property.is_schema() {
            group.push(property);
        }
    }
    Ok(dict)
}

/// Dump every property of the XMP in a file
///
/// A missing file is a `NotFound` I/O error. A file the engine cannot read,
/// or one without XMP, gives an empty dict.
pub fn file_to_dict(ctx: &Context, path: impl AsRef<Path>) -> XmpResult<PropertyDict> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let read = XmpFiles::with_file(ctx, path, OpenFlags::READ).and_then(|file| file.get_xmp());
    let meta = match read {
        Ok(Some(meta)) => meta,
        Ok(None) => return Ok(PropertyDict::new()),
        Err(e) if e.is_engine_error() => {
            log::debug!("no readable XMP in {}: {e}", path.display());
            return Ok(PropertyDict::new());
        }
        Err(e) => return Err(e),
    };
    object_to_dict(&meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::PropFlags;
    use pretty_assertions::assert_eq;

    const NS1: &str = "ns:test1/";
    const NS2: &str = "ns:test2/";

    #[test]
    fn test_object_to_dict_groups_by_schema() {
        let ctx = Context::memory().unwrap();
        ctx.register_namespace(NS1, "ns1").unwrap();
        ctx.register_namespace(NS2, "ns2").unwrap();
        let mut meta = XmpMeta::new(&ctx).unwrap();
        meta.set_property(NS1, "A", "a", PropFlags::empty()).unwrap();
        meta.set_property(NS2, "B", "b", PropFlags::empty()).unwrap();
        meta.set_property(NS1, "C", "c", PropFlags::empty()).unwrap();

        let dict = object_to_dict(&meta).unwrap();
        assert_eq!(dict.schemas().collect::<Vec<_>>(), vec![NS1, NS2]);
        let paths: Vec<_> = dict.get(NS1).unwrap().iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec!["ns1:A", "ns1:C"]);
        assert_eq!(dict.get(NS2).unwrap()[0].value, "b");
    }

    #[test]
    fn test_empty_packet() {
        let ctx = Context::memory().unwrap();
        let meta = XmpMeta::new(&ctx).unwrap();
        assert!(object_to_dict(&meta).unwrap().is_empty());
    }

    #[test]
    fn test_file_to_dict_missing_file() {
        let ctx = Context::memory().unwrap();
        let err = file_to_dict(&ctx, "/nonexistent/image.jpg").unwrap_err();
        assert!(matches!(err, crate::core::error::XmpError::IoError(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_to_json() {
        let ctx = Context::memory().unwrap();
        ctx.register_namespace(NS1, "ns1").unwrap();
        let mut meta = XmpMeta::new(&ctx).unwrap();
        meta.set_property(NS1, "A", "a", PropFlags::empty()).unwrap();
        let json = object_to_dict(&meta).unwrap().to_json().unwrap();
        assert_eq!(
            json,
            r#"{"ns:test1/":[{"schema":"ns:test1/","path":"ns1:A","value":"a","options":0}]}"#
        );
    }
}
