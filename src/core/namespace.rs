//! Well-known XMP namespace URIs
//!
//! These are passed as the `schema` argument of property accessors and must
//! match the URIs in stored packets byte for byte.

// Adobe schemas
/// XMP Basic
pub const XMP_NS_XMP: &str = "http://ns.adobe.com/xap/1.0/";
pub const XMP_NS_XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
pub const XMP_NS_XMP_MM: &str = "http://ns.adobe.com/xap/1.0/mm/";
pub const XMP_NS_XMP_BJ: &str = "http://ns.adobe.com/xap/1.0/bj/";

pub const XMP_NS_PDF: &str = "http://ns.adobe.com/pdf/1.3/";
pub const XMP_NS_PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
pub const XMP_NS_PS_ALBUM: &str = "http://ns.adobe.com/album/1.0/";
pub const XMP_NS_EXIF: &str = "http://ns.adobe.com/exif/1.0/";
pub const XMP_NS_EXIF_AUX: &str = "http://ns.adobe.com/exif/1.0/aux/";
pub const XMP_NS_TIFF: &str = "http://ns.adobe.com/tiff/1.0/";
pub const XMP_NS_PNG: &str = "http://ns.adobe.com/png/1.0/";
pub const XMP_NS_SWF: &str = "http://ns.adobe.com/swf/1.0/";
pub const XMP_NS_JPEG: &str = "http://ns.adobe.com/jpeg/1.0/";
pub const XMP_NS_JP2K: &str = "http://ns.adobe.com/jp2k/1.0/";
/// Camera Raw settings
pub const XMP_NS_CAMERA_RAW: &str = "http://ns.adobe.com/camera-raw-settings/1.0/";
/// XMP Dynamic Media
pub const XMP_NS_DM: &str = "http://ns.adobe.com/xmp/1.0/DynamicMedia/";
pub const XMP_NS_ASF: &str = "http://ns.adobe.com/asf/1.0/";
pub const XMP_NS_WAV: &str = "http://ns.adobe.com/xmp/wav/1.0/";
pub const XMP_NS_XMP_NOTE: &str = "http://ns.adobe.com/xmp/note/";
pub const XMP_NS_ADOBE_STOCK_PHOTO: &str = "http://ns.adobe.com/StockPhoto/1.0/";
pub const XMP_NS_CREATOR_ATOM: &str = "http://ns.adobe.com/creatorAtom/1.0/";

// Qualifiers and structured property fields
pub const XMP_NS_XMP_IDENTIFIER_QUAL: &str = "http://ns.adobe.com/xmp/Identifier/qual/1.0/";
pub const XMP_NS_XMP_DIMENSIONS: &str = "http://ns.adobe.com/xap/1.0/sType/Dimensions#";
pub const XMP_NS_XMP_TEXT: &str = "http://ns.adobe.com/xap/1.0/t/";
pub const XMP_NS_XMP_PAGED_FILE: &str = "http://ns.adobe.com/xap/1.0/t/pg/";
pub const XMP_NS_XMP_GRAPHICS: &str = "http://ns.adobe.com/xap/1.0/g/";
pub const XMP_NS_XMP_IMAGE: &str = "http://ns.adobe.com/xap/1.0/g/img/";
pub const XMP_NS_XMP_FONT: &str = "http://ns.adobe.com/xap/1.0/sType/Font#";
pub const XMP_NS_XMP_RESOURCE_EVENT: &str = "http://ns.adobe.com/xap/1.0/sType/ResourceEvent#";
pub const XMP_NS_XMP_RESOURCE_REF: &str = "http://ns.adobe.com/xap/1.0/sType/ResourceRef#";
pub const XMP_NS_XMP_ST_VERSION: &str = "http://ns.adobe.com/xap/1.0/sType/Version#";
pub const XMP_NS_XMP_ST_JOB: &str = "http://ns.adobe.com/xap/1.0/sType/Job#";
pub const XMP_NS_XMP_MANIFEST_ITEM: &str = "http://ns.adobe.com/xap/1.0/sType/ManifestItem#";

// Older names for the text, paged-file and image namespaces
pub const XMP_NS_XMP_T: &str = XMP_NS_XMP_TEXT;
pub const XMP_NS_XMP_T_PG: &str = XMP_NS_XMP_PAGED_FILE;
pub const XMP_NS_XMP_G_IMG: &str = XMP_NS_XMP_IMAGE;

// Namespaces from outside Adobe
/// Dublin Core
pub const XMP_NS_DC: &str = "http://purl.org/dc/elements/1.1/";
pub const XMP_NS_IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
pub const XMP_NS_DICOM: &str = "http://ns.adobe.com/DICOM/";
pub const XMP_NS_PDFA_SCHEMA: &str = "http://www.aiim.org/pdfa/ns/schema#";
pub const XMP_NS_PDFA_PROPERTY: &str = "http://www.aiim.org/pdfa/ns/property#";
pub const XMP_NS_PDFA_TYPE: &str = "http://www.aiim.org/pdfa/ns/type#";
pub const XMP_NS_PDFA_FIELD: &str = "http://www.aiim.org/pdfa/ns/field#";
pub const XMP_NS_PDFA_ID: &str = "http://www.aiim.org/pdfa/ns/id/";
pub const XMP_NS_PDFA_EXTENSION: &str = "http://www.aiim.org/pdfa/ns/extension/";
pub const XMP_NS_PDFX: &str = "http://ns.adobe.com/pdfx/1.3/";
pub const XMP_NS_PDFX_ID: &str = "http://www.npes.org/pdfx/ns/id/";
pub const XMP_NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XMP_NS_XML: &str = "http://www.w3.org/XML/1998/namespace";

// Added by the engine
pub const XMP_NS_XMP_META: &str = "adobe:ns:meta/";
pub const XMP_NS_LIGHTROOM: &str = "http://ns.adobe.com/lightroom/1.0/";
pub const XMP_NS_CAMERA_RAW_SAVED_SETTINGS: &str =
    "http://ns.adobe.com/camera-raw-saved-settings/1.0/";
/// Creative Commons
pub const XMP_NS_CC: &str = "http://creativecommons.org/ns#";

/// Astronomy Visualization Metadata
pub const XMP_NS_AVM: &str = "http://www.communicatingastronomy.org/avm/1.0/";

/// Standard prefixes the engine registers at startup, without trailing colon
pub const STANDARD_PREFIXES: &[(&str, &str)] = &[
    (XMP_NS_XML, "xml"),
    (XMP_NS_RDF, "rdf"),
    (XMP_NS_DC, "dc"),
    (XMP_NS_XMP, "xmp"),
    (XMP_NS_XMP_RIGHTS, "xmpRights"),
    (XMP_NS_XMP_MM, "xmpMM"),
    (XMP_NS_XMP_BJ, "xmpBJ"),
    (XMP_NS_XMP_NOTE, "xmpNote"),
    (XMP_NS_PDF, "pdf"),
    (XMP_NS_PDFX, "pdfx"),
    (XMP_NS_PDFX_ID, "pdfxid"),
    (XMP_NS_PDFA_SCHEMA, "pdfaSchema"),
    (XMP_NS_PDFA_PROPERTY, "pdfaProperty"),
    (XMP_NS_PDFA_TYPE, "pdfaType"),
    (XMP_NS_PDFA_FIELD, "pdfaField"),
    (XMP_NS_PDFA_ID, "pdfaid"),
    (XMP_NS_PDFA_EXTENSION, "pdfaExtension"),
    (XMP_NS_PHOTOSHOP, "photoshop"),
    (XMP_NS_PS_ALBUM, "album"),
    (XMP_NS_EXIF, "exif"),
    (XMP_NS_EXIF_AUX, "aux"),
    (XMP_NS_TIFF, "tiff"),
    (XMP_NS_PNG, "png"),
    (XMP_NS_JPEG, "jpeg"),
    (XMP_NS_JP2K, "jp2k"),
    (XMP_NS_CAMERA_RAW, "crs"),
    (XMP_NS_CAMERA_RAW_SAVED_SETTINGS, "crss"),
    (XMP_NS_ADOBE_STOCK_PHOTO, "bmsp"),
    (XMP_NS_CREATOR_ATOM, "creatorAtom"),
    (XMP_NS_ASF, "asf"),
    (XMP_NS_WAV, "wav"),
    (XMP_NS_DM, "xmpDM"),
    (XMP_NS_XMP_TEXT, "xmpT"),
    (XMP_NS_XMP_PAGED_FILE, "xmpTPg"),
    (XMP_NS_XMP_GRAPHICS, "xmpG"),
    (XMP_NS_XMP_IMAGE, "xmpGImg"),
    (XMP_NS_XMP_FONT, "stFnt"),
    (XMP_NS_XMP_DIMENSIONS, "stDim"),
    (XMP_NS_XMP_RESOURCE_EVENT, "stEvt"),
    (XMP_NS_XMP_RESOURCE_REF, "stRef"),
    (XMP_NS_XMP_ST_VERSION, "stVer"),
    (XMP_NS_XMP_ST_JOB, "stJob"),
    (XMP_NS_XMP_MANIFEST_ITEM, "stMfs"),
    (XMP_NS_XMP_IDENTIFIER_QUAL, "xmpidq"),
    (XMP_NS_IPTC_CORE, "Iptc4xmpCore"),
    (XMP_NS_DICOM, "DICOM"),
    (XMP_NS_XMP_META, "x"),
    (XMP_NS_LIGHTROOM, "lr"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_prefixes_are_unique() {
        let uris: HashSet<_> = STANDARD_PREFIXES.iter().map(|(uri, _)| *uri).collect();
        let prefixes: HashSet<_> = STANDARD_PREFIXES.iter().map(|(_, p)| *p).collect();
        assert_eq!(uris.len(), STANDARD_PREFIXES.len());
        assert_eq!(prefixes.len(), STANDARD_PREFIXES.len());
    }

    #[test]
    fn test_aliases_share_uris() {
        assert_eq!(XMP_NS_XMP_T, "http://ns.adobe.com/xap/1.0/t/");
        assert_eq!(XMP_NS_XMP_G_IMG, XMP_NS_XMP_IMAGE);
    }
}
