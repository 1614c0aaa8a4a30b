//! Container format tags and handler capabilities
//!
//! Format tags are the big-endian ASCII four-character codes the engine
//! reports from format detection, padded with spaces.

use bitflags::bitflags;
use std::fmt;

macro_rules! file_types {
    ($($(#[$meta:meta])* $variant:ident = $code:literal,)+) => {
        /// A container file format as identified by the engine
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FileType {
            $($(#[$meta])* $variant,)+
            /// A tag this crate has no name for
            Other(u32),
        }

        impl FileType {
            const KNOWN: &'static [FileType] = &[$(FileType::$variant,)+];

            /// Map a raw tag to a format
            pub fn from_raw(raw: u32) -> Self {
                match &raw.to_be_bytes() {
                    $($code => FileType::$variant,)+
                    _ => FileType::Other(raw),
                }
            }

            /// The raw tag value
            pub fn raw(self) -> u32 {
                match self {
                    $(FileType::$variant => u32::from_be_bytes(*$code),)+
                    FileType::Other(raw) => raw,
                }
            }
        }
    };
}

file_types! {
    Pdf = b"PDF ",
    /// General PostScript following DSC conventions
    Ps = b"PS  ",
    /// Encapsulated PostScript
    Eps = b"EPS ",
    Jpeg = b"JPEG",
    /// ISO 15444-1
    Jpeg2k = b"JPX ",
    Tiff = b"TIFF",
    Gif = b"GIF ",
    Png = b"PNG ",
    Swf = b"SWF ",
    Fla = b"FLA ",
    Flv = b"FLV ",
    /// QuickTime
    Mov = b"MOV ",
    Avi = b"AVI ",
    /// Cineon
    Cin = b"CIN ",
    Wav = b"WAV ",
    Mp3 = b"MP3 ",
    /// Audition session
    Ses = b"SES ",
    /// Audition loop
    Cel = b"CEL ",
    Mpeg = b"MPEG",
    Mpeg2 = b"MP2 ",
    /// ISO 14496-12 and -14
    Mpeg4 = b"MP4 ",
    /// Windows Media audio and video
    Wmav = b"WMAV",
    Aiff = b"AIFF",
    Html = b"HTML",
    Xml = b"XML ",
    Text = b"text",
    Photoshop = b"PSD ",
    Illustrator = b"AI  ",
    Indesign = b"INDD",
    AeProject = b"AEP ",
    /// After Effects project template
    AeProjTemplate = b"AET ",
    AeFilterPreset = b"FFX ",
    EncoreProject = b"NCOR",
    PremiereProject = b"PRPJ",
    PremiereTitle = b"PRTL",
    /// Catch-all reported when detection fails
    Unknown = b"    ",
}

impl FileType {
    /// All named formats
    pub fn known() -> &'static [FileType] {
        Self::KNOWN
    }

    /// Guess a format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "ps" => FileType::Ps,
            "eps" => FileType::Eps,
            "jpg" | "jpeg" | "jpe" => FileType::Jpeg,
            "jp2" | "jpx" => FileType::Jpeg2k,
            "tif" | "tiff" => FileType::Tiff,
            "gif" => FileType::Gif,
            "png" => FileType::Png,
            "swf" => FileType::Swf,
            "fla" => FileType::Fla,
            "flv" => FileType::Flv,
            "mov" => FileType::Mov,
            "avi" => FileType::Avi,
            "cin" => FileType::Cin,
            "wav" => FileType::Wav,
            "mp3" => FileType::Mp3,
            "ses" => FileType::Ses,
            "cel" => FileType::Cel,
            "mpg" | "mpeg" => FileType::Mpeg,
            "mp2" => FileType::Mpeg2,
            "mp4" | "m4v" | "m4a" => FileType::Mpeg4,
            "wma" | "wmv" => FileType::Wmav,
            "aif" | "aiff" => FileType::Aiff,
            "htm" | "html" => FileType::Html,
            "xml" | "xmp" => FileType::Xml,
            "txt" => FileType::Text,
            "psd" => FileType::Photoshop,
            "ai" => FileType::Illustrator,
            "indd" => FileType::Indesign,
            "aep" => FileType::AeProject,
            "aet" => FileType::AeProjTemplate,
            "ffx" => FileType::AeFilterPreset,
            "ncor" => FileType::EncoreProject,
            "prproj" => FileType::PremiereProject,
            "prtl" => FileType::PremiereTitle,
            _ => FileType::Unknown,
        }
    }

    /// The four-character code, with its padding
    pub fn four_cc(self) -> String {
        String::from_utf8_lossy(&self.raw().to_be_bytes()).into_owned()
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.four_cc().trim_end())
    }
}

bitflags! {
    /// Capabilities of the engine's handler for a format
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FormatFlags: u32 {
        /// Can inject first-time XMP into an existing file
        const CAN_INJECT_XMP = 0x0000_0001;
        /// Can expand the XMP or other metadata in an existing file
        const CAN_EXPAND = 0x0000_0002;
        /// Can copy one file to another, writing new metadata
        const CAN_REWRITE = 0x0000_0004;
        /// Can expand, but prefers in-place update
        const PREFERS_IN_PLACE = 0x0000_0008;
        /// Supports reconciliation between XMP and other forms
        const CAN_RECONCILE = 0x0000_0010;
        /// Allows access to just the XMP, ignoring other forms
        const ALLOWS_ONLY_XMP = 0x0000_0020;
        /// Returns the raw packet when getting XMP
        const RETURNS_RAW_PACKET = 0x0000_0040;
        /// The handler does its own file I/O
        const HANDLER_OWNS_FILE = 0x0000_0100;
        /// Supports safe update on close
        const ALLOW_SAFE_UPDATE = 0x0000_0200;
        /// The format needs a read-only packet
        const NEEDS_READ_ONLY_PACKET = 0x0000_0400;
        /// The handler uses a sidecar file for the XMP
        const USE_SIDECAR_XMP = 0x0000_0800;
        /// The format is folder oriented
        const FOLDER_BASED_FORMAT = 0x0000_1000;
    }
}
