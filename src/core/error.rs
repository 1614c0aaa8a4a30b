//! Error types for XMP operations
//!
//! Every engine call that can fail funnels through [`check_result`] or
//! [`check_last_error`], which translate the engine's last-error code into
//! an [`XmpError::Engine`] carrying an [`ErrorCode`].

use crate::engine::Engine;
use std::fmt;
use thiserror::Error;

/// Error codes reported by the metadata engine through its last-error channel
///
/// The numeric values are the engine's own and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    // Generic failures
    Unknown = 0,
    Tbd = -1,
    Unavailable = -2,
    BadObject = -3,
    BadParam = -4,
    BadValue = -5,
    AssertFailure = -6,
    EnforceFailure = -7,
    Unimplemented = -8,
    InternalFailure = -9,
    Deprecated = -10,
    ExternalFailure = -11,
    UserAbort = -12,
    StdException = -13,
    UnknownException = -14,
    NoMemory = -15,

    // Parameter-shape failures
    BadSchema = -101,
    BadXPath = -102,
    BadOptions = -103,
    BadIndex = -104,
    BadIterPosition = -105,
    BadParse = -106,
    BadSerialize = -107,
    BadFileFormat = -108,
    NoFileHandler = -109,
    TooLargeForJpeg = -110,

    // Content and structure failures
    BadXml = -201,
    BadRdf = -202,
    BadXmp = -203,
    EmptyIterator = -204,
    BadUnicode = -205,
    BadTiff = -206,
    BadJpeg = -207,
    BadPsd = -208,
    BadPsir = -209,
    BadIptc = -210,
    BadMpeg = -211,
}

/// Coarse grouping of [`ErrorCode`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBand {
    /// Generic failures (`0` to `-15`)
    Generic,
    /// Malformed parameters (`-101` to `-110`)
    Parameter,
    /// Malformed content or structure (`-201` to `-211`)
    Content,
}

impl ErrorCode {
    const ALL: [ErrorCode; 37] = [
        ErrorCode::Unknown,
        ErrorCode::Tbd,
        ErrorCode::Unavailable,
        ErrorCode::BadObject,
        ErrorCode::BadParam,
        ErrorCode::BadValue,
        ErrorCode::AssertFailure,
        ErrorCode::EnforceFailure,
        ErrorCode::Unimplemented,
        ErrorCode::InternalFailure,
        ErrorCode::Deprecated,
        ErrorCode::ExternalFailure,
        ErrorCode::UserAbort,
        ErrorCode::StdException,
        ErrorCode::UnknownException,
        ErrorCode::NoMemory,
        ErrorCode::BadSchema,
        ErrorCode::BadXPath,
        ErrorCode::BadOptions,
        ErrorCode::BadIndex,
        ErrorCode::BadIterPosition,
        ErrorCode::BadParse,
        ErrorCode::BadSerialize,
        ErrorCode::BadFileFormat,
        ErrorCode::NoFileHandler,
        ErrorCode::TooLargeForJpeg,
        ErrorCode::BadXml,
        ErrorCode::BadRdf,
        ErrorCode::BadXmp,
        ErrorCode::EmptyIterator,
        ErrorCode::BadUnicode,
        ErrorCode::BadTiff,
        ErrorCode::BadJpeg,
        ErrorCode::BadPsd,
        ErrorCode::BadPsir,
        ErrorCode::BadIptc,
        ErrorCode::BadMpeg,
    ];

    /// Look up the named code for a raw engine value
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    /// The raw engine value
    pub fn code(self) -> i32 {
        self as i32
    }

    /// The engine's symbolic name for this code
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "XMPErr_Unknown",
            ErrorCode::Tbd => "XMPErr_TBD",
            ErrorCode::Unavailable => "XMPErr_Unavailable",
            ErrorCode::BadObject => "XMPErr_BadObject",
            ErrorCode::BadParam => "XMPErr_BadParam",
            ErrorCode::BadValue => "XMPErr_BadValue",
            ErrorCode::AssertFailure => "XMPErr_AssertFailure",
            ErrorCode::EnforceFailure => "XMPErr_EnforceFailure",
            ErrorCode::Unimplemented => "XMPErr_Unimplemented",
            ErrorCode::InternalFailure => "XMPErr_InternalFailure",
            ErrorCode::Deprecated => "XMPErr_Deprecated",
            ErrorCode::ExternalFailure => "XMPErr_ExternalFailure",
            ErrorCode::UserAbort => "XMPErr_UserAbort",
            ErrorCode::StdException => "XMPErr_StdException",
            ErrorCode::UnknownException => "XMPErr_UnknownException",
            ErrorCode::NoMemory => "XMPErr_NoMemory",
            ErrorCode::BadSchema => "XMPErr_BadSchema",
            ErrorCode::BadXPath => "XMPErr_BadXPath",
            ErrorCode::BadOptions => "XMPErr_BadOptions",
            ErrorCode::BadIndex => "XMPErr_BadIndex",
            ErrorCode::BadIterPosition => "XMPErr_BadIterPosition",
            ErrorCode::BadParse => "XMPErr_BadParse",
            ErrorCode::BadSerialize => "XMPErr_BadSerialize",
            ErrorCode::BadFileFormat => "XMPErr_BadFileFormat",
            ErrorCode::NoFileHandler => "XMPErr_NoFileHandler",
            ErrorCode::TooLargeForJpeg => "XMPErr_TooLargeForJPEG",
            ErrorCode::BadXml => "XMPErr_BadXML",
            ErrorCode::BadRdf => "XMPErr_BadRDF",
            ErrorCode::BadXmp => "XMPErr_BadXMP",
            ErrorCode::EmptyIterator => "XMPErr_EmptyIterator",
            ErrorCode::BadUnicode => "XMPErr_BadUnicode",
            ErrorCode::BadTiff => "XMPErr_BadTIFF",
            ErrorCode::BadJpeg => "XMPErr_BadJPEG",
            ErrorCode::BadPsd => "XMPErr_BadPSD",
            ErrorCode::BadPsir => "XMPErr_BadPSIR",
            ErrorCode::BadIptc => "XMPErr_BadIPTC",
            ErrorCode::BadMpeg => "XMPErr_BadMPEG",
        }
    }

    /// Human-readable description
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Unknown => "unknown error",
            ErrorCode::Tbd => "error not yet classified",
            ErrorCode::Unavailable => "feature unavailable",
            ErrorCode::BadObject => "invalid object",
            ErrorCode::BadParam => "invalid parameter",
            ErrorCode::BadValue => "invalid value",
            ErrorCode::AssertFailure => "internal assertion failed",
            ErrorCode::EnforceFailure => "internal enforcement failed",
            ErrorCode::Unimplemented => "not implemented",
            ErrorCode::InternalFailure => "internal failure",
            ErrorCode::Deprecated => "deprecated operation",
            ErrorCode::ExternalFailure => "external failure",
            ErrorCode::UserAbort => "aborted by user",
            ErrorCode::StdException => "native exception",
            ErrorCode::UnknownException => "unknown native exception",
            ErrorCode::NoMemory => "out of memory",
            ErrorCode::BadSchema => "invalid schema namespace",
            ErrorCode::BadXPath => "invalid property path",
            ErrorCode::BadOptions => "invalid option combination",
            ErrorCode::BadIndex => "invalid array index",
            ErrorCode::BadIterPosition => "invalid iterator position",
            ErrorCode::BadParse => "parse failure",
            ErrorCode::BadSerialize => "serialization failure",
            ErrorCode::BadFileFormat => "invalid file format",
            ErrorCode::NoFileHandler => "no file handler for this format",
            ErrorCode::TooLargeForJpeg => "packet too large for the target format",
            ErrorCode::BadXml => "malformed XML",
            ErrorCode::BadRdf => "malformed RDF",
            ErrorCode::BadXmp => "malformed XMP",
            ErrorCode::EmptyIterator => "empty iterator",
            ErrorCode::BadUnicode => "invalid Unicode",
            ErrorCode::BadTiff => "malformed TIFF",
            ErrorCode::BadJpeg => "malformed JPEG",
            ErrorCode::BadPsd => "malformed PSD",
            ErrorCode::BadPsir => "malformed Photoshop image resource",
            ErrorCode::BadIptc => "malformed IPTC",
            ErrorCode::BadMpeg => "malformed MPEG",
        }
    }

    /// Which band of the taxonomy this code belongs to
    pub fn band(self) -> ErrorBand {
        match self.code() {
            -15..=0 => ErrorBand::Generic,
            -110..=-101 => ErrorBand::Parameter,
            _ => ErrorBand::Content,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.name())
    }
}

/// Describe a raw engine code, including codes outside the known table
pub fn describe_code(code: i32) -> String {
    match ErrorCode::from_code(code) {
        Some(known) => known.to_string(),
        None => format!("unrecognized engine error {}", code),
    }
}

/// Error types for XMP operations
#[derive(Debug, Error)]
pub enum XmpError {
    /// The engine reported a failure
    #[error("{operation}: {}", describe_code(*.code))]
    Engine {
        /// The failing operation, with its arguments
        operation: String,
        /// Raw last-error code reported by the engine
        code: i32,
    },

    /// A typed lookup found no property at the given path
    #[error("Property not found: {schema} {path}")]
    PropertyNotFound { schema: String, path: String },

    /// Bad parameter provided to a function
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// The engine handed back bytes that are not UTF-8
    #[error("Bad Unicode: {0}")]
    BadUnicode(String),

    /// An option name not present in the option table
    #[error("Unknown option '{name}' for {family} options")]
    UnknownOption { family: &'static str, name: String },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A file is already open on this `XmpFiles` instance
    #[error("A file is already open: {0}")]
    FileAlreadyOpen(String),

    /// The operation needs an open file
    #[error("No file is open")]
    FileNotOpen,

    /// The open file cannot accept the packet
    #[error("Cannot put XMP into {0}: not opened for update or format not writable")]
    CannotPutXmp(String),

    /// A native engine context is already live in this process
    #[error("The native engine is already initialized in this process")]
    AlreadyInitialized,
}

impl XmpError {
    /// The engine error code, if this error came from the engine
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            XmpError::Engine { code, .. } => ErrorCode::from_code(*code),
            _ => None,
        }
    }

    /// Whether this error was reported by the engine (the `MetadataError` family)
    pub fn is_engine_error(&self) -> bool {
        matches!(
            self,
            XmpError::Engine { .. } | XmpError::PropertyNotFound { .. }
        )
    }
}

/// Result type alias for XMP operations
pub type XmpResult<T> = Result<T, XmpError>;

/// Check an engine call that reports success as a boolean
///
/// Both channels are consulted: some engine versions only signal failure
/// through the boolean, others only through the last-error code.
pub fn check_result(
    engine: &dyn Engine,
    operation: impl FnOnce() -> String,
    ok: bool,
) -> XmpResult<()> {
    let code = engine.get_error();
    if ok && code == 0 {
        Ok(())
    } else {
        Err(XmpError::Engine {
            operation: operation(),
            code,
        })
    }
}

/// Check an engine call without a boolean result; code zero means success
pub fn check_last_error(engine: &dyn Engine, operation: impl FnOnce() -> String) -> XmpResult<()> {
    match engine.get_error() {
        0 => Ok(()),
        code => Err(XmpError::Engine {
            operation: operation(),
            code,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = XmpError::BadParam("test".to_string());
        assert!(err.to_string().contains("Bad parameter: test"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let xmp_err: XmpError = io_err.into();
        assert!(matches!(xmp_err, XmpError::IoError(_)));
    }

    #[test]
    fn test_code_table_round_trip() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ErrorCode::from_code(-999), None);
    }

    #[test]
    fn test_bands() {
        assert_eq!(ErrorCode::NoMemory.band(), ErrorBand::Generic);
        assert_eq!(ErrorCode::BadOptions.band(), ErrorBand::Parameter);
        assert_eq!(ErrorCode::BadMpeg.band(), ErrorBand::Content);
    }

    #[test]
    fn test_engine_error_display() {
        let err = XmpError::Engine {
            operation: "serialize".to_string(),
            code: ErrorCode::BadOptions.code(),
        };
        assert_eq!(err.code(), Some(ErrorCode::BadOptions));
        assert!(err.is_engine_error());
        let text = err.to_string();
        assert!(text.starts_with("serialize: "));
        assert!(text.contains("XMPErr_BadOptions"));

        let odd = XmpError::Engine {
            operation: "x".to_string(),
            code: -42,
        };
        assert_eq!(odd.code(), None);
        assert!(odd.to_string().contains("unrecognized engine error -42"));
    }
}
