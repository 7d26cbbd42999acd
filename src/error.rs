use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors produced by the VLF chart codec.
///
/// The list of variants may grow to incorporate errors for future features. Matching against
/// this exhaustively is not covered by interface stability guarantees.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An input file named on the command line does not exist or could not be opened.
    MissingInput(PathBuf),

    /// No template with the given name was found in any resolved template directory.
    MissingTemplate(String),

    /// A template's YAML descriptor or raster exists but could not be parsed.
    InvalidTemplate { name: String, reason: String },

    /// The scale extractor could not find a usable run of colour inside the legend rectangle.
    LegendExtraction(String),

    /// The source image could not be decoded by the underlying image codec.
    ImageDecode(image::ImageError),

    /// The wire message is malformed (missing sentinel, truncated header, ...).
    MalformedMessage(String),

    /// An I/O error occurred while reading or writing a file.
    Io(io::Error),

    /// The CLI was invoked with an invalid combination of arguments.
    BadUsage(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingInput(path) => write!(f, "input file not found: {}", path.display()),
            Error::MissingTemplate(name) => write!(f, "template not found: {name}"),
            Error::InvalidTemplate { name, reason } => {
                write!(f, "invalid template `{name}`: {reason}")
            }
            Error::LegendExtraction(reason) => write!(f, "could not extract colour scale: {reason}"),
            Error::ImageDecode(e) => write!(f, "could not decode image: {e}"),
            Error::MalformedMessage(reason) => write!(f, "malformed message: {reason}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::BadUsage(reason) => write!(f, "usage error: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ImageDecode(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageDecode(err)
    }
}

/// Result of a codec, template, or CLI operation.
pub type Result<T> = std::result::Result<T, Error>;
