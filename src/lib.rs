//! # FastCharset - Charset Detection and Transcoding
//!
//! Determines the character encoding of byte buffers of unknown origin and
//! converts text between encodings, for editors that have to open and save
//! files faithfully.
//!
//! ## Features
//!
//! - **Byte order mark sniffing** for UTF-8, UTF-16, UTF-32, GB18030 and UTF-7
//! - **Strict UTF-8 validation** with a table-driven automaton
//! - **Statistical fallback** for legacy and regional encodings
//! - **Streaming conversion** with strict or lenient handling of illegal input
//!
//! ## Quick Start
//!
//! ```rust
//! use fast_charset::{ConversionOptions, bom, convert, detect};
//!
//! let file = b"\xFF\xFEH\x00i\x00";
//! let detection = detect(file).unwrap();
//! assert_eq!(detection.charset, "UTF-16LE");
//! assert!(detection.had_bom);
//!
//! // Open: normalize to UTF-8 without the byte order mark
//! let body = &file[bom(&detection.charset).len()..];
//! let text = convert("UTF-8", &detection.charset, body, ConversionOptions::new()).unwrap();
//! assert_eq!(text, b"Hi");
//!
//! // Save: back to the original charset, BOM first
//! let options = ConversionOptions::new().strict(true).handle_to_bom(true);
//! let saved = convert(&detection.charset, "UTF-8", &text, options).unwrap();
//! assert_eq!(saved, file);
//! ```

#![deny(missing_docs)]

use std::fmt;

mod backend;
pub mod bom;
pub mod detection;
mod multibyte;
mod session;
pub mod transcoder;
pub mod utf8;

pub use detection::{ChardetClassifier, Classifier, Detection, DetectionMethod, EncodingDetector};
pub use transcoder::{ConversionOptions, Transcoder};
pub use utf8::{Utf8Validator, ValidatorState, is_valid_utf8};

/// Result type for detection and conversion
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during detection or conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No byte order mark, not valid UTF-8, and no statistical guess
    DetectionFailed,
    /// The backend does not know one of the charsets
    UnsupportedConversion {
        /// Source charset name
        from: String,
        /// Target charset name
        to: String,
        /// Backend description of the failure
        reason: String,
    },
    /// Illegal input met in strict mode
    IllegalSequence {
        /// Input offset of the malformed sequence, when the input itself is
        /// malformed; `None` when a character cannot be represented in the
        /// target charset
        offset: Option<usize>,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DetectionFailed => write!(f, "could not detect the file encoding"),
            Error::UnsupportedConversion { from, to, reason } => {
                write!(
                    f,
                    "conversion from {} to {} is not supported: {}",
                    from, to, reason
                )
            }
            Error::IllegalSequence { .. } => write!(f, "illegal multibyte sequence"),
        }
    }
}

impl std::error::Error for Error {}

/// Detect the charset of `bytes`
///
/// Checks, in order: empty input (UTF-8), a byte order mark, strict UTF-8
/// validity, and finally the `chardetng` statistical classifier.
pub fn detect(bytes: &[u8]) -> Result<Detection> {
    EncodingDetector::new().detect(bytes)
}

/// Convert `bytes` from charset `from` to charset `to`
///
/// Charset names are passed to the backend as given; unknown names fail
/// with [`Error::UnsupportedConversion`].
pub fn convert(to: &str, from: &str, bytes: &[u8], options: ConversionOptions) -> Result<Vec<u8>> {
    Transcoder::new(from, to, options)?.convert(bytes)
}

/// Byte order mark of `charset`, empty if it has none
pub fn bom(charset: &str) -> &'static [u8] {
    bom::bom_for(charset)
}
