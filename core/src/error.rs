//! Error types shared by every codec built on top of `libipld-core`.
use std::fmt;
use thiserror::Error;

/// Result type used throughout the codec stack.
pub type Result<T> = std::result::Result<T, Error>;

/// The eight error kinds a dag-cbor/dag-json codec (dynamic or schema-driven) can raise.
#[derive(Debug, Error)]
pub enum Error {
    /// A CBOR major type or JSON token did not match the shape expected at the
    /// current position (wrong kind, bad link tag, bad multibase prefix,
    /// missing/misordered/duplicate struct field).
    #[error("invalid type: expected {expected}, found {found}")]
    InvalidType {
        /// What the decoder was looking for.
        expected: String,
        /// What it found instead.
        found: String,
    },
    /// A value was well-typed but semantically invalid (unrecognized enum
    /// variant, reserved `"/"` key in a plain map, malformed link/bytes object).
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// An integer exceeded the representable range ([-2^63, 2^63-1] for the
    /// dynamic value model, or a narrower static integer type).
    #[error("integer overflow")]
    Overflow,
    /// The decoder is in strict mode and observed a non-canonical but
    /// otherwise well-formed encoding (short form, wide float, unsorted map).
    #[error("non-canonical encoding: {0}")]
    Strict(String),
    /// Trailing bytes remained after a complete top-level CBOR value.
    #[error("extraneous data after the decoded value")]
    ExtraneousData,
    /// The JSON decoder did not reach end-of-document after the value.
    #[error("expected end of document")]
    ExpectedEod,
    /// The encoder was asked to emit a NaN or infinite float.
    #[error("unsupported value: {0}")]
    UnsupportedValue(String),
    /// Underlying I/O failure (includes allocation-adjacent failures surfaced
    /// through `std::io::Error`, and unexpected end of input).
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A text string field was not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
    /// Same as `Utf8` but for owned `String::from_utf8`.
    #[error(transparent)]
    FromUtf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Shorthand for the common "wrong `Kind`" case.
    pub fn invalid_type(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::InvalidType {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Indicates a mismatch between two [`crate::ipld::Ipld`] trees, as produced by
/// `Ipld::expect_eq`. Kept distinct from [`Error`] since it is a test helper, not
/// a codec failure.
#[derive(Debug)]
pub struct MismatchError(pub(crate) String);

impl fmt::Display for MismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MismatchError {}
