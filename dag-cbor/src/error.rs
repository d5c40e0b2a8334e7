//! dag-cbor-specific leaf error types, converted into [`libipld_core::error::Error`]
//! at the point they're raised.
use libipld_core::error::Error;
use thiserror::Error;

/// The CBOR major type read at the current position did not match what the
/// caller expected, or carried an additional-info value this profile
/// forbids (28..=31, or a simple value other than false/true/null/floats).
#[derive(Debug, Error)]
#[error("unexpected cbor major type/additional-info byte 0x{0:02x}")]
pub struct UnexpectedCode(pub u8);

/// A CBOR tag other than 42 was encountered where a link was expected.
#[derive(Debug, Error)]
#[error("unknown or unsupported cbor tag {0}")]
pub struct UnknownTag(pub u64);

/// The byte string tagged 42 did not begin with the identity multibase
/// prefix (`0x00`) that dag-cbor links require.
#[derive(Debug, Error)]
#[error("invalid cid multibase prefix: {0:#x}, expected 0x00")]
pub struct InvalidCidPrefix(pub u8);

/// An integer argument was encoded using a wider byte class than its value
/// requires (e.g. `0x18 0x05` for `5`, which fits in the header nibble).
#[derive(Debug, Error)]
#[error("non-minimal integer argument encoding")]
pub struct NumberNotMinimal;

impl From<UnexpectedCode> for Error {
    fn from(e: UnexpectedCode) -> Self {
        Error::invalid_type("a different cbor major type", format!("{e}"))
    }
}

impl From<UnknownTag> for Error {
    fn from(e: UnknownTag) -> Self {
        Error::invalid_type("cbor tag 42 (link)", format!("{e}"))
    }
}

impl From<InvalidCidPrefix> for Error {
    fn from(e: InvalidCidPrefix) -> Self {
        Error::invalid_type("0x00 multibase prefix", format!("{e}"))
    }
}

impl From<NumberNotMinimal> for Error {
    fn from(_: NumberNotMinimal) -> Self {
        Error::Strict("integer argument is not in minimal form".into())
    }
}
