//! dag-json-specific leaf error types, converted into [`libipld_core::error::Error`]
//! at the point they're raised.
use libipld_core::error::Error;
use thiserror::Error;

/// The string under the reserved `"/"` key was not a parseable CID.
#[derive(Debug, Error)]
#[error("invalid cid string: {0}")]
pub struct MalformedCid(pub String);

/// The object nested under `{"/": ...}` was not the single-member
/// `{"bytes": "<base64url-nopad>"}` shape the byte-string convention requires.
#[derive(Debug, Error)]
#[error("malformed bytes object under reserved key \"/\": {0}")]
pub struct MalformedBytesPayload(pub String);

impl From<MalformedCid> for Error {
    fn from(e: MalformedCid) -> Self {
        Error::InvalidValue(e.to_string())
    }
}

impl From<MalformedBytesPayload> for Error {
    fn from(e: MalformedBytesPayload) -> Self {
        Error::InvalidValue(e.to_string())
    }
}
