//! The dag-json codec: a restricted JSON profile (RFC 8259) for the IPLD
//! data model, with reserved-`"/"` conventions for links and byte strings.
#![deny(missing_docs)]

use libipld_core::codec::Codec;

pub mod decode;
pub mod encode;
pub mod error;
pub mod float;

pub use float::FloatFormat;

/// The dag-json codec.
///
/// `strict` gates canonical-field-order enforcement in the schema-driven
/// static decoder (§4.4); the dynamic path accepts any key order regardless,
/// since an `Ipld::Map` has no "declared field order" to violate.
/// `float_format` selects how the encoder renders non-integral numbers (§4.3).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DagJsonCodec {
    /// Enforce canonical field order when statically decoding a record.
    pub strict: bool,
    /// Float rendering policy used by the encoder.
    pub float_format: FloatFormat,
}

impl Default for DagJsonCodec {
    fn default() -> Self {
        Self {
            strict: true,
            float_format: FloatFormat::default(),
        }
    }
}

impl Codec for DagJsonCodec {
    const CODE: u64 = 0x0129;

    fn key_order(a: &str, b: &str) -> std::cmp::Ordering {
        a.cmp(b)
    }

    fn is_strict(self) -> bool {
        self.strict
    }
}
