//! The dag-cbor codec: a restricted, canonical profile of CBOR (RFC 8949)
//! for the IPLD data model.
#![deny(missing_docs)]

use libipld_core::codec::Codec;
use std::cmp::Ordering;

pub mod decode;
pub mod encode;
pub mod error;
pub mod validate;

/// The dag-cbor codec.
///
/// `strict` gates the checks the data model marks "SHOULD reject": non-minimal
/// integer arguments, narrower-than-8-byte floats, and non-canonical map key
/// order. It defaults to `true` — a decoder that accepts non-canonical input
/// is opted into explicitly with `DagCborCodec { strict: false }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DagCborCodec {
    /// Reject non-canonical input instead of accepting it permissively.
    pub strict: bool,
}

impl Default for DagCborCodec {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl Codec for DagCborCodec {
    const CODE: u64 = 0x71;

    fn key_order(a: &str, b: &str) -> Ordering {
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }

    fn is_strict(self) -> bool {
        self.strict
    }
}

impl DagCborCodec {
    /// Confirms `bytes` holds exactly one well-formed dag-cbor value under
    /// this codec's strictness settings, without materializing an `Ipld`
    /// tree. Cheaper than `decode::<Ipld>` when the caller only needs a
    /// yes/no answer ahead of time, e.g. before admitting a block into a
    /// store.
    pub fn validate(&self, bytes: &[u8]) -> libipld_core::error::Result<()> {
        let mut cursor = std::io::Cursor::new(bytes);
        validate::validate(*self, &mut cursor)?;
        if (cursor.position() as usize) != bytes.len() {
            return Err(libipld_core::error::Error::ExtraneousData);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cid::Cid;
    use libipld_core::ipld::{Ipld, OrderedMap};
    use libipld_core::multihash::Multihash;

    fn test_cid() -> Cid {
        let digest = Multihash::wrap(0x12, &[0u8; 32]).unwrap();
        Cid::new_v1(0x55, digest)
    }

    #[test]
    fn round_trips_a_mixed_value_tree() {
        let mut map = OrderedMap::new();
        map.set("float", Ipld::Float(0.0));
        map.set("string", Ipld::string("hello"));
        let ipld = Ipld::list(vec![
            Ipld::Integer(1),
            Ipld::Null,
            Ipld::Bool(true),
            Ipld::bytes(vec![0u8, 1, 2, 3]),
            Ipld::map_from(map),
            Ipld::Link(test_cid()),
        ]);
        let codec = DagCborCodec::default();
        let bytes = codec.encode(&ipld).unwrap();
        let decoded: Ipld = codec.decode(&bytes).unwrap();
        assert_eq!(ipld, decoded);
    }

    #[test]
    fn encoder_output_is_itself_canonical_under_strict_decode() {
        let ipld = Ipld::Integer(42);
        let codec = DagCborCodec::default();
        let bytes = codec.encode(&ipld).unwrap();
        assert!(DagCborCodec { strict: true }.decode::<Ipld>(&bytes).is_ok());
    }
}
