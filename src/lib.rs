//! Bit-exact, round-tripping codecs for the IPLD data model.
//!
//! Re-exports `libipld-core` unconditionally, and the dag-cbor/dag-json
//! codecs plus the schema-driven derive macros behind their matching Cargo
//! features (`dag-cbor`, `dag-json`, `derive`; all on by default).
#![deny(missing_docs)]

pub use libipld_core::cid;
pub use libipld_core::codec;
pub use libipld_core::error;
pub use libipld_core::ipld;
pub use libipld_core::link;
pub use libipld_core::multibase;
pub use libipld_core::multihash;
pub use libipld_core::schema;

pub use ipld::Ipld;

#[cfg(feature = "dag-cbor")]
pub use libipld_cbor as cbor;
#[cfg(feature = "dag-cbor")]
pub use libipld_cbor::DagCborCodec;

#[cfg(feature = "dag-json")]
pub use libipld_json as json;
#[cfg(feature = "dag-json")]
pub use libipld_json::DagJsonCodec;

#[cfg(feature = "derive")]
pub use libipld_derive::{FromIpld, ToIpld};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;

    #[test]
    fn dag_cbor_and_dag_json_round_trip_the_same_value() {
        let value = Ipld::list(vec![Ipld::Integer(1), Ipld::Bool(true), Ipld::Null]);

        let cbor_bytes = DagCborCodec::default().encode(&value).unwrap();
        let decoded: Ipld = DagCborCodec::default().decode(&cbor_bytes).unwrap();
        assert_eq!(value, decoded);

        let json_bytes = DagJsonCodec::default().encode(&value).unwrap();
        let decoded: Ipld = DagJsonCodec::default().decode(&json_bytes).unwrap();
        assert_eq!(value, decoded);
    }
}
