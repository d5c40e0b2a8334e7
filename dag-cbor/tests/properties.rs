//! Property-based round-trip tests over randomly generated `Ipld` trees,
//! grounded on the `quickcheck`-driven `edid_*` (encode-decode-identity)
//! tests of the wider IPLD corpus (`sp-ipld`'s `dag_cbor.rs` test module) and
//! expressed with the plain `quickcheck::quickcheck!` macro, matching the
//! teacher workspace's own `quickcheck = "1"` dependency with no extra
//! attribute-macro crate added.
use cid::multihash::Multihash;
use cid::Cid;
use libipld_cbor::DagCborCodec;
use libipld_core::codec::Codec;
use libipld_core::ipld::{Ipld, OrderedMap};
use quickcheck::{Arbitrary, Gen};

const MAX_DEPTH: usize = 3;

#[derive(Clone, Debug)]
struct ArbitraryIpld(Ipld);

impl Arbitrary for ArbitraryIpld {
    fn arbitrary(g: &mut Gen) -> Self {
        ArbitraryIpld(arbitrary_ipld(g, 0))
    }
}

fn arbitrary_cid(g: &mut Gen) -> Cid {
    let mut digest = [0u8; 32];
    for b in digest.iter_mut() {
        *b = u8::arbitrary(g);
    }
    let mh = Multihash::wrap(0x12, &digest).expect("32-byte digest fits a sha2-256 multihash");
    Cid::new_v1(0x55, mh)
}

fn arbitrary_finite_f64(g: &mut Gen) -> f64 {
    let v = f64::arbitrary(g);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn arbitrary_ipld(g: &mut Gen, depth: usize) -> Ipld {
    let choices: u8 = if depth >= MAX_DEPTH { 6 } else { 9 };
    match u8::arbitrary(g) % choices {
        0 => Ipld::Null,
        1 => Ipld::Bool(bool::arbitrary(g)),
        2 => Ipld::Integer(i64::arbitrary(g)),
        3 => Ipld::Float(arbitrary_finite_f64(g)),
        4 => Ipld::string(String::arbitrary(g)),
        5 => Ipld::bytes(Vec::<u8>::arbitrary(g)),
        6 => {
            let len = usize::arbitrary(g) % 4;
            let elements: Vec<Ipld> = (0..len).map(|_| arbitrary_ipld(g, depth + 1)).collect();
            Ipld::list(elements)
        }
        7 => {
            let len = usize::arbitrary(g) % 4;
            let mut map = OrderedMap::new();
            for i in 0..len {
                map.set(format!("k{i}"), arbitrary_ipld(g, depth + 1));
            }
            Ipld::map_from(map)
        }
        _ => Ipld::Link(arbitrary_cid(g)),
    }
}

quickcheck::quickcheck! {
    /// Invariant 1 (spec §8): `decode(encode(v)) == v` whenever encoding an
    /// arbitrary (NaN/∞-free, i64-range) value succeeds.
    fn round_trips_an_arbitrary_value(value: ArbitraryIpld) -> bool {
        let codec = DagCborCodec::default();
        let ArbitraryIpld(value) = value;
        let Ok(bytes) = codec.encode(&value) else {
            return true;
        };
        let decoded: Ipld = codec.decode(&bytes).expect("encoder output must decode");
        value == decoded
    }

    /// Invariant 6 (spec §8): re-encoding a value this encoder already
    /// produced yields byte-identical output (the encoder's canonical form
    /// is a fixed point).
    fn re_encoding_is_idempotent(value: ArbitraryIpld) -> bool {
        let codec = DagCborCodec::default();
        let ArbitraryIpld(value) = value;
        let Ok(bytes) = codec.encode(&value) else {
            return true;
        };
        let decoded: Ipld = codec.decode(&bytes).expect("encoder output must decode");
        let bytes_again = codec.encode(&decoded).expect("re-encoding a valid value must succeed");
        bytes == bytes_again
    }

    /// Invariant 5 (spec §8): strict decode never rejects this encoder's own
    /// output -- every integer argument it emits is already minimal and every
    /// map is already in canonical order.
    fn encoder_output_always_passes_strict_decode(value: ArbitraryIpld) -> bool {
        let codec = DagCborCodec::default();
        let ArbitraryIpld(value) = value;
        let Ok(bytes) = codec.encode(&value) else {
            return true;
        };
        DagCborCodec { strict: true }.decode::<Ipld>(&bytes).is_ok()
    }
}
