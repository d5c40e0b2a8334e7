use libipld_cbor::DagCborCodec;
use libipld_core::codec::Codec;
use libipld_core::ipld::Ipld;

#[test]
fn round_trips_nested_empty_and_mixed_lists() {
    // [[], [null, 42, true]]
    let codec = DagCborCodec::default();
    let ipld = Ipld::list(vec![
        Ipld::list(vec![]),
        Ipld::list(vec![Ipld::Null, Ipld::Integer(42), Ipld::Bool(true)]),
    ]);
    let bytes = codec.encode(&ipld).unwrap();
    assert_eq!(bytes, hex::decode("828083f6182af5").unwrap());
    let decoded: Ipld = codec.decode(&bytes).unwrap();
    assert_eq!(ipld, decoded);
}

#[test]
fn round_trips_i64_boundary_values() {
    let codec = DagCborCodec::default();
    for value in [i64::MIN, i64::MAX, 0, -1, 1] {
        let ipld = Ipld::Integer(value);
        let bytes = codec.encode(&ipld).unwrap();
        let decoded: Ipld = codec.decode(&bytes).unwrap();
        assert_eq!(ipld, decoded);
    }
}

#[test]
fn round_trips_a_link_generated_by_go_ipfs() {
    // $ echo foobar > file1
    // $ ipfs add foobar -> QmRgutAxd8t7oGkSm4wmeuByG6M51wcTso6cubDdQtuEfL
    // $ echo -n '{ "foo": { "/": "QmRgutAxd8t7oGkSm4wmeuByG6M51wcTso6cubDdQtuEfL" } }' | ipfs dag put
    let input = "a163666f6fd82a582300122031c3d57080d8463a3c63b2923df5a1d40ad7a73eae5a14af584213e5f504ac33";
    let input = hex::decode(input).unwrap();
    let codec = DagCborCodec::default();
    let ipld: Ipld = codec.decode(&input).unwrap();
    let bytes = codec.encode(&ipld).unwrap();
    assert_eq!(input, bytes);
}

#[test]
fn rejects_a_link_with_a_non_identity_multibase_prefix() {
    let input = "a163666f6fd82a582301122031c3d57080d8463a3c63b2923df5a1d40ad7a73eae5a14af584213e5f504ac33";
    let input = hex::decode(input).unwrap();
    assert!(DagCborCodec::default().decode::<Ipld>(&input).is_err());
}

#[test]
fn rejects_a_zero_length_cid_byte_string() {
    let input = hex::decode("a163666f6fd82a5800").unwrap();
    assert!(DagCborCodec::default().decode::<Ipld>(&input).is_err());
}

#[test]
fn round_trips_byte_strings() {
    let codec = DagCborCodec::default();
    for value in [vec![], vec![0u8, 1, 2, 3], vec![0xffu8; 256]] {
        let ipld = Ipld::bytes(value);
        let bytes = codec.encode(&ipld).unwrap();
        let decoded: Ipld = codec.decode(&bytes).unwrap();
        assert_eq!(ipld, decoded);
    }
}

#[test]
fn rejects_an_integer_that_overflows_i64() {
    // major type 0 (unsigned), 8-byte argument u64::MAX -- not representable as i64.
    let bytes = [0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert!(DagCborCodec::default().decode::<Ipld>(&bytes).is_err());
}
