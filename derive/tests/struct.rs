use cid::multihash::Multihash;
use cid::Cid;
use libipld_cbor::DagCborCodec;
use libipld_core::codec::Codec;
use libipld_core::error::Error;
use libipld_core::schema::ToIpld;
use libipld_derive::{FromIpld, ToIpld};
use libipld_json::DagJsonCodec;

#[derive(ToIpld, FromIpld, Debug, PartialEq)]
struct Record {
    boolean: bool,
    integer: u32,
    float: f64,
    string: String,
    bytes: Vec<u8>,
    link: Cid,
}

fn sample_cid() -> Cid {
    Cid::new_v1(0x55, Multihash::wrap(0x12, &[0u8; 32]).unwrap())
}

#[test]
fn round_trips_a_named_struct_through_dag_cbor() {
    let value = Record {
        boolean: true,
        integer: 7,
        float: 1.5,
        string: "hi".into(),
        bytes: vec![1, 2, 3],
        link: sample_cid(),
    };
    let bytes = DagCborCodec::default().encode(&value).unwrap();
    let decoded: Record = DagCborCodec::default().decode(&bytes).unwrap();
    assert_eq!(value, decoded);
}

#[test]
fn round_trips_a_named_struct_through_dag_json() {
    let value = Record {
        boolean: false,
        integer: 0,
        float: -2.25,
        string: "".into(),
        bytes: vec![],
        link: sample_cid(),
    };
    let bytes = DagJsonCodec::default().encode(&value).unwrap();
    let decoded: Record = DagJsonCodec::default().decode(&bytes).unwrap();
    assert_eq!(value, decoded);
}

#[test]
fn struct_fields_become_a_map_keyed_by_field_name() {
    let value = Record {
        boolean: true,
        integer: 1,
        float: 0.0,
        string: "s".into(),
        bytes: vec![9],
        link: sample_cid(),
    };
    let ipld = value.to_ipld().unwrap();
    assert!(ipld.get_key("boolean").is_some());
    assert!(ipld.get_key("integer").is_some());
    assert!(ipld.get_key("link").is_some());
}

#[derive(ToIpld, FromIpld, Debug, PartialEq)]
struct Point(i64, i64);

#[test]
fn tuple_struct_becomes_a_list() {
    let value = Point(3, -4);
    let ipld = value.to_ipld().unwrap();
    assert_eq!(ipld.len(), 2);
    let bytes = DagCborCodec::default().encode(&value).unwrap();
    let decoded: Point = DagCborCodec::default().decode(&bytes).unwrap();
    assert_eq!(value, decoded);
}

#[derive(ToIpld, FromIpld, Debug, PartialEq)]
struct Unit;

#[test]
fn unit_struct_becomes_null() {
    let bytes = DagCborCodec::default().encode(&Unit).unwrap();
    let decoded: Unit = DagCborCodec::default().decode(&bytes).unwrap();
    assert_eq!(Unit, decoded);
}

#[derive(ToIpld, FromIpld, Debug, PartialEq)]
struct Renamed {
    #[ipld(rename = "type")]
    kind: String,
}

#[test]
fn rename_overrides_the_wire_key() {
    let value = Renamed { kind: "a".into() };
    let ipld = value.to_ipld().unwrap();
    assert!(ipld.get_key("type").is_some());
    assert!(ipld.get_key("kind").is_none());
}

#[derive(ToIpld, FromIpld, Debug, PartialEq)]
struct Pair {
    b: i64,
    a: i64,
}

#[test]
fn strict_mode_rejects_struct_fields_out_of_canonical_order_dag_json() {
    // dag-json's canonical order is plain lex: "a" before "b".
    let canonical = br#"{"a":1,"b":2}"#;
    let decoded: Pair = DagJsonCodec::default().decode(canonical).unwrap();
    assert_eq!(decoded, Pair { b: 2, a: 1 });

    let misordered = br#"{"b":2,"a":1}"#;
    let err = DagJsonCodec::default()
        .decode::<Pair>(misordered)
        .unwrap_err();
    assert!(matches!(err, Error::Strict(_)));
}

#[test]
fn lenient_mode_accepts_struct_fields_in_any_order_dag_json() {
    let misordered = br#"{"b":2,"a":1}"#;
    let lenient = DagJsonCodec {
        strict: false,
        ..DagJsonCodec::default()
    };
    let decoded: Pair = lenient.decode(misordered).unwrap();
    assert_eq!(decoded, Pair { b: 2, a: 1 });
}

#[test]
fn strict_mode_rejects_struct_fields_out_of_canonical_order_dag_cbor() {
    // dag-cbor's canonical order is length-then-lex; "a" and "b" are both
    // length 1, so this reduces to plain lex here too: "a" before "b".
    let canonical = vec![0xa2, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02];
    let decoded: Pair = DagCborCodec::default().decode(&canonical).unwrap();
    assert_eq!(decoded, Pair { b: 2, a: 1 });

    let misordered = vec![0xa2, 0x61, 0x62, 0x02, 0x61, 0x61, 0x01];
    let err = DagCborCodec::default()
        .decode::<Pair>(&misordered)
        .unwrap_err();
    assert!(matches!(err, Error::Strict(_)));
}

#[test]
fn extra_struct_fields_are_rejected_regardless_of_strict_mode() {
    let extra = br#"{"a":1,"b":2,"c":3}"#;
    let err = DagJsonCodec::default().decode::<Pair>(extra).unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)));

    let lenient = DagJsonCodec {
        strict: false,
        ..DagJsonCodec::default()
    };
    let err = lenient.decode::<Pair>(extra).unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)));
}
