//! A byte-level structural validator that confirms a buffer is canonical
//! dag-cbor without materializing an `Ipld` tree (spec §4.2), grounded on
//! the teacher's `dag-cbor/src/validate.rs` and generalized to also enforce
//! this crate's minimal-argument and map-key-ordering strictness rules,
//! which the teacher's own `validate()` does not check at all (it skips
//! over map keys by seeking past their length rather than reading and
//! comparing them).
use crate::decode::{read_argument, read_bytes, read_float, read_header, read_link, MajorKind};
use crate::error::UnexpectedCode;
use crate::DagCborCodec;
use libipld_core::codec::Codec;
use libipld_core::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

const MAX_DEPTH: usize = 512;

/// Confirms `r` holds exactly one well-formed dag-cbor value honoring `c`'s
/// strictness settings, without allocating an `Ipld` tree for it. Cheaper
/// than a full `decode::<Ipld>` pre-check when the caller only needs a
/// yes/no answer.
pub fn validate<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<()> {
    validate_at(c, r, 0)
}

fn validate_at<R: Read + Seek>(c: DagCborCodec, r: &mut R, depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::InvalidValue("value nesting too deep".into()));
    }
    let (kind, info) = read_header(r)?;
    let strict = c.strict;
    match kind {
        MajorKind::UnsignedInt | MajorKind::NegativeInt => {
            read_argument(r, info, strict)?;
        }
        MajorKind::ByteString | MajorKind::TextString => {
            let len = read_argument(r, info, strict)?;
            r.seek(SeekFrom::Current(len as i64))?;
        }
        MajorKind::Array => validate_list(c, r, info, depth)?,
        MajorKind::Map => validate_map(c, r, info, depth)?,
        MajorKind::Tag => {
            let tag = read_argument(r, info, strict)?;
            if tag != 42 {
                return Err(crate::error::UnknownTag(tag).into());
            }
            read_link(r, strict)?;
        }
        MajorKind::Other => match info {
            20 | 21 | 22 => {}
            25 | 26 | 27 => {
                read_float(r, info, strict)?;
            }
            _ => return Err(UnexpectedCode(0xe0 | info).into()),
        },
    }
    Ok(())
}

fn validate_list<R: Read + Seek>(c: DagCborCodec, r: &mut R, info: u8, depth: usize) -> Result<()> {
    let len = read_argument(r, info, c.strict)?;
    for _ in 0..len {
        validate_at(c, r, depth + 1)?;
    }
    Ok(())
}

/// Validates a map's keys are text strings, unique, and (in strict mode)
/// already in `DagCborCodec::key_order`, the same canonicality check
/// `decode::<Ipld>` performs as a side effect of fully materializing the map.
fn validate_map<R: Read + Seek>(c: DagCborCodec, r: &mut R, info: u8, depth: usize) -> Result<()> {
    let len = read_argument(r, info, c.strict)?;
    let mut prev: Option<String> = None;
    for _ in 0..len {
        let (kind, kinfo) = read_header(r)?;
        if kind != MajorKind::TextString {
            return Err(UnexpectedCode(kinfo).into());
        }
        let klen = read_argument(r, kinfo, c.strict)?;
        let key = String::from_utf8(read_bytes(r, klen)?)?;
        if let Some(prev_key) = &prev {
            match DagCborCodec::key_order(prev_key, &key) {
                std::cmp::Ordering::Equal => {
                    return Err(Error::InvalidValue(format!("duplicate map key {key:?}")));
                }
                std::cmp::Ordering::Greater if c.strict => {
                    return Err(Error::Strict(format!(
                        "map keys out of canonical order at {key:?}"
                    )));
                }
                _ => {}
            }
        }
        validate_at(c, r, depth + 1)?;
        prev = Some(key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::DagCborCodec;
    use libipld_core::codec::Codec;
    use libipld_core::ipld::{Ipld, OrderedMap};
    use std::io::Cursor;

    fn sample() -> Ipld {
        let mut inner = OrderedMap::new();
        inner.set("bytes", Ipld::bytes(vec![1, 2, 3]));
        inner.set("float", Ipld::Float(0.0));
        inner.set("string", Ipld::string("hello"));
        let mut map = OrderedMap::new();
        map.set("list", Ipld::list(vec![Ipld::Bool(true), Ipld::Null, Ipld::Bool(false)]));
        map.set("map", Ipld::map_from(inner));
        map.set("negative", Ipld::Integer(-100));
        map.set("zero", Ipld::Integer(0));
        Ipld::map_from(map)
    }

    #[test]
    fn accepts_the_encoder_own_canonical_output() {
        let codec = DagCborCodec::default();
        let bytes = codec.encode(&sample()).unwrap();
        assert!(validate(codec, &mut Cursor::new(bytes)).is_ok());
    }

    #[test]
    fn rejects_truncated_input() {
        let codec = DagCborCodec::default();
        let bytes = codec.encode(&sample()).unwrap();
        let truncated = &bytes[..bytes.len() - 2];
        assert!(validate(codec, &mut Cursor::new(truncated)).is_err());
    }

    #[test]
    fn rejects_garbled_input() {
        let codec = DagCborCodec::default();
        let mut bytes = codec.encode(&sample()).unwrap();
        bytes[1] = 0xff;
        bytes[3] = 0xff;
        assert!(validate(codec, &mut Cursor::new(bytes)).is_err());
    }

    #[test]
    fn rejects_indefinite_length_map() {
        let bytes = [
            0xBF, 0x63, 0x46, 0x75, 0x6e, 0xF5, 0x63, 0x41, 0x6d, 0x74, 0x21, 0xFF,
        ];
        assert!(validate(DagCborCodec::default(), &mut Cursor::new(bytes)).is_err());
    }

    #[test]
    fn rejects_map_keys_out_of_canonical_order_in_strict_mode() {
        // {"b": 1, "a": 2}
        let bytes = [0xa2, 0x61, 0x62, 0x01, 0x61, 0x61, 0x02];
        assert!(validate(DagCborCodec::default(), &mut Cursor::new(bytes)).is_err());
        assert!(validate(DagCborCodec { strict: false }, &mut Cursor::new(bytes)).is_ok());
    }
}
