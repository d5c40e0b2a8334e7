//! CBOR byte-level primitives and `Decode<DagCborCodec>` implementations.
use crate::error::{InvalidCidPrefix, NumberNotMinimal, UnexpectedCode, UnknownTag};
use crate::DagCborCodec;
use byteorder::{BigEndian, ByteOrder};
use cid::Cid;
use libipld_core::codec::{Codec, Decode};
use libipld_core::error::{Error, Result};
use libipld_core::ipld::{Ipld, OrderedMap};
use std::convert::TryFrom;
use std::io::{Read, Seek, SeekFrom};

/// Recursion guard for decoding pathologically deep value trees (spec §9).
const MAX_DEPTH: usize = 512;

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub(crate) enum MajorKind {
    UnsignedInt,
    NegativeInt,
    ByteString,
    TextString,
    Array,
    Map,
    Tag,
    Other,
}

impl MajorKind {
    fn from_u8(major: u8) -> Self {
        match major {
            0 => Self::UnsignedInt,
            1 => Self::NegativeInt,
            2 => Self::ByteString,
            3 => Self::TextString,
            4 => Self::Array,
            5 => Self::Map,
            6 => Self::Tag,
            _ => Self::Other,
        }
    }
}

pub(crate) fn read_u8<R: Read>(r: &mut R) -> Result<u8> {
    let mut buf = [0; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(r: &mut R) -> Result<u16> {
    let mut buf = [0; 2];
    r.read_exact(&mut buf)?;
    Ok(BigEndian::read_u16(&buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0; 4];
    r.read_exact(&mut buf)?;
    Ok(BigEndian::read_u32(&buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0; 8];
    r.read_exact(&mut buf)?;
    Ok(BigEndian::read_u64(&buf))
}

/// Reads the header byte, splitting it into major type and additional info,
/// rejecting the reserved `28..=31` additional-info range up front.
pub(crate) fn read_header<R: Read>(r: &mut R) -> Result<(MajorKind, u8)> {
    let byte = read_u8(r)?;
    let info = byte & 0x1f;
    if (28..=31).contains(&info) {
        return Err(UnexpectedCode(byte).into());
    }
    Ok((MajorKind::from_u8(byte >> 5), info))
}

/// Reads the argument that follows a header's additional-info nibble,
/// enforcing minimal-width encoding when `strict`.
pub(crate) fn read_argument<R: Read>(r: &mut R, info: u8, strict: bool) -> Result<u64> {
    match info {
        0..=23 => Ok(info as u64),
        24 => {
            let v = read_u8(r)? as u64;
            if strict && v <= 23 {
                return Err(NumberNotMinimal.into());
            }
            Ok(v)
        }
        25 => {
            let v = read_u16(r)? as u64;
            if strict && v <= u8::MAX as u64 {
                return Err(NumberNotMinimal.into());
            }
            Ok(v)
        }
        26 => {
            let v = read_u32(r)? as u64;
            if strict && v <= u16::MAX as u64 {
                return Err(NumberNotMinimal.into());
            }
            Ok(v)
        }
        27 => {
            let v = read_u64(r)?;
            if strict && v <= u32::MAX as u64 {
                return Err(NumberNotMinimal.into());
            }
            Ok(v)
        }
        _ => Err(UnexpectedCode(info).into()),
    }
}

pub(crate) fn read_bytes<R: Read>(r: &mut R, len: u64) -> Result<Vec<u8>> {
    let len = usize::try_from(len).map_err(|_| Error::Overflow)?;
    let mut buf = Vec::with_capacity(len.min(16 * 1024));
    r.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(buf)
}

fn f16_to_f64(bits: u16) -> f64 {
    let sign = (bits >> 15) & 1;
    let exp = (bits >> 10) & 0x1f;
    let frac = (bits & 0x3ff) as f64;
    let magnitude = if exp == 0 {
        frac * 2f64.powi(-24)
    } else if exp == 0x1f {
        if frac == 0.0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else {
        (1.0 + frac / 1024.0) * 2f64.powi(exp as i32 - 15)
    };
    if sign == 1 {
        -magnitude
    } else {
        magnitude
    }
}

/// Reads a dag-cbor float (2/4/8-byte IEEE-754, widened to `f64`), rejecting
/// NaN/±∞ and (in strict mode) any width narrower than 8 bytes.
pub(crate) fn read_float<R: Read>(r: &mut R, info: u8, strict: bool) -> Result<f64> {
    let value = match info {
        25 => {
            if strict {
                return Err(Error::Strict("2-byte float in strict mode".into()));
            }
            f16_to_f64(read_u16(r)?)
        }
        26 => {
            if strict {
                return Err(Error::Strict("4-byte float in strict mode".into()));
            }
            f32::from_bits(read_u32(r)?) as f64
        }
        27 => f64::from_bits(read_u64(r)?),
        _ => return Err(UnexpectedCode(0xe0 | info).into()),
    };
    if !value.is_finite() {
        return Err(Error::InvalidValue("decoded float is NaN or infinite".into()));
    }
    Ok(value)
}

/// Reads a link: a byte string tagged 42, checking the leading
/// identity-multibase (`0x00`) prefix byte before parsing the CID.
pub(crate) fn read_link<R: Read>(r: &mut R, strict: bool) -> Result<Cid> {
    let (kind, info) = read_header(r)?;
    if kind != MajorKind::ByteString {
        return Err(UnexpectedCode(info).into());
    }
    let len = read_argument(r, info, strict)?;
    if len < 1 {
        return Err(Error::InvalidValue("zero-length cid byte string".into()));
    }
    let bytes = read_bytes(r, len)?;
    if bytes[0] != 0 {
        return Err(InvalidCidPrefix(bytes[0]).into());
    }
    Cid::try_from(&bytes[1..]).map_err(|e| Error::InvalidValue(e.to_string()))
}

fn decode_at<R: Read>(c: DagCborCodec, r: &mut R, depth: usize) -> Result<Ipld> {
    if depth > MAX_DEPTH {
        return Err(Error::InvalidValue("value nesting too deep".into()));
    }
    let (kind, info) = read_header(r)?;
    let strict = c.strict;
    Ok(match kind {
        MajorKind::UnsignedInt => {
            let v = read_argument(r, info, strict)?;
            Ipld::Integer(i64::try_from(v).map_err(|_| Error::Overflow)?)
        }
        MajorKind::NegativeInt => {
            let v = read_argument(r, info, strict)?;
            if v > i64::MAX as u64 {
                return Err(Error::Overflow);
            }
            Ipld::Integer(-1 - v as i64)
        }
        MajorKind::ByteString => {
            let len = read_argument(r, info, strict)?;
            Ipld::bytes(read_bytes(r, len)?)
        }
        MajorKind::TextString => {
            let len = read_argument(r, info, strict)?;
            Ipld::string(String::from_utf8(read_bytes(r, len)?)?)
        }
        MajorKind::Array => {
            let len = read_argument(r, info, strict)?;
            let len = usize::try_from(len).map_err(|_| Error::Overflow)?;
            let mut list = Vec::with_capacity(len.min(4096));
            for _ in 0..len {
                list.push(decode_at(c, r, depth + 1)?);
            }
            Ipld::list(list)
        }
        MajorKind::Map => {
            let len = read_argument(r, info, strict)?;
            let len = usize::try_from(len).map_err(|_| Error::Overflow)?;
            let mut map = OrderedMap::new();
            let mut prev: Option<String> = None;
            for _ in 0..len {
                let (kkind, kinfo) = read_header(r)?;
                if kkind != MajorKind::TextString {
                    return Err(UnexpectedCode(kinfo).into());
                }
                let klen = read_argument(r, kinfo, strict)?;
                let key = String::from_utf8(read_bytes(r, klen)?)?;
                if let Some(prev_key) = &prev {
                    let order = DagCborCodec::key_order(prev_key, &key);
                    match order {
                        std::cmp::Ordering::Equal => {
                            return Err(Error::InvalidValue(format!(
                                "duplicate map key {key:?}"
                            )));
                        }
                        std::cmp::Ordering::Greater if strict => {
                            return Err(Error::Strict(format!(
                                "map keys out of canonical order at {key:?}"
                            )));
                        }
                        _ => {}
                    }
                }
                let value = decode_at(c, r, depth + 1)?;
                map.set(key.as_str(), value);
                prev = Some(key);
            }
            Ipld::map_from(map)
        }
        MajorKind::Tag => {
            let tag = read_argument(r, info, strict)?;
            if tag != 42 {
                return Err(UnknownTag(tag).into());
            }
            Ipld::Link(read_link(r, strict)?)
        }
        MajorKind::Other => match info {
            20 => Ipld::Bool(false),
            21 => Ipld::Bool(true),
            22 => Ipld::Null,
            23 => {
                return Err(Error::InvalidType {
                    expected: "a value".into(),
                    found: "undefined (simple 23)".into(),
                })
            }
            25 | 26 | 27 => Ipld::Float(read_float(r, info, strict)?),
            _ => return Err(UnexpectedCode(0xe0 | info).into()),
        },
    })
}

impl Decode<DagCborCodec> for Ipld {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        decode_at(c, r, 0)
    }
}

impl Decode<DagCborCodec> for bool {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Bool(b) => Ok(b),
            other => Err(Error::invalid_type("boolean", other.kind().to_string())),
        }
    }
}

macro_rules! impl_int_decode {
    ($($t:ty),*) => {
        $(
            impl Decode<DagCborCodec> for $t {
                fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
                    match Ipld::decode(c, r)? {
                        Ipld::Integer(i) => <$t>::try_from(i).map_err(|_| Error::Overflow),
                        other => Err(Error::invalid_type("integer", other.kind().to_string())),
                    }
                }
            }
        )*
    };
}
impl_int_decode!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Decode<DagCborCodec> for f32 {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Float(f) => Ok(f as f32),
            other => Err(Error::invalid_type("float", other.kind().to_string())),
        }
    }
}

impl Decode<DagCborCodec> for f64 {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Float(f) => Ok(f),
            other => Err(Error::invalid_type("float", other.kind().to_string())),
        }
    }
}

impl Decode<DagCborCodec> for String {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::String(s) => Ok(s.to_string()),
            other => Err(Error::invalid_type("string", other.kind().to_string())),
        }
    }
}

impl Decode<DagCborCodec> for Vec<u8> {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Bytes(b) => Ok(b.to_vec()),
            other => Err(Error::invalid_type("bytes", other.kind().to_string())),
        }
    }
}

impl Decode<DagCborCodec> for Box<[u8]> {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        Ok(Vec::<u8>::decode(c, r)?.into_boxed_slice())
    }
}

impl Decode<DagCborCodec> for Cid {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Link(cid) => Ok(cid),
            other => Err(Error::invalid_type("link", other.kind().to_string())),
        }
    }
}

impl<T: Decode<DagCborCodec>> Decode<DagCborCodec> for Option<T> {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        let (kind, info) = read_header(r)?;
        if kind == MajorKind::Other && info == 22 {
            return Ok(None);
        }
        r.seek(SeekFrom::Current(-1))?;
        Ok(Some(T::decode(c, r)?))
    }
}

impl<T: Decode<DagCborCodec>> Decode<DagCborCodec> for Vec<T> {
    fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
        let (kind, info) = read_header(r)?;
        if kind != MajorKind::Array {
            return Err(UnexpectedCode(info).into());
        }
        let len = read_argument(r, info, c.strict)?;
        let len = usize::try_from(len).map_err(|_| Error::Overflow)?;
        let mut out = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            out.push(T::decode(c, r)?);
        }
        Ok(out)
    }
}

macro_rules! impl_tuple_decode {
    ($len:expr; $($name:ident),+) => {
        impl<$($name: Decode<DagCborCodec>),+> Decode<DagCborCodec> for ($($name,)+) {
            fn decode<R: Read + Seek>(c: DagCborCodec, r: &mut R) -> Result<Self> {
                let (kind, info) = read_header(r)?;
                if kind != MajorKind::Array {
                    return Err(UnexpectedCode(info).into());
                }
                let len = read_argument(r, info, c.strict)?;
                if len != $len {
                    return Err(Error::InvalidType {
                        expected: format!("a {}-tuple", $len),
                        found: format!("a list of length {len}"),
                    });
                }
                Ok(($($name::decode(c, r)?,)+))
            }
        }
    };
}
impl_tuple_decode!(1; A);
impl_tuple_decode!(2; A, B);
impl_tuple_decode!(3; A, B, C);
impl_tuple_decode!(4; A, B, C, D);
