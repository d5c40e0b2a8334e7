//! dag-json encoding built on `serde_json::Serializer` as the JSON-writing
//! substrate: a `serde_json::ser::Formatter` renders floats per
//! `FloatFormat`, and a `Serialize` impl over `&Ipld` layers the reserved
//! `"/"` conventions for links/byte strings and canonical (plain
//! lexicographic) map key order on top.
use crate::DagJsonCodec;
use base64::Engine;
use cid::Cid;
use libipld_core::codec::{canonical_order, Encode};
use libipld_core::error::{Error, Result};
use libipld_core::ipld::Ipld;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::convert::TryFrom;
use std::io;
use std::io::Write;

const LINK_KEY: &str = "/";
const BYTES_KEY: &str = "bytes";

/// A `serde_json::ser::Formatter` that renders floats through `FloatFormat`
/// instead of `serde_json`'s own shortest-round-trip rendering; every other
/// token (strings, separators, integers) keeps the trait's default, minimal
/// (whitespace-free) behavior, the same output `serde_json::ser::CompactFormatter`
/// produces.
struct IpldFormatter {
    float_format: crate::FloatFormat,
}

impl serde_json::ser::Formatter for IpldFormatter {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(self.float_format.render(value).as_bytes())
    }
}

/// Walks the tree once before handing it to `serde_json` so every domain
/// error (a non-finite float, the reserved key used outside the link/bytes
/// convention) is reported with its proper `Error` variant rather than a
/// generic `serde::ser::Error::custom` string.
fn validate(ipld: &Ipld) -> Result<()> {
    match ipld {
        Ipld::Float(f) if !f.is_finite() => Err(Error::UnsupportedValue(
            "cannot encode a NaN or infinite float".into(),
        )),
        Ipld::List(list) => {
            for value in list.borrow().iter() {
                validate(value)?;
            }
            Ok(())
        }
        Ipld::Map(map) => {
            let map = map.borrow();
            if map.keys().any(|k| k == LINK_KEY) {
                return Err(Error::InvalidValue(format!(
                    "reserved key {LINK_KEY:?} used in a plain map"
                )));
            }
            for (_, value) in map.iter() {
                validate(value)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

struct BytesPayload<'a>(&'a str);

impl Serialize for BytesPayload<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(BYTES_KEY, self.0)?;
        map.end()
    }
}

/// `Serialize` over a borrowed `&Ipld`, since `Ipld` itself has no generic
/// wire representation to derive `Serialize` from.
struct IpldSer<'a>(&'a Ipld);

impl Serialize for IpldSer<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Ipld::Null => serializer.serialize_none(),
            Ipld::Bool(b) => serializer.serialize_bool(*b),
            Ipld::Integer(i) => serializer.serialize_i64(*i),
            Ipld::Float(f) => serializer.serialize_f64(*f),
            Ipld::String(s) => serializer.serialize_str(s),
            Ipld::Bytes(b) => {
                let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b.as_ref());
                let mut outer = serializer.serialize_map(Some(1))?;
                outer.serialize_entry(LINK_KEY, &BytesPayload(&encoded))?;
                outer.end()
            }
            Ipld::List(list) => {
                let list = list.borrow();
                serializer.collect_seq(list.iter().map(IpldSer))
            }
            Ipld::Map(map) => {
                let map = map.borrow();
                let keys: Vec<&str> = map.keys().collect();
                let mut out = serializer.serialize_map(Some(keys.len()))?;
                for idx in canonical_order::<DagJsonCodec>(&keys) {
                    let (key, value) = map.get_index(idx).expect("index in range");
                    out.serialize_entry(key, &IpldSer(value))?;
                }
                out.end()
            }
            Ipld::Link(cid) => {
                let mut outer = serializer.serialize_map(Some(1))?;
                outer.serialize_entry(LINK_KEY, &cid.to_string())?;
                outer.end()
            }
        }
    }
}

impl Encode<DagJsonCodec> for Ipld {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        validate(self)?;
        let formatter = IpldFormatter {
            float_format: c.float_format,
        };
        let mut ser = serde_json::Serializer::with_formatter(w, formatter);
        IpldSer(self)
            .serialize(&mut ser)
            .map_err(|e| Error::InvalidValue(e.to_string()))
    }
}

impl Encode<DagJsonCodec> for bool {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        Ipld::Bool(*self).encode(c, w)
    }
}

macro_rules! impl_int_encode {
    ($($t:ty),*) => {
        $(
            impl Encode<DagJsonCodec> for $t {
                fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
                    let v = i64::try_from(*self).map_err(|_| Error::Overflow)?;
                    Ipld::Integer(v).encode(c, w)
                }
            }
        )*
    };
}
impl_int_encode!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Encode<DagJsonCodec> for f32 {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        (*self as f64).encode(c, w)
    }
}

impl Encode<DagJsonCodec> for f64 {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        Ipld::Float(*self).encode(c, w)
    }
}

impl Encode<DagJsonCodec> for str {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        Ipld::string(self).encode(c, w)
    }
}

impl Encode<DagJsonCodec> for String {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        self.as_str().encode(c, w)
    }
}

impl Encode<DagJsonCodec> for [u8] {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        Ipld::bytes(self.to_vec()).encode(c, w)
    }
}

impl Encode<DagJsonCodec> for Vec<u8> {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        self[..].encode(c, w)
    }
}

impl Encode<DagJsonCodec> for Box<[u8]> {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        self[..].encode(c, w)
    }
}

impl Encode<DagJsonCodec> for Cid {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        Ipld::Link(*self).encode(c, w)
    }
}

impl<T: Encode<DagJsonCodec>> Encode<DagJsonCodec> for Option<T> {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        match self {
            Some(value) => value.encode(c, w),
            None => Ok(w.write_all(b"null")?),
        }
    }
}

impl<T: Encode<DagJsonCodec>> Encode<DagJsonCodec> for Vec<T> {
    fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
        w.write_all(b"[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                w.write_all(b",")?;
            }
            value.encode(c, w)?;
        }
        w.write_all(b"]")?;
        Ok(())
    }
}

macro_rules! impl_tuple_encode {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Encode<DagJsonCodec>),+> Encode<DagJsonCodec> for ($($name,)+) {
            fn encode<W: Write>(&self, c: DagJsonCodec, w: &mut W) -> Result<()> {
                w.write_all(b"[")?;
                let mut first = true;
                $(
                    if !first { w.write_all(b",")?; }
                    first = false;
                    self.$idx.encode(c, w)?;
                )+
                w.write_all(b"]")?;
                Ok(())
            }
        }
    };
}
impl_tuple_encode!(A:0);
impl_tuple_encode!(A:0, B:1);
impl_tuple_encode!(A:0, B:1, C:2);
impl_tuple_encode!(A:0, B:1, C:2, D:3);

#[cfg(test)]
mod tests {
    use super::*;
    use libipld_core::codec::Codec;

    #[test]
    fn rejects_reserved_key_in_a_plain_map() {
        let mut map = libipld_core::ipld::OrderedMap::new();
        map.set("/", Ipld::Integer(1));
        let ipld = Ipld::map_from(map);
        assert!(DagJsonCodec::default().encode(&ipld).is_err());
    }

    #[test]
    fn rejects_nan_and_infinite_floats() {
        assert!(DagJsonCodec::default()
            .encode(&Ipld::Float(f64::NAN))
            .is_err());
        assert!(DagJsonCodec::default()
            .encode(&Ipld::Float(f64::INFINITY))
            .is_err());
    }

    #[test]
    fn encodes_byte_strings_as_nested_link_object() {
        let bytes = DagJsonCodec::default()
            .encode(&Ipld::bytes(vec![1u8, 2, 3, 4, 5]))
            .unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"/":{"bytes":"AQIDBAU"}}"#
        );
    }

    #[test]
    fn encodes_map_in_plain_lexicographic_key_order() {
        let mut map = libipld_core::ipld::OrderedMap::new();
        map.set("b", Ipld::Integer(1));
        map.set("a", Ipld::Integer(2));
        let bytes = DagJsonCodec::default()
            .encode(&Ipld::map_from(map))
            .unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"{"a":2,"b":1}"#);
    }
}
