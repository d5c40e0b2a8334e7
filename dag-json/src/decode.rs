//! dag-json decoding built on [`serde_json::Deserializer`] as the streaming
//! JSON tokenizer (§4.3/§9): a `DeserializeSeed`/`Visitor` pair walks its
//! token stream directly into [`Ipld`], peeking an object's first key one
//! token at a time via `MapAccess` to decide whether it is a plain map or the
//! reserved-`"/"` link/bytes alternation, without ever buffering into a
//! generic `serde_json::Value` tree first.
use crate::error::{MalformedBytesPayload, MalformedCid};
use crate::DagJsonCodec;
use base64::Engine;
use cid::Cid;
use libipld_core::codec::{Decode, Encode};
use libipld_core::error::{Error, Result};
use libipld_core::ipld::{Ipld, OrderedMap};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use std::cell::RefCell;
use std::io::{Read, Seek};
use std::str::FromStr;

const MAX_DEPTH: usize = 512;
const LINK_KEY: &str = "/";
const BYTES_KEY: &str = "bytes";

/// Carries a typed [`Error`] out of a `serde::de::Error::custom` boundary.
///
/// `serde_json::Deserializer`'s associated `Error` type is fixed to
/// `serde_json::Error`, which can only hold a message string. Stashing the
/// original typed error here and reading it back once `deserialize` returns
/// `Err` recovers the precise variant (`Overflow`, `InvalidValue`, ...) the
/// rest of this crate expects.
struct ErrorSlot(RefCell<Option<Error>>);

impl ErrorSlot {
    fn new() -> Self {
        Self(RefCell::new(None))
    }

    fn store_and_custom<E: de::Error>(&self, err: Error) -> E {
        let message = err.to_string();
        *self.0.borrow_mut() = Some(err);
        E::custom(message)
    }

    fn take(&self) -> Option<Error> {
        self.0.borrow_mut().take()
    }
}

fn classify_json_error(e: serde_json::Error) -> Error {
    if e.is_eof() {
        Error::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
    } else {
        Error::InvalidValue(e.to_string())
    }
}

/// Parses the bytes-alternation payload `{"bytes": "<base64url-nopad>"}`
/// nested under a link-wrapper's `"/"` key.
fn decode_bytes_payload(payload: &Ipld) -> Result<Ipld> {
    let Ipld::Map(_) = payload else {
        return Err(Error::InvalidValue(
            "malformed link/bytes object under reserved key \"/\"".into(),
        ));
    };
    if payload.len() != 1 {
        return Err(Error::InvalidValue(
            "bytes object must have exactly one member, \"bytes\"".into(),
        ));
    }
    match payload.get_key(BYTES_KEY) {
        Some(Ipld::String(encoded)) => {
            let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(encoded.as_ref())
                .map_err(|e| MalformedBytesPayload(format!("malformed base64url bytes: {e}")))?;
            Ok(Ipld::bytes(bytes))
        }
        _ => Err(MalformedBytesPayload(
            "must have a single string-valued \"bytes\" member".into(),
        )
        .into()),
    }
}

/// A `DeserializeSeed` that decodes one `Ipld` value at the given nesting
/// depth, threading `errors` through every recursive call so a typed error
/// raised deep in the tree survives back to the top-level `decode` call.
struct IpldSeed<'a> {
    errors: &'a ErrorSlot,
    depth: usize,
}

impl<'de> DeserializeSeed<'de> for IpldSeed<'_> {
    type Value = Ipld;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Ipld, D::Error> {
        if self.depth > MAX_DEPTH {
            return Err(self
                .errors
                .store_and_custom(Error::InvalidValue("value nesting too deep".into())));
        }
        deserializer.deserialize_any(IpldVisitor {
            errors: self.errors,
            depth: self.depth,
        })
    }
}

struct IpldVisitor<'a> {
    errors: &'a ErrorSlot,
    depth: usize,
}

impl<'de> Visitor<'de> for IpldVisitor<'_> {
    type Value = Ipld;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a dag-json value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Ipld, E> {
        Ok(Ipld::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Ipld, E> {
        Ok(Ipld::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Ipld, E> {
        Ok(Ipld::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Ipld, E> {
        i64::try_from(v)
            .map(Ipld::Integer)
            .map_err(|_| self.errors.store_and_custom(Error::Overflow))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Ipld, E> {
        Ok(Ipld::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Ipld, E> {
        Ok(Ipld::string(v))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Ipld, E> {
        Ok(Ipld::string(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Ipld, A::Error> {
        let mut elements = Vec::new();
        while let Some(value) = seq.next_element_seed(IpldSeed {
            errors: self.errors,
            depth: self.depth + 1,
        })? {
            elements.push(value);
        }
        Ok(Ipld::list(elements))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Ipld, A::Error> {
        let errors = self.errors;
        let depth = self.depth;

        let Some(first_key) = map.next_key::<String>()? else {
            return Ok(Ipld::map_from(OrderedMap::new()));
        };
        let first_value: Ipld = map.next_value_seed(IpldSeed {
            errors,
            depth: depth + 1,
        })?;

        if first_key == LINK_KEY {
            if map.next_key::<String>()?.is_some() {
                return Err(errors.store_and_custom(Error::InvalidValue(
                    "link/bytes object must have exactly one member".into(),
                )));
            }
            return match first_value {
                Ipld::String(s) => {
                    let cid = Cid::from_str(s.as_ref())
                        .map_err(|e| errors.store_and_custom(MalformedCid(e.to_string()).into()))?;
                    Ok(Ipld::Link(cid))
                }
                payload @ Ipld::Map(_) => {
                    decode_bytes_payload(&payload).map_err(|e| errors.store_and_custom(e))
                }
                _ => Err(errors.store_and_custom(Error::InvalidValue(
                    "reserved key \"/\" must map to a CID string or a bytes object".into(),
                ))),
            };
        }

        let mut result = OrderedMap::new();
        result.set(first_key.as_str(), first_value);
        while let Some(key) = map.next_key::<String>()? {
            if key == LINK_KEY {
                return Err(errors.store_and_custom(Error::InvalidValue(format!(
                    "reserved key {LINK_KEY:?} used in a plain map"
                ))));
            }
            let value: Ipld = map.next_value_seed(IpldSeed {
                errors,
                depth: depth + 1,
            })?;
            result.set(key.as_str(), value);
        }
        Ok(Ipld::map_from(result))
    }
}

impl Decode<DagJsonCodec> for Ipld {
    fn decode<R: Read + Seek>(_c: DagJsonCodec, r: &mut R) -> Result<Self> {
        let errors = ErrorSlot::new();
        let mut de = serde_json::Deserializer::from_reader(r);
        let seed = IpldSeed {
            errors: &errors,
            depth: 0,
        };
        let value = seed
            .deserialize(&mut de)
            .map_err(|e| errors.take().unwrap_or_else(|| classify_json_error(e)))?;
        de.end().map_err(|_| Error::ExpectedEod)?;
        Ok(value)
    }
}

impl Decode<DagJsonCodec> for bool {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Bool(b) => Ok(b),
            other => Err(Error::invalid_type("boolean", other.kind().to_string())),
        }
    }
}

macro_rules! impl_int_decode {
    ($($t:ty),*) => {
        $(
            impl Decode<DagJsonCodec> for $t {
                fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
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

impl Decode<DagJsonCodec> for f32 {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Float(f) => Ok(f as f32),
            other => Err(Error::invalid_type("float", other.kind().to_string())),
        }
    }
}

impl Decode<DagJsonCodec> for f64 {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Float(f) => Ok(f),
            other => Err(Error::invalid_type("float", other.kind().to_string())),
        }
    }
}

impl Decode<DagJsonCodec> for String {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::String(s) => Ok(s.to_string()),
            other => Err(Error::invalid_type("string", other.kind().to_string())),
        }
    }
}

impl Decode<DagJsonCodec> for Vec<u8> {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Bytes(b) => Ok(b.to_vec()),
            other => Err(Error::invalid_type("bytes", other.kind().to_string())),
        }
    }
}

impl Decode<DagJsonCodec> for Box<[u8]> {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        Ok(Vec::<u8>::decode(c, r)?.into_boxed_slice())
    }
}

impl Decode<DagJsonCodec> for Cid {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Link(cid) => Ok(cid),
            other => Err(Error::invalid_type("link", other.kind().to_string())),
        }
    }
}

impl<T: Decode<DagJsonCodec>> Decode<DagJsonCodec> for Option<T> {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::Null => Ok(None),
            other => {
                let mut buf = Vec::new();
                other.encode(c, &mut buf)?;
                let mut cursor = std::io::Cursor::new(buf);
                Ok(Some(T::decode(c, &mut cursor)?))
            }
        }
    }
}

impl<T: Decode<DagJsonCodec>> Decode<DagJsonCodec> for Vec<T> {
    fn decode<R: Read + Seek>(c: DagJsonCodec, r: &mut R) -> Result<Self> {
        match Ipld::decode(c, r)? {
            Ipld::List(list) => {
                let list = list.borrow();
                list.iter()
                    .map(|elem| {
                        let mut buf = Vec::new();
                        elem.encode(c, &mut buf)?;
                        let mut cursor = std::io::Cursor::new(buf);
                        T::decode(c, &mut cursor)
                    })
                    .collect()
            }
            other => Err(Error::invalid_type("list", other.kind().to_string())),
        }
    }
}
