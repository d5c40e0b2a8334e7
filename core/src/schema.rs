//! Runtime support for the schema-driven encoder/decoder generator.
//!
//! A user declares a static type (a record, an enumeration, a tuple, ...);
//! `libipld-derive` generates an implementation of [`ToIpld`]/[`FromIpld`] for
//! it. The blanket [`Encode`]/[`Decode`] impls below then give that type a
//! codec-generic `encode`/`decode` for free, by routing through the dynamic
//! [`Ipld`] tree: `T::to_ipld()?.encode(c, w)` and
//! `T::from_ipld(&Ipld::decode(c, r)?)`. Because encoding a derived type is
//! encoding the *same* `Ipld` value the dynamic codec would produce for it,
//! the static and dynamic paths agree on wire bytes by construction rather
//! than by a second, hand-synchronized implementation (spec invariant: a
//! derived type's wire output matches the dynamic codec exactly).
use crate::codec::{Codec, Decode, Encode};
use crate::error::{Error, Result};
use crate::ipld::Ipld;
use std::io::{Cursor, Read, Seek, Write};

/// Converts a static value into its dynamic [`Ipld`] representation.
///
/// Implemented by `#[derive(ToIpld)]` for records, tuples and enumerations;
/// see `libipld-derive`. Fallible because a field using a custom
/// [`IpldAdapter`] may reject the value it was asked to encode (e.g. an
/// adapter backed by a fallible parser of its own).
pub trait ToIpld {
    /// Builds the `Ipld` tree this value is represented as on the wire.
    fn to_ipld(&self) -> Result<Ipld>;
}

/// Converts a dynamic [`Ipld`] value into a static Rust type.
///
/// Implemented by `#[derive(FromIpld)]`; see `libipld-derive`.
pub trait FromIpld: Sized {
    /// Reconstructs `Self` from an already-decoded `Ipld` tree, failing with
    /// [`Error::InvalidType`]/[`Error::InvalidValue`] if the shape does not
    /// match (wrong kind, missing/extra field, unrecognized enum variant).
    fn from_ipld(ipld: &Ipld) -> Result<Self>;

    /// Validates an `Ipld` tree's shape against this type's declared record
    /// fields before [`FromIpld::from_ipld`] runs, using the decoding
    /// codec's `strict` flag and `Codec::key_order` (§4.4: reject extra
    /// fields, and in strict mode enforce that a `StructRepr::Map` record's
    /// fields appear in the codec's canonical order).
    ///
    /// The blanket `Decode<C>` impl below is the only caller; it is the
    /// bridge that lets a per-codec `strict`/`key_order` signal reach a
    /// derived type's decode path without `FromIpld::from_ipld` itself
    /// taking a `Codec` parameter. Types with no record-shaped wire form
    /// (tuples, fieldless enums, the unit type) keep the default no-op.
    fn check_record_shape(
        _ipld: &Ipld,
        _strict: bool,
        _key_order: fn(&str, &str) -> std::cmp::Ordering,
    ) -> Result<()> {
        Ok(())
    }
}

impl<C: Codec, T: ToIpld> Encode<C> for T
where
    Ipld: Encode<C>,
{
    fn encode<W: Write>(&self, c: C, w: &mut W) -> Result<()> {
        self.to_ipld()?.encode(c, w)
    }
}

impl<C: Codec, T: FromIpld> Decode<C> for T
where
    Ipld: Decode<C>,
{
    fn decode<R: Read + Seek>(c: C, r: &mut R) -> Result<Self> {
        let ipld = Ipld::decode(c, r)?;
        T::check_record_shape(&ipld, c.is_strict(), C::key_order)?;
        T::from_ipld(&ipld)
    }
}

/// The result of a static `decode_type::<T>` call (§4.4 "Result container
/// for static decode", §9 "Decoder partial-allocation safety").
///
/// A derived type's fields are ordinary owned Rust values (`String`,
/// `Vec<u8>`, nested records), so this workspace's generated [`FromIpld`]
/// impls never actually borrow from `arena` — but the contract is kept
/// regardless (every static decode, success or failure along the way,
/// returns a value paired with the arena that would own any borrowed
/// allocations), so an adapter that *does* want to hand back `&'arena str`/
/// `&'arena [u8]` slices has somewhere to allocate them without changing this
/// function's signature.
pub struct Decoded<T> {
    /// The decoded value.
    pub value: T,
    /// Owns any arena-allocated data reachable from `value`. Dropping this
    /// drops all of it at once.
    pub arena: bumpalo::Bump,
}

/// Decodes a statically-typed value from `bytes`, requiring the entire slice
/// to be consumed (mirrors [`Codec::decode`]'s "all input must be consumed"
/// contract for the dynamic path).
pub fn decode_type<C: Codec, T: Decode<C>>(c: C, bytes: &[u8]) -> Result<Decoded<T>> {
    let mut cursor = Cursor::new(bytes);
    let value = T::decode(c, &mut cursor)?;
    if (cursor.position() as usize) != bytes.len() {
        return Err(Error::ExtraneousData);
    }
    Ok(Decoded {
        value,
        arena: bumpalo::Bump::new(),
    })
}

/// Encodes a statically-typed value into a fresh `Vec<u8>`.
pub fn encode_type<C: Codec, T: Encode<C>>(c: C, value: &T) -> Result<Vec<u8>> {
    c.encode(value)
}

/// A user-supplied mapping between a native type and one of the IPLD
/// string/bytes/integer representations (§4.4 "custom adapters").
///
/// A type opts into exactly one representation by overriding the matching
/// pair of methods; the rest keep their default "unsupported" behavior. The
/// derive macro dispatches to these explicitly for a field annotated
/// `#[ipld(adapter = "integer" | "string" | "bytes")]` — it does not try to
/// guess which pair a type has implemented.
pub trait IpldAdapter: Sized {
    /// Consumes an IPLD integer, producing `Self`.
    fn decode_integer(_value: i64) -> Result<Self> {
        Err(Error::InvalidType {
            expected: "integer adapter".into(),
            found: "unsupported by this type".into(),
        })
    }

    /// Consumes an IPLD string, producing `Self`.
    fn parse_string(_s: &str) -> Result<Self> {
        Err(Error::InvalidType {
            expected: "string adapter".into(),
            found: "unsupported by this type".into(),
        })
    }

    /// Consumes an IPLD byte string, producing `Self`.
    fn parse_bytes(_b: &[u8]) -> Result<Self> {
        Err(Error::InvalidType {
            expected: "bytes adapter".into(),
            found: "unsupported by this type".into(),
        })
    }

    /// Produces an IPLD integer for `self`.
    fn encode_integer(&self) -> Result<i64> {
        Err(Error::InvalidType {
            expected: "integer adapter".into(),
            found: "unsupported by this type".into(),
        })
    }

    /// Produces the UTF-8 bytes of an IPLD string for `self`.
    fn write_string(&self) -> Result<String> {
        Err(Error::InvalidType {
            expected: "string adapter".into(),
            found: "unsupported by this type".into(),
        })
    }

    /// Produces the raw bytes of an IPLD byte string for `self`. An empty
    /// byte string is a valid result — adapters are not restricted from
    /// emitting one (spec §9, open question 2).
    fn write_bytes(&self) -> Result<Vec<u8>> {
        Err(Error::InvalidType {
            expected: "bytes adapter".into(),
            found: "unsupported by this type".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;
    use std::cmp::Ordering;

    #[derive(Clone, Copy)]
    struct Lex;
    impl Codec for Lex {
        const CODE: u64 = 0;
        fn key_order(a: &str, b: &str) -> Ordering {
            a.cmp(b)
        }
    }
    impl Encode<Lex> for Ipld {
        fn encode<W: Write>(&self, _c: Lex, w: &mut W) -> Result<()> {
            write!(w, "{self:?}").map_err(Error::from)
        }
    }
    impl Decode<Lex> for Ipld {
        fn decode<R: Read + Seek>(_c: Lex, _r: &mut R) -> Result<Self> {
            Ok(Ipld::Null)
        }
    }

    struct Wrapper(i64);
    impl ToIpld for Wrapper {
        fn to_ipld(&self) -> Result<Ipld> {
            Ok(Ipld::Integer(self.0))
        }
    }
    impl FromIpld for Wrapper {
        fn from_ipld(ipld: &Ipld) -> Result<Self> {
            match ipld {
                Ipld::Integer(i) => Ok(Wrapper(*i)),
                other => Err(Error::invalid_type("integer", other.kind().to_string())),
            }
        }
    }

    #[test]
    fn blanket_encode_routes_through_to_ipld() {
        let w = Wrapper(42);
        let bytes = Lex.encode(&w).unwrap();
        assert_eq!(bytes, b"42");
    }

    #[test]
    fn adapter_default_methods_report_unsupported() {
        struct NoAdapter;
        impl IpldAdapter for NoAdapter {}
        assert!(NoAdapter::decode_integer(1).is_err());
        assert!(NoAdapter.encode_integer().is_err());
    }

    struct Echo(i64);
    impl ToIpld for Echo {
        fn to_ipld(&self) -> Result<Ipld> {
            Ok(Ipld::Integer(self.0))
        }
    }
    impl FromIpld for Echo {
        fn from_ipld(ipld: &Ipld) -> Result<Self> {
            match ipld {
                Ipld::Integer(i) => Ok(Echo(*i)),
                other => Err(Error::invalid_type("integer", other.kind().to_string())),
            }
        }
    }

    #[derive(Clone, Copy)]
    struct Passthrough;
    impl Codec for Passthrough {
        const CODE: u64 = 1;
    }
    impl Encode<Passthrough> for Ipld {
        fn encode<W: Write>(&self, _c: Passthrough, w: &mut W) -> Result<()> {
            match self {
                Ipld::Integer(i) => write!(w, "{i}").map_err(Error::from),
                other => Err(Error::invalid_type("integer", other.kind().to_string())),
            }
        }
    }
    impl Decode<Passthrough> for Ipld {
        fn decode<R: Read + Seek>(_c: Passthrough, r: &mut R) -> Result<Self> {
            let mut s = String::new();
            r.read_to_string(&mut s)?;
            s.parse::<i64>()
                .map(Ipld::Integer)
                .map_err(|e| Error::InvalidValue(e.to_string()))
        }
    }

    #[test]
    fn decode_type_propagates_a_malformed_value_error() {
        let err = decode_type::<Passthrough, Echo>(Passthrough, b"42x").unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));
    }

    #[test]
    fn decode_type_round_trips_through_encode_type() {
        let bytes = encode_type(Passthrough, &Echo(42)).unwrap();
        let decoded = decode_type::<Passthrough, Echo>(Passthrough, &bytes).unwrap();
        assert_eq!(decoded.value.0, 42);
    }
}
