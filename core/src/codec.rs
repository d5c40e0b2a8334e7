//! The `Codec`/`Encode`/`Decode` traits every dag-* crate implements.
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::io::{Read, Seek, Write};

/// A marker type identifying one wire format (dag-cbor, dag-json, ...).
///
/// Implementors are zero-sized, `Copy` tokens passed by value into every
/// `Encode`/`Decode` call, the same way `dag-cbor`'s `DagCborCodec` and
/// `dag-json`'s `DagJsonCodec` do. Passing the codec explicitly, rather than
/// picking it up through a generic default, is what lets a single `Ipld`
/// value round-trip through either wire format against the same traits.
pub trait Codec: Copy + Sized {
    /// The multicodec code identifying this format on the wire (see the
    /// [multicodec table](https://github.com/multiformats/multicodec)).
    const CODE: u64;

    /// Orders two map keys the way this codec requires them to appear on the
    /// wire. dag-cbor sorts by encoded-length-then-lexicographic; dag-json
    /// sorts by plain lexicographic (UTF-8 byte) order.
    fn key_order(a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }

    /// Whether this codec instance should reject non-canonical input: the
    /// byte-level "SHOULD reject" cases dag-cbor checks (non-minimal
    /// integers, narrower-than-8-byte floats, unsorted map keys), and the
    /// declared-field canonical-order check the schema-driven static decoder
    /// applies to `StructRepr::Map` records (§4.4). Defaults to strict;
    /// codecs with no such knob just keep the default.
    fn is_strict(self) -> bool {
        true
    }

    /// Encodes a value of any `Encode<Self>` type into a fresh `Vec<u8>`.
    fn encode<T: Encode<Self> + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        value.encode(*self, &mut buf)?;
        Ok(buf)
    }

    /// Decodes a value of any `Decode<Self>` type, requiring the entire slice
    /// to be consumed.
    fn decode<T: Decode<Self>>(&self, bytes: &[u8]) -> Result<T> {
        let mut cursor = std::io::Cursor::new(bytes);
        let value = T::decode(*self, &mut cursor)?;
        if (cursor.position() as usize) != bytes.len() {
            return Err(Error::ExtraneousData);
        }
        Ok(value)
    }
}

/// Writes `Self` onto a byte stream using codec `c`'s wire format.
pub trait Encode<C: Codec> {
    /// Serializes `self` to `w`.
    fn encode<W: Write>(&self, c: C, w: &mut W) -> Result<()>;
}

/// Reads `Self` from a byte stream using codec `c`'s wire format.
///
/// `R: Seek` lets a decoder peek one value's header, decide it doesn't apply
/// (e.g. `Option<T>`'s null check), and rewind to let the inner type decode
/// the same bytes — the same trick the teacher's dag-cbor decoder uses
/// rather than threading a one-byte pushback buffer through every reader.
pub trait Decode<C: Codec>: Sized {
    /// Deserializes a value of type `Self` from `r`.
    fn decode<R: Read + Seek>(c: C, r: &mut R) -> Result<Self>;
}

/// Returns a permutation of `0..keys.len()` that sorts `keys` into `C`'s
/// canonical map-key order, without touching the caller's storage order.
///
/// Used by both the dynamic map encoder and the schema-driven derive output,
/// so the two paths agree byte-for-byte on the order fields/entries appear on
/// the wire.
pub fn canonical_order<C: Codec>(keys: &[impl AsRef<str>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| C::key_order(keys[a].as_ref(), keys[b].as_ref()));
    order
}
