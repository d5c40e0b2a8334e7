//! Canonical CBOR encoding: minimal argument widths, 8-byte floats only, and
//! length-then-lexicographic map key order.
use crate::DagCborCodec;
use byteorder::{BigEndian, ByteOrder};
use cid::Cid;
use libipld_core::codec::{canonical_order, Encode};
use libipld_core::error::{Error, Result};
use libipld_core::ipld::Ipld;
use std::io::Write;

/// Writes a header (major type + argument) using the narrowest encoding that
/// represents `value`, which is what makes this encoder's output canonical.
pub(crate) fn write_header<W: Write>(w: &mut W, major: u8, value: u64) -> Result<()> {
    let top = major << 5;
    if value <= 23 {
        w.write_all(&[top | value as u8])?;
    } else if value <= u8::MAX as u64 {
        w.write_all(&[top | 24, value as u8])?;
    } else if value <= u16::MAX as u64 {
        let mut buf = [top | 25, 0, 0];
        BigEndian::write_u16(&mut buf[1..], value as u16);
        w.write_all(&buf)?;
    } else if value <= u32::MAX as u64 {
        let mut buf = [top | 26, 0, 0, 0, 0];
        BigEndian::write_u32(&mut buf[1..], value as u32);
        w.write_all(&buf)?;
    } else {
        let mut buf = [top | 27, 0, 0, 0, 0, 0, 0, 0, 0];
        BigEndian::write_u64(&mut buf[1..], value);
        w.write_all(&buf)?;
    }
    Ok(())
}

fn write_null<W: Write>(w: &mut W) -> Result<()> {
    w.write_all(&[0xf6])?;
    Ok(())
}

impl Encode<DagCborCodec> for bool {
    fn encode<W: Write>(&self, _c: DagCborCodec, w: &mut W) -> Result<()> {
        w.write_all(&[if *self { 0xf5 } else { 0xf4 }])?;
        Ok(())
    }
}

macro_rules! impl_unsigned_encode {
    ($($t:ty),*) => {
        $(
            impl Encode<DagCborCodec> for $t {
                fn encode<W: Write>(&self, _c: DagCborCodec, w: &mut W) -> Result<()> {
                    write_header(w, 0, *self as u64)
                }
            }
        )*
    };
}
impl_unsigned_encode!(u8, u16, u32, u64);

macro_rules! impl_signed_encode {
    ($($t:ty),*) => {
        $(
            impl Encode<DagCborCodec> for $t {
                fn encode<W: Write>(&self, _c: DagCborCodec, w: &mut W) -> Result<()> {
                    if *self < 0 {
                        write_header(w, 1, (-1 - *self as i64) as u64)
                    } else {
                        write_header(w, 0, *self as u64)
                    }
                }
            }
        )*
    };
}
impl_signed_encode!(i8, i16, i32, i64);

impl Encode<DagCborCodec> for f32 {
    fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
        (*self as f64).encode(c, w)
    }
}

impl Encode<DagCborCodec> for f64 {
    fn encode<W: Write>(&self, _c: DagCborCodec, w: &mut W) -> Result<()> {
        if !self.is_finite() {
            return Err(Error::UnsupportedValue(
                "cannot encode a NaN or infinite float".into(),
            ));
        }
        let mut buf = [0xfb, 0, 0, 0, 0, 0, 0, 0, 0];
        BigEndian::write_f64(&mut buf[1..], *self);
        w.write_all(&buf)?;
        Ok(())
    }
}

impl Encode<DagCborCodec> for [u8] {
    fn encode<W: Write>(&self, _c: DagCborCodec, w: &mut W) -> Result<()> {
        write_header(w, 2, self.len() as u64)?;
        w.write_all(self)?;
        Ok(())
    }
}

impl Encode<DagCborCodec> for Vec<u8> {
    fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
        self[..].encode(c, w)
    }
}

impl Encode<DagCborCodec> for Box<[u8]> {
    fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
        self[..].encode(c, w)
    }
}

impl Encode<DagCborCodec> for str {
    fn encode<W: Write>(&self, _c: DagCborCodec, w: &mut W) -> Result<()> {
        write_header(w, 3, self.len() as u64)?;
        w.write_all(self.as_bytes())?;
        Ok(())
    }
}

impl Encode<DagCborCodec> for String {
    fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
        self.as_str().encode(c, w)
    }
}

impl Encode<DagCborCodec> for Cid {
    fn encode<W: Write>(&self, _c: DagCborCodec, w: &mut W) -> Result<()> {
        write_header(w, 6, 42)?;
        let buf = self.to_bytes();
        write_header(w, 2, buf.len() as u64 + 1)?;
        w.write_all(&[0])?;
        w.write_all(&buf)?;
        Ok(())
    }
}

impl<T: Encode<DagCborCodec>> Encode<DagCborCodec> for Option<T> {
    fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
        match self {
            Some(value) => value.encode(c, w),
            None => write_null(w),
        }
    }
}

impl<T: Encode<DagCborCodec>> Encode<DagCborCodec> for Vec<T> {
    fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
        write_header(w, 4, self.len() as u64)?;
        for value in self {
            value.encode(c, w)?;
        }
        Ok(())
    }
}

macro_rules! impl_tuple_encode {
    ($len:expr; $($name:ident : $idx:tt),+) => {
        impl<$($name: Encode<DagCborCodec>),+> Encode<DagCborCodec> for ($($name,)+) {
            fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
                write_header(w, 4, $len)?;
                $(self.$idx.encode(c, w)?;)+
                Ok(())
            }
        }
    };
}
impl_tuple_encode!(1; A:0);
impl_tuple_encode!(2; A:0, B:1);
impl_tuple_encode!(3; A:0, B:1, C:2);
impl_tuple_encode!(4; A:0, B:1, C:2, D:3);

impl Encode<DagCborCodec> for Ipld {
    fn encode<W: Write>(&self, c: DagCborCodec, w: &mut W) -> Result<()> {
        match self {
            Ipld::Null => write_null(w),
            Ipld::Bool(b) => b.encode(c, w),
            Ipld::Integer(i) => i.encode(c, w),
            Ipld::Float(f) => f.encode(c, w),
            Ipld::Bytes(b) => b.as_ref().encode(c, w),
            Ipld::String(s) => s.as_ref().encode(c, w),
            Ipld::List(list) => {
                let list = list.borrow();
                write_header(w, 4, list.len() as u64)?;
                for value in list.iter() {
                    value.encode(c, w)?;
                }
                Ok(())
            }
            Ipld::Map(map) => {
                let map = map.borrow();
                write_header(w, 5, map.len() as u64)?;
                let keys: Vec<&str> = map.keys().collect();
                for idx in canonical_order::<DagCborCodec>(&keys) {
                    let (key, value) = map.get_index(idx).expect("index in range");
                    key.encode(c, w)?;
                    value.encode(c, w)?;
                }
                Ok(())
            }
            Ipld::Link(cid) => cid.encode(c, w),
        }
    }
}
