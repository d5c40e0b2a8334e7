//! The IPLD value model: a tagged union over the nine IPLD kinds.
pub mod ordered_map;
pub mod shared;

pub use ordered_map::OrderedMap;
pub use shared::Shared;

use crate::error::MismatchError;
use cid::Cid;
use std::cell::RefCell;
use std::fmt;

/// The nine-variant tag of an [`Ipld`] value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool,
    /// A signed 64-bit integer.
    Integer,
    /// An IEEE-754 binary64 float, never NaN or infinite.
    Float,
    /// A UTF-8 octet sequence.
    String,
    /// An arbitrary octet sequence.
    Bytes,
    /// An ordered sequence of values.
    List,
    /// An ordered mapping from string keys to values.
    Map,
    /// A content identifier pointing at another block.
    Link,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "boolean",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bytes => "bytes",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Link => "link",
        };
        f.write_str(name)
    }
}

/// A reference-counted, heterogeneous IPLD tree.
///
/// `String`, `Bytes`, `List` and `Map` are heap kinds, wrapped in [`Shared`]
/// so cloning an `Ipld` that holds a large list does not copy its contents —
/// it bumps a strong count, exactly as `ref()`/`unref()` are described in the
/// data model. `List` and `Map` additionally need interior mutability for
/// their mutation methods, so they hold a `Shared<RefCell<_>>`.
#[derive(Clone)]
pub enum Ipld {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An IEEE-754 binary64 float. Never NaN or infinite.
    Float(f64),
    /// A UTF-8 octet sequence.
    String(Shared<str>),
    /// An arbitrary octet sequence.
    Bytes(Shared<[u8]>),
    /// An ordered sequence of values.
    List(Shared<RefCell<Vec<Ipld>>>),
    /// An ordered mapping from string keys to values.
    Map(Shared<RefCell<OrderedMap>>),
    /// A content identifier.
    Link(Cid),
}

impl Ipld {
    /// The kind tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Ipld::Null => Kind::Null,
            Ipld::Bool(_) => Kind::Bool,
            Ipld::Integer(_) => Kind::Integer,
            Ipld::Float(_) => Kind::Float,
            Ipld::String(_) => Kind::String,
            Ipld::Bytes(_) => Kind::Bytes,
            Ipld::List(_) => Kind::List,
            Ipld::Map(_) => Kind::Map,
            Ipld::Link(_) => Kind::Link,
        }
    }

    /// Builds a string value, copying `s` onto the heap.
    pub fn string(s: impl Into<String>) -> Self {
        Ipld::String(Shared::from(s.into()))
    }

    /// Builds a bytes value, copying `b` onto the heap.
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Ipld::Bytes(Shared::from(b.into()))
    }

    /// Builds a list value from already-constructed elements, consuming them
    /// without incrementing their counts (the "initial values" bulk
    /// constructor described in the data model).
    pub fn list(elements: impl Into<Vec<Ipld>>) -> Self {
        Ipld::List(Shared::new(RefCell::new(elements.into())))
    }

    /// Builds an empty map.
    pub fn map() -> Self {
        Ipld::Map(Shared::new(RefCell::new(OrderedMap::new())))
    }

    /// Builds a map value from already-constructed entries.
    pub fn map_from(entries: OrderedMap) -> Self {
        Ipld::Map(Shared::new(RefCell::new(entries)))
    }

    /// `Some(&str)` if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Ipld::String(s) => Some(s),
            _ => None,
        }
    }

    /// `Some(&[u8])` if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Ipld::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Number of elements, for `List`, or entries, for `Map`. Panics if
    /// called on any other kind — a programming error, matching the data
    /// model's "infallible except allocation" contract for well-typed calls.
    pub fn len(&self) -> usize {
        match self {
            Ipld::List(list) => list.borrow().len(),
            Ipld::Map(map) => map.borrow().len(),
            other => panic!("len() called on a {}", other.kind()),
        }
    }

    /// True if a `List`/`Map` has no elements/entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `List::get`: the element at `index`, cloned (a cheap `ref()` for heap
    /// kinds).
    pub fn get(&self, index: usize) -> Option<Ipld> {
        match self {
            Ipld::List(list) => list.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// `List::append`: pushes `value` onto the end.
    pub fn append(&self, value: Ipld) {
        match self {
            Ipld::List(list) => list.borrow_mut().push(value),
            other => panic!("append() called on a {}", other.kind()),
        }
    }

    /// `List::insert`: inserts `value` at position `index`, shifting later
    /// elements right.
    pub fn insert(&self, index: usize, value: Ipld) {
        match self {
            Ipld::List(list) => list.borrow_mut().insert(index, value),
            other => panic!("insert() called on a {}", other.kind()),
        }
    }

    /// `List::remove`: removes and returns the element at `index`.
    pub fn remove(&self, index: usize) -> Ipld {
        match self {
            Ipld::List(list) => list.borrow_mut().remove(index),
            other => panic!("remove() called on a {}", other.kind()),
        }
    }

    /// `List::pop`: removes and returns the last element, if any.
    pub fn pop(&self) -> Option<Ipld> {
        match self {
            Ipld::List(list) => list.borrow_mut().pop(),
            other => panic!("pop() called on a {}", other.kind()),
        }
    }

    /// `Map::get`: the value stored under `key`, cloned.
    pub fn get_key(&self, key: &str) -> Option<Ipld> {
        match self {
            Ipld::Map(map) => map.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// `Map::set`: inserts or overwrites the entry for `key`.
    pub fn set_key(&self, key: impl Into<std::rc::Rc<str>>, value: Ipld) {
        match self {
            Ipld::Map(map) => {
                map.borrow_mut().set(key, value);
            }
            other => panic!("set() called on a {}", other.kind()),
        }
    }

    /// `Map::delete`: removes the entry for `key`, if present.
    pub fn delete_key(&self, key: &str) -> Option<Ipld> {
        match self {
            Ipld::Map(map) => map.borrow_mut().delete(key),
            other => panic!("delete() called on a {}", other.kind()),
        }
    }

    /// Structural equality per the data model: same kind and, for
    /// containers, same length with pointwise-equal children (map equality
    /// is order-independent, list equality is not).
    pub fn expect_eq(&self, expected: &Ipld) -> Result<(), MismatchError> {
        expect_eq_at(self, expected, "$")
    }
}

fn expect_eq_at(actual: &Ipld, expected: &Ipld, path: &str) -> Result<(), MismatchError> {
    if actual.kind() != expected.kind() {
        return Err(MismatchError(format!(
            "{path}: kind mismatch, expected {}, found {}",
            expected.kind(),
            actual.kind()
        )));
    }
    match (actual, expected) {
        (Ipld::Null, Ipld::Null) => Ok(()),
        (Ipld::Bool(a), Ipld::Bool(b)) if a == b => Ok(()),
        (Ipld::Integer(a), Ipld::Integer(b)) if a == b => Ok(()),
        (Ipld::Float(a), Ipld::Float(b)) if a == b => Ok(()),
        (Ipld::String(a), Ipld::String(b)) if **a == **b => Ok(()),
        (Ipld::Bytes(a), Ipld::Bytes(b)) if **a == **b => Ok(()),
        (Ipld::Link(a), Ipld::Link(b)) if a == b => Ok(()),
        (Ipld::List(a), Ipld::List(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            if a.len() != b.len() {
                return Err(MismatchError(format!(
                    "{path}: list length mismatch, expected {}, found {}",
                    b.len(),
                    a.len()
                )));
            }
            for (i, (av, bv)) in a.iter().zip(b.iter()).enumerate() {
                expect_eq_at(av, bv, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        (Ipld::Map(a), Ipld::Map(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            if a.len() != b.len() {
                return Err(MismatchError(format!(
                    "{path}: map length mismatch, expected {}, found {}",
                    b.len(),
                    a.len()
                )));
            }
            for (k, bv) in b.iter() {
                match a.get(k) {
                    Some(av) => expect_eq_at(av, bv, &format!("{path}.{k}"))?,
                    None => {
                        return Err(MismatchError(format!("{path}: missing key {k:?}")));
                    }
                }
            }
            Ok(())
        }
        _ => Err(MismatchError(format!(
            "{path}: {} values differ",
            actual.kind()
        ))),
    }
}

impl PartialEq for Ipld {
    fn eq(&self, other: &Self) -> bool {
        self.expect_eq(other).is_ok()
    }
}

const DEBUG_DEPTH_LIMIT: usize = 64;

impl fmt::Debug for Ipld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_at(self, f, 0)
    }
}

fn fmt_at(ipld: &Ipld, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    if depth > DEBUG_DEPTH_LIMIT {
        return f.write_str("...");
    }
    match ipld {
        Ipld::Null => f.write_str("null"),
        Ipld::Bool(b) => write!(f, "{b}"),
        Ipld::Integer(i) => write!(f, "{i}"),
        Ipld::Float(v) => write!(f, "{v}"),
        Ipld::String(s) => write!(f, "{s:?}"),
        Ipld::Bytes(b) => write!(f, "bytes({} bytes)", b.len()),
        Ipld::List(list) => {
            f.write_str("[")?;
            for (i, elem) in list.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                fmt_at(elem, f, depth + 1)?;
            }
            f.write_str("]")
        }
        Ipld::Map(map) => {
            f.write_str("{")?;
            for (i, (k, v)) in map.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{k:?}: ")?;
                fmt_at(v, f, depth + 1)?;
            }
            f.write_str("}")
        }
        Ipld::Link(cid) => write!(f, "link({cid})"),
    }
}

impl From<bool> for Ipld {
    fn from(b: bool) -> Self {
        Ipld::Bool(b)
    }
}

impl From<i64> for Ipld {
    fn from(i: i64) -> Self {
        Ipld::Integer(i)
    }
}

impl From<f64> for Ipld {
    fn from(f: f64) -> Self {
        Ipld::Float(f)
    }
}

impl From<&str> for Ipld {
    fn from(s: &str) -> Self {
        Ipld::string(s)
    }
}

impl From<String> for Ipld {
    fn from(s: String) -> Self {
        Ipld::string(s)
    }
}

impl From<Cid> for Ipld {
    fn from(cid: Cid) -> Self {
        Ipld::Link(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_append_is_visible_through_shared_clone() {
        let list = Ipld::list(vec![Ipld::Integer(1)]);
        let alias = list.clone();
        alias.append(Ipld::Integer(2));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn map_equality_is_order_independent() {
        let mut a = OrderedMap::new();
        a.set("x", Ipld::Integer(1));
        a.set("y", Ipld::Integer(2));
        let mut b = OrderedMap::new();
        b.set("y", Ipld::Integer(2));
        b.set("x", Ipld::Integer(1));
        assert_eq!(Ipld::map_from(a), Ipld::map_from(b));
    }

    #[test]
    fn list_equality_is_order_sensitive() {
        let a = Ipld::list(vec![Ipld::Integer(1), Ipld::Integer(2)]);
        let b = Ipld::list(vec![Ipld::Integer(2), Ipld::Integer(1)]);
        assert!(a.expect_eq(&b).is_err());
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let err = Ipld::Null.expect_eq(&Ipld::Bool(true)).unwrap_err();
        assert!(err.to_string().contains("kind mismatch"));
    }
}
