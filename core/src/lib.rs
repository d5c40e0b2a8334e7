//! Core ipld types used by ipld codecs.
#![deny(missing_docs)]
#![deny(warnings)]

pub mod codec;
pub mod error;
pub mod ipld;
pub mod link;
pub mod schema;

pub use cid;
pub use multibase;
pub use multihash;
