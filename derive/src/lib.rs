//! Derive macros generating [`libipld_core::schema::ToIpld`]/
//! [`libipld_core::schema::FromIpld`] impls from a type's shape, so a static
//! record or fieldless enum gets a codec-generic `Encode`/`Decode` through
//! the blanket impls in `libipld_core::schema` without hand-writing one.
extern crate proc_macro;

mod ast;
mod gen;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// `#[derive(ToIpld)]`: generates `impl ToIpld for #name`.
///
/// Structs with named fields become an `Ipld::Map` keyed by field name;
/// tuple structs become an `Ipld::List`; unit structs become `Ipld::Null`.
/// Fieldless enums become an `Ipld::Integer` tag (the default) or an
/// `Ipld::String` tag under `#[ipld(repr = "string")]`.
///
/// Field-level `#[ipld(rename = "...")]` overrides the wire key/variant
/// name; `#[ipld(adapter = "integer" | "string" | "bytes")]` routes a field
/// through `libipld_core::schema::IpldAdapter` instead of recursing through
/// `ToIpld`.
#[proc_macro_derive(ToIpld, attributes(ipld))]
pub fn derive_to_ipld(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ty = match parse::parse(&input) {
        Ok(ty) => ty,
        Err(e) => return e.to_compile_error().into(),
    };
    gen::gen_to_ipld(&ty).into()
}

/// `#[derive(FromIpld)]`: generates `impl FromIpld for #name`, the inverse
/// of `#[derive(ToIpld)]`. See its documentation for the representation
/// rules and supported attributes.
#[proc_macro_derive(FromIpld, attributes(ipld))]
pub fn derive_from_ipld(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let ty = match parse::parse(&input) {
        Ok(ty) => ty,
        Err(e) => return e.to_compile_error().into(),
    };
    gen::gen_from_ipld(&ty).into()
}
