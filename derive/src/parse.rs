//! Turns a `syn::DeriveInput` into the [`crate::ast`] shapes `gen` consumes,
//! reading `#[ipld(...)]` container/field/variant attributes along the way.
use crate::ast::*;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Expr, ExprLit, ExprUnary, Lit, UnOp};

/// Parses the input to a `#[derive(ToIpld)]`/`#[derive(FromIpld)]` invocation.
pub fn parse(input: &DeriveInput) -> syn::Result<SchemaType> {
    match &input.data {
        Data::Struct(data) => {
            let repr = struct_repr(&data.fields);
            Ok(SchemaType::Struct(parse_struct(
                input.ident.clone(),
                &data.fields,
                repr,
            )))
        }
        Data::Enum(data) => {
            let repr = enum_repr(&input.attrs)?;
            Ok(SchemaType::Enum(parse_enum(
                input.ident.clone(),
                data,
                repr,
            )?))
        }
        Data::Union(data) => Err(syn::Error::new(
            data.union_token.span(),
            "ToIpld/FromIpld cannot be derived for a native Rust union",
        )),
    }
}

fn struct_repr(fields: &syn::Fields) -> StructRepr {
    match fields {
        syn::Fields::Named(_) => StructRepr::Map,
        syn::Fields::Unnamed(_) => StructRepr::Tuple,
        syn::Fields::Unit => StructRepr::Null,
    }
}

fn parse_struct(name: syn::Ident, fields: &syn::Fields, repr: StructRepr) -> Struct {
    let fields = fields
        .iter()
        .enumerate()
        .map(|(i, field)| parse_field(i, field))
        .collect();
    Struct { name, fields, repr }
}

fn parse_field(index: usize, field: &syn::Field) -> StructField {
    let member = match &field.ident {
        Some(ident) => syn::Member::Named(ident.clone()),
        None => syn::Member::Unnamed(syn::Index {
            index: index as u32,
            span: field.ty.span(),
        }),
    };
    let mut rename = None;
    let mut adapter = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("ipld") {
            continue;
        }
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value = meta.value()?;
                let lit: syn::LitStr = value.parse()?;
                rename = Some(lit.value());
            } else if meta.path.is_ident("adapter") {
                let value = meta.value()?;
                let lit: syn::LitStr = value.parse()?;
                adapter = Some(match lit.value().as_str() {
                    "integer" => AdapterRepr::Integer,
                    "string" => AdapterRepr::String,
                    "bytes" => AdapterRepr::Bytes,
                    other => {
                        return Err(meta.error(format!(
                            "unknown ipld adapter representation {other:?}, expected \
                             \"integer\", \"string\" or \"bytes\""
                        )))
                    }
                });
            }
            Ok(())
        });
    }
    StructField {
        member,
        ty: field.ty.clone(),
        rename,
        adapter,
    }
}

fn enum_repr(attrs: &[syn::Attribute]) -> syn::Result<EnumRepr> {
    let mut repr = None;
    for attr in attrs {
        if !attr.path().is_ident("ipld") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("repr") {
                let value = meta.value()?;
                let lit: syn::LitStr = value.parse()?;
                repr = Some(match lit.value().as_str() {
                    "integer" => EnumRepr::Integer,
                    "string" => EnumRepr::String,
                    other => {
                        return Err(meta.error(format!(
                            "unknown ipld enum representation {other:?}, expected \
                             \"integer\" or \"string\""
                        )))
                    }
                });
            }
            Ok(())
        })?;
    }
    Ok(repr.unwrap_or(EnumRepr::Integer))
}

fn parse_enum(name: syn::Ident, data: &syn::DataEnum, repr: EnumRepr) -> syn::Result<Enum> {
    let mut next_discriminant = 0i64;
    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if variant.fields != syn::Fields::Unit {
            return Err(syn::Error::new(
                variant.span(),
                "ToIpld/FromIpld only supports fieldless (C-like) enum variants",
            ));
        }
        let discriminant = match &variant.discriminant {
            Some((_, expr)) => eval_discriminant(expr)?,
            None => next_discriminant,
        };
        next_discriminant = discriminant + 1;

        let mut rename = None;
        for attr in &variant.attrs {
            if !attr.path().is_ident("ipld") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value = meta.value()?;
                    let lit: syn::LitStr = value.parse()?;
                    rename = Some(lit.value());
                }
                Ok(())
            })?;
        }
        variants.push(EnumVariant {
            name: variant.ident.clone(),
            rename,
            discriminant,
        });
    }
    Ok(Enum {
        name,
        variants,
        repr,
    })
}

fn eval_discriminant(expr: &Expr) -> syn::Result<i64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => eval_discriminant(expr).map(|v| -v),
        other => Err(syn::Error::new(
            other.span(),
            "enum discriminant must be an integer literal",
        )),
    }
}
