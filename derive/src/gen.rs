//! Generates `ToIpld`/`FromIpld` impl bodies from the parsed [`crate::ast`]
//! shapes. The blanket `Encode<C>`/`Decode<C>` impls in
//! `libipld_core::schema` turn these into concrete per-codec codecs for
//! free, so this module never needs to know about `DagCborCodec` or
//! `DagJsonCodec` at all.
use crate::ast::*;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};

/// Generates the `impl ToIpld for #name { ... }` block.
pub fn gen_to_ipld(ty: &SchemaType) -> TokenStream {
    match ty {
        SchemaType::Struct(s) => gen_struct_to_ipld(s),
        SchemaType::Enum(e) => gen_enum_to_ipld(e),
    }
}

/// Generates the `impl FromIpld for #name { ... }` block.
pub fn gen_from_ipld(ty: &SchemaType) -> TokenStream {
    match ty {
        SchemaType::Struct(s) => gen_struct_from_ipld(s),
        SchemaType::Enum(e) => gen_enum_from_ipld(e),
    }
}

fn field_to_ipld_expr(field: &StructField) -> TokenStream {
    let member = &field.member;
    match field.adapter {
        Some(AdapterRepr::Integer) => quote! {
            ::libipld_core::ipld::Ipld::Integer(
                ::libipld_core::schema::IpldAdapter::encode_integer(&self.#member)?
            )
        },
        Some(AdapterRepr::String) => quote! {
            ::libipld_core::ipld::Ipld::string(
                ::libipld_core::schema::IpldAdapter::write_string(&self.#member)?
            )
        },
        Some(AdapterRepr::Bytes) => quote! {
            ::libipld_core::ipld::Ipld::bytes(
                ::libipld_core::schema::IpldAdapter::write_bytes(&self.#member)?
            )
        },
        None => quote! {
            ::libipld_core::schema::ToIpld::to_ipld(&self.#member)?
        },
    }
}

fn field_from_ipld_expr(field: &StructField, value: &TokenStream) -> TokenStream {
    match field.adapter {
        Some(AdapterRepr::Integer) => quote! {
            ::libipld_core::schema::IpldAdapter::decode_integer(
                match #value {
                    ::libipld_core::ipld::Ipld::Integer(i) => *i,
                    other => return Err(::libipld_core::error::Error::invalid_type(
                        "integer", other.kind().to_string(),
                    )),
                }
            )?
        },
        Some(AdapterRepr::String) => quote! {
            ::libipld_core::schema::IpldAdapter::parse_string(
                #value.as_str().ok_or_else(|| ::libipld_core::error::Error::invalid_type(
                    "string", #value.kind().to_string(),
                ))?
            )?
        },
        Some(AdapterRepr::Bytes) => quote! {
            ::libipld_core::schema::IpldAdapter::parse_bytes(
                #value.as_bytes().ok_or_else(|| ::libipld_core::error::Error::invalid_type(
                    "bytes", #value.kind().to_string(),
                ))?
            )?
        },
        None => quote! {
            ::libipld_core::schema::FromIpld::from_ipld(#value)?
        },
    }
}

/// A cached `Rc<str>` per map field name, built once per type and cloned on
/// every `to_ipld()` call rather than re-allocated from the `&'static str`
/// literal each time.
fn field_name_cache(name: &syn::Ident, fields: &[StructField]) -> (TokenStream, Vec<TokenStream>) {
    let cache_ident = format_ident!("__IPLD_FIELD_NAMES_{}", name.to_string().to_uppercase());
    let n = fields.len();
    let wire_names = fields.iter().map(|f| f.wire_name());
    let cache = quote! {
        static #cache_ident: ::std::sync::OnceLock<[::std::rc::Rc<str>; #n]> =
            ::std::sync::OnceLock::new();
        let __names = #cache_ident.get_or_init(|| [#(::std::rc::Rc::from(#wire_names)),*]);
    };
    let accessors = (0..n).map(|i| quote! { __names[#i].clone() }).collect();
    (cache, accessors)
}

fn gen_struct_to_ipld(s: &Struct) -> TokenStream {
    let name = &s.name;
    let body = match s.repr {
        StructRepr::Null => quote! { ::libipld_core::ipld::Ipld::Null },
        StructRepr::Tuple => {
            let values = s.fields.iter().map(field_to_ipld_expr);
            quote! { ::libipld_core::ipld::Ipld::list(vec![#(#values),*]) }
        }
        StructRepr::Map => {
            let (cache, accessors) = field_name_cache(name, &s.fields);
            let values = s.fields.iter().map(field_to_ipld_expr);
            quote! {
                #cache
                let mut __map = ::libipld_core::ipld::OrderedMap::new();
                #(__map.set(#accessors, #values);)*
                ::libipld_core::ipld::Ipld::map_from(__map)
            }
        }
    };
    quote! {
        impl ::libipld_core::schema::ToIpld for #name {
            fn to_ipld(&self) -> ::libipld_core::error::Result<::libipld_core::ipld::Ipld> {
                Ok({ #body })
            }
        }
    }
}

fn gen_struct_from_ipld(s: &Struct) -> TokenStream {
    let name = &s.name;
    let body = match s.repr {
        StructRepr::Null => quote! {
            match ipld {
                ::libipld_core::ipld::Ipld::Null => Ok(#name),
                other => Err(::libipld_core::error::Error::invalid_type(
                    "null", other.kind().to_string(),
                )),
            }
        },
        StructRepr::Tuple => {
            let assigns = s.fields.iter().enumerate().map(|(i, field)| {
                let value = quote! {
                    &__elems.get(#i).ok_or_else(|| {
                        ::libipld_core::error::Error::InvalidValue(format!(
                            "missing tuple position {}", #i,
                        ))
                    })?.clone()
                };
                field_from_ipld_expr(field, &value)
            });
            quote! {
                match ipld {
                    ::libipld_core::ipld::Ipld::List(__list) => {
                        let __elems = __list.borrow();
                        Ok(#name(#(#assigns),*))
                    }
                    other => Err(::libipld_core::error::Error::invalid_type(
                        "list", other.kind().to_string(),
                    )),
                }
            }
        }
        StructRepr::Map => {
            let assigns = s.fields.iter().map(|field| {
                let member = &field.member;
                let key = field.wire_name();
                let fetch = quote! {
                    &ipld.get_key(#key).ok_or_else(|| {
                        ::libipld_core::error::Error::InvalidValue(format!(
                            "missing field {:?}", #key,
                        ))
                    })?
                };
                let expr = field_from_ipld_expr(field, &fetch);
                quote! { #member: #expr }
            });
            quote! {
                match ipld {
                    ::libipld_core::ipld::Ipld::Map(_) => Ok(#name { #(#assigns),* }),
                    other => Err(::libipld_core::error::Error::invalid_type(
                        "map", other.kind().to_string(),
                    )),
                }
            }
        }
    };
    let check_record_shape = match s.repr {
        StructRepr::Map => {
            let (cache, _accessors) = field_name_cache(name, &s.fields);
            quote! {
                fn check_record_shape(
                    ipld: &::libipld_core::ipld::Ipld,
                    strict: bool,
                    key_order: fn(&str, &str) -> ::std::cmp::Ordering,
                ) -> ::libipld_core::error::Result<()> {
                    #cache
                    match ipld {
                        ::libipld_core::ipld::Ipld::Map(__map) => {
                            let __map = __map.borrow();
                            if __map.len() != __names.len() {
                                return Err(::libipld_core::error::Error::InvalidValue(format!(
                                    "expected {} field(s), found {}", __names.len(), __map.len(),
                                )));
                            }
                            for (__key, _) in __map.iter() {
                                if !__names.iter().any(|n| n.as_ref() == __key) {
                                    return Err(::libipld_core::error::Error::InvalidValue(format!(
                                        "unrecognized field {:?}", __key,
                                    )));
                                }
                            }
                            if strict {
                                let __actual: Vec<&str> = __map.keys().collect();
                                let mut __expected: Vec<&str> =
                                    __names.iter().map(|n| n.as_ref()).collect();
                                __expected.sort_by(|a, b| key_order(a, b));
                                if __actual != __expected {
                                    return Err(::libipld_core::error::Error::Strict(format!(
                                        "struct fields out of canonical order: expected {:?}, found {:?}",
                                        __expected, __actual,
                                    )));
                                }
                            }
                            Ok(())
                        }
                        other => Err(::libipld_core::error::Error::invalid_type(
                            "map", other.kind().to_string(),
                        )),
                    }
                }
            }
        }
        StructRepr::Tuple | StructRepr::Null => quote! {},
    };
    quote! {
        impl ::libipld_core::schema::FromIpld for #name {
            fn from_ipld(ipld: &::libipld_core::ipld::Ipld) -> ::libipld_core::error::Result<Self> {
                #body
            }
            #check_record_shape
        }
    }
}

fn gen_enum_to_ipld(e: &Enum) -> TokenStream {
    let name = &e.name;
    let arms = e.variants.iter().map(|v| {
        let variant = &v.name;
        match e.repr {
            EnumRepr::Integer => {
                let d = v.discriminant;
                quote! { #name::#variant => ::libipld_core::ipld::Ipld::Integer(#d) }
            }
            EnumRepr::String => {
                let wire = v.wire_name();
                quote! { #name::#variant => ::libipld_core::ipld::Ipld::string(#wire) }
            }
        }
    });
    quote! {
        impl ::libipld_core::schema::ToIpld for #name {
            fn to_ipld(&self) -> ::libipld_core::error::Result<::libipld_core::ipld::Ipld> {
                Ok(match self { #(#arms),* })
            }
        }
    }
}

fn gen_enum_from_ipld(e: &Enum) -> TokenStream {
    let name = &e.name;
    let body = match e.repr {
        EnumRepr::Integer => {
            let arms = e.variants.iter().map(|v| {
                let variant = &v.name;
                let d = v.discriminant;
                quote! { #d => Ok(#name::#variant) }
            });
            quote! {
                match ipld {
                    ::libipld_core::ipld::Ipld::Integer(__tag) => match *__tag {
                        #(#arms,)*
                        other => Err(::libipld_core::error::Error::InvalidValue(format!(
                            "unrecognized {} discriminant {}", stringify!(#name), other,
                        ))),
                    },
                    other => Err(::libipld_core::error::Error::invalid_type(
                        "integer", other.kind().to_string(),
                    )),
                }
            }
        }
        EnumRepr::String => {
            let arms = e.variants.iter().map(|v| {
                let variant = &v.name;
                let wire = v.wire_name();
                quote! { #wire => Ok(#name::#variant) }
            });
            quote! {
                match ipld.as_str() {
                    Some(__tag) => match __tag {
                        #(#arms,)*
                        other => Err(::libipld_core::error::Error::InvalidValue(format!(
                            "unrecognized {} variant {:?}", stringify!(#name), other,
                        ))),
                    },
                    None => Err(::libipld_core::error::Error::invalid_type(
                        "string", ipld.kind().to_string(),
                    )),
                }
            }
        }
    };
    quote! {
        impl ::libipld_core::schema::FromIpld for #name {
            fn from_ipld(ipld: &::libipld_core::ipld::Ipld) -> ::libipld_core::error::Result<Self> {
                #body
            }
        }
    }
}
