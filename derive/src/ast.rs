//! The parsed shape of a `#[derive(ToIpld)]`/`#[derive(FromIpld)]` input,
//! independent of `syn`'s token-level representation.
use syn::Ident;

/// What a type derives `ToIpld`/`FromIpld` as.
#[derive(Clone, Debug)]
pub enum SchemaType {
    /// A struct (named fields, tuple fields, or no fields).
    Struct(Struct),
    /// A fieldless (C-like) enum.
    Enum(Enum),
}

/// A struct's shape: its fields and how they map onto an `Ipld` value.
#[derive(Clone, Debug)]
pub struct Struct {
    pub name: Ident,
    pub fields: Vec<StructField>,
    pub repr: StructRepr,
}

/// How a struct's fields map onto an `Ipld` value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructRepr {
    /// Named fields become an `Ipld::Map` keyed by field name (or its
    /// `#[ipld(rename = "...")]` override).
    Map,
    /// Unnamed fields become an `Ipld::List` in declaration order.
    Tuple,
    /// No fields: the unit value maps to `Ipld::Null`.
    Null,
}

/// A single field of a derived struct (or tuple-struct position).
#[derive(Clone, Debug)]
pub struct StructField {
    /// The field's name (named fields) or position (tuple fields).
    pub member: syn::Member,
    /// The field's declared type, used to decide whether a custom
    /// [`crate::gen`] adapter dispatch or the default `ToIpld`/`FromIpld`
    /// recursion applies.
    pub ty: syn::Type,
    /// `#[ipld(rename = "...")]`: the map key to use instead of the field's
    /// Rust name. Only meaningful for `StructRepr::Map`.
    pub rename: Option<String>,
    /// `#[ipld(adapter = "integer" | "string" | "bytes")]`: route this
    /// field's value through the matching pair of
    /// `libipld_core::schema::IpldAdapter` methods instead of recursing
    /// through `ToIpld`/`FromIpld`.
    pub adapter: Option<AdapterRepr>,
}

impl StructField {
    /// The wire key for a `StructRepr::Map` field: the rename override, or
    /// the field's own name.
    pub fn wire_name(&self) -> String {
        match &self.rename {
            Some(name) => name.clone(),
            None => match &self.member {
                syn::Member::Named(ident) => ident.to_string(),
                syn::Member::Unnamed(index) => index.index.to_string(),
            },
        }
    }
}

/// Which `IpldAdapter` method pair a `#[ipld(adapter = "...")]` field uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterRepr {
    Integer,
    String,
    Bytes,
}

/// A fieldless enum's shape.
#[derive(Clone, Debug)]
pub struct Enum {
    pub name: Ident,
    pub variants: Vec<EnumVariant>,
    pub repr: EnumRepr,
}

/// How an enum variant maps onto an `Ipld` value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumRepr {
    /// Each variant is its declaration index (or explicit discriminant) as
    /// an `Ipld::Integer`. The default, matching the data model's preference
    /// for compact wire representations.
    Integer,
    /// Each variant is its name (or `#[ipld(rename = "...")]` override) as
    /// an `Ipld::String`.
    String,
}

/// A single variant of a derived fieldless enum.
#[derive(Clone, Debug)]
pub struct EnumVariant {
    pub name: Ident,
    pub rename: Option<String>,
    /// The integer this variant encodes/decodes as under `EnumRepr::Integer`
    /// — either an explicit Rust discriminant (`Variant = 5`) or its
    /// declaration index.
    pub discriminant: i64,
}

impl EnumVariant {
    /// The wire string for `EnumRepr::String`: the rename override, or the
    /// variant's own name.
    pub fn wire_name(&self) -> String {
        self.rename.clone().unwrap_or_else(|| self.name.to_string())
    }
}
