//! Derive macros for gqlnodes type descriptors.
//!
//! `#[derive(GraphQLObject)]` turns a struct into a [`TypeDescriptor`] table:
//! one entry per field with its key, alias, arguments, variables and type
//! classification. The struct shape IS the document shape.
//!
//! # Usage
//!
//! ```ignore
//! use gqlnodes::GraphQLObject;
//!
//! #[derive(GraphQLObject, Deserialize)]
//! #[graphql(property(name = "user", argument(name = "id")))]
//! #[serde(rename_all = "camelCase")]
//! struct User {
//!     id: String,
//!     #[graphql(arguments(
//!         argument(name = "first", kind = "Integer", optional),
//!         argument(name = "after", optional),
//!     ))]
//!     repositories: Vec<Repository>,
//!     #[graphql(ignore)]
//!     local_only: bool,
//! }
//! ```
//!
//! Renders: `query { user (id:null) { id repositories { ... } } } `
//!
//! `#[derive(GraphQLScalar)]` marks a type (typically a unit-only enum or a
//! newtype) as a leaf value.
//!
//! [`TypeDescriptor`]: https://docs.rs/gqlnodes/latest/gqlnodes/schema/struct.TypeDescriptor.html

use heck::ToLowerCamelCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, parse_quote, Data, DeriveInput, Fields, LitBool, LitStr, Token};

/// Derive `GraphQLObject` (and `GraphQLField`) for a struct with named fields.
///
/// Field attributes, all under `#[graphql(...)]`:
/// - `rename = "key"`: override the camelCase field key
/// - `property(name = "alias", argument(...)...)`: alias plus arguments
/// - `arguments(argument(...), ...)` / `argument(...)`: declared arguments
/// - `variables(variable(...), ...)` / `variable(name = "x", scalar = "Int!")`
/// - `ignore`: leave the field out of the document
/// - `scalar`: treat the field as a leaf regardless of its type
/// - `flatten`: inline the fields of the field's type
///
/// Type attributes: `property(...)` and `operation(name = "...", method =
/// "query", variable(...)..., property(...))`.
#[proc_macro_derive(GraphQLObject, attributes(graphql))]
pub fn derive_graphql_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_object(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Derive `GraphQLField` as a leaf (scalar) type.
#[proc_macro_derive(GraphQLScalar)]
pub fn derive_graphql_scalar(input: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    input
        .generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: 'static));
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::gqlnodes::GraphQLField for #name #ty_generics #where_clause {
            fn field_type() -> ::gqlnodes::schema::FieldType {
                ::gqlnodes::schema::FieldType::scalar::<Self>()
            }
        }
    };
    expanded.into()
}

fn expand_object(mut input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = input.ident.clone();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.clone(),
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "GraphQLObject can only be derived on structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "GraphQLObject can only be derived on structs; use GraphQLScalar for enums",
            ));
        }
    };

    let type_attrs = TypeAttrs::parse(&input.attrs)?;

    let mut descriptors = Vec::new();
    for field in &fields {
        let field_name = field.ident.as_ref().expect("named field should have ident");
        let attrs = FieldAttrs::parse(&field.attrs)?;

        // Convert Rust snake_case field name to GraphQL camelCase.
        // Handle raw identifiers (r#type → type).
        let key = match &attrs.rename {
            Some(rename) => rename.clone(),
            None => {
                let rust_name = field_name.to_string();
                let clean_name = rust_name.strip_prefix("r#").unwrap_or(&rust_name);
                clean_name.to_lower_camel_case()
            }
        };

        let ty = &field.ty;
        let field_type = if attrs.ignore || attrs.scalar {
            quote! { ::gqlnodes::schema::FieldType::opaque() }
        } else {
            quote! { <#ty as ::gqlnodes::GraphQLField>::field_type() }
        };

        let property = option_tokens(attrs.property.as_ref());
        let arguments = match &attrs.arguments {
            Some(list) => quote! { ::core::option::Option::Some(vec![#(#list),*]) },
            None => quote! { ::core::option::Option::None },
        };
        let argument = option_tokens(attrs.argument.as_ref());
        let variables = &attrs.variables;
        let ignore = attrs.ignore;
        let flatten = attrs.flatten;

        descriptors.push(quote! {
            ::gqlnodes::schema::FieldDescriptor {
                name: #key,
                property: #property,
                arguments: #arguments,
                argument: #argument,
                variables: vec![#(#variables),*],
                ignore: #ignore,
                flatten: #flatten,
                ty: #field_type,
            }
        });
    }

    let property = option_tokens(type_attrs.property.as_ref());
    let operation = option_tokens(type_attrs.operation.as_ref());
    let type_name = name.to_string();

    input
        .generics
        .make_where_clause()
        .predicates
        .push(parse_quote!(Self: 'static));
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::gqlnodes::GraphQLField for #name #ty_generics #where_clause {
            fn field_type() -> ::gqlnodes::schema::FieldType {
                ::gqlnodes::schema::FieldType::composite::<Self>()
            }
        }

        impl #impl_generics ::gqlnodes::GraphQLObject for #name #ty_generics #where_clause {
            fn descriptor() -> ::gqlnodes::schema::TypeDescriptor {
                ::gqlnodes::schema::TypeDescriptor {
                    name: #type_name,
                    type_id: ::std::any::TypeId::of::<Self>(),
                    property: #property,
                    operation: #operation,
                    fields: vec![#(#descriptors),*],
                }
            }
        }
    })
}

fn option_tokens<T: ToTokens>(value: Option<&T>) -> TokenStream2 {
    match value {
        Some(value) => quote! { ::core::option::Option::Some(#value) },
        None => quote! { ::core::option::Option::None },
    }
}

fn option_str(value: Option<&String>) -> TokenStream2 {
    match value {
        Some(value) => quote! { ::core::option::Option::Some(#value) },
        None => quote! { ::core::option::Option::None },
    }
}

fn parse_lit_str(meta: &ParseNestedMeta) -> syn::Result<String> {
    Ok(meta.value()?.parse::<LitStr>()?.value())
}

/// Parses a flag that may be written bare (`optional`) or as `optional = true`.
fn parse_flag(meta: &ParseNestedMeta) -> syn::Result<bool> {
    if meta.input.peek(Token![=]) {
        Ok(meta.value()?.parse::<LitBool>()?.value)
    } else {
        Ok(true)
    }
}

// ── Attribute models ────────────────────────────────────────────────────────

struct ArgumentSpec {
    name: String,
    value: Option<String>,
    kind: TokenStream2,
    optional: bool,
    variable: Option<String>,
}

impl ArgumentSpec {
    fn parse(meta: &ParseNestedMeta) -> syn::Result<Self> {
        let mut name = None;
        let mut value = None;
        let mut kind = quote! { ::gqlnodes::ArgumentKind::String };
        let mut optional = false;
        let mut variable = None;

        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("name") {
                name = Some(parse_lit_str(&inner)?);
            } else if inner.path.is_ident("value") {
                value = Some(parse_lit_str(&inner)?);
            } else if inner.path.is_ident("kind") {
                let lit: LitStr = inner.value()?.parse()?;
                kind = argument_kind(&lit)?;
            } else if inner.path.is_ident("optional") {
                optional = parse_flag(&inner)?;
            } else if inner.path.is_ident("variable") {
                variable = Some(parse_lit_str(&inner)?);
            } else {
                return Err(inner.error("expected one of `name`, `value`, `kind`, `optional`, `variable`"));
            }
            Ok(())
        })?;

        let name = name.ok_or_else(|| meta.error("argument requires `name = \"...\"`"))?;
        Ok(Self {
            name,
            value,
            kind,
            optional,
            variable,
        })
    }
}

fn argument_kind(lit: &LitStr) -> syn::Result<TokenStream2> {
    match lit.value().to_ascii_lowercase().as_str() {
        "boolean" | "bool" => Ok(quote! { ::gqlnodes::ArgumentKind::Boolean }),
        "integer" | "int" => Ok(quote! { ::gqlnodes::ArgumentKind::Integer }),
        "float" => Ok(quote! { ::gqlnodes::ArgumentKind::Float }),
        "string" => Ok(quote! { ::gqlnodes::ArgumentKind::String }),
        other => Err(syn::Error::new(
            lit.span(),
            format!("unknown argument kind `{other}`, expected Boolean, Integer, Float or String"),
        )),
    }
}

impl ToTokens for ArgumentSpec {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let name = &self.name;
        let value = option_str(self.value.as_ref());
        let kind = &self.kind;
        let optional = self.optional;
        let variable = option_str(self.variable.as_ref());
        tokens.extend(quote! {
            ::gqlnodes::schema::ArgumentAttr {
                name: #name,
                value: #value,
                kind: #kind,
                optional: #optional,
                variable: #variable,
            }
        });
    }
}

struct VariableSpec {
    name: String,
    scalar: String,
}

impl VariableSpec {
    fn parse(meta: &ParseNestedMeta) -> syn::Result<Self> {
        let mut name = None;
        let mut scalar = None;
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("name") {
                name = Some(parse_lit_str(&inner)?);
            } else if inner.path.is_ident("scalar") {
                scalar = Some(parse_lit_str(&inner)?);
            } else {
                return Err(inner.error("expected `name` or `scalar`"));
            }
            Ok(())
        })?;
        let name = name.ok_or_else(|| meta.error("variable requires `name = \"...\"`"))?;
        let scalar = scalar.ok_or_else(|| meta.error("variable requires `scalar = \"...\"`"))?;
        Ok(Self { name, scalar })
    }
}

impl ToTokens for VariableSpec {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let name = &self.name;
        let scalar = &self.scalar;
        tokens.extend(quote! {
            ::gqlnodes::schema::VariableAttr { name: #name, scalar: #scalar }
        });
    }
}

struct PropertySpec {
    name: String,
    arguments: Vec<ArgumentSpec>,
}

impl PropertySpec {
    fn parse(meta: &ParseNestedMeta) -> syn::Result<Self> {
        // `property = "name"` shorthand
        if meta.input.peek(Token![=]) {
            return Ok(Self {
                name: parse_lit_str(meta)?,
                arguments: Vec::new(),
            });
        }

        let mut name = None;
        let mut arguments = Vec::new();
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("name") {
                name = Some(parse_lit_str(&inner)?);
            } else if inner.path.is_ident("argument") {
                arguments.push(ArgumentSpec::parse(&inner)?);
            } else {
                return Err(inner.error("expected `name` or `argument(...)`"));
            }
            Ok(())
        })?;
        let name = name.ok_or_else(|| meta.error("property requires `name = \"...\"`"))?;
        Ok(Self { name, arguments })
    }
}

impl ToTokens for PropertySpec {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let name = &self.name;
        let arguments = &self.arguments;
        tokens.extend(quote! {
            ::gqlnodes::schema::PropertyAttr {
                name: #name,
                arguments: vec![#(#arguments),*],
            }
        });
    }
}

struct OperationSpec {
    name: String,
    method: TokenStream2,
    variables: Vec<VariableSpec>,
    property: Option<PropertySpec>,
}

impl OperationSpec {
    fn parse(meta: &ParseNestedMeta) -> syn::Result<Self> {
        let mut name = None;
        let mut method = quote! { ::gqlnodes::Method::Query };
        let mut variables = Vec::new();
        let mut property = None;
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("name") {
                name = Some(parse_lit_str(&inner)?);
            } else if inner.path.is_ident("method") {
                let lit: LitStr = inner.value()?.parse()?;
                method = match lit.value().to_ascii_lowercase().as_str() {
                    "query" => quote! { ::gqlnodes::Method::Query },
                    "mutation" | "mutate" => quote! { ::gqlnodes::Method::Mutation },
                    other => {
                        return Err(syn::Error::new(
                            lit.span(),
                            format!("unknown method `{other}`, expected query or mutation"),
                        ))
                    }
                };
            } else if inner.path.is_ident("variable") {
                variables.push(VariableSpec::parse(&inner)?);
            } else if inner.path.is_ident("variables") {
                inner.parse_nested_meta(|var| {
                    if !var.path.is_ident("variable") {
                        return Err(var.error("expected `variable(...)`"));
                    }
                    variables.push(VariableSpec::parse(&var)?);
                    Ok(())
                })?;
            } else if inner.path.is_ident("property") {
                property = Some(PropertySpec::parse(&inner)?);
            } else {
                return Err(inner.error(
                    "expected one of `name`, `method`, `variable`, `variables`, `property`",
                ));
            }
            Ok(())
        })?;
        let name = name.ok_or_else(|| meta.error("operation requires `name = \"...\"`"))?;
        Ok(Self {
            name,
            method,
            variables,
            property,
        })
    }
}

impl ToTokens for OperationSpec {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let name = &self.name;
        let method = &self.method;
        let variables = &self.variables;
        let property = option_tokens(self.property.as_ref());
        tokens.extend(quote! {
            ::gqlnodes::schema::OperationAttr {
                name: #name,
                method: #method,
                variables: vec![#(#variables),*],
                property: #property,
            }
        });
    }
}

#[derive(Default)]
struct TypeAttrs {
    property: Option<PropertySpec>,
    operation: Option<OperationSpec>,
}

impl TypeAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("graphql")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("property") {
                    out.property = Some(PropertySpec::parse(&meta)?);
                } else if meta.path.is_ident("operation") {
                    out.operation = Some(OperationSpec::parse(&meta)?);
                } else {
                    return Err(meta.error("expected `property(...)` or `operation(...)`"));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    property: Option<PropertySpec>,
    arguments: Option<Vec<ArgumentSpec>>,
    argument: Option<ArgumentSpec>,
    variables: Vec<VariableSpec>,
    ignore: bool,
    scalar: bool,
    flatten: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        let mut single_variable = None;
        for attr in attrs.iter().filter(|a| a.path().is_ident("graphql")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    out.rename = Some(parse_lit_str(&meta)?);
                } else if meta.path.is_ident("property") {
                    out.property = Some(PropertySpec::parse(&meta)?);
                } else if meta.path.is_ident("arguments") {
                    let list = out.arguments.get_or_insert_with(Vec::new);
                    meta.parse_nested_meta(|inner| {
                        if !inner.path.is_ident("argument") {
                            return Err(inner.error("expected `argument(...)`"));
                        }
                        list.push(ArgumentSpec::parse(&inner)?);
                        Ok(())
                    })?;
                } else if meta.path.is_ident("argument") {
                    if out.argument.is_some() {
                        return Err(meta.error(
                            "duplicate `argument`; use `arguments(...)` to declare several",
                        ));
                    }
                    out.argument = Some(ArgumentSpec::parse(&meta)?);
                } else if meta.path.is_ident("variables") {
                    meta.parse_nested_meta(|inner| {
                        if !inner.path.is_ident("variable") {
                            return Err(inner.error("expected `variable(...)`"));
                        }
                        out.variables.push(VariableSpec::parse(&inner)?);
                        Ok(())
                    })?;
                } else if meta.path.is_ident("variable") {
                    if single_variable.is_some() {
                        return Err(meta.error(
                            "duplicate `variable`; use `variables(...)` to declare several",
                        ));
                    }
                    single_variable = Some(VariableSpec::parse(&meta)?);
                } else if meta.path.is_ident("ignore") {
                    out.ignore = parse_flag(&meta)?;
                } else if meta.path.is_ident("scalar") {
                    out.scalar = parse_flag(&meta)?;
                } else if meta.path.is_ident("flatten") {
                    out.flatten = parse_flag(&meta)?;
                } else {
                    return Err(meta.error("unsupported graphql field attribute"));
                }
                Ok(())
            })?;
        }
        // The list attribute contributes before the single one.
        out.variables.extend(single_variable);
        Ok(out)
    }
}
