// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `#[derive(Describe)]` for polycodec.
//!
//! Turns a named or unit struct into a `TypeShape`, read from the struct's
//! fields and its `#[polycodec(...)]` attributes.

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, Lit, LitStr,
    PathArguments, Type, TypeParamBound,
};

/// Container options from `#[polycodec(...)]` on the struct.
#[derive(Default)]
struct TypeOptions {
    identity: Option<LitStr>,
    namespace: Option<LitStr>,
    extends: Option<syn::Path>,
    is_abstract: bool,
    discriminator: Option<TokenStream2>,
    aliases: Vec<TokenStream2>,
    discriminator_field: Option<LitStr>,
}

/// Field options from `#[polycodec(...)]` on a named field.
#[derive(Default)]
struct FieldOptions {
    rename: Option<LitStr>,
    absent: bool,
    nullable: bool,
    skip: bool,
}

/// `#[derive(Describe)]` macro: generates a `polycodec::Describe` impl
///
/// Container attributes:
/// - `identity = "a::B"`: full identity (default: `module_path!()::Name`)
/// - `namespace = "a"`: identity becomes `a::Name`
/// - `extends = "Parent"`: supertype, another `Describe` type
/// - `abstract`: never instantiated directly
/// - `discriminator = "x"` or `discriminator = 3`: explicit discriminator
/// - `alias = ...`: extra discriminator accepted on decode (repeatable)
/// - `discriminator_field = "kind"`: field carrying the discriminator
///
/// Field attributes: `rename = ".."`, `absent`, `nullable`, `skip`.
///
/// Field type mapping:
/// - Primitives, `String`, `char`
/// - `Option<T>`, `Vec<T>` and other sequences, `Box<T>` / `Arc<T>` / `Rc<T>`
/// - chrono `DateTime`, `NaiveDate`, `NaiveDateTime`, `NaiveTime`, `TimeDelta`
/// - Type parameters of the struct become generic placeholders
/// - Any other path is a reference to that type's `Describe` identity
///
/// Maps, tuples and function-valued fields are reported as unsupported
/// shapes and rejected when the universe is built.
///
/// Example:
/// ```ignore
/// use polycodec::Describe;
///
/// #[derive(Describe)]
/// #[polycodec(namespace = "shop", extends = "Event")]
/// struct OrderPlaced {
///     order_id: u64,
///     placed_at: chrono::DateTime<chrono::Utc>,
///     #[polycodec(absent)]
///     coupon: Option<String>,
/// }
/// ```
#[proc_macro_derive(Describe, attributes(polycodec))]
pub fn derive_describe(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let type_name = name.to_string();
    let options = parse_type_options(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Describe requires named fields or a unit struct",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Describe only supports structs",
            ))
        }
    };

    let type_params: Vec<&Ident> = input.generics.type_params().map(|p| &p.ident).collect();
    let generic_names: Vec<String> = type_params.iter().map(|p| p.to_string()).collect();

    let mut field_shapes = Vec::with_capacity(fields.len());
    for field in fields {
        let field_options = parse_field_options(&field.attrs)?;
        if field_options.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "unnamed field"));
        };
        let field_name = match &field_options.rename {
            Some(rename) => rename.value(),
            None => ident.to_string().trim_start_matches("r#").to_string(),
        };
        let shape = shape_tokens(&field.ty, &type_params);
        let nullable = field_options.nullable;
        let absent = field_options.absent;
        field_shapes.push(quote! {
            ::polycodec::FieldShape {
                name: ::std::string::String::from(#field_name),
                shape: #shape,
                nullable: #nullable,
                absent_by_default: #absent,
                default: ::std::option::Option::None,
            }
        });
    }

    let identity = match (&options.identity, &options.namespace) {
        (Some(identity), _) => quote! { ::std::string::String::from(#identity) },
        (None, Some(namespace)) => {
            let full = format!("{}::{}", namespace.value(), type_name);
            quote! { ::std::string::String::from(#full) }
        }
        (None, None) => {
            quote! { ::std::string::String::from(concat!(module_path!(), "::", #type_name)) }
        }
    };

    let supertype = match &options.extends {
        Some(parent) => quote! {
            ::std::option::Option::Some(<#parent as ::polycodec::Describe>::type_identity())
        },
        None => quote! { ::std::option::Option::None },
    };
    let discriminator = match &options.discriminator {
        Some(value) => quote! { ::std::option::Option::Some(#value) },
        None => quote! { ::std::option::Option::None },
    };
    let discriminator_field = match &options.discriminator_field {
        Some(field) => quote! {
            ::std::option::Option::Some(::std::string::String::from(#field))
        },
        None => quote! { ::std::option::Option::None },
    };
    let aliases = &options.aliases;
    let is_abstract = options.is_abstract;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::polycodec::Describe for #name #ty_generics #where_clause {
            fn type_identity() -> ::std::string::String {
                #identity
            }

            fn type_shape() -> ::polycodec::TypeShape {
                ::polycodec::TypeShape {
                    identity: <Self as ::polycodec::Describe>::type_identity(),
                    supertype: #supertype,
                    is_abstract: #is_abstract,
                    generics: vec![#(::std::string::String::from(#generic_names)),*],
                    discriminator: #discriminator,
                    aliases: vec![#(#aliases),*],
                    discriminator_field: #discriminator_field,
                    fields: vec![#(#field_shapes),*],
                }
            }
        }
    })
}

fn parse_type_options(attrs: &[Attribute]) -> syn::Result<TypeOptions> {
    let mut options = TypeOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("polycodec")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("identity") {
                options.identity = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("namespace") {
                options.namespace = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("extends") {
                let parent: LitStr = meta.value()?.parse()?;
                options.extends = Some(parent.parse()?);
            } else if meta.path.is_ident("abstract") {
                options.is_abstract = true;
            } else if meta.path.is_ident("discriminator") {
                options.discriminator = Some(discriminator_tokens(&meta.value()?.parse()?)?);
            } else if meta.path.is_ident("alias") {
                options.aliases.push(discriminator_tokens(&meta.value()?.parse()?)?);
            } else if meta.path.is_ident("discriminator_field") {
                options.discriminator_field = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unknown polycodec container attribute"));
            }
            Ok(())
        })?;
    }

    if let (Some(identity), Some(_)) = (&options.identity, &options.namespace) {
        return Err(syn::Error::new_spanned(
            identity,
            "`identity` and `namespace` are mutually exclusive",
        ));
    }
    Ok(options)
}

fn parse_field_options(attrs: &[Attribute]) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("polycodec")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                options.rename = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("absent") {
                options.absent = true;
            } else if meta.path.is_ident("nullable") {
                options.nullable = true;
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else {
                return Err(meta.error("unknown polycodec field attribute"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

fn discriminator_tokens(lit: &Lit) -> syn::Result<TokenStream2> {
    match lit {
        Lit::Str(name) => Ok(quote! {
            ::polycodec::Discriminator::Name(::std::string::String::from(#name))
        }),
        Lit::Int(code) => {
            let code = code.base10_parse::<i64>()?;
            Ok(quote! { ::polycodec::Discriminator::Code(#code) })
        }
        other => Err(syn::Error::new_spanned(
            other,
            "discriminator must be a string or integer literal",
        )),
    }
}

/// Map a field type to a `polycodec::Shape` expression.
fn shape_tokens(ty: &Type, type_params: &[&Ident]) -> TokenStream2 {
    match ty {
        Type::Reference(reference) => shape_tokens(&reference.elem, type_params),
        Type::Paren(paren) => shape_tokens(&paren.elem, type_params),
        Type::Group(group) => shape_tokens(&group.elem, type_params),
        Type::Slice(slice) => {
            let inner = shape_tokens(&slice.elem, type_params);
            quote! { ::polycodec::Shape::seq(#inner) }
        }
        Type::Array(array) => {
            let inner = shape_tokens(&array.elem, type_params);
            quote! { ::polycodec::Shape::seq(#inner) }
        }
        Type::BareFn(_) => function_shape(ty),
        Type::TraitObject(object) if is_fn_trait(&object.bounds) => function_shape(ty),
        Type::Path(type_path) if type_path.qself.is_none() => {
            path_shape(ty, &type_path.path, type_params)
        }
        _ => opaque_shape(ty),
    }
}

fn path_shape(ty: &Type, path: &syn::Path, type_params: &[&Ident]) -> TokenStream2 {
    let Some(segment) = path.segments.last() else {
        return opaque_shape(ty);
    };

    if path.segments.len() == 1 && type_params.iter().any(|p| **p == segment.ident) {
        let placeholder = segment.ident.to_string();
        return quote! { ::polycodec::Shape::Generic(::std::string::String::from(#placeholder)) };
    }

    let ident = segment.ident.to_string();
    let primitive = match ident.as_str() {
        "bool" => Some(quote! { Bool }),
        "i8" => Some(quote! { I8 }),
        "i16" => Some(quote! { I16 }),
        "i32" => Some(quote! { I32 }),
        "i64" | "isize" => Some(quote! { I64 }),
        "u8" => Some(quote! { U8 }),
        "u16" => Some(quote! { U16 }),
        "u32" => Some(quote! { U32 }),
        "u64" | "usize" => Some(quote! { U64 }),
        "f32" => Some(quote! { F32 }),
        "f64" => Some(quote! { F64 }),
        "char" => Some(quote! { Char }),
        "String" | "str" => Some(quote! { String }),
        "DateTime" | "SystemTime" => Some(quote! { Instant }),
        "NaiveDate" => Some(quote! { Date }),
        "NaiveDateTime" => Some(quote! { DateTime }),
        "NaiveTime" => Some(quote! { Time }),
        "TimeDelta" | "Duration" => Some(quote! { Duration }),
        _ => None,
    };
    if let Some(variant) = primitive {
        return quote! { ::polycodec::Shape::#variant };
    }

    match ident.as_str() {
        "Option" => match first_type_argument(segment) {
            Some(inner) => {
                let inner = shape_tokens(inner, type_params);
                quote! { ::polycodec::Shape::option(#inner) }
            }
            None => opaque_shape(ty),
        },
        "Vec" | "VecDeque" | "LinkedList" | "BTreeSet" | "HashSet" => {
            match first_type_argument(segment) {
                Some(inner) => {
                    let inner = shape_tokens(inner, type_params);
                    quote! { ::polycodec::Shape::seq(#inner) }
                }
                None => opaque_shape(ty),
            }
        }
        "Box" | "Arc" | "Rc" | "Cow" => match first_type_argument(segment) {
            Some(inner) => shape_tokens(inner, type_params),
            None => opaque_shape(ty),
        },
        "HashMap" | "BTreeMap" => opaque_shape(ty),
        _ => quote! {
            ::polycodec::Shape::Named(<#ty as ::polycodec::Describe>::type_identity())
        },
    }
}

fn first_type_argument(segment: &syn::PathSegment) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn is_fn_trait<P>(bounds: &syn::punctuated::Punctuated<TypeParamBound, P>) -> bool {
    bounds.iter().any(|bound| match bound {
        TypeParamBound::Trait(t) => t
            .path
            .segments
            .last()
            .is_some_and(|s| matches!(s.ident.to_string().as_str(), "Fn" | "FnMut" | "FnOnce")),
        _ => false,
    })
}

fn function_shape(ty: &Type) -> TokenStream2 {
    let text = quote!(#ty).to_string();
    quote! { ::polycodec::Shape::Function(::std::string::String::from(#text)) }
}

fn opaque_shape(ty: &Type) -> TokenStream2 {
    let text = quote!(#ty).to_string();
    quote! { ::polycodec::Shape::Opaque(::std::string::String::from(#text)) }
}
