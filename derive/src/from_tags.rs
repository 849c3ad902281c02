use std::collections::{BTreeMap, HashSet};

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitInt, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    parse_quote,
    spanned::Spanned,
};

pub(crate) fn expand_from_tags(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromTags` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromTags` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    // Cases of each generated method, keyed by the primitive it receives.
    let mut methods: BTreeMap<Primitive, Vec<(Vec<LitInt>, Ident, Option<Handler>)>> =
        BTreeMap::new();
    let mut seen: HashSet<u8> = HashSet::new();

    for field in fields {
        for tag in &field.tags {
            if !seen.insert(tag.base10_parse()?) {
                Err(Error::new(tag.span(), "Tags must be unique."))?
            }
        }

        methods
            .entry(field.primitive)
            .or_default()
            .push((field.tags, field.name, field.handler));
    }

    let methods = methods.into_iter().map(|(primitive, fields)| {
        let cases = fields.into_iter().map(|(tags, name, handler)| {
            let assignment = if let Some(Handler {
                field_type,
                acc,
                val,
                body,
            }) = handler
            {
                quote! {
                    (|#acc: &mut #field_type, #val| { #body })(&mut self.#name, value)
                }
            } else {
                quote! {
                    self.#name = Some(value)
                }
            };

            quote! { #(#tags)|* => { #assignment } }
        });

        let method = format_ident!("add_{}", primitive.name());
        let value_type = primitive.value_type();

        quote! {
            fn #method(&mut self, tag: u8, value: #value_type) {
                match tag {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl FromTags for #name {
            #(#methods)*
        }
    };

    Ok(expanded.into())
}

/// A primitive published by the tag walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Primitive {
    U8,
    U16,
    I16,
    U32,
    Bytes,
}

impl Primitive {
    fn from_type(ty: &Type) -> Result<Self> {
        let error = || {
            Error::new_spanned(
                ty,
                "Tagged values must be one of `u8`, `u16`, `i16`, `u32` or `&[u8]`.",
            )
        };

        match ty {
            Type::Reference(reference) => match &*reference.elem {
                Type::Slice(slice) if Self::from_type(&slice.elem)? == Self::U8 => {
                    Ok(Self::Bytes)
                }
                _ => Err(error()),
            },
            Type::Path(path) => match path.path.get_ident() {
                Some(ident) if ident == "u8" => Ok(Self::U8),
                Some(ident) if ident == "u16" => Ok(Self::U16),
                Some(ident) if ident == "i16" => Ok(Self::I16),
                Some(ident) if ident == "u32" => Ok(Self::U32),
                _ => Err(error()),
            },
            _ => Err(error()),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::Bytes => "bytes",
        }
    }

    fn value_type(self) -> Type {
        match self {
            Self::U8 => parse_quote!(u8),
            Self::U16 => parse_quote!(u16),
            Self::I16 => parse_quote!(i16),
            Self::U32 => parse_quote!(u32),
            Self::Bytes => parse_quote!(&[u8]),
        }
    }
}

#[derive(Debug)]
struct Handler {
    field_type: Type,
    acc: Pat,
    val: Pat,
    body: syn::Expr,
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    primitive: Primitive,
    tags: Vec<LitInt>,
    handler: Option<Handler>,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("tag")) else {
            return Ok(None);
        };

        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let TagAttribute { tags, handler } = attr.meta.require_list()?.parse_args()?;

        let (primitive, handler) = if let Some(handler) = handler {
            let mut inputs = handler.inputs.iter();

            let (Some(acc), Some(parameter), None) = (inputs.next(), inputs.next(), inputs.next())
            else {
                Err(Error::new_spanned(
                    &handler,
                    "Handler closure must have two parameters.",
                ))?
            };

            let Pat::Type(pat_type) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated with the expected primitive type.",
                ))?
            };

            let primitive = Primitive::from_type(&pat_type.ty)?;
            let handler = Handler {
                field_type: field.ty.clone(),
                acc: acc.clone(),
                val: parameter.clone(),
                body: (*handler.body).clone(),
            };

            (primitive, Some(handler))
        } else {
            let inner_type = option_inner(&field.ty)?;
            let primitive = Primitive::from_type(inner_type)?;

            if primitive == Primitive::Bytes {
                Err(Error::new_spanned(
                    inner_type,
                    "Bytes are borrowed from the payload and must be copied by a handler closure.",
                ))?
            }

            (primitive, None)
        };

        Ok(Some(Self {
            name,
            primitive,
            tags,
            handler,
        }))
    }
}

/// The `T` of a field of type `Option<T>`.
fn option_inner(ty: &Type) -> Result<&Type> {
    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, "Field must have a type annotation."))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(
            &path.path.segments,
            "Field must have a type annotation.",
        ))?
    };

    if segment.ident != "Option" {
        Err(Error::new_spanned(
            &segment.ident,
            "Field without a handler must have type `Option<T>`.",
        ))?
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(
            &segment.arguments,
            "Field of type `Option<T>` must have a generic parameter.",
        ))?
    };

    let Some(GenericArgument::Type(inner_type)) = arguments.args.first() else {
        Err(Error::new_spanned(
            &arguments.args,
            "Generic argument of a field of type `Option<T>` must be a type.",
        ))?
    };

    Ok(inner_type)
}

#[derive(Debug)]
struct TagAttribute {
    tags: Vec<LitInt>,
    handler: Option<ExprClosure>,
}

impl Parse for TagAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut tags = vec![input.parse::<LitInt>()?];
        let mut handler = None;

        while !input.is_empty() {
            input.parse::<Token![,]>()?;

            if input.peek(LitInt) {
                tags.push(input.parse()?);
            } else {
                handler = Some(input.parse::<ExprClosure>()?);
                break;
            }
        }

        if !input.is_empty() {
            Err(input.error("Handler closure must be the last argument."))?
        }

        Ok(Self { tags, handler })
    }
}
