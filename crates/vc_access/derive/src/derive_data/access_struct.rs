use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Field, Fields, GenericParam, Ident, Path, Type, Visibility};
use syn::{WhereClause, parse_quote};

use super::{FieldAttributes, PropertyAttribute, TypeAttributes};

// -----------------------------------------------------------------------------
// AccessField

/// One named field that takes part in member access.
pub(crate) struct AccessField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    /// The member name, after `rename`.
    pub name: String,
    pub is_public: bool,
    pub is_writable: bool,
}

impl<'a> AccessField<'a> {
    /// Returns `None` for `#[access(skip)]` fields.
    fn new(field: &'a Field) -> syn::Result<Option<Self>> {
        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
        if attrs.skip.is_some() {
            return Ok(None);
        }

        let Some(ident) = field.ident.as_ref() else {
            return Err(syn::Error::new(field.span(), "expected a named field"));
        };
        let name = match &attrs.rename {
            Some(lit) => lit.value(),
            None => ident.unraw().to_string(),
        };

        Ok(Some(Self {
            ident,
            ty: &field.ty,
            name,
            is_public: !matches!(field.vis, Visibility::Inherited) || attrs.expose.is_some(),
            is_writable: attrs.readonly.is_none(),
        }))
    }
}

// -----------------------------------------------------------------------------
// AccessStruct

/// Everything the derive needs to know about one struct.
pub(crate) struct AccessStruct<'a> {
    vc_access_path: Path,
    input: &'a DeriveInput,
    attrs: TypeAttributes,
    fields: Vec<AccessField<'a>>,
}

impl<'a> AccessStruct<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;

        let data = match &input.data {
            Data::Struct(data) => data,
            Data::Enum(data) => {
                return Err(syn::Error::new(
                    data.enum_token.span,
                    "`Accessible` can only be derived for structs",
                ));
            }
            Data::Union(data) => {
                return Err(syn::Error::new(
                    data.union_token.span,
                    "`Accessible` can only be derived for structs",
                ));
            }
        };

        let mut fields = Vec::new();
        match &data.fields {
            Fields::Named(named) => {
                for field in &named.named {
                    fields.extend(AccessField::new(field)?);
                }
            }
            Fields::Unit => {}
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new(
                    unnamed.span(),
                    "tuple struct fields have no names, use named fields",
                ));
            }
        }

        for param in &input.generics.params {
            if let GenericParam::Lifetime(lifetime) = param {
                return Err(syn::Error::new(
                    lifetime.span(),
                    "`Accessible` types are `'static`, lifetime parameters are not supported",
                ));
            }
        }

        Ok(Self {
            vc_access_path: crate::path::vc_access(),
            input,
            attrs,
            fields,
        })
    }

    #[inline]
    pub fn vc_access_path(&self) -> &Path {
        &self.vc_access_path
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        &self.input.ident
    }

    #[inline]
    pub fn fields(&self) -> &[AccessField<'a>] {
        &self.fields
    }

    #[inline]
    pub fn properties(&self) -> &[PropertyAttribute] {
        &self.attrs.properties
    }

    /// Returns `true` if members are reached through direct closures, `false`
    /// if they go through the generated `MemberHost`.
    ///
    /// Only `pub` structs without `#[access(restricted)]` are direct.
    #[inline]
    pub fn is_direct(&self) -> bool {
        matches!(self.input.vis, Visibility::Public(_)) && self.attrs.restricted.is_none()
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.input.generics.params.is_empty()
    }

    /// Splits the generics for an `impl` block.
    ///
    /// The where clause is extended so that the type and every member value
    /// type meet the bounds the runtime places on them.
    pub fn split_generics(&self) -> (TokenStream, TokenStream, TokenStream) {
        let generics = &self.input.generics;
        let (impl_generics, ty_generics, _) = generics.split_for_impl();

        let mut where_clause: WhereClause = match &generics.where_clause {
            Some(clause) => clause.clone(),
            None => WhereClause {
                where_token: Default::default(),
                predicates: Punctuated::new(),
            },
        };

        if self.is_generic() {
            if self.attrs.default.is_some() {
                let ident = self.ident();
                where_clause.predicates.push(parse_quote! {
                    #ident #ty_generics: ::core::default::Default
                });
            }
            for param in generics.type_params() {
                let ident = &param.ident;
                where_clause.predicates.push(parse_quote! {
                    #ident: ::core::marker::Send + ::core::marker::Sync + 'static
                });
            }
            for field in &self.fields {
                let ty = field.ty;
                where_clause.predicates.push(if field.is_public {
                    parse_quote! {
                        #ty: ::core::clone::Clone + ::core::marker::Send + ::core::marker::Sync + 'static
                    }
                } else {
                    parse_quote! { #ty: 'static }
                });
            }
            for property in self.properties() {
                let ty = &property.ty;
                where_clause.predicates.push(parse_quote! {
                    #ty: ::core::marker::Send + ::core::marker::Sync + 'static
                });
            }
        }

        let where_clause = if where_clause.predicates.is_empty() {
            TokenStream::new()
        } else {
            where_clause.into_token_stream()
        };

        (
            impl_generics.into_token_stream(),
            ty_generics.into_token_stream(),
            where_clause,
        )
    }

    /// The type as written in the `impl` header, used by code outside it.
    pub fn real_ident(&self) -> TokenStream {
        let ident = self.ident();
        quote! { #ident }
    }
}
