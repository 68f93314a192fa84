use proc_macro2::Span;
use syn::meta::ParseNestedMeta;
use syn::spanned::Spanned;
use syn::{Attribute, Ident, LitStr, Path, Type};

use crate::ACCESS_ATTRIBUTE_NAME;

fn set_flag(slot: &mut Option<Span>, meta: &ParseNestedMeta) -> syn::Result<()> {
    if slot.replace(meta.path.span()).is_some() {
        return Err(meta.error("duplicate attribute"));
    }
    Ok(())
}

fn access_attributes(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(ACCESS_ATTRIBUTE_NAME))
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Type level `#[access(...)]` attributes.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `#[access(value)]`: instances are copies, members are read-only.
    pub is_value: Option<Span>,
    /// `#[access(abstract)]`: never instantiated through the accessor.
    pub is_abstract: Option<Span>,
    /// `#[access(default)]`: `Default::default` is the parameterless constructor.
    pub default: Option<Span>,
    /// `#[access(constructor = path)]`: `path()` is the parameterless constructor.
    pub constructor: Option<Path>,
    /// `#[access(restricted)]`: members go through the generated `MemberHost`.
    pub restricted: Option<Span>,
    pub auto_register: Option<Span>,
    pub properties: Vec<PropertyAttribute>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in access_attributes(attrs) {
            attr.parse_nested_meta(|meta| this.parse_meta(&meta))?;
        }
        this.validity()?;
        Ok(this)
    }

    fn parse_meta(&mut self, meta: &ParseNestedMeta) -> syn::Result<()> {
        let path = &meta.path;
        if path.is_ident("value") {
            set_flag(&mut self.is_value, meta)
        } else if path.is_ident("abstract") {
            set_flag(&mut self.is_abstract, meta)
        } else if path.is_ident("default") {
            set_flag(&mut self.default, meta)
        } else if path.is_ident("restricted") {
            set_flag(&mut self.restricted, meta)
        } else if path.is_ident("auto_register") {
            set_flag(&mut self.auto_register, meta)
        } else if path.is_ident("constructor") {
            if self.constructor.is_some() {
                return Err(meta.error("duplicate attribute"));
            }
            self.constructor = Some(meta.value()?.parse()?);
            Ok(())
        } else if path.is_ident("property") {
            self.properties.push(PropertyAttribute::parse(meta)?);
            Ok(())
        } else {
            Err(meta.error(
                "expected one of `value`, `abstract`, `default`, `constructor`, \
                 `restricted`, `auto_register` or `property`",
            ))
        }
    }

    fn validity(&self) -> syn::Result<()> {
        if let (Some(span), Some(_)) = (self.default, &self.constructor) {
            return Err(syn::Error::new(
                span,
                "`default` and `constructor` both name a constructor, keep one",
            ));
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// PropertyAttribute

/// `#[access(property(name = "..", ty = T, get = method, set = method))]`
///
/// `get` is `fn(&Self) -> T`, `set` is `fn(&mut Self, T)`. At least one of
/// them must be present.
pub(crate) struct PropertyAttribute {
    pub name: LitStr,
    pub ty: Type,
    pub get: Option<Ident>,
    pub set: Option<Ident>,
}

impl PropertyAttribute {
    fn parse(meta: &ParseNestedMeta) -> syn::Result<Self> {
        let mut name: Option<LitStr> = None;
        let mut ty: Option<Type> = None;
        let mut get: Option<Ident> = None;
        let mut set: Option<Ident> = None;

        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("name") {
                name = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("ty") {
                ty = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("get") {
                get = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("set") {
                set = Some(inner.value()?.parse()?);
            } else {
                return Err(inner.error("expected `name`, `ty`, `get` or `set`"));
            }
            Ok(())
        })?;

        let Some(name) = name else {
            return Err(meta.error("property requires `name = \"..\"`"));
        };
        let Some(ty) = ty else {
            return Err(meta.error("property requires `ty = Type`"));
        };
        if get.is_none() && set.is_none() {
            return Err(meta.error("property requires `get`, `set` or both"));
        }

        Ok(Self { name, ty, get, set })
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field level `#[access(...)]` attributes.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    /// `#[access(skip)]`: not described at all.
    pub skip: Option<Span>,
    /// `#[access(readonly)]`: described without a setter.
    pub readonly: Option<Span>,
    /// `#[access(rename = "..")]`: the member name, defaults to the field ident.
    pub rename: Option<LitStr>,
    /// `#[access(expose)]`: addressable even though the field is not `pub`.
    pub expose: Option<Span>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for attr in access_attributes(attrs) {
            attr.parse_nested_meta(|meta| {
                let path = &meta.path;
                if path.is_ident("skip") {
                    set_flag(&mut this.skip, &meta)
                } else if path.is_ident("readonly") {
                    set_flag(&mut this.readonly, &meta)
                } else if path.is_ident("expose") {
                    set_flag(&mut this.expose, &meta)
                } else if path.is_ident("rename") {
                    if this.rename.is_some() {
                        return Err(meta.error("duplicate attribute"));
                    }
                    this.rename = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected one of `skip`, `readonly`, `rename` or `expose`"))
                }
            })?;
        }
        Ok(this)
    }
}
