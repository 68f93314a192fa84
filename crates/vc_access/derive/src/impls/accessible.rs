use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{AccessField, AccessStruct, PropertyAttribute};

/// Generate the `Accessible` implementation.
pub(crate) fn impl_accessible(data: &AccessStruct) -> TokenStream {
    let vc_access_path = data.vc_access_path();
    let accessible_ = crate::path::accessible_(vc_access_path);
    let info_ = crate::path::info_(vc_access_path);

    let real_ident = data.real_ident();
    let (impl_generics, ty_generics, where_clause) = data.split_generics();

    let descriptor = if data.is_generic() {
        quote! {
            static CELL: #info_::GenericDescriptorCell = #info_::GenericDescriptorCell::new();
            CELL.get_or_insert::<Self>(#info_::TypeDescriptor::of::<Self>)
        }
    } else {
        quote! {
            static CELL: #info_::NonGenericDescriptorCell = #info_::NonGenericDescriptorCell::new();
            CELL.get_or_init(#info_::TypeDescriptor::of::<Self>)
        }
    };

    let attrs = data.attrs();
    let kind = match attrs.is_value {
        Some(_) => quote! { #info_::TypeKind::Value },
        None => quote! { #info_::TypeKind::Reference },
    };
    let visibility = if data.is_direct() {
        quote! { #info_::Visibility::Public }
    } else {
        quote! { #info_::Visibility::Restricted }
    };
    let with_abstract = attrs.is_abstract.map(|_| quote! { .with_abstract(true) });

    let with_constructor = if attrs.default.is_some() {
        Some(quote! { .with_default_constructor::<Self>() })
    } else {
        attrs.constructor.as_ref().map(|constructor| {
            let box_ = crate::path::box_(vc_access_path);
            let dynamic_accessible_ = crate::path::dynamic_accessible_(vc_access_path);
            quote! {
                .with_constructor(|| -> #box_<dyn #dynamic_accessible_> {
                    #box_::new(#constructor())
                })
            }
        })
    };
    let with_host = (!data.is_direct()).then(|| quote! { .with_host::<Self>() });

    let direct = data.is_direct();
    let fields = data
        .fields()
        .iter()
        .map(|field| field_member(&info_, field, direct));
    let properties = data
        .properties()
        .iter()
        .map(|property| property_member(&info_, property, direct));

    quote! {
        impl #impl_generics #accessible_ for #real_ident #ty_generics #where_clause {
            fn type_descriptor() -> &'static #info_::TypeDescriptor {
                #descriptor
            }

            fn type_shape() -> #info_::TypeShape {
                #info_::TypeShape::new(#kind)
                    .with_visibility(#visibility)
                    #with_abstract
                    #(.with_member(#fields))*
                    #(.with_member(#properties))*
                    #with_constructor
                    #with_host
            }
        }
    }
}

fn field_member(info_: &TokenStream, field: &AccessField, direct: bool) -> TokenStream {
    let AccessField {
        ident,
        ty,
        name,
        is_public,
        is_writable,
    } = field;

    // Non-public fields are described only, their values are never cloned.
    let member = if !direct || !is_public {
        quote! {
            #info_::MemberInfo::hosted::<Self, #ty>(#name, #info_::MemberKind::Field, true, #is_writable)
        }
    } else if *is_writable {
        quote! {
            #info_::MemberInfo::field::<Self, #ty>(#name, |this| &this.#ident, |this| &mut this.#ident)
        }
    } else {
        quote! {
            #info_::MemberInfo::readonly_field::<Self, #ty>(#name, |this| &this.#ident)
        }
    };

    quote! { #member.with_public(#is_public) }
}

fn property_member(info_: &TokenStream, property: &PropertyAttribute, direct: bool) -> TokenStream {
    let PropertyAttribute { name, ty, get, set } = property;

    if !direct {
        let readable = get.is_some();
        let writable = set.is_some();
        return quote! {
            #info_::MemberInfo::hosted::<Self, #ty>(#name, #info_::MemberKind::Property, #readable, #writable)
        };
    }

    match (get, set) {
        (Some(get), Some(set)) => quote! {
            #info_::MemberInfo::property::<Self, #ty>(#name, Self::#get, Self::#set)
        },
        (Some(get), None) => quote! {
            #info_::MemberInfo::readonly_property::<Self, #ty>(#name, Self::#get)
        },
        (None, Some(set)) => quote! {
            #info_::MemberInfo::writeonly_property::<Self, #ty>(#name, Self::#set)
        },
        // Rejected while parsing.
        (None, None) => unreachable!("property without accessors"),
    }
}
