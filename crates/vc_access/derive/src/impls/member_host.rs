use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::AccessStruct;

/// Generate the `MemberHost` implementation used by restricted types.
///
/// Only addressable members get a match arm, every other name is declined.
pub(crate) fn impl_member_host(data: &AccessStruct) -> TokenStream {
    if data.is_direct() {
        return TokenStream::new();
    }

    let vc_access_path = data.vc_access_path();
    let member_host_ = crate::path::member_host_(vc_access_path);
    let value_ = crate::path::value_(vc_access_path);

    let real_ident = data.real_ident();
    let (impl_generics, ty_generics, where_clause) = data.split_generics();

    let mut get_arms = Vec::new();
    let mut set_arms = Vec::new();

    for field in data.fields().iter().filter(|field| field.is_public) {
        let ident = field.ident;
        let ty = field.ty;
        let name = &field.name;

        get_arms.push(quote! {
            #name => ::core::option::Option::Some(
                #value_::new(::core::clone::Clone::clone(&self.#ident))
            ),
        });
        if field.is_writable {
            set_arms.push(quote! {
                #name => {
                    self.#ident = value.downcast::<#ty>()?;
                    ::core::result::Result::Ok(())
                }
            });
        }
    }

    for property in data.properties() {
        let name = &property.name;
        let ty = &property.ty;

        if let Some(get) = &property.get {
            get_arms.push(quote! {
                #name => ::core::option::Option::Some(#value_::new(Self::#get(self))),
            });
        }
        if let Some(set) = &property.set {
            set_arms.push(quote! {
                #name => {
                    Self::#set(self, value.downcast::<#ty>()?);
                    ::core::result::Result::Ok(())
                }
            });
        }
    }

    quote! {
        impl #impl_generics #member_host_ for #real_ident #ty_generics #where_clause {
            #[allow(unreachable_patterns, reason = "duplicate names are reported when compiling")]
            fn host_get(&self, name: &str) -> ::core::option::Option<#value_> {
                match name {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unreachable_patterns, reason = "duplicate names are reported when compiling")]
            fn host_set(
                &mut self,
                name: &str,
                value: #value_,
            ) -> ::core::result::Result<(), #value_> {
                match name {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(value),
                }
            }
        }
    }
}
