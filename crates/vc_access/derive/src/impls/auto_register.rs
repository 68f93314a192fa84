use proc_macro2::TokenStream;

use crate::derive_data::AccessStruct;

/// Generate the `auto_register` submission.
#[cfg(feature = "auto_register")]
pub(crate) fn impl_auto_register(data: &AccessStruct) -> TokenStream {
    use quote::quote_spanned;

    let Some(span) = data.attrs().auto_register else {
        return TokenStream::new();
    };
    // Generic types have no single descriptor to submit.
    if data.is_generic() {
        return TokenStream::new();
    }

    let vc_access_path = data.vc_access_path();
    let auto_register_ = crate::path::auto_register_(vc_access_path);
    let accessible_ = crate::path::accessible_(vc_access_path);
    let real_ident = data.real_ident();

    quote_spanned! { span =>
        #auto_register_::inventory::submit!{
            #auto_register_::AutoRegister(
                <#real_ident as #accessible_>::type_descriptor
            )
        }
    }
}

/// Generate the `auto_register` submission.
#[cfg(not(feature = "auto_register"))]
pub(crate) fn impl_auto_register(_: &AccessStruct) -> TokenStream {
    TokenStream::new()
}
