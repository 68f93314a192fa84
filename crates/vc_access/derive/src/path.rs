//! Paths into `vc_access`, kept in one place so a layout change in the
//! runtime crate only touches this module.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the access path to the `vc_access` crate.
///
/// 1. For crates that depend on `vc_access`, `::vc_access` is returned.
/// 2. For crates that depend on `vc_member`, `::vc_member::access` is returned.
/// 3. For other situations, `::vc_access` is returned, which may be incorrect.
///
/// Reading the manifest is not free, so the path is computed once per
/// derive and passed around.
pub(crate) fn vc_access() -> syn::Path {
    vc_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("vc_access"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn accessible_(vc_access_path: &syn::Path) -> TokenStream {
    quote! { #vc_access_path::Accessible }
}

#[inline(always)]
pub(crate) fn member_host_(vc_access_path: &syn::Path) -> TokenStream {
    quote! { #vc_access_path::MemberHost }
}

#[inline(always)]
pub(crate) fn value_(vc_access_path: &syn::Path) -> TokenStream {
    quote! { #vc_access_path::Value }
}

#[inline(always)]
pub(crate) fn dynamic_accessible_(vc_access_path: &syn::Path) -> TokenStream {
    quote! { #vc_access_path::DynamicAccessible }
}

#[inline(always)]
pub(crate) fn info_(vc_access_path: &syn::Path) -> TokenStream {
    quote! { #vc_access_path::info }
}

#[inline(always)]
pub(crate) fn box_(vc_access_path: &syn::Path) -> TokenStream {
    quote! { #vc_access_path::__macro_exports::Box }
}

#[cfg(feature = "auto_register")]
#[inline(always)]
pub(crate) fn auto_register_(vc_access_path: &syn::Path) -> TokenStream {
    quote! { #vc_access_path::__macro_exports::auto_register }
}
