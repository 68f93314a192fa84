//! See [`Accessible`](derive_accessible).
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

static ACCESS_ATTRIBUTE_NAME: &str = "access";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # By-Name Member Access
///
/// `#[derive(Accessible)]` implements `Accessible` for a struct with named
/// fields (or a unit struct). Tuple structs, enums and unions are rejected.
///
/// Every field becomes a member named after the field. A field is
/// addressable when it is declared with any `pub` visibility or carries
/// `#[access(expose)]`; other fields are described but never found by name.
/// Addressable field types must be `Clone + Send + Sync + 'static`, other fields
/// only `'static`.
///
/// ## Dispatch
///
/// A `pub` struct is reached through direct closures over its fields.
///
/// Any other struct, and any struct marked `#[access(restricted)]`, gets a
/// generated `MemberHost` impl instead, and the accessor dispatches through
/// it. Both paths behave identically. A restricted struct that has fields but
/// no addressable one fails to compile its accessor with
/// `CompileError::NoAccessibleMembers`:
///
/// ```rust, ignore
/// #[derive(Accessible)]
/// struct Hidden {
///     secret: u32, // not `pub`, not exposed
/// }
/// ```
///
/// ## Type Attributes
///
/// - `value`: instances are values. Every write fails with `ReadOnlyTarget`.
/// - `abstract`: the type is never instantiated through `create_new`.
/// - `default`: `Default::default` is the parameterless constructor.
/// - `constructor = path`: `path()` is the parameterless constructor.
/// - `restricted`: force dispatch through the generated `MemberHost`.
/// - `auto_register`: submit the type for `AccessorRegistry::preload`.
///   Ignored for generic types, and a no-op without the `auto_register`
///   feature.
/// - `property(name = "..", ty = T, get = method, set = method)`: a computed
///   member. `get` is `fn(&Self) -> T`, `set` is `fn(&mut Self, T)`, and at
///   least one of them is required.
///
/// ```rust, ignore
/// #[derive(Accessible, Default)]
/// #[access(default, auto_register)]
/// #[access(property(name = "Len", ty = usize, get = len))]
/// pub struct Label {
///     pub text: String,
/// }
///
/// impl Label {
///     fn len(&self) -> usize {
///         self.text.len()
///     }
/// }
/// ```
///
/// ## Field Attributes
///
/// - `skip`: the field is not a member.
/// - `readonly`: the member has no setter.
/// - `rename = ".."`: the member name, instead of the field ident.
/// - `expose`: addressable even though the field is not `pub`.
///
/// ```rust, ignore
/// #[derive(Accessible)]
/// pub struct User {
///     #[access(rename = "Id", readonly)]
///     pub id: i32,
///     #[access(rename = "Name")]
///     pub name: String,
///     #[access(skip)]
///     pub cache: Vec<u8>,
///     #[access(expose)]
///     score: u32,
/// }
/// ```
///
/// ## Generics
///
/// Type parameters are supported and each instantiation gets its own
/// descriptor. Lifetime parameters are rejected, `Accessible` types are
/// `'static`.
#[proc_macro_derive(Accessible, attributes(access))]
pub fn derive_accessible(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let data = match derive_data::AccessStruct::from_input(&ast) {
        Ok(data) => data,
        Err(err) => return err.into_compile_error().into(),
    };

    let accessible_impl = impls::impl_accessible(&data);
    let member_host_impl = impls::impl_member_host(&data);
    let auto_register_impl = impls::impl_auto_register(&data);

    quote! {
        const _: () = {
            #accessible_impl
            #member_host_impl
            #auto_register_impl
        };
    }
    .into()
}
