//! Items used by the code `#[derive(Accessible)]` generates.
//! Not part of the public API.

pub use alloc::boxed::Box;

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::info::TypeDescriptor;

    /// One `#[access(auto_register)]` type.
    pub struct AutoRegister(pub fn() -> &'static TypeDescriptor);

    inventory::collect!(AutoRegister);
}
