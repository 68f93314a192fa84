//! Code generation, one module per generated item.

// -----------------------------------------------------------------------------
// Modules

mod accessible;
mod auto_register;
mod member_host;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use accessible::impl_accessible;
pub(crate) use auto_register::impl_auto_register;
pub(crate) use member_host::impl_member_host;
