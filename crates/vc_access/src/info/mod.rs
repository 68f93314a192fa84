//! How a type describes its members.
//!
//! ## Menu
//!
//! - [`TypeDescriptor`]: identity of a runtime type, interned once per type.
//!   Compared and hashed by [`TypeId`], so it is a valid cache key.
//!     - [`NonGenericDescriptorCell`]: interns the descriptor of a plain type.
//!     - [`GenericDescriptorCell`]: interns one descriptor per instantiation
//!       of a generic type.
//!
//! - [`TypeShape`]: the member layout of a type, produced on demand and
//!   consumed by the [`AccessorCompiler`].
//!     - [`TypeKind`]: `Value` types refuse writes, `Reference` types do not.
//!     - [`Visibility`]: `Restricted` types are dispatched through their
//!       [`MemberHost`].
//!
//! - [`MemberInfo`]: one field or property, with optional direct accessors.
//!     - [`MemberDescriptor`]: the immutable description of that member.
//!     - [`MemberKind`]: `Field` or `Property`.
//!     - [`ValueKind`]: whether the member's type is plain data.
//!
//! [`TypeId`]: core::any::TypeId
//! [`AccessorCompiler`]: crate::AccessorCompiler
//! [`MemberHost`]: crate::MemberHost

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod descriptor;
mod member;
mod shape;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericDescriptorCell, NonGenericDescriptorCell};
pub use descriptor::TypeDescriptor;
pub use member::{MemberDescriptor, MemberInfo, MemberKind, ValueKind};
pub use shape::{TypeKind, TypeShape, Visibility};
