//! Cached by-name member access.
//!
//! A type describes its members once through [`Accessible`] (usually with
//! `#[derive(Accessible)]`). The first time the type is seen, an
//! [`AccessorCompiler`] turns that description into an [`Accessor`], a
//! per-type dispatch table that reads and writes members by name. The
//! [`AccessorRegistry`] guarantees the compilation runs at most once per type
//! and serves every later lookup without taking a lock.
//!
//! ## Menu
//!
//! - [`AppendOnlyMemo`]: lock-free, identity-keyed, append-only cache.
//! - [`info`]: [`TypeDescriptor`], [`MemberDescriptor`], [`TypeShape`] and the
//!   cells that intern descriptors.
//! - [`Accessible`], [`DynamicAccessible`], [`MemberHost`]: how a type
//!   describes itself.
//! - [`AccessorCompiler`] and [`Accessor`]: the compiled dispatch.
//! - [`AccessorRegistry`]: the process-wide `type -> accessor` cache.
//! - [`ObjectHandle`]: one target bound to its accessor.
//!
//! ## Example
//!
//! ```
//! use vc_access::{ObjectHandle, derive::Accessible};
//!
//! #[derive(Accessible)]
//! pub struct User {
//!     pub id: i32,
//!     pub name: String,
//! }
//!
//! let mut user = User { id: 1, name: "ann".into() };
//! let mut handle = ObjectHandle::new(&mut user).unwrap();
//!
//! handle.set_value("id", 7_i32).unwrap();
//! assert_eq!(handle.get_as::<i32>("id").unwrap(), 7);
//! assert!(handle.get("missing").is_err());
//! ```
//!
//! [`TypeDescriptor`]: info::TypeDescriptor
//! [`MemberDescriptor`]: info::MemberDescriptor
//! [`TypeShape`]: info::TypeShape
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names this crate `vc_access`, which must also resolve
// inside the crate itself and its doc-tests.
extern crate self as vc_access;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod accessible;
mod accessor;
mod compiler;
mod error;
mod handle;
mod memo;
mod registry;
mod value;

pub mod info;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use accessible::{Accessible, DynamicAccessible, HostAccess, MemberHost};
pub use accessor::{Accessor, DispatchMode};
pub use compiler::{AccessorCompiler, LINEAR_DISPATCH_LIMIT};
pub use error::{AccessError, CompileError};
pub use handle::{NamePolicy, ObjectHandle};
pub use memo::{AppendOnlyMemo, MemoIter};
pub use registry::{AccessorRegistry, accessor_of, resolve_accessor};
pub use value::Value;

pub use vc_access_derive as derive;
