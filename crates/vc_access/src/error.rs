use alloc::boxed::Box;

use thiserror::Error;

// -----------------------------------------------------------------------------
// AccessError

/// Errors returned by member access through an [`Accessor`] or an
/// [`ObjectHandle`].
///
/// [`Accessor`]: crate::Accessor
/// [`ObjectHandle`]: crate::ObjectHandle
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    /// No readable (for `get`) or writable (for `set`) member has this name.
    #[error("`{type_path}` has no accessible member named `{name}`")]
    MemberNotFound {
        type_path: &'static str,
        name: Box<str>,
    },

    /// A write was attempted on a value type.
    #[error("cannot write `{name}`: `{type_path}` is a value type")]
    ReadOnlyTarget {
        type_path: &'static str,
        name: Box<str>,
    },

    /// The type cannot be constructed without arguments.
    #[error("`{type_path}` does not support `create_new`")]
    UnsupportedOperation { type_path: &'static str },

    /// A handle was requested over an absent target.
    #[error("cannot bind a handle to an absent target")]
    NullTarget,

    /// The value passed to `set` (or requested from `get_as`) does not have
    /// the member's type.
    #[error("member `{type_path}::{name}` holds `{expected}`, found `{found}`")]
    TypeMismatch {
        type_path: &'static str,
        name: Box<str>,
        expected: &'static str,
        found: &'static str,
    },

    /// The target is not an instance of the accessor's type.
    #[error("accessor for `{expected}` used on a different type")]
    TargetMismatch { expected: &'static str },

    /// The accessor could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),
}

// -----------------------------------------------------------------------------
// CompileError

/// Errors returned while compiling an [`Accessor`].
///
/// Failures are never cached: a later request for the same type compiles
/// again.
///
/// [`Accessor`]: crate::Accessor
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    /// Two addressable members share a name.
    #[error("`{type_path}` declares member `{name}` more than once")]
    DuplicateMember {
        type_path: &'static str,
        name: &'static str,
    },

    /// The type declares members, but none of them is addressable by name.
    #[error("`{type_path}` has no public, readable or writable members")]
    NoAccessibleMembers { type_path: &'static str },

    /// Direct dispatch is impossible and the type provides no `MemberHost`.
    #[error("`{type_path}` is not accessible and provides no member host")]
    Inaccessible { type_path: &'static str },

    /// The type's shape requested an accessor while one was being compiled
    /// on the same thread.
    #[error("re-entrant accessor compilation while compiling `{type_path}`")]
    Reentrant { type_path: &'static str },
}
