use alloc::vec::Vec;

use vc_utils::hash::{FixedHashState, HashMap};

use crate::info::{MemberInfo, TypeDescriptor, TypeKind, Visibility};
use crate::{Accessor, CompileError, DispatchMode};

/// Above this many members, names are resolved through a hash index instead
/// of a linear scan.
pub const LINEAR_DISPATCH_LIMIT: usize = 8;

/// Turns a type's [`TypeShape`] into an [`Accessor`].
///
/// Compilation is `O(members)` and happens once per type; the
/// [`AccessorRegistry`] makes sure of that. Calling the compiler directly
/// always builds a fresh accessor.
///
/// # Rules
///
/// - A member is addressable by name when it is public, has no index
///   parameters and is readable or writable. Other members are dropped.
/// - Addressable names must be unique, see [`CompileError::DuplicateMember`].
/// - A type that declares members but none addressable fails with
///   [`CompileError::NoAccessibleMembers`]. A type that declares no member
///   compiles to an empty accessor.
/// - Dispatch is [`Direct`] when the type is public and every addressable
///   member has the closures its capabilities need. Otherwise it goes through
///   the type's [`MemberHost`]; without one the type is
///   [`Inaccessible`](CompileError::Inaccessible).
/// - The constructor is kept only for concrete reference types.
///
/// # Examples
///
/// ```
/// use vc_access::{AccessorCompiler, Accessible, DispatchMode, derive::Accessible};
///
/// #[derive(Accessible)]
/// pub struct Pair {
///     pub left: i32,
///     pub right: i32,
/// }
///
/// let accessor = AccessorCompiler::compile(Pair::type_descriptor()).unwrap();
/// assert_eq!(accessor.dispatch_mode(), DispatchMode::Direct);
/// assert_eq!(accessor.len(), 2);
/// ```
///
/// [`TypeShape`]: crate::info::TypeShape
/// [`AccessorRegistry`]: crate::AccessorRegistry
/// [`MemberHost`]: crate::MemberHost
/// [`Direct`]: DispatchMode::Direct
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessorCompiler;

impl AccessorCompiler {
    /// Compiles the accessor of `ty`.
    pub fn compile(ty: &'static TypeDescriptor) -> Result<Accessor, CompileError> {
        let type_path = ty.type_path();
        let shape = ty.shape();

        let kind = shape.kind();
        let visibility = shape.visibility();
        let host = shape.host();
        let constructor = match (kind, shape.is_abstract()) {
            (TypeKind::Reference, false) => shape.constructor(),
            _ => None,
        };

        let members = shape.into_members();
        let declared = members.len();
        let members: Vec<MemberInfo> = members.into_iter().filter(is_addressable).collect();

        if declared > 0 && members.is_empty() {
            return Err(CompileError::NoAccessibleMembers { type_path });
        }

        let mut index: HashMap<&'static str, usize> =
            HashMap::with_capacity_and_hasher(members.len(), FixedHashState);
        for (position, member) in members.iter().enumerate() {
            let name = member.name();
            if index.insert(name, position).is_some() {
                return Err(CompileError::DuplicateMember { type_path, name });
            }
        }
        let index = (members.len() > LINEAR_DISPATCH_LIMIT).then_some(index);

        let mode = if visibility == Visibility::Public && members.iter().all(has_direct_access) {
            DispatchMode::Direct
        } else if host.is_some() {
            DispatchMode::Indirect
        } else {
            return Err(CompileError::Inaccessible { type_path });
        };

        log::debug!(
            "compiled accessor for `{type_path}`: {} of {declared} members, {mode:?} dispatch",
            members.len(),
        );

        Ok(Accessor {
            descriptor: ty,
            kind,
            mode,
            members: members.into_boxed_slice(),
            index,
            host,
            constructor,
        })
    }
}

#[inline]
fn is_addressable(member: &MemberInfo) -> bool {
    let descriptor = member.descriptor();
    descriptor.index_arity() == 0
        && descriptor.is_public()
        && (descriptor.is_readable() || descriptor.is_writable())
}

#[inline]
fn has_direct_access(member: &MemberInfo) -> bool {
    let descriptor = member.descriptor();
    (!descriptor.is_readable() || member.has_direct_getter())
        && (!descriptor.is_writable() || member.has_direct_setter())
}

// -----------------------------------------------------------------------------
// Tests
