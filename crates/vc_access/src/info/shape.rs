use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::info::MemberInfo;
use crate::{Accessible, DynamicAccessible, HostAccess, MemberHost};

// -----------------------------------------------------------------------------
// Kinds

/// How writes to a type behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Copy-semantics data. Every write is refused with
    /// [`AccessError::ReadOnlyTarget`](crate::AccessError::ReadOnlyTarget).
    Value,
    /// An object with identity. Writable members can be written.
    Reference,
}

/// Whether generated dispatch may reach a type's members directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    /// Members are only reachable through the type's [`MemberHost`].
    Restricted,
}

// -----------------------------------------------------------------------------
// TypeShape

/// The member layout of a type.
///
/// A shape is built by [`Accessible::type_shape`] and consumed once by the
/// [`AccessorCompiler`](crate::AccessorCompiler). Members keep their
/// declaration order.
pub struct TypeShape {
    kind: TypeKind,
    visibility: Visibility,
    is_abstract: bool,
    members: Vec<MemberInfo>,
    constructor: Option<fn() -> Box<dyn DynamicAccessible>>,
    host: Option<HostAccess>,
}

fn construct_default<T: Accessible + Default>() -> Box<dyn DynamicAccessible> {
    Box::new(T::default())
}

impl TypeShape {
    /// Creates an empty, public, concrete shape.
    #[inline]
    pub const fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            visibility: Visibility::Public,
            is_abstract: false,
            members: Vec::new(),
            constructor: None,
            host: None,
        }
    }

    #[inline]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the type as abstract. Abstract types never support `create_new`.
    #[inline]
    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    #[inline]
    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    #[inline]
    pub fn with_members(mut self, members: impl IntoIterator<Item = MemberInfo>) -> Self {
        self.members.extend(members);
        self
    }

    /// Sets the parameterless constructor.
    #[inline]
    pub fn with_constructor(mut self, constructor: fn() -> Box<dyn DynamicAccessible>) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Uses `T::default` as the parameterless constructor.
    #[inline]
    pub fn with_default_constructor<T: Accessible + Default>(self) -> Self {
        self.with_constructor(construct_default::<T>)
    }

    /// Routes indirect dispatch through `T`'s [`MemberHost`] impl.
    #[inline]
    pub fn with_host<T: Accessible + MemberHost>(mut self) -> Self {
        self.host = Some(HostAccess::of::<T>());
        self
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    #[inline]
    pub fn constructor(&self) -> Option<fn() -> Box<dyn DynamicAccessible>> {
        self.constructor
    }

    #[inline]
    pub fn host(&self) -> Option<HostAccess> {
        self.host
    }

    #[inline]
    pub(crate) fn into_members(self) -> Vec<MemberInfo> {
        self.members
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeShape")
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("is_abstract", &self.is_abstract)
            .field("members", &self.members)
            .field("constructor", &self.constructor.is_some())
            .field("host", &self.host.is_some())
            .finish()
    }
}
