use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

use crate::info::TypeDescriptor;
use crate::{Accessible, Value};

// -----------------------------------------------------------------------------
// Kinds

/// Whether a member is stored data or computed through methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Property,
}

/// Whether a member's type is plain data.
///
/// A type without drop glue (integers, floats, `bool`, `Copy` aggregates) is
/// a `Value`. Anything that owns resources (`String`, `Vec<T>`, boxes) is a
/// `Reference`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Value,
    Reference,
}

impl ValueKind {
    /// Returns the kind of `T`.
    #[inline]
    pub const fn of<T>() -> Self {
        if core::mem::needs_drop::<T>() {
            Self::Reference
        } else {
            Self::Value
        }
    }
}

// -----------------------------------------------------------------------------
// MemberDescriptor

/// The immutable description of one member.
#[derive(Clone, Copy)]
pub struct MemberDescriptor {
    name: &'static str,
    kind: MemberKind,
    value_kind: ValueKind,
    value_type: &'static str,
    value_type_id: TypeId,
    readable: bool,
    writable: bool,
    public: bool,
    index_arity: u8,
    declaring_type: fn() -> &'static TypeDescriptor,
}

impl MemberDescriptor {
    fn new<T: Accessible, F: Any>(
        name: &'static str,
        kind: MemberKind,
        readable: bool,
        writable: bool,
    ) -> Self {
        Self {
            name,
            kind,
            value_kind: ValueKind::of::<F>(),
            value_type: core::any::type_name::<F>(),
            value_type_id: TypeId::of::<F>(),
            readable,
            writable,
            public: true,
            index_arity: 0,
            declaring_type: T::type_descriptor,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn kind(&self) -> MemberKind {
        self.kind
    }

    #[inline]
    pub const fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    /// Returns the type name of the member's value.
    #[inline]
    pub const fn value_type(&self) -> &'static str {
        self.value_type
    }

    #[inline]
    pub const fn value_type_id(&self) -> TypeId {
        self.value_type_id
    }

    /// Check if the member holds a `T`.
    #[inline]
    pub fn value_is<T: Any>(&self) -> bool {
        self.value_type_id == TypeId::of::<T>()
    }

    #[inline]
    pub const fn is_readable(&self) -> bool {
        self.readable
    }

    #[inline]
    pub const fn is_writable(&self) -> bool {
        self.writable
    }

    #[inline]
    pub const fn is_public(&self) -> bool {
        self.public
    }

    /// Returns the number of index parameters; `0` unless the member is an
    /// indexer.
    #[inline]
    pub const fn index_arity(&self) -> u8 {
        self.index_arity
    }

    /// Returns the descriptor of the type that declares this member.
    #[inline]
    pub fn declaring_type(&self) -> &'static TypeDescriptor {
        (self.declaring_type)()
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value_kind", &self.value_kind)
            .field("value_type", &self.value_type)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("public", &self.public)
            .field("index_arity", &self.index_arity)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// MemberInfo

pub(crate) type Getter = Box<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
pub(crate) type Setter = Box<dyn Fn(&mut dyn Any, Value) -> Result<(), Value> + Send + Sync>;

/// A member and, when available, the closures that read and write it
/// directly.
///
/// Members created with [`hosted`](Self::hosted) carry no closures; the
/// compiler dispatches them through the type's [`MemberHost`].
///
/// The direct closures receive the target as `&dyn Any` and return `None`
/// (or give the value back) when it is not a `T`. Values are read by clone.
///
/// # Examples
///
/// ```
/// use vc_access::{Accessible, info::{MemberInfo, MemberKind, TypeKind, TypeShape}};
/// # use vc_access::info::{NonGenericDescriptorCell, TypeDescriptor};
///
/// pub struct Counter {
///     hits: u64,
/// }
///
/// impl Counter {
///     fn hits(&self) -> u64 { self.hits }
///     fn set_hits(&mut self, hits: u64) { self.hits = hits }
/// }
///
/// impl Accessible for Counter {
///     fn type_descriptor() -> &'static TypeDescriptor {
///         static CELL: NonGenericDescriptorCell = NonGenericDescriptorCell::new();
///         CELL.get_or_init(TypeDescriptor::of::<Self>)
///     }
///
///     fn type_shape() -> TypeShape {
///         TypeShape::new(TypeKind::Reference)
///             .with_member(MemberInfo::property::<Self, u64>("Hits", Self::hits, Self::set_hits))
///     }
/// }
///
/// let shape = Counter::type_shape();
/// let hits = shape.members()[0].descriptor();
/// assert_eq!(hits.kind(), MemberKind::Property);
/// assert!(hits.value_is::<u64>());
/// ```
///
/// [`MemberHost`]: crate::MemberHost
pub struct MemberInfo {
    pub(crate) descriptor: MemberDescriptor,
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
}

impl MemberInfo {
    /// A readable and writable field, reached through `get` and `get_mut`.
    pub fn field<T, F>(name: &'static str, get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self
    where
        T: Accessible,
        F: Any + Clone + Send + Sync,
    {
        Self {
            descriptor: MemberDescriptor::new::<T, F>(name, MemberKind::Field, true, true),
            getter: Some(Box::new(move |target: &dyn Any| {
                let target = target.downcast_ref::<T>()?;
                Some(Value::new(get(target).clone()))
            })),
            setter: Some(Box::new(move |target: &mut dyn Any, value: Value| {
                let Some(target) = target.downcast_mut::<T>() else {
                    return Err(value);
                };
                *get_mut(target) = value.downcast::<F>()?;
                Ok(())
            })),
        }
    }

    /// A field that can be read but not written.
    pub fn readonly_field<T, F>(name: &'static str, get: fn(&T) -> &F) -> Self
    where
        T: Accessible,
        F: Any + Clone + Send + Sync,
    {
        Self {
            descriptor: MemberDescriptor::new::<T, F>(name, MemberKind::Field, true, false),
            getter: Some(Box::new(move |target: &dyn Any| {
                let target = target.downcast_ref::<T>()?;
                Some(Value::new(get(target).clone()))
            })),
            setter: None,
        }
    }

    /// A property with a getter and a setter.
    pub fn property<T, F>(name: &'static str, get: fn(&T) -> F, set: fn(&mut T, F)) -> Self
    where
        T: Accessible,
        F: Any + Send + Sync,
    {
        Self {
            descriptor: MemberDescriptor::new::<T, F>(name, MemberKind::Property, true, true),
            getter: Some(Self::property_getter(get)),
            setter: Some(Self::property_setter(set)),
        }
    }

    /// A property with only a getter.
    pub fn readonly_property<T, F>(name: &'static str, get: fn(&T) -> F) -> Self
    where
        T: Accessible,
        F: Any + Send + Sync,
    {
        Self {
            descriptor: MemberDescriptor::new::<T, F>(name, MemberKind::Property, true, false),
            getter: Some(Self::property_getter(get)),
            setter: None,
        }
    }

    /// A property with only a setter.
    pub fn writeonly_property<T, F>(name: &'static str, set: fn(&mut T, F)) -> Self
    where
        T: Accessible,
        F: Any + Send + Sync,
    {
        Self {
            descriptor: MemberDescriptor::new::<T, F>(name, MemberKind::Property, false, true),
            getter: None,
            setter: Some(Self::property_setter(set)),
        }
    }

    /// A member without direct closures, reached through the type's
    /// [`MemberHost`](crate::MemberHost) under the same `name`.
    pub fn hosted<T, F>(name: &'static str, kind: MemberKind, readable: bool, writable: bool) -> Self
    where
        T: Accessible,
        F: Any,
    {
        Self {
            descriptor: MemberDescriptor::new::<T, F>(name, kind, readable, writable),
            getter: None,
            setter: None,
        }
    }

    /// Marks the member as public or not. Members are public by default;
    /// non-public members are never addressable by name.
    #[inline]
    pub fn with_public(mut self, public: bool) -> Self {
        self.descriptor.public = public;
        self
    }

    /// Sets the number of index parameters. Indexers (arity above zero) are
    /// described but never addressable by name.
    #[inline]
    pub fn with_index_arity(mut self, index_arity: u8) -> Self {
        self.descriptor.index_arity = index_arity;
        self
    }

    #[inline]
    pub fn descriptor(&self) -> &MemberDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Returns `true` if the member can be read without a host.
    #[inline]
    pub fn has_direct_getter(&self) -> bool {
        self.getter.is_some()
    }

    /// Returns `true` if the member can be written without a host.
    #[inline]
    pub fn has_direct_setter(&self) -> bool {
        self.setter.is_some()
    }

    fn property_getter<T: Any, F: Any + Send + Sync>(get: fn(&T) -> F) -> Getter {
        Box::new(move |target: &dyn Any| {
            let target = target.downcast_ref::<T>()?;
            Some(Value::new(get(target)))
        })
    }

    fn property_setter<T: Any, F: Any + Send + Sync>(set: fn(&mut T, F)) -> Setter {
        Box::new(move |target: &mut dyn Any, value: Value| {
            let Some(target) = target.downcast_mut::<T>() else {
                return Err(value);
            };
            set(target, value.downcast::<F>()?);
            Ok(())
        })
    }
}

impl fmt::Debug for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberInfo")
            .field("descriptor", &self.descriptor)
            .field("direct_getter", &self.getter.is_some())
            .field("direct_setter", &self.setter.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
