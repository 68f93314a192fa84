use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use crate::Value;
use crate::info::{TypeDescriptor, TypeShape};

// -----------------------------------------------------------------------------
// Accessible

/// A type whose members can be accessed by name.
///
/// Usually implemented with `#[derive(Accessible)]`. A manual
/// implementation must return the same interned instance from every
/// [`type_descriptor`](Self::type_descriptor) call; the cells in
/// [`info`](crate::info) provide one.
///
/// [`type_shape`](Self::type_shape) is called at most once per registry,
/// when the type's accessor is compiled.
pub trait Accessible: Any + Send + Sync {
    /// Returns the interned descriptor of `Self`.
    fn type_descriptor() -> &'static TypeDescriptor;

    /// Describes the members of `Self`.
    fn type_shape() -> TypeShape;
}

// -----------------------------------------------------------------------------
// DynamicAccessible

/// The object-safe half of [`Accessible`], implemented for every
/// `Accessible` type.
///
/// # Examples
///
/// ```
/// use vc_access::{DynamicAccessible, derive::Accessible};
///
/// #[derive(Accessible, Default)]
/// #[access(default)]
/// pub struct Config {
///     pub retries: u8,
/// }
///
/// let boxed: Box<dyn DynamicAccessible> = Box::new(Config { retries: 3 });
/// assert!(boxed.is::<Config>());
/// assert_eq!(boxed.downcast_ref::<Config>().map(|c| c.retries), Some(3));
/// assert!(boxed.reflect_descriptor().type_is::<Config>());
/// ```
pub trait DynamicAccessible: Any + Send + Sync {
    /// Returns the descriptor of the concrete type.
    fn reflect_descriptor(&self) -> &'static TypeDescriptor;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<T: Accessible> DynamicAccessible for T {
    #[inline]
    fn reflect_descriptor(&self) -> &'static TypeDescriptor {
        T::type_descriptor()
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn DynamicAccessible {
    /// Returns `true` if the value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }

    /// Downcasts the box to `T`, or gives it back unchanged.
    pub fn downcast<T: Any>(self: Box<Self>) -> Result<Box<T>, Box<Self>> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(value),
            Err(_) => unreachable!("type checked above"),
        }
    }
}

impl fmt::Debug for dyn DynamicAccessible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynamicAccessible({})", self.reflect_descriptor().type_path())
    }
}

// -----------------------------------------------------------------------------
// MemberHost

/// Name-based access implemented by the type itself.
///
/// This is the indirect path the compiler falls back to when members cannot
/// be reached through direct closures (restricted types, private fields).
/// `#[derive(Accessible)]` generates it for non-`pub` structs.
///
/// Names are matched exactly. Declining a name (`None` / `Err`) is reported
/// to the caller as `MemberNotFound`.
pub trait MemberHost {
    /// Reads the member `name`.
    fn host_get(&self, name: &str) -> Option<Value>;

    /// Writes the member `name`, giving `value` back if the name is unknown
    /// or the value has the wrong type.
    fn host_set(&mut self, name: &str, value: Value) -> Result<(), Value>;
}

/// Erased access to a type's [`MemberHost`] impl.
#[derive(Clone, Copy)]
pub struct HostAccess {
    host_ref: fn(&dyn Any) -> Option<&dyn MemberHost>,
    host_mut: fn(&mut dyn Any) -> Option<&mut dyn MemberHost>,
}

impl HostAccess {
    /// Creates the host access of `T`.
    #[inline]
    pub fn of<T: Accessible + MemberHost>() -> Self {
        Self {
            host_ref: |target| target.downcast_ref::<T>().map(|t| t as &dyn MemberHost),
            host_mut: |target| target.downcast_mut::<T>().map(|t| t as &mut dyn MemberHost),
        }
    }

    /// Returns the host of `target`, or `None` if it is not the host type.
    #[inline]
    pub fn host_ref<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn MemberHost> {
        (self.host_ref)(target)
    }

    /// Returns the host of `target`, or `None` if it is not the host type.
    #[inline]
    pub fn host_mut<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut dyn MemberHost> {
        (self.host_mut)(target)
    }
}

impl fmt::Debug for HostAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostAccess").finish_non_exhaustive()
    }
}
