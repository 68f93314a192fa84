use core::any::{Any, TypeId};
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::Accessible;
use crate::info::TypeShape;

/// The identity of a runtime type.
///
/// A descriptor is created once per type and lives for the rest of the
/// process (see [`NonGenericDescriptorCell`]), so `&'static TypeDescriptor`
/// is the key every cache in this crate uses.
///
/// Equality and hashing only look at the [`TypeId`]. Two descriptors of the
/// same type are equal even if they are different instances.
///
/// # Examples
///
/// ```
/// use vc_access::{Accessible, derive::Accessible};
///
/// #[derive(Accessible)]
/// pub struct Point {
///     pub x: f32,
/// }
///
/// let ty = Point::type_descriptor();
/// assert!(ty.type_is::<Point>());
/// assert!(ty.type_path().ends_with("Point"));
/// assert!(core::ptr::eq(ty, Point::type_descriptor()));
/// ```
///
/// [`NonGenericDescriptorCell`]: crate::info::NonGenericDescriptorCell
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_path: &'static str,
    // The shape is rebuilt on every call; only the compiler asks for it.
    shape: fn() -> TypeShape,
}

impl TypeDescriptor {
    /// Creates the descriptor of `T`.
    ///
    /// Prefer [`Accessible::type_descriptor`], which returns the interned
    /// instance.
    #[inline]
    pub fn of<T: Accessible>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: core::any::type_name::<T>(),
            shape: T::type_shape,
        }
    }

    #[inline]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the full type path, as [`core::any::type_name`] reports it.
    #[inline]
    pub const fn type_path(&self) -> &'static str {
        self.type_path
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Builds the type's [`TypeShape`].
    #[inline]
    pub fn shape(&self) -> TypeShape {
        (self.shape)()
    }
}

impl PartialEq for TypeDescriptor {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_path", &self.type_path)
            .field("type_id", &self.type_id)
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_path)
    }
}
