//! Static storage for [`TypeDescriptor`]s.
//!
//! [`Accessible::type_descriptor`] must return the same `&'static` instance
//! on every call, because caches compare descriptors by address. These cells
//! provide that instance.
//!
//! - [`NonGenericDescriptorCell`] wraps a [`OnceLock`] and costs one atomic
//!   load after the first call.
//! - [`GenericDescriptorCell`] is for generic types. A `static` inside a
//!   generic function is shared by every instantiation, so the cell keeps a
//!   [`TypeIdMap`] behind a [`RwLock`] and leaks one descriptor per type.
//!
//! [`Accessible::type_descriptor`]: crate::Accessible::type_descriptor

use alloc::boxed::Box;
use core::any::{Any, TypeId};

use vc_os::sync::{OnceLock, PoisonError, RwLock};
use vc_utils::TypeIdMap;

use crate::info::TypeDescriptor;

// -----------------------------------------------------------------------------
// NonGenericDescriptorCell

/// Static storage for the descriptor of a non-generic type.
///
/// # Examples
///
/// ```
/// use vc_access::Accessible;
/// use vc_access::info::{NonGenericDescriptorCell, TypeDescriptor, TypeKind, TypeShape};
///
/// struct Marker;
///
/// impl Accessible for Marker {
///     fn type_descriptor() -> &'static TypeDescriptor {
///         static CELL: NonGenericDescriptorCell = NonGenericDescriptorCell::new();
///         CELL.get_or_init(TypeDescriptor::of::<Self>)
///     }
///
///     fn type_shape() -> TypeShape {
///         TypeShape::new(TypeKind::Value)
///     }
/// }
///
/// assert!(core::ptr::eq(Marker::type_descriptor(), Marker::type_descriptor()));
/// ```
pub struct NonGenericDescriptorCell(OnceLock<TypeDescriptor>);

impl NonGenericDescriptorCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored descriptor, creating it with `f` on first use.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> TypeDescriptor) -> &TypeDescriptor {
        self.0.get_or_init(f)
    }
}

impl Default for NonGenericDescriptorCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// GenericDescriptorCell

/// Static storage for the descriptors of a generic type.
///
/// # Examples
///
/// ```
/// use vc_access::Accessible;
/// use vc_access::info::{GenericDescriptorCell, TypeDescriptor, TypeKind, TypeShape};
///
/// struct Wrapper<T>(T);
///
/// impl<T: Send + Sync + 'static> Accessible for Wrapper<T> {
///     fn type_descriptor() -> &'static TypeDescriptor {
///         static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
///         CELL.get_or_insert::<Self>(TypeDescriptor::of::<Self>)
///     }
///
///     fn type_shape() -> TypeShape {
///         TypeShape::new(TypeKind::Reference)
///     }
/// }
///
/// let a = Wrapper::<u8>::type_descriptor();
/// let b = Wrapper::<u16>::type_descriptor();
/// assert!(a.type_is::<Wrapper<u8>>());
/// assert!(b.type_is::<Wrapper<u16>>());
/// assert!(core::ptr::eq(a, Wrapper::<u8>::type_descriptor()));
/// ```
pub struct GenericDescriptorCell(RwLock<TypeIdMap<&'static TypeDescriptor>>);

impl GenericDescriptorCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the descriptor stored for `G`, creating it with `f` on first
    /// use.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(
        &self,
        f: impl FnOnce() -> TypeDescriptor,
    ) -> &'static TypeDescriptor {
        // Separate to reduce code compilation times
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> TypeDescriptor,
    ) -> &'static TypeDescriptor {
        match self.get_by_type_id(type_id) {
            Some(descriptor) => descriptor,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static TypeDescriptor> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    // A racing writer may have inserted first; its descriptor wins and
    // `value` is dropped without being leaked.
    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: TypeDescriptor) -> &'static TypeDescriptor {
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(Box::new(value)))
    }
}

impl Default for GenericDescriptorCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::marker::PhantomData;
    use std::thread;

    use super::GenericDescriptorCell;
    use crate::Accessible;
    use crate::info::{TypeDescriptor, TypeKind, TypeShape};

    struct Slot<T>(PhantomData<T>);

    impl<T: Send + Sync + 'static> Accessible for Slot<T> {
        fn type_descriptor() -> &'static TypeDescriptor {
            static CELL: GenericDescriptorCell = GenericDescriptorCell::new();
            CELL.get_or_insert::<Self>(TypeDescriptor::of::<Self>)
        }

        fn type_shape() -> TypeShape {
            TypeShape::new(TypeKind::Reference)
        }
    }

    #[test]
    fn generic_cell_interns_per_instantiation() {
        let seen: [usize; 8] = thread::scope(|scope| {
            let handles: [_; 8] = core::array::from_fn(|_| {
                scope.spawn(|| core::ptr::from_ref(Slot::<i64>::type_descriptor()) as usize)
            });
            handles.map(|handle| handle.join().unwrap())
        });
        assert!(seen.iter().all(|&addr| addr == seen[0]));

        let other = Slot::<i32>::type_descriptor();
        assert!(other.type_is::<Slot<i32>>());
        assert_ne!(core::ptr::from_ref(other) as usize, seen[0]);
        assert_ne!(other, Slot::<i64>::type_descriptor());
    }
}
