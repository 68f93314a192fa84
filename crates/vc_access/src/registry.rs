//! The process-wide `type -> accessor` cache.
//!
//! ## Read path
//!
//! Accessors are published into 64 [`AppendOnlyMemo`] buckets chosen by the
//! hash of the type's `TypeId`. A lookup is one hash and a short pointer
//! walk, with no lock.
//!
//! ## Compile path
//!
//! A miss takes the registry's single compile lock, checks again, compiles,
//! leaks the accessor and publishes it. Every compilation in a registry is
//! serialized, so a type is compiled at most once and the first publication
//! is the only one. Failures are returned and not remembered.
//!
//! ## auto_register
//!
//! With the `auto_register` feature, types marked `#[access(auto_register)]`
//! are collected at link time through [`inventory`] and can be compiled up
//! front with [`AccessorRegistry::preload`].
//!
//! [`inventory`]: https://docs.rs/inventory

use alloc::boxed::Box;
use core::cell::Cell;
use core::fmt;

use vc_os::sync::atomic::{AtomicUsize, Ordering};
use vc_os::sync::{Mutex, PoisonError};
use vc_utils::hash::hash_one;

use crate::info::TypeDescriptor;
use crate::{Accessible, Accessor, AccessorCompiler, AppendOnlyMemo, CompileError};

const BUCKET_COUNT: usize = 64;

type Bucket = AppendOnlyMemo<TypeDescriptor, &'static Accessor>;

// -----------------------------------------------------------------------------
// Re-entrancy

std::thread_local! {
    static COMPILING: Cell<bool> = const { Cell::new(false) };
}

// Marks the current thread as compiling until dropped.
struct CompilingGuard;

impl CompilingGuard {
    fn enter(ty: &TypeDescriptor) -> Result<Self, CompileError> {
        if COMPILING.replace(true) {
            return Err(CompileError::Reentrant {
                type_path: ty.type_path(),
            });
        }
        Ok(Self)
    }
}

impl Drop for CompilingGuard {
    fn drop(&mut self) {
        COMPILING.set(false);
    }
}

// -----------------------------------------------------------------------------
// AccessorRegistry

/// A cache of compiled [`Accessor`]s.
///
/// Most code uses the [`global`](Self::global) registry through
/// [`resolve_accessor`] and [`accessor_of`]. Separate registries compile
/// separately, but accessors are always leaked and live for the rest of the
/// process.
///
/// # Examples
///
/// ```
/// use vc_access::{Accessible, AccessorRegistry, derive::Accessible};
///
/// #[derive(Accessible)]
/// pub struct Node {
///     pub id: u64,
/// }
///
/// static REGISTRY: AccessorRegistry = AccessorRegistry::new();
///
/// let a = REGISTRY.of::<Node>().unwrap();
/// let b = REGISTRY.get_or_create(Node::type_descriptor()).unwrap();
/// assert!(core::ptr::eq(a, b));
/// assert_eq!(REGISTRY.compilations(), 1);
/// ```
pub struct AccessorRegistry {
    buckets: [Bucket; BUCKET_COUNT],
    compile_lock: Mutex<()>,
    compilations: AtomicUsize,
    published: AtomicUsize,
}

impl AccessorRegistry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self {
            buckets: [const { AppendOnlyMemo::new() }; BUCKET_COUNT],
            compile_lock: Mutex::new(()),
            compilations: AtomicUsize::new(0),
            published: AtomicUsize::new(0),
        }
    }

    /// Returns the registry shared by the whole process.
    #[inline]
    pub fn global() -> &'static Self {
        static GLOBAL: AccessorRegistry = AccessorRegistry::new();
        &GLOBAL
    }

    /// Returns the accessor of `ty` if it has been compiled.
    pub fn get(&self, ty: &'static TypeDescriptor) -> Option<&'static Accessor> {
        let bucket = self.bucket(ty);
        match bucket.try_get(ty) {
            Some(&accessor) => Some(accessor),
            None => Self::scan(bucket, ty),
        }
    }

    /// Returns the accessor of `ty`, compiling it first if needed.
    ///
    /// The compiler runs at most once per type, even when many threads ask
    /// for the same new type at the same time; they all receive the same
    /// accessor. A failed compilation is returned to this caller only, and
    /// the next call tries again.
    ///
    /// A thread compiles one type at a time, across all registries. Calling
    /// this from a [`type_shape`](Accessible::type_shape) for a type that is
    /// not compiled yet fails with [`CompileError::Reentrant`], whichever
    /// registry is asked.
    ///
    /// A descriptor instance other than the interned one is matched by
    /// `TypeId` and never stored, so it costs a bucket scan on every call.
    #[inline]
    pub fn get_or_create(
        &self,
        ty: &'static TypeDescriptor,
    ) -> Result<&'static Accessor, CompileError> {
        match self.get(ty) {
            Some(accessor) => Ok(accessor),
            None => self.create_slow(ty),
        }
    }

    /// Returns the accessor of `T`, compiling it first if needed.
    #[inline]
    pub fn of<T: Accessible>(&self) -> Result<&'static Accessor, CompileError> {
        self.get_or_create(T::type_descriptor())
    }

    /// Returns the number of times the compiler has run, failures included.
    #[inline]
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Returns the number of published accessors.
    #[inline]
    pub fn len(&self) -> usize {
        self.published.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compiles every type marked `#[access(auto_register)]` that is not
    /// compiled yet, and returns how many were compiled.
    ///
    /// Stops at the first failure. Without the `auto_register` feature this
    /// does nothing and returns `Ok(0)`.
    ///
    /// Supported platforms include Linux, macOS, Windows, iOS, Android and
    /// Web, through the `inventory` crate.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vc_access::{Accessible, AccessorRegistry, derive::Accessible};
    ///
    /// #[derive(Accessible)]
    /// #[access(auto_register)]
    /// pub struct Settings {
    ///     pub volume: u8,
    /// }
    ///
    /// let registry = AccessorRegistry::new();
    /// let compiled = registry.preload().unwrap();
    ///
    /// assert!(compiled >= 1);
    /// assert!(registry.get(Settings::type_descriptor()).is_some());
    /// assert_eq!(registry.preload(), Ok(0));
    /// ```
    #[cfg(feature = "auto_register")]
    pub fn preload(&self) -> Result<usize, CompileError> {
        use crate::__macro_exports::auto_register::AutoRegister;

        let mut compiled = 0;
        for entry in inventory::iter::<AutoRegister> {
            let ty = (entry.0)();
            if self.get(ty).is_none() {
                self.get_or_create(ty)?;
                compiled += 1;
            }
        }
        log::trace!("preloaded {compiled} accessors");
        Ok(compiled)
    }

    /// Does nothing without the `auto_register` feature.
    #[cfg(not(feature = "auto_register"))]
    #[inline(always)]
    pub fn preload(&self) -> Result<usize, CompileError> {
        Ok(0)
    }

    #[inline]
    fn bucket(&self, ty: &TypeDescriptor) -> &Bucket {
        &self.buckets[hash_one(&ty.type_id()) as usize % BUCKET_COUNT]
    }

    // Finds an accessor published under another descriptor instance of the
    // same type.
    fn scan(bucket: &Bucket, ty: &TypeDescriptor) -> Option<&'static Accessor> {
        bucket
            .iter()
            .find(|(key, _)| key.type_id() == ty.type_id())
            .map(|(_, &accessor)| accessor)
    }

    #[cold]
    #[inline(never)]
    fn create_slow(&self, ty: &'static TypeDescriptor) -> Result<&'static Accessor, CompileError> {
        let _compiling = CompilingGuard::enter(ty)?;
        let _lock = self
            .compile_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let bucket = self.bucket(ty);
        if let Some(&accessor) = bucket.try_get(ty) {
            return Ok(accessor);
        }
        if let Some(accessor) = Self::scan(bucket, ty) {
            log::trace!("`{}` resolved through another descriptor instance", ty.type_path());
            return Ok(accessor);
        }

        self.compilations.fetch_add(1, Ordering::Relaxed);
        let accessor: &'static Accessor = Box::leak(Box::new(AccessorCompiler::compile(ty)?));

        // Every add happens under the lock, so this is the first.
        let accessor = match bucket.try_add(ty, accessor) {
            Ok(&accessor) | Err(&accessor) => accessor,
        };
        self.published.fetch_add(1, Ordering::Release);
        Ok(accessor)
    }
}

impl Default for AccessorRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorRegistry")
            .field("len", &self.len())
            .field("compilations", &self.compilations())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Global API

/// Returns the accessor of `ty` from the [global](AccessorRegistry::global)
/// registry, compiling it first if needed.
#[inline]
pub fn resolve_accessor(ty: &'static TypeDescriptor) -> Result<&'static Accessor, CompileError> {
    AccessorRegistry::global().get_or_create(ty)
}

/// Returns the accessor of `T` from the [global](AccessorRegistry::global)
/// registry, compiling it first if needed.
#[inline]
pub fn accessor_of<T: Accessible>() -> Result<&'static Accessor, CompileError> {
    AccessorRegistry::global().of::<T>()
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec::Vec;
    use std::sync::Barrier;
    use std::thread;

    use vc_os::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use vc_os::sync::{Mutex, PoisonError};

    use super::AccessorRegistry;
    use crate::info::{MemberInfo, NonGenericDescriptorCell, TypeDescriptor, TypeKind, TypeShape};
    use crate::{Accessible, CompileError};

    macro_rules! accessible {
        ($ty:ident => $shape:expr) => {
            impl Accessible for $ty {
                fn type_descriptor() -> &'static TypeDescriptor {
                    static CELL: NonGenericDescriptorCell = NonGenericDescriptorCell::new();
                    CELL.get_or_init(TypeDescriptor::of::<Self>)
                }

                fn type_shape() -> TypeShape {
                    $shape
                }
            }
        };
    }

    static SHAPES_BUILT: AtomicUsize = AtomicUsize::new(0);

    struct Counted {
        value: i32,
    }
    accessible!(Counted => {
        SHAPES_BUILT.fetch_add(1, Ordering::SeqCst);
        TypeShape::new(TypeKind::Reference)
            .with_member(MemberInfo::field::<Counted, i32>("value", |c| &c.value, |c| &mut c.value))
    });

    #[test]
    fn concurrent_first_use_compiles_once() {
        const THREADS: usize = 16;

        let registry = AccessorRegistry::new();
        let barrier = Barrier::new(THREADS);

        let seen: Vec<usize> = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        let accessor = registry.of::<Counted>().unwrap();
                        core::ptr::from_ref(accessor) as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(seen.iter().all(|&addr| addr == seen[0]));
        assert_eq!(SHAPES_BUILT.load(Ordering::SeqCst), 1);
        assert_eq!(registry.compilations(), 1);
        assert_eq!(registry.len(), 1);
    }

    static FAIL_NEXT: AtomicBool = AtomicBool::new(true);

    struct Flaky {
        value: u8,
    }
    accessible!(Flaky => {
        let shape = TypeShape::new(TypeKind::Reference)
            .with_member(MemberInfo::field::<Flaky, u8>("value", |f| &f.value, |f| &mut f.value));
        if FAIL_NEXT.swap(false, Ordering::SeqCst) {
            shape.with_member(MemberInfo::readonly_field::<Flaky, u8>("value", |f| &f.value))
        } else {
            shape
        }
    });

    #[test]
    fn failures_are_not_cached() {
        let registry = AccessorRegistry::new();

        let error = registry.of::<Flaky>().unwrap_err();
        assert!(matches!(error, CompileError::DuplicateMember { name: "value", .. }));
        assert!(registry.get(Flaky::type_descriptor()).is_none());
        assert!(registry.is_empty());

        let accessor = registry.of::<Flaky>().unwrap();
        assert_eq!(accessor.len(), 1);
        assert_eq!(registry.compilations(), 2);
        assert_eq!(registry.len(), 1);
    }

    static NESTED_REGISTRY: AccessorRegistry = AccessorRegistry::new();
    static NESTED_RESULT: Mutex<Option<CompileError>> = Mutex::new(None);

    struct Inner {
        value: u8,
    }
    accessible!(Inner => TypeShape::new(TypeKind::Reference)
        .with_member(MemberInfo::field::<Inner, u8>("value", |i| &i.value, |i| &mut i.value)));

    struct Outer;
    accessible!(Outer => {
        if let Err(error) = NESTED_REGISTRY.of::<Inner>() {
            *NESTED_RESULT.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        }
        TypeShape::new(TypeKind::Reference)
    });

    #[test]
    fn reentrant_compilation_fails_instead_of_deadlocking() {
        assert!(NESTED_REGISTRY.of::<Outer>().is_ok());

        let nested = NESTED_RESULT.lock().unwrap().take();
        assert!(matches!(nested, Some(CompileError::Reentrant { .. })));

        // Outside of a compilation the inner type compiles normally.
        assert!(NESTED_REGISTRY.of::<Inner>().is_ok());
        assert_eq!(NESTED_REGISTRY.len(), 2);
    }

    static FIRST_REGISTRY: AccessorRegistry = AccessorRegistry::new();
    static SECOND_REGISTRY: AccessorRegistry = AccessorRegistry::new();
    static CROSS_RESULT: Mutex<Option<CompileError>> = Mutex::new(None);

    struct Nested {
        value: u8,
    }
    accessible!(Nested => TypeShape::new(TypeKind::Reference)
        .with_member(MemberInfo::field::<Nested, u8>("value", |n| &n.value, |n| &mut n.value)));

    struct Crossing;
    accessible!(Crossing => {
        if let Err(error) = SECOND_REGISTRY.of::<Nested>() {
            *CROSS_RESULT.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
        }
        TypeShape::new(TypeKind::Reference)
    });

    #[test]
    fn one_compilation_per_thread_across_registries() {
        assert!(FIRST_REGISTRY.of::<Crossing>().is_ok());

        let nested = CROSS_RESULT.lock().unwrap().take();
        assert!(matches!(
            nested,
            Some(CompileError::Reentrant { type_path }) if type_path.ends_with("Nested")
        ));
        assert!(SECOND_REGISTRY.is_empty());
        assert_eq!(SECOND_REGISTRY.compilations(), 0);

        assert!(SECOND_REGISTRY.of::<Nested>().is_ok());
    }

    #[test]
    fn other_descriptor_instances_share_the_accessor() {
        let registry = AccessorRegistry::new();
        let interned = registry.of::<Inner>().unwrap();

        let copy: &'static TypeDescriptor = Box::leak(Box::new(TypeDescriptor::of::<Inner>()));
        assert!(!core::ptr::eq(copy, Inner::type_descriptor()));

        let bucket = registry.bucket(copy);
        for _ in 0..3 {
            let via_copy = registry.get_or_create(copy).unwrap();
            assert!(core::ptr::eq(interned, via_copy));
        }
        assert!(core::ptr::eq(registry.get(copy).unwrap(), interned));
        assert_eq!(registry.compilations(), 1);

        // Copies are matched, never stored.
        assert_eq!(bucket.len(), 1);
        assert_eq!(registry.len(), 1);
    }
}
