use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Deref, DerefMut};

use crate::{AccessError, Accessor, AccessorRegistry, DynamicAccessible, Value};

// -----------------------------------------------------------------------------
// NamePolicy

/// How an [`ObjectHandle`] matches member names.
///
/// Normalization happens in the handle. The [`Accessor`] itself only ever
/// sees exact names, so one compiled accessor serves every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NamePolicy {
    #[default]
    Exact,
    /// An exact match wins; otherwise the first member whose name matches
    /// ignoring ASCII case.
    IgnoreAsciiCase,
}

impl NamePolicy {
    fn resolve<'a>(self, accessor: &Accessor, name: &'a str) -> &'a str {
        match self {
            Self::Exact => name,
            Self::IgnoreAsciiCase => {
                if accessor.member(name).is_some() {
                    return name;
                }
                accessor
                    .members()
                    .find(|member| member.name().eq_ignore_ascii_case(name))
                    .map_or(name, |member| member.name())
            }
        }
    }
}

// -----------------------------------------------------------------------------
// ObjectHandle

/// One target bound to its type's [`Accessor`].
///
/// `R` is any pointer to the target: `&T`, `&mut T`, `Box<T>`,
/// `Box<dyn DynamicAccessible>` and so on. Reads need `R: Deref`, writes
/// need `R: DerefMut`. A handle does not own more than `R` does, and several
/// shared handles can wrap the same target.
///
/// Equality, hashing and formatting are the target's own, so a handle can
/// stand in for its target in hashed containers.
///
/// # Examples
///
/// ```
/// use vc_access::{AccessError, NamePolicy, ObjectHandle, derive::Accessible};
///
/// #[derive(Accessible)]
/// pub struct Item {
///     pub id: i32,
///     pub name: String,
/// }
///
/// let mut item = Item { id: 1, name: "cup".into() };
/// let mut handle = ObjectHandle::new(&mut item)
///     .unwrap()
///     .with_name_policy(NamePolicy::IgnoreAsciiCase);
///
/// handle.set_value("ID", 7_i32).unwrap();
/// assert_eq!(handle.get_as::<i32>("Id").unwrap(), 7);
/// assert!(matches!(handle.get("Missing"), Err(AccessError::MemberNotFound { .. })));
///
/// let none: Option<&Item> = None;
/// assert!(matches!(ObjectHandle::create(none), Err(AccessError::NullTarget)));
/// ```
pub struct ObjectHandle<R> {
    target: R,
    accessor: &'static Accessor,
    names: NamePolicy,
}

impl<R> ObjectHandle<R>
where
    R: Deref,
    R::Target: DynamicAccessible,
{
    /// Binds `target` to its accessor from the global registry.
    ///
    /// Fails with [`AccessError::NullTarget`] when `target` is `None`.
    #[inline]
    pub fn create(target: Option<R>) -> Result<Self, AccessError> {
        let target = target.ok_or(AccessError::NullTarget)?;
        Self::with_registry(target, AccessorRegistry::global())
    }

    /// Binds `target` to its accessor from the global registry.
    #[inline]
    pub fn new(target: R) -> Result<Self, AccessError> {
        Self::with_registry(target, AccessorRegistry::global())
    }

    /// Binds `target` to its accessor from `registry`.
    pub fn with_registry(target: R, registry: &AccessorRegistry) -> Result<Self, AccessError> {
        let accessor = registry.get_or_create(target.deref().reflect_descriptor())?;
        Ok(Self {
            target,
            accessor,
            names: NamePolicy::Exact,
        })
    }

    #[inline]
    pub fn with_name_policy(mut self, names: NamePolicy) -> Self {
        self.names = names;
        self
    }

    #[inline]
    pub fn name_policy(&self) -> NamePolicy {
        self.names
    }

    /// Reads the member `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Result<Value, AccessError> {
        let name = self.names.resolve(self.accessor, name);
        self.accessor.get(self.target.deref().as_any(), name)
    }

    /// Reads the member `name` as a `V`.
    pub fn get_as<V: Any>(&self, name: &str) -> Result<V, AccessError> {
        self.get(name)?
            .downcast::<V>()
            .map_err(|value| AccessError::TypeMismatch {
                type_path: self.accessor.descriptor().type_path(),
                name: name.into(),
                expected: value.type_name(),
                found: core::any::type_name::<V>(),
            })
    }

    #[inline]
    pub fn target(&self) -> &R::Target {
        &self.target
    }

    #[inline]
    pub fn accessor(&self) -> &'static Accessor {
        self.accessor
    }

    /// Unbinds the handle and returns the target pointer.
    #[inline]
    pub fn into_inner(self) -> R {
        self.target
    }
}

impl<R> ObjectHandle<R>
where
    R: DerefMut,
    R::Target: DynamicAccessible,
{
    /// Writes `value` into the member `name`.
    #[inline]
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
        let name = self.names.resolve(self.accessor, name);
        self.accessor
            .set(self.target.deref_mut().as_any_mut(), name, value)
    }

    /// Writes `value` into the member `name`.
    #[inline]
    pub fn set_value<V: Any + Send + Sync>(&mut self, name: &str, value: V) -> Result<(), AccessError> {
        self.set(name, Value::new(value))
    }

    #[inline]
    pub fn target_mut(&mut self) -> &mut R::Target {
        &mut self.target
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<R, S> PartialEq<ObjectHandle<S>> for ObjectHandle<R>
where
    R: Deref,
    S: Deref,
    R::Target: PartialEq<S::Target>,
{
    #[inline]
    fn eq(&self, other: &ObjectHandle<S>) -> bool {
        *self.target == *other.target
    }
}

impl<R> Eq for ObjectHandle<R>
where
    R: Deref,
    R::Target: Eq,
{
}

impl<R> Hash for ObjectHandle<R>
where
    R: Deref,
    R::Target: Hash,
{
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

impl<R> fmt::Display for ObjectHandle<R>
where
    R: Deref,
    R::Target: fmt::Display,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.target, f)
    }
}

impl<R> fmt::Debug for ObjectHandle<R>
where
    R: Deref,
    R::Target: fmt::Debug,
{
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.target, f)
    }
}

// -----------------------------------------------------------------------------
// Tests
