use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use vc_utils::hash::HashMap;

use crate::info::{MemberDescriptor, MemberInfo, TypeDescriptor, TypeKind};
use crate::{AccessError, DynamicAccessible, HostAccess, Value};

// -----------------------------------------------------------------------------
// DispatchMode

/// How an [`Accessor`] reaches members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchMode {
    /// Through the closures captured in each [`MemberInfo`].
    Direct,
    /// Through the type's [`MemberHost`](crate::MemberHost).
    Indirect,
}

// -----------------------------------------------------------------------------
// Accessor

/// The compiled, per-type member dispatch table.
///
/// Built once by the [`AccessorCompiler`](crate::AccessorCompiler) and never
/// modified afterwards, so one accessor can serve any number of threads and
/// targets at the same time.
///
/// Both dispatch modes follow the same contract:
///
/// - [`get`](Self::get) finds readable members only and reports anything else
///   as [`MemberNotFound`].
/// - [`set`](Self::set) refuses every write to a value type with
///   [`ReadOnlyTarget`], whatever the name. Otherwise it finds writable
///   members only, then checks the value's type.
/// - Names are compared exactly.
///
/// # Examples
///
/// ```
/// use vc_access::{AccessError, Value, accessor_of, derive::Accessible};
///
/// #[derive(Accessible)]
/// pub struct Account {
///     pub owner: String,
///     #[access(readonly)]
///     pub balance: i64,
/// }
///
/// let accessor = accessor_of::<Account>().unwrap();
/// let mut account = Account { owner: "ann".into(), balance: 10 };
///
/// accessor.set(&mut account, "owner", Value::new(String::from("bob"))).unwrap();
/// assert_eq!(account.owner, "bob");
///
/// let error = accessor.set(&mut account, "balance", Value::new(0_i64)).unwrap_err();
/// assert!(matches!(error, AccessError::MemberNotFound { .. }));
/// ```
///
/// [`MemberNotFound`]: AccessError::MemberNotFound
/// [`ReadOnlyTarget`]: AccessError::ReadOnlyTarget
pub struct Accessor {
    pub(crate) descriptor: &'static TypeDescriptor,
    pub(crate) kind: TypeKind,
    pub(crate) mode: DispatchMode,
    // Addressable members, in declaration order.
    pub(crate) members: Box<[MemberInfo]>,
    // `None` when the member count allows a linear scan.
    pub(crate) index: Option<HashMap<&'static str, usize>>,
    pub(crate) host: Option<HostAccess>,
    pub(crate) constructor: Option<fn() -> Box<dyn DynamicAccessible>>,
}

impl Accessor {
    /// Reads the member `name` of `target`.
    pub fn get(&self, target: &dyn Any, name: &str) -> Result<Value, AccessError> {
        self.check_target(target)?;

        let member = self
            .find(name)
            .filter(|member| member.descriptor.is_readable())
            .ok_or_else(|| self.not_found(name))?;

        let value = match self.mode {
            DispatchMode::Direct => member.getter.as_ref().and_then(|getter| getter(target)),
            DispatchMode::Indirect => self
                .host
                .and_then(|host| host.host_ref(target))
                .and_then(|host| host.host_get(name)),
        };

        value.ok_or_else(|| self.not_found(name))
    }

    /// Writes `value` into the member `name` of `target`.
    pub fn set(&self, target: &mut dyn Any, name: &str, value: Value) -> Result<(), AccessError> {
        self.check_target(target)?;

        if self.kind == TypeKind::Value {
            return Err(AccessError::ReadOnlyTarget {
                type_path: self.descriptor.type_path(),
                name: name.into(),
            });
        }

        let member = self
            .find(name)
            .filter(|member| member.descriptor.is_writable())
            .ok_or_else(|| self.not_found(name))?;

        if value.type_id() != member.descriptor.value_type_id() {
            return Err(AccessError::TypeMismatch {
                type_path: self.descriptor.type_path(),
                name: name.into(),
                expected: member.descriptor.value_type(),
                found: value.type_name(),
            });
        }

        let result = match self.mode {
            DispatchMode::Direct => match &member.setter {
                Some(setter) => setter(target, value),
                None => Err(value),
            },
            DispatchMode::Indirect => match self.host.and_then(|host| host.host_mut(target)) {
                Some(host) => host.host_set(name, value),
                None => Err(value),
            },
        };

        result.map_err(|_| self.not_found(name))
    }

    /// Creates a new instance with the type's parameterless constructor.
    pub fn create_new(&self) -> Result<Box<dyn DynamicAccessible>, AccessError> {
        match self.constructor {
            Some(constructor) => Ok(constructor()),
            None => Err(AccessError::UnsupportedOperation {
                type_path: self.descriptor.type_path(),
            }),
        }
    }

    /// Returns `true` if [`create_new`](Self::create_new) can succeed: the
    /// type is a concrete reference type with a parameterless constructor.
    #[inline]
    pub fn supports_create_new(&self) -> bool {
        self.constructor.is_some()
    }

    #[inline]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    #[inline]
    pub fn type_kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn dispatch_mode(&self) -> DispatchMode {
        self.mode
    }

    /// Iterates over the addressable members in declaration order.
    #[inline]
    pub fn members(&self) -> impl ExactSizeIterator<Item = &MemberDescriptor> {
        self.members.iter().map(MemberInfo::descriptor)
    }

    /// Returns the addressable member called `name`.
    #[inline]
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.find(name).map(MemberInfo::descriptor)
    }

    /// Returns the number of addressable members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn is_hashed(&self) -> bool {
        self.index.is_some()
    }

    fn find(&self, name: &str) -> Option<&MemberInfo> {
        match &self.index {
            Some(index) => index.get(name).map(|&position| &self.members[position]),
            None => self.members.iter().find(|member| member.name() == name),
        }
    }

    #[inline]
    fn check_target(&self, target: &dyn Any) -> Result<(), AccessError> {
        if Any::type_id(target) == self.descriptor.type_id() {
            Ok(())
        } else {
            Err(AccessError::TargetMismatch {
                expected: self.descriptor.type_path(),
            })
        }
    }

    #[cold]
    fn not_found(&self, name: &str) -> AccessError {
        AccessError::MemberNotFound {
            type_path: self.descriptor.type_path(),
            name: name.into(),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("type_path", &self.descriptor.type_path())
            .field("kind", &self.kind)
            .field("mode", &self.mode)
            .field("members", &self.members)
            .field("create_new", &self.constructor.is_some())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use crate::info::{MemberInfo, NonGenericDescriptorCell, TypeDescriptor, TypeKind, TypeShape};
    use crate::{AccessError, Accessible, AccessorCompiler, Value};

    #[derive(Clone, Copy)]
    struct Size {
        width: u32,
        height: u32,
    }

    impl Accessible for Size {
        fn type_descriptor() -> &'static TypeDescriptor {
            static CELL: NonGenericDescriptorCell = NonGenericDescriptorCell::new();
            CELL.get_or_init(TypeDescriptor::of::<Self>)
        }

        fn type_shape() -> TypeShape {
            TypeShape::new(TypeKind::Value)
                .with_member(MemberInfo::field::<Self, u32>("width", |s| &s.width, |s| &mut s.width))
                .with_member(MemberInfo::field::<Self, u32>("height", |s| &s.height, |s| &mut s.height))
        }
    }

    #[derive(Default)]
    struct Label {
        text: String,
        hits: u32,
    }

    impl Label {
        fn len(&self) -> usize {
            self.text.len()
        }

        fn reset(&mut self, hits: u32) {
            self.hits = hits;
        }
    }

    impl Accessible for Label {
        fn type_descriptor() -> &'static TypeDescriptor {
            static CELL: NonGenericDescriptorCell = NonGenericDescriptorCell::new();
            CELL.get_or_init(TypeDescriptor::of::<Self>)
        }

        fn type_shape() -> TypeShape {
            TypeShape::new(TypeKind::Reference)
                .with_member(MemberInfo::field::<Self, String>("text", |l| &l.text, |l| &mut l.text))
                .with_member(MemberInfo::readonly_field::<Self, u32>("hits", |l| &l.hits))
                .with_member(MemberInfo::readonly_property::<Self, usize>("len", Self::len))
                .with_member(MemberInfo::writeonly_property::<Self, u32>("reset", Self::reset))
                .with_default_constructor::<Self>()
        }
    }

    #[test]
    fn value_types_refuse_every_write() {
        let accessor = AccessorCompiler::compile(Size::type_descriptor()).unwrap();
        let mut size = Size { width: 3, height: 4 };

        for name in ["width", "height", "missing"] {
            let error = accessor.set(&mut size, name, Value::new(7_u32)).unwrap_err();
            assert!(matches!(error, AccessError::ReadOnlyTarget { .. }), "{name}");
        }
        assert_eq!(accessor.get(&size, "height").unwrap().downcast::<u32>().unwrap(), 4);
        assert_eq!(size.width, 3);
        assert!(!accessor.supports_create_new());
    }

    #[test]
    fn capabilities_decide_visibility() {
        let accessor = AccessorCompiler::compile(Label::type_descriptor()).unwrap();
        let mut label = Label::default();

        accessor.set(&mut label, "text", Value::new(String::from("four"))).unwrap();
        assert_eq!(accessor.get(&label, "len").unwrap().downcast::<usize>().unwrap(), 4);

        // Write-only members are invisible to `get`, read-only ones to `set`.
        assert!(matches!(accessor.get(&label, "reset"), Err(AccessError::MemberNotFound { .. })));
        assert!(matches!(
            accessor.set(&mut label, "hits", Value::new(1_u32)),
            Err(AccessError::MemberNotFound { .. })
        ));

        accessor.set(&mut label, "reset", Value::new(9_u32)).unwrap();
        assert_eq!(accessor.get(&label, "hits").unwrap().downcast::<u32>().unwrap(), 9);
    }

    #[test]
    fn wrong_value_type_is_reported() {
        let accessor = AccessorCompiler::compile(Label::type_descriptor()).unwrap();
        let mut label = Label::default();

        let error = accessor.set(&mut label, "text", Value::new(5_i32)).unwrap_err();
        assert_eq!(
            error,
            AccessError::TypeMismatch {
                type_path: Label::type_descriptor().type_path(),
                name: "text".into(),
                expected: "alloc::string::String",
                found: "i32",
            }
        );
        assert!(label.text.is_empty());
    }

    #[test]
    fn wrong_target_is_reported() {
        let accessor = AccessorCompiler::compile(Label::type_descriptor()).unwrap();
        let size = Size { width: 1, height: 1 };
        assert!(matches!(accessor.get(&size, "text"), Err(AccessError::TargetMismatch { .. })));
    }

    #[test]
    fn names_are_case_sensitive() {
        let accessor = AccessorCompiler::compile(Label::type_descriptor()).unwrap();
        let label = Label::default();
        assert!(accessor.get(&label, "text").is_ok());
        assert!(accessor.get(&label, "Text").is_err());
        assert!(accessor.member("TEXT").is_none());
    }

    #[test]
    fn create_new_builds_distinct_instances() {
        let accessor = AccessorCompiler::compile(Label::type_descriptor()).unwrap();
        assert!(accessor.supports_create_new());

        let a = accessor.create_new().unwrap();
        let b = accessor.create_new().unwrap();
        assert!(a.is::<Label>());
        assert!(!core::ptr::addr_eq(&*a, &*b));
    }
}
