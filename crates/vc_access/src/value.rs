use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

/// An owned, type-erased member value.
///
/// Values move in and out of members through [`Accessor::get`] and
/// [`Accessor::set`]. The type name is kept for error messages.
///
/// # Examples
///
/// ```
/// use vc_access::Value;
///
/// let value = Value::new(7_i32);
/// assert!(value.is::<i32>());
/// assert_eq!(value.downcast_ref::<i32>(), Some(&7));
/// assert_eq!(value.downcast::<i32>().ok(), Some(7));
/// ```
///
/// [`Accessor::get`]: crate::Accessor::get
/// [`Accessor::set`]: crate::Accessor::set
pub struct Value {
    inner: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Value {
    /// Wraps `value`.
    #[inline]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the stored value.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        <dyn Any>::type_id(&*self.inner)
    }

    /// Returns the type name of the stored value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    /// Takes the value out as a `T`, or gives `self` back unchanged.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let Self { inner, type_name } = self;
        match inner.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Self { inner, type_name }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use core::any::TypeId;

    use super::Value;

    #[test]
    fn failed_downcast_returns_value() {
        let value = Value::new(String::from("text"));
        assert_eq!(value.type_id(), TypeId::of::<String>());

        let value = value.downcast::<i32>().unwrap_err();
        assert_eq!(value.type_name(), "alloc::string::String");
        assert_eq!(value.downcast::<String>().unwrap(), "text");
    }
}
