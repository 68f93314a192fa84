use core::any::TypeId;
use core::fmt::Debug;

use crate::hash::{HashMap, NoOpHashState};

// -----------------------------------------------------------------------------
// TypeIdMap

/// A map keyed by [`TypeId`].
///
/// `TypeId` is already a well-mixed hash, so the map skips hashing
/// entirely through [`NoOpHashState`].
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use vc_utils::TypeIdMap;
///
/// let mut map = TypeIdMap::new();
/// assert_eq!(*map.get_or_insert(TypeId::of::<u32>(), || "u32"), "u32");
/// assert_eq!(*map.get_or_insert(TypeId::of::<u32>(), || "again"), "u32");
/// assert_eq!(map.get(&TypeId::of::<u32>()), Some(&"u32"));
/// ```
pub struct TypeIdMap<V>(HashMap<TypeId, V, NoOpHashState>);

impl<V> TypeIdMap<V> {
    /// Creates an empty `TypeIdMap`.
    #[inline]
    pub const fn new() -> Self {
        Self(HashMap::with_hasher(NoOpHashState))
    }

    /// Returns the value for `type_id`, inserting the result of `f` first
    /// if the key is absent.
    #[inline]
    pub fn get_or_insert(&mut self, type_id: TypeId, f: impl FnOnce() -> V) -> &mut V {
        self.0.entry(type_id).or_insert_with(f)
    }

    /// Returns a reference to the value stored for `type_id`.
    #[inline]
    pub fn get(&self, type_id: &TypeId) -> Option<&V> {
        self.0.get(type_id)
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<V> Default for TypeIdMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for TypeIdMap<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use super::TypeIdMap;

    #[test]
    fn get_or_insert_runs_once() {
        let mut map = TypeIdMap::new();
        let mut calls = 0;
        for _ in 0..3 {
            map.get_or_insert(TypeId::of::<i64>(), || {
                calls += 1;
                calls
            });
        }
        assert_eq!(calls, 1);
        assert_eq!(map.get(&TypeId::of::<i64>()), Some(&1));
    }

    #[test]
    fn distinct_types_do_not_collide() {
        let mut map = TypeIdMap::new();
        map.get_or_insert(TypeId::of::<u8>(), || 'a');
        map.get_or_insert(TypeId::of::<i8>(), || 'b');
        assert_eq!(map.get(&TypeId::of::<u8>()), Some(&'a'));
        assert_eq!(map.get(&TypeId::of::<i8>()), Some(&'b'));
        assert!(map.get(&TypeId::of::<u16>()).is_none());
    }
}
