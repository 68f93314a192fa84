#![expect(unsafe_code, reason = "lock-free linked list")]

//! An append-only, identity-keyed cache.
//!
//! The memo is a singly-linked chain of immutable nodes. Readers walk the
//! chain from an atomic snapshot of the head and never lock. Writers link a
//! new node in front of the snapshot and publish it with a compare-and-swap,
//! retrying when another writer got there first.
//!
//! Nodes are never modified or unlinked while the memo is alive, which is
//! what makes the unsynchronized walk sound. The price is that lookups are
//! linear, so the memo suits small key sets (tens to low hundreds of keys).

use alloc::boxed::Box;
use core::fmt::{self, Debug};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr;

use vc_os::sync::atomic::{AtomicPtr, Ordering};
use vc_os::utils::Backoff;

// -----------------------------------------------------------------------------
// Node

struct Node<K: ?Sized + 'static, V> {
    key: &'static K,
    value: V,
    next: *mut Node<K, V>,
}

// -----------------------------------------------------------------------------
// AppendOnlyMemo

/// A lock-free map from `&'static K` to `V`, compared by address.
///
/// Two keys are the same key only if they are the same reference. Keys must
/// therefore be canonical instances (interned descriptors, statics, leaked
/// boxes), never equal-but-distinct values.
///
/// - [`try_get`](Self::try_get) never blocks and never misses a key whose
///   [`try_add`](Self::try_add) has returned.
/// - `try_add` stores a key at most once. Later adds of the same key return
///   the stored value and drop theirs.
///
/// # Examples
///
/// ```
/// use vc_access::AppendOnlyMemo;
///
/// static RED: &str = "red";
/// static BLUE: &str = "blue";
///
/// let memo = AppendOnlyMemo::<&str, u32>::new();
/// assert_eq!(memo.try_add(&RED, 1), Ok(&1));
/// assert_eq!(memo.try_add(&RED, 2), Err(&1));
/// assert_eq!(memo.try_get(&RED), Some(&1));
/// assert_eq!(memo.try_get(&BLUE), None);
/// ```
pub struct AppendOnlyMemo<K: ?Sized + 'static, V> {
    head: AtomicPtr<Node<K, V>>,
    _marker: PhantomData<Box<Node<K, V>>>,
}

// SAFETY: The memo owns its values and only hands out shared references to
// keys and values, so it can move or be shared like a `Vec<(&K, V)>`.
unsafe impl<K: ?Sized + Sync, V: Send> Send for AppendOnlyMemo<K, V> {}
// SAFETY: Shared access only reads nodes and publishes new ones with a CAS.
// Values added on one thread are dropped on another, hence `V: Send`.
unsafe impl<K: ?Sized + Sync, V: Send + Sync> Sync for AppendOnlyMemo<K, V> {}

impl<K: ?Sized + 'static, V> AppendOnlyMemo<K, V> {
    /// Creates an empty memo.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: AtomicPtr::new(ptr::null_mut()),
            _marker: PhantomData,
        }
    }

    /// Returns the value stored for `key`.
    #[inline]
    pub fn try_get(&self, key: &K) -> Option<&V> {
        let head = self.head.load(Ordering::Acquire);
        self.find(head, ptr::null_mut(), key)
    }

    /// Stores `value` for `key` unless the key is already present.
    ///
    /// Returns `Ok` with the stored value on the first successful insertion,
    /// or `Err` with the value some earlier insertion stored. In the latter
    /// case `value` is dropped.
    pub fn try_add(&self, key: &'static K, value: V) -> Result<&V, &V> {
        let backoff = Backoff::new();
        let mut head = self.head.load(Ordering::Acquire);
        // Everything from `checked` down has already been searched.
        let mut checked = ptr::null_mut();

        let node = Box::into_raw(Box::new(Node {
            key,
            value,
            next: head,
        }));

        loop {
            if let Some(existing) = self.find(head, checked, key) {
                // SAFETY: `node` was never published.
                drop(unsafe { Box::from_raw(node) });
                return Err(existing);
            }

            // SAFETY: `node` is still private to this thread.
            unsafe { (*node).next = head };

            match self
                .head
                .compare_exchange(head, node, Ordering::AcqRel, Ordering::Acquire)
            {
                // SAFETY: Published nodes live until the memo is dropped.
                Ok(_) => return Ok(unsafe { &(*node).value }),
                Err(actual) => {
                    checked = head;
                    head = actual;
                    backoff.spin();
                }
            }
        }
    }

    /// Returns the value stored for `key`, adding the result of `f` first if
    /// the key is absent.
    ///
    /// `f` may run even if a racing thread wins the insertion; its result is
    /// then dropped.
    pub fn get_or_add_with(&self, key: &'static K, f: impl FnOnce() -> V) -> &V {
        match self.try_get(key) {
            Some(value) => value,
            None => match self.try_add(key, f()) {
                Ok(value) | Err(value) => value,
            },
        }
    }

    /// Iterates over a snapshot of the entries, newest first.
    #[inline]
    pub fn iter(&self) -> MemoIter<'_, K, V> {
        MemoIter {
            next: self.head.load(Ordering::Acquire),
            _marker: PhantomData,
        }
    }

    /// Returns the number of entries. This walks the whole chain.
    #[inline]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire).is_null()
    }

    // Searches `[from, until)` for `key`.
    fn find(&self, from: *mut Node<K, V>, until: *mut Node<K, V>, key: &K) -> Option<&V> {
        let mut current = from;
        while current != until {
            // SAFETY: `current` was reached from the head, and published
            // nodes are immutable until the memo is dropped.
            let node = unsafe { &*current };
            if ptr::eq(node.key, key) {
                return Some(&node.value);
            }
            current = node.next;
        }
        None
    }
}

impl<K: ?Sized + 'static, V> Drop for AppendOnlyMemo<K, V> {
    fn drop(&mut self) {
        let mut current = *self.head.get_mut();
        while !current.is_null() {
            // SAFETY: `&mut self` means no reader remains, and every node
            // came from `Box::into_raw`.
            let node = unsafe { Box::from_raw(current) };
            current = node.next;
        }
    }
}

impl<K: ?Sized + 'static, V> Default for AppendOnlyMemo<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized + Debug + 'static, V: Debug> Debug for AppendOnlyMemo<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// MemoIter

/// Iterator over the entries of an [`AppendOnlyMemo`], newest first.
///
/// Entries added after the iterator was created are not visited.
pub struct MemoIter<'a, K: ?Sized + 'static, V> {
    next: *const Node<K, V>,
    _marker: PhantomData<&'a V>,
}

impl<'a, K: ?Sized + 'static, V> Iterator for MemoIter<'a, K, V> {
    type Item = (&'static K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        // SAFETY: See `AppendOnlyMemo::find`. The borrow of the memo keeps
        // every node alive for `'a`.
        let node = unsafe { self.next.as_ref()? };
        self.next = node.next;
        Some((node.key, &node.value))
    }
}

impl<K: ?Sized + 'static, V> FusedIterator for MemoIter<'_, K, V> {}

// SAFETY: Same as the memo: the iterator only reads published nodes.
unsafe impl<K: ?Sized + Sync, V: Sync> Send for MemoIter<'_, K, V> {}
// SAFETY: Same as above.
unsafe impl<K: ?Sized + Sync, V: Sync> Sync for MemoIter<'_, K, V> {}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec::Vec;
    use std::thread;

    use vc_os::sync::Arc;
    use vc_os::sync::atomic::{AtomicUsize, Ordering};

    use super::AppendOnlyMemo;

    static A: u32 = 7;
    static B: u32 = 7;
    static C: u32 = 9;

    #[test]
    fn keys_compare_by_identity() {
        let memo = AppendOnlyMemo::<u32, &str>::new();
        assert!(memo.is_empty());

        assert_eq!(memo.try_add(&A, "a"), Ok(&"a"));
        // `B` equals `A` by value but is a distinct key.
        assert_eq!(memo.try_get(&B), None);
        assert_eq!(memo.try_add(&B, "b"), Ok(&"b"));

        assert_eq!(memo.try_get(&A), Some(&"a"));
        assert_eq!(memo.try_get(&B), Some(&"b"));
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn repeated_add_keeps_first_value() {
        let memo = AppendOnlyMemo::<u32, u64>::new();
        assert_eq!(memo.try_add(&C, 1), Ok(&1));
        for attempt in 2..10 {
            assert_eq!(memo.try_add(&C, attempt), Err(&1));
        }
        assert_eq!(memo.try_get(&C), Some(&1));
        assert_eq!(*memo.get_or_add_with(&C, || 100), 1);
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn iter_is_newest_first() {
        let memo = AppendOnlyMemo::<u32, char>::new();
        let _ = memo.try_add(&A, 'a');
        let _ = memo.try_add(&C, 'c');

        let entries: Vec<char> = memo.iter().map(|(_, v)| *v).collect();
        assert_eq!(entries, ['c', 'a']);
    }

    struct Tracked(Arc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn rejected_and_stored_values_are_dropped() {
        let drops = Arc::new(AtomicUsize::new(0));
        let memo = AppendOnlyMemo::<u32, Tracked>::new();

        assert!(memo.try_add(&A, Tracked(drops.clone())).is_ok());
        assert!(memo.try_add(&A, Tracked(drops.clone())).is_err());
        assert_eq!(drops.load(Ordering::Relaxed), 1);

        drop(memo);
        assert_eq!(drops.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn concurrent_adds_store_once() {
        const THREADS: usize = 8;
        const KEYS: usize = 32;

        let keys: Vec<&'static usize> = (0..KEYS).map(|i| &*Box::leak(Box::new(i))).collect();
        let memo = AppendOnlyMemo::<usize, usize>::new();
        let wins = AtomicUsize::new(0);

        thread::scope(|scope| {
            for thread_index in 0..THREADS {
                let (keys, memo, wins) = (&keys, &memo, &wins);
                scope.spawn(move || {
                    for &key in keys {
                        let value = thread_index * 1000 + *key;
                        if memo.try_add(key, value).is_ok() {
                            wins.fetch_add(1, Ordering::Relaxed);
                        }
                        assert!(memo.try_get(key).is_some());
                    }
                });
            }
        });

        assert_eq!(wins.load(Ordering::Relaxed), KEYS);
        assert_eq!(memo.len(), KEYS);
        for &key in &keys {
            let stored = *memo.try_get(key).unwrap();
            assert_eq!(stored % 1000, *key);
        }
    }
}
