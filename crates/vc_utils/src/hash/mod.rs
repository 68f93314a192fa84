//! Provide hash containers, re-exports *hashbrown* and *foldhash*.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
///
/// Hash results only depend on the input, so two maps built from the same
/// keys probe identically across runs.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// Hashes a single value with [`FixedHashState`].
///
/// # Examples
///
/// ```
/// use vc_utils::hash::hash_one;
///
/// assert_eq!(hash_one(&"id"), hash_one(&"id"));
/// ```
#[inline]
pub fn hash_one<T: core::hash::Hash + ?Sized>(value: &T) -> u64 {
    core::hash::BuildHasher::hash_one(&FixedHashState, value)
}

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;
