//! Provide atomic types.
//!
//! The accessor caches rely on atomic pointers, so targets without them are
//! not supported.
//!
//! See the [standard library] for further details.
//!
//! [standard library]: https://doc.rust-lang.org/core/sync/atomic

pub use core::sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering};
