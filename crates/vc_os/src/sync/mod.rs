//! Useful synchronization primitives.
//!
//! Every `vc_*` crate takes its locks and atomics from here instead of
//! reaching into `std::sync` directly, so a platform swap only touches
//! this module.
//!
//! Poisoning is never treated as fatal by the callers in this workspace:
//! the protected data is either append-only or a unit token, so a guard is
//! recovered through [`PoisonError::into_inner`].
//!
//! See the [standard library] for further details.
//!
//! [standard library]: https://doc.rust-lang.org/std/sync/index.html

// -----------------------------------------------------------------------------
// Modules

pub mod atomic;

// -----------------------------------------------------------------------------
// Exports

pub use alloc::sync::Arc;

pub use std::sync::{Mutex, OnceLock, PoisonError, RwLock};
