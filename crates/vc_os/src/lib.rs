//! Platform layer shared by the `vc_*` crates.
//!
//! - [`sync`]: the synchronization primitives the other crates are allowed to use.
//! - [`utils`]: small lock-free helpers built on atomics.
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern crates

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod sync;
pub mod utils;
