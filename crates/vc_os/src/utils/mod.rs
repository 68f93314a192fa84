//! Low-level helpers built on atomic operations.
//!
//! - [`Backoff`] : exponential backoff for compare-and-swap retry loops.

// -----------------------------------------------------------------------------
// Modules

mod backoff;

// -----------------------------------------------------------------------------
// Exports

pub use backoff::Backoff;
