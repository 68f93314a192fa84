//! Parsed derive input.

// -----------------------------------------------------------------------------
// Modules

mod access_struct;
mod attributes;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use access_struct::{AccessField, AccessStruct};
pub(crate) use attributes::{FieldAttributes, PropertyAttribute, TypeAttributes};
