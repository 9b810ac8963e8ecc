//! # Type Meta Specification
//!
//! Core types shared by every stage of the reflection engine.
//!
//! ## Key Features
//! - Declarative type descriptors (primitive, enum, bitmask, struct, array, list, map)
//! - Flat operation programs with Push/Pop bracketed structs
//! - Explicit type registry with a per-type program cache
//! - String escaping helpers shared by the printer and the string setters

pub mod config;
pub mod descriptor;
pub mod error;
pub mod escape;
pub mod operation;
pub mod primitive;
pub mod program;
pub mod registry;

pub use config::{Config, ConfigError};
pub use descriptor::{Constants, Descriptor, DescriptorKind, Member, StructDescriptor};
pub use error::MetaError;
pub use escape::{escape_char, escape_string, escaped_len, unescape_char, unescape_string, EscapeError};
pub use operation::{MapLayout, OpCode, OpKind, Operation};
pub use primitive::PrimitiveKind;
pub use program::Program;
pub use registry::{Registry, TypeRegistry};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u64);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque entity identifier stored verbatim by entity fields
pub type EntityId = u64;

/// Size of a handle slot (strings, lists, maps) in bytes
pub const HANDLE_SIZE: usize = 8;

/// Default maximum cursor scope depth (>32 levels of nesting is not sane)
pub const MAX_SCOPE_DEPTH: usize = 32;

/// Default maximum type nesting depth seen by the compiler
pub const MAX_TYPE_DEPTH: usize = 32;

/// Largest size in bytes a compiled type may occupy
pub const MAX_VALUE_SIZE: usize = isize::MAX as usize;

/// Round `value` up to the next multiple of `alignment`
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        value
    } else {
        (value + alignment - 1) / alignment * alignment
    }
}

/// [`align_up`] that returns `None` instead of overflowing
#[inline]
pub const fn checked_align_up(value: usize, alignment: usize) -> Option<usize> {
    if alignment <= 1 {
        return Some(value);
    }
    match value.checked_add(alignment - 1) {
        Some(padded) => Some(padded / alignment * alignment),
        None => None,
    }
}
