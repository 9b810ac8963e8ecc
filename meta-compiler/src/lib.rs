//! # Type Meta Compiler
//!
//! Compiles type descriptors into flat, memoized traversal programs.
//!
//! ## Features
//!
//! - **Depth-first flattening**: structs become `push`/`pop` bracketed blocks
//! - **Inlining**: fixed-size arrays of single-unit elements repeat in place
//! - **Memoization**: every compiled program is published to the registry
//! - **Bounded graphs**: cyclic and over-deep type graphs are rejected
//!
//! ## Example
//!
//! ```rust
//! use meta_compiler::compile;
//! use meta_spec::{Descriptor, PrimitiveKind, Registry};
//!
//! let mut registry = Registry::new();
//! let i32_id = registry.primitive(PrimitiveKind::I32);
//! let array = registry.register(Descriptor::Array { element: i32_id, count: 5 });
//!
//! let program = compile(&mut registry, array).unwrap();
//! assert_eq!(program.len(), 1);
//! assert_eq!(program.ops()[0].count, 5);
//! ```

pub mod compiler;
pub mod error;

pub use compiler::Compiler;
pub use error::{CompileError, Result};

use meta_spec::{Program, TypeId, TypeRegistry};
use std::sync::Arc;

/// Compile a type with the default configuration
pub fn compile<R>(registry: &mut R, type_id: TypeId) -> Result<Arc<Program>>
where
    R: TypeRegistry + ?Sized,
{
    Compiler::default().compile(registry, type_id)
}
