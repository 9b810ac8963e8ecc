//! # Type Meta Cursor
//!
//! Navigate and mutate arbitrary compound values through compiled programs.
//!
//! ## Features
//!
//! - **Typed memory**: flat little-endian storage with string and list handles
//! - **Scoped navigation**: structs, inlined arrays, arrays, lists and maps
//! - **Widening accessors**: range-checked numeric and string conversions
//! - **Growth**: lists and maps resize through their handles
//!
//! ## Example
//!
//! ```rust
//! use meta_compiler::compile;
//! use meta_cursor::{Cursor, Memory};
//! use meta_spec::{Descriptor, PrimitiveKind, Registry};
//!
//! let mut registry = Registry::new();
//! let i32_id = registry.primitive(PrimitiveKind::I32);
//! let point = registry.register(Descriptor::structure([("x", i32_id), ("y", i32_id)]));
//! let program = compile(&mut registry, point).unwrap();
//!
//! let mut memory = Memory::new();
//! let base = memory.alloc_for(&program);
//!
//! let mut cursor = Cursor::open(&program, &mut memory, base).unwrap();
//! cursor.seek_by_name("y").unwrap();
//! cursor.set_int(7).unwrap();
//! assert_eq!(cursor.get_int().unwrap(), 7);
//! ```

mod access;
pub mod cursor;
pub mod error;
pub mod memory;
pub mod scope;

pub use cursor::Cursor;
pub use error::{CursorError, Result};
pub use memory::{Address, Handle, Memory};
pub use scope::{Position, ScopeKind};
