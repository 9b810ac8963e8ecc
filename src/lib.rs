//! # typemeta
//!
//! Runtime reflection over plain memory: describe types, compile them to
//! flat operation programs, then read, write and print values through a
//! cursor.
//!
//! | Crate           | Role                                             |
//! |-----------------|--------------------------------------------------|
//! | `meta-spec`     | Descriptors, programs, registry, escaping        |
//! | `meta-compiler` | Descriptor to program compilation with caching   |
//! | `meta-cursor`   | Navigation and typed access over [`Memory`]      |
//! | `meta-printer`  | Human-readable rendering and program listings    |
//! | `meta-schema`   | Textual type definitions                         |
//!
//! ## Example
//!
//! ```rust
//! use typemeta::{compile, load_schema, render, Cursor, Memory, Registry};
//!
//! let mut registry = Registry::new();
//! let ids = load_schema(&mut registry, "struct Player { string name; u16 level; }").unwrap();
//! let program = compile(&mut registry, ids[0]).unwrap();
//!
//! let mut memory = Memory::new();
//! let base = memory.alloc_for(&program);
//! let mut cursor = Cursor::open(&program, &mut memory, base).unwrap();
//! cursor.seek_by_name("name").unwrap();
//! cursor.set_string("Ada").unwrap();
//! cursor.seek_by_name("level").unwrap();
//! cursor.set_uint(7).unwrap();
//!
//! assert_eq!(render(&program, &memory, base).unwrap(), r#"{name: "Ada", level: 7}"#);
//! ```

pub use meta_compiler::{compile, CompileError, Compiler};
pub use meta_cursor::{Address, Cursor, CursorError, Handle, Memory, Position, ScopeKind};
pub use meta_printer::{
    format_bitmask, format_float, listing, render, render_with, DisplayNames, NoNames, PrinterError,
};
pub use meta_schema::{load_schema, SchemaError};
pub use meta_spec::{
    escape_string, unescape_string, Config, Constants, Descriptor, EntityId, MetaError, OpCode,
    PrimitiveKind, Program, Registry, StructDescriptor, TypeId, TypeRegistry,
};
