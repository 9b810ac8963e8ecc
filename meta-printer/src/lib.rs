//! # Type Meta Printer
//!
//! Human-readable output for values and compiled programs.
//!
//! ## Example
//!
//! ```rust
//! use meta_compiler::compile;
//! use meta_cursor::{Cursor, Memory};
//! use meta_printer::render;
//! use meta_spec::{Descriptor, PrimitiveKind, Registry};
//!
//! let mut registry = Registry::new();
//! let i32_id = registry.primitive(PrimitiveKind::I32);
//! let string_id = registry.primitive(PrimitiveKind::String);
//! let record = registry.register(Descriptor::structure([("a", i32_id), ("b", string_id)]));
//! let program = compile(&mut registry, record).unwrap();
//!
//! let mut memory = Memory::new();
//! let base = memory.alloc_for(&program);
//! let mut cursor = Cursor::open(&program, &mut memory, base).unwrap();
//! cursor.seek_by_name("a").unwrap();
//! cursor.set_int(42).unwrap();
//! cursor.seek_by_name("b").unwrap();
//! cursor.set_string("hi").unwrap();
//!
//! assert_eq!(render(&program, &memory, base).unwrap(), r#"{a: 42, b: "hi"}"#);
//! ```

pub mod error;
pub mod formatter;
pub mod listing;

pub use error::{PrinterError, Result};
pub use formatter::{format_bitmask, format_float, render, render_with, DisplayNames, NoNames};
pub use listing::listing;
