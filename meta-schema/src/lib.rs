//! Type Meta Schema
//!
//! Define types in a small textual language and register them with a
//! [`Registry`](meta_spec::Registry).
//!
//! ## Example
//!
//! ```rust
//! use meta_schema::load_schema;
//! use meta_spec::Registry;
//!
//! let source = r#"
//!     enum Color { Red, Green, Blue }
//!     struct Point { f32 x; f32 y; }
//!     struct Sprite {
//!         Color tint;
//!         Point corners[4];
//!         list<string> tags;
//!     }
//! "#;
//!
//! let mut registry = Registry::new();
//! let ids = load_schema(&mut registry, source).unwrap();
//! assert_eq!(ids.len(), 3);
//! assert_eq!(registry.lookup("Sprite"), Some(ids[2]));
//! ```

pub mod error;
pub mod lexer;
pub mod loader;
pub mod parser;

pub use error::{Result, SchemaError};
pub use loader::load_schema;
pub use parser::{parse, Definition, DefinitionKind, TypeExpr};
