//! Cursor error types
//!
//! Every variant is recoverable: the cursor and the memory it points into are
//! left exactly as they were before the failing call.

use meta_spec::{ConfigError, EscapeError, OpCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    // Memory errors
    #[error("Memory out of bounds: address {address:#x}, size {size}")]
    OutOfBounds { address: usize, size: usize },

    #[error("Invalid handle: {0:#x}")]
    InvalidHandle(u64),

    #[error("Cannot allocate {count} elements of {stride} bytes")]
    CapacityOverflow { count: usize, stride: usize },

    #[error("Program is empty or malformed")]
    MalformedProgram,

    // Navigation errors
    #[error("No element is selected")]
    NothingSelected,

    #[error("Position {position} is out of range for {len} elements")]
    OutOfRange { position: usize, len: usize },

    #[error("Current scope is not a struct")]
    NotAStruct,

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("Cannot enter a {0} operation")]
    NotEnterable(OpCode),

    #[error("Scope depth limit {max} exceeded")]
    DepthExceeded { max: usize },

    #[error("Cursor is at the root scope")]
    AtRoot,

    #[error("Current scope is not a list or map")]
    NotACollection,

    // Value errors
    #[error("Cannot {access} a {target} value")]
    TypeMismatch {
        access: &'static str,
        target: String,
    },

    #[error("Value {value} does not fit in {target}")]
    Overflow { value: String, target: String },

    #[error("Unknown constant: {0}")]
    UnknownConstant(String),

    #[error("Invalid literal for {target}: {literal:?}")]
    InvalidLiteral { literal: String, target: String },

    #[error("Escape error: {0}")]
    Escape(#[from] EscapeError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CursorError>;
