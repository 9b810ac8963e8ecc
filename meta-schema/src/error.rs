//! Schema errors

use meta_spec::MetaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    #[error("Duplicate member '{member}' in struct {type_name}")]
    DuplicateMember { type_name: String, member: String },

    #[error("Duplicate constant '{constant}' in {type_name}")]
    DuplicateConstant { type_name: String, constant: String },

    #[error("Invalid array length {length} for member '{member}'")]
    InvalidArrayLength { member: String, length: i64 },

    #[error("Constant '{constant}' value {value} is out of range")]
    ConstantOutOfRange { constant: String, value: i64 },

    #[error("Registry error: {0}")]
    Registry(#[from] MetaError),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
