//! # Error Types for the type model and registry

use crate::config::ConfigError;
use crate::TypeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetaError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Registry errors
    #[error("Type {0} is already defined")]
    DuplicateType(TypeId),

    #[error("Type name '{0}' is already defined")]
    DuplicateName(String),

    // Program errors
    #[error("Malformed program for type {type_id}: {reason}")]
    MalformedProgram { type_id: TypeId, reason: String },

    // Persistence errors
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl MetaError {
    /// Errors caused by an inconsistent type graph rather than by input data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MetaError::InvalidConfig(_) | MetaError::MalformedProgram { .. }
        )
    }
}
