//! Compiler error types

use meta_spec::{ConfigError, MetaError, TypeId};
use thiserror::Error;

/// Configuration errors detected while compiling a type graph
///
/// Each variant names the offending type and the rule it breaks.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("No descriptor registered for type {0}")]
    MissingDescriptor(TypeId),

    #[error("Map type {map} has key type {key}, which is not a primitive, enum or bitmask")]
    CompositeMapKey { map: TypeId, key: TypeId },

    #[error("Type {0} contains itself")]
    CyclicType(TypeId),

    #[error("Type {type_id} is nested deeper than {max} levels")]
    NestingTooDeep { type_id: TypeId, max: usize },

    #[error("Type {0} is too large to lay out")]
    SizeOverflow(TypeId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Program error: {0}")]
    Program(#[from] MetaError),
}

impl CompileError {
    /// Type the error was reported for, when there is one
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            CompileError::MissingDescriptor(id)
            | CompileError::CyclicType(id)
            | CompileError::SizeOverflow(id) => Some(*id),
            CompileError::CompositeMapKey { map, .. } => Some(*map),
            CompileError::NestingTooDeep { type_id, .. } => Some(*type_id),
            CompileError::Program(MetaError::MalformedProgram { type_id, .. }) => Some(*type_id),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_descriptor_display() {
        let err = CompileError::MissingDescriptor(TypeId(12));
        assert_eq!(err.to_string(), "No descriptor registered for type #12");
        assert_eq!(err.type_id(), Some(TypeId(12)));
    }

    #[test]
    fn test_composite_map_key_display() {
        let err = CompileError::CompositeMapKey {
            map: TypeId(3),
            key: TypeId(2),
        };
        assert_eq!(
            err.to_string(),
            "Map type #3 has key type #2, which is not a primitive, enum or bitmask"
        );
        assert_eq!(err.type_id(), Some(TypeId(3)));
    }

    #[test]
    fn test_nesting_display() {
        let err = CompileError::NestingTooDeep {
            type_id: TypeId(40),
            max: 32,
        };
        assert_eq!(err.to_string(), "Type #40 is nested deeper than 32 levels");
    }

    #[test]
    fn test_size_overflow_display() {
        let err = CompileError::SizeOverflow(TypeId(9));
        assert_eq!(err.to_string(), "Type #9 is too large to lay out");
        assert_eq!(err.type_id(), Some(TypeId(9)));
    }

    #[test]
    fn test_from_conversions() {
        let err: CompileError = ConfigError::ZeroTypeDepth.into();
        assert!(matches!(err, CompileError::InvalidConfig(_)));
        assert_eq!(err.type_id(), None);

        let err: CompileError = MetaError::MalformedProgram {
            type_id: TypeId(5),
            reason: "empty program".to_string(),
        }
        .into();
        assert_eq!(err.type_id(), Some(TypeId(5)));
    }
}
