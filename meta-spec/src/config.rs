//! # Configuration
//!
//! Resource bounds shared by the compiler and the cursor engine. These are
//! the only defensive caps in the system: they reject pathological or cyclic
//! type graphs and runaway cursor nesting.

use std::fmt;

/// Upper bound accepted for either depth setting
pub const DEPTH_LIMIT: usize = 1024;

/// Engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// Maximum number of scopes a cursor may hold (root included)
    pub max_scope_depth: usize,
    /// Maximum number of nested types the compiler follows from a root type
    pub max_type_depth: usize,
}

impl Config {
    /// Default configuration: 32 cursor scopes, 32 nested types
    pub const DEFAULT: Self = Self {
        max_scope_depth: crate::MAX_SCOPE_DEPTH,
        max_type_depth: crate::MAX_TYPE_DEPTH,
    };

    /// Create a new configuration with validation
    pub const fn new(max_scope_depth: usize, max_type_depth: usize) -> Result<Self, ConfigError> {
        let config = Self {
            max_scope_depth,
            max_type_depth,
        };

        if max_scope_depth == 0 {
            return Err(ConfigError::ZeroScopeDepth);
        }
        if max_scope_depth > DEPTH_LIMIT {
            return Err(ConfigError::ScopeDepthTooLarge(max_scope_depth));
        }
        if max_type_depth == 0 {
            return Err(ConfigError::ZeroTypeDepth);
        }
        if max_type_depth > DEPTH_LIMIT {
            return Err(ConfigError::TypeDepthTooLarge(max_type_depth));
        }

        Ok(config)
    }

    /// Validate a configuration built by hand
    pub const fn validate(&self) -> Result<(), ConfigError> {
        match Self::new(self.max_scope_depth, self.max_type_depth) {
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scope depth {}, type depth {}",
            self.max_scope_depth, self.max_type_depth
        )
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Scope depth must be at least 1")]
    ZeroScopeDepth,

    #[error("Scope depth {0} exceeds limit 1024")]
    ScopeDepthTooLarge(usize),

    #[error("Type depth must be at least 1")]
    ZeroTypeDepth,

    #[error("Type depth {0} exceeds limit 1024")]
    TypeDepthTooLarge(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::DEFAULT;
        assert_eq!(config.max_scope_depth, 32);
        assert_eq!(config.max_type_depth, 32);
        assert!(config.validate().is_ok());
        assert_eq!(Config::default(), config);
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(Config::new(0, 8), Err(ConfigError::ZeroScopeDepth));
        assert_eq!(Config::new(8, 0), Err(ConfigError::ZeroTypeDepth));
        assert_eq!(
            Config::new(DEPTH_LIMIT + 1, 8),
            Err(ConfigError::ScopeDepthTooLarge(DEPTH_LIMIT + 1))
        );
        assert_eq!(
            Config::new(8, DEPTH_LIMIT + 1),
            Err(ConfigError::TypeDepthTooLarge(DEPTH_LIMIT + 1))
        );
        assert!(Config::new(1, 1).is_ok());
    }

    #[test]
    fn test_hand_built_config_validation() {
        let config = Config {
            max_scope_depth: 0,
            max_type_depth: 4,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        assert_eq!(Config::DEFAULT.to_string(), "scope depth 32, type depth 32");
    }
}
