//! # Primitive Kinds
//!
//! Leaf value kinds with their fixed in-memory layout.

use crate::HANDLE_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive value kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Bool,
    /// 8-bit character code unit
    Char,
    Byte,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    UPtr,
    IPtr,
    /// Handle into the string table (0 = null)
    String,
    /// Opaque 64-bit entity id
    Entity,
}

impl PrimitiveKind {
    /// All primitive kinds, in declaration order
    pub const ALL: [PrimitiveKind; 17] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::Byte,
        PrimitiveKind::U8,
        PrimitiveKind::U16,
        PrimitiveKind::U32,
        PrimitiveKind::U64,
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::UPtr,
        PrimitiveKind::IPtr,
        PrimitiveKind::String,
        PrimitiveKind::Entity,
    ];

    /// Size in bytes
    pub const fn size(self) -> usize {
        match self {
            PrimitiveKind::Bool
            | PrimitiveKind::Char
            | PrimitiveKind::Byte
            | PrimitiveKind::U8
            | PrimitiveKind::I8 => 1,
            PrimitiveKind::U16 | PrimitiveKind::I16 => 2,
            PrimitiveKind::U32 | PrimitiveKind::I32 | PrimitiveKind::F32 => 4,
            PrimitiveKind::U64
            | PrimitiveKind::I64
            | PrimitiveKind::F64
            | PrimitiveKind::UPtr
            | PrimitiveKind::IPtr => 8,
            PrimitiveKind::String | PrimitiveKind::Entity => HANDLE_SIZE,
        }
    }

    /// Alignment in bytes (naturally aligned)
    #[inline]
    pub const fn alignment(self) -> usize {
        self.size()
    }

    /// Canonical lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::UPtr => "uptr",
            PrimitiveKind::IPtr => "iptr",
            PrimitiveKind::String => "string",
            PrimitiveKind::Entity => "entity",
        }
    }

    /// Look up a kind by its canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Integer kinds: byte, unsigned and signed integers, pointer-sized integers
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::U8
                | PrimitiveKind::U16
                | PrimitiveKind::U32
                | PrimitiveKind::U64
                | PrimitiveKind::I8
                | PrimitiveKind::I16
                | PrimitiveKind::I32
                | PrimitiveKind::I64
                | PrimitiveKind::UPtr
                | PrimitiveKind::IPtr
        )
    }

    /// Signed integer kinds
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8
                | PrimitiveKind::I16
                | PrimitiveKind::I32
                | PrimitiveKind::I64
                | PrimitiveKind::IPtr
        )
    }

    /// Floating point kinds
    pub const fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::F32 | PrimitiveKind::F64)
    }

    /// Inclusive value range of integer-encoded kinds (integers, char, bool)
    pub const fn int_range(self) -> Option<(i128, i128)> {
        match self {
            PrimitiveKind::Bool => Some((0, 1)),
            PrimitiveKind::Char | PrimitiveKind::Byte | PrimitiveKind::U8 => {
                Some((0, u8::MAX as i128))
            }
            PrimitiveKind::U16 => Some((0, u16::MAX as i128)),
            PrimitiveKind::U32 => Some((0, u32::MAX as i128)),
            PrimitiveKind::U64 | PrimitiveKind::UPtr => Some((0, u64::MAX as i128)),
            PrimitiveKind::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            PrimitiveKind::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            PrimitiveKind::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            PrimitiveKind::I64 | PrimitiveKind::IPtr => Some((i64::MIN as i128, i64::MAX as i128)),
            PrimitiveKind::F32
            | PrimitiveKind::F64
            | PrimitiveKind::String
            | PrimitiveKind::Entity => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(PrimitiveKind::Bool.size(), 1);
        assert_eq!(PrimitiveKind::I16.size(), 2);
        assert_eq!(PrimitiveKind::F32.size(), 4);
        assert_eq!(PrimitiveKind::UPtr.size(), 8);
        assert_eq!(PrimitiveKind::String.size(), HANDLE_SIZE);
        assert_eq!(PrimitiveKind::Entity.alignment(), 8);
    }

    #[test]
    fn test_name_roundtrip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_name("int"), None);
    }

    #[test]
    fn test_classification() {
        assert!(PrimitiveKind::Byte.is_integer());
        assert!(!PrimitiveKind::Char.is_integer());
        assert!(PrimitiveKind::IPtr.is_signed());
        assert!(!PrimitiveKind::U64.is_signed());
        assert!(PrimitiveKind::F64.is_float());
        assert!(!PrimitiveKind::String.is_float());
    }

    #[test]
    fn test_int_ranges() {
        assert_eq!(PrimitiveKind::U8.int_range(), Some((0, 255)));
        assert_eq!(PrimitiveKind::I8.int_range(), Some((-128, 127)));
        assert_eq!(PrimitiveKind::Bool.int_range(), Some((0, 1)));
        assert_eq!(
            PrimitiveKind::U64.int_range(),
            Some((0, u64::MAX as i128))
        );
        assert_eq!(PrimitiveKind::F32.int_range(), None);
        assert_eq!(PrimitiveKind::String.int_range(), None);
    }
}
