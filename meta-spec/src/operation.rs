//! # Program Operations
//!
//! One step of a compiled [`Program`]: the layout and kind of a field or
//! element.

use crate::descriptor::Constants;
use crate::primitive::PrimitiveKind;
use crate::program::Program;
use std::fmt;
use std::sync::Arc;

/// Layout of a map entry: key at offset 0, value at `value_offset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayout {
    /// Single primitive, enum or bitmask key operation
    pub key: Operation,
    /// Compiled value program
    pub value: Arc<Program>,
    /// Offset of the value within an entry
    pub value_offset: usize,
    /// Size of one entry, padded to the entry alignment
    pub entry_size: usize,
}

/// Kind-specific operation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpKind {
    Primitive(PrimitiveKind),
    /// Stored as i32
    Enum(Arc<Constants>),
    /// Stored as u32
    Bitmask(Arc<Constants>),
    /// Opens a struct
    Push {
        /// Operations from this Push through its matching Pop, inclusive
        span: usize,
        /// Number of direct members
        members: usize,
        /// Struct has undescribed trailing members
        partial: bool,
    },
    /// Closes the innermost struct
    Pop,
    /// Fixed-size array of a composite element (`count` elements)
    Array(Arc<Program>),
    /// Growable list behind a handle
    List(Arc<Program>),
    /// Key-value mapping behind a handle
    Map(Box<MapLayout>),
}

/// Operation discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Primitive,
    Enum,
    Bitmask,
    Push,
    Pop,
    Array,
    List,
    Map,
}

impl OpCode {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            OpCode::Primitive => "prim",
            OpCode::Enum => "enum",
            OpCode::Bitmask => "bitmask",
            OpCode::Push => "push",
            OpCode::Pop => "pop",
            OpCode::Array => "array",
            OpCode::List => "list",
            OpCode::Map => "map",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Program operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Size of one repetition in bytes (total bytes for `Array`)
    pub size: usize,
    pub alignment: usize,
    /// Repetition count for inline kinds, element count for `Array`
    pub count: usize,
    /// Member name, absent for anonymous and element operations
    pub name: Option<Arc<str>>,
    /// Offset relative to the enclosing struct base
    pub offset: usize,
    pub kind: OpKind,
}

impl Operation {
    /// Create an unnamed operation with count 1 at offset 0
    pub fn new(kind: OpKind, size: usize, alignment: usize) -> Self {
        Self {
            size,
            alignment,
            count: 1,
            name: None,
            offset: 0,
            kind,
        }
    }

    /// Primitive operation with the kind's natural layout
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(OpKind::Primitive(kind), kind.size(), kind.alignment())
    }

    pub fn code(&self) -> OpCode {
        match self.kind {
            OpKind::Primitive(_) => OpCode::Primitive,
            OpKind::Enum(_) => OpCode::Enum,
            OpKind::Bitmask(_) => OpCode::Bitmask,
            OpKind::Push { .. } => OpCode::Push,
            OpKind::Pop => OpCode::Pop,
            OpKind::Array(_) => OpCode::Array,
            OpKind::List(_) => OpCode::List,
            OpKind::Map(_) => OpCode::Map,
        }
    }

    /// Primitive, enum or bitmask leaf
    pub fn is_primitive(&self) -> bool {
        matches!(
            self.kind,
            OpKind::Primitive(_) | OpKind::Enum(_) | OpKind::Bitmask(_)
        )
    }

    /// Eligible for inlining into an enclosing array
    pub fn is_inline(&self) -> bool {
        self.is_primitive() || matches!(self.kind, OpKind::Push { .. })
    }

    /// Number of operations in the unit headed by this operation
    pub fn span(&self) -> usize {
        match self.kind {
            OpKind::Push { span, .. } => span,
            _ => 1,
        }
    }

    /// How many times the unit repeats in place (>1 marks an inlined array)
    pub fn repetition(&self) -> usize {
        if self.is_inline() {
            self.count
        } else {
            1
        }
    }

    /// Bytes occupied by the whole unit, saturating at `usize::MAX`
    pub fn footprint(&self) -> usize {
        self.size.saturating_mul(self.repetition())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OpKind::Primitive(kind) => write!(f, "prim {}", kind)?,
            OpKind::Push { members, .. } => write!(f, "push members={}", members)?,
            _ => write!(f, "{}", self.code())?,
        }
        if self.count != 1 {
            write!(f, " x{}", self.count)?;
        }
        if let Some(name) = &self.name {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_operation() {
        let op = Operation::primitive(PrimitiveKind::I32);
        assert_eq!(op.size, 4);
        assert_eq!(op.alignment, 4);
        assert_eq!(op.count, 1);
        assert_eq!(op.code(), OpCode::Primitive);
        assert!(op.is_primitive());
        assert!(op.is_inline());
        assert_eq!(op.span(), 1);
    }

    #[test]
    fn test_repetition_and_footprint() {
        let mut op = Operation::primitive(PrimitiveKind::U16);
        op.count = 5;
        assert_eq!(op.repetition(), 5);
        assert_eq!(op.footprint(), 10);
        op.count = usize::MAX;
        assert_eq!(op.footprint(), usize::MAX);

        let push = Operation::new(
            OpKind::Push {
                span: 4,
                members: 2,
                partial: false,
            },
            8,
            4,
        );
        assert!(push.is_inline());
        assert!(!push.is_primitive());
        assert_eq!(push.span(), 4);
    }

    #[test]
    fn test_pop_is_not_inline() {
        let pop = Operation::new(OpKind::Pop, 0, 1);
        assert!(!pop.is_inline());
        assert_eq!(pop.repetition(), 1);
        assert_eq!(pop.code().mnemonic(), "pop");
    }

    #[test]
    fn test_operation_display() {
        let mut op = Operation::primitive(PrimitiveKind::F32);
        op.name = Some(Arc::from("speed"));
        op.count = 3;
        assert_eq!(op.to_string(), "prim f32 x3 speed");
    }
}
