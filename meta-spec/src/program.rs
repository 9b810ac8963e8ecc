//! # Program Structure
//!
//! A program is the depth-first, pre-order flattening of one type. It is
//! always exactly one top-level unit: a single operation, or one Push..Pop
//! block.
//!
//! ```text
//! struct Line { Point start; i32 tags[4]; }
//!
//! Index  Op                  Offset
//! ─────────────────────────────────
//! 0      push members=2      0
//! 1      push members=2      0      start
//! 2      prim f32            0      x
//! 3      prim f32            4      y
//! 4      pop
//! 5      prim i32 x4         8      tags
//! 6      pop
//! ```

use crate::error::MetaError;
use crate::operation::{OpKind, Operation};
use crate::TypeId;
use std::fmt;

/// Compiled, immutable operation sequence for a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    type_id: TypeId,
    ops: Vec<Operation>,
    size: usize,
    alignment: usize,
}

impl Program {
    /// Create a program; size and alignment are taken from the head unit
    pub fn new(type_id: TypeId, ops: Vec<Operation>) -> Self {
        let (size, alignment) = ops
            .first()
            .map(|head| (head.footprint(), head.alignment.max(1)))
            .unwrap_or((0, 1));

        Self {
            type_id,
            ops,
            size,
            alignment,
        }
    }

    /// Type this program was compiled from
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    /// First operation of the program
    pub fn head(&self) -> Option<&Operation> {
        self.ops.first()
    }

    /// Bytes occupied by one value of the type
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of Push and Pop operations, in that order
    pub fn bracket_counts(&self) -> (usize, usize) {
        self.ops.iter().fold((0, 0), |(push, pop), op| match op.kind {
            OpKind::Push { .. } => (push + 1, pop),
            OpKind::Pop => (push, pop + 1),
            _ => (push, pop),
        })
    }

    /// Validate the structural invariants
    ///
    /// - the program is not empty
    /// - nesting never goes negative and every Push is closed
    /// - each Push span lands on its matching Pop
    /// - the program is exactly one top-level unit
    pub fn validate(&self) -> Result<(), MetaError> {
        let Some(head) = self.ops.first() else {
            return Err(self.malformed("empty program"));
        };

        if head.span() != self.ops.len() {
            return Err(self.malformed(format!(
                "expected one unit of {} operations, found {}",
                head.span(),
                self.ops.len()
            )));
        }

        let mut open: Vec<usize> = Vec::new();
        for (index, op) in self.ops.iter().enumerate() {
            match op.kind {
                OpKind::Push { span, .. } => {
                    if span < 2 || index + span > self.ops.len() {
                        return Err(self.malformed(format!("push at {} has invalid span {}", index, span)));
                    }
                    open.push(index);
                }
                OpKind::Pop => {
                    let Some(start) = open.pop() else {
                        return Err(self.malformed(format!("unmatched pop at {}", index)));
                    };
                    if start + self.ops[start].span() != index + 1 {
                        return Err(self.malformed(format!(
                            "push at {} does not close at {}",
                            start, index
                        )));
                    }
                }
                _ => {}
            }
        }

        if let Some(start) = open.pop() {
            return Err(self.malformed(format!("unclosed push at {}", start)));
        }

        Ok(())
    }

    fn malformed(&self, reason: impl Into<String>) -> MetaError {
        MetaError::MalformedProgram {
            type_id: self.type_id,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "program {} ({} ops, size {}, align {})",
            self.type_id,
            self.ops.len(),
            self.size,
            self.alignment
        )?;
        let mut depth = 0usize;
        for (index, op) in self.ops.iter().enumerate() {
            if matches!(op.kind, OpKind::Pop) {
                depth = depth.saturating_sub(1);
            }
            writeln!(f, "{:4}  {}{}", index, "  ".repeat(depth), op)?;
            if matches!(op.kind, OpKind::Push { .. }) {
                depth += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveKind;

    fn push(span: usize, members: usize) -> Operation {
        Operation::new(
            OpKind::Push {
                span,
                members,
                partial: false,
            },
            8,
            4,
        )
    }

    fn pop() -> Operation {
        Operation::new(OpKind::Pop, 0, 1)
    }

    #[test]
    fn test_single_primitive_program() {
        let program = Program::new(TypeId(1), vec![Operation::primitive(PrimitiveKind::I64)]);
        assert_eq!(program.size(), 8);
        assert_eq!(program.alignment(), 8);
        assert_eq!(program.len(), 1);
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_struct_program_validates() {
        let program = Program::new(
            TypeId(2),
            vec![
                push(4, 2),
                Operation::primitive(PrimitiveKind::I32),
                Operation::primitive(PrimitiveKind::I32),
                pop(),
            ],
        );
        assert!(program.validate().is_ok());
        assert_eq!(program.bracket_counts(), (1, 1));
        assert_eq!(program.size(), 8);
    }

    #[test]
    fn test_empty_program_rejected() {
        let program = Program::new(TypeId(3), vec![]);
        assert_eq!(program.size(), 0);
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_unmatched_pop_rejected() {
        let program = Program::new(TypeId(4), vec![push(2, 0), pop(), pop()]);
        let err = program.validate().unwrap_err();
        assert!(err.to_string().contains("#4"));
    }

    #[test]
    fn test_wrong_span_rejected() {
        let program = Program::new(
            TypeId(5),
            vec![push(3, 1), push(2, 0), pop(), pop()],
        );
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_multiple_units_rejected() {
        let program = Program::new(
            TypeId(6),
            vec![
                Operation::primitive(PrimitiveKind::I32),
                Operation::primitive(PrimitiveKind::I32),
            ],
        );
        assert!(program.validate().is_err());
    }

    #[test]
    fn test_program_display() {
        let program = Program::new(
            TypeId(7),
            vec![push(3, 1), Operation::primitive(PrimitiveKind::U8), pop()],
        );
        let text = program.to_string();
        assert!(text.contains("program #7"));
        assert!(text.contains("prim u8"));
    }
}
