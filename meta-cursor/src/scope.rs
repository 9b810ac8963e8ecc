//! # Cursor Scopes
//!
//! A scope is one traversal frame: a struct's members, the elements of an
//! array or list, or the alternating keys and values of a map.

use crate::error::{CursorError, Result};
use crate::memory::{Address, Handle, Memory};
use meta_spec::{MapLayout, OpKind, Operation};
use std::fmt;
use std::slice;

/// Kind of traversal frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Single non-enterable root value
    Value,
    Struct,
    /// Fixed-size array, inlined or referenced
    Array,
    List,
    Map,
}

impl ScopeKind {
    pub fn is_collection(self) -> bool {
        matches!(self, ScopeKind::Array | ScopeKind::List | ScopeKind::Map)
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScopeKind::Value => "value",
            ScopeKind::Struct => "struct",
            ScopeKind::Array => "array",
            ScopeKind::List => "list",
            ScopeKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// Position of a scope within its elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    BeforeFirst,
    At(usize),
    Exhausted,
}

impl Position {
    pub fn index(self) -> Option<usize> {
        match self {
            Position::At(index) => Some(index),
            _ => None,
        }
    }
}

/// List or map storage reached through a handle slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LiveList {
    /// Address of the handle slot
    pub slot: Address,
    /// Handle read from the slot, 0 while the collection is unallocated
    pub handle: Handle,
    pub stride: usize,
    pub alignment: usize,
}

/// The value a scope currently points at
#[derive(Debug, Clone, Copy)]
pub(crate) struct Selection<'p> {
    pub op: &'p Operation,
    /// Operations of the selected unit, `op` first
    pub unit: &'p [Operation],
    pub repetition: usize,
    pub ptr: Address,
}

impl Selection<'_> {
    pub fn is_enterable(&self) -> bool {
        self.repetition > 1
            || matches!(
                self.op.kind,
                OpKind::Push { .. } | OpKind::Array(_) | OpKind::List(_) | OpKind::Map(_)
            )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Scope<'p> {
    pub kind: ScopeKind,
    /// Struct members, or the element unit of a collection
    pub ops: &'p [Operation],
    /// Index in `ops` of the selected struct member
    pub cur_op: usize,
    pub position: Position,
    pub count: usize,
    pub base: Address,
    pub stride: usize,
    /// Elements repeat an inlined unit in place
    pub inline: bool,
    pub list: Option<LiveList>,
    pub map: Option<&'p MapLayout>,
}

impl<'p> Scope<'p> {
    fn new(kind: ScopeKind, ops: &'p [Operation], count: usize, base: Address) -> Self {
        Self {
            kind,
            ops,
            cur_op: 0,
            position: Position::BeforeFirst,
            count,
            base,
            stride: 0,
            inline: false,
            list: None,
            map: None,
        }
    }

    /// One-element scope over a whole program
    pub fn value(ops: &'p [Operation], base: Address) -> Self {
        Self::new(ScopeKind::Value, ops, 1, base)
    }

    /// Scope for the construct named by `selection`
    pub fn enter(memory: &Memory, selection: Selection<'p>) -> Result<Self> {
        let ptr = selection.ptr;

        if selection.repetition > 1 {
            let mut scope = Self::new(ScopeKind::Array, selection.unit, selection.repetition, ptr);
            scope.stride = selection.op.size;
            scope.inline = true;
            return Ok(scope);
        }

        match &selection.op.kind {
            OpKind::Push { span, members, .. } => {
                let ops = selection
                    .unit
                    .get(1..span.saturating_sub(1))
                    .ok_or(CursorError::MalformedProgram)?;
                Ok(Self::new(ScopeKind::Struct, ops, *members, ptr))
            }
            OpKind::Array(element) => {
                let mut scope = Self::new(ScopeKind::Array, element.ops(), selection.op.count, ptr);
                scope.stride = element.size();
                Ok(scope)
            }
            OpKind::List(element) => {
                let live = LiveList {
                    slot: ptr,
                    handle: memory.read_handle(ptr)?,
                    stride: element.size(),
                    alignment: element.alignment(),
                };
                let (len, base) = live.resolve(memory)?;
                let mut scope = Self::new(ScopeKind::List, element.ops(), len, base);
                scope.stride = live.stride;
                scope.list = Some(live);
                Ok(scope)
            }
            OpKind::Map(layout) => {
                let layout: &'p MapLayout = layout;
                let live = LiveList {
                    slot: ptr,
                    handle: memory.read_handle(ptr)?,
                    stride: layout.entry_size,
                    alignment: layout.key.alignment.max(layout.value.alignment()),
                };
                let (len, base) = live.resolve(memory)?;
                let mut scope = Self::new(ScopeKind::Map, layout.value.ops(), len * 2, base);
                scope.stride = live.stride;
                scope.list = Some(live);
                scope.map = Some(layout);
                Ok(scope)
            }
            _ => Err(CursorError::NotEnterable(selection.op.code())),
        }
    }

    pub fn selection(&self) -> Result<Selection<'p>> {
        let Position::At(index) = self.position else {
            return Err(CursorError::NothingSelected);
        };
        let ops = self.ops;

        match self.kind {
            ScopeKind::Value => {
                let op = ops.first().ok_or(CursorError::MalformedProgram)?;
                Ok(Selection {
                    op,
                    unit: ops,
                    repetition: op.repetition(),
                    ptr: self.base,
                })
            }
            ScopeKind::Struct => {
                let op = ops.get(self.cur_op).ok_or(CursorError::MalformedProgram)?;
                let unit = ops
                    .get(self.cur_op..self.cur_op + op.span())
                    .ok_or(CursorError::MalformedProgram)?;
                Ok(Selection {
                    op,
                    unit,
                    repetition: op.repetition(),
                    ptr: self.base + op.offset,
                })
            }
            ScopeKind::Array | ScopeKind::List => {
                let op = ops.first().ok_or(CursorError::MalformedProgram)?;
                Ok(Selection {
                    op,
                    unit: ops,
                    repetition: if self.inline { 1 } else { op.repetition() },
                    ptr: self.base + index * self.stride,
                })
            }
            ScopeKind::Map => {
                let layout = self.map.ok_or(CursorError::MalformedProgram)?;
                let entry = self.base + (index / 2) * self.stride;
                if index % 2 == 0 {
                    Ok(Selection {
                        op: &layout.key,
                        unit: slice::from_ref(&layout.key),
                        repetition: 1,
                        ptr: entry,
                    })
                } else {
                    let unit = layout.value.ops();
                    let op = unit.first().ok_or(CursorError::MalformedProgram)?;
                    Ok(Selection {
                        op,
                        unit,
                        repetition: op.repetition(),
                        ptr: entry + layout.value_offset,
                    })
                }
            }
        }
    }

    /// Move to the next element; false once past the last one
    pub fn advance(&mut self) -> bool {
        match self.position {
            Position::BeforeFirst if self.count > 0 => {
                self.cur_op = 0;
                self.position = Position::At(0);
                true
            }
            Position::At(index) if index + 1 < self.count => {
                if self.kind == ScopeKind::Struct {
                    self.cur_op += self.ops.get(self.cur_op).map_or(1, Operation::span);
                }
                self.position = Position::At(index + 1);
                true
            }
            _ => {
                self.position = Position::Exhausted;
                false
            }
        }
    }

    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position >= self.count {
            return Err(CursorError::OutOfRange {
                position,
                len: self.count,
            });
        }
        if self.kind == ScopeKind::Struct {
            let cur_op = self.member_ops().nth(position).map_or(0, |(_, op)| op);
            self.cur_op = cur_op;
        }
        self.position = Position::At(position);
        Ok(())
    }

    /// Position of the member called `name`
    pub fn find_member(&self, name: &str) -> Option<usize> {
        self.member_ops()
            .find(|(_, index)| self.ops[*index].name() == Some(name))
            .map(|(position, _)| position)
    }

    /// `(position, op index)` of every direct struct member
    fn member_ops(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut next = 0usize;
        (0..self.count).map_while(move |position| {
            let index = next;
            next += self.ops.get(index)?.span();
            Some((position, index))
        })
    }

    pub fn is_map_key(&self) -> bool {
        self.kind == ScopeKind::Map && matches!(self.position, Position::At(i) if i % 2 == 0)
    }
}

impl LiveList {
    /// Element count and data address of the collection
    pub fn resolve(&self, memory: &Memory) -> Result<(usize, Address)> {
        if self.handle == 0 {
            return Ok((0, 0));
        }
        if memory.stride(self.handle)? != self.stride {
            return Err(CursorError::InvalidHandle(self.handle));
        }
        Ok((memory.length(self.handle)?, memory.data_pointer(self.handle)?))
    }
}
