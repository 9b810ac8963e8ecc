//! # Cursor Engine
//!
//! Generic field-by-field navigation over a value described by a compiled
//! [`Program`].
//!
//! ## Navigation model
//!
//! ```text
//! struct Line { Point start; i32 tags[3]; list<i32> extra; }
//!
//! open            root scope: Line members, before the first
//! advance         -> start
//! enter           scope: Point members (x, y)
//! exit            -> tags (one step past start)
//! enter           scope: 3 inlined i32 elements
//! exit            -> extra
//! ```
//!
//! A cursor borrows its memory as `M: Borrow<Memory>`. Setters and growth are
//! only available when `M: BorrowMut<Memory>`.

use crate::error::{CursorError, Result};
use crate::memory::{Address, Memory};
use crate::scope::{Position, Scope, ScopeKind, Selection};
use meta_spec::{Config, Operation, Program};
use std::borrow::{Borrow, BorrowMut};
use std::mem;

/// Cursor over one value
#[derive(Debug)]
pub struct Cursor<'p, M> {
    program: &'p Program,
    memory: M,
    /// Innermost scope
    scope: Scope<'p>,
    /// Enclosing scopes, root first
    parents: Vec<Scope<'p>>,
    max_depth: usize,
}

impl<'p, M: Borrow<Memory>> Cursor<'p, M> {
    /// Open a cursor on the value at `base` with the default configuration
    pub fn open(program: &'p Program, memory: M, base: Address) -> Result<Self> {
        Self::with_config(program, memory, base, &Config::DEFAULT)
    }

    /// Open a cursor on the value at `base`
    ///
    /// When the program is a struct or collection the root scope is that
    /// construct, positioned before its first element. Any other program gets
    /// a one-element value scope.
    pub fn with_config(
        program: &'p Program,
        memory: M,
        base: Address,
        config: &Config,
    ) -> Result<Self> {
        config.validate()?;
        if program.is_empty() {
            return Err(CursorError::MalformedProgram);
        }

        let mut root = Scope::value(program.ops(), base);
        root.advance();
        let selection = root.selection()?;
        let scope = if selection.is_enterable() {
            Scope::enter(memory.borrow(), selection)?
        } else {
            Scope::value(program.ops(), base)
        };

        Ok(Self {
            program,
            memory,
            scope,
            parents: Vec::new(),
            max_depth: config.max_scope_depth,
        })
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn memory(&self) -> &Memory {
        self.memory.borrow()
    }

    /// Give the memory back
    pub fn into_memory(self) -> M {
        self.memory
    }

    pub(crate) fn selection(&self) -> Result<Selection<'p>> {
        self.scope.selection()
    }

    // ========== Introspection ==========

    /// Number of scopes entered below the root
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    pub fn scope_kind(&self) -> ScopeKind {
        self.scope.kind
    }

    pub fn is_collection(&self) -> bool {
        self.scope.kind.is_collection()
    }

    pub fn position(&self) -> Position {
        self.scope.position
    }

    /// Number of positions in the current scope (two per map entry)
    pub fn len(&self) -> usize {
        self.scope.count
    }

    pub fn is_empty(&self) -> bool {
        self.scope.count == 0
    }

    /// Past the last element of the current scope
    pub fn is_done(&self) -> bool {
        self.scope.position == Position::Exhausted
    }

    /// Name of the selected struct member
    pub fn field_name(&self) -> Option<&'p str> {
        if self.scope.kind != ScopeKind::Struct {
            return None;
        }
        self.selection().ok().and_then(|selection| selection.op.name())
    }

    /// Operation describing the selected value
    pub fn current_op(&self) -> Option<&'p Operation> {
        self.selection().ok().map(|selection| selection.op)
    }

    /// Address of the selected value
    pub fn current_pointer(&self) -> Result<Address> {
        Ok(self.selection()?.ptr)
    }

    pub fn is_enterable(&self) -> bool {
        self.selection().is_ok_and(|selection| selection.is_enterable())
    }

    /// The selection is a map key rather than a map value
    pub fn is_map_key(&self) -> bool {
        self.scope.is_map_key()
    }

    // ========== Navigation ==========

    /// Select the next element; false once the scope is exhausted
    pub fn advance(&mut self) -> bool {
        self.scope.advance()
    }

    /// Select the element at `position`
    pub fn seek(&mut self, position: usize) -> Result<()> {
        self.scope.seek(position)
    }

    /// Select the struct member called `name`
    pub fn seek_by_name(&mut self, name: &str) -> Result<()> {
        if self.scope.kind != ScopeKind::Struct {
            return Err(CursorError::NotAStruct);
        }
        let position = self
            .scope
            .find_member(name)
            .ok_or_else(|| CursorError::FieldNotFound(name.to_string()))?;
        self.scope.seek(position)
    }

    /// Descend into the selected struct or collection
    pub fn enter(&mut self) -> Result<()> {
        let selection = self.selection()?;
        if !selection.is_enterable() {
            return Err(CursorError::NotEnterable(selection.op.code()));
        }
        if self.parents.len() + 2 > self.max_depth {
            tracing::warn!(
                "Scope depth limit {} exceeded entering {}",
                self.max_depth,
                selection.op
            );
            return Err(CursorError::DepthExceeded {
                max: self.max_depth,
            });
        }

        let scope = Scope::enter(self.memory.borrow(), selection)?;
        tracing::trace!(
            "Enter {} scope ({} elements) at {:#x}",
            scope.kind,
            scope.count,
            scope.base
        );
        self.parents.push(mem::replace(&mut self.scope, scope));
        Ok(())
    }

    /// Return to the enclosing scope, one step past the construct just left
    ///
    /// The parent is exhausted when the construct was its last element.
    pub fn exit(&mut self) -> Result<()> {
        let parent = self.parents.pop().ok_or(CursorError::AtRoot)?;
        tracing::trace!("Exit {} scope", self.scope.kind);
        self.scope = parent;
        self.scope.advance();
        Ok(())
    }
}

impl<'p, M: BorrowMut<Memory>> Cursor<'p, M> {
    pub(crate) fn memory_mut(&mut self) -> &mut Memory {
        self.memory.borrow_mut()
    }

    /// Resize the current list (elements) or map (entries)
    ///
    /// An unallocated collection is allocated and its handle written back
    /// into the owning field. New elements are zeroed.
    pub fn resize(&mut self, len: usize) -> Result<()> {
        let mut live = self.scope.list.ok_or(CursorError::NotACollection)?;
        let count = if self.scope.kind == ScopeKind::Map {
            len.checked_mul(2).ok_or(CursorError::CapacityOverflow {
                count: len,
                stride: live.stride,
            })?
        } else {
            len
        };
        let memory: &mut Memory = self.memory.borrow_mut();

        if live.handle == 0 {
            memory.read_handle(live.slot)?;
            let handle = memory.list_new(live.stride, live.alignment);
            memory.grow(handle, len)?;
            memory.write_handle(live.slot, handle)?;
            live.handle = handle;
        } else {
            memory.grow(live.handle, len)?;
        }
        let base = memory.data_pointer(live.handle)?;

        tracing::trace!(
            "Resize {} from {} to {} positions",
            self.scope.kind,
            self.scope.count,
            count
        );

        let scope = &mut self.scope;
        scope.list = Some(live);
        scope.base = base;
        scope.count = count;
        if matches!(scope.position, Position::At(index) if index >= count) {
            scope.position = Position::Exhausted;
        }
        Ok(())
    }

    /// Append one element (or map entry) and select it (or its key)
    pub fn push_element(&mut self) -> Result<()> {
        if self.scope.list.is_none() {
            return Err(CursorError::NotACollection);
        }
        let (len, position) = if self.scope.kind == ScopeKind::Map {
            let entries = self.scope.count / 2;
            (entries, entries * 2)
        } else {
            (self.scope.count, self.scope.count)
        };
        self.resize(len + 1)?;
        self.scope.seek(position)
    }
}
