//! # Type Registry
//!
//! The compiler consumes types through [`TypeRegistry`]. [`Registry`] is the
//! in-memory implementation: it owns the descriptors, their optional names,
//! and the per-type program cache (populated on first compile, cleared on
//! teardown).

use crate::descriptor::Descriptor;
use crate::error::MetaError;
use crate::primitive::PrimitiveKind;
use crate::program::Program;
use crate::TypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Descriptor source and program cache consumed by the compiler
pub trait TypeRegistry {
    /// Descriptor registered for `type_id`
    fn descriptor(&self, type_id: TypeId) -> Option<&Descriptor>;

    /// Previously published program for `type_id`
    fn cached_program(&self, type_id: TypeId) -> Option<Arc<Program>>;

    /// Publish a compiled program for `type_id`
    fn publish_program(&mut self, type_id: TypeId, program: Arc<Program>);
}

/// In-memory type registry
#[derive(Debug, Default)]
pub struct Registry {
    descriptors: HashMap<TypeId, Descriptor>,
    names: HashMap<String, TypeId>,
    type_names: HashMap<TypeId, String>,
    primitives: HashMap<PrimitiveKind, TypeId>,
    programs: HashMap<TypeId, Arc<Program>>,
    next_id: u64,
}

/// Persisted form of a registry: descriptors and names, no programs
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    types: Vec<(TypeId, Option<String>, Descriptor)>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Register an anonymous type under a fresh id
    pub fn register(&mut self, descriptor: Descriptor) -> TypeId {
        let id = self.fresh_id();
        self.descriptors.insert(id, descriptor);
        id
    }

    /// Register a named type under a fresh id
    pub fn register_named(
        &mut self,
        name: impl Into<String>,
        descriptor: Descriptor,
    ) -> Result<TypeId, MetaError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(MetaError::DuplicateName(name));
        }
        let id = self.fresh_id();
        self.descriptors.insert(id, descriptor);
        self.names.insert(name.clone(), id);
        self.type_names.insert(id, name);
        Ok(id)
    }

    /// Register a descriptor under a caller-chosen id
    ///
    /// Descriptors are immutable once published: redefining an id fails.
    pub fn insert(&mut self, type_id: TypeId, descriptor: Descriptor) -> Result<(), MetaError> {
        if self.descriptors.contains_key(&type_id) {
            return Err(MetaError::DuplicateType(type_id));
        }
        self.descriptors.insert(type_id, descriptor);
        self.next_id = self.next_id.max(type_id.0.saturating_add(1));
        Ok(())
    }

    /// Id of the builtin type for a primitive kind, registered on first use
    /// under its canonical name
    pub fn primitive(&mut self, kind: PrimitiveKind) -> TypeId {
        if let Some(&id) = self.primitives.get(&kind) {
            return id;
        }
        let id = self.fresh_id();
        self.descriptors.insert(id, Descriptor::Primitive(kind));
        self.primitives.insert(kind, id);
        if !self.names.contains_key(kind.name()) {
            self.names.insert(kind.name().to_string(), id);
            self.type_names.insert(id, kind.name().to_string());
        }
        id
    }

    /// Id of a named type
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// Name of a type, if it was registered with one
    pub fn name_of(&self, type_id: TypeId) -> Option<&str> {
        self.type_names.get(&type_id).map(String::as_str)
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.descriptors.contains_key(&type_id)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Number of cached programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Drop every cached program
    pub fn clear_programs(&mut self) {
        self.programs.clear();
    }

    /// Persist descriptors and names
    pub fn snapshot(&self) -> Result<Vec<u8>, MetaError> {
        let mut types: Vec<(TypeId, Option<String>, Descriptor)> = self
            .descriptors
            .iter()
            .map(|(id, d)| (*id, self.type_names.get(id).cloned(), d.clone()))
            .collect();
        types.sort_by_key(|(id, _, _)| *id);

        let snapshot = Snapshot {
            next_id: self.next_id,
            types,
        };
        Ok(bincode::serialize(&snapshot)?)
    }

    /// Restore a registry persisted with [`Registry::snapshot`]
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, MetaError> {
        let snapshot: Snapshot = bincode::deserialize(bytes)?;
        let mut registry = Registry::new();
        for (id, name, descriptor) in snapshot.types {
            if let Descriptor::Primitive(kind) = descriptor {
                registry.primitives.entry(kind).or_insert(id);
            }
            registry.insert(id, descriptor)?;
            if let Some(name) = name {
                if registry.names.contains_key(&name) {
                    return Err(MetaError::DuplicateName(name));
                }
                registry.names.insert(name.clone(), id);
                registry.type_names.insert(id, name);
            }
        }
        registry.next_id = registry.next_id.max(snapshot.next_id);
        Ok(registry)
    }

    fn fresh_id(&mut self) -> TypeId {
        // Ids wrap past u64::MAX; 0 is never issued
        while self.descriptors.contains_key(&TypeId(self.next_id)) || self.next_id == 0 {
            self.next_id = self.next_id.wrapping_add(1);
        }
        let id = TypeId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }
}

impl TypeRegistry for Registry {
    fn descriptor(&self, type_id: TypeId) -> Option<&Descriptor> {
        self.descriptors.get(&type_id)
    }

    fn cached_program(&self, type_id: TypeId) -> Option<Arc<Program>> {
        self.programs.get(&type_id).cloned()
    }

    fn publish_program(&mut self, type_id: TypeId, program: Arc<Program>) {
        self.programs.insert(type_id, program);
    }
}
