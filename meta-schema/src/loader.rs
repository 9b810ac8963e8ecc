//! Registers parsed definitions with a [`Registry`]

use crate::error::{Result, SchemaError};
use crate::parser::{parse, ConstantDef, Definition, DefinitionKind, MemberDef, TypeExpr};
use meta_spec::{Constants, Descriptor, PrimitiveKind, Registry, StructDescriptor, TypeId};
use std::collections::HashSet;

/// Parse `source` and register every named type it defines.
///
/// Returns the ids of the defined types in definition order. Types may only
/// reference primitives and types defined earlier (in this source or already
/// present in the registry).
pub fn load_schema(registry: &mut Registry, source: &str) -> Result<Vec<TypeId>> {
    let definitions = parse(source)?;
    let mut ids = Vec::with_capacity(definitions.len());
    for definition in &definitions {
        ids.push(define(registry, definition)?);
    }
    tracing::debug!("Loaded schema with {} types", ids.len());
    Ok(ids)
}

fn define(registry: &mut Registry, definition: &Definition) -> Result<TypeId> {
    let name = &definition.name;
    if PrimitiveKind::from_name(name).is_some() || registry.lookup(name).is_some() {
        return Err(SchemaError::DuplicateType(name.clone()));
    }

    let descriptor = match &definition.kind {
        DefinitionKind::Enum(constants) => Descriptor::Enum(enum_constants(name, constants)?),
        DefinitionKind::Bitmask(constants) => {
            Descriptor::Bitmask(bitmask_constants(name, constants)?)
        }
        DefinitionKind::Struct { members, partial } => {
            Descriptor::Struct(struct_members(registry, name, members, *partial)?)
        }
    };

    let id = registry.register_named(name.clone(), descriptor)?;
    tracing::trace!("Registered {} as type {}", name, id);
    Ok(id)
}

/// Enum values continue from the previous constant
fn enum_constants(type_name: &str, defs: &[ConstantDef]) -> Result<Constants> {
    let mut next = 0i64;
    build_constants(type_name, defs, i32::MIN as i64..=i32::MAX as i64, |value| {
        let current = value.unwrap_or(next);
        next = current + 1;
        current
    })
}

/// Bitmask values default to the next power of two above the previous constant
fn bitmask_constants(type_name: &str, defs: &[ConstantDef]) -> Result<Constants> {
    let mut next = 1i64;
    build_constants(type_name, defs, 0..=u32::MAX as i64, |value| {
        let current = value.unwrap_or(next);
        next = if current <= 0 {
            1
        } else {
            (current as u64 + 1).next_power_of_two() as i64
        };
        current
    })
}

fn build_constants(
    type_name: &str,
    defs: &[ConstantDef],
    range: std::ops::RangeInclusive<i64>,
    mut assign: impl FnMut(Option<i64>) -> i64,
) -> Result<Constants> {
    let mut constants = Constants::new();
    for def in defs {
        let value = assign(def.value);
        if !range.contains(&value) {
            return Err(SchemaError::ConstantOutOfRange {
                constant: def.name.clone(),
                value,
            });
        }
        // Bitmask bits above i32::MAX are stored by bit pattern
        let stored = value as u32 as i32;
        if constants.value_of(&def.name).is_some() || constants.name_of(stored).is_some() {
            return Err(SchemaError::DuplicateConstant {
                type_name: type_name.to_string(),
                constant: def.name.clone(),
            });
        }
        constants.insert(stored, def.name.clone());
    }
    Ok(constants)
}

fn struct_members(
    registry: &mut Registry,
    type_name: &str,
    members: &[MemberDef],
    partial: bool,
) -> Result<StructDescriptor> {
    let mut seen = HashSet::new();
    let mut descriptor = StructDescriptor::new();
    for member in members {
        if !seen.insert(member.name.as_str()) {
            return Err(SchemaError::DuplicateMember {
                type_name: type_name.to_string(),
                member: member.name.clone(),
            });
        }

        let mut type_id = resolve(registry, &member.type_expr)?;
        for &length in member.dims.iter().rev() {
            if length < 1 {
                return Err(SchemaError::InvalidArrayLength {
                    member: member.name.clone(),
                    length,
                });
            }
            type_id = registry.register(Descriptor::Array {
                element: type_id,
                count: length as usize,
            });
        }
        descriptor = descriptor.member(member.name.clone(), type_id);
    }
    if partial {
        descriptor = descriptor.partial();
    }
    Ok(descriptor)
}

fn resolve(registry: &mut Registry, expr: &TypeExpr) -> Result<TypeId> {
    match expr {
        TypeExpr::Named(name) => {
            if let Some(kind) = PrimitiveKind::from_name(name) {
                return Ok(registry.primitive(kind));
            }
            registry
                .lookup(name)
                .ok_or_else(|| SchemaError::UnknownType(name.clone()))
        }
        TypeExpr::List(element) => {
            let element = resolve(registry, element)?;
            Ok(registry.register(Descriptor::List { element }))
        }
        TypeExpr::Map(key, value) => {
            let key = resolve(registry, key)?;
            let value = resolve(registry, value)?;
            Ok(registry.register(Descriptor::Map { key, value }))
        }
    }
}
