//! # Program Compiler
//!
//! Lowers a type descriptor into a flat [`Program`], compiling every
//! referenced type first and publishing each result to the registry cache.
//!
//! ## Lowering rules
//!
//! | Descriptor        | Operations                                        |
//! |-------------------|---------------------------------------------------|
//! | Primitive         | one `prim` op                                     |
//! | Enum / Bitmask    | one `enum` / `bitmask` op (4 bytes)               |
//! | Struct            | `push`, member programs in declared order, `pop`  |
//! | Array (inlinable) | element unit with its count set to the length     |
//! | Array (other)     | one `array` op referencing the element program    |
//! | List              | one `list` op (handle)                            |
//! | Map               | one `map` op (handle) with the entry layout       |

use crate::error::{CompileError, Result};
use meta_spec::{
    checked_align_up, Config, Constants, Descriptor, MapLayout, OpKind, Operation, Program,
    StructDescriptor, TypeId, TypeRegistry, HANDLE_SIZE, MAX_VALUE_SIZE,
};
use std::sync::Arc;

/// Size and alignment of enum (i32) and bitmask (u32) storage
const CONSTANT_SIZE: usize = 4;

/// Descriptor-to-program compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    config: Config,
}

impl Compiler {
    /// Create a compiler with a validated configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile `type_id`, returning the cached program when there is one
    pub fn compile<R>(&self, registry: &mut R, type_id: TypeId) -> Result<Arc<Program>>
    where
        R: TypeRegistry + ?Sized,
    {
        let mut session = Session {
            registry,
            max_depth: self.config.max_type_depth,
            in_progress: Vec::new(),
        };

        session.program(type_id).map_err(|err| {
            tracing::warn!("Failed to compile type {}: {}", type_id, err);
            err
        })
    }
}

/// State of one top-level compilation
struct Session<'r, R: ?Sized> {
    registry: &'r mut R,
    max_depth: usize,
    /// Types currently being lowered, outermost first
    in_progress: Vec<TypeId>,
}

impl<R: TypeRegistry + ?Sized> Session<'_, R> {
    fn program(&mut self, type_id: TypeId) -> Result<Arc<Program>> {
        if let Some(program) = self.registry.cached_program(type_id) {
            tracing::trace!("Program cache hit for type {}", type_id);
            return Ok(program);
        }

        if self.in_progress.contains(&type_id) {
            return Err(CompileError::CyclicType(type_id));
        }
        if self.in_progress.len() >= self.max_depth {
            return Err(CompileError::NestingTooDeep {
                type_id,
                max: self.max_depth,
            });
        }

        let descriptor = self
            .registry
            .descriptor(type_id)
            .cloned()
            .ok_or(CompileError::MissingDescriptor(type_id))?;

        self.in_progress.push(type_id);
        let ops = self.lower(type_id, &descriptor);
        self.in_progress.pop();

        let program = Program::new(type_id, ops?);
        program.validate()?;

        tracing::debug!(
            "Compiled type {} ({}): {} ops, size {}, align {}",
            type_id,
            descriptor.kind(),
            program.len(),
            program.size(),
            program.alignment()
        );

        let program = Arc::new(program);
        self.registry.publish_program(type_id, Arc::clone(&program));
        Ok(program)
    }

    fn lower(&mut self, type_id: TypeId, descriptor: &Descriptor) -> Result<Vec<Operation>> {
        match descriptor {
            Descriptor::Primitive(kind) => Ok(vec![Operation::primitive(*kind)]),
            Descriptor::Enum(constants) => Ok(vec![constant_op(OpKind::Enum(shared(constants)))]),
            Descriptor::Bitmask(constants) => {
                Ok(vec![constant_op(OpKind::Bitmask(shared(constants)))])
            }
            Descriptor::Struct(layout) => self.lower_struct(type_id, layout),
            Descriptor::Array { element, count } => self.lower_array(type_id, *element, *count),
            Descriptor::List { element } => {
                let element = self.program(*element)?;
                Ok(vec![Operation::new(
                    OpKind::List(element),
                    HANDLE_SIZE,
                    HANDLE_SIZE,
                )])
            }
            Descriptor::Map { key, value } => self.lower_map(type_id, *key, *value),
        }
    }

    // ========== Structs ==========

    fn lower_struct(&mut self, type_id: TypeId, layout: &StructDescriptor) -> Result<Vec<Operation>> {
        let mut ops = vec![Operation::new(OpKind::Pop, 0, 1)];
        let mut offset = 0usize;
        let mut alignment = 1usize;

        for member in &layout.members {
            let program = self.program(member.type_id)?;
            let member_alignment = program.alignment();
            offset = value_size(type_id, checked_align_up(offset, member_alignment))?;

            let start = ops.len();
            ops.extend_from_slice(program.ops());
            let head = &mut ops[start];
            head.name = Some(Arc::from(member.name.as_str()));
            head.offset = offset;

            offset = value_size(type_id, offset.checked_add(program.size()))?;
            alignment = alignment.max(member_alignment);
        }

        let size = value_size(type_id, checked_align_up(offset, alignment))?;
        ops.push(Operation::new(OpKind::Pop, 0, 1));

        ops[0] = Operation::new(
            OpKind::Push {
                span: ops.len(),
                members: layout.members.len(),
                partial: layout.is_partial,
            },
            size,
            alignment,
        );
        Ok(ops)
    }

    // ========== Collections ==========

    fn lower_array(&mut self, array: TypeId, element: TypeId, count: usize) -> Result<Vec<Operation>> {
        let program = self.program(element)?;
        let size = value_size(array, program.size().checked_mul(count))?;

        if count >= 2 {
            if let Some(head) = program.head() {
                if head.is_inline() && head.repetition() == 1 && head.span() == program.len() {
                    let mut ops = program.ops().to_vec();
                    let head = &mut ops[0];
                    head.count = count;
                    head.name = None;
                    head.offset = 0;
                    return Ok(ops);
                }
            }
        }

        let alignment = program.alignment();
        let mut op = Operation::new(OpKind::Array(program), size, alignment);
        op.count = count;
        Ok(vec![op])
    }

    fn lower_map(&mut self, map: TypeId, key: TypeId, value: TypeId) -> Result<Vec<Operation>> {
        let key_program = self.program(key)?;
        let key_op = match key_program.ops() {
            [op] if op.is_primitive() && op.count == 1 => {
                let mut op = op.clone();
                op.name = None;
                op.offset = 0;
                op
            }
            _ => return Err(CompileError::CompositeMapKey { map, key }),
        };

        let value = self.program(value)?;
        let value_offset = value_size(map, checked_align_up(key_op.size, value.alignment()))?;
        let entry_alignment = key_op.alignment.max(value.alignment());
        let entry_end = value_size(map, value_offset.checked_add(value.size()))?;
        let entry_size = value_size(map, checked_align_up(entry_end, entry_alignment))?;

        Ok(vec![Operation::new(
            OpKind::Map(Box::new(MapLayout {
                key: key_op,
                value,
                value_offset,
                entry_size,
            })),
            HANDLE_SIZE,
            HANDLE_SIZE,
        )])
    }
}

/// Accept a computed size or offset that fits in [`MAX_VALUE_SIZE`]
fn value_size(type_id: TypeId, size: Option<usize>) -> Result<usize> {
    size.filter(|&size| size <= MAX_VALUE_SIZE)
        .ok_or(CompileError::SizeOverflow(type_id))
}

fn shared(constants: &Constants) -> Arc<Constants> {
    Arc::new(constants.clone())
}

fn constant_op(kind: OpKind) -> Operation {
    Operation::new(kind, CONSTANT_SIZE, CONSTANT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meta_spec::{OpCode, PrimitiveKind, Registry};

    fn compile(registry: &mut Registry, type_id: TypeId) -> Result<Arc<Program>> {
        Compiler::default().compile(registry, type_id)
    }

    #[test]
    fn test_compile_primitive() {
        let mut registry = Registry::new();
        let id = registry.primitive(PrimitiveKind::U16);
        let program = compile(&mut registry, id).unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.size(), 2);
        assert_eq!(program.alignment(), 2);
        assert_eq!(program.ops()[0].code(), OpCode::Primitive);
    }

    #[test]
    fn test_compile_enum_and_bitmask() {
        let mut registry = Registry::new();
        let color = registry.register(Descriptor::Enum(Constants::new().with(0, "Red")));
        let flags = registry.register(Descriptor::Bitmask(Constants::new().with(1, "A")));

        let program = compile(&mut registry, color).unwrap();
        assert_eq!(program.ops()[0].code(), OpCode::Enum);
        assert_eq!(program.size(), 4);

        let program = compile(&mut registry, flags).unwrap();
        assert_eq!(program.ops()[0].code(), OpCode::Bitmask);
        assert_eq!(program.alignment(), 4);
    }

    #[test]
    fn test_struct_layout_padding() {
        let mut registry = Registry::new();
        let u8_id = registry.primitive(PrimitiveKind::U8);
        let i64_id = registry.primitive(PrimitiveKind::I64);
        let u16_id = registry.primitive(PrimitiveKind::U16);
        let record = registry.register(Descriptor::structure([
            ("flag", u8_id),
            ("value", i64_id),
            ("tag", u16_id),
        ]));

        let program = compile(&mut registry, record).unwrap();
        let ops = program.ops();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[1].offset, 0);
        assert_eq!(ops[2].offset, 8);
        assert_eq!(ops[3].offset, 16);
        assert_eq!(ops[3].name(), Some("tag"));
        assert_eq!(program.size(), 24);
        assert_eq!(program.alignment(), 8);
        assert!(matches!(
            ops[0].kind,
            OpKind::Push {
                span: 5,
                members: 3,
                partial: false
            }
        ));
    }

    #[test]
    fn test_empty_struct() {
        let mut registry = Registry::new();
        let empty = registry.register(Descriptor::Struct(StructDescriptor::new().partial()));
        let program = compile(&mut registry, empty).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.size(), 0);
        assert_eq!(program.alignment(), 1);
        assert!(matches!(
            program.ops()[0].kind,
            OpKind::Push { partial: true, .. }
        ));
    }

    #[test]
    fn test_nested_struct_offsets_are_relative() {
        let mut registry = Registry::new();
        let f32_id = registry.primitive(PrimitiveKind::F32);
        let u8_id = registry.primitive(PrimitiveKind::U8);
        let point = registry.register(Descriptor::structure([("x", f32_id), ("y", f32_id)]));
        let line = registry.register(Descriptor::structure([
            ("kind", u8_id),
            ("start", point),
            ("end", point),
        ]));

        let program = compile(&mut registry, line).unwrap();
        let ops = program.ops();
        // push, kind, push(start), x, y, pop, push(end), x, y, pop, pop
        assert_eq!(ops.len(), 11);
        assert_eq!(ops[2].name(), Some("start"));
        assert_eq!(ops[2].offset, 4);
        assert_eq!(ops[3].offset, 0);
        assert_eq!(ops[4].offset, 4);
        assert_eq!(ops[6].offset, 12);
        assert_eq!(program.size(), 20);
    }

    #[test]
    fn test_array_of_primitive_is_inlined() {
        let mut registry = Registry::new();
        let i32_id = registry.primitive(PrimitiveKind::I32);
        let array = registry.register(Descriptor::Array {
            element: i32_id,
            count: 5,
        });

        let program = compile(&mut registry, array).unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.ops()[0].count, 5);
        assert_eq!(program.ops()[0].size, 4);
        assert_eq!(program.size(), 20);
    }

    #[test]
    fn test_array_of_struct_is_inlined() {
        let mut registry = Registry::new();
        let f32_id = registry.primitive(PrimitiveKind::F32);
        let point = registry.register(Descriptor::structure([("x", f32_id), ("y", f32_id)]));
        let array = registry.register(Descriptor::Array {
            element: point,
            count: 3,
        });

        let program = compile(&mut registry, array).unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(program.ops()[0].count, 3);
        assert_eq!(program.size(), 24);
    }

    #[test]
    fn test_array_of_arrays_uses_array_op() {
        let mut registry = Registry::new();
        let u8_id = registry.primitive(PrimitiveKind::U8);
        let row = registry.register(Descriptor::Array {
            element: u8_id,
            count: 3,
        });
        let grid = registry.register(Descriptor::Array {
            element: row,
            count: 2,
        });

        let program = compile(&mut registry, grid).unwrap();
        assert_eq!(program.len(), 1);
        let op = &program.ops()[0];
        assert_eq!(op.code(), OpCode::Array);
        assert_eq!(op.count, 2);
        assert_eq!(op.size, 6);
        match &op.kind {
            OpKind::Array(element) => assert_eq!(element.ops()[0].count, 3),
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_single_element_array_not_inlined() {
        let mut registry = Registry::new();
        let i32_id = registry.primitive(PrimitiveKind::I32);
        let array = registry.register(Descriptor::Array {
            element: i32_id,
            count: 1,
        });

        let program = compile(&mut registry, array).unwrap();
        assert_eq!(program.ops()[0].code(), OpCode::Array);
        assert_eq!(program.size(), 4);
    }

    #[test]
    fn test_list_and_map() {
        let mut registry = Registry::new();
        let i32_id = registry.primitive(PrimitiveKind::I32);
        let u8_id = registry.primitive(PrimitiveKind::U8);
        let list = registry.register(Descriptor::List { element: i32_id });
        let map = registry.register(Descriptor::Map {
            key: u8_id,
            value: i32_id,
        });

        let program = compile(&mut registry, list).unwrap();
        assert_eq!(program.ops()[0].code(), OpCode::List);
        assert_eq!(program.size(), HANDLE_SIZE);

        let program = compile(&mut registry, map).unwrap();
        match &program.ops()[0].kind {
            OpKind::Map(layout) => {
                assert_eq!(layout.value_offset, 4);
                assert_eq!(layout.entry_size, 8);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_struct_map_key_rejected() {
        let mut registry = Registry::new();
        let i32_id = registry.primitive(PrimitiveKind::I32);
        let point = registry.register(Descriptor::structure([("x", i32_id)]));
        let map = registry.register(Descriptor::Map {
            key: point,
            value: i32_id,
        });

        let err = compile(&mut registry, map).unwrap_err();
        assert!(matches!(err, CompileError::CompositeMapKey { map: m, key: k } if m == map && k == point));
    }

    #[test]
    fn test_missing_descriptor() {
        let mut registry = Registry::new();
        let list = registry.register(Descriptor::List {
            element: TypeId(999),
        });
        let err = compile(&mut registry, list).unwrap_err();
        assert!(matches!(err, CompileError::MissingDescriptor(TypeId(999))));
        assert_eq!(registry.program_count(), 0);
    }

    #[test]
    fn test_self_referencing_type_rejected() {
        let mut registry = Registry::new();
        let node = TypeId(50);
        let children = registry.register(Descriptor::List { element: node });
        registry
            .insert(node, Descriptor::structure([("children", children)]))
            .unwrap();

        let err = compile(&mut registry, node).unwrap_err();
        assert!(matches!(err, CompileError::CyclicType(id) if id == node));
    }

    #[test]
    fn test_nesting_limit() {
        let mut registry = Registry::new();
        let mut id = registry.primitive(PrimitiveKind::U8);
        for _ in 0..4 {
            id = registry.register(Descriptor::List { element: id });
        }

        let compiler = Compiler::new(Config::new(32, 3).unwrap()).unwrap();
        let err = compiler.compile(&mut registry, id).unwrap_err();
        assert!(matches!(err, CompileError::NestingTooDeep { max: 3, .. }));

        let compiler = Compiler::new(Config::new(32, 5).unwrap()).unwrap();
        assert!(compiler.compile(&mut registry, id).is_ok());
    }

    #[test]
    fn test_memoized_programs_are_shared() {
        let mut registry = Registry::new();
        let i32_id = registry.primitive(PrimitiveKind::I32);
        let point = registry.register(Descriptor::structure([("x", i32_id)]));

        let first = compile(&mut registry, point).unwrap();
        let second = compile(&mut registry, point).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        // point and its member type are both published
        assert_eq!(registry.program_count(), 2);
    }
}
