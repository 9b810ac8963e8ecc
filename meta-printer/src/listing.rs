//! Program listing for debugging compiled types

use meta_spec::{OpKind, Operation, Program};

/// Dump a program's operations, with referenced element programs nested
pub fn listing(program: &Program) -> String {
    let mut output = String::new();
    write_program(&mut output, program, 0);
    output
}

fn write_program(output: &mut String, program: &Program, indent: usize) {
    let pad = "    ".repeat(indent);
    output.push_str(&format!(
        "{}; Type {}: {} ops, size {}, align {}\n",
        pad,
        program.type_id(),
        program.len(),
        program.size(),
        program.alignment()
    ));

    let mut depth = 0usize;
    for (index, op) in program.ops().iter().enumerate() {
        if matches!(op.kind, OpKind::Pop) {
            depth = depth.saturating_sub(1);
        }

        output.push_str(&format!(
            "{}{:4}  {}{:<24} size {:<5} align {:<3} count {:<5} +{:<5}",
            pad,
            index,
            "  ".repeat(depth),
            describe(op),
            op.size,
            op.alignment,
            op.count,
            op.offset
        ));
        if let Some(name) = op.name() {
            output.push_str(name);
        }
        output.push('\n');

        match &op.kind {
            OpKind::Push { .. } => depth += 1,
            OpKind::Array(element) | OpKind::List(element) => {
                write_program(output, element, indent + 1);
            }
            OpKind::Map(layout) => {
                output.push_str(&format!(
                    "{}    ; key {}, value at +{}, entry size {}\n",
                    pad,
                    describe(&layout.key),
                    layout.value_offset,
                    layout.entry_size
                ));
                write_program(output, &layout.value, indent + 1);
            }
            _ => {}
        }
    }
}

fn describe(op: &Operation) -> String {
    match &op.kind {
        OpKind::Primitive(kind) => format!("prim {}", kind),
        OpKind::Enum(constants) => format!("enum ({} constants)", constants.len()),
        OpKind::Bitmask(constants) => format!("bitmask ({} constants)", constants.len()),
        OpKind::Push {
            members, partial, ..
        } => {
            if *partial {
                format!("push {} members, partial", members)
            } else {
                format!("push {} members", members)
            }
        }
        OpKind::Pop => "pop".to_string(),
        OpKind::Array(element) => format!("array of {}", element.type_id()),
        OpKind::List(element) => format!("list of {}", element.type_id()),
        OpKind::Map(layout) => format!("map to {}", layout.value.type_id()),
    }
}
