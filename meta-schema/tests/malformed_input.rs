//! Tests for malformed input handling in the schema loader
//!
//! Tests error handling for various invalid schemas.

use meta_schema::{load_schema, SchemaError};
use meta_spec::Registry;

fn load(source: &str) -> Result<Vec<meta_spec::TypeId>, SchemaError> {
    load_schema(&mut Registry::new(), source)
}

// ============================================================================
// Syntax Error Tests
// ============================================================================

#[test]
fn test_unexpected_character() {
    let result = load("struct A {\n    i32 x; $\n}");
    if let Err(SchemaError::SyntaxError { line, column, message }) = result {
        assert_eq!((line, column), (2, 12));
        assert!(message.contains('$'));
    } else {
        panic!("Expected SyntaxError");
    }
}

#[test]
fn test_missing_member_name() {
    let result = load("struct A { i32; }");
    assert!(matches!(result, Err(SchemaError::SyntaxError { .. })));
}

#[test]
fn test_missing_closing_brace() {
    let result = load("struct A { i32 x;");
    match result {
        Err(SchemaError::SyntaxError { message, .. }) => {
            assert!(message.contains("end of input"));
        }
        other => panic!("Expected SyntaxError, got {:?}", other),
    }
}

#[test]
fn test_unclosed_list() {
    let result = load("struct A { list<i32 x; }");
    assert!(matches!(result, Err(SchemaError::SyntaxError { .. })));
}

#[test]
fn test_map_missing_value_type() {
    let result = load("struct A { map<i32> x; }");
    assert!(matches!(result, Err(SchemaError::SyntaxError { .. })));
}

#[test]
fn test_ellipsis_must_end_struct() {
    let result = load("struct A { ... i32 x; }");
    assert!(matches!(result, Err(SchemaError::SyntaxError { .. })));
}

#[test]
fn test_constant_value_must_be_number() {
    let result = load("enum E { A = B }");
    assert!(matches!(result, Err(SchemaError::SyntaxError { .. })));
}

#[test]
fn test_unknown_definition_keyword() {
    let result = load("class A { }");
    assert!(matches!(
        result,
        Err(SchemaError::SyntaxError { line: 1, column: 1, .. })
    ));
}

// ============================================================================
// Name Resolution Tests
// ============================================================================

#[test]
fn test_unknown_member_type() {
    let result = load("struct A { Vec3 position; }");
    if let Err(SchemaError::UnknownType(name)) = result {
        assert_eq!(name, "Vec3");
    } else {
        panic!("Expected UnknownType error");
    }
}

#[test]
fn test_forward_reference_is_unknown() {
    let source = r#"
        struct A { B inner; }
        struct B { i32 x; }
    "#;
    assert!(matches!(load(source), Err(SchemaError::UnknownType(name)) if name == "B"));
}

#[test]
fn test_self_reference_is_unknown() {
    let result = load("struct Node { list<Node> children; }");
    assert!(matches!(result, Err(SchemaError::UnknownType(name)) if name == "Node"));
}

#[test]
fn test_duplicate_type() {
    let source = r#"
        struct A { i32 x; }
        enum A { X }
    "#;
    assert!(matches!(load(source), Err(SchemaError::DuplicateType(name)) if name == "A"));
}

#[test]
fn test_primitive_name_cannot_be_redefined() {
    let result = load("struct f32 { i32 bits; }");
    assert!(matches!(result, Err(SchemaError::DuplicateType(name)) if name == "f32"));
}

#[test]
fn test_failed_definition_keeps_earlier_types() {
    let mut registry = Registry::new();
    let result = load_schema(
        &mut registry,
        "struct Good { i32 x; }\nstruct Bad { Missing y; }",
    );
    assert!(result.is_err());
    assert!(registry.lookup("Good").is_some());
    assert!(registry.lookup("Bad").is_none());
}

// ============================================================================
// Semantic Error Tests
// ============================================================================

#[test]
fn test_duplicate_member() {
    let result = load("struct P { f32 x; f32 x; }");
    if let Err(SchemaError::DuplicateMember { type_name, member }) = result {
        assert_eq!(type_name, "P");
        assert_eq!(member, "x");
    } else {
        panic!("Expected DuplicateMember error");
    }
}

#[test]
fn test_duplicate_constant_name() {
    let result = load("enum E { A, B, A = 7 }");
    assert!(matches!(
        result,
        Err(SchemaError::DuplicateConstant { constant, .. }) if constant == "A"
    ));
}

#[test]
fn test_zero_array_length() {
    let result = load("struct A { i32 values[0]; }");
    assert!(matches!(
        result,
        Err(SchemaError::InvalidArrayLength { length: 0, .. })
    ));
}

#[test]
fn test_negative_array_length() {
    let result = load("struct A { i32 values[-3]; }");
    assert!(matches!(
        result,
        Err(SchemaError::InvalidArrayLength { length: -3, .. })
    ));
}

#[test]
fn test_enum_overflows_i32() {
    let result = load("enum E { A = 2147483647, B }");
    if let Err(SchemaError::ConstantOutOfRange { constant, value }) = result {
        assert_eq!(constant, "B");
        assert_eq!(value, 2147483648);
    } else {
        panic!("Expected ConstantOutOfRange error");
    }
}

#[test]
fn test_bitmask_exceeds_u32() {
    let result = load("bitmask B { High = 0x80000000, Next }");
    assert!(matches!(
        result,
        Err(SchemaError::ConstantOutOfRange { value: 0x1_0000_0000, .. })
    ));
}
