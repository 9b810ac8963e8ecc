//! # Type Descriptors
//!
//! Declarative definitions of a type's shape. Descriptors reference other
//! types only through [`TypeId`]s resolved by the registry.

use crate::primitive::PrimitiveKind;
use crate::TypeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping of integer values to constant names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constants {
    entries: BTreeMap<i32, String>,
}

impl Constants {
    /// Create an empty constant table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant, replacing any previous name for `value`
    pub fn insert(&mut self, value: i32, name: impl Into<String>) -> &mut Self {
        self.entries.insert(value, name.into());
        self
    }

    /// Builder-style insert
    pub fn with(mut self, value: i32, name: impl Into<String>) -> Self {
        self.insert(value, name);
        self
    }

    /// Name of the constant with the given value
    pub fn name_of(&self, value: i32) -> Option<&str> {
        self.entries.get(&value).map(String::as_str)
    }

    /// Value of the constant with the given name
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(v, _)| *v)
    }

    /// Iterate constants in value order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.entries.iter().map(|(v, n)| (*v, n.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(i32, S)> for Constants {
    fn from_iter<I: IntoIterator<Item = (i32, S)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(v, n)| (v, n.into())).collect(),
        }
    }
}

/// Named struct member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub type_id: TypeId,
}

impl Member {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
        }
    }
}

/// Fixed-size record description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDescriptor {
    /// Members in declaration order
    pub members: Vec<Member>,
    /// The struct has trailing members that are not described
    pub is_partial: bool,
}

impl StructDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style member append
    pub fn member(mut self, name: impl Into<String>, type_id: TypeId) -> Self {
        self.members.push(Member::new(name, type_id));
        self
    }

    /// Mark the struct as partially described
    pub fn partial(mut self) -> Self {
        self.is_partial = true;
        self
    }
}

/// Type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Descriptor {
    Primitive(PrimitiveKind),
    Enum(Constants),
    Bitmask(Constants),
    Struct(StructDescriptor),
    Array { element: TypeId, count: usize },
    List { element: TypeId },
    Map { key: TypeId, value: TypeId },
}

/// Descriptor discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Primitive,
    Enum,
    Bitmask,
    Struct,
    Array,
    List,
    Map,
}

impl Descriptor {
    /// Build a struct descriptor from `(name, type)` pairs
    pub fn structure<N: Into<String>>(members: impl IntoIterator<Item = (N, TypeId)>) -> Self {
        Descriptor::Struct(StructDescriptor {
            members: members
                .into_iter()
                .map(|(name, type_id)| Member::new(name, type_id))
                .collect(),
            is_partial: false,
        })
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            Descriptor::Primitive(_) => DescriptorKind::Primitive,
            Descriptor::Enum(_) => DescriptorKind::Enum,
            Descriptor::Bitmask(_) => DescriptorKind::Bitmask,
            Descriptor::Struct(_) => DescriptorKind::Struct,
            Descriptor::Array { .. } => DescriptorKind::Array,
            Descriptor::List { .. } => DescriptorKind::List,
            Descriptor::Map { .. } => DescriptorKind::Map,
        }
    }

    /// Type ids this descriptor refers to, in declaration order
    pub fn references(&self) -> Vec<TypeId> {
        match self {
            Descriptor::Primitive(_) | Descriptor::Enum(_) | Descriptor::Bitmask(_) => Vec::new(),
            Descriptor::Struct(s) => s.members.iter().map(|m| m.type_id).collect(),
            Descriptor::Array { element, .. } | Descriptor::List { element } => vec![*element],
            Descriptor::Map { key, value } => vec![*key, *value],
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptorKind::Primitive => "primitive",
            DescriptorKind::Enum => "enum",
            DescriptorKind::Bitmask => "bitmask",
            DescriptorKind::Struct => "struct",
            DescriptorKind::Array => "array",
            DescriptorKind::List => "list",
            DescriptorKind::Map => "map",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_lookup() {
        let constants = Constants::new().with(2, "Blue").with(0, "Red").with(1, "Green");
        assert_eq!(constants.len(), 3);
        assert_eq!(constants.name_of(1), Some("Green"));
        assert_eq!(constants.name_of(7), None);
        assert_eq!(constants.value_of("Blue"), Some(2));
        assert_eq!(constants.value_of("Purple"), None);

        // Ordered by value, not insertion
        let names: Vec<&str> = constants.iter().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["Red", "Green", "Blue"]);
    }

    #[test]
    fn test_constants_from_iter() {
        let constants: Constants = [(1, "A"), (4, "C"), (2, "B")].into_iter().collect();
        assert_eq!(constants.iter().map(|(v, _)| v).collect::<Vec<_>>(), vec![1, 2, 4]);
    }

    #[test]
    fn test_struct_builder() {
        let s = StructDescriptor::new()
            .member("x", TypeId(1))
            .member("y", TypeId(2))
            .partial();
        assert_eq!(s.members.len(), 2);
        assert_eq!(s.members[1].name, "y");
        assert!(s.is_partial);
    }

    #[test]
    fn test_descriptor_references() {
        let d = Descriptor::structure([("a", TypeId(3)), ("b", TypeId(4))]);
        assert_eq!(d.kind(), DescriptorKind::Struct);
        assert_eq!(d.references(), vec![TypeId(3), TypeId(4)]);

        let m = Descriptor::Map {
            key: TypeId(1),
            value: TypeId(2),
        };
        assert_eq!(m.references(), vec![TypeId(1), TypeId(2)]);
        assert!(Descriptor::Primitive(PrimitiveKind::I32).references().is_empty());
    }

    #[test]
    fn test_descriptor_kind_display() {
        assert_eq!(DescriptorKind::Bitmask.to_string(), "bitmask");
        assert_eq!(
            Descriptor::List { element: TypeId(1) }.kind().to_string(),
            "list"
        );
    }
}
