//! Type attribution attached to expression nodes.
//!
//! Composite types are `Arc`-shared: the same class type usually decorates many
//! nodes, and the RPC layer sends it once and refers back to it afterwards.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::serde_helpers::{deserialize_arc, serialize_arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Boolean,
    Double,
    String,
    BigInt,
    Null,
    None,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassType {
    pub fully_qualified_name: String,
    pub kind: ClassKind,
    pub type_parameters: Vec<JavaType>,
    pub supertype: Option<JavaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodType {
    pub declaring_type: Option<JavaType>,
    pub name: String,
    pub return_type: JavaType,
    pub parameter_names: Vec<String>,
    pub parameter_types: Vec<JavaType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum JavaType {
    Primitive(Primitive),
    Class(
        #[serde(serialize_with = "serialize_arc", deserialize_with = "deserialize_arc")]
        Arc<ClassType>,
    ),
    Array(
        #[serde(serialize_with = "serialize_arc", deserialize_with = "deserialize_arc")]
        Arc<JavaType>,
    ),
    Union(
        #[serde(serialize_with = "serialize_arc", deserialize_with = "deserialize_arc")]
        Arc<Vec<JavaType>>,
    ),
    Method(
        #[serde(serialize_with = "serialize_arc", deserialize_with = "deserialize_arc")]
        Arc<MethodType>,
    ),
    Unknown,
}

impl JavaType {
    pub fn class(fully_qualified_name: impl Into<String>) -> Self {
        JavaType::Class(Arc::new(ClassType {
            fully_qualified_name: fully_qualified_name.into(),
            kind: ClassKind::Class,
            type_parameters: Vec::new(),
            supertype: None,
        }))
    }

    /// Address of the shared allocation, for variants that have one.
    pub fn identity(&self) -> Option<usize> {
        match self {
            JavaType::Class(c) => Some(Arc::as_ptr(c) as *const () as usize),
            JavaType::Array(a) => Some(Arc::as_ptr(a) as *const () as usize),
            JavaType::Union(u) => Some(Arc::as_ptr(u) as *const () as usize),
            JavaType::Method(m) => Some(Arc::as_ptr(m) as *const () as usize),
            JavaType::Primitive(_) | JavaType::Unknown => None,
        }
    }

    /// Cheap "unchanged" test: shared allocation for composites, value for the rest.
    pub fn same(&self, other: &JavaType) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }
}

pub(crate) fn same_type(a: Option<&JavaType>, b: Option<&JavaType>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same(b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_is_identity_for_composites() {
        let a = JavaType::class("lib.Foo");
        let b = JavaType::class("lib.Foo");
        assert_eq!(a, b);
        assert!(!a.same(&b));
        assert!(a.same(&a.clone()));
        assert!(JavaType::Primitive(Primitive::Double).same(&JavaType::Primitive(Primitive::Double)));
    }

    #[test]
    fn test_json_round_trip() {
        let ty = JavaType::Method(Arc::new(MethodType {
            declaring_type: Some(JavaType::class("console")),
            name: "log".into(),
            return_type: JavaType::Primitive(Primitive::Void),
            parameter_names: vec!["data".into()],
            parameter_types: vec![JavaType::Unknown],
        }));
        let json = serde_json::to_value(&ty).unwrap();
        let back: JavaType = serde_json::from_value(json).unwrap();
        assert_eq!(back, ty);
    }
}
