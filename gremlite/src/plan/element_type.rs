// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Static types tracked while a traversal is composed

use std::fmt;

use crate::schema::{DataType, SchemaRegistry, VertexKindId};

/// Vertex type known at composition time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexType {
    /// Any vertex; attribute access is not type-checkable
    Any,
    /// Vertices of this kind or one of its sub-kinds
    Kind(VertexKindId),
}

/// Type of the current value carried by every traverser at some step
#[derive(Debug, Clone, PartialEq)]
pub enum ElementType {
    Vertex(VertexType),
    Scalar(DataType),
    List(Box<ElementType>),
    /// Named projection
    Record(Vec<(String, ElementType)>),
    /// Positional projection
    Tuple(Vec<ElementType>),
}

impl ElementType {
    pub fn any_scalar() -> Self {
        ElementType::Scalar(DataType::Any)
    }

    /// Element type of an attribute with the given data type
    pub fn of_attribute(data_type: DataType) -> Self {
        match data_type {
            DataType::List => ElementType::List(Box::new(Self::any_scalar())),
            other => ElementType::Scalar(other),
        }
    }

    pub fn is_vertex(&self) -> bool {
        matches!(self, ElementType::Vertex(_))
    }

    /// Whether values of this type may be lists at runtime
    pub fn is_list_like(&self) -> bool {
        matches!(
            self,
            ElementType::List(_) | ElementType::Scalar(DataType::List) | ElementType::Scalar(DataType::Any)
        )
    }

    /// Whether values of this type may be strings at runtime
    pub fn is_text_like(&self) -> bool {
        matches!(self, ElementType::Scalar(DataType::String) | ElementType::Scalar(DataType::Any))
    }

    /// Whether values of this type support ordering comparisons
    pub fn is_orderable(&self) -> bool {
        match self {
            ElementType::Scalar(data_type) => data_type.is_orderable(),
            ElementType::Vertex(_) => true,
            _ => false,
        }
    }

    /// Type of the items produced by unfolding a value of this type
    pub fn item_type(&self) -> Option<ElementType> {
        match self {
            ElementType::List(inner) => Some((**inner).clone()),
            ElementType::Scalar(DataType::List) | ElementType::Scalar(DataType::Any) => {
                Some(Self::any_scalar())
            }
            _ => None,
        }
    }

    /// Whether two types may hold equal values
    pub fn may_equal(&self, other: &ElementType) -> bool {
        match (self, other) {
            (ElementType::Scalar(DataType::Any), _) | (_, ElementType::Scalar(DataType::Any)) => true,
            (ElementType::Vertex(_), ElementType::Vertex(_)) => true,
            (ElementType::Scalar(a), ElementType::Scalar(b)) => a.is_compatible_with(b),
            (ElementType::List(_), ElementType::Scalar(DataType::List))
            | (ElementType::Scalar(DataType::List), ElementType::List(_)) => true,
            (ElementType::List(a), ElementType::List(b)) => a.may_equal(b),
            (ElementType::Record(_), ElementType::Record(_)) => true,
            (ElementType::Tuple(_), ElementType::Tuple(_)) => true,
            _ => false,
        }
    }

    /// Human readable form using kind labels
    pub fn describe(&self, registry: &SchemaRegistry) -> String {
        match self {
            ElementType::Vertex(VertexType::Any) => "Vertex".to_string(),
            ElementType::Vertex(VertexType::Kind(kind)) => {
                format!("Vertex<{}>", registry.vertex_label(*kind))
            }
            ElementType::Scalar(data_type) => data_type.to_string(),
            ElementType::List(inner) => format!("List<{}>", inner.describe(registry)),
            ElementType::Record(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", name, ty.describe(registry)))
                    .collect();
                format!("Record{{{}}}", fields.join(", "))
            }
            ElementType::Tuple(items) => {
                let items: Vec<String> = items.iter().map(|ty| ty.describe(registry)).collect();
                format!("Tuple({})", items.join(", "))
            }
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Vertex(VertexType::Any) => write!(f, "Vertex"),
            ElementType::Vertex(VertexType::Kind(kind)) => write!(f, "Vertex<{}>", kind),
            ElementType::Scalar(data_type) => write!(f, "{}", data_type),
            ElementType::List(inner) => write!(f, "List<{}>", inner),
            ElementType::Record(fields) => write!(f, "Record({} fields)", fields.len()),
            ElementType::Tuple(items) => write!(f, "Tuple({} items)", items.len()),
        }
    }
}

/// How many traversers a pipeline yields per input traverser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Many,
    /// Exactly one, e.g. after fold or count
    One,
    /// One or none, e.g. a filter applied after fold
    AtMostOne,
}

impl Cardinality {
    /// Cardinality after a step that may drop traversers
    pub fn filtered(self) -> Self {
        match self {
            Cardinality::One => Cardinality::AtMostOne,
            other => other,
        }
    }

    pub fn is_single(self) -> bool {
        matches!(self, Cardinality::One | Cardinality::AtMostOne)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_types() {
        assert_eq!(
            ElementType::of_attribute(DataType::String),
            ElementType::Scalar(DataType::String)
        );
        assert_eq!(
            ElementType::of_attribute(DataType::List).item_type(),
            Some(ElementType::any_scalar())
        );
    }

    #[test]
    fn test_cardinality_filtering() {
        assert_eq!(Cardinality::One.filtered(), Cardinality::AtMostOne);
        assert_eq!(Cardinality::Many.filtered(), Cardinality::Many);
        assert!(Cardinality::AtMostOne.is_single());
        assert!(!Cardinality::Many.is_single());
    }

    #[test]
    fn test_may_equal() {
        let integer = ElementType::Scalar(DataType::Integer);
        let float = ElementType::Scalar(DataType::Float);
        let text = ElementType::Scalar(DataType::String);
        assert!(integer.may_equal(&float));
        assert!(!integer.may_equal(&text));
        assert!(!ElementType::Vertex(VertexType::Any).may_equal(&text));
    }
}
