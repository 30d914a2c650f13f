// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Core schema type definitions for vertex and edge kinds

use crate::storage::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a vertex kind inside a frozen schema registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexKindId(pub(crate) u16);

impl fmt::Display for VertexKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vertex-kind#{}", self.0)
    }
}

/// Identifier of an edge kind inside a frozen schema registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKindId(pub(crate) u16);

impl fmt::Display for EdgeKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge-kind#{}", self.0)
    }
}

/// Definition of a vertex kind
///
/// Kinds form a taxonomy through `extends`; attributes of the parent kind
/// are inherited. Abstract kinds cannot be instantiated but can be used to
/// narrow traversals (e.g. every concrete kind of pet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexKindDefinition {
    pub label: String,
    pub extends: Option<String>,
    pub is_abstract: bool,
    pub attributes: Vec<AttributeDefinition>,
    pub description: Option<String>,
}

impl VertexKindDefinition {
    /// Concrete kind without a parent
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            extends: None,
            is_abstract: false,
            attributes: Vec::new(),
            description: None,
        }
    }

    /// Abstract kind, usable only as a parent and as a narrowing target
    pub fn abstract_kind(label: impl Into<String>) -> Self {
        Self {
            is_abstract: true,
            ..Self::new(label)
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn attribute(mut self, attribute: AttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Definition of an edge kind
///
/// Endpoint kinds are optional; when present, `insert_edge` checks them and
/// the query builder uses them to type the vertices reached by expansion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeKindDefinition {
    pub label: String,
    pub source: Option<String>,
    pub target: Option<String>,
    pub description: Option<String>,
}

impl EdgeKindDefinition {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            source: None,
            target: None,
            description: None,
        }
    }

    /// Restrict the source vertex to the given kind (or its sub-kinds)
    pub fn from_kind(mut self, kind: impl Into<String>) -> Self {
        self.source = Some(kind.into());
        self
    }

    /// Restrict the target vertex to the given kind (or its sub-kinds)
    pub fn to_kind(mut self, kind: impl Into<String>) -> Self {
        self.target = Some(kind.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Definition of an attribute within a vertex kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub data_type: DataType,
    pub required: bool,
}

impl AttributeDefinition {
    pub fn required(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            required: false,
        }
    }
}

/// Supported attribute data types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Integer,
    Float,
    String,
    DateTime,
    List,
    Any,
}

impl DataType {
    /// Check whether a value can be stored under this data type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (DataType::Any, _) => true,
            (DataType::Boolean, Value::Boolean(_)) => true,
            (DataType::Integer, Value::Integer(_)) => true,
            (DataType::Float, Value::Float(_) | Value::Integer(_)) => true,
            (DataType::String, Value::String(_)) => true,
            (DataType::DateTime, Value::DateTime(_)) => true,
            (DataType::List, Value::List(_)) => true,
            _ => false,
        }
    }

    /// Coerce an accepted value to its canonical stored form
    pub fn coerce(&self, value: Value) -> Value {
        match (self, value) {
            (DataType::Float, Value::Integer(n)) => Value::Float(n as f64),
            (_, value) => value,
        }
    }

    /// Integer and Float are mutually comparable
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }

    /// Types that support ordering comparisons
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            DataType::Integer | DataType::Float | DataType::String | DataType::DateTime | DataType::Any
        )
    }

    pub fn is_compatible_with(&self, other: &DataType) -> bool {
        match (self, other) {
            (DataType::Any, _) | (_, DataType::Any) => true,
            (a, b) if a.is_numeric() && b.is_numeric() => true,
            (a, b) => a == b,
        }
    }

    /// Data type describing a literal value
    pub fn of_value(value: &Value) -> DataType {
        match value {
            Value::Boolean(_) => DataType::Boolean,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::String(_) => DataType::String,
            Value::DateTime(_) => DataType::DateTime,
            Value::List(_) => DataType::List,
            Value::Null | Value::Record(_) | Value::Vertex(_) => DataType::Any,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "Boolean",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::String => "String",
            DataType::DateTime => "DateTime",
            DataType::List => "List",
            DataType::Any => "Any",
        };
        write!(f, "{}", name)
    }
}
