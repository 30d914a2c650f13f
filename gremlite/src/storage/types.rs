// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph data structures and error types
//!
//! Defines Vertex and Edge structures for the in-memory graph,
//! their identifiers, and error types for store operations.

use crate::schema::{EdgeKindId, SchemaError, VertexKindId};
use crate::storage::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Attribute mapping carried by a vertex
pub type Attributes = HashMap<String, Value>;

/// Build an attribute mapping from name/value pairs
pub fn attributes<K, V, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Opaque vertex identifier, assigned by the store and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(u64);

impl VertexId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric form of the identifier
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Opaque edge identifier, assigned by the store and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric form of the identifier
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Direction in which edges are followed during expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Follow edges from source to target
    Out,
    /// Follow edges from target to source
    In,
    /// Outgoing edges followed by incoming edges
    Both,
}

impl Direction {
    pub fn includes_out(&self) -> bool {
        matches!(self, Direction::Out | Direction::Both)
    }

    pub fn includes_in(&self) -> bool {
        matches!(self, Direction::In | Direction::Both)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Out => write!(f, "out"),
            Direction::In => write!(f, "in"),
            Direction::Both => write!(f, "both"),
        }
    }
}

/// Graph vertex with id, concrete kind, and attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub kind: VertexKindId,
    pub attributes: Attributes,
}

impl Vertex {
    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Check if vertex has a specific attribute set
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Directed graph edge between two vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub kind: EdgeKindId,
    pub source: VertexId,
    pub target: VertexId,
}

/// Error types for graph cache operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Vertex not found: {0}")]
    VertexNotFound(VertexId),

    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),
}

/// Error types for store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaError),

    #[error("Dangling reference: edge '{edge_kind}' from {source_id} to {target_id} - vertex {missing} does not exist")]
    DanglingReference {
        edge_kind: String,
        source_id: VertexId,
        target_id: VertexId,
        missing: VertexId,
    },
}
