// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal results

use serde::{Deserialize, Serialize};

use crate::exec::traverser::Traverser;
use crate::plan::{Cardinality, ElementType, Pipeline};
use crate::schema::VertexModel;
use crate::storage::{GraphCache, Record, Value, Vertex};

/// Final working set of a traversal, shaped by the pipeline's output type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultShape {
    /// The pipeline ends on vertices
    Vertices(Vec<Vertex>),
    /// Scalars, lists or positional tuples
    Values(Vec<Value>),
    /// Named projections
    Records(Vec<Record>),
    /// The pipeline yields exactly one value, e.g. it ends in fold or count
    Aggregate(Value),
}

impl ResultShape {
    pub(crate) fn from_traversers(
        pipeline: &Pipeline,
        traversers: Vec<Traverser>,
        graph: &GraphCache,
    ) -> Self {
        if pipeline.cardinality() == Cardinality::One {
            let value = traversers
                .into_iter()
                .next()
                .map(Traverser::into_current)
                .unwrap_or(Value::Null);
            return ResultShape::Aggregate(value);
        }

        match pipeline.output() {
            ElementType::Vertex(_) => ResultShape::Vertices(
                traversers
                    .iter()
                    .filter_map(|t| t.vertex_id())
                    .filter_map(|id| graph.get_vertex(id).cloned())
                    .collect(),
            ),
            ElementType::Record(_) => ResultShape::Records(
                traversers
                    .into_iter()
                    .filter_map(|t| match t.into_current() {
                        Value::Record(record) => Some(record),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => ResultShape::Values(traversers.into_iter().map(Traverser::into_current).collect()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResultShape::Vertices(items) => items.len(),
            ResultShape::Values(items) => items.len(),
            ResultShape::Records(items) => items.len(),
            ResultShape::Aggregate(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn vertices(&self) -> Option<&[Vertex]> {
        match self {
            ResultShape::Vertices(items) => Some(items),
            _ => None,
        }
    }

    pub fn values(&self) -> Option<&[Value]> {
        match self {
            ResultShape::Values(items) => Some(items),
            _ => None,
        }
    }

    pub fn records(&self) -> Option<&[Record]> {
        match self {
            ResultShape::Records(items) => Some(items),
            _ => None,
        }
    }

    pub fn aggregate(&self) -> Option<&Value> {
        match self {
            ResultShape::Aggregate(value) => Some(value),
            _ => None,
        }
    }

    /// Flatten into plain values; vertices become vertex references
    pub fn into_values(self) -> Vec<Value> {
        match self {
            ResultShape::Vertices(items) => items.into_iter().map(|v| Value::Vertex(v.id)).collect(),
            ResultShape::Values(items) => items,
            ResultShape::Records(items) => items.into_iter().map(Value::Record).collect(),
            ResultShape::Aggregate(value) => vec![value],
        }
    }

    /// Rebuild typed models from vertex results; other shapes give nothing
    pub fn into_models<T: VertexModel>(self) -> Vec<T> {
        match self {
            ResultShape::Vertices(items) => items.iter().filter_map(T::from_vertex).collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
