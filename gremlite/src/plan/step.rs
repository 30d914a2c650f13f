// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal steps as data

use std::fmt;
use std::sync::Arc;

use crate::plan::pipeline::Pipeline;
use crate::plan::predicate::Predicate;
use crate::schema::{DataType, EdgeKindId, VertexKindId};
use crate::storage::{Direction, Value, VertexId};

/// Where a top-level traversal starts
#[derive(Debug, Clone, PartialEq)]
pub enum Seed {
    /// Every vertex in the graph
    All,
    /// Vertices of a kind, sub-kinds included
    Kind(VertexKindId),
    /// Explicit vertices; unknown ids are skipped
    Ids(Vec<VertexId>),
}

/// Named scalar function applied by `map_value`
#[derive(Clone)]
pub struct ValueFn {
    name: String,
    output: DataType,
    func: Arc<dyn Fn(&Value) -> Value + Send + Sync>,
}

impl ValueFn {
    pub fn new<F>(name: impl Into<String>, output: DataType, func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            output,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> DataType {
        self.output
    }

    pub fn apply(&self, value: &Value) -> Value {
        (self.func)(value)
    }
}

impl fmt::Debug for ValueFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueFn")
            .field("name", &self.name)
            .field("output", &self.output)
            .finish()
    }
}

/// Branches of a projection
#[derive(Debug, Clone)]
pub enum Projection {
    /// Produces a `Record`
    Named(Vec<(String, Pipeline)>),
    /// Produces a `List` with one item per branch
    Positional(Vec<Pipeline>),
}

impl Projection {
    pub fn len(&self) -> usize {
        match self {
            Projection::Named(branches) => branches.len(),
            Projection::Positional(branches) => branches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub enum SortBy {
    /// The current value itself
    Current,
    /// An attribute of the current vertex; missing attributes sort first
    Attribute(String),
    /// First result of a sub-pipeline; no result sorts first
    Traversal(Pipeline),
}

#[derive(Debug, Clone)]
pub struct SortKey {
    pub key: SortBy,
    pub descending: bool,
}

#[derive(Debug, Clone)]
pub enum Step {
    /// Keep vertices whose attribute satisfies the predicate
    Has {
        attribute: String,
        predicate: Predicate,
    },
    /// Keep traversers whose current value satisfies the predicate
    Is(Predicate),
    /// Keep traversers for which the sub-pipeline yields anything
    Where(Pipeline),
    /// Keep traversers for which the sub-pipeline yields nothing
    Not(Pipeline),
    OfKind(VertexKindId),
    Expand {
        edge_kind: EdgeKindId,
        direction: Direction,
    },
    /// Bind the current value to a label
    As(String),
    Project(Projection),
    /// Run the body per traverser; `collect` gathers all body results into a list
    Local {
        body: Pipeline,
        collect: bool,
    },
    Fold,
    Count,
    Values(String),
    Map(Pipeline),
    MapValue(ValueFn),
    Order(Vec<SortKey>),
    Limit(usize),
    Dedup,
    Unfold,
}

impl Step {
    /// Barrier steps need the whole working set before emitting anything
    pub fn is_barrier(&self) -> bool {
        matches!(self, Step::Fold | Step::Count | Step::Order(_) | Step::Dedup)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Has {
                attribute,
                predicate,
            } => write!(f, "has({}, {})", attribute, predicate),
            Step::Is(predicate) => write!(f, "is({})", predicate),
            Step::Where(sub) => write!(f, "where({})", sub),
            Step::Not(sub) => write!(f, "not({})", sub),
            Step::OfKind(kind) => write!(f, "ofKind({})", kind),
            Step::Expand {
                edge_kind,
                direction,
            } => write!(f, "{}({})", direction, edge_kind),
            Step::As(label) => write!(f, "as({})", label),
            Step::Project(Projection::Named(branches)) => {
                write!(f, "project(")?;
                for (i, (name, sub)) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, sub)?;
                }
                write!(f, ")")
            }
            Step::Project(Projection::Positional(branches)) => {
                write!(f, "project(")?;
                for (i, sub) in branches.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", sub)?;
                }
                write!(f, ")")
            }
            Step::Local { body, .. } => write!(f, "local({})", body),
            Step::Fold => write!(f, "fold()"),
            Step::Count => write!(f, "count()"),
            Step::Values(attribute) => write!(f, "values({})", attribute),
            Step::Map(sub) => write!(f, "map({})", sub),
            Step::MapValue(func) => write!(f, "map({})", func.name),
            Step::Order(keys) => write!(f, "order({} keys)", keys.len()),
            Step::Limit(n) => write!(f, "limit({})", n),
            Step::Dedup => write!(f, "dedup()"),
            Step::Unfold => write!(f, "unfold()"),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seed::All => write!(f, "V()"),
            Seed::Kind(kind) => write!(f, "V({})", kind),
            Seed::Ids(ids) => write!(f, "V({} ids)", ids.len()),
        }
    }
}
