// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GremLite - an embedded, schema-typed property graph with composable traversals
//!
//! # Features
//!
//! - **Typed Schema**: Vertex kinds with single inheritance and typed attributes
//! - **Checked Mutations**: Every insert and update is validated against the schema
//! - **Traversal Builder**: Persistent, statically checked Gremlin-style pipelines
//! - **Snapshots**: Traversals read a copy-on-write snapshot and never block writers
//! - **Budgets**: Optional step and working-set limits per traversal
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use gremlite::{attributes, new_store, P, SchemaRegistry};
//!
//! let registry = Arc::new(build_registry()?);
//! let store = new_store(registry);
//! let alice = store.insert_vertex("Person", attributes([("name", "Alice")]))?;
//!
//! let friends = store
//!     .traversal()
//!     .from_kind("Person")
//!     .has("name", P::eq("Alice"))
//!     .both("Kennt")
//!     .values("name")
//!     .build()?;
//! let names = store.execute(&friends)?;
//! ```

pub mod config;
pub mod exec;
pub mod plan;
pub mod schema;
pub mod storage;

use std::sync::Arc;

pub use config::EngineConfig;
pub use exec::{BudgetResource, BudgetStats, EngineError, ResultShape, TraversalBudget, Traverser};
pub use plan::{
    Cardinality, ElementType, Operand, Orderer, Pipeline, Predicate, Projector, Traversal,
    TraversalSource, VertexType, P,
};
pub use schema::{
    AttributeDefinition, DataType, EdgeKindDefinition, SchemaError, SchemaRegistry,
    VertexKindDefinition, VertexModel,
};
pub use storage::{
    attributes, Attributes, Direction, Edge, EdgeId, GraphStats, Record, Snapshot, Store,
    StoreError, Value, Vertex, VertexId,
};

/// GremLite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create an empty store for the given schema
pub fn new_store(registry: Arc<SchemaRegistry>) -> Store {
    Store::new(registry)
}
