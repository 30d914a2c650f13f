// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph storage for typed vertices and edges
//!
//! This module provides:
//! - Value type system for vertex attributes and traversal results
//! - In-memory graph cache with adjacency lists and a per-kind index
//! - Schema-checked store with copy-on-write snapshots

pub mod graph_cache;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod value;

pub use graph_cache::{GraphCache, GraphStats};
pub use snapshot::Snapshot;
pub use store::Store;
pub use types::{
    attributes, Attributes, Direction, Edge, EdgeId, GraphError, StoreError, Vertex, VertexId,
};
pub use value::{Record, Value};
