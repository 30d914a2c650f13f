// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph store
//!
//! The store owns the current graph behind a read-write lock. Writers
//! mutate through [`Arc::make_mut`], which copies the graph only when a
//! snapshot still holds the previous generation. Traversals always run on
//! a snapshot and never hold the lock while executing.

use std::sync::Arc;

use log::{debug, info};
use parking_lot::RwLock;

use crate::config::EngineConfig;
use crate::exec::{EngineError, ResultShape, TraversalBudget};
use crate::plan::{Pipeline, TraversalSource};
use crate::schema::{SchemaRegistry, SchemaValidator, VertexModel};
use crate::storage::graph_cache::{GraphCache, GraphStats};
use crate::storage::snapshot::Snapshot;
use crate::storage::types::{
    Attributes, Direction, Edge, EdgeId, GraphError, StoreError, Vertex, VertexId,
};

/// Schema-checked, thread-safe graph store
pub struct Store {
    registry: Arc<SchemaRegistry>,
    config: EngineConfig,
    data: RwLock<Arc<GraphCache>>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Store {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: Arc<SchemaRegistry>, config: EngineConfig) -> Self {
        info!(
            "Creating graph store with {} vertex kinds and {} edge kinds",
            registry.vertex_kinds().count(),
            registry.edge_kinds().count()
        );
        Self {
            registry,
            config,
            data: RwLock::new(Arc::new(GraphCache::new())),
        }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- Mutation ----

    /// Insert a vertex of a concrete kind
    pub fn insert_vertex(&self, kind: &str, attributes: Attributes) -> Result<VertexId, StoreError> {
        let kind_id = self.registry.vertex_kind(kind)?;
        let attributes = SchemaValidator::new(&self.registry).validate_attributes(kind_id, attributes)?;

        let mut data = self.data.write();
        let id = Arc::make_mut(&mut *data).add_vertex(kind_id, attributes);
        debug!("Inserted vertex {} of kind '{}'", id, kind);
        Ok(id)
    }

    /// Insert a typed model as a vertex of its kind
    pub fn insert_model<T: VertexModel>(&self, model: T) -> Result<VertexId, StoreError> {
        self.insert_vertex(T::KIND, model.into_attributes())
    }

    /// Insert a directed edge; both endpoints must exist
    pub fn insert_edge(
        &self,
        kind: &str,
        source: VertexId,
        target: VertexId,
    ) -> Result<EdgeId, StoreError> {
        let kind_id = self.registry.edge_kind(kind)?;

        let mut data = self.data.write();
        let dangling = |missing| StoreError::DanglingReference {
            edge_kind: kind.to_string(),
            source_id: source,
            target_id: target,
            missing,
        };
        let source_vertex = data.get_vertex(source).ok_or_else(|| dangling(source))?;
        let target_vertex = data.get_vertex(target).ok_or_else(|| dangling(target))?;
        SchemaValidator::new(&self.registry).validate_edge(kind_id, source_vertex, target_vertex)?;

        let id = Arc::make_mut(&mut *data)
            .add_edge(kind_id, source, target)
            .map_err(|e| match e {
                GraphError::VertexNotFound(missing) => dangling(missing),
                GraphError::EdgeNotFound(_) => unreachable!("add_edge only reports missing vertices"),
            })?;
        debug!("Inserted edge {} '{}' {} -> {}", id, kind, source, target);
        Ok(id)
    }

    /// Replace the attributes of a vertex; `false` when the vertex is absent
    pub fn update_vertex(&self, id: VertexId, attributes: Attributes) -> Result<bool, StoreError> {
        let mut data = self.data.write();
        let kind = match data.get_vertex(id) {
            Some(vertex) => vertex.kind,
            None => return Ok(false),
        };
        let attributes = SchemaValidator::new(&self.registry).validate_attributes(kind, attributes)?;

        let updated = Arc::make_mut(&mut *data)
            .replace_attributes(id, attributes)
            .is_ok();
        debug!("Updated attributes of vertex {}", id);
        Ok(updated)
    }

    /// Delete a vertex; its edges stay behind as dangling edges
    pub fn delete_vertex(&self, id: VertexId) -> bool {
        let mut data = self.data.write();
        if !data.contains_vertex(id) {
            return false;
        }
        let removed = Arc::make_mut(&mut *data).remove_vertex(id).is_ok();
        debug!("Deleted vertex {}", id);
        removed
    }

    pub fn delete_edge(&self, id: EdgeId) -> bool {
        let mut data = self.data.write();
        if data.get_edge(id).is_none() {
            return false;
        }
        let removed = Arc::make_mut(&mut *data).remove_edge(id).is_ok();
        debug!("Deleted edge {}", id);
        removed
    }

    /// Remove every vertex and edge; identifiers are never handed out again
    pub fn drop_all(&self) {
        let mut data = self.data.write();
        let stats = data.stats();
        Arc::make_mut(&mut *data).clear();
        info!(
            "Dropped all graph data ({} vertices, {} edges)",
            stats.vertex_count,
            stats.edge_count + stats.dangling_edge_count
        );
    }

    /// Remove dangling edges left behind by vertex deletion
    pub fn purge_dangling_edges(&self) -> usize {
        let mut data = self.data.write();
        if data.stats().dangling_edge_count == 0 {
            return 0;
        }
        let purged = Arc::make_mut(&mut *data).purge_dangling_edges();
        debug!("Purged {} dangling edges", purged);
        purged
    }

    // ---- Reads ----

    pub fn get_vertex(&self, id: VertexId) -> Option<Vertex> {
        self.data.read().get_vertex(id).cloned()
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        self.data.read().get_edge(id).cloned()
    }

    pub fn neighbors(
        &self,
        vertex: VertexId,
        edge_kind: &str,
        direction: Direction,
    ) -> Result<Vec<VertexId>, StoreError> {
        self.snapshot().neighbors(vertex, edge_kind, direction)
    }

    pub fn stats(&self) -> GraphStats {
        self.data.read().stats()
    }

    /// Pin the current generation for repeated reads
    pub fn snapshot(&self) -> Snapshot {
        let graph = Arc::clone(&*self.data.read());
        Snapshot::new(graph, Arc::clone(&self.registry), self.config.clone())
    }

    // ---- Queries ----

    /// Start building a traversal against this store's schema
    pub fn traversal(&self) -> TraversalSource {
        TraversalSource::new(Arc::clone(&self.registry))
    }

    pub fn execute(&self, pipeline: &Pipeline) -> Result<ResultShape, EngineError> {
        self.snapshot().execute(pipeline)
    }

    pub fn execute_with_budget(
        &self,
        pipeline: &Pipeline,
        budget: TraversalBudget,
    ) -> Result<ResultShape, EngineError> {
        self.snapshot().execute_with_budget(pipeline, budget)
    }
}
