// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory graph cache implementation
//!
//! Provides fast graph storage using HashMap for vertices/edges and
//! per-vertex adjacency lists keyed by edge kind. A per-kind index lists
//! the vertices of each concrete kind in insertion order.
//!
//! Deleting a vertex leaves its incident edges in place. Such edges are
//! dangling: every read path filters them out, and
//! [`GraphCache::purge_dangling_edges`] removes them for good.

use std::collections::{BTreeMap, HashMap};

use crate::schema::{EdgeKindId, VertexKindId};
use crate::storage::types::{Attributes, Direction, Edge, EdgeId, GraphError, Vertex, VertexId};

/// Edges touching one vertex, grouped by kind
#[derive(Debug, Clone, Default)]
struct Adjacency {
    out: HashMap<EdgeKindId, Vec<EdgeId>>,
    inc: HashMap<EdgeKindId, Vec<EdgeId>>,
}

/// In-memory graph cache with indices for fast lookups
#[derive(Debug, Clone, Default)]
pub struct GraphCache {
    /// All vertices indexed by ID
    vertices: HashMap<VertexId, Vertex>,

    /// All edges indexed by ID, dangling ones included
    edges: HashMap<EdgeId, Edge>,

    /// Index: concrete kind -> vertex IDs of that kind
    kind_index: BTreeMap<VertexKindId, Vec<VertexId>>,

    /// Adjacency lists per live vertex
    adjacency: HashMap<VertexId, Adjacency>,

    next_vertex_id: u64,
    next_edge_id: u64,

    /// Bumped by every mutation
    generation: u64,
}

impl GraphCache {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Add a vertex with already validated attributes
    pub fn add_vertex(&mut self, kind: VertexKindId, attributes: Attributes) -> VertexId {
        let id = VertexId::new(self.next_vertex_id);
        self.next_vertex_id += 1;

        self.kind_index.entry(kind).or_default().push(id);
        self.adjacency.insert(id, Adjacency::default());
        self.vertices.insert(id, Vertex { id, kind, attributes });
        self.generation += 1;

        id
    }

    /// Add an edge between two existing vertices
    pub fn add_edge(
        &mut self,
        kind: EdgeKindId,
        source: VertexId,
        target: VertexId,
    ) -> Result<EdgeId, GraphError> {
        for endpoint in [source, target] {
            if !self.vertices.contains_key(&endpoint) {
                return Err(GraphError::VertexNotFound(endpoint));
            }
        }

        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;

        self.adjacency
            .entry(source)
            .or_default()
            .out
            .entry(kind)
            .or_default()
            .push(id);
        self.adjacency
            .entry(target)
            .or_default()
            .inc
            .entry(kind)
            .or_default()
            .push(id);

        self.edges.insert(
            id,
            Edge {
                id,
                kind,
                source,
                target,
            },
        );
        self.generation += 1;

        Ok(id)
    }

    /// Get a vertex by ID
    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Get an edge by ID; dangling edges are reported absent
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.live_edge(id)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Replace the attribute mapping of a vertex
    pub fn replace_attributes(
        &mut self,
        id: VertexId,
        attributes: Attributes,
    ) -> Result<(), GraphError> {
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or(GraphError::VertexNotFound(id))?;
        vertex.attributes = attributes;
        self.generation += 1;
        Ok(())
    }

    /// Remove a vertex; incident edges become dangling
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex, GraphError> {
        let vertex = self
            .vertices
            .remove(&id)
            .ok_or(GraphError::VertexNotFound(id))?;

        if let Some(ids) = self.kind_index.get_mut(&vertex.kind) {
            ids.retain(|v| *v != id);
            if ids.is_empty() {
                self.kind_index.remove(&vertex.kind);
            }
        }
        self.adjacency.remove(&id);
        self.generation += 1;

        Ok(vertex)
    }

    /// Remove an edge
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<Edge, GraphError> {
        if self.live_edge(id).is_none() {
            return Err(GraphError::EdgeNotFound(id));
        }
        let edge = self.edges.remove(&id).ok_or(GraphError::EdgeNotFound(id))?;
        self.unlink(&edge);
        self.generation += 1;
        Ok(edge)
    }

    /// Drop every dangling edge, returning how many were removed
    pub fn purge_dangling_edges(&mut self) -> usize {
        let dangling: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| !self.is_live(e))
            .map(|e| e.id)
            .collect();

        for id in &dangling {
            if let Some(edge) = self.edges.remove(id) {
                self.unlink(&edge);
            }
        }
        if !dangling.is_empty() {
            self.generation += 1;
        }
        dangling.len()
    }

    /// Vertices whose concrete kind is `kind`, in insertion order
    pub fn vertices_of_kind(&self, kind: VertexKindId) -> impl Iterator<Item = &Vertex> + '_ {
        self.kind_index
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(|id| self.vertices.get(id))
    }

    /// All vertices, grouped by kind and in insertion order within a kind
    pub fn all_vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.kind_index
            .values()
            .flatten()
            .filter_map(|id| self.vertices.get(id))
    }

    /// Neighbor vertex IDs reached over live edges of `kind`
    ///
    /// For `Direction::Both` the targets of outgoing edges come first,
    /// followed by the sources of incoming edges. No deduplication happens.
    pub fn neighbors(
        &self,
        vertex: VertexId,
        kind: EdgeKindId,
        direction: Direction,
    ) -> impl Iterator<Item = VertexId> + '_ {
        let adjacency = self.adjacency.get(&vertex);
        let out = adjacency
            .filter(|_| direction.includes_out())
            .and_then(|a| a.out.get(&kind))
            .into_iter()
            .flatten()
            .map(|id| (*id, true));
        let inc = adjacency
            .filter(|_| direction.includes_in())
            .and_then(|a| a.inc.get(&kind))
            .into_iter()
            .flatten()
            .map(|id| (*id, false));

        out.chain(inc).filter_map(move |(id, outgoing)| {
            let edge = self.live_edge(id)?;
            Some(if outgoing { edge.target } else { edge.source })
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Get graph statistics
    pub fn stats(&self) -> GraphStats {
        let live = self.edges.values().filter(|e| self.is_live(e)).count();
        GraphStats {
            vertex_count: self.vertices.len(),
            edge_count: live,
            dangling_edge_count: self.edges.len() - live,
            vertex_kind_count: self.kind_index.len(),
            generation: self.generation,
        }
    }

    /// Clear all data from the graph; identifiers keep counting up
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.kind_index.clear();
        self.adjacency.clear();
        self.generation += 1;
    }

    fn live_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id).filter(|e| self.is_live(e))
    }

    fn is_live(&self, edge: &Edge) -> bool {
        self.vertices.contains_key(&edge.source) && self.vertices.contains_key(&edge.target)
    }

    fn unlink(&mut self, edge: &Edge) {
        if let Some(list) = self
            .adjacency
            .get_mut(&edge.source)
            .and_then(|a| a.out.get_mut(&edge.kind))
        {
            list.retain(|id| *id != edge.id);
        }
        if let Some(list) = self
            .adjacency
            .get_mut(&edge.target)
            .and_then(|a| a.inc.get_mut(&edge.kind))
        {
            list.retain(|id| *id != edge.id);
        }
    }
}

/// Graph statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub dangling_edge_count: usize,
    pub vertex_kind_count: usize,
    pub generation: u64,
}
