// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Read-only graph snapshots
//!
//! A snapshot pins one generation of the graph. Writers copy the graph
//! before mutating it while a snapshot is outstanding, so reads through a
//! snapshot never see a later mutation.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use crate::config::EngineConfig;
use crate::exec::{EngineError, Executor, ResultShape, TraversalBudget};
use crate::plan::Pipeline;
use crate::schema::SchemaRegistry;
use crate::storage::graph_cache::{GraphCache, GraphStats};
use crate::storage::types::{Direction, Edge, EdgeId, StoreError, Vertex, VertexId};

/// Immutable view of the store at one generation
#[derive(Debug, Clone)]
pub struct Snapshot {
    graph: Arc<GraphCache>,
    registry: Arc<SchemaRegistry>,
    config: EngineConfig,
}

impl Snapshot {
    pub(crate) fn new(
        graph: Arc<GraphCache>,
        registry: Arc<SchemaRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            graph,
            registry,
            config,
        }
    }

    pub fn generation(&self) -> u64 {
        self.graph.generation()
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.graph.get_vertex(id)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.graph.get_edge(id)
    }

    /// Neighbors of a vertex over edges of the named kind
    pub fn neighbors(
        &self,
        vertex: VertexId,
        edge_kind: &str,
        direction: Direction,
    ) -> Result<Vec<VertexId>, StoreError> {
        let kind = self.registry.edge_kind(edge_kind)?;
        Ok(self.graph.neighbors(vertex, kind, direction).collect())
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// Execute a pipeline under the budget from the engine configuration
    pub fn execute(&self, pipeline: &Pipeline) -> Result<ResultShape, EngineError> {
        self.execute_with_budget(pipeline, TraversalBudget::from_config(&self.config))
    }

    /// Execute a pipeline under an explicit budget
    pub fn execute_with_budget(
        &self,
        pipeline: &Pipeline,
        budget: TraversalBudget,
    ) -> Result<ResultShape, EngineError> {
        if !Arc::ptr_eq(pipeline.registry(), &self.registry) {
            return Err(EngineError::PipelineTypeError(
                "pipeline was built against a different schema registry".to_string(),
            ));
        }

        let started = Instant::now();
        let executor = Executor::new(&self.graph, &self.registry, budget);
        let traversers = executor.execute(pipeline)?;
        let shape = ResultShape::from_traversers(pipeline, traversers, &self.graph);

        let elapsed = started.elapsed();
        let stats = executor.budget().stats();
        debug!(
            "Traversal {} finished at generation {}: {} results, {} steps in {:?}",
            pipeline,
            self.generation(),
            shape.len(),
            stats.steps,
            elapsed
        );
        if let Some(threshold) = self.config.log_slow_traversal_ms {
            if elapsed.as_millis() >= u128::from(threshold) {
                warn!(
                    "Slow traversal ({:?}, {} steps, peak working set {}): {}",
                    elapsed, stats.steps, stats.peak_results, pipeline
                );
            }
        }

        Ok(shape)
    }
}
