// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Immutable, type-checked traversal pipeline

use std::fmt;
use std::sync::Arc;

use crate::plan::element_type::{Cardinality, ElementType};
use crate::plan::step::{Seed, Step};
use crate::schema::SchemaRegistry;

/// A traversal ready to execute
///
/// Built by [`crate::plan::Traversal::build`]. Sub-pipelines nested in
/// steps have no seed: they start from the traverser handed to them.
#[derive(Clone)]
pub struct Pipeline {
    pub(crate) registry: Arc<SchemaRegistry>,
    pub(crate) seed: Option<Seed>,
    pub(crate) steps: Arc<Vec<Step>>,
    pub(crate) output: ElementType,
    pub(crate) cardinality: Cardinality,
}

impl Pipeline {
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn seed(&self) -> Option<&Seed> {
        self.seed.as_ref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Type of the values this pipeline yields
    pub fn output(&self) -> &ElementType {
        &self.output
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Whether the pipeline yields at most one traverser per input
    pub fn is_single(&self) -> bool {
        self.cardinality.is_single()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("seed", &self.seed)
            .field("steps", &self.steps)
            .field("output", &self.output)
            .field("cardinality", &self.cardinality)
            .finish()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.seed {
            Some(seed) => write!(f, "{}", seed)?,
            None => write!(f, "__")?,
        }
        for step in self.steps.iter() {
            write!(f, ".{}", step)?;
        }
        Ok(())
    }
}
