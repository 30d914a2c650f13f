// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Engine error types

use crate::schema::SchemaError;
use std::fmt;
use thiserror::Error;

/// Resource guarded by a traversal budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetResource {
    /// Traverser-step evaluations
    Steps,
    /// Working-set size
    Results,
}

impl fmt::Display for BudgetResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetResource::Steps => write!(f, "steps"),
            BudgetResource::Results => write!(f, "results"),
        }
    }
}

/// Errors raised while building or executing a traversal
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaError),

    #[error("Pipeline type error: {0}")]
    PipelineTypeError(String),

    #[error("Traversal budget exceeded: more than {limit} {resource}")]
    TraversalBudgetExceeded {
        resource: BudgetResource,
        limit: usize,
    },
}

impl EngineError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        EngineError::PipelineTypeError(message.into())
    }
}
