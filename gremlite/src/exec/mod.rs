// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal execution engine

pub mod budget;
pub mod error;
pub mod executor;
pub mod result;
mod steps;
pub mod traverser;

pub use budget::{BudgetStats, TraversalBudget};
pub use error::{BudgetResource, EngineError};
pub use executor::{Executor, TraverserStream};
pub use result::ResultShape;
pub use traverser::Traverser;
