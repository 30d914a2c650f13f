// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal budget enforcement
//!
//! Counts traverser-step evaluations and watches working-set sizes so that
//! runaway traversals abort with an error instead of exhausting memory.

use crate::config::EngineConfig;
use crate::exec::error::{BudgetResource, EngineError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Budget tracker for one traversal
///
/// Clones share the same counters, so a budget handed to nested
/// sub-pipelines charges the same totals.
#[derive(Clone)]
pub struct TraversalBudget {
    max_steps: usize,
    max_results: usize,

    /// Steps charged so far
    steps: Arc<AtomicUsize>,

    /// Largest working set seen at a checkpoint
    peak_results: Arc<AtomicUsize>,
}

impl std::fmt::Debug for TraversalBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalBudget")
            .field("max_steps", &self.max_steps)
            .field("max_results", &self.max_results)
            .field("steps", &self.steps.load(Ordering::Relaxed))
            .field("peak_results", &self.peak_results.load(Ordering::Relaxed))
            .finish()
    }
}

impl TraversalBudget {
    pub fn new(max_steps: usize, max_results: usize) -> Self {
        Self {
            max_steps,
            max_results,
            steps: Arc::new(AtomicUsize::new(0)),
            peak_results: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Budget without limits
    pub fn unlimited() -> Self {
        Self::new(usize::MAX, usize::MAX)
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.max_steps.unwrap_or(usize::MAX),
            config.max_results.unwrap_or(usize::MAX),
        )
    }

    /// Charge one traverser-step evaluation
    pub fn charge_step(&self) -> Result<(), EngineError> {
        self.charge_steps(1)
    }

    pub fn charge_steps(&self, count: usize) -> Result<(), EngineError> {
        let total = self
            .steps
            .fetch_add(count, Ordering::Relaxed)
            .saturating_add(count);
        if total > self.max_steps {
            return Err(EngineError::TraversalBudgetExceeded {
                resource: BudgetResource::Steps,
                limit: self.max_steps,
            });
        }
        Ok(())
    }

    /// Check a materialized working set against the result limit
    pub fn check_results(&self, count: usize) -> Result<(), EngineError> {
        self.peak_results.fetch_max(count, Ordering::Relaxed);
        if count > self.max_results {
            return Err(EngineError::TraversalBudgetExceeded {
                resource: BudgetResource::Results,
                limit: self.max_results,
            });
        }
        Ok(())
    }

    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    pub fn peak_results(&self) -> usize {
        self.peak_results.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> BudgetStats {
        BudgetStats {
            steps: self.steps(),
            max_steps: self.max_steps,
            peak_results: self.peak_results(),
            max_results: self.max_results,
        }
    }
}

/// Budget usage after a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetStats {
    pub steps: usize,
    pub max_steps: usize,
    pub peak_results: usize,
    pub max_results: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_limit() {
        let budget = TraversalBudget::new(3, usize::MAX);
        assert!(budget.charge_steps(2).is_ok());
        assert!(budget.charge_step().is_ok());
        assert_eq!(
            budget.charge_step(),
            Err(EngineError::TraversalBudgetExceeded {
                resource: BudgetResource::Steps,
                limit: 3,
            })
        );
    }

    #[test]
    fn test_result_limit_and_peak() {
        let budget = TraversalBudget::new(usize::MAX, 10);
        assert!(budget.check_results(4).is_ok());
        assert!(budget.check_results(10).is_ok());
        assert!(budget.check_results(11).is_err());
        assert_eq!(budget.peak_results(), 11);
    }

    #[test]
    fn test_clones_share_counters() {
        let budget = TraversalBudget::unlimited();
        let nested = budget.clone();
        nested.charge_steps(5).unwrap();
        assert_eq!(budget.stats().steps, 5);
    }

    #[test]
    fn test_from_config() {
        let budget = TraversalBudget::from_config(&EngineConfig::unbounded().with_max_steps(7));
        assert_eq!(budget.stats().max_steps, 7);
        assert_eq!(budget.stats().max_results, usize::MAX);
    }
}
