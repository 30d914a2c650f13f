// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Engine configuration

use serde::{Deserialize, Serialize};

/// Limits and diagnostics applied to every traversal run by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of traverser-step evaluations, sub-pipelines included
    pub max_steps: Option<usize>,

    /// Maximum working-set size at barriers and in the final result
    pub max_results: Option<usize>,

    /// Log a warning when a traversal runs longer than this
    pub log_slow_traversal_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl EngineConfig {
    /// No limits, no slow-traversal logging
    pub fn unbounded() -> Self {
        Self {
            max_steps: None,
            max_results: None,
            log_slow_traversal_ms: None,
        }
    }

    /// Limits suited to interactive use on an embedded graph
    pub fn bounded() -> Self {
        Self {
            max_steps: Some(1_000_000),
            max_results: Some(100_000),
            log_slow_traversal_ms: Some(100),
        }
    }

    pub fn with_max_steps(mut self, limit: usize) -> Self {
        self.max_steps = Some(limit);
        self
    }

    pub fn with_max_results(mut self, limit: usize) -> Self {
        self.max_results = Some(limit);
        self
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let config = EngineConfig::default();
        assert_eq!(config, EngineConfig::unbounded());
        assert!(config.max_steps.is_none());

        let bounded = EngineConfig::bounded();
        assert!(bounded.max_steps.is_some());
        assert!(bounded.max_results.is_some());
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{ "max_results": 10 }"#).unwrap();
        assert_eq!(config.max_results, Some(10));
        assert_eq!(config.max_steps, None);

        let text = EngineConfig::bounded().to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&text).unwrap(), EngineConfig::bounded());
    }

    #[test]
    fn test_invalid_json() {
        assert!(EngineConfig::from_json(r#"{ "max_steps": "many" }"#).is_err());
    }
}
