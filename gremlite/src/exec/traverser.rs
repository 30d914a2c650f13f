// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traverser: a cursor in the working set of a traversal

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::storage::{Value, VertexId};

/// Current value plus the values bound to labels along the path so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traverser {
    current: Value,
    labels: BTreeMap<String, Value>,
}

impl Traverser {
    pub fn new(current: Value) -> Self {
        Self {
            current,
            labels: BTreeMap::new(),
        }
    }

    pub fn with_labels(current: Value, labels: BTreeMap<String, Value>) -> Self {
        Self { current, labels }
    }

    pub fn current(&self) -> &Value {
        &self.current
    }

    pub fn into_current(self) -> Value {
        self.current
    }

    pub fn labels(&self) -> &BTreeMap<String, Value> {
        &self.labels
    }

    pub fn label(&self, name: &str) -> Option<&Value> {
        self.labels.get(name)
    }

    /// Vertex the traverser currently sits on, if any
    pub fn vertex_id(&self) -> Option<VertexId> {
        self.current.as_vertex()
    }

    /// Bind the current value under `name`
    pub fn bind(mut self, name: &str) -> Self {
        self.labels.insert(name.to_string(), self.current.clone());
        self
    }

    /// New traverser at `current` carrying this traverser's labels
    pub fn split(&self, current: Value) -> Self {
        Self {
            current,
            labels: self.labels.clone(),
        }
    }

    /// Move this traverser to a new current value
    pub fn with_current(mut self, current: Value) -> Self {
        self.current = current;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_splits() {
        let start = Traverser::new(Value::Vertex(VertexId::new(1))).bind("person");
        let next = start.split(Value::Vertex(VertexId::new(2)));
        assert_eq!(next.vertex_id(), Some(VertexId::new(2)));
        assert_eq!(next.label("person"), Some(&Value::Vertex(VertexId::new(1))));
        assert_eq!(next.with_current(Value::from("x")).current(), &Value::from("x"));
    }

    #[test]
    fn test_serializes_to_json() {
        let traverser = Traverser::new(Value::from(3)).bind("n");
        let json = serde_json::to_string(&traverser).unwrap();
        let back: Traverser = serde_json::from_str(&json).unwrap();
        assert_eq!(back, traverser);
    }
}
