// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Barrier step implementations
//!
//! These steps see the whole working set at once. Streaming steps live in
//! the executor where they are fused into the iterator chain.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::exec::traverser::Traverser;
use crate::plan::SortKey;
use crate::storage::Value;

/// Collapse the working set into one list; labels return to the scope labels
pub(crate) fn fold(items: Vec<Traverser>, scope: &BTreeMap<String, Value>) -> Traverser {
    let values = items.into_iter().map(Traverser::into_current).collect();
    Traverser::with_labels(Value::List(values), scope.clone())
}

pub(crate) fn count(items: &[Traverser], scope: &BTreeMap<String, Value>) -> Traverser {
    Traverser::with_labels(Value::Integer(items.len() as i64), scope.clone())
}

/// Keep the first traverser for every distinct current value
pub(crate) fn dedup(items: Vec<Traverser>) -> Vec<Traverser> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|t| seen.insert(t.current().clone()))
        .collect()
}

/// Stable sort of traversers by precomputed key values
pub(crate) fn sort(mut keyed: Vec<(Vec<Value>, Traverser)>, keys: &[SortKey]) -> Vec<Traverser> {
    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, keys));
    keyed.into_iter().map(|(_, t)| t).collect()
}

fn compare_keys(a: &[Value], b: &[Value], keys: &[SortKey]) -> Ordering {
    for ((x, y), key) in a.iter().zip(b).zip(keys) {
        let ord = x.total_cmp(y);
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
