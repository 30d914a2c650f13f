// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal composition
//!
//! Traversals are composed with the [`Traversal`] builder, checked against
//! the schema as they grow, and frozen into a [`Pipeline`]: an immutable list
//! of [`Step`] values that the executor interprets.

pub mod builder;
pub mod element_type;
pub mod pipeline;
pub mod predicate;
pub mod step;

pub use builder::{Orderer, Projector, Traversal, TraversalSource};
pub use element_type::{Cardinality, ElementType, VertexType};
pub use pipeline::Pipeline;
pub use predicate::{Operand, Predicate, TextPattern, P};
pub use step::{Projection, Seed, SortBy, SortKey, Step, ValueFn};
