// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Schema module - vertex and edge kind taxonomy and attribute validation
//
// A schema is declared once through `SchemaRegistryBuilder` and frozen. The
// store validates every mutation against it and the query builder uses it
// to type-check pipelines before they run.

pub mod model;
pub mod registry;
pub mod types;
pub mod validator;

pub use model::VertexModel;
pub use registry::{EdgeKind, KindView, SchemaRegistry, SchemaRegistryBuilder, VertexKind};
pub use types::{
    AttributeDefinition, DataType, EdgeKindDefinition, EdgeKindId, VertexKindDefinition,
    VertexKindId,
};
pub use validator::SchemaValidator;

use thiserror::Error;

/// Schema errors, reported as `SchemaMismatch` by the store and the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown vertex kind: {0}")]
    UnknownVertexKind(String),

    #[error("Unknown edge kind: {0}")]
    UnknownEdgeKind(String),

    #[error("Kind '{0}' is defined more than once")]
    DuplicateKind(String),

    #[error("Inheritance cycle involving kind '{0}'")]
    InheritanceCycle(String),

    #[error("Attribute '{attribute}' redefined with a different type in kind '{kind}'")]
    ConflictingAttribute { kind: String, attribute: String },

    #[error("Unknown attribute '{attribute}' for kind '{kind}'")]
    UnknownAttribute { kind: String, attribute: String },

    #[error("Invalid type for attribute '{attribute}' of kind '{kind}': expected {expected}, got {got}")]
    InvalidAttributeType {
        kind: String,
        attribute: String,
        expected: DataType,
        got: String,
    },

    #[error("Missing required attribute '{attribute}' for kind '{kind}'")]
    MissingRequiredAttribute { kind: String, attribute: String },

    #[error("Kind '{0}' is abstract and cannot be instantiated")]
    AbstractKind(String),

    #[error("Edge kind '{edge_kind}' requires its {endpoint} to be '{expected}', got '{actual}'")]
    EndpointKindMismatch {
        edge_kind: String,
        endpoint: String,
        expected: String,
        actual: String,
    },

    #[error("Schema defines more than {0} kinds")]
    TooManyKinds(usize),
}
