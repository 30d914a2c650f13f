// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Schema validator implementation

use log::trace;

use super::registry::SchemaRegistry;
use super::types::{EdgeKindId, VertexKindId};
use super::SchemaError;
use crate::storage::{Attributes, Vertex};

/// Validates vertex attributes and edge endpoints against a registry
pub struct SchemaValidator<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> SchemaValidator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validate an attribute mapping for a new or updated vertex
    ///
    /// Returns the mapping in stored form: `Null` entries are removed and
    /// integers given for `Float` attributes are widened.
    pub fn validate_attributes(
        &self,
        kind: VertexKindId,
        attributes: Attributes,
    ) -> Result<Attributes, SchemaError> {
        let info = self
            .registry
            .vertex_kind_info(kind)
            .ok_or_else(|| SchemaError::UnknownVertexKind(kind.to_string()))?;

        if info.is_abstract {
            return Err(SchemaError::AbstractKind(info.label.clone()));
        }

        let mut validated = Attributes::with_capacity(attributes.len());
        for (name, value) in attributes {
            let definition =
                info.attribute(&name)
                    .ok_or_else(|| SchemaError::UnknownAttribute {
                        kind: info.label.clone(),
                        attribute: name.clone(),
                    })?;

            if value.is_null() {
                continue;
            }

            if !definition.data_type.accepts(&value) {
                return Err(SchemaError::InvalidAttributeType {
                    kind: info.label.clone(),
                    attribute: name,
                    expected: definition.data_type,
                    got: value.type_name().to_string(),
                });
            }

            validated.insert(name, definition.data_type.coerce(value));
        }

        for definition in info.attributes.iter().filter(|a| a.required) {
            if !validated.contains_key(&definition.name) {
                return Err(SchemaError::MissingRequiredAttribute {
                    kind: info.label.clone(),
                    attribute: definition.name.clone(),
                });
            }
        }

        trace!(
            "Validated {} attributes for kind '{}'",
            validated.len(),
            info.label
        );
        Ok(validated)
    }

    /// Validate the endpoint kinds of a new edge
    pub fn validate_edge(
        &self,
        kind: EdgeKindId,
        source: &Vertex,
        target: &Vertex,
    ) -> Result<(), SchemaError> {
        let info = self
            .registry
            .edge_kind_info(kind)
            .ok_or_else(|| SchemaError::UnknownEdgeKind(kind.to_string()))?;

        let checks = [("source", info.source, source), ("target", info.target, target)];
        for (endpoint, expected, vertex) in checks {
            if let Some(expected) = expected {
                if !self.registry.is_a(vertex.kind, expected) {
                    return Err(SchemaError::EndpointKindMismatch {
                        edge_kind: info.label.clone(),
                        endpoint: endpoint.to_string(),
                        expected: self.registry.vertex_label(expected).to_string(),
                        actual: self.registry.vertex_label(vertex.kind).to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
