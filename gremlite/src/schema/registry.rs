// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Frozen registry of vertex and edge kinds
//!
//! The registry resolves the kind taxonomy once at build time: every vertex
//! kind knows its ancestors, its concrete descendants, and its full
//! (inherited) attribute list. Lookups after that are plain slice indexing.

use std::collections::HashMap;

use log::debug;

use super::types::{
    AttributeDefinition, EdgeKindDefinition, EdgeKindId, VertexKindDefinition, VertexKindId,
};
use super::SchemaError;
use crate::storage::{Value, Vertex};

/// Resolved vertex kind
#[derive(Debug, Clone)]
pub struct VertexKind {
    pub id: VertexKindId,
    pub label: String,
    pub parent: Option<VertexKindId>,
    pub is_abstract: bool,
    /// Own and inherited attributes, root kind first
    pub attributes: Vec<AttributeDefinition>,
    pub description: Option<String>,
    /// Self first, then parent, up to the root
    ancestors: Vec<VertexKindId>,
    /// Concrete kinds that are this kind or extend it, ordered by id
    concrete_descendants: Vec<VertexKindId>,
}

impl VertexKind {
    pub fn ancestors(&self) -> &[VertexKindId] {
        &self.ancestors
    }

    pub fn concrete_descendants(&self) -> &[VertexKindId] {
        &self.concrete_descendants
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Resolved edge kind
#[derive(Debug, Clone)]
pub struct EdgeKind {
    pub id: EdgeKindId,
    pub label: String,
    pub source: Option<VertexKindId>,
    pub target: Option<VertexKindId>,
    pub description: Option<String>,
}

/// Builder collecting kind definitions before the registry is frozen
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    vertex_kinds: Vec<VertexKindDefinition>,
    edge_kinds: Vec<EdgeKindDefinition>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_kind(mut self, definition: VertexKindDefinition) -> Self {
        self.vertex_kinds.push(definition);
        self
    }

    pub fn edge_kind(mut self, definition: EdgeKindDefinition) -> Self {
        self.edge_kinds.push(definition);
        self
    }

    /// Resolve the taxonomy and freeze the registry
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        if self.vertex_kinds.len() > u16::MAX as usize {
            return Err(SchemaError::TooManyKinds(u16::MAX as usize));
        }
        if self.edge_kinds.len() > u16::MAX as usize {
            return Err(SchemaError::TooManyKinds(u16::MAX as usize));
        }

        let mut vertex_labels = HashMap::with_capacity(self.vertex_kinds.len());
        for (index, def) in self.vertex_kinds.iter().enumerate() {
            if vertex_labels
                .insert(def.label.clone(), VertexKindId(index as u16))
                .is_some()
            {
                return Err(SchemaError::DuplicateKind(def.label.clone()));
            }
        }

        let mut parents = Vec::with_capacity(self.vertex_kinds.len());
        for def in &self.vertex_kinds {
            let parent = match &def.extends {
                Some(label) => Some(
                    *vertex_labels
                        .get(label)
                        .ok_or_else(|| SchemaError::UnknownVertexKind(label.clone()))?,
                ),
                None => None,
            };
            parents.push(parent);
        }

        // Walk each parent chain; a chain longer than the number of kinds loops.
        let mut ancestors_of = Vec::with_capacity(self.vertex_kinds.len());
        for (index, def) in self.vertex_kinds.iter().enumerate() {
            let mut chain = vec![VertexKindId(index as u16)];
            let mut cursor = parents[index];
            while let Some(parent) = cursor {
                if chain.contains(&parent) {
                    return Err(SchemaError::InheritanceCycle(def.label.clone()));
                }
                chain.push(parent);
                cursor = parents[parent.0 as usize];
            }
            ancestors_of.push(chain);
        }

        let mut kinds = Vec::with_capacity(self.vertex_kinds.len());
        for (index, def) in self.vertex_kinds.iter().enumerate() {
            let mut attributes: Vec<AttributeDefinition> = Vec::new();
            for ancestor in ancestors_of[index].iter().rev() {
                for attr in &self.vertex_kinds[ancestor.0 as usize].attributes {
                    match attributes.iter().find(|a| a.name == attr.name) {
                        Some(existing) if existing == attr => {}
                        Some(_) => {
                            return Err(SchemaError::ConflictingAttribute {
                                kind: def.label.clone(),
                                attribute: attr.name.clone(),
                            })
                        }
                        None => attributes.push(attr.clone()),
                    }
                }
            }

            kinds.push(VertexKind {
                id: VertexKindId(index as u16),
                label: def.label.clone(),
                parent: parents[index],
                is_abstract: def.is_abstract,
                attributes,
                description: def.description.clone(),
                ancestors: ancestors_of[index].clone(),
                concrete_descendants: Vec::new(),
            });
        }

        for index in 0..kinds.len() {
            if kinds[index].is_abstract {
                continue;
            }
            let id = kinds[index].id;
            for ancestor in ancestors_of[index].iter() {
                kinds[ancestor.0 as usize].concrete_descendants.push(id);
            }
        }
        for kind in kinds.iter_mut() {
            kind.concrete_descendants.sort();
        }

        let mut edge_labels = HashMap::with_capacity(self.edge_kinds.len());
        let mut edges = Vec::with_capacity(self.edge_kinds.len());
        for (index, def) in self.edge_kinds.into_iter().enumerate() {
            let id = EdgeKindId(index as u16);
            if edge_labels.insert(def.label.clone(), id).is_some() {
                return Err(SchemaError::DuplicateKind(def.label));
            }
            let resolve = |label: &Option<String>| -> Result<Option<VertexKindId>, SchemaError> {
                match label {
                    Some(label) => vertex_labels
                        .get(label)
                        .copied()
                        .map(Some)
                        .ok_or_else(|| SchemaError::UnknownVertexKind(label.clone())),
                    None => Ok(None),
                }
            };
            let source = resolve(&def.source)?;
            let target = resolve(&def.target)?;
            edges.push(EdgeKind {
                id,
                label: def.label,
                source,
                target,
                description: def.description,
            });
        }

        debug!(
            "Schema registry built with {} vertex kinds and {} edge kinds",
            kinds.len(),
            edges.len()
        );

        Ok(SchemaRegistry {
            vertex_kinds: kinds,
            edge_kinds: edges,
            vertex_labels,
            edge_labels,
        })
    }
}

/// Closed, immutable set of vertex and edge kinds
#[derive(Debug)]
pub struct SchemaRegistry {
    vertex_kinds: Vec<VertexKind>,
    edge_kinds: Vec<EdgeKind>,
    vertex_labels: HashMap<String, VertexKindId>,
    edge_labels: HashMap<String, EdgeKindId>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Look up a vertex kind by label
    pub fn vertex_kind(&self, label: &str) -> Result<VertexKindId, SchemaError> {
        self.vertex_labels
            .get(label)
            .copied()
            .ok_or_else(|| SchemaError::UnknownVertexKind(label.to_string()))
    }

    /// Look up an edge kind by label
    pub fn edge_kind(&self, label: &str) -> Result<EdgeKindId, SchemaError> {
        self.edge_labels
            .get(label)
            .copied()
            .ok_or_else(|| SchemaError::UnknownEdgeKind(label.to_string()))
    }

    pub fn vertex_kind_info(&self, id: VertexKindId) -> Option<&VertexKind> {
        self.vertex_kinds.get(id.0 as usize)
    }

    pub fn edge_kind_info(&self, id: EdgeKindId) -> Option<&EdgeKind> {
        self.edge_kinds.get(id.0 as usize)
    }

    pub fn vertex_label(&self, id: VertexKindId) -> &str {
        self.vertex_kind_info(id)
            .map(|k| k.label.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn edge_label(&self, id: EdgeKindId) -> &str {
        self.edge_kind_info(id)
            .map(|k| k.label.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn vertex_kinds(&self) -> impl Iterator<Item = &VertexKind> {
        self.vertex_kinds.iter()
    }

    pub fn edge_kinds(&self) -> impl Iterator<Item = &EdgeKind> {
        self.edge_kinds.iter()
    }

    /// Whether `kind` is `requested` or one of its sub-kinds
    pub fn is_a(&self, kind: VertexKindId, requested: VertexKindId) -> bool {
        self.vertex_kind_info(kind)
            .map(|k| k.ancestors.contains(&requested))
            .unwrap_or(false)
    }

    pub fn is_abstract(&self, kind: VertexKindId) -> bool {
        self.vertex_kind_info(kind)
            .map(|k| k.is_abstract)
            .unwrap_or(false)
    }

    /// Concrete kinds whose vertices belong to `kind`
    pub fn concrete_kinds_of(&self, kind: VertexKindId) -> &[VertexKindId] {
        self.vertex_kind_info(kind)
            .map(|k| k.concrete_descendants.as_slice())
            .unwrap_or(&[])
    }

    /// Closest kind both `a` and `b` belong to, if any
    pub fn common_kind(&self, a: VertexKindId, b: VertexKindId) -> Option<VertexKindId> {
        let kind = self.vertex_kind_info(a)?;
        kind.ancestors.iter().copied().find(|ancestor| self.is_a(b, *ancestor))
    }

    /// Attribute definition visible on a kind (own or inherited)
    pub fn attribute(
        &self,
        kind: VertexKindId,
        name: &str,
    ) -> Result<&AttributeDefinition, SchemaError> {
        let info = self
            .vertex_kind_info(kind)
            .ok_or_else(|| SchemaError::UnknownVertexKind(kind.to_string()))?;
        info.attribute(name).ok_or_else(|| SchemaError::UnknownAttribute {
            kind: info.label.clone(),
            attribute: name.to_string(),
        })
    }

    /// Declared (source, target) vertex kinds of an edge kind
    pub fn edge_endpoints(&self, kind: EdgeKindId) -> (Option<VertexKindId>, Option<VertexKindId>) {
        self.edge_kind_info(kind)
            .map(|k| (k.source, k.target))
            .unwrap_or((None, None))
    }

    /// View a vertex as `kind`, if its concrete kind belongs to it
    pub fn narrow<'a>(&'a self, vertex: &'a Vertex, kind: VertexKindId) -> Option<KindView<'a>> {
        if !self.is_a(vertex.kind, kind) {
            return None;
        }
        Some(KindView {
            vertex,
            kind: self.vertex_kind_info(kind)?,
        })
    }
}

/// A vertex seen through one of the kinds it belongs to
///
/// Attribute access is checked against that kind's schema.
#[derive(Debug, Clone, Copy)]
pub struct KindView<'a> {
    vertex: &'a Vertex,
    kind: &'a VertexKind,
}

impl<'a> KindView<'a> {
    pub fn vertex(&self) -> &'a Vertex {
        self.vertex
    }

    pub fn kind(&self) -> &'a VertexKind {
        self.kind
    }

    /// Read an attribute declared on the viewed kind
    ///
    /// `Ok(None)` means the attribute is declared but not set on this vertex.
    pub fn get(&self, name: &str) -> Result<Option<&'a Value>, SchemaError> {
        if self.kind.attribute(name).is_none() {
            return Err(SchemaError::UnknownAttribute {
                kind: self.kind.label.clone(),
                attribute: name.to_string(),
            });
        }
        Ok(self.vertex.get_attribute(name))
    }
}
