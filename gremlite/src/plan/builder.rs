// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed traversal builder
//!
//! `Traversal` is a persistent value: every combinator consumes it and
//! returns the extended traversal, and clones share their step list until
//! one of them is extended. Each combinator checks the step against the
//! tracked element type, cardinality and label environment. The first
//! failure is kept and reported by [`Traversal::build`]; later combinators
//! are ignored.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::exec::error::EngineError;
use crate::plan::element_type::{Cardinality, ElementType, VertexType};
use crate::plan::pipeline::Pipeline;
use crate::plan::predicate::Predicate;
use crate::plan::step::{Projection, Seed, SortBy, SortKey, Step, ValueFn};
use crate::schema::{AttributeDefinition, DataType, SchemaError, SchemaRegistry, VertexKindId};
use crate::storage::{Direction, Value, VertexId};

type LabelEnv = Arc<BTreeMap<String, ElementType>>;

/// Entry point for traversals over one schema
#[derive(Debug, Clone)]
pub struct TraversalSource {
    registry: Arc<SchemaRegistry>,
}

impl TraversalSource {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Start from every vertex of `kind`, sub-kinds included
    pub fn from_kind(&self, kind: &str) -> Traversal {
        Traversal::from_kind(&self.registry, kind)
    }

    pub fn from_all(&self) -> Traversal {
        Traversal::from_all(&self.registry)
    }

    pub fn from_ids(&self, ids: impl IntoIterator<Item = VertexId>) -> Traversal {
        Traversal::from_ids(&self.registry, ids)
    }
}

/// Traversal under construction
#[derive(Clone)]
pub struct Traversal {
    registry: Arc<SchemaRegistry>,
    seed: Option<Seed>,
    steps: Arc<Vec<Step>>,
    current: ElementType,
    cardinality: Cardinality,
    labels: LabelEnv,
    /// Labels visible where this traversal starts; fold and count return to them
    scope: LabelEnv,
    error: Option<EngineError>,
}

impl std::fmt::Debug for Traversal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Traversal")
            .field("seed", &self.seed)
            .field("steps", &self.steps.len())
            .field("current", &self.current)
            .field("cardinality", &self.cardinality)
            .field("error", &self.error)
            .finish()
    }
}

impl Traversal {
    fn start(registry: &Arc<SchemaRegistry>, seed: Seed, current: ElementType) -> Self {
        Self {
            registry: Arc::clone(registry),
            seed: Some(seed),
            steps: Arc::new(Vec::new()),
            current,
            cardinality: Cardinality::Many,
            labels: Arc::new(BTreeMap::new()),
            scope: Arc::new(BTreeMap::new()),
            error: None,
        }
    }

    pub fn from_kind(registry: &Arc<SchemaRegistry>, kind: &str) -> Self {
        match registry.vertex_kind(kind) {
            Ok(id) => Self::start(
                registry,
                Seed::Kind(id),
                ElementType::Vertex(VertexType::Kind(id)),
            ),
            Err(e) => Self::start(registry, Seed::All, ElementType::Vertex(VertexType::Any))
                .fail(e.into()),
        }
    }

    pub fn from_all(registry: &Arc<SchemaRegistry>) -> Self {
        Self::start(registry, Seed::All, ElementType::Vertex(VertexType::Any))
    }

    pub fn from_ids(registry: &Arc<SchemaRegistry>, ids: impl IntoIterator<Item = VertexId>) -> Self {
        Self::start(
            registry,
            Seed::Ids(ids.into_iter().collect()),
            ElementType::Vertex(VertexType::Any),
        )
    }

    /// Type of the current value after the steps so far
    pub fn current_type(&self) -> &ElementType {
        &self.current
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// First composition error, if any
    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    /// Finish the traversal
    pub fn build(self) -> Result<Pipeline, EngineError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(Pipeline {
            registry: self.registry,
            seed: self.seed,
            steps: self.steps,
            output: self.current,
            cardinality: self.cardinality,
        })
    }

    // ----- filters -----

    /// Keep vertices whose attribute satisfies `predicate`
    pub fn has(self, attribute: &str, predicate: Predicate) -> Self {
        self.apply(|t| {
            let definition = t.vertex_attribute(attribute)?;
            predicate.check(&ElementType::of_attribute(definition.data_type), &t.labels)?;
            Ok((
                Step::Has {
                    attribute: attribute.to_string(),
                    predicate,
                },
                t.current.clone(),
                t.cardinality.filtered(),
            ))
        })
    }

    /// Keep traversers whose current value satisfies `predicate`
    pub fn is(self, predicate: Predicate) -> Self {
        self.apply(|t| {
            predicate.check(&t.current, &t.labels)?;
            Ok((
                Step::Is(predicate),
                t.current.clone(),
                t.cardinality.filtered(),
            ))
        })
    }

    /// Keep traversers for which the sub-traversal yields at least one result
    pub fn where_<F>(self, sub: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        self.apply(|t| {
            let sub = t.sub(sub)?;
            Ok((Step::Where(sub), t.current.clone(), t.cardinality.filtered()))
        })
    }

    /// Keep traversers for which the sub-traversal yields nothing
    #[allow(clippy::should_implement_trait)]
    pub fn not<F>(self, sub: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        self.apply(|t| {
            let sub = t.sub(sub)?;
            Ok((Step::Not(sub), t.current.clone(), t.cardinality.filtered()))
        })
    }

    /// Narrow vertices to `kind`
    ///
    /// Narrowing to a kind the current vertices already belong to adds no
    /// step. Narrowing to a kind unrelated to the current one is rejected
    /// since it could never match.
    pub fn of_kind(self, kind: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        let requested = match self.registry.vertex_kind(kind) {
            Ok(id) => id,
            Err(e) => return self.fail(e.into()),
        };
        let current_type = self.current.clone();
        match current_type {
            ElementType::Vertex(VertexType::Kind(current))
                if self.registry.is_a(current, requested) =>
            {
                self
            }
            ElementType::Vertex(VertexType::Kind(current))
                if !self.registry.is_a(requested, current) =>
            {
                let message = format!(
                    "vertices of kind '{}' can never be of kind '{}'",
                    self.registry.vertex_label(current),
                    kind
                );
                self.fail(EngineError::type_error(message))
            }
            ElementType::Vertex(_) => {
                let cardinality = self.cardinality.filtered();
                self.push(
                    Step::OfKind(requested),
                    ElementType::Vertex(VertexType::Kind(requested)),
                    cardinality,
                )
            }
            _ => {
                let message = format!(
                    "of_kind('{}') applied to {}",
                    kind,
                    self.current.describe(&self.registry)
                );
                self.fail(EngineError::type_error(message))
            }
        }
    }

    // ----- navigation -----

    /// Follow outgoing edges of `edge_kind`
    pub fn out(self, edge_kind: &str) -> Self {
        self.expand(edge_kind, Direction::Out)
    }

    /// Follow incoming edges of `edge_kind`
    pub fn in_(self, edge_kind: &str) -> Self {
        self.expand(edge_kind, Direction::In)
    }

    /// Follow edges of `edge_kind` in both directions, outgoing first
    pub fn both(self, edge_kind: &str) -> Self {
        self.expand(edge_kind, Direction::Both)
    }

    fn expand(self, edge_kind: &str, direction: Direction) -> Self {
        self.apply(|t| {
            let current = match &t.current {
                ElementType::Vertex(vertex) => *vertex,
                other => {
                    return Err(EngineError::type_error(format!(
                        "{}('{}') applied to {}",
                        direction,
                        edge_kind,
                        other.describe(&t.registry)
                    )))
                }
            };
            let edge = t.registry.edge_kind(edge_kind)?;
            let (source, target) = t.registry.edge_endpoints(edge);

            let reachable = match direction {
                Direction::Out => {
                    t.check_endpoint(current, source, edge_kind, "outgoing")?;
                    target
                }
                Direction::In => {
                    t.check_endpoint(current, target, edge_kind, "incoming")?;
                    source
                }
                Direction::Both => {
                    if t.check_endpoint(current, source, edge_kind, "outgoing").is_err() {
                        t.check_endpoint(current, target, edge_kind, "incoming")?;
                    }
                    match (source, target) {
                        (Some(a), Some(b)) => t.registry.common_kind(a, b),
                        _ => None,
                    }
                }
            };

            let output = match reachable {
                Some(kind) => VertexType::Kind(kind),
                None => VertexType::Any,
            };
            Ok((
                Step::Expand {
                    edge_kind: edge,
                    direction,
                },
                ElementType::Vertex(output),
                Cardinality::Many,
            ))
        })
    }

    // ----- labels -----

    /// Bind the current value to `label` for later reference
    pub fn as_(self, label: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        if label.is_empty() {
            return self.fail(EngineError::type_error("labels must not be empty"));
        }
        let mut next = self.apply(|t| {
            Ok((
                Step::As(label.to_string()),
                t.current.clone(),
                t.cardinality,
            ))
        });
        let bound = next.current.clone();
        Arc::make_mut(&mut next.labels).insert(label.to_string(), bound);
        next
    }

    // ----- shaping -----

    /// Project each traverser into a record or tuple, one branch per field
    pub fn project<F>(self, build: F) -> Self
    where
        F: FnOnce(Projector) -> Projector,
    {
        if self.error.is_some() {
            return self;
        }
        let projector = build(Projector::new(self.anonymous()));
        self.apply(|t| {
            let projection = projector.finish()?;
            let output = match &projection {
                Projection::Named(branches) => ElementType::Record(
                    branches
                        .iter()
                        .map(|(name, sub)| (name.clone(), sub.output.clone()))
                        .collect(),
                ),
                Projection::Positional(branches) => {
                    ElementType::Tuple(branches.iter().map(|sub| sub.output.clone()).collect())
                }
            };
            Ok((Step::Project(projection), output, t.cardinality))
        })
    }

    /// Run a sub-traversal per traverser without flattening across traversers
    ///
    /// A body that yields at most one result (it ends in `fold` or `count`,
    /// possibly followed by filters) replaces the current value with that
    /// result, and a body that yields nothing drops the traverser. Any other
    /// body has its results collected into a list, which may be empty.
    pub fn local<F>(self, body: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        self.apply(|t| {
            let body = t.sub(body)?;
            let collect = !body.is_single();
            let (output, cardinality) = if collect {
                (ElementType::List(Box::new(body.output.clone())), t.cardinality)
            } else if body.cardinality == Cardinality::AtMostOne {
                (body.output.clone(), t.cardinality.filtered())
            } else {
                (body.output.clone(), t.cardinality)
            };
            Ok((Step::Local { body, collect }, output, cardinality))
        })
    }

    /// Collect every traverser into one list
    pub fn fold(self) -> Self {
        let mut next = self.apply(|t| {
            Ok((
                Step::Fold,
                ElementType::List(Box::new(t.current.clone())),
                Cardinality::One,
            ))
        });
        next.labels = Arc::clone(&next.scope);
        next
    }

    /// Count the traversers
    pub fn count(self) -> Self {
        let mut next = self.apply(|_| {
            Ok((
                Step::Count,
                ElementType::Scalar(DataType::Integer),
                Cardinality::One,
            ))
        });
        next.labels = Arc::clone(&next.scope);
        next
    }

    /// Replace each vertex with the value of `attribute`; vertices without it are dropped
    pub fn values(self, attribute: &str) -> Self {
        self.apply(|t| {
            let definition = t.vertex_attribute(attribute)?;
            let cardinality = if definition.required {
                t.cardinality
            } else {
                t.cardinality.filtered()
            };
            Ok((
                Step::Values(attribute.to_string()),
                ElementType::of_attribute(definition.data_type),
                cardinality,
            ))
        })
    }

    /// Replace each current value with the first result of the sub-traversal
    pub fn map<F>(self, sub: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        self.apply(|t| {
            let sub = t.sub(sub)?;
            let cardinality = if sub.cardinality == Cardinality::One {
                t.cardinality
            } else {
                t.cardinality.filtered()
            };
            let output = sub.output.clone();
            Ok((Step::Map(sub), output, cardinality))
        })
    }

    /// Apply a scalar function to each current value
    ///
    /// The builder types the result as `output`. A function returning a
    /// value of another type (other than `Null`) aborts the run with a
    /// `PipelineTypeError`; integers returned for `Float` are widened.
    pub fn map_value<F>(self, name: &str, output: DataType, func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.apply(|t| {
            Ok((
                Step::MapValue(ValueFn::new(name, output, func)),
                ElementType::of_attribute(output),
                t.cardinality,
            ))
        })
    }

    /// Sort the traversers by one or more keys; ties keep their input order
    pub fn order<F>(self, build: F) -> Self
    where
        F: FnOnce(Orderer) -> Orderer,
    {
        if self.error.is_some() {
            return self;
        }
        let orderer = build(Orderer::new(self.anonymous()));
        self.apply(|t| {
            let keys = orderer.finish()?;
            Ok((Step::Order(keys), t.current.clone(), t.cardinality))
        })
    }

    /// Sort ascending by a vertex attribute
    pub fn order_by(self, attribute: &str) -> Self {
        self.order(|o| o.by(attribute))
    }

    /// Sort descending by a vertex attribute
    pub fn order_by_desc(self, attribute: &str) -> Self {
        self.order(|o| o.by_desc(attribute))
    }

    pub fn limit(self, count: usize) -> Self {
        self.apply(|t| {
            let cardinality = if count == 0 {
                t.cardinality.filtered()
            } else {
                t.cardinality
            };
            Ok((Step::Limit(count), t.current.clone(), cardinality))
        })
    }

    /// Drop traversers whose current value was already seen
    pub fn dedup(self) -> Self {
        self.apply(|t| Ok((Step::Dedup, t.current.clone(), t.cardinality)))
    }

    /// Emit one traverser per item of the current list
    pub fn unfold(self) -> Self {
        self.apply(|t| {
            let item = t.current.item_type().ok_or_else(|| {
                EngineError::type_error(format!(
                    "unfold() applied to {}",
                    t.current.describe(&t.registry)
                ))
            })?;
            Ok((Step::Unfold, item, Cardinality::Many))
        })
    }

    // ----- internals -----

    fn apply<F>(self, check: F) -> Self
    where
        F: FnOnce(&Traversal) -> Result<(Step, ElementType, Cardinality), EngineError>,
    {
        if self.error.is_some() {
            return self;
        }
        match check(&self) {
            Ok((step, output, cardinality)) => self.push(step, output, cardinality),
            Err(error) => self.fail(error),
        }
    }

    fn push(mut self, step: Step, output: ElementType, cardinality: Cardinality) -> Self {
        Arc::make_mut(&mut self.steps).push(step);
        self.current = output;
        self.cardinality = cardinality;
        self
    }

    fn fail(mut self, error: EngineError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    /// Seedless traversal starting from a single traverser of the current type
    fn anonymous(&self) -> Traversal {
        Traversal {
            registry: Arc::clone(&self.registry),
            seed: None,
            steps: Arc::new(Vec::new()),
            current: self.current.clone(),
            cardinality: Cardinality::One,
            labels: Arc::clone(&self.labels),
            scope: Arc::clone(&self.labels),
            error: None,
        }
    }

    fn sub<F>(&self, build: F) -> Result<Pipeline, EngineError>
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        let sub = build(self.anonymous());
        if sub.seed.is_some() || !Arc::ptr_eq(&sub.registry, &self.registry) {
            return Err(EngineError::type_error(
                "sub-traversals must continue from the traversal they are given",
            ));
        }
        sub.build()
    }

    fn vertex_attribute(&self, name: &str) -> Result<AttributeDefinition, EngineError> {
        match &self.current {
            ElementType::Vertex(VertexType::Kind(kind)) => {
                Ok(self.registry.attribute(*kind, name)?.clone())
            }
            ElementType::Vertex(VertexType::Any) => Err(SchemaError::UnknownAttribute {
                kind: "Vertex".to_string(),
                attribute: name.to_string(),
            }
            .into()),
            other => Err(EngineError::type_error(format!(
                "attribute '{}' requested on {}",
                name,
                other.describe(&self.registry)
            ))),
        }
    }

    fn check_endpoint(
        &self,
        current: VertexType,
        expected: Option<VertexKindId>,
        edge_kind: &str,
        side: &str,
    ) -> Result<(), EngineError> {
        if let (VertexType::Kind(current), Some(expected)) = (current, expected) {
            if !self.registry.is_a(current, expected) && !self.registry.is_a(expected, current) {
                return Err(EngineError::type_error(format!(
                    "vertices of kind '{}' have no {} '{}' edges",
                    self.registry.vertex_label(current),
                    side,
                    edge_kind
                )));
            }
        }
        Ok(())
    }
}

/// Collects the branches of [`Traversal::project`]
pub struct Projector {
    template: Traversal,
    named: Vec<(String, Pipeline)>,
    positional: Vec<Pipeline>,
    error: Option<EngineError>,
}

impl Projector {
    fn new(template: Traversal) -> Self {
        Self {
            template,
            named: Vec::new(),
            positional: Vec::new(),
            error: None,
        }
    }

    /// Add a named field computed by the branch
    pub fn by<F>(mut self, name: &str, branch: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        if self.error.is_some() {
            return self;
        }
        if !self.positional.is_empty() {
            self.error = Some(EngineError::type_error(
                "cannot mix named and positional projection branches",
            ));
            return self;
        }
        if self.named.iter().any(|(existing, _)| existing == name) {
            self.error = Some(EngineError::type_error(format!(
                "projection field '{}' defined twice",
                name
            )));
            return self;
        }
        match self.template.sub(branch) {
            Ok(sub) => self.named.push((name.to_string(), sub)),
            Err(error) => self.error = Some(error),
        }
        self
    }

    /// Add the next positional item computed by the branch
    pub fn by_position<F>(mut self, branch: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        if self.error.is_some() {
            return self;
        }
        if !self.named.is_empty() {
            self.error = Some(EngineError::type_error(
                "cannot mix named and positional projection branches",
            ));
            return self;
        }
        match self.template.sub(branch) {
            Ok(sub) => self.positional.push(sub),
            Err(error) => self.error = Some(error),
        }
        self
    }

    fn finish(self) -> Result<Projection, EngineError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.named.is_empty() {
            Ok(Projection::Named(self.named))
        } else if !self.positional.is_empty() {
            Ok(Projection::Positional(self.positional))
        } else {
            Err(EngineError::type_error("project() needs at least one branch"))
        }
    }
}

/// Collects the sort keys of [`Traversal::order`]
pub struct Orderer {
    template: Traversal,
    keys: Vec<SortKey>,
    error: Option<EngineError>,
}

impl Orderer {
    fn new(template: Traversal) -> Self {
        Self {
            template,
            keys: Vec::new(),
            error: None,
        }
    }

    pub fn by(self, attribute: &str) -> Self {
        self.attribute_key(attribute, false)
    }

    pub fn by_desc(self, attribute: &str) -> Self {
        self.attribute_key(attribute, true)
    }

    /// Sort by the current value itself
    pub fn by_value(self) -> Self {
        self.key(SortBy::Current, false)
    }

    pub fn by_value_desc(self) -> Self {
        self.key(SortBy::Current, true)
    }

    /// Sort by the first result of a sub-traversal
    pub fn by_traversal<F>(self, sub: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        self.traversal_key(sub, false)
    }

    pub fn by_traversal_desc<F>(self, sub: F) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        self.traversal_key(sub, true)
    }

    fn attribute_key(mut self, attribute: &str, descending: bool) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.template.vertex_attribute(attribute) {
            Ok(_) => self.key(SortBy::Attribute(attribute.to_string()), descending),
            Err(error) => {
                self.error = Some(error);
                self
            }
        }
    }

    fn traversal_key<F>(mut self, sub: F, descending: bool) -> Self
    where
        F: FnOnce(Traversal) -> Traversal,
    {
        if self.error.is_some() {
            return self;
        }
        match self.template.sub(sub) {
            Ok(pipeline) => self.key(SortBy::Traversal(pipeline), descending),
            Err(error) => {
                self.error = Some(error);
                self
            }
        }
    }

    fn key(mut self, key: SortBy, descending: bool) -> Self {
        self.keys.push(SortKey { key, descending });
        self
    }

    fn finish(self) -> Result<Vec<SortKey>, EngineError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.keys.is_empty() {
            return Ok(vec![SortKey {
                key: SortBy::Current,
                descending: false,
            }]);
        }
        Ok(self.keys)
    }
}
