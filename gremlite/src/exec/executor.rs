// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pipeline executor
//!
//! Runs a pipeline over one graph snapshot. Consecutive streaming steps are
//! fused into a single lazy iterator chain, so a `where_` sub-traversal
//! stops at its first result and `limit` stops pulling from upstream.
//! Barrier steps (fold, count, order, dedup) drain the chain built so far
//! and restart it from the materialized working set.
//!
//! Every seeded traverser and every traverser entering a step charges one
//! step against the budget; sub-traversals charge the same budget.

use std::collections::BTreeMap;
use std::iter;

use log::trace;

use crate::exec::budget::TraversalBudget;
use crate::exec::error::EngineError;
use crate::exec::steps;
use crate::exec::traverser::Traverser;
use crate::plan::{Pipeline, Projection, Seed, SortBy, Step};
use crate::schema::SchemaRegistry;
use crate::storage::{GraphCache, Record, Value, Vertex, VertexId};

/// Lazy stream of traversers flowing between steps
pub type TraverserStream<'a> = Box<dyn Iterator<Item = Result<Traverser, EngineError>> + 'a>;

fn emit(traverser: Traverser) -> Result<Traverser, EngineError> {
    Ok(traverser)
}

pub struct Executor<'g> {
    graph: &'g GraphCache,
    registry: &'g SchemaRegistry,
    budget: TraversalBudget,
}

impl<'g> Executor<'g> {
    pub fn new(graph: &'g GraphCache, registry: &'g SchemaRegistry, budget: TraversalBudget) -> Self {
        Self {
            graph,
            registry,
            budget,
        }
    }

    pub fn budget(&self) -> &TraversalBudget {
        &self.budget
    }

    /// Run a pipeline from its seed to the final working set
    pub fn execute(&self, pipeline: &Pipeline) -> Result<Vec<Traverser>, EngineError> {
        let seed = pipeline.seed().ok_or_else(|| {
            EngineError::type_error("sub-traversals cannot be executed on their own")
        })?;
        let scope = BTreeMap::new();
        let stream = self.run(pipeline.steps(), self.seed(seed), &scope)?;

        let mut results = Vec::new();
        for item in stream {
            results.push(item?);
            self.budget.check_results(results.len())?;
        }
        Ok(results)
    }

    /// Seed traversers; each emitted vertex charges one step
    fn seed<'a>(&'a self, seed: &'a Seed) -> TraverserStream<'a> {
        let start = move |id: VertexId| -> Result<Traverser, EngineError> {
            self.budget.charge_step()?;
            Ok(Traverser::new(Value::Vertex(id)))
        };
        let graph = self.graph;
        match seed {
            Seed::All => Box::new(graph.all_vertices().map(move |v| start(v.id))),
            Seed::Kind(kind) => Box::new(
                self.registry
                    .concrete_kinds_of(*kind)
                    .iter()
                    .flat_map(move |concrete| graph.vertices_of_kind(*concrete))
                    .map(move |v| start(v.id)),
            ),
            Seed::Ids(ids) => Box::new(
                ids.iter()
                    .filter(move |id| graph.contains_vertex(**id))
                    .map(move |id| start(*id)),
            ),
        }
    }

    /// Apply `steps` to `input`; `scope` holds the labels fold and count return to
    pub(crate) fn run<'a>(
        &'a self,
        steps: &'a [Step],
        input: TraverserStream<'a>,
        scope: &'a BTreeMap<String, Value>,
    ) -> Result<TraverserStream<'a>, EngineError> {
        let mut stream = input;
        for step in steps {
            stream = self.stage(step, stream, scope)?;
        }
        Ok(stream)
    }

    fn stage<'a>(
        &'a self,
        step: &'a Step,
        input: TraverserStream<'a>,
        scope: &'a BTreeMap<String, Value>,
    ) -> Result<TraverserStream<'a>, EngineError> {
        let stream: TraverserStream<'a> = match step {
            Step::Has {
                attribute,
                predicate,
            } => self.filter(input, move |t| {
                Ok(self
                    .attribute(t, attribute)
                    .map(|value| predicate.test(value, t))
                    .unwrap_or(false))
            }),
            Step::Is(predicate) => self.filter(input, move |t| Ok(predicate.test(t.current(), t))),
            Step::Where(sub) => self.filter(input, move |t| Ok(self.first_result(sub, t)?.is_some())),
            Step::Not(sub) => self.filter(input, move |t| Ok(self.first_result(sub, t)?.is_none())),
            Step::OfKind(kind) => self.filter(input, move |t| {
                Ok(self
                    .vertex(t)
                    .map(|v| self.registry.is_a(v.kind, *kind))
                    .unwrap_or(false))
            }),
            Step::Expand {
                edge_kind,
                direction,
            } => {
                let graph = self.graph;
                self.flat_each(input, move |t| -> TraverserStream<'a> {
                    match t.vertex_id() {
                        Some(id) => Box::new(
                            graph
                                .neighbors(id, *edge_kind, *direction)
                                .map(move |next| emit(t.split(Value::Vertex(next)))),
                        ),
                        None => Box::new(iter::empty()),
                    }
                })
            }
            Step::As(label) => self.map_each(input, move |t| Ok(Some(t.bind(label)))),
            Step::Project(projection) => self.map_each(input, move |t| {
                let value = match projection {
                    Projection::Named(branches) => {
                        let mut record = Record::with_capacity(branches.len());
                        for (name, sub) in branches {
                            record.insert(name.clone(), self.first_value(sub, &t)?);
                        }
                        Value::Record(record)
                    }
                    Projection::Positional(branches) => Value::List(
                        branches
                            .iter()
                            .map(|sub| self.first_value(sub, &t))
                            .collect::<Result<_, _>>()?,
                    ),
                };
                Ok(Some(t.with_current(value)))
            }),
            Step::Local { body, collect } => self.map_each(input, move |t| {
                if *collect {
                    let values = self.all_values(body, &t)?;
                    Ok(Some(t.with_current(Value::List(values))))
                } else {
                    Ok(self
                        .first_result(body, &t)?
                        .map(|result| t.with_current(result.into_current())))
                }
            }),
            Step::Values(attribute) => self.map_each(input, move |t| {
                let value = self.attribute(&t, attribute).cloned();
                Ok(value.map(|value| t.with_current(value)))
            }),
            Step::Map(sub) => self.map_each(input, move |t| {
                Ok(self
                    .first_result(sub, &t)?
                    .map(|result| t.with_current(result.into_current())))
            }),
            Step::MapValue(func) => self.map_each(input, move |t| {
                let value = func.apply(t.current());
                if !value.is_null() && !func.output().accepts(&value) {
                    return Err(EngineError::type_error(format!(
                        "map '{}' is declared to return {} but returned {}",
                        func.name(),
                        func.output(),
                        value.type_name()
                    )));
                }
                Ok(Some(t.with_current(func.output().coerce(value))))
            }),
            Step::Limit(count) => Box::new(self.map_each(input, |t| Ok(Some(t))).take(*count)),
            Step::Unfold => self.flat_each(input, |t| -> TraverserStream<'a> {
                let items = t.current().as_list().map(|items| items.to_vec());
                match items {
                    Some(items) => Box::new(items.into_iter().map(move |item| emit(t.split(item)))),
                    None => Box::new(iter::empty()),
                }
            }),
            Step::Fold => {
                let items = self.materialize(input)?;
                Box::new(iter::once(emit(steps::fold(items, scope))))
            }
            Step::Count => {
                let items = self.materialize(input)?;
                Box::new(iter::once(emit(steps::count(&items, scope))))
            }
            Step::Dedup => {
                let items = self.materialize(input)?;
                Box::new(steps::dedup(items).into_iter().map(emit))
            }
            Step::Order(keys) => {
                let items = self.materialize(input)?;
                let mut keyed = Vec::with_capacity(items.len());
                for t in items {
                    self.budget.charge_step()?;
                    let mut values = Vec::with_capacity(keys.len());
                    for key in keys {
                        values.push(match &key.key {
                            SortBy::Current => t.current().clone(),
                            SortBy::Attribute(name) => {
                                self.attribute(&t, name).cloned().unwrap_or(Value::Null)
                            }
                            SortBy::Traversal(sub) => self.first_value(sub, &t)?,
                        });
                    }
                    keyed.push((values, t));
                }
                Box::new(steps::sort(keyed, keys).into_iter().map(emit))
            }
        };
        Ok(stream)
    }

    /// Drain a stream at a barrier, charging one step per traverser
    fn materialize(&self, input: TraverserStream<'_>) -> Result<Vec<Traverser>, EngineError> {
        let items = input.collect::<Result<Vec<_>, _>>()?;
        self.budget.check_results(items.len())?;
        self.budget.charge_steps(items.len())?;
        trace!("Barrier materialized {} traversers", items.len());
        Ok(items)
    }

    fn map_each<'a, F>(&'a self, input: TraverserStream<'a>, mut apply: F) -> TraverserStream<'a>
    where
        F: FnMut(Traverser) -> Result<Option<Traverser>, EngineError> + 'a,
    {
        Box::new(input.filter_map(move |item| {
            item.and_then(|t| {
                self.budget.charge_step()?;
                apply(t)
            })
            .transpose()
        }))
    }

    fn filter<'a, F>(&'a self, input: TraverserStream<'a>, mut keep: F) -> TraverserStream<'a>
    where
        F: FnMut(&Traverser) -> Result<bool, EngineError> + 'a,
    {
        self.map_each(input, move |t| Ok(if keep(&t)? { Some(t) } else { None }))
    }

    fn flat_each<'a, F>(&'a self, input: TraverserStream<'a>, mut expand: F) -> TraverserStream<'a>
    where
        F: FnMut(Traverser) -> TraverserStream<'a> + 'a,
    {
        Box::new(input.flat_map(move |item| -> TraverserStream<'a> {
            match item.and_then(|t| self.budget.charge_step().map(|_| t)) {
                Ok(t) => expand(t),
                Err(error) => Box::new(iter::once(Err(error))),
            }
        }))
    }

    /// First traverser produced by `sub` from `t`, pulling no further
    fn first_result(&self, sub: &Pipeline, t: &Traverser) -> Result<Option<Traverser>, EngineError> {
        let mut results = self.run(sub.steps(), Box::new(iter::once(emit(t.clone()))), t.labels())?;
        results.next().transpose()
    }

    /// Current value of the first result of `sub`, `Null` when there is none
    fn first_value(&self, sub: &Pipeline, t: &Traverser) -> Result<Value, EngineError> {
        Ok(self
            .first_result(sub, t)?
            .map(Traverser::into_current)
            .unwrap_or(Value::Null))
    }

    fn all_values(&self, sub: &Pipeline, t: &Traverser) -> Result<Vec<Value>, EngineError> {
        let results = self.run(sub.steps(), Box::new(iter::once(emit(t.clone()))), t.labels())?;
        let mut values = Vec::new();
        for result in results {
            values.push(result?.into_current());
            self.budget.check_results(values.len())?;
        }
        Ok(values)
    }

    fn vertex(&self, t: &Traverser) -> Option<&'g Vertex> {
        let graph: &'g GraphCache = self.graph;
        graph.get_vertex(t.vertex_id()?)
    }

    fn attribute(&self, t: &Traverser, name: &str) -> Option<&'g Value> {
        self.vertex(t)?.get_attribute(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Traversal, P};
    use crate::schema::{
        AttributeDefinition, DataType, EdgeKindDefinition, VertexKindDefinition,
    };
    use crate::storage::attributes;
    use std::sync::Arc;

    fn people() -> (Arc<SchemaRegistry>, GraphCache) {
        let registry = Arc::new(
            SchemaRegistry::builder()
                .vertex_kind(
                    VertexKindDefinition::new("Person")
                        .attribute(AttributeDefinition::required("name", DataType::String)),
                )
                .edge_kind(EdgeKindDefinition::new("Kennt").from_kind("Person").to_kind("Person"))
                .build()
                .unwrap(),
        );
        let person = registry.vertex_kind("Person").unwrap();
        let knows = registry.edge_kind("Kennt").unwrap();

        let mut graph = GraphCache::new();
        let ids: Vec<_> = ["Alice", "Bob", "Charlie", "Dora"]
            .iter()
            .map(|name| graph.add_vertex(person, attributes([("name", *name)])))
            .collect();
        graph.add_edge(knows, ids[0], ids[1]).unwrap();
        graph.add_edge(knows, ids[0], ids[2]).unwrap();
        graph.add_edge(knows, ids[1], ids[2]).unwrap();
        (registry, graph)
    }

    fn run(registry: &Arc<SchemaRegistry>, graph: &GraphCache, traversal: Traversal) -> Vec<Value> {
        let pipeline = traversal.build().unwrap();
        Executor::new(graph, registry, TraversalBudget::unlimited())
            .execute(&pipeline)
            .unwrap()
            .into_iter()
            .map(Traverser::into_current)
            .collect()
    }

    #[test]
    fn test_where_and_not() {
        let (registry, graph) = people();
        let knows_someone = Traversal::from_kind(&registry, "Person")
            .where_(|t| t.out("Kennt"))
            .values("name");
        assert_eq!(
            run(&registry, &graph, knows_someone),
            vec![Value::from("Alice"), Value::from("Bob")]
        );

        let loners = Traversal::from_kind(&registry, "Person")
            .not(|t| t.both("Kennt"))
            .values("name");
        assert_eq!(run(&registry, &graph, loners), vec![Value::from("Dora")]);
    }

    #[test]
    fn test_limit_stops_early() {
        let (registry, graph) = people();
        let pipeline = Traversal::from_kind(&registry, "Person").limit(1).build().unwrap();
        let executor = Executor::new(&graph, &registry, TraversalBudget::unlimited());
        let results = executor.execute(&pipeline).unwrap();
        assert_eq!(results.len(), 1);
        // one seeded vertex plus the limit step
        assert_eq!(executor.budget().steps(), 2);
    }

    #[test]
    fn test_local_count_per_traverser() {
        let (registry, graph) = people();
        let counts = Traversal::from_kind(&registry, "Person").local(|t| t.out("Kennt").count());
        assert_eq!(
            run(&registry, &graph, counts),
            vec![Value::from(2), Value::from(1), Value::from(0), Value::from(0)]
        );
    }

    #[test]
    fn test_unfold_and_dedup() {
        let (registry, graph) = people();
        let reachable = Traversal::from_kind(&registry, "Person")
            .local(|t| t.out("Kennt").values("name"))
            .unfold()
            .dedup();
        assert_eq!(
            run(&registry, &graph, reachable),
            vec![Value::from("Bob"), Value::from("Charlie")]
        );
    }

    #[test]
    fn test_budget_trips_during_execution() {
        let (registry, graph) = people();
        let pipeline = Traversal::from_kind(&registry, "Person")
            .out("Kennt")
            .out("Kennt")
            .build()
            .unwrap();
        let executor = Executor::new(&graph, &registry, TraversalBudget::new(3, usize::MAX));
        assert!(matches!(
            executor.execute(&pipeline),
            Err(EngineError::TraversalBudgetExceeded { .. })
        ));
    }

    #[test]
    fn test_map_value_must_return_declared_type() {
        let (registry, graph) = people();
        let pipeline = Traversal::from_kind(&registry, "Person")
            .values("name")
            .map_value("broken", DataType::Integer, |_| Value::from("oops"))
            .is(P::gt(0))
            .build()
            .unwrap();
        let executor = Executor::new(&graph, &registry, TraversalBudget::unlimited());
        match executor.execute(&pipeline) {
            Err(EngineError::PipelineTypeError(message)) => assert!(message.contains("broken")),
            other => panic!("expected a pipeline type error, got {:?}", other),
        }

        let widened = Traversal::from_kind(&registry, "Person")
            .values("name")
            .map_value("len", DataType::Float, |v| {
                Value::from(v.as_string().map(|s| s.len() as i64).unwrap_or(0))
            });
        assert_eq!(
            run(&registry, &graph, widened),
            vec![Value::Float(5.0), Value::Float(3.0), Value::Float(7.0), Value::Float(4.0)]
        );
    }

    #[test]
    fn test_predicate_on_values() {
        let (registry, graph) = people();
        let names = Traversal::from_kind(&registry, "Person")
            .values("name")
            .is(P::within(vec!["Bob", "Dora"]));
        assert_eq!(
            run(&registry, &graph, names),
            vec![Value::from("Bob"), Value::from("Dora")]
        );
    }
}
