// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Predicates used by `has`, `is` and the membership tests
//!
//! A predicate is plain data. It is type-checked once when the traversal is
//! composed and evaluated per traverser during execution. Operands are
//! either literals or references to values bound with `as_`.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::exec::error::EngineError;
use crate::exec::traverser::Traverser;
use crate::plan::element_type::{ElementType, VertexType};
use crate::schema::DataType;
use crate::storage::{Value, VertexId};

/// Right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// Value bound to a label earlier in the traversal
    Label(String),
}

impl Operand {
    pub fn label(name: impl Into<String>) -> Self {
        Operand::Label(name.into())
    }

    fn resolve<'a>(&'a self, traverser: &'a Traverser) -> Option<&'a Value> {
        match self {
            Operand::Literal(value) => Some(value),
            Operand::Label(name) => traverser.label(name),
        }
    }

    fn element_type(
        &self,
        labels: &BTreeMap<String, ElementType>,
    ) -> Result<ElementType, EngineError> {
        match self {
            Operand::Literal(value) => Ok(literal_type(value)),
            Operand::Label(name) => labels
                .get(name)
                .cloned()
                .ok_or_else(|| EngineError::type_error(format!("label '{}' is not bound", name))),
        }
    }
}

fn literal_type(value: &Value) -> ElementType {
    match value {
        Value::Vertex(_) => ElementType::Vertex(VertexType::Any),
        Value::List(_) => ElementType::List(Box::new(ElementType::any_scalar())),
        other => ElementType::Scalar(DataType::of_value(other)),
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Label(name) => write!(f, "@{}", name),
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl From<DateTime<Utc>> for Operand {
    fn from(value: DateTime<Utc>) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl From<VertexId> for Operand {
    fn from(value: VertexId) -> Self {
        Operand::Literal(Value::from(value))
    }
}

/// Regular expression kept together with its source text
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    /// `None` when the source does not compile; rejected at composition
    regex: Option<Regex>,
}

impl TextPattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = Regex::new(&source).ok();
        Self { source, regex }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().map(|r| r.is_match(text)).unwrap_or(false)
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Operand),
    Neq(Operand),
    Lt(Operand),
    Lte(Operand),
    Gt(Operand),
    Gte(Operand),
    StartsWith(String),
    EndsWith(String),
    ContainsText(String),
    Matches(TextPattern),
    /// List membership
    Contains(Operand),
    NotContains(Operand),
    IsEmpty,
    NotEmpty,
    Within(Vec<Value>),
    Not(Box<Predicate>),
}

/// Predicate constructors
pub struct P;

impl P {
    pub fn eq(operand: impl Into<Operand>) -> Predicate {
        Predicate::Eq(operand.into())
    }

    pub fn neq(operand: impl Into<Operand>) -> Predicate {
        Predicate::Neq(operand.into())
    }

    pub fn lt(operand: impl Into<Operand>) -> Predicate {
        Predicate::Lt(operand.into())
    }

    pub fn lte(operand: impl Into<Operand>) -> Predicate {
        Predicate::Lte(operand.into())
    }

    pub fn gt(operand: impl Into<Operand>) -> Predicate {
        Predicate::Gt(operand.into())
    }

    pub fn gte(operand: impl Into<Operand>) -> Predicate {
        Predicate::Gte(operand.into())
    }

    pub fn starts_with(prefix: impl Into<String>) -> Predicate {
        Predicate::StartsWith(prefix.into())
    }

    pub fn ends_with(suffix: impl Into<String>) -> Predicate {
        Predicate::EndsWith(suffix.into())
    }

    pub fn contains_text(needle: impl Into<String>) -> Predicate {
        Predicate::ContainsText(needle.into())
    }

    pub fn matches(pattern: impl Into<String>) -> Predicate {
        Predicate::Matches(TextPattern::new(pattern))
    }

    pub fn contains(item: impl Into<Operand>) -> Predicate {
        Predicate::Contains(item.into())
    }

    pub fn not_contains(item: impl Into<Operand>) -> Predicate {
        Predicate::NotContains(item.into())
    }

    pub fn is_empty() -> Predicate {
        Predicate::IsEmpty
    }

    pub fn not_empty() -> Predicate {
        Predicate::NotEmpty
    }

    pub fn within<V, I>(values: I) -> Predicate
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Predicate::Within(values.into_iter().map(Into::into).collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate) -> Predicate {
        Predicate::Not(Box::new(predicate))
    }
}

impl Predicate {
    /// Check that the predicate can be applied to values of type `input`
    pub fn check(
        &self,
        input: &ElementType,
        labels: &BTreeMap<String, ElementType>,
    ) -> Result<(), EngineError> {
        match self {
            Predicate::Eq(operand) | Predicate::Neq(operand) => {
                let other = operand.element_type(labels)?;
                if !input.may_equal(&other) {
                    return Err(EngineError::type_error(format!(
                        "cannot compare {} with {}",
                        input, other
                    )));
                }
                Ok(())
            }
            Predicate::Lt(operand)
            | Predicate::Lte(operand)
            | Predicate::Gt(operand)
            | Predicate::Gte(operand) => {
                let other = operand.element_type(labels)?;
                if !input.is_orderable() || !input.may_equal(&other) {
                    return Err(EngineError::type_error(format!(
                        "cannot order {} against {}",
                        input, other
                    )));
                }
                Ok(())
            }
            Predicate::StartsWith(_) | Predicate::EndsWith(_) | Predicate::ContainsText(_) => {
                if !input.is_text_like() {
                    return Err(EngineError::type_error(format!(
                        "text predicate applied to {}",
                        input
                    )));
                }
                Ok(())
            }
            Predicate::Matches(pattern) => {
                if !input.is_text_like() {
                    return Err(EngineError::type_error(format!(
                        "text predicate applied to {}",
                        input
                    )));
                }
                if pattern.regex.is_none() {
                    return Err(EngineError::type_error(format!(
                        "invalid regular expression '{}'",
                        pattern.source
                    )));
                }
                Ok(())
            }
            Predicate::Contains(operand) | Predicate::NotContains(operand) => {
                let item = input.item_type().ok_or_else(|| {
                    EngineError::type_error(format!("membership test applied to {}", input))
                })?;
                let other = operand.element_type(labels)?;
                if !item.may_equal(&other) {
                    return Err(EngineError::type_error(format!(
                        "a list of {} cannot contain {}",
                        item, other
                    )));
                }
                Ok(())
            }
            Predicate::IsEmpty | Predicate::NotEmpty => {
                if !input.is_list_like() && !input.is_text_like() {
                    return Err(EngineError::type_error(format!(
                        "emptiness test applied to {}",
                        input
                    )));
                }
                Ok(())
            }
            Predicate::Within(values) => {
                for value in values {
                    let other = literal_type(value);
                    if !input.may_equal(&other) {
                        return Err(EngineError::type_error(format!(
                            "cannot compare {} with {}",
                            input, other
                        )));
                    }
                }
                Ok(())
            }
            Predicate::Not(inner) => inner.check(input, labels),
        }
    }

    /// Evaluate against `value` with label operands resolved from `traverser`
    pub fn test(&self, value: &Value, traverser: &Traverser) -> bool {
        match self {
            Predicate::Eq(operand) => operand
                .resolve(traverser)
                .map(|other| value.equivalent(other))
                .unwrap_or(false),
            Predicate::Neq(operand) => operand
                .resolve(traverser)
                .map(|other| !value.equivalent(other))
                .unwrap_or(false),
            Predicate::Lt(operand) => self.ordered(value, operand, traverser, |o| o == Ordering::Less),
            Predicate::Lte(operand) => {
                self.ordered(value, operand, traverser, |o| o != Ordering::Greater)
            }
            Predicate::Gt(operand) => {
                self.ordered(value, operand, traverser, |o| o == Ordering::Greater)
            }
            Predicate::Gte(operand) => self.ordered(value, operand, traverser, |o| o != Ordering::Less),
            Predicate::StartsWith(prefix) => value
                .as_string()
                .map(|s| s.starts_with(prefix.as_str()))
                .unwrap_or(false),
            Predicate::EndsWith(suffix) => value
                .as_string()
                .map(|s| s.ends_with(suffix.as_str()))
                .unwrap_or(false),
            Predicate::ContainsText(needle) => value
                .as_string()
                .map(|s| s.contains(needle.as_str()))
                .unwrap_or(false),
            Predicate::Matches(pattern) => value
                .as_string()
                .map(|s| pattern.is_match(s))
                .unwrap_or(false),
            Predicate::Contains(operand) => match (value.as_list(), operand.resolve(traverser)) {
                (Some(items), Some(item)) => items.iter().any(|x| x.equivalent(item)),
                _ => false,
            },
            Predicate::NotContains(operand) => match (value.as_list(), operand.resolve(traverser)) {
                (Some(items), Some(item)) => !items.iter().any(|x| x.equivalent(item)),
                _ => false,
            },
            Predicate::IsEmpty => match value {
                Value::List(items) => items.is_empty(),
                Value::String(s) => s.is_empty(),
                _ => false,
            },
            Predicate::NotEmpty => match value {
                Value::List(items) => !items.is_empty(),
                Value::String(s) => !s.is_empty(),
                _ => false,
            },
            Predicate::Within(values) => values.iter().any(|x| value.equivalent(x)),
            Predicate::Not(inner) => !inner.test(value, traverser),
        }
    }

    fn ordered(
        &self,
        value: &Value,
        operand: &Operand,
        traverser: &Traverser,
        accept: impl Fn(Ordering) -> bool,
    ) -> bool {
        operand
            .resolve(traverser)
            .and_then(|other| value.compare(other))
            .map(accept)
            .unwrap_or(false)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Eq(o) => write!(f, "eq({})", o),
            Predicate::Neq(o) => write!(f, "neq({})", o),
            Predicate::Lt(o) => write!(f, "lt({})", o),
            Predicate::Lte(o) => write!(f, "lte({})", o),
            Predicate::Gt(o) => write!(f, "gt({})", o),
            Predicate::Gte(o) => write!(f, "gte({})", o),
            Predicate::StartsWith(s) => write!(f, "startsWith({:?})", s),
            Predicate::EndsWith(s) => write!(f, "endsWith({:?})", s),
            Predicate::ContainsText(s) => write!(f, "containing({:?})", s),
            Predicate::Matches(p) => write!(f, "regex({:?})", p.source),
            Predicate::Contains(o) => write!(f, "contains({})", o),
            Predicate::NotContains(o) => write!(f, "notContains({})", o),
            Predicate::IsEmpty => write!(f, "isEmpty()"),
            Predicate::NotEmpty => write!(f, "notEmpty()"),
            Predicate::Within(values) => {
                let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "within({})", values.join(", "))
            }
            Predicate::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> ElementType {
        ElementType::Scalar(DataType::String)
    }

    #[test]
    fn test_text_predicates() {
        let t = Traverser::new(Value::Null);
        let bello = Value::from("Bello");
        assert!(P::starts_with("B").test(&bello, &t));
        assert!(!P::starts_with("L").test(&bello, &t));
        assert!(P::ends_with("llo").test(&bello, &t));
        assert!(P::contains_text("ell").test(&bello, &t));
        assert!(P::matches("^B.*o$").test(&bello, &t));
        assert!(P::not(P::eq("Lumpi")).test(&bello, &t));
    }

    #[test]
    fn test_comparisons_cross_numeric_types() {
        let t = Traverser::new(Value::Null);
        assert!(P::lt(2.5).test(&Value::Integer(2), &t));
        assert!(P::gte(2).test(&Value::Float(2.0), &t));
        assert!(!P::gt("a").test(&Value::Integer(2), &t));
        assert!(P::within(vec![1, 2, 3]).test(&Value::Float(3.0), &t));
    }

    #[test]
    fn test_membership_with_label_operand() {
        let alice = Value::Vertex(VertexId::new(0));
        let bob = Value::Vertex(VertexId::new(1));
        let t = Traverser::new(alice.clone()).bind("owner");
        let residents = Value::List(vec![bob.clone()]);

        assert!(P::not_contains(Operand::label("owner")).test(&residents, &t));
        assert!(!P::contains(Operand::label("owner")).test(&residents, &t));
        assert!(P::contains(Operand::label("owner")).test(&Value::List(vec![alice, bob]), &t));
        assert!(P::is_empty().test(&Value::List(vec![]), &t));
        assert!(!P::not_empty().test(&Value::List(vec![]), &t));
    }

    #[test]
    fn test_check_rejects_incompatible_types() {
        let labels = BTreeMap::new();
        let integer = ElementType::Scalar(DataType::Integer);
        assert!(P::eq(3).check(&integer, &labels).is_ok());
        assert!(P::eq("x").check(&integer, &labels).is_err());
        assert!(P::starts_with("B").check(&integer, &labels).is_err());
        assert!(P::starts_with("B").check(&text(), &labels).is_ok());
        assert!(P::matches("(").check(&text(), &labels).is_err());
        assert!(P::contains(1).check(&integer, &labels).is_err());
        assert!(P::lt(1).check(&ElementType::List(Box::new(integer)), &labels).is_err());
    }

    #[test]
    fn test_check_resolves_labels() {
        let mut labels = BTreeMap::new();
        let people = ElementType::List(Box::new(ElementType::Vertex(VertexType::Any)));
        assert!(matches!(
            P::not_contains(Operand::label("owner")).check(&people, &labels),
            Err(EngineError::PipelineTypeError(_))
        ));
        labels.insert("owner".to_string(), ElementType::Vertex(VertexType::Any));
        assert!(P::not_contains(Operand::label("owner"))
            .check(&people, &labels)
            .is_ok());
    }
}
