// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed entity models
//!
//! Application structs implement [`VertexModel`] to be inserted into and
//! read back from the store without building attribute maps by hand.

use crate::storage::{Attributes, Vertex};

/// A Rust type stored as vertices of one concrete kind
pub trait VertexModel: Sized {
    /// Label of the concrete vertex kind
    const KIND: &'static str;

    /// Convert into the attribute mapping stored on the vertex
    fn into_attributes(self) -> Attributes;

    /// Rebuild from stored attributes, `None` if they do not fit
    fn from_attributes(attributes: &Attributes) -> Option<Self>;

    fn from_vertex(vertex: &Vertex) -> Option<Self> {
        Self::from_attributes(&vertex.attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::VertexKindId;
    use crate::storage::{attributes, Value, VertexId};

    #[derive(Debug, PartialEq)]
    struct Person {
        name: String,
    }

    impl VertexModel for Person {
        const KIND: &'static str = "Person";

        fn into_attributes(self) -> Attributes {
            attributes([("name", self.name)])
        }

        fn from_attributes(attributes: &Attributes) -> Option<Self> {
            Some(Person {
                name: attributes.get("name")?.as_string()?.to_string(),
            })
        }
    }

    #[test]
    fn test_model_round_trip() {
        let attrs = Person { name: "Alice".into() }.into_attributes();
        assert_eq!(attrs.get("name"), Some(&Value::from("Alice")));

        let vertex = Vertex {
            id: VertexId::new(0),
            kind: VertexKindId(0),
            attributes: attrs,
        };
        assert_eq!(
            Person::from_vertex(&vertex),
            Some(Person { name: "Alice".into() })
        );
        assert_eq!(Person::from_attributes(&Attributes::new()), None);
    }
}
