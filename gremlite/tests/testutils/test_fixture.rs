//! Test fixture for GremLite integration tests
//!
//! Uses only the public crate API.

use std::sync::Arc;

use gremlite::{
    attributes, new_store, AttributeDefinition, Attributes, DataType, EdgeKindDefinition,
    SchemaRegistry, Store, Value, VertexId, VertexKindDefinition, VertexModel,
};

/// Household schema: people, houses and pets below an abstract base kind
pub fn household_schema() -> SchemaRegistry {
    SchemaRegistry::builder()
        .vertex_kind(VertexKindDefinition::abstract_kind("Knoten"))
        .vertex_kind(
            VertexKindDefinition::new("Person")
                .extends("Knoten")
                .attribute(AttributeDefinition::required("name", DataType::String))
                .attribute(AttributeDefinition::optional("age", DataType::Integer)),
        )
        .vertex_kind(
            VertexKindDefinition::new("Haus")
                .extends("Knoten")
                .attribute(AttributeDefinition::required("address", DataType::String)),
        )
        .vertex_kind(
            VertexKindDefinition::abstract_kind("Haustier")
                .extends("Knoten")
                .attribute(AttributeDefinition::required("name", DataType::String)),
        )
        .vertex_kind(VertexKindDefinition::new("Hund").extends("Haustier"))
        .vertex_kind(VertexKindDefinition::new("Katze").extends("Haustier"))
        .edge_kind(
            EdgeKindDefinition::new("Kennt")
                .from_kind("Person")
                .to_kind("Person"),
        )
        .edge_kind(
            EdgeKindDefinition::new("WohntIn")
                .from_kind("Person")
                .to_kind("Haus"),
        )
        .edge_kind(EdgeKindDefinition::new("Besitzt").from_kind("Person"))
        .build()
        .expect("household schema should be valid")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: Option<i64>,
}

impl Person {
    pub fn named(name: &str) -> Self {
        Person {
            name: name.to_string(),
            age: None,
        }
    }
}

impl VertexModel for Person {
    const KIND: &'static str = "Person";

    fn into_attributes(self) -> Attributes {
        let mut attrs = attributes([("name", Value::from(self.name))]);
        if let Some(age) = self.age {
            attrs.insert("age".to_string(), Value::from(age));
        }
        attrs
    }

    fn from_attributes(attributes: &Attributes) -> Option<Self> {
        Some(Person {
            name: attributes.get("name")?.as_string()?.to_string(),
            age: attributes.get("age").and_then(Value::as_integer),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Haus {
    pub address: String,
}

impl VertexModel for Haus {
    const KIND: &'static str = "Haus";

    fn into_attributes(self) -> Attributes {
        attributes([("address", self.address)])
    }

    fn from_attributes(attributes: &Attributes) -> Option<Self> {
        Some(Haus {
            address: attributes.get("address")?.as_string()?.to_string(),
        })
    }
}

/// Ids of the sample data set
#[derive(Debug, Clone, Copy)]
pub struct Household {
    pub alice: VertexId,
    pub bob: VertexId,
    pub charlie: VertexId,
    pub schillerstr: VertexId,
    pub goethestr: VertexId,
    pub bello: VertexId,
    pub lumpi: VertexId,
}

/// Store over the household schema
pub struct TestFixture {
    store: Store,
    household: Option<Household>,
}

impl TestFixture {
    /// Create an empty store
    pub fn empty() -> Self {
        super::init_logging();
        TestFixture {
            store: new_store(Arc::new(household_schema())),
            household: None,
        }
    }

    /// Create a store holding the sample data set
    pub fn with_household() -> Self {
        let mut fixture = Self::empty();
        let household = fixture
            .load_household()
            .expect("sample data should satisfy the schema");
        fixture.household = Some(household);
        fixture
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn household(&self) -> Household {
        self.household
            .expect("fixture was created without the sample data")
    }

    /// Name attribute of a vertex
    pub fn name_of(&self, id: VertexId) -> Option<String> {
        self.store
            .get_vertex(id)?
            .get_attribute("name")?
            .as_string()
            .map(str::to_string)
    }

    fn load_household(&self) -> Result<Household, Box<dyn std::error::Error>> {
        let store = &self.store;

        let alice = store.insert_model(Person::named("Alice"))?;
        let bob = store.insert_model(Person::named("Bob"))?;
        let charlie = store.insert_model(Person::named("Charlie"))?;

        let schillerstr = store.insert_model(Haus {
            address: "Schillerstr. 17".to_string(),
        })?;
        let goethestr = store.insert_model(Haus {
            address: "Goethestr. 36".to_string(),
        })?;

        let bello = store.insert_vertex("Hund", attributes([("name", "Bello")]))?;
        let lumpi = store.insert_vertex("Katze", attributes([("name", "Lumpi")]))?;

        store.insert_edge("Besitzt", charlie, schillerstr)?;
        store.insert_edge("Besitzt", charlie, goethestr)?;
        store.insert_edge("Kennt", alice, bob)?;
        store.insert_edge("Kennt", alice, charlie)?;
        store.insert_edge("Besitzt", alice, bello)?;
        store.insert_edge("Besitzt", bob, lumpi)?;
        store.insert_edge("WohntIn", alice, schillerstr)?;
        store.insert_edge("WohntIn", bob, schillerstr)?;
        store.insert_edge("WohntIn", charlie, goethestr)?;

        Ok(Household {
            alice,
            bob,
            charlie,
            schillerstr,
            goethestr,
            bello,
            lumpi,
        })
    }
}

/// Collect string values, failing on anything else
pub fn strings(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .map(|v| {
            v.as_string()
                .expect("expected a string value")
                .to_string()
        })
        .collect()
}
