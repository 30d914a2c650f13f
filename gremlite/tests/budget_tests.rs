//! Traversal budget tests

#[path = "testutils/mod.rs"]
mod testutils;

use std::sync::Arc;

use gremlite::{BudgetResource, EngineConfig, EngineError, Store, TraversalBudget};
use testutils::test_fixture::{household_schema, Person, TestFixture};

fn bounded_household(config: EngineConfig) -> Store {
    testutils::init_logging();
    let store = Store::with_config(Arc::new(household_schema()), config);
    let alice = store.insert_model(Person::named("Alice")).unwrap();
    let bob = store.insert_model(Person::named("Bob")).unwrap();
    let charlie = store.insert_model(Person::named("Charlie")).unwrap();
    store.insert_edge("Kennt", alice, bob).unwrap();
    store.insert_edge("Kennt", alice, charlie).unwrap();
    store
}

#[test]
fn test_step_budget_trips() {
    let store = bounded_household(EngineConfig::unbounded().with_max_steps(5));

    let pipeline = store
        .traversal()
        .from_kind("Person")
        .both("Kennt")
        .both("Kennt")
        .both("Kennt")
        .build()
        .unwrap();

    assert_eq!(
        store.execute(&pipeline),
        Err(EngineError::TraversalBudgetExceeded {
            resource: BudgetResource::Steps,
            limit: 5,
        })
    );
}

#[test]
fn test_seeds_are_charged() {
    let store = bounded_household(EngineConfig::unbounded().with_max_steps(0));
    let everyone = store.traversal().from_kind("Person").build().unwrap();
    assert_eq!(
        store.execute(&everyone),
        Err(EngineError::TraversalBudgetExceeded {
            resource: BudgetResource::Steps,
            limit: 0,
        })
    );

    let budget = TraversalBudget::unlimited();
    store.execute_with_budget(&everyone, budget.clone()).unwrap();
    assert_eq!(budget.steps(), 3);
}

#[test]
fn test_result_budget_trips() {
    let store = bounded_household(EngineConfig::unbounded().with_max_results(2));

    let everyone = store.traversal().from_kind("Person").build().unwrap();
    assert_eq!(
        store.execute(&everyone),
        Err(EngineError::TraversalBudgetExceeded {
            resource: BudgetResource::Results,
            limit: 2,
        })
    );

    let two = store.traversal().from_kind("Person").limit(2).build().unwrap();
    assert_eq!(store.execute(&two).unwrap().len(), 2);
}

#[test]
fn test_limit_stays_within_budget() {
    // one seeded vertex and one pass through the limit
    let store = bounded_household(EngineConfig::unbounded().with_max_steps(2));
    let first = store.traversal().from_kind("Person").limit(1).build().unwrap();
    assert_eq!(store.execute(&first).unwrap().len(), 1);
}

#[test]
fn test_sub_traversals_share_the_budget() {
    let fixture = TestFixture::with_household();
    let store = fixture.store();

    let names = store
        .traversal()
        .from_kind("Person")
        .values("name")
        .build()
        .unwrap();
    let budget = TraversalBudget::unlimited();
    store.execute_with_budget(&names, budget.clone()).unwrap();
    assert_eq!(budget.steps(), 6);

    let knows_someone = store
        .traversal()
        .from_kind("Person")
        .where_(|t| t.out("Kennt"))
        .build()
        .unwrap();
    let budget = TraversalBudget::unlimited();
    store.execute_with_budget(&knows_someone, budget.clone()).unwrap();
    // seeds, filtered traversers and sub-traversal expansions
    assert_eq!(budget.steps(), 9);
    assert_eq!(budget.stats().peak_results, 1);
}

#[test]
fn test_config_from_json() {
    let config = EngineConfig::from_json(r#"{ "max_steps": 2 }"#).unwrap();
    assert_eq!(config.max_steps, Some(2));
    assert_eq!(config.max_results, None);

    let store = bounded_household(config);
    let names = store
        .traversal()
        .from_kind("Person")
        .values("name")
        .build()
        .unwrap();
    assert!(matches!(
        store.execute(&names),
        Err(EngineError::TraversalBudgetExceeded {
            resource: BudgetResource::Steps,
            ..
        })
    ));
}
