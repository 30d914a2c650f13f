/// Benchmark for traversal throughput on a generated social graph
///
/// Measures insert throughput, then repeated execution of a filter, an
/// expansion with a sub-traversal and a per-vertex aggregation, all through
/// the public store API.
use std::sync::Arc;
use std::time::Instant;

use gremlite::{
    attributes, new_store, AttributeDefinition, DataType, EdgeKindDefinition, SchemaRegistry,
    Value, VertexKindDefinition, P,
};

const PEOPLE: usize = 10_000;
const LINKS_PER_PERSON: usize = 8;
const ITERATIONS: usize = 20;

fn main() {
    println!("=== Traversal Throughput Benchmark ===\n");

    let registry = SchemaRegistry::builder()
        .vertex_kind(
            VertexKindDefinition::new("Person")
                .attribute(AttributeDefinition::required("name", DataType::String))
                .attribute(AttributeDefinition::required("age", DataType::Integer)),
        )
        .edge_kind(EdgeKindDefinition::new("Kennt").from_kind("Person").to_kind("Person"))
        .build()
        .expect("Failed to build schema");
    let store = new_store(Arc::new(registry));

    println!("📊 Loading graph:");
    let load_start = Instant::now();
    let mut rng = fastrand::Rng::with_seed(2024);
    let ids: Vec<_> = (0..PEOPLE)
        .map(|i| {
            store
                .insert_vertex(
                    "Person",
                    attributes([
                        ("name", Value::from(format!("person{}", i))),
                        ("age", Value::from(rng.i64(18..90))),
                    ]),
                )
                .expect("Failed to insert person")
        })
        .collect();
    for source in &ids {
        for _ in 0..LINKS_PER_PERSON {
            let target = ids[rng.usize(..ids.len())];
            store
                .insert_edge("Kennt", *source, target)
                .expect("Failed to insert edge");
        }
    }
    let load_duration = load_start.elapsed();
    let stats = store.stats();
    println!(
        "  {} vertices, {} edges in {:?}",
        stats.vertex_count, stats.edge_count, load_duration
    );
    println!();

    let queries = vec![
        (
            "filter by attribute",
            store
                .traversal()
                .from_kind("Person")
                .has("age", P::gte(65))
                .values("name")
                .build()
                .expect("Failed to build query"),
        ),
        (
            "expand with sub-traversal",
            store
                .traversal()
                .from_kind("Person")
                .where_(|t| t.out("Kennt").has("age", P::lt(21)))
                .out("Kennt")
                .dedup()
                .count()
                .build()
                .expect("Failed to build query"),
        ),
        (
            "per-vertex aggregation",
            store
                .traversal()
                .from_kind("Person")
                .project(|p| {
                    p.by("name", |t| t.values("name"))
                        .by("friends", |t| t.both("Kennt").count())
                })
                .build()
                .expect("Failed to build query"),
        ),
    ];

    let snapshot = store.snapshot();
    for (name, pipeline) in &queries {
        println!("📊 {}:", name);
        let start = Instant::now();
        let mut results = 0;
        for _ in 0..ITERATIONS {
            results = snapshot
                .execute(pipeline)
                .expect("Failed to execute query")
                .len();
        }
        let duration = start.elapsed();
        println!("  Results: {}", results);
        println!("  Time: {:?}", duration);
        println!(
            "  Throughput: {:.1} traversals/sec",
            ITERATIONS as f64 / duration.as_secs_f64()
        );
        println!();
    }
}
