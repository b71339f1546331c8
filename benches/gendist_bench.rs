//! Criterion benchmarks for the generational engine.
//!
//! Uses synthetic grid maps to measure generation throughput independent of
//! any real district data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gendist::district::{
    AdjacencyGraph, CutEdges, DistrictMutator, GroupId, PopulationBalance, Unit, UnitId, Votes,
    Weighted,
};
use gendist::ga::{Engine, GaConfig, SinglePointCrosser};
use std::sync::Arc;

// ===========================================================================
// Grid maps: side × side units, four-neighbor adjacency, striped plan
// ===========================================================================

fn grid(side: u32, groups: u32) -> Arc<AdjacencyGraph> {
    let id = |r: u32, c: u32| UnitId(r * side + c);
    let mut builder = AdjacencyGraph::builder();
    for r in 0..side {
        for c in 0..side {
            let votes = Votes::new(u64::from(100 + r), u64::from(100 + c), 5);
            builder = builder.add_unit(Unit::new(id(r, c), GroupId(c * groups / side), votes));
        }
    }
    for r in 0..side {
        for c in 0..side {
            if c + 1 < side {
                builder = builder.add_adjacency(id(r, c), id(r, c + 1));
            }
            if r + 1 < side {
                builder = builder.add_adjacency(id(r, c), id(r + 1, c));
            }
        }
    }
    Arc::new(builder.build().expect("grid is well-formed"))
}

fn bench_grid_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_generations");
    group.sample_size(10);

    for &(side, pop, gen) in &[(10u32, 50usize, 20usize), (20, 50, 20), (30, 100, 10)] {
        let graph = grid(side, 4);
        group.bench_with_input(
            BenchmarkId::new(format!("s{}_p{}_g{}", side, pop, gen), side),
            &graph,
            |b, graph| {
                b.iter(|| {
                    let objective = Weighted::new()
                        .with(10, CutEdges::new(graph.clone()))
                        .with(1, PopulationBalance::new(graph.clone()));
                    let config = GaConfig::default()
                        .with_population_size(pop)
                        .with_max_generations(gen)
                        .with_seed(42);
                    let mut engine = Engine::new(
                        graph.prototype(),
                        config,
                        objective,
                        DistrictMutator::new(graph.clone()),
                        SinglePointCrosser,
                    )
                    .expect("valid config");
                    black_box(engine.run(()).expect("objectives cannot fail"))
                })
            },
        );
    }

    group.finish();
}

fn bench_objectives(c: &mut Criterion) {
    let mut group = c.benchmark_group("objectives");
    let graph = grid(30, 6);
    let plan = graph.prototype();

    let cut = CutEdges::new(graph.clone());
    group.bench_function("cut_edges_30x30", |b| {
        b.iter(|| gendist::ga::Objective::score(&cut, black_box(&plan)))
    });

    let balance = PopulationBalance::new(graph.clone());
    group.bench_function("population_balance_30x30", |b| {
        b.iter(|| gendist::ga::Objective::score(&balance, black_box(&plan)))
    });

    group.finish();
}

criterion_group!(benches, bench_grid_generations, bench_objectives);
criterion_main!(benches);
