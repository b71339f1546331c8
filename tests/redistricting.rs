//! End-to-end runs of the engine on small redistricting graphs.

use gendist::district::{
    AdjacencyGraph, CutEdges, DistrictMutator, GroupId, PopulationBalance, ReassignmentCount,
    Unit, UnitId, Votes, Weighted,
};
use gendist::error::{ConfigError, GenerationError, GraphIntegrityError};
use gendist::ga::{Engine, GaConfig, GenerationStats, Genome, Population, SinglePointCrosser};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Units A–B–C–D in a path, all in group 1.
fn path_graph() -> Arc<AdjacencyGraph> {
    let mut builder = AdjacencyGraph::builder();
    for id in 1..=4 {
        builder = builder.add_unit(Unit::new(UnitId(id), GroupId(1), Votes::new(10, 10, 0)));
    }
    Arc::new(
        builder
            .add_adjacency(UnitId(1), UnitId(2))
            .add_adjacency(UnitId(2), UnitId(3))
            .add_adjacency(UnitId(3), UnitId(4))
            .build()
            .unwrap(),
    )
}

/// A `side`×`side` grid with four-neighbor adjacency.
///
/// The initial plan stripes columns across `groups` districts, and vote
/// counts vary by position so that balance is non-trivial.
fn grid_graph(side: u32, groups: u32) -> Arc<AdjacencyGraph> {
    let id = |r: u32, c: u32| UnitId(r * side + c);
    let mut builder = AdjacencyGraph::builder();
    for r in 0..side {
        for c in 0..side {
            let group = GroupId(c * groups / side);
            let votes = Votes::new(u64::from(10 + r * 3), u64::from(10 + c * 2), 1);
            builder = builder.add_unit(Unit::new(id(r, c), group, votes));
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
    Arc::new(builder.build().unwrap())
}

#[test]
fn test_all_same_group_scenario_stays_at_zero() {
    let graph = path_graph();
    let prototype = graph.prototype();
    let config = GaConfig::default()
        .with_population_size(4)
        .with_mutation_rate(0.5)
        .with_crossover_rate(0.5)
        .with_seed(2024);

    let mut engine = Engine::new(
        prototype.clone(),
        config,
        ReassignmentCount::new(prototype.clone()),
        DistrictMutator::new(graph.clone()),
        SinglePointCrosser,
    )
    .unwrap();
    assert_eq!(engine.num_mutate(), 2);
    assert_eq!(engine.num_crossover(), 2);
    assert_eq!(engine.evaluate().unwrap(), 0);

    for _ in 0..25 {
        let stats = engine.step().unwrap();
        assert_eq!(stats.best_cost, 0);
        assert_eq!(engine.population().len(), 4);
        assert!(engine.population().iter().all(|g| g.len() == 4));
    }
    assert_eq!(engine.best(), Some(&prototype));
}

#[test]
fn test_isolated_units_exhaust_mutation() {
    let graph = Arc::new(
        AdjacencyGraph::builder()
            .add_unit(Unit::new(UnitId(1), GroupId(1), Votes::default()))
            .add_unit(Unit::new(UnitId(2), GroupId(2), Votes::default()))
            .build()
            .unwrap(),
    );
    let mut engine = Engine::new(
        graph.prototype(),
        GaConfig::default()
            .with_population_size(4)
            .with_mutation_rate(0.25)
            .with_max_mutation_retries(5)
            .with_seed(1),
        CutEdges::new(graph.clone()),
        DistrictMutator::new(graph.clone()),
        SinglePointCrosser,
    )
    .unwrap();

    let err = engine.step().unwrap_err();
    match err {
        GenerationError::MutationExhausted { attempts, .. } => assert_eq!(attempts, 5),
        other => panic!("expected MutationExhausted, got {other}"),
    }
    assert_eq!(engine.generation(), 0);
}

#[test]
fn test_dangling_neighbor_is_fatal() {
    let err = AdjacencyGraph::builder()
        .add_unit(Unit::new(UnitId(1), GroupId(1), Votes::default()))
        .add_adjacency(UnitId(1), UnitId(7))
        .build()
        .unwrap_err();
    assert!(matches!(err, GraphIntegrityError::DanglingNeighbor { .. }));
}

#[test]
fn test_grid_compactness_improves() {
    let graph = grid_graph(6, 3);
    // Scramble the initial plan by alternating groups per row.
    let prototype: Genome<GroupId> = (0..36u32).map(|i| GroupId((i / 6 + i % 6) % 3)).collect();
    let objective = CutEdges::new(graph.clone());
    let config = GaConfig::default()
        .with_population_size(30)
        .with_mutation_rate(0.6)
        .with_crossover_rate(0.4)
        .with_max_generations(150)
        .with_seed(42);

    let mut engine = Engine::new(
        prototype,
        config,
        objective,
        DistrictMutator::new(graph.clone()),
        SinglePointCrosser,
    )
    .unwrap();
    let result = engine.run(()).unwrap();

    let initial = result.cost_history[0];
    assert!(
        result.best_cost < initial,
        "expected fewer cut edges than {initial}, got {}",
        result.best_cost
    );
    assert!(result.cost_history.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(result.generations, 150);
}

#[test]
fn test_same_seed_same_run() {
    let graph = grid_graph(5, 2);
    let run = || {
        let objective = Weighted::new()
            .with(10, CutEdges::new(graph.clone()))
            .with(1, PopulationBalance::new(graph.clone()));
        let mut engine = Engine::new(
            graph.prototype(),
            GaConfig::default()
                .with_population_size(12)
                .with_mutation_rate(0.5)
                .with_crossover_rate(0.5)
                .with_max_generations(20)
                .with_seed(99),
            objective,
            DistrictMutator::new(graph.clone()),
            SinglePointCrosser,
        )
        .unwrap();
        let mut history: Vec<Population<GroupId>> = Vec::new();
        let result = engine
            .run(|_: &GenerationStats, pop: &Population<GroupId>| history.push(pop.clone()))
            .unwrap();
        (history, result.cost_history)
    };
    let (a, costs_a) = run();
    let (b, costs_b) = run();
    assert_eq!(a.len(), 20);
    assert_eq!(a, b);
    assert_eq!(costs_a, costs_b);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_scoring_matches_sequential() {
    let graph = grid_graph(5, 2);
    let run = |parallel: bool| {
        let mut engine = Engine::new(
            graph.prototype(),
            GaConfig::default()
                .with_population_size(16)
                .with_max_generations(15)
                .with_parallel(parallel)
                .with_seed(5),
            PopulationBalance::new(graph.clone()),
            DistrictMutator::new(graph.clone()),
            SinglePointCrosser,
        )
        .unwrap();
        engine.run(()).unwrap();
        engine.into_population()
    };
    assert_eq!(run(false), run(true));
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_objective_failure_leaves_state_untouched() {
    use gendist::ga::Objective;

    let graph = grid_graph(4, 2);
    let armed = Arc::new(AtomicBool::new(false));
    let trigger = armed.clone();
    let balance = PopulationBalance::new(graph.clone());
    let objective = move |g: &Genome<GroupId>| -> anyhow::Result<i64> {
        anyhow::ensure!(!trigger.load(Ordering::Relaxed), "objective disabled");
        balance.score(g)
    };
    let mut engine = Engine::new(
        graph.prototype(),
        GaConfig::default()
            .with_population_size(10)
            .with_parallel(true)
            .with_seed(13),
        objective,
        DistrictMutator::new(graph.clone()),
        SinglePointCrosser,
    )
    .unwrap();
    engine.step().unwrap();

    let population = engine.population().clone();
    let costs = engine.costs().map(<[i64]>::to_vec);
    let best_cost = engine.best_cost();

    armed.store(true, Ordering::Relaxed);
    let err = engine.step().unwrap_err();
    assert!(matches!(err, GenerationError::ObjectiveEvaluation { .. }));
    assert!(err.genome().is_some());
    assert_eq!(engine.population(), &population);
    assert_eq!(engine.costs().map(<[i64]>::to_vec), costs);
    assert_eq!(engine.best_cost(), best_cost);
    assert_eq!(engine.generation(), 1);
}

#[test]
fn test_prototype_length_must_match_graph() {
    let graph = path_graph();
    let result = Engine::new(
        Genome::new(vec![GroupId(1); 2]),
        GaConfig::default().with_seed(1),
        CutEdges::new(graph.clone()),
        DistrictMutator::new(graph.clone()),
        SinglePointCrosser,
    );
    assert!(matches!(
        result,
        Err(ConfigError::PrototypeLength {
            expected: 4,
            actual: 2
        })
    ));
}

#[test]
fn test_stop_flag_from_another_thread() {
    let graph = grid_graph(6, 3);
    let mut engine = Engine::new(
        graph.prototype(),
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(1_000_000)
            .with_seed(3),
        CutEdges::new(graph.clone()),
        DistrictMutator::new(graph.clone()),
        SinglePointCrosser,
    )
    .unwrap();

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(10));
        flag.store(true, Ordering::Relaxed);
    });

    let result = engine.run_with_cancel((), Some(cancel)).unwrap();
    assert!(result.cancelled);
    assert!(result.generations < 1_000_000);
    assert_eq!(engine.population().len(), 20);
}

#[test]
fn test_time_limit_stops_run() {
    let graph = grid_graph(6, 3);
    let mut engine = Engine::new(
        graph.prototype(),
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(1_000_000)
            .with_time_limit_ms(20)
            .with_seed(3),
        CutEdges::new(graph.clone()),
        DistrictMutator::new(graph.clone()),
        SinglePointCrosser,
    )
    .unwrap();
    let result = engine.run(()).unwrap();
    assert!(result.timed_out);
    assert!(!result.cancelled);
}
