//! Randomizer pipeline tests: staging, determinism, retry, validation.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use randoforge_config::RandomizerConfig;
use randoforge_core::TermKind;

use crate::error::RandoError;
use crate::event::CountingEventListener;
use crate::group::{RandoItem, RandomizationGroup};
use crate::item::SingleItem;
use crate::randomizer::{RandoContext, Randomizer};
use crate::test_utils::{
    build_world, chain_world, empty_item, group_of, location, simple_world, single_item, stage_of,
    TestWorld,
};

fn simple_stage(world: &TestWorld) -> crate::stage::RandomizationStage {
    stage_of(
        "main",
        vec![group_of(
            "main",
            vec![
                single_item("Key", world.term("KEY")),
                single_item("Sword", world.term("SWORD")),
                empty_item("Geo1"),
                empty_item("Geo2"),
                empty_item("Geo3"),
            ],
            vec![
                location(world, "Start1"),
                location(world, "Start2"),
                location(world, "Cache"),
                location(world, "Vault"),
                location(world, "Arena"),
            ],
        )],
    )
}

#[test]
fn test_single_stage_run_validates() {
    let world = simple_world();
    let mut randomizer = Randomizer::new(
        Arc::clone(&world.lm),
        RandoContext::new(),
        vec![simple_stage(&world)],
        3,
    );
    let placements = randomizer.run().unwrap();

    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].len(), 1);
    assert_eq!(placements[0][0].len(), 5);

    let exported = randomizer.export_placements();
    let items: Vec<&str> = exported[0][0].iter().map(|p| p.item.as_str()).collect();
    assert!(items.contains(&"Key"));
    assert!(items.contains(&"Sword"));
}

#[test]
fn test_same_seed_reproduces_placements() {
    let build = || {
        let world = simple_world();
        Randomizer::new(
            Arc::clone(&world.lm),
            RandoContext::new(),
            vec![simple_stage(&world)],
            1234,
        )
    };
    let first = build().run().unwrap();
    let second = build().run().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_two_stage_forward_then_rerandomize() {
    let sm = Arc::new(randoforge_core::StateManagerBuilder::new().build().unwrap());
    let world = build_world(
        sm,
        &[("SMALL", TermKind::Int), ("BIG", TermKind::Int)],
        &[
            ("S1", "TRUE"),
            ("S2", "SMALL"),
            ("B1", "TRUE"),
            ("B2", "BIG"),
        ],
        Vec::new(),
    );
    let small_stage = stage_of(
        "small_keys",
        vec![group_of(
            "small",
            vec![
                single_item("Small1", world.term("SMALL")),
                single_item("Small2", world.term("SMALL")),
            ],
            vec![location(&world, "S1"), location(&world, "S2")],
        )],
    );
    let big_stage = stage_of(
        "big_keys",
        vec![group_of(
            "big",
            vec![single_item("Big", world.term("BIG")), empty_item("Junk")],
            vec![location(&world, "B1"), location(&world, "B2")],
        )],
    );

    let listener = Arc::new(CountingEventListener::new());
    let mut randomizer = Randomizer::new(
        Arc::clone(&world.lm),
        RandoContext::new(),
        vec![small_stage, big_stage],
        21,
    );
    randomizer.events_mut().add_listener(listener.clone());
    let placements = randomizer.run().unwrap();

    assert_eq!(placements.len(), 2);
    assert_eq!(placements[0][0].len(), 2);
    assert_eq!(placements[1][0].len(), 2);
    // The small stage always places; a failed attempt dies in the big
    // stage. The successful attempt contributes forward small, permanent
    // big, and the small rerandomization.
    assert_eq!(listener.stages_placed(), listener.retries() + 3);
    assert_eq!(listener.finishes(), 1);
}

#[test]
fn test_retry_recovers_from_exhaustion() {
    // The chain world fails most permutations; across a handful of seeds
    // the engine must both retry and eventually succeed.
    let mut total_retries = 0;
    for seed in 0..8 {
        let world = chain_world(4);
        let items: Vec<RandoItem> = (0..4)
            .map(|i| single_item(&format!("Item{i}"), world.term(&format!("T{i}"))))
            .collect();
        let locations = (0..4)
            .map(|i| location(&world, &format!("L{i}")))
            .collect();
        let stage = stage_of("chain", vec![group_of("chain", items, locations)]);

        let listener = Arc::new(CountingEventListener::new());
        let mut randomizer =
            Randomizer::new(Arc::clone(&world.lm), RandoContext::new(), vec![stage], seed);
        randomizer.events_mut().add_listener(listener.clone());

        randomizer.run().unwrap();
        assert_eq!(listener.finishes(), 1);
        total_retries += listener.retries();
    }
    assert!(total_retries > 0);
}

#[test]
fn test_attempt_limit_bounds_retries() {
    // A vault key that does not exist: every attempt exhausts.
    let world = simple_world();
    let stage = stage_of(
        "main",
        vec![group_of(
            "main",
            vec![empty_item("Geo1"), empty_item("Geo2")],
            vec![location(&world, "Start1"), location(&world, "Vault")],
        )],
    );
    let listener = Arc::new(CountingEventListener::new());
    let config = RandomizerConfig::default().with_seed(5).with_attempt_limit(3);
    let mut randomizer =
        Randomizer::with_config(Arc::clone(&world.lm), RandoContext::new(), vec![stage], &config);
    randomizer.events_mut().add_listener(listener.clone());

    let result = randomizer.run();
    assert!(matches!(result, Err(RandoError::OutOfLocations(_))));
    assert_eq!(listener.attempts(), 3);
    assert_eq!(listener.retries(), 3);
}

#[test]
fn test_cancellation_stops_the_run() {
    let world = simple_world();
    let mut randomizer = Randomizer::new(
        Arc::clone(&world.lm),
        RandoContext::new(),
        vec![simple_stage(&world)],
        9,
    );
    randomizer.cancel_flag().store(true, Ordering::Relaxed);
    assert!(matches!(randomizer.run(), Err(RandoError::Cancelled)));
}

#[test]
fn test_vanilla_placement_feeds_progression() {
    // KEY is vanilla at the Cache; the randomized pool carries no key, yet
    // the vault stays reachable.
    let world = simple_world();
    let stage = stage_of(
        "main",
        vec![group_of(
            "main",
            vec![
                single_item("Sword", world.term("SWORD")),
                empty_item("Geo1"),
                empty_item("Geo2"),
                empty_item("Geo3"),
            ],
            vec![
                location(&world, "Start1"),
                location(&world, "Start2"),
                location(&world, "Vault"),
                location(&world, "Arena"),
            ],
        )],
    );
    let mut ctx = RandoContext::new();
    ctx.add_vanilla(
        Arc::new(SingleItem::new("VanillaKey", world.term("KEY"), 1)),
        Arc::clone(world.lm.logic_def("Cache").unwrap()),
    );

    let mut randomizer = Randomizer::new(Arc::clone(&world.lm), ctx, vec![stage], 17);
    let placements = randomizer.run().unwrap();
    assert_eq!(placements[0][0].len(), 4);
}

#[test]
fn test_coupled_group_randomizes_and_validates() {
    let sm = Arc::new(randoforge_core::StateManagerBuilder::new().build().unwrap());
    let world = build_world(
        sm,
        &[("LEFT", TermKind::Int)],
        &[("CA", "TRUE"), ("CB", "LEFT")],
        Vec::new(),
    );
    let items = vec![
        single_item("TransA", world.term("LEFT")),
        empty_item("TransB"),
    ];
    let locations = vec![location(&world, "CA"), location(&world, "CB")];
    let group = RandomizationGroup::coupled("transitions", items, locations);
    let stage = crate::stage::RandomizationStage::new(
        "transitions",
        vec![group],
        Box::new(crate::stage::UniformPlacementStrategy::new()),
    );

    let mut randomizer =
        Randomizer::new(Arc::clone(&world.lm), RandoContext::new(), vec![stage], 2);
    let placements = randomizer.run().unwrap();
    assert_eq!(placements[0][0].len(), 2);
}
