//! Progression manager and updater tests: monotone fixed points.

use std::sync::Arc;

use randoforge_core::{LazyStateBuilder, StateUnion};

use crate::item::{CappedItem, ConditionalItem, FirstOfItem, MultiItem, SingleItem, StateItem};
use crate::progression::ProgressionManager;
use crate::test_utils::{simple_world, state_world};
use crate::updater::{MainUpdater, PrePlacedItemUpdateEntry, StateUpdateEntry};

#[test]
fn test_incr_is_monotone() {
    let world = simple_world();
    let key = world.term("KEY");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    assert_eq!(pm.get(key), 0);
    assert!(!pm.has(key));
    pm.incr(key, 1);
    assert!(pm.has(key));
    pm.incr(key, 2);
    assert_eq!(pm.get(key), 3);
}

#[test]
fn test_state_term_value_derives_from_union() {
    let world = state_world();
    let bench = world.term("BENCH");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    assert_eq!(pm.get(bench), 0);
    pm.give_state(bench, StateUnion::empty());
    assert_eq!(pm.get(bench), 1);
    assert!(pm.get_state(bench).unwrap().is_empty());
}

#[test]
fn test_give_state_keeps_only_improvements() {
    let world = state_world();
    let bench = world.term("BENCH");
    let ring = world.sm.bool_strict("HASRING").unwrap();
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    let mut spent = LazyStateBuilder::new(world.sm.start_state().clone());
    spent.set_bool(ring, false);
    let worse = StateUnion::single(spent.get_state());
    let better = StateUnion::single(world.sm.start_state().clone());

    pm.give_state(bench, worse.clone());
    assert_eq!(pm.get_state(bench), Some(&worse));
    pm.give_state(bench, better.clone());
    assert_eq!(pm.get_state(bench), Some(&better));
    // The dominated union does not claw anything back.
    pm.give_state(bench, worse);
    assert_eq!(pm.get_state(bench), Some(&better));
}

#[test]
fn test_preplaced_chain_cascades_to_fixed_point() {
    let world = simple_world();
    let key = world.term("KEY");
    let sword = world.term("SWORD");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    let mut mu = MainUpdater::new();
    mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
        Arc::new(SingleItem::new("Sword", sword, 1)),
        Arc::clone(world.lm.logic_def("Vault").unwrap()),
    )))
    .unwrap();
    mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
        Arc::new(SingleItem::new("SpareKey", key, 1)),
        Arc::clone(world.lm.logic_def("Arena").unwrap()),
    )))
    .unwrap();
    pm.attach_and_hook(mu);

    assert_eq!(pm.get(sword), 0);

    // One add triggers the whole cascade: KEY opens Vault, the sword from
    // Vault opens Arena, Arena grants the spare key.
    pm.add(&SingleItem::new("Key", key, 1));
    assert_eq!(pm.get(sword), 1);
    assert_eq!(pm.get(key), 2);
}

#[test]
fn test_multi_and_state_item_effects() {
    let world = state_world();
    let gem = world.term("GEM");
    let bench = world.term("BENCH");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    pm.add_at(
        &MultiItem::new("GemBundle", vec![(gem, 2), (gem, 1)]),
        "Foyer",
    );
    assert_eq!(pm.get(gem), 3);

    pm.add(&StateItem::new("BenchPass", bench, StateUnion::empty()));
    assert!(pm.has(bench));
}

#[test]
fn test_hook_fires_already_reachable_entries() {
    let world = simple_world();
    let key = world.term("KEY");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    let mut mu = MainUpdater::new();
    mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
        Arc::new(SingleItem::new("FreeKey", key, 1)),
        Arc::clone(world.lm.logic_def("Start1").unwrap()),
    )))
    .unwrap();
    pm.attach_and_hook(mu);

    assert_eq!(pm.get(key), 1);
}

#[test]
fn test_state_update_entry_tracks_waypoint() {
    let world = state_world();
    let gem = world.term("GEM");
    let bench = world.term("BENCH");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    let mut mu = MainUpdater::new();
    mu.add_entry(Box::new(StateUpdateEntry::new(
        bench,
        Arc::clone(world.lm.logic_def("BenchLogic").unwrap()),
    )))
    .unwrap();
    pm.attach_and_hook(mu);

    assert!(pm.get_state(bench).is_none());
    let fight = world.lm.logic_def("RingFight").unwrap();
    assert!(!fight.can_get(&world.lm, &pm));

    pm.add(&SingleItem::new("Gem", gem, 1));
    let union = pm.get_state(bench).expect("bench should be reachable");
    assert_eq!(union.len(), 1);
    assert!(fight.can_get(&world.lm, &pm));
}

#[test]
fn test_reset_returns_to_start_state() {
    let world = simple_world();
    let key = world.term("KEY");
    let sword = world.term("SWORD");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    let mut mu = MainUpdater::new();
    mu.add_entry(Box::new(PrePlacedItemUpdateEntry::new(
        Arc::new(SingleItem::new("Sword", sword, 1)),
        Arc::clone(world.lm.logic_def("Vault").unwrap()),
    )))
    .unwrap();
    pm.attach_and_hook(mu);
    pm.add(&SingleItem::new("Key", key, 1));
    assert_eq!(pm.get(sword), 1);

    pm.reset();
    assert_eq!(pm.get(key), 0);
    assert_eq!(pm.get(sword), 0);

    // The updater was dropped with the reset: no stale watcher fires.
    pm.add(&SingleItem::new("Key", key, 1));
    assert_eq!(pm.get(sword), 0);
}

#[test]
fn test_first_of_item_fires_first_applicable() {
    let world = simple_world();
    let key = world.term("KEY");
    let sword = world.term("SWORD");
    let mut pm = ProgressionManager::new(Arc::clone(&world.lm));

    let item = FirstOfItem::new(
        "KeyThenSword",
        vec![
            Arc::new(CappedItem::new("KeyOnce", key, 1, 1)) as Arc<dyn ConditionalItem>,
            Arc::new(CappedItem::new("SwordOnce", sword, 1, 1)),
        ],
    );

    pm.add(&item);
    assert_eq!(pm.get(key), 1);
    assert_eq!(pm.get(sword), 0);

    pm.add(&item);
    assert_eq!(pm.get(key), 1);
    assert_eq!(pm.get(sword), 1);

    assert!(!item.check_for_effect(&pm));
}
