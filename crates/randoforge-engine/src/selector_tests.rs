//! Selector stack-machine tests.

use randoforge_core::RandoCoreError;

use crate::error::RandoError;
use crate::group::{PlacementState, RandomizationGroup};
use crate::selector::GroupItemSelector;
use crate::test_utils::empty_item;

fn group_with_priorities(priorities: &[f32]) -> RandomizationGroup {
    let items = priorities
        .iter()
        .enumerate()
        .map(|(index, &priority)| {
            let mut item = empty_item(&format!("item{index}"));
            item.priority = priority;
            item
        })
        .collect();
    RandomizationGroup::new("test", items, Vec::new())
}

#[test]
fn test_lowest_priority_proposes_first() {
    let mut group = group_with_priorities(&[2.0, 0.0, 1.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(3).unwrap();

    assert_eq!(selector.try_get_next_proposal_priority(&mut group), Some(0.0));
    assert_eq!(selector.try_propose_next(&mut group), Some(1));
    assert_eq!(selector.try_propose_next(&mut group), Some(2));
    assert_eq!(selector.try_propose_next(&mut group), Some(0));
    assert_eq!(selector.try_propose_next(&mut group), None);
}

#[test]
fn test_propose_marks_temporary() {
    let mut group = group_with_priorities(&[0.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(1).unwrap();

    assert_eq!(group.items[0].placed, PlacementState::None);
    selector.try_propose_next(&mut group).unwrap();
    assert_eq!(group.items[0].placed, PlacementState::Temporary);
}

#[test]
fn test_cap_throttles_proposals() {
    let mut group = group_with_priorities(&[0.0, 1.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(1).unwrap();

    assert!(selector.try_propose_next(&mut group).is_some());
    // Cap spent: nothing further proposes.
    assert_eq!(selector.try_get_next_proposal_priority(&mut group), None);
    assert_eq!(selector.try_propose_next(&mut group), None);

    // Rejection releases the cap.
    selector.reject_last().unwrap();
    assert!(selector.try_propose_next(&mut group).is_some());
}

#[test]
fn test_cap_cannot_go_negative() {
    let group = group_with_priorities(&[0.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(2).unwrap();
    selector.increment_cap(-2).unwrap();
    assert!(selector.increment_cap(-1).is_err());
}

#[test]
fn test_accept_and_reject_require_proposals() {
    let group = group_with_priorities(&[0.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    assert!(matches!(
        selector.accept_last(),
        Err(RandoCoreError::InvalidOperation(_))
    ));
    assert!(matches!(
        selector.reject_last(),
        Err(RandoCoreError::InvalidOperation(_))
    ));
}

#[test]
fn test_recall_peeks_without_removing() {
    let mut group = group_with_priorities(&[0.0, 1.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(2).unwrap();

    assert_eq!(selector.try_recall_last(), None);
    let proposed = selector.try_propose_next(&mut group).unwrap();
    assert_eq!(selector.try_recall_last(), Some(proposed));
    assert_eq!(selector.try_recall_last(), Some(proposed));
    assert_eq!(selector.accept_last().unwrap(), proposed);
}

#[test]
fn test_finish_accepting_recycles_rejected_in_priority_order() {
    let mut group = group_with_priorities(&[0.0, 1.0, 2.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(3).unwrap();

    selector.try_propose_next(&mut group).unwrap();
    selector.try_propose_next(&mut group).unwrap();
    selector.reject_last().unwrap();
    selector.reject_last().unwrap();
    selector.finish_accepting(&group);

    // Recycled items propose again, lowest priority first.
    assert_eq!(selector.try_propose_next(&mut group), Some(0));
    assert_eq!(selector.try_propose_next(&mut group), Some(1));
    assert_eq!(selector.try_propose_next(&mut group), Some(2));
}

#[test]
fn test_reject_current_and_unaccept_all_resets_sphere() {
    let mut group = group_with_priorities(&[0.0, 1.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(2).unwrap();

    let first = selector.try_propose_next(&mut group).unwrap();
    selector.accept_last().unwrap();
    let second = selector.try_propose_next(&mut group).unwrap();

    selector.reject_current_and_unaccept_all(&mut group);
    assert_eq!(group.items[first].placed, PlacementState::None);
    assert_eq!(group.items[second].placed, PlacementState::None);
    assert_eq!(selector.cap(), 2);
    assert_eq!(selector.try_recall_last(), None);

    selector.finish_accepting(&group);
    assert_eq!(selector.try_propose_next(&mut group), Some(0));
}

#[test]
fn test_finish_requires_collected_accepted_items() {
    let mut group = group_with_priorities(&[0.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(1).unwrap();
    selector.try_propose_next(&mut group).unwrap();
    selector.accept_last().unwrap();

    assert!(matches!(
        selector.finish(&mut group),
        Err(RandoError::Domain(RandoCoreError::InvalidOperation(_)))
    ));
}

#[test]
fn test_finish_sweeps_leftovers_within_cap() {
    let mut group = group_with_priorities(&[0.0, 1.0, 2.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(3).unwrap();

    selector.try_propose_next(&mut group).unwrap();
    selector.accept_all_proposed();
    let accepted = selector.take_accepted();
    assert_eq!(accepted, vec![0]);

    let leftovers = selector.finish(&mut group).unwrap();
    assert_eq!(leftovers.len(), 2);
    assert_eq!(selector.cap(), 0);
    assert!(selector.is_finished());
    assert_eq!(selector.try_propose_next(&mut group), None);
}

#[test]
fn test_finish_fails_when_cap_cannot_cover_leftovers() {
    let mut group = group_with_priorities(&[0.0, 1.0]);
    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(1).unwrap();

    assert!(matches!(
        selector.finish(&mut group),
        Err(RandoError::OutOfLocations(_))
    ));
}

#[test]
fn test_coupled_sweep_discards_consumed_duals() {
    use crate::test_utils::{location, simple_world};

    let world = simple_world();
    let items = vec![empty_item("couple0"), empty_item("couple1")];
    let locations = vec![location(&world, "Start1"), location(&world, "Start2")];
    let mut group = RandomizationGroup::coupled("couples", items, locations);
    group.items[0].priority = 1.0;
    group.items[1].priority = 0.0;
    // couple1's dual was consumed permanently by the partner group.
    group.locations[1].reachable = PlacementState::Permanent;

    let mut selector = GroupItemSelector::new(0, &group);
    selector.increment_cap(2).unwrap();

    assert_eq!(selector.try_propose_next(&mut group), Some(0));
    let discarded = selector.collect_discarded();
    assert_eq!(discarded, vec![1]);
}
