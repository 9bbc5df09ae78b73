//! Tests for the state model: schema freezing, dominance, unions, builders.

use super::*;
use crate::error::RandoCoreError;

fn two_bool_manager() -> (StateManager, StateBool, StateBool) {
    let mut builder = StateManagerBuilder::new();
    builder.add_bool("A").unwrap();
    builder.add_bool("B").unwrap();
    let sm = builder.build().unwrap();
    let a = sm.bool_strict("A").unwrap();
    let b = sm.bool_strict("B").unwrap();
    (sm, a, b)
}

fn state_of(sm: &StateManager, overrides: &[(StateBool, bool)]) -> State {
    let mut b = LazyStateBuilder::new(sm.start_state().clone());
    for (field, value) in overrides {
        b.set_bool(*field, *value);
    }
    b.get_state()
}

#[test]
fn test_builder_assigns_dense_ids() {
    let mut builder = StateManagerBuilder::new();
    let a = builder.add_bool("A").unwrap();
    let b = builder.add_bool("B").unwrap();
    let x = builder.add_int("X").unwrap();
    let y = builder.add_int("Y").unwrap();
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(x.index(), 0);
    assert_eq!(y.index(), 1);
}

#[test]
fn test_duplicate_field_rejected() {
    let mut builder = StateManagerBuilder::new();
    builder.add_bool("A").unwrap();
    assert!(matches!(
        builder.add_int("A"),
        Err(RandoCoreError::Duplicate(_))
    ));
}

#[test]
fn test_strict_getters_fail_on_unknown_names() {
    let (sm, _, _) = two_bool_manager();
    assert!(sm.get_bool("MISSING").is_none());
    assert!(matches!(
        sm.bool_strict("MISSING"),
        Err(RandoCoreError::UnknownStateBool(_))
    ));
    assert!(matches!(
        sm.int_strict("A"),
        Err(RandoCoreError::UnknownStateInt(_))
    ));
}

#[test]
fn test_start_state_applies_defaults() {
    let mut builder = StateManagerBuilder::new();
    builder.add_bool("HASRING").unwrap();
    builder.set_bool_default("HASRING", true).unwrap();
    builder.add_int("CHARGES").unwrap();
    builder.set_int_default("CHARGES", 3).unwrap();
    // Defaults may be rewritten before freezing.
    builder.set_int_default("CHARGES", 5).unwrap();
    let sm = builder.build().unwrap();
    let start = sm.start_state();
    assert!(start.get_bool(sm.bool_strict("HASRING").unwrap()));
    assert_eq!(start.get_int(sm.int_strict("CHARGES").unwrap()), 5);
}

#[test]
fn test_tags_group_fields() {
    let mut builder = StateManagerBuilder::new();
    builder.add_bool("A").unwrap();
    builder.add_bool("B").unwrap();
    builder.add_int("X").unwrap();
    builder.add_tag("A", "consumable").unwrap();
    builder.add_tag("X", "consumable").unwrap();
    let sm = builder.build().unwrap();
    let tagged = sm.list_by_tag("consumable");
    assert_eq!(tagged.len(), 2);
    assert!(sm.list_by_tag("nope").is_empty());
}

#[test]
fn test_property_lookup() {
    let mut builder = StateManagerBuilder::new();
    builder.add_int("X").unwrap();
    builder
        .set_property("X", "Cap", FieldProperty::Int(99))
        .unwrap();
    let sm = builder.build().unwrap();
    assert_eq!(
        sm.try_get_property("X", "Cap").and_then(FieldProperty::as_int),
        Some(99)
    );
    assert!(sm.try_get_property("X", "Missing").is_none());
    assert!(sm.try_get_property("Missing", "Cap").is_none());
}

#[test]
fn test_dominance_high_is_better() {
    let (sm, a, _) = two_bool_manager();
    let low = state_of(&sm, &[]);
    let high = state_of(&sm, &[(a, true)]);
    assert!(low.le(&high, &sm));
    assert!(!high.le(&low, &sm));
    assert!(high.dominates(&low, &sm));
}

#[test]
fn test_dominance_low_is_better_bool() {
    let mut builder = StateManagerBuilder::new();
    builder.add_bool("SPENT").unwrap();
    builder
        .set_direction("SPENT", FieldDirection::LowIsBetter)
        .unwrap();
    let sm = builder.build().unwrap();
    let field = sm.bool_strict("SPENT").unwrap();
    let unspent = sm.start_state().clone();
    let spent = state_of(&sm, &[(field, true)]);
    assert!(spent.le(&unspent, &sm));
    assert!(!unspent.le(&spent, &sm));
}

#[test]
fn test_dominance_int_directions() {
    let mut builder = StateManagerBuilder::new();
    builder.add_int("GEMS").unwrap();
    builder.add_int("DAMAGE").unwrap();
    builder
        .set_direction("DAMAGE", FieldDirection::LowIsBetter)
        .unwrap();
    let sm = builder.build().unwrap();
    let gems = sm.int_strict("GEMS").unwrap();
    let damage = sm.int_strict("DAMAGE").unwrap();

    let mut b = LazyStateBuilder::new(sm.start_state().clone());
    b.set_int(gems, 2);
    b.set_int(damage, 1);
    let worse = b.get_state();
    let mut b = LazyStateBuilder::new(sm.start_state().clone());
    b.set_int(gems, 3);
    b.set_int(damage, 0);
    let better = b.get_state();

    assert!(worse.le(&better, &sm));
    assert!(!better.le(&worse, &sm));
}

#[test]
fn test_incomparable_states() {
    let (sm, a, b) = two_bool_manager();
    let only_a = state_of(&sm, &[(a, true)]);
    let only_b = state_of(&sm, &[(b, true)]);
    assert!(!only_a.le(&only_b, &sm));
    assert!(!only_b.le(&only_a, &sm));
}

#[test]
fn test_union_reduces_to_antichain() {
    // Scenario: {[A,!B], [!A,B]} is an antichain; adding [A,B] collapses it.
    let (sm, a, b) = two_bool_manager();
    let only_a = state_of(&sm, &[(a, true)]);
    let only_b = state_of(&sm, &[(b, true)]);
    let both = state_of(&sm, &[(a, true), (b, true)]);

    let union = StateUnion::from_states(vec![only_a.clone(), only_b.clone()], &sm);
    assert_eq!(union.len(), 2);
    assert!(union.is_antichain(&sm));

    let collapsed = StateUnion::from_states(vec![only_a, only_b, both.clone()], &sm);
    assert_eq!(collapsed.len(), 1);
    assert_eq!(collapsed.states()[0], both);
}

#[test]
fn test_union_set_equality() {
    let (sm, a, b) = two_bool_manager();
    let only_a = state_of(&sm, &[(a, true)]);
    let only_b = state_of(&sm, &[(b, true)]);
    let u1 = StateUnion::from_states(vec![only_a.clone(), only_b.clone()], &sm);
    let u2 = StateUnion::from_states(vec![only_b, only_a], &sm);
    assert_eq!(u1, u2);
}

#[test]
fn test_union_merge_reduces() {
    let (sm, a, b) = two_bool_manager();
    let only_a = state_of(&sm, &[(a, true)]);
    let both = state_of(&sm, &[(a, true), (b, true)]);
    let partial = StateUnion::single(only_a);
    let full = StateUnion::single(both.clone());
    let merged = StateUnion::union(&partial, &full, &sm);
    assert_eq!(merged, full);
    assert!(merged.is_antichain(&sm));
    // Merging the other way reduces to the same antichain.
    assert_eq!(StateUnion::union(&full, &partial, &sm), merged);
}

#[test]
fn test_try_union_cases() {
    let (sm, a, _) = two_bool_manager();
    let base = sm.start_state().clone();
    let improved = state_of(&sm, &[(a, true)]);

    // Nothing at all.
    assert!(StateUnion::try_union(None, &[], &sm).is_none());

    // No current: new states form the union.
    let fresh = StateUnion::try_union(None, &[base.clone()], &sm).unwrap();
    assert_eq!(fresh.len(), 1);

    // Current present, nothing improves: current comes back unchanged.
    let current = StateUnion::single(improved.clone());
    let same = StateUnion::try_union(Some(&current), &[base.clone()], &sm).unwrap();
    assert_eq!(same, current);

    // Current present, improvement: reduced union.
    let current = StateUnion::single(base);
    let grown = StateUnion::try_union(Some(&current), &[improved.clone()], &sm).unwrap();
    assert_eq!(grown.len(), 1);
    assert_eq!(grown.states()[0], improved);

    // Current present and empty, no new states: still reported as reachable.
    let empty = StateUnion::empty();
    assert_eq!(
        StateUnion::try_union(Some(&empty), &[], &sm).unwrap(),
        StateUnion::empty()
    );
}

#[test]
fn test_lazy_builder_copy_on_write() {
    let (sm, a, _) = two_bool_manager();
    let base = sm.start_state().clone();
    let mut builder = LazyStateBuilder::new(base.clone());

    // Untouched builder materializes the base itself.
    assert_eq!(builder.get_state(), base);
    assert!(!builder.get_bool(a));

    builder.set_bool(a, true);
    assert!(builder.get_bool(a));
    // The shared base is not mutated.
    assert!(!base.get_bool(a));
    assert_ne!(builder.get_state(), base);
}

#[test]
fn test_lazy_builder_branching() {
    let mut sm_builder = StateManagerBuilder::new();
    sm_builder.add_int("X").unwrap();
    let sm = sm_builder.build().unwrap();
    let x = sm.int_strict("X").unwrap();

    let mut left = LazyStateBuilder::new(sm.start_state().clone());
    left.increment_int(x, 1);
    let right = left.clone();
    left.increment_int(x, 1);

    assert_eq!(left.get_state().get_int(x), 2);
    assert_eq!(right.get_state().get_int(x), 1);
}

#[test]
fn test_named_states_strict() {
    let mut builder = StateManagerBuilder::new();
    builder.add_bool("A").unwrap();
    builder.add_named_state("boosted", vec![("A".into(), FieldProperty::Bool(true))]);
    builder.add_named_union("start_or_boosted", vec!["boosted".into()]);
    let sm = builder.build().unwrap();

    let boosted = sm.named_state("boosted").unwrap();
    assert!(boosted.get_bool(sm.bool_strict("A").unwrap()));
    assert_eq!(sm.named_state_union("start_or_boosted").unwrap().len(), 1);
    assert!(matches!(
        sm.named_state("missing"),
        Err(RandoCoreError::UnknownNamedState(_))
    ));
    assert!(matches!(
        sm.named_state_union("missing"),
        Err(RandoCoreError::UnknownNamedStateUnion(_))
    ));
}

#[test]
fn test_pretty_print_lists_fields() {
    let mut builder = StateManagerBuilder::new();
    builder.add_bool("A").unwrap();
    builder.add_int("X").unwrap();
    builder.set_int_default("X", 4).unwrap();
    let sm = builder.build().unwrap();
    let rendered = sm.pretty_print(sm.start_state());
    assert!(rendered.contains("A=false"));
    assert!(rendered.contains("X=4"));
}

#[test]
fn test_antichain_with_many_bools_across_words() {
    // Exercise multi-word packing: 40 bools spans two u32 words.
    let mut builder = StateManagerBuilder::new();
    let mut fields = Vec::new();
    for i in 0..40 {
        fields.push(builder.add_bool(format!("B{i}")).unwrap());
    }
    let sm = builder.build().unwrap();

    let low = state_of(&sm, &[(fields[35], true)]);
    let high = state_of(&sm, &[(fields[35], true), (fields[2], true)]);
    assert!(low.le(&high, &sm));
    assert!(!high.le(&low, &sm));
}
