//! Shared world fixtures for engine tests.

use std::collections::HashMap;
use std::sync::Arc;

use randoforge_core::{StateManager, StateManagerBuilder, TermId, TermKind};
use randoforge_logic::{LogicManager, LogicManagerBuilder, Variable};
use randoforge_test::{FlagConsumeModifier, OriginModifier, SimpleDnfParser};

use crate::group::{RandoItem, RandoLocation, RandomizationGroup};
use crate::item::{EmptyItem, SingleItem};
use crate::stage::{RandomizationStage, UniformPlacementStrategy};

pub struct TestWorld {
    pub sm: Arc<StateManager>,
    pub lm: Arc<LogicManager>,
    pub terms: HashMap<String, TermId>,
}

impl TestWorld {
    pub fn term(&self, name: &str) -> TermId {
        self.terms[name]
    }
}

pub fn build_world(
    sm: Arc<StateManager>,
    terms: &[(&str, TermKind)],
    defs: &[(&str, &str)],
    variables: Vec<Variable>,
) -> TestWorld {
    let mut lmb = LogicManagerBuilder::new(Arc::clone(&sm));
    lmb.set_parser(Arc::new(SimpleDnfParser::new()));
    let mut ids = HashMap::new();
    for (name, kind) in terms {
        ids.insert(name.to_string(), lmb.get_or_add_term(name, *kind).unwrap());
    }
    for variable in variables {
        lmb.add_variable(variable).unwrap();
    }
    for (name, infix) in defs {
        lmb.add_logic(*name, *infix);
    }
    TestWorld {
        sm,
        lm: Arc::new(lmb.build().unwrap()),
        terms: ids,
    }
}

/// Two progression items, three free locations, two gated ones.
pub fn simple_world() -> TestWorld {
    let sm = Arc::new(StateManagerBuilder::new().build().unwrap());
    build_world(
        sm,
        &[("SWORD", TermKind::Int), ("KEY", TermKind::Int)],
        &[
            ("Start1", "TRUE"),
            ("Start2", "TRUE"),
            ("Cache", "TRUE"),
            ("Vault", "KEY"),
            ("Arena", "SWORD + KEY"),
        ],
        Vec::new(),
    )
}

/// A strict chain: location k needs every term below k. Most permutations
/// exhaust the location budget, exercising the retry path.
pub fn chain_world(length: usize) -> TestWorld {
    let sm = Arc::new(StateManagerBuilder::new().build().unwrap());
    let term_names: Vec<String> = (0..length).map(|i| format!("T{i}")).collect();
    let terms: Vec<(&str, TermKind)> = term_names
        .iter()
        .map(|name| (name.as_str(), TermKind::Int))
        .collect();
    let mut defs: Vec<(String, String)> = vec![("L0".to_string(), "TRUE".to_string())];
    for k in 1..length {
        defs.push((format!("L{k}"), term_names[..k].join(" + ")));
    }
    let borrowed: Vec<(&str, &str)> = defs
        .iter()
        .map(|(name, infix)| (name.as_str(), infix.as_str()))
        .collect();
    build_world(sm, &terms, &borrowed, Vec::new())
}

/// A state-carrying world: the BENCH waypoint originates a state once GEM
/// is owned, and the fight location consumes the ring from it.
pub fn state_world() -> TestWorld {
    let mut smb = StateManagerBuilder::new();
    smb.add_bool("HASRING").unwrap();
    smb.set_bool_default("HASRING", true).unwrap();
    let sm = Arc::new(smb.build().unwrap());
    let ring = sm.bool_strict("HASRING").unwrap();
    let origin = OriginModifier::new("%BENCH_ORIGIN", vec![sm.start_state().clone()]);
    let consume = FlagConsumeModifier::new("%USE_RING", ring);
    build_world(
        sm,
        &[("GEM", TermKind::Int), ("BENCH", TermKind::State)],
        &[
            ("BenchLogic", "GEM + %BENCH_ORIGIN"),
            ("Foyer", "TRUE"),
            ("Closet", "TRUE"),
            ("RingFight", "BENCH + %USE_RING"),
        ],
        vec![
            Variable::Modifier(Arc::new(origin)),
            Variable::Modifier(Arc::new(consume)),
        ],
    )
}

pub fn single_item(name: &str, term: TermId) -> RandoItem {
    RandoItem::new(Arc::new(SingleItem::new(name, term, 1)))
}

pub fn empty_item(name: &str) -> RandoItem {
    RandoItem::new(Arc::new(EmptyItem::new(name)))
}

pub fn location(world: &TestWorld, name: &str) -> RandoLocation {
    RandoLocation::new(Arc::clone(world.lm.logic_def(name).unwrap()))
}

pub fn group_of(
    label: &str,
    items: Vec<RandoItem>,
    locations: Vec<RandoLocation>,
) -> RandomizationGroup {
    RandomizationGroup::new(label, items, locations)
}

pub fn stage_of(label: &str, groups: Vec<RandomizationGroup>) -> RandomizationStage {
    RandomizationStage::new(label, groups, Box::new(UniformPlacementStrategy::new()))
}
