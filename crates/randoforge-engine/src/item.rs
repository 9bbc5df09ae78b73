//! Logic items: effects applied to the progression manager.

use std::fmt::Debug;
use std::sync::Arc;

use randoforge_core::{StateUnion, TermId, TermValue};

use crate::progression::ProgressionManager;

/// An effect that can be granted to a progression manager.
pub trait LogicItem: Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Applies the item's effects; every mutation enqueues the affected term
    /// for fixed-point propagation.
    fn add_to(&self, pm: &mut ProgressionManager);

    /// Terms the item can affect, used for watcher subscription and
    /// diagnostics.
    fn affected_terms(&self) -> Vec<TermId>;
}

/// An item whose effect depends on current progression.
pub trait ConditionalItem: LogicItem {
    /// Whether [`LogicItem::add_to`] would change anything right now.
    fn check_for_effect(&self, pm: &ProgressionManager) -> bool;
}

/// Grants a single term increment.
#[derive(Debug, Clone)]
pub struct SingleItem {
    name: String,
    term: TermId,
    amount: TermValue,
}

impl SingleItem {
    pub fn new(name: impl Into<String>, term: TermId, amount: TermValue) -> Self {
        SingleItem {
            name: name.into(),
            term,
            amount,
        }
    }
}

impl LogicItem for SingleItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, pm: &mut ProgressionManager) {
        pm.incr(self.term, self.amount);
    }

    fn affected_terms(&self) -> Vec<TermId> {
        vec![self.term]
    }
}

impl ConditionalItem for SingleItem {
    fn check_for_effect(&self, _pm: &ProgressionManager) -> bool {
        true
    }
}

/// Grants several term increments at once.
#[derive(Debug, Clone)]
pub struct MultiItem {
    name: String,
    effects: Vec<(TermId, TermValue)>,
}

impl MultiItem {
    pub fn new(name: impl Into<String>, effects: Vec<(TermId, TermValue)>) -> Self {
        MultiItem {
            name: name.into(),
            effects,
        }
    }
}

impl LogicItem for MultiItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, pm: &mut ProgressionManager) {
        for &(term, amount) in &self.effects {
            pm.incr(term, amount);
        }
    }

    fn affected_terms(&self) -> Vec<TermId> {
        self.effects.iter().map(|&(term, _)| term).collect()
    }
}

/// Grants a state union to a state-valued term.
#[derive(Debug, Clone)]
pub struct StateItem {
    name: String,
    term: TermId,
    union: StateUnion,
}

impl StateItem {
    pub fn new(name: impl Into<String>, term: TermId, union: StateUnion) -> Self {
        StateItem {
            name: name.into(),
            term,
            union,
        }
    }
}

impl LogicItem for StateItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, pm: &mut ProgressionManager) {
        pm.give_state(self.term, self.union.clone());
    }

    fn affected_terms(&self) -> Vec<TermId> {
        vec![self.term]
    }
}

/// An item with no effect, used as filler.
#[derive(Debug, Clone)]
pub struct EmptyItem {
    name: String,
}

impl EmptyItem {
    pub fn new(name: impl Into<String>) -> Self {
        EmptyItem { name: name.into() }
    }
}

impl LogicItem for EmptyItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, _pm: &mut ProgressionManager) {}

    fn affected_terms(&self) -> Vec<TermId> {
        Vec::new()
    }
}

/// Grants an increment only while the term is below a cap.
#[derive(Debug, Clone)]
pub struct CappedItem {
    name: String,
    term: TermId,
    amount: TermValue,
    cap: TermValue,
}

impl CappedItem {
    pub fn new(name: impl Into<String>, term: TermId, amount: TermValue, cap: TermValue) -> Self {
        CappedItem {
            name: name.into(),
            term,
            amount,
            cap,
        }
    }
}

impl LogicItem for CappedItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, pm: &mut ProgressionManager) {
        if self.check_for_effect(pm) {
            pm.incr(self.term, self.amount);
        }
    }

    fn affected_terms(&self) -> Vec<TermId> {
        vec![self.term]
    }
}

impl ConditionalItem for CappedItem {
    fn check_for_effect(&self, pm: &ProgressionManager) -> bool {
        pm.value_of(self.term) < self.cap
    }
}

/// Fires the first nested item whose effect check passes.
#[derive(Debug, Clone)]
pub struct FirstOfItem {
    name: String,
    nested: Vec<Arc<dyn ConditionalItem>>,
}

impl FirstOfItem {
    pub fn new(name: impl Into<String>, nested: Vec<Arc<dyn ConditionalItem>>) -> Self {
        FirstOfItem {
            name: name.into(),
            nested,
        }
    }
}

impl LogicItem for FirstOfItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, pm: &mut ProgressionManager) {
        if let Some(item) = self.nested.iter().find(|item| item.check_for_effect(pm)) {
            item.add_to(pm);
        }
    }

    fn affected_terms(&self) -> Vec<TermId> {
        let mut terms: Vec<TermId> = self
            .nested
            .iter()
            .flat_map(|item| item.affected_terms())
            .collect();
        terms.sort_unstable();
        terms.dedup();
        terms
    }
}

impl ConditionalItem for FirstOfItem {
    fn check_for_effect(&self, pm: &ProgressionManager) -> bool {
        self.nested.iter().any(|item| item.check_for_effect(pm))
    }
}
